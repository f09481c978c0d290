use std::sync::OnceLock;

use regex::Regex;

fn leading_number() -> Option<&'static Regex>
{
  static LEADING_NUMBER: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  LEADING_NUMBER
    .get_or_init(|| {
      Regex::new(
        r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?",
      )
      .map_err(|err| {
        tracing::error!(
          error = %err,
          "internal rate regex failed to compile"
        );
      })
      .ok()
    })
    .as_ref()
}

/// Reads a nightly rate from an
/// attribute value. The longest numeric
/// prefix wins (`"150abc"` is 150);
/// anything without one, or that is not
/// finite, reads as zero.
#[must_use]
pub fn parse_rate(
  raw: Option<&str>
) -> f64 {
  let Some(raw) = raw else {
    return 0.0;
  };
  let token = raw.trim_start();

  let Some(found) = leading_number()
    .and_then(|re| re.find(token))
  else {
    return 0.0;
  };

  match found.as_str().parse::<f64>() {
    | Ok(value) if value.is_finite() => {
      value
    }
    | _ => 0.0
  }
}

/// `$450.00`-style display with exactly
/// two decimals.
#[must_use]
pub fn format_currency(
  symbol: &str,
  amount: f64
) -> String {
  format!("{symbol}{amount:.2}")
}

#[cfg(test)]
mod tests {
  use super::{
    format_currency,
    parse_rate
  };

  #[test]
  fn reads_leading_numbers() {
    assert_eq!(
      parse_rate(Some("150")),
      150.0
    );
    assert_eq!(
      parse_rate(Some("150.75")),
      150.75
    );
    assert_eq!(
      parse_rate(Some("  99.5")),
      99.5
    );
    assert_eq!(
      parse_rate(Some("150abc")),
      150.0
    );
    assert_eq!(
      parse_rate(Some(".5")),
      0.5
    );
    assert_eq!(
      parse_rate(Some("1e2")),
      100.0
    );
  }

  #[test]
  fn unreadable_rates_are_zero() {
    assert_eq!(parse_rate(None), 0.0);
    assert_eq!(parse_rate(Some("")), 0.0);
    assert_eq!(
      parse_rate(Some("abc")),
      0.0
    );
    assert_eq!(
      parse_rate(Some("$150")),
      0.0
    );
    assert_eq!(
      parse_rate(Some("1e999")),
      0.0
    );
  }

  #[test]
  fn formats_two_decimals() {
    assert_eq!(
      format_currency("$", 150.0),
      "$150.00"
    );
    assert_eq!(
      format_currency("$", 89.999),
      "$90.00"
    );
    assert_eq!(
      format_currency("€", 12.5),
      "€12.50"
    );
  }
}
