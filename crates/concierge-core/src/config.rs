use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  error,
  info
};

pub const DEFAULT_CURRENCY_SYMBOL: &str =
  "$";
pub const DEFAULT_DISPLAY_MS: u32 =
  5_000;
pub const DEFAULT_EXIT_MS: u32 = 300;

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct Config {
  pub currency_symbol: String,
  pub timezone:        Option<String>,
  pub booking:         BookingIds,
  pub filter:          FilterSelectors,
  pub notice:          NoticeSettings
}

/// Element ids of the booking form and
/// its summary panel.
#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct BookingIds {
  pub check_in:        String,
  pub check_out:       String,
  pub room_select:     String,
  pub price_attribute: String,
  pub summary:         String,
  pub nights:          String,
  pub price_per_night: String,
  pub total:           String
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct FilterSelectors {
  pub triggers:         String,
  pub tag_attribute:    String,
  pub active_class:     String,
  pub all_sentinel:     String,
  pub cards:            String,
  pub rows:             String,
  pub status_attribute: String
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct NoticeSettings {
  pub selector:   String,
  pub display_ms: u32,
  pub exit_ms:    u32,
  pub animation:  String
}

impl Default for Config {
  fn default() -> Self {
    Self {
      currency_symbol:
        DEFAULT_CURRENCY_SYMBOL
          .to_string(),
      timezone:        None,
      booking:
        BookingIds::default(),
      filter:
        FilterSelectors::default(),
      notice:
        NoticeSettings::default()
    }
  }
}

impl Default for BookingIds {
  fn default() -> Self {
    Self {
      check_in:        "check_in_date"
        .to_string(),
      check_out:       "check_out_date"
        .to_string(),
      room_select:     "room_id"
        .to_string(),
      price_attribute: "data-price"
        .to_string(),
      summary:         "booking-summary"
        .to_string(),
      nights:          "nights-count"
        .to_string(),
      price_per_night: "price-per-night"
        .to_string(),
      total:           "total-amount"
        .to_string()
    }
  }
}

impl Default for FilterSelectors {
  fn default() -> Self {
    Self {
      triggers:         ".filter-btn"
        .to_string(),
      tag_attribute:    "data-filter"
        .to_string(),
      active_class:     "active"
        .to_string(),
      all_sentinel:     "all"
        .to_string(),
      cards:            ".room-card"
        .to_string(),
      rows:
        "tbody tr[data-status]"
          .to_string(),
      status_attribute: "data-status"
        .to_string()
    }
  }
}

impl Default for NoticeSettings {
  fn default() -> Self {
    Self {
      selector:   ".flash-message"
        .to_string(),
      display_ms: DEFAULT_DISPLAY_MS,
      exit_ms:    DEFAULT_EXIT_MS,
      animation:  "slideOut".to_string()
    }
  }
}

impl Config {
  /// Loads the page configuration from
  /// an optional TOML document. A missing
  /// document yields the defaults; a
  /// malformed one is logged and also
  /// yields the defaults.
  #[tracing::instrument(skip(raw))]
  pub fn load(raw: Option<&str>) -> Self {
    let Some(raw) = raw else {
      debug!(
        "no page config block; using \
         defaults"
      );
      return Self::default();
    };

    match Self::from_toml_str(raw) {
      | Ok(cfg) => {
        info!(
          currency = %cfg.currency_symbol,
          timezone = ?cfg.timezone,
          "loaded page config"
        );
        cfg
      }
      | Err(err) => {
        error!(
          error = %format!("{err:#}"),
          "failed parsing page config; \
           using defaults"
        );
        Self::default()
      }
    }
  }

  pub fn from_toml_str(
    raw: &str
  ) -> anyhow::Result<Self> {
    toml::from_str::<Self>(raw).context(
      "invalid page config document"
    )
  }

  /// The configured timezone, if any and
  /// if it names a known zone.
  pub fn resolved_timezone(
    &self
  ) -> Option<Tz> {
    let raw = self.timezone.as_deref()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return None;
    }

    match trimmed.parse::<Tz>() {
      | Ok(tz) => Some(tz),
      | Err(err) => {
        error!(
          timezone = %trimmed,
          error = %err,
          "failed to parse timezone id; \
           using host local time"
        );
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{
    Config,
    DEFAULT_DISPLAY_MS
  };

  #[test]
  fn missing_document_yields_defaults()
  {
    let cfg = Config::load(None);
    assert_eq!(cfg, Config::default());
    assert_eq!(
      cfg.booking.check_in,
      "check_in_date"
    );
    assert_eq!(
      cfg.notice.display_ms,
      DEFAULT_DISPLAY_MS
    );
  }

  #[test]
  fn partial_document_keeps_defaults() {
    let cfg = Config::from_toml_str(
      r#"
currency_symbol = "€"

[notice]
display_ms = 8000
"#
    )
    .expect("parse config");
    assert_eq!(cfg.currency_symbol, "€");
    assert_eq!(
      cfg.notice.display_ms,
      8000
    );
    assert_eq!(cfg.notice.exit_ms, 300);
    assert_eq!(
      cfg.filter.rows,
      "tbody tr[data-status]"
    );
  }

  #[test]
  fn malformed_document_falls_back() {
    let cfg = Config::load(Some(
      "currency_symbol = [",
    ));
    assert_eq!(cfg, Config::default());
  }

  #[test]
  fn timezone_resolution() {
    let mut cfg = Config::default();
    assert!(
      cfg.resolved_timezone().is_none()
    );

    cfg.timezone =
      Some("Europe/Lisbon".to_string());
    assert_eq!(
      cfg
        .resolved_timezone()
        .map(|tz| tz.name()),
      Some("Europe/Lisbon")
    );

    cfg.timezone =
      Some("Mars/Olympus".to_string());
    assert!(
      cfg.resolved_timezone().is_none()
    );
  }
}
