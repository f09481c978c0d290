use crate::money::parse_rate;
use crate::surface::SelectedOption;

/// A selectable room and its nightly
/// rate. Unreadable prices read as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomOption {
  pub identifier:   String,
  pub nightly_rate: f64
}

impl RoomOption {
  #[must_use]
  pub fn from_selected(
    selected: &SelectedOption
  ) -> Self {
    Self {
      identifier:   selected
        .value
        .clone(),
      nightly_rate: parse_rate(
        selected.attribute.as_deref()
      )
    }
  }

  /// Only a positive rate can be booked;
  /// NaN never is.
  #[must_use]
  pub fn is_bookable(&self) -> bool {
    self.nightly_rate > 0.0
  }
}

#[cfg(test)]
mod tests {
  use super::RoomOption;
  use crate::surface::SelectedOption;

  fn option(
    price: Option<&str>
  ) -> RoomOption {
    RoomOption::from_selected(
      &SelectedOption {
        value:     "101".to_string(),
        attribute: price
          .map(str::to_string)
      }
    )
  }

  #[test]
  fn reads_price_attribute() {
    let room = option(Some("150.00"));
    assert_eq!(room.identifier, "101");
    assert_eq!(room.nightly_rate, 150.0);
    assert!(room.is_bookable());
  }

  #[test]
  fn missing_or_bad_price_is_not_bookable()
  {
    assert!(!option(None).is_bookable());
    assert!(
      !option(Some("n/a")).is_bookable()
    );
    assert!(
      !option(Some("-20")).is_bookable()
    );
  }
}
