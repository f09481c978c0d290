use std::cmp::Ordering;

use tracing::{
  debug,
  warn
};

use crate::config::BookingIds;
use crate::datetime::{
  compare_form_values,
  format_form_date
};
use crate::surface::UiSurface;

const MIN_ATTRIBUTE: &str = "min";

/// What a check-in change did to the
/// check-out control.
#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub struct GuardOutcome {
  /// The lower bound now set on
  /// check-out, when that control exists.
  pub check_out_min:     Option<String>,
  pub cleared_check_out: bool
}

/// Keeps the two date inputs in a usable
/// order: neither before today, check-out
/// after check-in.
#[derive(Debug, Clone)]
pub struct DateRangeGuard {
  check_in:  String,
  check_out: String
}

impl DateRangeGuard {
  #[must_use]
  pub fn new(ids: &BookingIds) -> Self {
    Self {
      check_in:  ids.check_in.clone(),
      check_out: ids.check_out.clone()
    }
  }

  /// Puts today's date as the lower bound
  /// on whichever date inputs exist and
  /// returns it.
  #[tracing::instrument(skip_all)]
  pub fn install<S: UiSurface>(
    &self,
    surface: &mut S
  ) -> String {
    let today =
      format_form_date(surface.today());
    for id in [&self.check_in, &self.check_out]
    {
      if surface.has_element(id) {
        set_min(surface, id, &today);
      } else {
        debug!(
          element = %id,
          "date input missing; not bounded"
        );
      }
    }
    today
  }

  #[must_use]
  pub fn has_check_in<S: UiSurface>(
    &self,
    surface: &S
  ) -> bool {
    surface.has_element(&self.check_in)
  }

  #[must_use]
  pub fn has_check_out<S: UiSurface>(
    &self,
    surface: &S
  ) -> bool {
    surface.has_element(&self.check_out)
  }

  /// Propagates a new check-in value to
  /// check-out: raises its lower bound
  /// and clears it when it no longer
  /// falls after check-in.
  #[tracing::instrument(skip_all)]
  pub fn on_check_in_change<
    S: UiSurface
  >(
    &self,
    surface: &mut S
  ) -> GuardOutcome {
    let Some(check_in) =
      surface.value(&self.check_in)
    else {
      return GuardOutcome::default();
    };
    let Some(check_out) =
      surface.value(&self.check_out)
    else {
      return GuardOutcome::default();
    };

    let min = if check_in.trim().is_empty()
    {
      format_form_date(surface.today())
    } else {
      check_in.clone()
    };
    set_min(surface, &self.check_out, &min);

    let cleared = !check_out.is_empty()
      && compare_form_values(
        &check_out, &check_in
      ) != Ordering::Greater;
    if cleared {
      if let Err(err) = surface
        .set_value(&self.check_out, "")
      {
        warn!(
          error = %err,
          "failed clearing check-out"
        );
      }
    }

    debug!(
      check_in = %check_in,
      check_out = %check_out,
      min = %min,
      cleared,
      "check-in propagated"
    );
    GuardOutcome {
      check_out_min:     Some(min),
      cleared_check_out: cleared
    }
  }
}

fn set_min<S: UiSurface>(
  surface: &mut S,
  id: &str,
  value: &str
) {
  if let Err(err) = surface
    .set_attribute(id, MIN_ATTRIBUTE, value)
  {
    warn!(
      element = %id,
      error = %err,
      "failed setting min date"
    );
  }
}
