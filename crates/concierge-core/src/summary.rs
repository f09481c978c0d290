use serde::Serialize;
use tracing::{
  debug,
  warn
};

use crate::config::{
  BookingIds,
  Config
};
use crate::datetime::{
  nights_between,
  parse_form_date
};
use crate::money::format_currency;
use crate::room::RoomOption;
use crate::surface::{
  Display,
  UiSurface
};

/// Nights and price for the current form
/// state. Derived on demand, never
/// stored.
#[derive(
  Debug, Clone, PartialEq, Serialize,
)]
pub struct BookingSummary {
  pub nights:          u32,
  pub price_per_night: f64,
  pub total:           f64
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct SummaryText {
  pub nights:          String,
  pub price_per_night: String,
  pub total:           String
}

impl BookingSummary {
  /// `None` unless the room is bookable,
  /// both dates are present and parse,
  /// and check-out is strictly later
  /// than check-in.
  #[must_use]
  pub fn compute(
    room: &RoomOption,
    check_in: &str,
    check_out: &str
  ) -> Option<Self> {
    if !room.is_bookable() {
      return None;
    }
    let nightly_rate = room.nightly_rate;

    let check_in =
      parse_form_date(check_in)?;
    let check_out =
      parse_form_date(check_out)?;
    let nights =
      nights_between(check_in, check_out)?;

    Some(Self {
      nights,
      price_per_night: nightly_rate,
      total: f64::from(nights)
        * nightly_rate
    })
  }

  /// Compact JSON for log lines.
  #[must_use]
  pub fn to_json(&self) -> String {
    serde_json::to_string(self)
      .unwrap_or_else(|err| {
        format!("<unserializable: {err}>")
      })
  }

  #[must_use]
  pub fn text(
    &self,
    currency_symbol: &str
  ) -> SummaryText {
    SummaryText {
      nights:          self
        .nights
        .to_string(),
      price_per_night: format_currency(
        currency_symbol,
        self.price_per_night
      ),
      total:           format_currency(
        currency_symbol,
        self.total
      )
    }
  }
}

/// What a recomputation did to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
  Shown(BookingSummary),
  Hidden,
  /// A required element is missing; the
  /// page was left untouched.
  Skipped
}

#[derive(Debug, Clone)]
pub struct SummaryCalculator {
  ids:             BookingIds,
  currency_symbol: String
}

impl SummaryCalculator {
  #[must_use]
  pub fn new(cfg: &Config) -> Self {
    Self {
      ids:             cfg
        .booking
        .clone(),
      currency_symbol: cfg
        .currency_symbol
        .clone()
    }
  }

  /// Rerenders the summary panel from the
  /// current form state.
  #[tracing::instrument(skip_all)]
  pub fn recompute<S: UiSurface>(
    &self,
    surface: &mut S
  ) -> SummaryOutcome {
    let ids = &self.ids;
    if !surface.has_element(&ids.room_select)
      || !surface.has_element(&ids.summary)
    {
      debug!("summary elements missing; skipping");
      return SummaryOutcome::Skipped;
    }
    let (Some(check_in), Some(check_out)) = (
      surface.value(&ids.check_in),
      surface.value(&ids.check_out)
    ) else {
      debug!("date inputs missing; skipping");
      return SummaryOutcome::Skipped;
    };

    let room = surface
      .selected_option(
        &ids.room_select,
        &ids.price_attribute
      )
      .map(|selected| {
        RoomOption::from_selected(
          &selected
        )
      });

    let Some(summary) =
      room.as_ref().and_then(|room| {
        BookingSummary::compute(
          room, &check_in, &check_out
        )
      })
    else {
      debug!(
        room = ?room,
        check_in = %check_in,
        check_out = %check_out,
        "summary hidden"
      );
      self.write_display(
        surface,
        Display::None
      );
      return SummaryOutcome::Hidden;
    };

    let text =
      summary.text(&self.currency_symbol);
    for (id, value) in [
      (&ids.nights, &text.nights),
      (
        &ids.price_per_night,
        &text.price_per_night
      ),
      (&ids.total, &text.total)
    ] {
      if let Err(err) =
        surface.set_text(id, value)
      {
        warn!(
          element = %id,
          error = %err,
          "failed writing summary field"
        );
      }
    }
    self.write_display(
      surface,
      Display::Block
    );

    debug!(
      summary = %summary.to_json(),
      "summary shown"
    );
    SummaryOutcome::Shown(summary)
  }

  fn write_display<S: UiSurface>(
    &self,
    surface: &mut S,
    display: Display
  ) {
    if let Err(err) = surface.set_display(
      &self.ids.summary,
      display
    ) {
      warn!(
        error = %err,
        "failed toggling summary panel"
      );
    }
  }
}
