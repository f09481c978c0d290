use std::cell::RefCell;
use std::rc::Rc;

use tracing::{
  debug,
  info,
  warn
};

use crate::config::Config;
use crate::filter::{
  FilterReport,
  ListFilter
};
use crate::guard::{
  DateRangeGuard,
  GuardOutcome
};
use crate::notice::{
  NoticeTracker,
  keyframes_css,
  schedule_notices
};
use crate::scheduler::Scheduler;
use crate::summary::{
  SummaryCalculator,
  SummaryOutcome
};
use crate::surface::UiSurface;

/// Which listeners the host should
/// register after boot.
#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub struct Bindings {
  pub check_in:        bool,
  pub check_out:       bool,
  pub room_select:     bool,
  pub filter_triggers: usize,
  pub notices:         usize
}

/// The booking page: one owner for the
/// surface, with one handler per page
/// event.
pub struct BookingPage<S, T> {
  config:     Config,
  surface:    Rc<RefCell<S>>,
  scheduler:  T,
  guard:      DateRangeGuard,
  calculator: SummaryCalculator,
  filter:     RefCell<Option<ListFilter>>,
  notices:    RefCell<NoticeTracker>
}

impl<S, T> BookingPage<S, T>
where
  S: UiSurface + 'static,
  T: Scheduler + Clone + 'static
{
  pub fn new(
    config: Config,
    surface: Rc<RefCell<S>>,
    scheduler: T
  ) -> Self {
    let guard =
      DateRangeGuard::new(&config.booking);
    let calculator =
      SummaryCalculator::new(&config);
    Self {
      config,
      surface,
      scheduler,
      guard,
      calculator,
      filter: RefCell::new(None),
      notices: RefCell::new(
        NoticeTracker::default()
      )
    }
  }

  #[must_use]
  pub fn config(&self) -> &Config {
    &self.config
  }

  #[must_use]
  pub fn surface(
    &self
  ) -> &Rc<RefCell<S>> {
    &self.surface
  }

  #[must_use]
  pub fn notices(&self) -> NoticeTracker {
    self.notices.borrow().clone()
  }

  /// The currently active filter trigger,
  /// if the page has a filter.
  #[must_use]
  pub fn active_filter(
    &self
  ) -> Option<usize> {
    self
      .filter
      .borrow()
      .as_ref()
      .and_then(|f| {
        f.controller().active_index()
      })
  }

  /// Page-load initialization: injects
  /// the notice keyframes, bounds the date
  /// inputs, reads the filter triggers
  /// and schedules the notices present
  /// now.
  #[tracing::instrument(skip_all)]
  pub fn boot(&self) -> Bindings {
    let mut bindings = Bindings::default();
    {
      let mut surface =
        self.surface.borrow_mut();

      if let Err(err) = surface.inject_style(
        &keyframes_css(&self.config.notice)
      ) {
        warn!(
          error = %err,
          "failed injecting notice keyframes"
        );
      }

      self.guard.install(&mut *surface);
      bindings.check_in =
        self.guard.has_check_in(&*surface);
      bindings.check_out =
        self.guard.has_check_out(&*surface);
      bindings.room_select = surface
        .has_element(
          &self.config.booking.room_select
        );

      let filter = ListFilter::install(
        &*surface,
        &self.config.filter
      );
      bindings.filter_triggers =
        filter.controller().len();
      *self.filter.borrow_mut() =
        Some(filter);
    }

    let tracker = schedule_notices(
      &self.surface,
      &self.scheduler,
      &self.config.notice
    );
    if tracker.is_empty() {
      debug!("no notices on page");
    }
    bindings.notices = tracker.len();
    *self.notices.borrow_mut() = tracker;

    info!(?bindings, "booking page ready");
    bindings
  }

  /// Check-in changed: propagate to
  /// check-out first, then rerender the
  /// summary.
  #[tracing::instrument(skip_all)]
  pub fn on_check_in_change(
    &self
  ) -> (GuardOutcome, SummaryOutcome) {
    let mut surface =
      self.surface.borrow_mut();
    let guarded = self
      .guard
      .on_check_in_change(&mut *surface);
    let summary = self
      .calculator
      .recompute(&mut *surface);
    (guarded, summary)
  }

  #[tracing::instrument(skip_all)]
  pub fn on_check_out_change(
    &self
  ) -> SummaryOutcome {
    self.recompute()
  }

  #[tracing::instrument(skip_all)]
  pub fn on_room_change(
    &self
  ) -> SummaryOutcome {
    self.recompute()
  }

  #[tracing::instrument(skip(self))]
  pub fn on_filter_click(
    &self,
    index: usize
  ) -> Option<FilterReport> {
    let mut filter =
      self.filter.borrow_mut();
    let Some(filter) = filter.as_mut()
    else {
      warn!("filter click before boot");
      return None;
    };
    filter.on_trigger_click(
      &mut *self.surface.borrow_mut(),
      index
    )
  }

  fn recompute(&self) -> SummaryOutcome {
    self
      .calculator
      .recompute(&mut *self.surface.borrow_mut())
  }
}
