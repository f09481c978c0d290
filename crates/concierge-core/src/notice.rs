use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{
  debug,
  info,
  warn
};

use crate::config::NoticeSettings;
use crate::scheduler::Scheduler;
use crate::surface::{
  NoticeId,
  UiSurface
};

/// Lifecycle of one notice. Transitions
/// only move forward.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
)]
pub enum NoticeState {
  Visible,
  AnimatingOut,
  Removed
}

impl NoticeState {
  #[must_use]
  pub fn next(self) -> Self {
    match self {
      | NoticeState::Visible => {
        NoticeState::AnimatingOut
      }
      | NoticeState::AnimatingOut
      | NoticeState::Removed => {
        NoticeState::Removed
      }
    }
  }
}

/// Shared view of every scheduled
/// notice's state.
#[derive(Debug, Clone, Default)]
pub struct NoticeTracker {
  states: Rc<RefCell<BTreeMap<NoticeId, NoticeState>>>
}

impl NoticeTracker {
  #[must_use]
  pub fn state(
    &self,
    id: NoticeId
  ) -> Option<NoticeState> {
    self.states.borrow().get(&id).copied()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.states.borrow().len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.states.borrow().is_empty()
  }

  fn track(&self, id: NoticeId) {
    self
      .states
      .borrow_mut()
      .insert(id, NoticeState::Visible);
  }

  fn advance(
    &self,
    id: NoticeId
  ) -> NoticeState {
    let mut states =
      self.states.borrow_mut();
    let state = states
      .entry(id)
      .or_insert(NoticeState::Visible);
    *state = state.next();
    *state
  }
}

/// The CSS `animation` shorthand applied
/// when a notice starts leaving.
#[must_use]
pub fn exit_animation(
  settings: &NoticeSettings
) -> String {
  format!(
    "{} {}ms ease forwards",
    settings.animation, settings.exit_ms
  )
}

#[must_use]
pub fn keyframes_css(
  settings: &NoticeSettings
) -> String {
  format!(
    "@keyframes {} {{\n  from {{\n    \
     opacity: 1;\n    transform: \
     translateX(0);\n  }}\n  to {{\n    \
     opacity: 0;\n    transform: \
     translateX(20px);\n  }}\n}}\n",
    settings.animation
  )
}

/// Schedules the two-phase teardown of
/// every notice present right now. Later
/// notices are not picked up.
#[tracing::instrument(skip_all)]
pub fn schedule_notices<S, T>(
  surface: &Rc<RefCell<S>>,
  scheduler: &T,
  settings: &NoticeSettings
) -> NoticeTracker
where
  S: UiSurface + 'static,
  T: Scheduler + Clone + 'static
{
  let tracker = NoticeTracker::default();
  let ids = surface
    .borrow_mut()
    .claim_notices(&settings.selector);
  info!(
    count = ids.len(),
    display_ms = settings.display_ms,
    exit_ms = settings.exit_ms,
    "scheduling notices"
  );

  let animation = exit_animation(settings);
  for id in ids {
    tracker.track(id);

    let surface = surface.clone();
    let tracker = tracker.clone();
    let animation = animation.clone();
    let exit_ms = settings.exit_ms;
    let exit_scheduler = scheduler.clone();
    scheduler.schedule(
      settings.display_ms,
      Box::new(move || {
        let state = tracker.advance(id);
        debug!(%id, ?state, "notice leaving");
        if let Err(err) = surface
          .borrow_mut()
          .animate_notice(id, &animation)
        {
          warn!(%id, error = %err, "failed animating notice");
        }

        exit_scheduler.schedule(
          exit_ms,
          Box::new(move || {
            let state = tracker.advance(id);
            debug!(%id, ?state, "notice removed");
            if let Err(err) = surface
              .borrow_mut()
              .detach_notice(id)
            {
              warn!(%id, error = %err, "failed detaching notice");
            }
          })
        );
      })
    );
  }

  tracker
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use chrono::NaiveDate;

  use super::{
    NoticeState,
    exit_animation,
    keyframes_css,
    schedule_notices
  };
  use crate::config::NoticeSettings;
  use crate::scheduler::ManualScheduler;
  use crate::surface::MemorySurface;

  fn surface_with_notices(
    count: usize
  ) -> Rc<RefCell<MemorySurface>> {
    let mut surface = MemorySurface::new(
      NaiveDate::from_ymd_opt(2025, 6, 1)
        .expect("valid date")
    );
    for _ in 0..count {
      surface.add_notice(".flash-message");
    }
    Rc::new(RefCell::new(surface))
  }

  #[test]
  fn states_only_move_forward() {
    assert_eq!(
      NoticeState::Visible.next(),
      NoticeState::AnimatingOut
    );
    assert_eq!(
      NoticeState::AnimatingOut.next(),
      NoticeState::Removed
    );
    assert_eq!(
      NoticeState::Removed.next(),
      NoticeState::Removed
    );
  }

  #[test]
  fn notice_walks_through_both_phases() {
    let surface = surface_with_notices(1);
    let scheduler = ManualScheduler::new();
    let settings = NoticeSettings::default();
    let tracker = schedule_notices(
      &surface, &scheduler, &settings
    );
    let id = surface.borrow().notice_ids()[0];

    scheduler.advance(4_999);
    assert_eq!(
      tracker.state(id),
      Some(NoticeState::Visible)
    );
    assert!(surface.borrow().notice_attached(id));
    assert!(
      surface
        .borrow()
        .notice_animation(id)
        .is_none()
    );

    scheduler.advance(1);
    assert_eq!(
      tracker.state(id),
      Some(NoticeState::AnimatingOut)
    );
    assert_eq!(
      surface
        .borrow()
        .notice_animation(id)
        .map(str::to_string),
      Some(exit_animation(&settings))
    );
    assert!(surface.borrow().notice_attached(id));

    scheduler.advance(299);
    assert!(surface.borrow().notice_attached(id));

    scheduler.advance(1);
    assert_eq!(
      tracker.state(id),
      Some(NoticeState::Removed)
    );
    assert!(!surface.borrow().notice_attached(id));
    assert_eq!(scheduler.now_ms(), 5_300);
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn notices_are_independent() {
    let surface = surface_with_notices(3);
    let scheduler = ManualScheduler::new();
    let tracker = schedule_notices(
      &surface,
      &scheduler,
      &NoticeSettings::default()
    );
    assert_eq!(tracker.len(), 3);

    let ids = surface.borrow().notice_ids();

    scheduler.advance(5_000);
    assert!(ids.iter().all(|id| {
      tracker.state(*id)
        == Some(NoticeState::AnimatingOut)
    }));
    scheduler.advance(300);
    assert!(ids.iter().all(|id| {
      tracker.state(*id)
        == Some(NoticeState::Removed)
    }));
  }

  #[test]
  fn late_notices_are_ignored() {
    let surface = surface_with_notices(1);
    let scheduler = ManualScheduler::new();
    let tracker = schedule_notices(
      &surface,
      &scheduler,
      &NoticeSettings::default()
    );
    let late = surface
      .borrow_mut()
      .add_notice(".flash-message");

    scheduler.run_until_idle();
    assert!(tracker.state(late).is_none());
    assert!(surface.borrow().notice_attached(late));
  }

  #[test]
  fn keyframes_name_the_animation() {
    let css =
      keyframes_css(&NoticeSettings::default());
    assert!(css.starts_with("@keyframes slideOut {"));
    assert!(css.contains("translateX(20px)"));
    assert_eq!(
      exit_animation(&NoticeSettings::default()),
      "slideOut 300ms ease forwards"
    );
  }
}
