use tracing::{
  debug,
  trace,
  warn
};

use crate::config::FilterSelectors;
use crate::surface::{
  Display,
  UiSurface
};

/// The tag a filter trigger applies.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum FilterTag {
  /// The sentinel: no restriction.
  All,
  Status(String),
  /// The trigger carries no tag
  /// attribute.
  Untagged
}

impl FilterTag {
  #[must_use]
  pub fn from_attribute(
    raw: Option<&str>,
    all_sentinel: &str
  ) -> Self {
    match raw {
      | Some(tag) if tag == all_sentinel => {
        FilterTag::All
      }
      | Some(tag) => {
        FilterTag::Status(tag.to_string())
      }
      | None => FilterTag::Untagged
    }
  }

  /// Whether an item with `status` stays
  /// visible under this tag.
  #[must_use]
  pub fn admits(
    &self,
    status: Option<&str>
  ) -> bool {
    match self {
      | FilterTag::All => true,
      | FilterTag::Status(tag) => {
        status == Some(tag.as_str())
      }
      | FilterTag::Untagged => {
        status.is_none()
      }
    }
  }
}

/// Item visibility under `tag`, one entry
/// per status.
#[must_use]
pub fn render_visibility(
  tag: &FilterTag,
  statuses: &[Option<String>]
) -> Vec<Display> {
  statuses
    .iter()
    .map(|status| {
      Display::shown(
        tag.admits(status.as_deref())
      )
    })
    .collect()
}

/// Exclusive selection over the filter
/// triggers. At most one trigger is
/// active.
#[derive(Debug, Clone)]
pub struct FilterController {
  triggers: Vec<FilterTag>,
  active:   Option<usize>
}

impl FilterController {
  #[must_use]
  pub fn new(
    triggers: Vec<FilterTag>,
    active: Option<usize>
  ) -> Self {
    let active = active
      .filter(|idx| *idx < triggers.len());
    Self {
      triggers,
      active
    }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.triggers.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.triggers.is_empty()
  }

  #[must_use]
  pub fn active_index(
    &self
  ) -> Option<usize> {
    self.active
  }

  #[must_use]
  pub fn active(
    &self
  ) -> Option<&FilterTag> {
    self
      .active
      .and_then(|idx| self.triggers.get(idx))
  }

  /// Makes `index` the only active
  /// trigger. Out-of-range indexes leave
  /// the state unchanged.
  pub fn select(
    &mut self,
    index: usize
  ) -> Option<&FilterTag> {
    if index >= self.triggers.len() {
      return None;
    }
    self.active = Some(index);
    self.triggers.get(index)
  }
}

/// Counts after applying a filter to one
/// collection.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct CollectionReport {
  pub selector: String,
  pub shown:    usize,
  pub hidden:   usize
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct FilterReport {
  pub tag:         FilterTag,
  pub collections: Vec<CollectionReport>
}

/// Filter triggers wired to the card and
/// row collections of the page.
#[derive(Debug, Clone)]
pub struct ListFilter {
  selectors:   FilterSelectors,
  controller:  FilterController,
  collections: Vec<String>
}

impl ListFilter {
  /// Reads the triggers, the initially
  /// active one, and which collections
  /// the page has. Empty collections are
  /// never touched afterwards.
  #[tracing::instrument(skip_all)]
  pub fn install<S: UiSurface>(
    surface: &S,
    selectors: &FilterSelectors
  ) -> Self {
    let triggers: Vec<FilterTag> = surface
      .query_attribute(
        &selectors.triggers,
        &selectors.tag_attribute
      )
      .into_iter()
      .map(|raw| {
        FilterTag::from_attribute(
          raw.as_deref(),
          &selectors.all_sentinel
        )
      })
      .collect();

    let active = (0..triggers.len())
      .find(|idx| {
        surface.has_class(
          &selectors.triggers,
          *idx,
          &selectors.active_class
        )
      });

    let collections = [
      &selectors.cards,
      &selectors.rows
    ]
    .into_iter()
    .filter(|selector| {
      let present = !surface
        .query_attribute(
          selector,
          &selectors.status_attribute
        )
        .is_empty();
      if !present {
        debug!(
          selector = %selector,
          "collection empty; filter will skip it"
        );
      }
      present
    })
    .cloned()
    .collect();

    let controller =
      FilterController::new(triggers, active);
    if controller.is_empty() {
      debug!("no filter triggers on page");
    } else {
      debug!(
        triggers = controller.len(),
        active = ?controller.active(),
        "installed list filter"
      );
    }
    Self {
      selectors: selectors.clone(),
      controller,
      collections
    }
  }

  #[must_use]
  pub fn controller(
    &self
  ) -> &FilterController {
    &self.controller
  }

  /// Handles a click on trigger `index`.
  #[tracing::instrument(skip(
    self, surface
  ))]
  pub fn on_trigger_click<S: UiSurface>(
    &mut self,
    surface: &mut S,
    index: usize
  ) -> Option<FilterReport> {
    let Some(tag) =
      self.controller.select(index).cloned()
    else {
      warn!(
        index,
        "click on unknown filter trigger"
      );
      return None;
    };

    for idx in 0..self.controller.len() {
      if let Err(err) = surface.set_class(
        &self.selectors.triggers,
        idx,
        &self.selectors.active_class,
        idx == index
      ) {
        warn!(
          index = idx,
          error = %err,
          "failed toggling trigger class"
        );
      }
    }

    let collections = self
      .collections
      .iter()
      .map(|selector| {
        apply_to_collection(
          surface,
          selector,
          &self.selectors.status_attribute,
          &tag
        )
      })
      .collect();

    let report = FilterReport {
      tag,
      collections
    };
    debug!(?report, "filter applied");
    Some(report)
  }
}

fn apply_to_collection<S: UiSurface>(
  surface: &mut S,
  selector: &str,
  status_attribute: &str,
  tag: &FilterTag
) -> CollectionReport {
  let statuses = surface
    .query_attribute(selector, status_attribute);
  let displays =
    render_visibility(tag, &statuses);

  let mut shown = 0;
  for (idx, display) in
    displays.iter().enumerate()
  {
    if *display == Display::None {
      trace!(selector, index = idx, "hiding item");
    } else {
      shown += 1;
    }
    if let Err(err) = surface
      .set_item_display(selector, idx, *display)
    {
      warn!(
        selector,
        index = idx,
        error = %err,
        "failed toggling item"
      );
    }
  }

  CollectionReport {
    selector: selector.to_string(),
    shown,
    hidden: displays.len() - shown
  }
}

#[cfg(test)]
mod tests {
  use super::{
    FilterController,
    FilterTag,
    render_visibility
  };
  use crate::surface::Display;

  fn statuses(
    raw: &[Option<&str>]
  ) -> Vec<Option<String>> {
    raw
      .iter()
      .map(|s| s.map(str::to_string))
      .collect()
  }

  #[test]
  fn tags_parse_against_sentinel() {
    assert_eq!(
      FilterTag::from_attribute(
        Some("all"),
        "all"
      ),
      FilterTag::All
    );
    assert_eq!(
      FilterTag::from_attribute(
        Some("vacant"),
        "all"
      ),
      FilterTag::Status(
        "vacant".to_string()
      )
    );
    assert_eq!(
      FilterTag::from_attribute(None, "all"),
      FilterTag::Untagged
    );
  }

  #[test]
  fn status_tag_shows_only_matches() {
    let items = statuses(&[
      Some("vacant"),
      Some("occupied"),
      Some("vacant"),
      None
    ]);
    assert_eq!(
      render_visibility(
        &FilterTag::Status(
          "vacant".to_string()
        ),
        &items
      ),
      vec![
        Display::Default,
        Display::None,
        Display::Default,
        Display::None
      ]
    );
  }

  #[test]
  fn all_shows_everything() {
    let items = statuses(&[
      Some("occupied"),
      None,
      Some("maintenance")
    ]);
    assert!(
      render_visibility(
        &FilterTag::All,
        &items
      )
      .iter()
      .all(|d| *d == Display::Default)
    );
  }

  #[test]
  fn untagged_trigger_matches_bare_items() {
    let items =
      statuses(&[Some("vacant"), None]);
    assert_eq!(
      render_visibility(
        &FilterTag::Untagged,
        &items
      ),
      vec![Display::None, Display::Default]
    );
  }

  #[test]
  fn selection_is_exclusive() {
    let mut controller =
      FilterController::new(
        vec![
          FilterTag::All,
          FilterTag::Status(
            "vacant".to_string()
          ),
        ],
        Some(0)
      );
    assert_eq!(
      controller.active(),
      Some(&FilterTag::All)
    );

    controller.select(1);
    assert_eq!(
      controller.active_index(),
      Some(1)
    );

    assert!(controller.select(7).is_none());
    assert_eq!(
      controller.active_index(),
      Some(1)
    );
  }

  #[test]
  fn out_of_range_initial_state_is_dropped()
  {
    let controller = FilterController::new(
      vec![FilterTag::All],
      Some(3)
    );
    assert!(controller.active().is_none());
  }
}
