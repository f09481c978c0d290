//! The page as the rest of the crate sees
//! it.
//!
//! Elements are addressed the way the
//! markup addresses them: single controls
//! by id, collections by selector plus
//! position. Notices are claimed once and
//! then addressed by handle because they
//! leave the document while timers still
//! refer to them.

use std::collections::{
  BTreeMap,
  BTreeSet
};

use anyhow::anyhow;
use chrono::NaiveDate;
use uuid::Uuid;

pub type NoticeId = Uuid;

/// CSS `display` values this layer
/// writes.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum Display {
  /// Clears the inline value so the
  /// stylesheet decides.
  #[default]
  Default,
  Block,
  None
}

impl Display {
  #[must_use]
  pub fn css_value(
    self
  ) -> &'static str {
    match self {
      | Display::Default => "",
      | Display::Block => "block",
      | Display::None => "none"
    }
  }

  #[must_use]
  pub fn shown(visible: bool) -> Self {
    if visible {
      Display::Default
    } else {
      Display::None
    }
  }
}

/// The currently selected `<option>` of
/// a select control.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct SelectedOption {
  pub value:     String,
  pub attribute: Option<String>
}

pub trait UiSurface {
  /// The host's current calendar date.
  fn today(&self) -> NaiveDate;

  fn has_element(
    &self,
    id: &str
  ) -> bool;

  /// Value of an input control; `None`
  /// when the control is absent.
  fn value(
    &self,
    id: &str
  ) -> Option<String>;

  fn set_value(
    &mut self,
    id: &str,
    value: &str
  ) -> anyhow::Result<()>;

  fn set_attribute(
    &mut self,
    id: &str,
    name: &str,
    value: &str
  ) -> anyhow::Result<()>;

  /// The selected option of a select
  /// control together with one of its
  /// attributes.
  fn selected_option(
    &self,
    select_id: &str,
    attribute: &str
  ) -> Option<SelectedOption>;

  fn set_text(
    &mut self,
    id: &str,
    text: &str
  ) -> anyhow::Result<()>;

  fn set_display(
    &mut self,
    id: &str,
    display: Display
  ) -> anyhow::Result<()>;

  /// One entry per element matching
  /// `selector`, in document order.
  fn query_attribute(
    &self,
    selector: &str,
    attribute: &str
  ) -> Vec<Option<String>>;

  fn has_class(
    &self,
    selector: &str,
    index: usize,
    class: &str
  ) -> bool;

  fn set_class(
    &mut self,
    selector: &str,
    index: usize,
    class: &str,
    enabled: bool
  ) -> anyhow::Result<()>;

  fn set_item_display(
    &mut self,
    selector: &str,
    index: usize,
    display: Display
  ) -> anyhow::Result<()>;

  /// Hands out a stable handle for every
  /// element currently matching
  /// `selector`.
  fn claim_notices(
    &mut self,
    selector: &str
  ) -> Vec<NoticeId>;

  fn animate_notice(
    &mut self,
    id: NoticeId,
    animation: &str
  ) -> anyhow::Result<()>;

  /// Detaches the notice. Detaching one
  /// that is already gone is a no-op.
  fn detach_notice(
    &mut self,
    id: NoticeId
  ) -> anyhow::Result<()>;

  fn inject_style(
    &mut self,
    css: &str
  ) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
struct MemoryElement {
  value:      String,
  text:       String,
  display:    Display,
  attributes: BTreeMap<String, String>,
  options:    Vec<MemoryOption>,
  selected:   Option<usize>
}

#[derive(Debug, Clone)]
struct MemoryOption {
  value:      String,
  attributes: BTreeMap<String, String>
}

#[derive(Debug, Clone, Default)]
struct MemoryItem {
  attributes: BTreeMap<String, String>,
  classes:    BTreeSet<String>,
  display:    Display
}

#[derive(Debug, Clone)]
struct MemoryNotice {
  id:        NoticeId,
  selector:  String,
  claimed:   bool,
  animation: Option<String>,
  attached:  bool
}

/// An in-memory page for driving the
/// crate without a browser.
#[derive(Debug, Clone)]
pub struct MemorySurface {
  today:       NaiveDate,
  elements:    BTreeMap<String, MemoryElement>,
  collections: BTreeMap<String, Vec<MemoryItem>>,
  notices:     Vec<MemoryNotice>,
  styles:      Vec<String>
}

impl MemorySurface {
  #[must_use]
  pub fn new(today: NaiveDate) -> Self {
    Self {
      today,
      elements: BTreeMap::new(),
      collections: BTreeMap::new(),
      notices: Vec::new(),
      styles: Vec::new()
    }
  }

  /// Adds an input (or any id-addressed
  /// element) with an initial value.
  #[must_use]
  pub fn with_input(
    mut self,
    id: &str,
    value: &str
  ) -> Self {
    self.elements.insert(
      id.to_string(),
      MemoryElement {
        value: value.to_string(),
        ..MemoryElement::default()
      }
    );
    self
  }

  #[must_use]
  pub fn with_element(
    self,
    id: &str
  ) -> Self {
    self.with_input(id, "")
  }

  /// Adds a select control. Each option
  /// is a value plus an optional
  /// `attribute` value.
  #[must_use]
  pub fn with_select(
    mut self,
    id: &str,
    attribute: &str,
    options: &[(&str, Option<&str>)],
    selected: Option<usize>
  ) -> Self {
    let options = options
      .iter()
      .map(|(value, attr)| {
        let mut attributes =
          BTreeMap::new();
        if let Some(attr) = attr {
          attributes.insert(
            attribute.to_string(),
            attr.to_string()
          );
        }
        MemoryOption {
          value: value.to_string(),
          attributes
        }
      })
      .collect();
    self.elements.insert(
      id.to_string(),
      MemoryElement {
        options,
        selected,
        ..MemoryElement::default()
      }
    );
    self
  }

  /// Appends an element to the
  /// collection matched by `selector`.
  #[must_use]
  pub fn with_item(
    mut self,
    selector: &str,
    attributes: &[(&str, &str)],
    classes: &[&str]
  ) -> Self {
    self
      .collections
      .entry(selector.to_string())
      .or_default()
      .push(MemoryItem {
        attributes: to_attributes(
          attributes
        ),
        classes: classes
          .iter()
          .map(|c| c.to_string())
          .collect(),
        display: Display::Default
      });
    self
  }

  #[must_use]
  pub fn with_notice(
    mut self,
    selector: &str
  ) -> Self {
    self.add_notice(selector);
    self
  }

  pub fn add_notice(
    &mut self,
    selector: &str
  ) -> NoticeId {
    let id = Uuid::new_v4();
    self.notices.push(MemoryNotice {
      id,
      selector: selector.to_string(),
      claimed: false,
      animation: None,
      attached: true
    });
    id
  }

  pub fn select_option(
    &mut self,
    id: &str,
    index: usize
  ) -> anyhow::Result<()> {
    let element = self
      .elements
      .get_mut(id)
      .ok_or_else(|| {
        anyhow!("no element #{id}")
      })?;
    if index >= element.options.len() {
      return Err(anyhow!(
        "#{id} has no option {index}"
      ));
    }
    element.selected = Some(index);
    Ok(())
  }

  /// Drops an id-addressed element, as
  /// if the markup never had it.
  pub fn remove_element(
    &mut self,
    id: &str
  ) {
    self.elements.remove(id);
  }

  #[must_use]
  pub fn attribute(
    &self,
    id: &str,
    name: &str
  ) -> Option<&str> {
    self
      .elements
      .get(id)?
      .attributes
      .get(name)
      .map(String::as_str)
  }

  #[must_use]
  pub fn text(
    &self,
    id: &str
  ) -> Option<&str> {
    self
      .elements
      .get(id)
      .map(|e| e.text.as_str())
  }

  #[must_use]
  pub fn display(
    &self,
    id: &str
  ) -> Option<Display> {
    self
      .elements
      .get(id)
      .map(|e| e.display)
  }

  #[must_use]
  pub fn item_display(
    &self,
    selector: &str,
    index: usize
  ) -> Option<Display> {
    self
      .collections
      .get(selector)?
      .get(index)
      .map(|item| item.display)
  }

  /// Display of every item matched by
  /// `selector`, in order.
  #[must_use]
  pub fn item_displays(
    &self,
    selector: &str
  ) -> Vec<Display> {
    self
      .collections
      .get(selector)
      .map(|items| {
        items
          .iter()
          .map(|item| item.display)
          .collect()
      })
      .unwrap_or_default()
  }

  #[must_use]
  pub fn notice_ids(&self) -> Vec<NoticeId> {
    self
      .notices
      .iter()
      .map(|n| n.id)
      .collect()
  }

  #[must_use]
  pub fn notice_attached(
    &self,
    id: NoticeId
  ) -> bool {
    self
      .notices
      .iter()
      .any(|n| n.id == id && n.attached)
  }

  #[must_use]
  pub fn notice_animation(
    &self,
    id: NoticeId
  ) -> Option<&str> {
    self
      .notices
      .iter()
      .find(|n| n.id == id)?
      .animation
      .as_deref()
  }

  #[must_use]
  pub fn styles(&self) -> &[String] {
    &self.styles
  }

  fn element_mut(
    &mut self,
    id: &str
  ) -> anyhow::Result<&mut MemoryElement>
  {
    self.elements.get_mut(id).ok_or_else(
      || anyhow!("no element #{id}")
    )
  }

  fn item_mut(
    &mut self,
    selector: &str,
    index: usize
  ) -> anyhow::Result<&mut MemoryItem> {
    self
      .collections
      .get_mut(selector)
      .and_then(|items| {
        items.get_mut(index)
      })
      .ok_or_else(|| {
        anyhow!(
          "no element {selector}[{index}]"
        )
      })
  }
}

impl UiSurface for MemorySurface {
  fn today(&self) -> NaiveDate {
    self.today
  }

  fn has_element(
    &self,
    id: &str
  ) -> bool {
    self.elements.contains_key(id)
  }

  fn value(
    &self,
    id: &str
  ) -> Option<String> {
    self
      .elements
      .get(id)
      .map(|e| e.value.clone())
  }

  fn set_value(
    &mut self,
    id: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self.element_mut(id)?.value =
      value.to_string();
    Ok(())
  }

  fn set_attribute(
    &mut self,
    id: &str,
    name: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self
      .element_mut(id)?
      .attributes
      .insert(
        name.to_string(),
        value.to_string()
      );
    Ok(())
  }

  fn selected_option(
    &self,
    select_id: &str,
    attribute: &str
  ) -> Option<SelectedOption> {
    let element =
      self.elements.get(select_id)?;
    let option = element
      .options
      .get(element.selected?)?;
    Some(SelectedOption {
      value:     option.value.clone(),
      attribute: option
        .attributes
        .get(attribute)
        .cloned()
    })
  }

  fn set_text(
    &mut self,
    id: &str,
    text: &str
  ) -> anyhow::Result<()> {
    self.element_mut(id)?.text =
      text.to_string();
    Ok(())
  }

  fn set_display(
    &mut self,
    id: &str,
    display: Display
  ) -> anyhow::Result<()> {
    self.element_mut(id)?.display =
      display;
    Ok(())
  }

  fn query_attribute(
    &self,
    selector: &str,
    attribute: &str
  ) -> Vec<Option<String>> {
    self
      .collections
      .get(selector)
      .map(|items| {
        items
          .iter()
          .map(|item| {
            item
              .attributes
              .get(attribute)
              .cloned()
          })
          .collect()
      })
      .unwrap_or_default()
  }

  fn has_class(
    &self,
    selector: &str,
    index: usize,
    class: &str
  ) -> bool {
    self
      .collections
      .get(selector)
      .and_then(|items| items.get(index))
      .is_some_and(|item| {
        item.classes.contains(class)
      })
  }

  fn set_class(
    &mut self,
    selector: &str,
    index: usize,
    class: &str,
    enabled: bool
  ) -> anyhow::Result<()> {
    let item =
      self.item_mut(selector, index)?;
    if enabled {
      item
        .classes
        .insert(class.to_string());
    } else {
      item.classes.remove(class);
    }
    Ok(())
  }

  fn set_item_display(
    &mut self,
    selector: &str,
    index: usize,
    display: Display
  ) -> anyhow::Result<()> {
    self
      .item_mut(selector, index)?
      .display = display;
    Ok(())
  }

  fn claim_notices(
    &mut self,
    selector: &str
  ) -> Vec<NoticeId> {
    self
      .notices
      .iter_mut()
      .filter(|n| {
        n.attached
          && !n.claimed
          && n.selector == selector
      })
      .map(|n| {
        n.claimed = true;
        n.id
      })
      .collect()
  }

  fn animate_notice(
    &mut self,
    id: NoticeId,
    animation: &str
  ) -> anyhow::Result<()> {
    if let Some(notice) = self
      .notices
      .iter_mut()
      .find(|n| n.id == id && n.attached)
    {
      notice.animation =
        Some(animation.to_string());
    }
    Ok(())
  }

  fn detach_notice(
    &mut self,
    id: NoticeId
  ) -> anyhow::Result<()> {
    if let Some(notice) = self
      .notices
      .iter_mut()
      .find(|n| n.id == id)
    {
      notice.attached = false;
    }
    Ok(())
  }

  fn inject_style(
    &mut self,
    css: &str
  ) -> anyhow::Result<()> {
    self.styles.push(css.to_string());
    Ok(())
  }
}

fn to_attributes(
  pairs: &[(&str, &str)]
) -> BTreeMap<String, String> {
  pairs
    .iter()
    .map(|(k, v)| {
      (k.to_string(), v.to_string())
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    Display,
    MemorySurface,
    UiSurface
  };

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1)
      .expect("valid date")
  }

  #[test]
  fn selected_option_reads_attribute() {
    let mut surface =
      MemorySurface::new(today())
        .with_select(
          "room_id",
          "data-price",
          &[
            ("", None),
            ("12", Some("150.00"))
          ],
          Some(0)
        );

    let first = surface
      .selected_option(
        "room_id",
        "data-price"
      )
      .expect("selected option");
    assert_eq!(first.value, "");
    assert_eq!(first.attribute, None);

    surface
      .select_option("room_id", 1)
      .expect("select second");
    let second = surface
      .selected_option(
        "room_id",
        "data-price"
      )
      .expect("selected option");
    assert_eq!(second.value, "12");
    assert_eq!(
      second.attribute.as_deref(),
      Some("150.00")
    );
    assert!(
      surface
        .select_option("room_id", 9)
        .is_err()
    );
  }

  #[test]
  fn missing_elements_report_errors() {
    let mut surface =
      MemorySurface::new(today());
    assert!(surface.value("nope").is_none());
    assert!(
      surface.set_value("nope", "x").is_err()
    );
    assert!(
      surface
        .set_item_display(
          ".room-card",
          0,
          Display::None
        )
        .is_err()
    );
  }

  #[test]
  fn notices_are_claimed_once() {
    let mut surface =
      MemorySurface::new(today())
        .with_notice(".flash-message")
        .with_notice(".flash-message")
        .with_notice(".other");

    let claimed = surface
      .claim_notices(".flash-message");
    assert_eq!(claimed.len(), 2);
    assert!(
      surface
        .claim_notices(".flash-message")
        .is_empty()
    );

    surface
      .detach_notice(claimed[0])
      .expect("detach");
    surface
      .detach_notice(claimed[0])
      .expect("detach twice");
    assert!(
      !surface.notice_attached(claimed[0])
    );
    assert!(
      surface.notice_attached(claimed[1])
    );
  }
}
