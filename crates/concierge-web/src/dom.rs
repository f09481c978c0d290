use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{
  NaiveDate,
  Utc
};
use chrono_tz::Tz;
use concierge_core::datetime::today_in;
use concierge_core::surface::{
  Display,
  NoticeId,
  SelectedOption,
  UiSurface
};
use uuid::Uuid;
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  Element,
  HtmlElement,
  HtmlInputElement,
  HtmlOptionElement,
  HtmlSelectElement
};

fn js_err(err: JsValue) -> anyhow::Error {
  anyhow!("dom call failed: {err:?}")
}

/// The live document behind the
/// `UiSurface` seam.
pub struct DomSurface {
  document: Document,
  timezone: Option<Tz>,
  notices:  HashMap<NoticeId, Element>
}

impl DomSurface {
  pub fn new(
    document: Document,
    timezone: Option<Tz>
  ) -> Self {
    Self {
      document,
      timezone,
      notices: HashMap::new()
    }
  }

  fn element(
    &self,
    id: &str
  ) -> Option<Element> {
    self.document.get_element_by_id(id)
  }

  fn require(
    &self,
    id: &str
  ) -> anyhow::Result<Element> {
    self
      .element(id)
      .ok_or_else(|| anyhow!("no element #{id}"))
  }

  fn query_all(
    &self,
    selector: &str
  ) -> Vec<Element> {
    let list = match self
      .document
      .query_selector_all(selector)
    {
      | Ok(list) => list,
      | Err(err) => {
        tracing::warn!(
          selector,
          error = ?err,
          "selector query failed"
        );
        return Vec::new();
      }
    };

    (0..list.length())
      .filter_map(|idx| list.item(idx))
      .filter_map(|node| {
        node.dyn_into::<Element>().ok()
      })
      .collect()
  }

  fn nth(
    &self,
    selector: &str,
    index: usize
  ) -> anyhow::Result<Element> {
    self
      .query_all(selector)
      .into_iter()
      .nth(index)
      .ok_or_else(|| {
        anyhow!(
          "no element {selector}[{index}]"
        )
      })
  }
}

fn set_style(
  element: &Element,
  property: &str,
  value: &str
) -> anyhow::Result<()> {
  let html = element
    .dyn_ref::<HtmlElement>()
    .ok_or_else(|| {
      anyhow!("element has no inline style")
    })?;
  html
    .style()
    .set_property(property, value)
    .map_err(js_err)
}

fn local_today() -> NaiveDate {
  let now = js_sys::Date::new_0();
  i32::try_from(now.get_full_year())
    .ok()
    .and_then(|year| {
      NaiveDate::from_ymd_opt(
        year,
        now.get_month() + 1,
        now.get_date()
      )
    })
    .unwrap_or_else(|| {
      Utc::now().date_naive()
    })
}

impl UiSurface for DomSurface {
  fn today(&self) -> NaiveDate {
    match &self.timezone {
      | Some(tz) => today_in(tz, Utc::now()),
      | None => local_today()
    }
  }

  fn has_element(
    &self,
    id: &str
  ) -> bool {
    self.element(id).is_some()
  }

  fn value(
    &self,
    id: &str
  ) -> Option<String> {
    let element = self.element(id)?;
    if let Some(input) =
      element.dyn_ref::<HtmlInputElement>()
    {
      return Some(input.value());
    }
    element
      .dyn_ref::<HtmlSelectElement>()
      .map(HtmlSelectElement::value)
  }

  fn set_value(
    &mut self,
    id: &str,
    value: &str
  ) -> anyhow::Result<()> {
    let element = self.require(id)?;
    let input = element
      .dyn_ref::<HtmlInputElement>()
      .ok_or_else(|| {
        anyhow!("#{id} is not an input")
      })?;
    input.set_value(value);
    Ok(())
  }

  fn set_attribute(
    &mut self,
    id: &str,
    name: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self
      .require(id)?
      .set_attribute(name, value)
      .map_err(js_err)
  }

  fn selected_option(
    &self,
    select_id: &str,
    attribute: &str
  ) -> Option<SelectedOption> {
    let element = self.element(select_id)?;
    let select =
      element.dyn_ref::<HtmlSelectElement>()?;
    let index =
      u32::try_from(select.selected_index())
        .ok()?;
    let option = select.item(index)?;

    let value = option
      .dyn_ref::<HtmlOptionElement>()
      .map(HtmlOptionElement::value)
      .unwrap_or_default();
    Some(SelectedOption {
      value,
      attribute: option
        .get_attribute(attribute)
    })
  }

  fn set_text(
    &mut self,
    id: &str,
    text: &str
  ) -> anyhow::Result<()> {
    self
      .require(id)?
      .set_text_content(Some(text));
    Ok(())
  }

  fn set_display(
    &mut self,
    id: &str,
    display: Display
  ) -> anyhow::Result<()> {
    set_style(
      &self.require(id)?,
      "display",
      display.css_value()
    )
  }

  fn query_attribute(
    &self,
    selector: &str,
    attribute: &str
  ) -> Vec<Option<String>> {
    self
      .query_all(selector)
      .iter()
      .map(|element| {
        element.get_attribute(attribute)
      })
      .collect()
  }

  fn has_class(
    &self,
    selector: &str,
    index: usize,
    class: &str
  ) -> bool {
    self
      .nth(selector, index)
      .is_ok_and(|element| {
        element.class_list().contains(class)
      })
  }

  fn set_class(
    &mut self,
    selector: &str,
    index: usize,
    class: &str,
    enabled: bool
  ) -> anyhow::Result<()> {
    self
      .nth(selector, index)?
      .class_list()
      .toggle_with_force(class, enabled)
      .map(|_| ())
      .map_err(js_err)
  }

  fn set_item_display(
    &mut self,
    selector: &str,
    index: usize,
    display: Display
  ) -> anyhow::Result<()> {
    set_style(
      &self.nth(selector, index)?,
      "display",
      display.css_value()
    )
  }

  fn claim_notices(
    &mut self,
    selector: &str
  ) -> Vec<NoticeId> {
    self
      .query_all(selector)
      .into_iter()
      .map(|element| {
        let id = Uuid::new_v4();
        self.notices.insert(id, element);
        id
      })
      .collect()
  }

  fn animate_notice(
    &mut self,
    id: NoticeId,
    animation: &str
  ) -> anyhow::Result<()> {
    match self.notices.get(&id) {
      | Some(element) => {
        set_style(
          element,
          "animation",
          animation
        )
      }
      | None => Ok(())
    }
  }

  fn detach_notice(
    &mut self,
    id: NoticeId
  ) -> anyhow::Result<()> {
    if let Some(element) =
      self.notices.remove(&id)
    {
      element.remove();
    }
    Ok(())
  }

  fn inject_style(
    &mut self,
    css: &str
  ) -> anyhow::Result<()> {
    let style = self
      .document
      .create_element("style")
      .map_err(js_err)?;
    style.set_text_content(Some(css));
    let head = self
      .document
      .head()
      .ok_or_else(|| {
        anyhow!("document has no <head>")
      })?;
    head
      .append_child(&style)
      .map(|_| ())
      .map_err(js_err)
  }
}
