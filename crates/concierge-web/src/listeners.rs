use std::rc::Rc;

use concierge_core::{
  Bindings,
  BookingPage
};
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{
  Document,
  Element
};

use crate::dom::DomSurface;
use crate::timers::GlooScheduler;

pub type Page =
  BookingPage<DomSurface, GlooScheduler>;

fn on_change(
  document: &Document,
  id: &str,
  handler: impl Fn() + 'static
) {
  let Some(element) =
    document.get_element_by_id(id)
  else {
    return;
  };
  EventListener::new(
    &element,
    "change",
    move |_| handler()
  )
  .forget();
}

fn triggers(
  document: &Document,
  selector: &str
) -> Vec<Element> {
  let Ok(list) =
    document.query_selector_all(selector)
  else {
    return Vec::new();
  };
  (0..list.length())
    .filter_map(|idx| list.item(idx))
    .filter_map(|node| {
      node.dyn_into::<Element>().ok()
    })
    .collect()
}

/// Wires page events to the booking page
/// handlers. Listeners live for the page
/// lifetime.
pub fn register(
  document: &Document,
  page: &Rc<Page>,
  bindings: &Bindings
) {
  let ids = page.config().booking.clone();

  if bindings.check_in {
    let page = page.clone();
    on_change(document, &ids.check_in, move || {
      let (guarded, summary) =
        page.on_check_in_change();
      tracing::debug!(
        ?guarded,
        ?summary,
        "check-in changed"
      );
    });
  }

  if bindings.check_out {
    let page = page.clone();
    on_change(document, &ids.check_out, move || {
      let summary = page.on_check_out_change();
      tracing::debug!(?summary, "check-out changed");
    });
  }

  if bindings.room_select {
    let page = page.clone();
    on_change(document, &ids.room_select, move || {
      let summary = page.on_room_change();
      tracing::debug!(?summary, "room changed");
    });
  }

  let selector =
    &page.config().filter.triggers;
  for (index, trigger) in triggers(document, selector)
    .into_iter()
    .take(bindings.filter_triggers)
    .enumerate()
  {
    let page = page.clone();
    EventListener::new(
      &trigger,
      "click",
      move |_| {
        if let Some(report) =
          page.on_filter_click(index)
        {
          tracing::debug!(
            tag = ?report.tag,
            "filter applied"
          );
        }
      }
    )
    .forget();
  }
}
