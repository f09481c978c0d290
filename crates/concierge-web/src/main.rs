mod dom;
mod listeners;
mod timers;

use std::cell::RefCell;
use std::rc::Rc;

use concierge_core::{
  BookingPage,
  Config
};
use gloo::console::log;
use gloo::events::EventListener;
use web_sys::Document;

use crate::dom::DomSurface;
use crate::timers::GlooScheduler;

const CONFIG_ELEMENT_ID: &str =
  "concierge-config";

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting concierge page layer"
  );

  let Some(document) = web_sys::window()
    .and_then(|window| window.document())
  else {
    tracing::error!("no document to enhance");
    return;
  };

  if document.ready_state() == "loading" {
    let ready = document.clone();
    EventListener::once(
      &document,
      "DOMContentLoaded",
      move |_| start(&ready)
    )
    .forget();
  } else {
    start(&document);
  }
}

fn start(document: &Document) {
  let raw = document
    .get_element_by_id(CONFIG_ELEMENT_ID)
    .and_then(|element| {
      element.text_content()
    });
  let config = Config::load(raw.as_deref());

  let surface = DomSurface::new(
    document.clone(),
    config.resolved_timezone()
  );
  let page = Rc::new(BookingPage::new(
    config,
    Rc::new(RefCell::new(surface)),
    GlooScheduler
  ));

  let bindings = page.boot();
  listeners::register(
    document, &page, &bindings
  );

  log!(format!(
    "[concierge] ready: {} filter \
     triggers, {} notices",
    bindings.filter_triggers,
    bindings.notices
  ));
}
