use concierge_core::scheduler::{
  Scheduler,
  Task
};
use gloo::timers::future::TimeoutFuture;

/// Browser timers: each task waits on its
/// own timeout future.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
  fn schedule(
    &self,
    delay_ms: u32,
    task: Task
  ) {
    wasm_bindgen_futures::spawn_local(
      async move {
        TimeoutFuture::new(delay_ms).await;
        task();
      }
    );
  }
}
