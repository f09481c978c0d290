pub mod config;
pub mod datetime;
pub mod filter;
pub mod guard;
pub mod money;
pub mod notice;
pub mod page;
pub mod room;
pub mod scheduler;
pub mod summary;
pub mod surface;

pub use config::Config;
pub use page::{
  Bindings,
  BookingPage
};
pub use scheduler::{
  ManualScheduler,
  Scheduler
};
pub use summary::{
  BookingSummary,
  SummaryOutcome
};
pub use surface::{
  Display,
  MemorySurface,
  UiSurface
};
