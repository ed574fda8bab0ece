//! Client-side orchestration: retry policy and the calendar client.

pub mod calendar;
pub mod retry;

pub use calendar::CalendarClient;
pub use retry::RetryConfig;
