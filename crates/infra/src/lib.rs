//! # calbridge Infra
//!
//! The orchestration layer over the `core` ports: a calendar client that
//! rebuilds requests on every attempt, retries transient failures with
//! exponential backoff, re-resolves rejected principals, bisects date ranges
//! the service refuses as too large, and walks offset-paged listings to
//! completion.

pub mod client;

pub use client::{CalendarClient, RetryConfig};
