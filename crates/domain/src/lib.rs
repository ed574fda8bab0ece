//! # calbridge Domain
//!
//! Value types and error taxonomy shared by every calbridge crate.
//!
//! This crate contains:
//! - Identity and range value types (`ItemId`, `FolderId`, `DateRange`, ...)
//! - The `ClientError` taxonomy and `Result` alias
//! - Protocol constants (throttling ceilings, retry defaults)
//!
//! ## Architecture
//! - No dependencies on other calbridge crates
//! - Only external dependencies allowed
//! - Pure data; no I/O

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
