//! Request construction.
//!
//! [`descriptors`] models the operations the remote service accepts as plain
//! data. [`factory`] builds those descriptors with the conventions the rest
//! of the client relies on: identifier-only shapes for id sweeps, ascending
//! item-id sort, page sizes clamped to the service count limit, and the
//! primary calendar folder as the default search target.

pub mod descriptors;
pub mod factory;

pub use descriptors::*;
pub use factory::RequestFactory;
