//! # calbridge Core
//!
//! Protocol logic for the remote calendar service: request descriptors and
//! their validating factory, the response envelope model and interpreter,
//! date-interval splitting, and the port traits the client layer drives.
//!
//! Everything in this crate is pure: no I/O, no clocks, no sleeping. The
//! `infra` crate owns dispatch, retry, and pagination on top of these pieces.

pub mod intervals;
pub mod ports;
pub mod requests;
pub mod responses;
