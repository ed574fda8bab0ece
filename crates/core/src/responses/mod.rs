//! Response interpretation.
//!
//! [`envelope`] models the service's response framing: an outer batch of
//! per-operation messages, each carrying a class, a code, and an optional
//! payload. [`interpreter`] turns envelopes into domain values or a
//! [`calbridge_domain::ClientError`] the retry layer can act on.

pub mod envelope;
pub mod interpreter;

pub use envelope::*;
