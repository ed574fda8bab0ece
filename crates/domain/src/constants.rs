//! Protocol ceilings and retry defaults

use std::time::Duration;

/// Hard ceiling the hosted service's throttling policy places on the number
/// of results one find call may return. Page sizes above this have no effect.
pub const FIND_COUNT_LIMIT: u32 = 1000;

/// Default page size for indexed-page find requests.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Maximum number of items deleted per delete-items call when draining a
/// folder. Larger batches trip the service's throttling policy.
pub const MAX_DELETE_BATCH: usize = 500;

/// Widest span a single date-range find is allowed to cover (~10 years).
pub const MAX_RANGE_SPAN_DAYS: i64 = 3660;

/// Default ceiling on retry/bisection depth for one logical operation.
pub const DEFAULT_MAX_RETRY_DEPTH: u32 = 10;

/// Base delay for exponential backoff: `2^depth * base`.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);

/// Cap on the backoff exponent to prevent overflow on pathological depths.
pub const MAX_BACKOFF_EXPONENT: u32 = 30;

/// Fault text the remote service produces when the impersonation principal
/// is unknown. Transport faults carrying it are remapped to
/// `ClientError::InvalidPrincipal` at the gateway boundary.
pub const INVALID_PRINCIPAL_FAULT_TEXT: &str = "The impersonation principal name is invalid.";
