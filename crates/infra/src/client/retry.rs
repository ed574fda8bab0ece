//! Retry policy: depth accounting, backoff arithmetic, and the decision
//! table mapping failure kinds onto recovery steps.

use std::time::Duration;

use calbridge_domain::constants::{
    DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRY_DEPTH, MAX_BACKOFF_EXPONENT,
};
use calbridge_domain::{ClientError, ErrorKind, Result};

/// Upper bound on a configurable retry depth. Anything deeper than this is a
/// misconfiguration, not persistence.
const MAX_CONFIGURABLE_DEPTH: u32 = 64;

/// Bounded-depth retry policy with exponential backoff.
///
/// Depth counts every failed attempt along one recovery path, including the
/// splits a range bisection spawns, so a pathological range cannot recurse
/// forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    max_depth: u32,
    backoff_base: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_RETRY_DEPTH, backoff_base: DEFAULT_BACKOFF_BASE }
    }
}

impl RetryConfig {
    /// Creates a policy with a custom depth budget and backoff base.
    ///
    /// A zero base is allowed, it makes retries immediate, which tests rely
    /// on. Depths beyond [`MAX_CONFIGURABLE_DEPTH`] are rejected.
    pub fn custom(max_depth: u32, backoff_base: Duration) -> Result<Self> {
        if max_depth > MAX_CONFIGURABLE_DEPTH {
            return Err(ClientError::invalid_argument(format!(
                "max retry depth {max_depth} exceeds the allowed maximum {MAX_CONFIGURABLE_DEPTH}"
            )));
        }
        Ok(Self { max_depth, backoff_base })
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Backoff before the attempt at `depth`: `base * 2^depth`, with the
    /// exponent capped so the arithmetic cannot overflow.
    pub fn backoff_delay(&self, depth: u32) -> Duration {
        let exponent = depth.min(MAX_BACKOFF_EXPONENT);
        let base_ms = self.backoff_base.as_millis() as u64;
        Duration::from_millis(base_ms.saturating_mul(1u64 << exponent))
    }
}

/// Mutable state of one logical operation's recovery.
#[derive(Debug, Clone)]
pub(crate) struct RetryContext {
    /// Principal the next attempt acts on behalf of. Swapped in place when a
    /// rejected principal resolves to a better identity.
    pub(crate) principal: String,
    /// Failed attempts so far, shared across bisection branches.
    pub(crate) depth: u32,
    pub(crate) last_kind: Option<ErrorKind>,
}

impl RetryContext {
    pub(crate) fn new(principal: &str) -> Self {
        Self { principal: principal.to_owned(), depth: 0, last_kind: None }
    }

    /// Records a failure and reports whether the depth budget still allows
    /// another attempt.
    pub(crate) fn record_failure(&mut self, kind: ErrorKind, max_depth: u32) -> bool {
        self.depth += 1;
        self.last_kind = Some(kind);
        self.depth <= max_depth
    }
}

/// Builds the terminal error for an exhausted depth budget.
pub(crate) fn exhausted(operation: &str, ctx: &RetryContext) -> ClientError {
    ClientError::RetriesExhausted {
        operation: operation.to_owned(),
        attempts: ctx.depth,
        last_kind: ctx.last_kind.unwrap_or(ErrorKind::Transient),
    }
}

/// What the orchestrator does about one classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecoveryStep {
    /// Surface the error as-is. No attempt is retried.
    Fatal,
    /// Sleep the backoff delay, then retry the same request.
    Backoff,
    /// Ask the identity resolver for a better principal, then retry.
    Reresolve,
    /// Bisect the date range and query both halves.
    Split,
}

/// The decision table.
///
/// `splittable` is true only for date-range finds, the one shape of request
/// where a count-limit refusal can be routed around by bisection.
pub(crate) fn decide(kind: ErrorKind, splittable: bool) -> RecoveryStep {
    match kind {
        ErrorKind::InvalidArgument
        | ErrorKind::Timeout
        | ErrorKind::CannotDelete
        | ErrorKind::ItemNotFound
        | ErrorKind::RetriesExhausted => RecoveryStep::Fatal,
        ErrorKind::InvalidPrincipal => RecoveryStep::Reresolve,
        ErrorKind::ExceededCountLimit if splittable => RecoveryStep::Split,
        ErrorKind::ExceededCountLimit => RecoveryStep::Fatal,
        ErrorKind::Transient => RecoveryStep::Backoff,
    }
}
