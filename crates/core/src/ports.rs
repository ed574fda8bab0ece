//! Port traits the client layer drives.
//!
//! [`RemoteGateway`] is the transport seam: one method per remote operation,
//! each taking the principal to act on behalf of plus a request descriptor,
//! and returning the raw response envelope. Implementations own wire
//! serialization and credentials; they surface transport-level faults
//! through [`classify_transport_fault`] so the retry layer sees the same
//! error taxonomy as response-level failures.

use async_trait::async_trait;
use calbridge_domain::constants::INVALID_PRINCIPAL_FAULT_TEXT;
use calbridge_domain::{ClientError, Result};

use crate::requests::*;
use crate::responses::*;

/// Transport seam to the remote service.
///
/// The service is session-less: every call carries the principal it acts on
/// behalf of, and nothing is remembered between calls.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn find_item(&self, principal: &str, request: &FindItemRequest)
        -> Result<FindItemResponse>;

    async fn get_item(&self, principal: &str, request: &GetItemRequest) -> Result<GetItemResponse>;

    async fn create_item(
        &self,
        principal: &str,
        request: &CreateItemRequest,
    ) -> Result<CreateItemResponse>;

    async fn delete_item(
        &self,
        principal: &str,
        request: &DeleteItemRequest,
    ) -> Result<DeleteItemResponse>;

    async fn get_folder(
        &self,
        principal: &str,
        request: &GetFolderRequest,
    ) -> Result<GetFolderResponse>;

    async fn find_folder(
        &self,
        principal: &str,
        request: &FindFolderRequest,
    ) -> Result<FindFolderResponse>;

    async fn create_folder(
        &self,
        principal: &str,
        request: &CreateFolderRequest,
    ) -> Result<CreateFolderResponse>;

    async fn delete_folder(
        &self,
        principal: &str,
        request: &DeleteFolderRequest,
    ) -> Result<DeleteFolderResponse>;

    async fn resolve_names(
        &self,
        principal: &str,
        request: &ResolveNamesRequest,
    ) -> Result<ResolveNamesResponse>;

    async fn get_server_time_zones(
        &self,
        principal: &str,
        request: &GetServerTimeZonesRequest,
    ) -> Result<GetServerTimeZonesResponse>;
}

/// Maps an out-of-directory principal onto its canonical form.
///
/// Consulted when the service rejects a principal: the retry layer swaps in
/// the resolved identity and tries again.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns the canonical principal for `raw`, or `None` when the
    /// directory knows nothing better.
    async fn resolve(&self, raw: &str) -> Result<Option<String>>;
}

/// Classifies a transport-level fault message.
///
/// The service reports a rejected impersonation principal only as a fault
/// string, not as a response code, so gateways match on the text here.
pub fn classify_transport_fault(message: &str) -> ClientError {
    if message.contains(INVALID_PRINCIPAL_FAULT_TEXT) {
        ClientError::InvalidPrincipal(message.to_owned())
    } else {
        ClientError::transient(message.to_owned())
    }
}
