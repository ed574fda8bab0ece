//! Identity, range, and payload value types
//!
//! These mirror the remote service's item model closely enough for request
//! construction and response interpretation; the full event-model conversion
//! lives outside this workspace.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ClientError, Result};

/// Half-open range of instants, `start < end` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range, rejecting anything where `start` is not strictly
    /// before `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(ClientError::invalid_argument(format!(
                "range start ({start}) must be strictly before end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Elapsed span of the range.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

/// Identity of a remote item. The change key is a concurrency token and is
/// not required for reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId {
    pub id: String,
    pub change_key: Option<String>,
}

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), change_key: None }
    }

    pub fn with_change_key(id: impl Into<String>, change_key: impl Into<String>) -> Self {
        Self { id: id.into(), change_key: Some(change_key.into()) }
    }
}

/// Concrete folder identity as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderRef {
    pub id: String,
    pub change_key: Option<String>,
}

impl FolderRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), change_key: None }
    }
}

/// Well-known folders addressable by name instead of id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DistinguishedFolder {
    Calendar,
    Contacts,
    DeletedItems,
    Inbox,
    SearchFolders,
    Tasks,
}

/// Folder identity: exactly one of a well-known name or a concrete id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FolderId {
    Distinguished(DistinguishedFolder),
    Concrete(FolderRef),
}

impl FolderId {
    pub fn calendar() -> Self {
        Self::Distinguished(DistinguishedFolder::Calendar)
    }

    pub fn concrete(id: impl Into<String>) -> Self {
        Self::Concrete(FolderRef::new(id))
    }
}

/// Offset-based paging cursor returned by indexed-page finds.
///
/// Created at offset 0, replaced by the value each page reports, discarded
/// once `includes_last` is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub offset: u32,
    pub includes_last: bool,
}

impl PageCursor {
    pub fn first() -> Self {
        Self { offset: 0, includes_last: false }
    }
}

/// Calendar item as fetched by get-items (simplified representation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    pub item_id: ItemId,
    pub subject: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl CalendarItem {
    pub fn new(item_id: ItemId) -> Self {
        Self { item_id, subject: None, start: None, end: None, location: None }
    }
}

/// Folder as fetched by get-folder or find-folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolder {
    pub folder_id: FolderRef,
    pub display_name: Option<String>,
    pub kind: FolderKind,
}

/// Concrete folder class reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FolderKind {
    Calendar,
    Tasks,
    Mail,
    Search,
    Other,
}

/// Server-side time zone definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeZoneDefinition {
    pub id: String,
    pub display_name: Option<String>,
}
