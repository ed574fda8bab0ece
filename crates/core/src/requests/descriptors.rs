//! Data descriptions of remote operations.
//!
//! Each request is a plain struct the gateway serializes onto the wire.
//! Construction goes through [`crate::requests::RequestFactory`], which owns
//! the validation and defaulting rules; the fields here stay public so the
//! gateway and tests can inspect what was built.

use calbridge_domain::{CalendarItem, DateRange, FolderId, FolderKind, ItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much of each item or folder the response should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Identifiers only. Used for sweeps that feed later batched fetches.
    IdOnly,
    /// The service's default property set.
    Default,
    /// Every property the service knows about.
    AllProperties,
}

/// Search depth for item finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemTraversal {
    Shallow,
    SoftDeleted,
    Associated,
}

/// Search depth for folder finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderTraversal {
    Shallow,
    Deep,
    SoftDeleted,
}

/// What deletion means for the targeted objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposal {
    HardDelete,
    SoftDelete,
    MoveToDeletedItems,
}

/// Whether the service notifies meeting participants of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingNotification {
    SendToNone,
    SendOnlyToAll,
    SendToAllAndSaveCopy,
}

/// Property paths the client sorts and filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldUri {
    ItemId,
    CalendarStart,
    CalendarEnd,
    FolderDisplayName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: FieldUri,
    pub direction: SortDirection,
}

/// A filter expression evaluated by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Restriction {
    And(Vec<Restriction>),
    IsGreaterThanOrEqualTo { field: FieldUri, value: DateTime<Utc> },
    IsLessThanOrEqualTo { field: FieldUri, value: DateTime<Utc> },
}

/// Offset-based paging over a sorted listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPageView {
    /// Offset from the start of the listing, in items.
    pub offset: u32,
    /// Maximum number of entries this page may carry.
    pub max_entries: u32,
}

/// Expansion of recurrences over a date range, capped at `max_entries`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarView {
    pub range: DateRange,
    pub max_entries: u32,
}

/// The two paging disciplines a find supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemView {
    Indexed(IndexedPageView),
    Calendar(CalendarView),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindItemRequest {
    pub view: ItemView,
    pub shape: ShapeKind,
    pub traversal: ItemTraversal,
    pub restriction: Option<Restriction>,
    pub sort: Vec<SortOrder>,
    pub parent_folders: Vec<FolderId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetItemRequest {
    pub item_ids: Vec<ItemId>,
    pub shape: ShapeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub items: Vec<CalendarItem>,
    pub target_folder: FolderId,
    pub notification: MeetingNotification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteItemRequest {
    pub item_ids: Vec<ItemId>,
    pub disposal: Disposal,
    pub notification: MeetingNotification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetFolderRequest {
    pub folder_ids: Vec<FolderId>,
    pub shape: ShapeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindFolderRequest {
    pub parent_folders: Vec<FolderId>,
    pub shape: ShapeKind,
    pub traversal: FolderTraversal,
    pub paging: IndexedPageView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub parent_folder: FolderId,
    pub display_name: String,
    pub kind: FolderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFolderRequest {
    pub folder_ids: Vec<FolderId>,
    pub disposal: Disposal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveNamesRequest {
    /// The alias to resolve, usually prefixed with the `smtp:` routing hint.
    pub unresolved_entry: String,
    pub return_full_contact_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetServerTimeZonesRequest {
    /// Specific time-zone identifiers to fetch; empty means all of them.
    pub ids: Vec<String>,
    pub full_time_zone_data: bool,
}
