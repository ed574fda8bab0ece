//! Validating constructor for request descriptors.

use calbridge_domain::constants::{DEFAULT_PAGE_SIZE, FIND_COUNT_LIMIT};
use calbridge_domain::{
    CalendarItem, ClientError, DateRange, DistinguishedFolder, FolderId, FolderKind, FolderRef,
    ItemId, Result,
};
use tracing::warn;

use super::descriptors::*;

/// Builds request descriptors with the client's conventions baked in.
///
/// Id sweeps always sort ascending by item id so offset paging stays stable,
/// page sizes are clamped to the service count limit, and finds that name no
/// folder default to the principal's primary calendar.
#[derive(Debug, Clone)]
pub struct RequestFactory {
    page_size: u32,
}

impl Default for RequestFactory {
    fn default() -> Self {
        Self { page_size: DEFAULT_PAGE_SIZE }
    }
}

impl RequestFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with a custom page size for indexed finds.
    ///
    /// Rejects a zero page size; sizes above the service count limit are
    /// clamped down to it with a warning, since the service would truncate
    /// them anyway.
    pub fn with_page_size(page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(ClientError::invalid_argument("page size must be at least 1"));
        }
        let clamped = if page_size > FIND_COUNT_LIMIT {
            warn!(
                requested = page_size,
                limit = FIND_COUNT_LIMIT,
                "requested page size exceeds the service count limit, clamping"
            );
            FIND_COUNT_LIMIT
        } else {
            page_size
        };
        Ok(Self { page_size: clamped })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Calendar-view id sweep over `range`.
    ///
    /// Expands recurring items server-side. An empty folder set targets the
    /// principal's primary calendar.
    pub fn find_calendar_item_ids(&self, range: DateRange, folders: &[FolderId]) -> FindItemRequest {
        FindItemRequest {
            view: ItemView::Calendar(CalendarView { range, max_entries: FIND_COUNT_LIMIT }),
            shape: ShapeKind::IdOnly,
            traversal: ItemTraversal::Shallow,
            restriction: None,
            sort: vec![Self::item_id_ascending()],
            parent_folders: Self::folders_or_calendar(folders),
        }
    }

    /// Indexed id sweep restricted to items whose start and end fall inside
    /// `range`. Unlike the calendar view this does not expand recurrences.
    pub fn find_item_ids_in_range(&self, range: DateRange, folders: &[FolderId]) -> FindItemRequest {
        FindItemRequest {
            view: ItemView::Indexed(IndexedPageView { offset: 0, max_entries: self.page_size }),
            shape: ShapeKind::IdOnly,
            traversal: ItemTraversal::Shallow,
            restriction: Some(Restriction::And(vec![
                Restriction::IsGreaterThanOrEqualTo {
                    field: FieldUri::CalendarStart,
                    value: range.start(),
                },
                Restriction::IsLessThanOrEqualTo {
                    field: FieldUri::CalendarEnd,
                    value: range.end(),
                },
            ])),
            sort: vec![Self::item_id_ascending()],
            parent_folders: Self::folders_or_calendar(folders),
        }
    }

    /// One indexed id page at `offset`, unrestricted.
    pub fn find_item_id_page(&self, offset: u32, folders: &[FolderId]) -> Result<FindItemRequest> {
        if folders.is_empty() {
            return Err(ClientError::invalid_argument(
                "an indexed find requires at least one target folder",
            ));
        }
        Ok(FindItemRequest {
            view: ItemView::Indexed(IndexedPageView { offset, max_entries: self.page_size }),
            shape: ShapeKind::IdOnly,
            traversal: ItemTraversal::Shallow,
            restriction: None,
            sort: vec![Self::item_id_ascending()],
            parent_folders: folders.to_vec(),
        })
    }

    /// Batched fetch of full items by id.
    pub fn get_items(&self, item_ids: &[ItemId]) -> Result<GetItemRequest> {
        Self::require_item_ids(item_ids)?;
        Ok(GetItemRequest { item_ids: item_ids.to_vec(), shape: ShapeKind::AllProperties })
    }

    /// Identifier-only fetch, used to refresh change keys cheaply.
    pub fn get_item_ids(&self, item_ids: &[ItemId]) -> Result<GetItemRequest> {
        Self::require_item_ids(item_ids)?;
        Ok(GetItemRequest { item_ids: item_ids.to_vec(), shape: ShapeKind::IdOnly })
    }

    /// Creation of a single calendar item.
    ///
    /// A concrete target folder has its change key stripped, the service
    /// rejects stale keys on create. No folder means the primary calendar.
    pub fn create_calendar_item(
        &self,
        item: CalendarItem,
        folder: Option<&FolderRef>,
    ) -> CreateItemRequest {
        let target_folder = match folder {
            Some(folder) => FolderId::Concrete(FolderRef::new(folder.id.clone())),
            None => FolderId::calendar(),
        };
        CreateItemRequest {
            items: vec![item],
            target_folder,
            notification: MeetingNotification::SendToNone,
        }
    }

    /// Batched delete of calendar items. The notification mode is mandatory
    /// for calendar items, the service rejects deletes without one.
    pub fn delete_items(
        &self,
        item_ids: &[ItemId],
        disposal: Disposal,
        notification: MeetingNotification,
    ) -> Result<DeleteItemRequest> {
        Self::require_item_ids(item_ids)?;
        Ok(DeleteItemRequest { item_ids: item_ids.to_vec(), disposal, notification })
    }

    pub fn get_folder_by_ref(&self, folder: &FolderRef) -> GetFolderRequest {
        GetFolderRequest {
            folder_ids: vec![FolderId::Concrete(folder.clone())],
            shape: ShapeKind::AllProperties,
        }
    }

    pub fn get_folder_by_name(&self, name: DistinguishedFolder) -> GetFolderRequest {
        GetFolderRequest {
            folder_ids: vec![FolderId::Distinguished(name)],
            shape: ShapeKind::AllProperties,
        }
    }

    /// Deep listing of every folder under `parent`.
    pub fn find_folders(&self, parent: DistinguishedFolder) -> FindFolderRequest {
        FindFolderRequest {
            parent_folders: vec![FolderId::Distinguished(parent)],
            shape: ShapeKind::AllProperties,
            traversal: FolderTraversal::Deep,
            paging: IndexedPageView { offset: 0, max_entries: FIND_COUNT_LIMIT },
        }
    }

    pub fn create_calendar_folder(&self, display_name: &str) -> Result<CreateFolderRequest> {
        if display_name.trim().is_empty() {
            return Err(ClientError::invalid_argument("folder display name must not be blank"));
        }
        Ok(CreateFolderRequest {
            parent_folder: FolderId::calendar(),
            display_name: display_name.to_owned(),
            kind: FolderKind::Calendar,
        })
    }

    pub fn delete_folder(&self, folder: &FolderRef, disposal: Disposal) -> DeleteFolderRequest {
        DeleteFolderRequest { folder_ids: vec![FolderId::Concrete(folder.clone())], disposal }
    }

    /// Directory resolution of an alias into smtp addresses.
    pub fn resolve_names(&self, alias: &str) -> Result<ResolveNamesRequest> {
        if alias.trim().is_empty() {
            return Err(ClientError::invalid_argument("alias to resolve must not be blank"));
        }
        Ok(ResolveNamesRequest {
            unresolved_entry: alias.to_owned(),
            return_full_contact_data: false,
        })
    }

    pub fn get_server_time_zones(
        &self,
        time_zone_id: Option<&str>,
        full_time_zone_data: bool,
    ) -> GetServerTimeZonesRequest {
        GetServerTimeZonesRequest {
            ids: time_zone_id.map(str::to_owned).into_iter().collect(),
            full_time_zone_data,
        }
    }

    fn folders_or_calendar(folders: &[FolderId]) -> Vec<FolderId> {
        if folders.is_empty() {
            vec![FolderId::calendar()]
        } else {
            folders.to_vec()
        }
    }

    fn item_id_ascending() -> SortOrder {
        SortOrder { field: FieldUri::ItemId, direction: SortDirection::Ascending }
    }

    fn require_item_ids(item_ids: &[ItemId]) -> Result<()> {
        if item_ids.is_empty() {
            return Err(ClientError::invalid_argument("item id set must not be empty"));
        }
        Ok(())
    }
}
