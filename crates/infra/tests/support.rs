//! Shared scaffolding for the client integration tests: a scripted in-memory
//! gateway, a table-driven identity resolver, and tracing setup.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use calbridge_core::ports::{classify_transport_fault, IdentityResolver, RemoteGateway};
use calbridge_core::requests::*;
use calbridge_core::responses::*;
use calbridge_domain::{
    CalendarItem, ClientError, FolderKind, FolderRef, ItemId, RemoteFolder, Result,
    TimeZoneDefinition,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

/// `count` item ids spread evenly across `[start, end)`.
pub fn spread_items(start: DateTime<Utc>, end: DateTime<Utc>, count: usize) -> Vec<(DateTime<Utc>, ItemId)> {
    let span_ns = (end - start).num_nanoseconds().unwrap();
    (0..count)
        .map(|i| {
            let offset = Duration::nanoseconds(span_ns * i as i64 / count as i64);
            (start + offset, ItemId::new(format!("item-{i}")))
        })
        .collect()
}

#[derive(Default)]
struct GatewayState {
    /// Items served to calendar-view finds, keyed by their start instant.
    timed_items: Vec<(DateTime<Utc>, ItemId)>,
    /// Ids served to indexed finds, in listing order.
    listed_items: Vec<ItemId>,
    /// Calendar-view finds refuse once more than this many items match.
    count_limit: Option<usize>,
    /// Errors served by `find_item` before it starts answering, oldest first.
    scripted_find_failures: VecDeque<ClientError>,
    /// Error served by every `find_item` call, for exhaustion scenarios.
    permanent_find_failure: Option<ClientError>,
    /// When set, every other principal is rejected with the impersonation
    /// transport fault.
    accepted_principal: Option<String>,
    /// Principals whose mailbox has a primary calendar folder. Empty means
    /// everyone does.
    principals_with_calendar: Option<HashSet<String>>,
    /// Addresses the directory returns for any resolve-names call.
    directory_entries: Vec<String>,
    /// When set, every delete answers with a warning-class message instead
    /// of a clean success.
    delete_warning: Option<ResponseCode>,
    calendar_folders: Vec<RemoteFolder>,
    deleted_folders: Vec<String>,
    delete_batches: Vec<usize>,
    principals_seen: Vec<String>,
    find_item_calls: u32,
    get_item_calls: u32,
    created_items: u32,
}

/// In-memory gateway whose behavior each test scripts up front.
#[derive(Default)]
pub struct ScriptedGateway {
    state: Mutex<GatewayState>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timed_items(self, items: Vec<(DateTime<Utc>, ItemId)>) -> Self {
        self.state.lock().unwrap().timed_items = items;
        self
    }

    pub fn with_listed_items(self, items: Vec<ItemId>) -> Self {
        self.state.lock().unwrap().listed_items = items;
        self
    }

    pub fn with_count_limit(self, limit: usize) -> Self {
        self.state.lock().unwrap().count_limit = Some(limit);
        self
    }

    pub fn with_scripted_find_failures(self, failures: Vec<ClientError>) -> Self {
        self.state.lock().unwrap().scripted_find_failures = failures.into();
        self
    }

    pub fn with_permanent_find_failure(self, failure: ClientError) -> Self {
        self.state.lock().unwrap().permanent_find_failure = Some(failure);
        self
    }

    pub fn accepting_only(self, principal: &str) -> Self {
        self.state.lock().unwrap().accepted_principal = Some(principal.to_owned());
        self
    }

    pub fn with_calendars_for(self, principals: &[&str]) -> Self {
        self.state.lock().unwrap().principals_with_calendar =
            Some(principals.iter().map(|p| (*p).to_owned()).collect());
        self
    }

    pub fn with_directory_entries(self, entries: &[&str]) -> Self {
        self.state.lock().unwrap().directory_entries =
            entries.iter().map(|e| (*e).to_owned()).collect();
        self
    }

    pub fn with_calendar_folders(self, folders: Vec<RemoteFolder>) -> Self {
        self.state.lock().unwrap().calendar_folders = folders;
        self
    }

    pub fn warning_on_delete(self, code: ResponseCode) -> Self {
        self.state.lock().unwrap().delete_warning = Some(code);
        self
    }

    pub fn find_item_calls(&self) -> u32 {
        self.state.lock().unwrap().find_item_calls
    }

    pub fn get_item_calls(&self) -> u32 {
        self.state.lock().unwrap().get_item_calls
    }

    pub fn delete_batches(&self) -> Vec<usize> {
        self.state.lock().unwrap().delete_batches.clone()
    }

    pub fn principals_seen(&self) -> Vec<String> {
        self.state.lock().unwrap().principals_seen.clone()
    }

    pub fn deleted_folders(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted_folders.clone()
    }

    pub fn remaining_listed_items(&self) -> usize {
        self.state.lock().unwrap().listed_items.len()
    }
}

impl GatewayState {
    fn check_principal(&self, principal: &str) -> Result<()> {
        match &self.accepted_principal {
            Some(accepted) if !accepted.eq_ignore_ascii_case(principal) => {
                Err(classify_transport_fault(
                    "a:ErrorImpersonateUserDenied: The impersonation principal name is invalid.",
                ))
            }
            _ => Ok(()),
        }
    }

    fn has_calendar(&self, principal: &str) -> bool {
        match &self.principals_with_calendar {
            Some(principals) => principals.contains(principal),
            None => true,
        }
    }

    fn id_page(ids: Vec<ItemId>, includes_last: bool, next: Option<u32>) -> FindItemResponse {
        ResponseMessages::single(ResponseMessage::success(FindItemPage {
            item_ids: ids,
            includes_last_item_in_range: includes_last,
            indexed_paging_offset: next,
            total_items_in_view: None,
        }))
    }
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn find_item(&self, principal: &str, request: &FindItemRequest) -> Result<FindItemResponse> {
        let mut state = self.state.lock().unwrap();
        state.find_item_calls += 1;
        state.principals_seen.push(principal.to_owned());
        state.check_principal(principal)?;
        if let Some(failure) = state.scripted_find_failures.pop_front() {
            return Err(failure);
        }
        if let Some(failure) = &state.permanent_find_failure {
            return Err(failure.clone());
        }
        match &request.view {
            ItemView::Calendar(view) => {
                let matching: Vec<ItemId> = state
                    .timed_items
                    .iter()
                    .filter(|(start, _)| view.range.start() <= *start && *start < view.range.end())
                    .map(|(_, id)| id.clone())
                    .collect();
                if state.count_limit.is_some_and(|limit| matching.len() > limit) {
                    return Ok(ResponseMessages::single(ResponseMessage::error(
                        ResponseCode::ErrorExceededFindCountLimit,
                        "the find exceeds the count limit",
                    )));
                }
                Ok(GatewayState::id_page(matching, true, None))
            }
            ItemView::Indexed(view) => {
                let total = state.listed_items.len();
                let from = (view.offset as usize).min(total);
                let to = (from + view.max_entries as usize).min(total);
                let ids = state.listed_items[from..to].to_vec();
                Ok(GatewayState::id_page(ids, to >= total, Some(to as u32)))
            }
        }
    }

    async fn get_item(&self, principal: &str, request: &GetItemRequest) -> Result<GetItemResponse> {
        let mut state = self.state.lock().unwrap();
        state.get_item_calls += 1;
        state.check_principal(principal)?;
        let items = request
            .item_ids
            .iter()
            .map(|id| {
                let mut item = CalendarItem::new(id.clone());
                item.subject = Some(format!("event {}", id.id));
                item
            })
            .collect();
        Ok(ResponseMessages::single(ResponseMessage::success(ItemBatch { items })))
    }

    async fn create_item(
        &self,
        principal: &str,
        request: &CreateItemRequest,
    ) -> Result<CreateItemResponse> {
        let mut state = self.state.lock().unwrap();
        state.check_principal(principal)?;
        state.created_items += 1;
        let items = request
            .items
            .iter()
            .map(|item| {
                let mut created = item.clone();
                created.item_id = ItemId::new(format!("created-{}", state.created_items));
                created
            })
            .collect();
        Ok(ResponseMessages::single(ResponseMessage::success(ItemBatch { items })))
    }

    async fn delete_item(
        &self,
        principal: &str,
        request: &DeleteItemRequest,
    ) -> Result<DeleteItemResponse> {
        let mut state = self.state.lock().unwrap();
        state.check_principal(principal)?;
        state.delete_batches.push(request.item_ids.len());
        if let Some(code) = state.delete_warning.clone() {
            return Ok(ResponseMessages::single(ResponseMessage::warning(
                code,
                "delete partially applied",
            )));
        }
        let doomed: HashSet<&ItemId> = request.item_ids.iter().collect();
        state.listed_items.retain(|id| !doomed.contains(id));
        state.timed_items.retain(|(_, id)| !doomed.contains(id));
        Ok(ResponseMessages::single(ResponseMessage::success(())))
    }

    async fn get_folder(
        &self,
        principal: &str,
        _request: &GetFolderRequest,
    ) -> Result<GetFolderResponse> {
        let state = self.state.lock().unwrap();
        state.check_principal(principal)?;
        if !state.has_calendar(principal) {
            return Ok(ResponseMessages::single(ResponseMessage::error(
                ResponseCode::ErrorItemNotFound,
                "no primary calendar folder",
            )));
        }
        let folder = RemoteFolder {
            folder_id: FolderRef::new(format!("calendar-of-{principal}")),
            display_name: Some("Calendar".to_owned()),
            kind: FolderKind::Calendar,
        };
        Ok(ResponseMessages::single(ResponseMessage::success(FolderBatch {
            folders: vec![folder],
        })))
    }

    async fn find_folder(
        &self,
        principal: &str,
        _request: &FindFolderRequest,
    ) -> Result<FindFolderResponse> {
        let state = self.state.lock().unwrap();
        state.check_principal(principal)?;
        Ok(ResponseMessages::single(ResponseMessage::success(FolderBatch {
            folders: state.calendar_folders.clone(),
        })))
    }

    async fn create_folder(
        &self,
        principal: &str,
        request: &CreateFolderRequest,
    ) -> Result<CreateFolderResponse> {
        let state = self.state.lock().unwrap();
        state.check_principal(principal)?;
        let folder = RemoteFolder {
            folder_id: FolderRef::new(format!("folder-{}", request.display_name)),
            display_name: Some(request.display_name.clone()),
            kind: FolderKind::Calendar,
        };
        Ok(ResponseMessages::single(ResponseMessage::success(FolderBatch {
            folders: vec![folder],
        })))
    }

    async fn delete_folder(
        &self,
        principal: &str,
        request: &DeleteFolderRequest,
    ) -> Result<DeleteFolderResponse> {
        let mut state = self.state.lock().unwrap();
        state.check_principal(principal)?;
        for folder in &request.folder_ids {
            if let calbridge_domain::FolderId::Concrete(folder) = folder {
                state.deleted_folders.push(folder.id.clone());
            }
        }
        Ok(ResponseMessages::single(ResponseMessage::success(())))
    }

    async fn resolve_names(
        &self,
        principal: &str,
        _request: &ResolveNamesRequest,
    ) -> Result<ResolveNamesResponse> {
        let state = self.state.lock().unwrap();
        state.check_principal(principal)?;
        Ok(ResponseMessages::single(ResponseMessage::success(Resolutions {
            smtp_addresses: state.directory_entries.clone(),
        })))
    }

    async fn get_server_time_zones(
        &self,
        principal: &str,
        request: &GetServerTimeZonesRequest,
    ) -> Result<GetServerTimeZonesResponse> {
        let state = self.state.lock().unwrap();
        state.check_principal(principal)?;
        let zones = if request.ids.is_empty() {
            vec![
                TimeZoneDefinition { id: "UTC".to_owned(), display_name: Some("UTC".to_owned()) },
                TimeZoneDefinition {
                    id: "Eastern Standard Time".to_owned(),
                    display_name: Some("Eastern".to_owned()),
                },
            ]
        } else {
            request
                .ids
                .iter()
                .map(|id| TimeZoneDefinition { id: id.clone(), display_name: None })
                .collect()
        };
        Ok(ResponseMessages::single(ResponseMessage::success(TimeZoneBatch { zones })))
    }
}

/// Identity resolver backed by a fixed table.
pub struct TableResolver {
    mapping: HashMap<String, String>,
    calls: AtomicU32,
}

impl TableResolver {
    /// A resolver that never improves any principal.
    pub fn empty() -> Self {
        Self { mapping: HashMap::new(), calls: AtomicU32::new(0) }
    }

    pub fn mapping(pairs: &[(&str, &str)]) -> Self {
        Self {
            mapping: pairs
                .iter()
                .map(|(from, to)| ((*from).to_lowercase(), (*to).to_owned()))
                .collect(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for TableResolver {
    async fn resolve(&self, raw: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.mapping.get(&raw.to_lowercase()).cloned())
    }
}
