//! The calendar client.
//!
//! Wraps a [`RemoteGateway`] with the orchestration the remote service
//! demands: requests are rebuilt from the factory on every attempt, failures
//! are classified and retried within a bounded depth budget, rejected
//! principals are re-resolved through the [`IdentityResolver`], count-limit
//! refusals on date-range finds are bisected, and indexed listings are paged
//! to completion.

use std::collections::{HashMap, HashSet};

use futures::future::BoxFuture;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use calbridge_core::intervals;
use calbridge_core::ports::{IdentityResolver, RemoteGateway};
use calbridge_core::requests::{Disposal, MeetingNotification, RequestFactory};
use calbridge_core::responses::interpreter;
use calbridge_domain::constants::MAX_DELETE_BATCH;
use calbridge_domain::{
    CalendarItem, ClientError, DateRange, DistinguishedFolder, FolderId, FolderKind, FolderRef,
    ItemId, PageCursor, RemoteFolder, Result, TimeZoneDefinition,
};

use super::retry::{decide, exhausted, RecoveryStep, RetryConfig, RetryContext};

/// What [`CalendarClient::recover`] concluded about one failure.
enum Recovered {
    /// In-place recovery applied; retry the same request.
    Retry,
    /// The range should be bisected. Carries the original refusal so the
    /// caller can surface it when the range is too narrow to split.
    Split(ClientError),
}

/// High-level calendar operations against a session-less remote service.
///
/// The client holds no per-principal state: every operation takes the
/// principal it acts on behalf of, and concurrent calls for different
/// principals share one client.
pub struct CalendarClient<G, R> {
    gateway: G,
    resolver: R,
    factory: RequestFactory,
    retry: RetryConfig,
}

impl<G, R> CalendarClient<G, R>
where
    G: RemoteGateway,
    R: IdentityResolver,
{
    pub fn new(gateway: G, resolver: R) -> Self {
        Self { gateway, resolver, factory: RequestFactory::new(), retry: RetryConfig::default() }
    }

    pub fn with_config(gateway: G, resolver: R, factory: RequestFactory, retry: RetryConfig) -> Self {
        Self { gateway, resolver, factory, retry }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// All item ids with occurrences inside `range`, recurrences expanded.
    ///
    /// When the service refuses the range as exceeding its count limit, the
    /// range is bisected and both halves are queried recursively; the union
    /// of the halves equals what the whole range would have returned.
    pub async fn find_calendar_item_ids(
        &self,
        principal: &str,
        range: DateRange,
        folders: &[FolderId],
    ) -> Result<HashSet<ItemId>> {
        intervals::check_span(range)?;
        self.find_range(RetryContext::new(principal), range, folders).await
    }

    /// Full calendar items for the given ids, fetched in one batch.
    pub async fn get_calendar_items(
        &self,
        principal: &str,
        item_ids: &[ItemId],
    ) -> Result<Vec<CalendarItem>> {
        self.run_with_retry("get_calendar_items", principal, |principal| {
            Box::pin(async move {
                let request = self.factory.get_items(item_ids)?;
                let response = self.gateway.get_item(&principal, &request).await?;
                interpreter::parse_items(&response)
            })
        })
        .await
    }

    /// Convenience composition: id sweep over `range`, then a batched fetch.
    pub async fn get_calendar_items_in_range(
        &self,
        principal: &str,
        range: DateRange,
        folders: &[FolderId],
    ) -> Result<Vec<CalendarItem>> {
        let ids: Vec<ItemId> =
            self.find_calendar_item_ids(principal, range, folders).await?.into_iter().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get_calendar_items(principal, &ids).await
    }

    /// Creates one calendar item and returns its service-assigned id.
    pub async fn create_calendar_item(
        &self,
        principal: &str,
        item: CalendarItem,
        folder: Option<&FolderRef>,
    ) -> Result<ItemId> {
        let created = self
            .run_with_retry("create_calendar_item", principal, |principal| {
                let item = item.clone();
                Box::pin(async move {
                    let request = self.factory.create_calendar_item(item, folder);
                    let response = self.gateway.create_item(&principal, &request).await?;
                    interpreter::parse_created_item_ids(&response)
                })
            })
            .await?;
        single(created, "created item id")?.ok_or_else(|| {
            ClientError::transient("the service confirmed the create but returned no item id")
        })
    }

    /// Hard-deletes the given items without notifying participants.
    ///
    /// Confirmation is strict: a warning on any item fails the call, so a
    /// half-applied batch is never reported as clean.
    pub async fn delete_calendar_items(&self, principal: &str, item_ids: &[ItemId]) -> Result<()> {
        self.run_with_retry("delete_calendar_items", principal, |principal| {
            Box::pin(async move {
                let request = self.factory.delete_items(
                    item_ids,
                    Disposal::HardDelete,
                    MeetingNotification::SendToNone,
                )?;
                let response = self.gateway.delete_item(&principal, &request).await?;
                interpreter::confirm_success(&response)
            })
        })
        .await
    }

    /// One page of an unrestricted id listing, starting at `offset`.
    pub async fn find_item_id_page(
        &self,
        principal: &str,
        folders: &[FolderId],
        offset: u32,
    ) -> Result<(HashSet<ItemId>, PageCursor)> {
        self.run_with_retry("find_item_id_page", principal, move |principal| {
            Box::pin(async move {
                let request = self.factory.find_item_id_page(offset, folders)?;
                let response = self.gateway.find_item(&principal, &request).await?;
                interpreter::parse_find_item_ids(&response)
            })
        })
        .await
    }

    /// Every item id in the given folders, walked page by page.
    ///
    /// Each page gets a fresh retry budget; a transient failure deep into a
    /// long listing does not forfeit the pages already gathered.
    pub async fn find_all_item_ids(
        &self,
        principal: &str,
        folders: &[FolderId],
    ) -> Result<HashSet<ItemId>> {
        let mut ids = HashSet::new();
        let mut cursor = PageCursor::first();
        loop {
            let (page_ids, next) = self.find_item_id_page(principal, folders, cursor.offset).await?;
            ids.extend(page_ids);
            if next.includes_last {
                break;
            }
            cursor = next;
        }
        debug!(principal, total = ids.len(), "walked item listing to completion");
        Ok(ids)
    }

    /// Fetches one folder by its concrete reference. `None` when the service
    /// no longer knows the folder.
    pub async fn get_folder(
        &self,
        principal: &str,
        folder: &FolderRef,
    ) -> Result<Option<RemoteFolder>> {
        let folders = self
            .run_with_retry("get_folder", principal, |principal| {
                Box::pin(async move {
                    let request = self.factory.get_folder_by_ref(folder);
                    let response = self.gateway.get_folder(&principal, &request).await?;
                    interpreter::parse_folders(&response)
                })
            })
            .await;
        match folders {
            Ok(folders) => single(folders, "folder"),
            Err(err) if err.kind() == calbridge_domain::ErrorKind::ItemNotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// The principal's primary calendar folder.
    pub async fn get_primary_calendar_folder(
        &self,
        principal: &str,
    ) -> Result<Option<RemoteFolder>> {
        let folders = self
            .run_with_retry("get_primary_calendar_folder", principal, |principal| {
                Box::pin(async move {
                    let request = self.factory.get_folder_by_name(DistinguishedFolder::Calendar);
                    let response = self.gateway.get_folder(&principal, &request).await?;
                    interpreter::parse_folders(&response)
                })
            })
            .await?;
        single(folders, "primary calendar folder")
    }

    /// Every calendar-class folder under the principal's calendar root.
    pub async fn get_all_calendar_folders(&self, principal: &str) -> Result<Vec<RemoteFolder>> {
        let folders = self
            .run_with_retry("get_all_calendar_folders", principal, |principal| {
                Box::pin(async move {
                    let request = self.factory.find_folders(DistinguishedFolder::Calendar);
                    let response = self.gateway.find_folder(&principal, &request).await?;
                    interpreter::parse_folders(&response)
                })
            })
            .await?;
        Ok(folders.into_iter().filter(|folder| folder.kind == FolderKind::Calendar).collect())
    }

    /// Map from calendar folder id to display name.
    pub async fn calendar_folder_map(&self, principal: &str) -> Result<HashMap<String, String>> {
        Ok(self
            .get_all_calendar_folders(principal)
            .await?
            .into_iter()
            .map(|folder| {
                let name = folder.display_name.unwrap_or_default();
                (folder.folder_id.id, name)
            })
            .collect())
    }

    /// Finds the one calendar folder named `display_name`.
    ///
    /// The match is case-insensitive. No match fails with `ItemNotFound`;
    /// several matches fail with `InvalidArgument` since the name cannot
    /// address a single folder.
    pub async fn calendar_folder_id_by_name(
        &self,
        principal: &str,
        display_name: &str,
    ) -> Result<FolderRef> {
        let matches: Vec<FolderRef> = self
            .get_all_calendar_folders(principal)
            .await?
            .into_iter()
            .filter(|folder| {
                folder
                    .display_name
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(display_name))
            })
            .map(|folder| folder.folder_id)
            .collect();
        match single(matches, "calendar folder")? {
            Some(folder) => Ok(folder),
            None => Err(ClientError::ItemNotFound(format!(
                "no calendar folder named {display_name:?}"
            ))),
        }
    }

    /// Creates a calendar folder under the primary calendar and returns its
    /// reference.
    pub async fn create_calendar_folder(
        &self,
        principal: &str,
        display_name: &str,
    ) -> Result<FolderRef> {
        let created = self
            .run_with_retry("create_calendar_folder", principal, |principal| {
                Box::pin(async move {
                    let request = self.factory.create_calendar_folder(display_name)?;
                    let response = self.gateway.create_folder(&principal, &request).await?;
                    interpreter::parse_created_folder_ids(&response)
                })
            })
            .await?;
        single(created, "created folder id")?.ok_or_else(|| {
            ClientError::transient("the service confirmed the create but returned no folder id")
        })
    }

    /// Deletes every item in `folder`, in batches.
    ///
    /// Re-finds after each round of deletes until a sweep comes back empty,
    /// so items created concurrently during the purge are caught too.
    pub async fn empty_calendar_folder(&self, principal: &str, folder: &FolderRef) -> Result<()> {
        let folders = [FolderId::Concrete(folder.clone())];
        let mut removed = 0usize;
        loop {
            let (ids, _) = self.find_item_id_page(principal, &folders, 0).await?;
            if ids.is_empty() {
                break;
            }
            let ids: Vec<ItemId> = ids.into_iter().collect();
            for batch in ids.chunks(MAX_DELETE_BATCH) {
                self.delete_calendar_items(principal, batch).await?;
                removed += batch.len();
            }
        }
        info!(principal, folder = %folder.id, removed, "emptied calendar folder");
        Ok(())
    }

    /// Empties `folder`, then soft-deletes the folder itself.
    pub async fn delete_calendar_folder(&self, principal: &str, folder: &FolderRef) -> Result<()> {
        self.empty_calendar_folder(principal, folder).await?;
        self.delete_folder(principal, folder, Disposal::SoftDelete).await
    }

    pub async fn delete_folder(
        &self,
        principal: &str,
        folder: &FolderRef,
        disposal: Disposal,
    ) -> Result<()> {
        self.run_with_retry("delete_folder", principal, move |principal| {
            Box::pin(async move {
                let request = self.factory.delete_folder(folder, disposal);
                let response = self.gateway.delete_folder(&principal, &request).await?;
                interpreter::confirm_success(&response)
            })
        })
        .await
    }

    /// Resolves `alias` against the directory into smtp addresses,
    /// lowercased and stripped of routing prefixes.
    pub async fn resolve_email_addresses(
        &self,
        principal: &str,
        alias: &str,
    ) -> Result<HashSet<String>> {
        self.run_with_retry("resolve_email_addresses", principal, |principal| {
            Box::pin(async move {
                let request = self.factory.resolve_names(alias)?;
                let response = self.gateway.resolve_names(&principal, &request).await?;
                interpreter::parse_resolved_addresses(&response)
            })
        })
        .await
    }

    /// Resolves `email` into the one principal the service will accept.
    ///
    /// Directory resolution can return several candidate addresses; each is
    /// probed by fetching its primary calendar folder under impersonation,
    /// and exactly one candidate must survive.
    pub async fn resolve_principal(&self, admin_principal: &str, email: &str) -> Result<String> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ClientError::invalid_argument(format!(
                "{email:?} is not a usable email address"
            )));
        }
        let candidates =
            self.resolve_email_addresses(admin_principal, &format!("smtp:{email}")).await?;
        let mut survivors = Vec::new();
        for candidate in candidates {
            match self.get_primary_calendar_folder(&candidate).await {
                Ok(Some(_)) => survivors.push(candidate),
                Ok(None) => {
                    debug!(candidate = %candidate, "candidate has no primary calendar folder, skipping");
                }
                Err(err) => {
                    debug!(candidate = %candidate, error = %err, "candidate probe failed, skipping");
                }
            }
        }
        survivors.sort();
        match survivors.as_slice() {
            [principal] => Ok(principal.clone()),
            [] => Err(ClientError::InvalidPrincipal(format!(
                "{email} resolved to no principal with a usable calendar"
            ))),
            many => Err(ClientError::InvalidPrincipal(format!(
                "{email} is ambiguous, {} candidates have usable calendars",
                many.len()
            ))),
        }
    }

    /// The time-zone definitions the service knows, optionally narrowed to
    /// one id.
    pub async fn get_server_time_zones(
        &self,
        principal: &str,
        time_zone_id: Option<&str>,
        full_time_zone_data: bool,
    ) -> Result<Vec<TimeZoneDefinition>> {
        self.run_with_retry("get_server_time_zones", principal, move |principal| {
            Box::pin(async move {
                let request = self.factory.get_server_time_zones(time_zone_id, full_time_zone_data);
                let response = self.gateway.get_server_time_zones(&principal, &request).await?;
                interpreter::parse_server_time_zones(&response)
            })
        })
        .await
    }

    /// Drives one non-splittable operation to completion.
    ///
    /// `attempt` is invoked with the principal to act as and must rebuild its
    /// request from the factory each time, so a swapped principal or a moved
    /// clock never reuses stale state.
    async fn run_with_retry<'a, T, F>(
        &'a self,
        operation: &'static str,
        principal: &str,
        attempt: F,
    ) -> Result<T>
    where
        F: Fn(String) -> BoxFuture<'a, Result<T>>,
    {
        let mut ctx = RetryContext::new(principal);
        loop {
            match attempt(ctx.principal.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    self.recover(operation, &mut ctx, err, false).await?;
                }
            }
        }
    }

    /// Recursive date-range sweep with the full recovery repertoire,
    /// including bisection. The retry context travels into both halves of a
    /// split, so recursion depth stays within the same budget.
    fn find_range<'a>(
        &'a self,
        mut ctx: RetryContext,
        range: DateRange,
        folders: &'a [FolderId],
    ) -> BoxFuture<'a, Result<HashSet<ItemId>>> {
        Box::pin(async move {
            loop {
                let request = self.factory.find_calendar_item_ids(range, folders);
                let err = match self.gateway.find_item(&ctx.principal, &request).await {
                    Ok(response) => match interpreter::parse_find_item_ids(&response) {
                        Ok((ids, _)) => return Ok(ids),
                        Err(err) => err,
                    },
                    Err(err) => err,
                };
                match self.recover("find_calendar_item_ids", &mut ctx, err, true).await? {
                    Recovered::Retry => {}
                    Recovered::Split(refusal) => {
                        let (left, right) = match intervals::bisect(range) {
                            Ok(halves) => halves,
                            Err(_) => {
                                warn!(
                                    start = %range.start(),
                                    end = %range.end(),
                                    "range too narrow to bisect, surfacing the refusal"
                                );
                                return Err(refusal);
                            }
                        };
                        info!(
                            start = %range.start(),
                            end = %range.end(),
                            depth = ctx.depth,
                            "count limit exceeded, bisecting range"
                        );
                        let mut ids = self.find_range(ctx.clone(), left, folders).await?;
                        ids.extend(self.find_range(ctx.clone(), right, folders).await?);
                        return Ok(ids);
                    }
                }
            }
        })
    }

    /// Books one failure against the depth budget and applies its recovery.
    ///
    /// Returns `Ok` when the caller should try again (possibly after a split),
    /// `Err` when the failure is terminal.
    async fn recover(
        &self,
        operation: &'static str,
        ctx: &mut RetryContext,
        err: ClientError,
        splittable: bool,
    ) -> Result<Recovered> {
        let kind = err.kind();
        if !ctx.record_failure(kind, self.retry.max_depth()) {
            warn!(
                operation,
                principal = %ctx.principal,
                attempts = ctx.depth,
                last_kind = %kind,
                "retry budget exhausted"
            );
            return Err(exhausted(operation, ctx));
        }
        match decide(kind, splittable) {
            RecoveryStep::Fatal => Err(err),
            RecoveryStep::Split => Ok(Recovered::Split(err)),
            RecoveryStep::Backoff => {
                let delay = self.retry.backoff_delay(ctx.depth);
                warn!(
                    operation,
                    depth = ctx.depth,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, backing off before retry"
                );
                sleep(delay).await;
                Ok(Recovered::Retry)
            }
            RecoveryStep::Reresolve => {
                let resolved = match self.resolver.resolve(&ctx.principal).await {
                    Ok(resolved) => resolved,
                    Err(resolve_err) => {
                        warn!(
                            operation,
                            principal = %ctx.principal,
                            error = %resolve_err,
                            "identity resolution failed, surfacing the rejection"
                        );
                        return Err(err);
                    }
                };
                match resolved {
                    Some(candidate)
                        if !candidate.trim().is_empty()
                            && !candidate.eq_ignore_ascii_case(&ctx.principal) =>
                    {
                        warn!(
                            operation,
                            rejected = %ctx.principal,
                            resolved = %candidate,
                            "principal rejected, retrying under resolved identity"
                        );
                        ctx.principal = candidate;
                        Ok(Recovered::Retry)
                    }
                    _ => Err(err),
                }
            }
        }
    }
}

/// At most one element: `Ok(None)` for zero, `Ok(Some)` for one, an error for
/// more, since a multi-element result means the request addressed the wrong
/// thing.
fn single<T>(mut items: Vec<T>, what: &str) -> Result<Option<T>> {
    match items.len() {
        0 => Ok(None),
        1 => Ok(items.pop()),
        n => Err(ClientError::invalid_argument(format!("expected at most one {what}, got {n}"))),
    }
}
