//! Turns response envelopes into domain values or classified errors.
//!
//! Every extractor first confirms the envelope, then pulls its payloads.
//! Confirmation judges each message independently and, when several fail,
//! reports the most decisive failure: hard errors outrank the count-limit
//! signal, which outranks principal problems, which outrank timeouts, with
//! everything unrecognized classified as transient.

use std::collections::HashSet;

use calbridge_domain::{
    CalendarItem, ClientError, FolderRef, ItemId, PageCursor, RemoteFolder, Result,
    TimeZoneDefinition,
};
use tracing::warn;

use super::envelope::*;

/// Fails unless every message in the envelope reports an untroubled success.
pub fn confirm_success<P>(response: &ResponseMessages<P>) -> Result<()> {
    confirm(response, false)
}

/// Like [`confirm_success`], but tolerates warning-class messages.
///
/// Warnings are logged and otherwise ignored. Reserved for directory
/// resolution, where the service reports a warning on an ambiguous alias
/// while still returning the candidates.
pub fn confirm_success_or_warning<P>(response: &ResponseMessages<P>) -> Result<()> {
    confirm(response, true)
}

fn confirm<P>(response: &ResponseMessages<P>, tolerate_warnings: bool) -> Result<()> {
    if response.messages.is_empty() {
        return Err(ClientError::transient("response carried no messages"));
    }
    let mut worst: Option<ClientError> = None;
    for message in &response.messages {
        let failed = match message.class {
            ResponseClass::Success => message.code != ResponseCode::NoError,
            ResponseClass::Warning => {
                if tolerate_warnings {
                    warn!(
                        code = ?message.code,
                        text = message.message_text.as_deref().unwrap_or(""),
                        "tolerating warning-class response message"
                    );
                    false
                } else {
                    true
                }
            }
            ResponseClass::Error => true,
        };
        if failed {
            let err = classify(&message.code, message.message_text.as_deref());
            worst = Some(match worst.take() {
                Some(current) if priority(&current) >= priority(&err) => current,
                _ => err,
            });
        }
    }
    match worst {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Maps a response code onto the error taxonomy.
fn classify(code: &ResponseCode, text: Option<&str>) -> ClientError {
    let detail = |fallback: &str| text.unwrap_or(fallback).to_owned();
    match code {
        ResponseCode::ErrorTimeoutExpired => {
            ClientError::Timeout(detail("the service reported a timeout"))
        }
        ResponseCode::ErrorCannotDeleteObject => {
            ClientError::CannotDelete(detail("the service refused to delete the object"))
        }
        ResponseCode::ErrorItemNotFound => {
            ClientError::ItemNotFound(detail("the targeted item does not exist"))
        }
        ResponseCode::ErrorExceededFindCountLimit => {
            ClientError::ExceededCountLimit(detail("the find exceeded the service count limit"))
        }
        ResponseCode::ErrorImpersonateUserDenied => {
            ClientError::InvalidPrincipal(detail("impersonation was denied for the principal"))
        }
        ResponseCode::NoError
        | ResponseCode::ErrorInternalServerError
        | ResponseCode::ErrorInternalServerTransientError
        | ResponseCode::Other(_) => ClientError::transient(detail("unclassified service error")),
    }
}

/// Decisiveness ranking used when a batch carries several failures.
fn priority(err: &ClientError) -> u8 {
    match err {
        ClientError::ItemNotFound(_) | ClientError::CannotDelete(_) => 5,
        ClientError::ExceededCountLimit(_) => 4,
        ClientError::InvalidPrincipal(_) => 3,
        ClientError::Timeout(_) => 2,
        _ => 1,
    }
}

/// Extracts the unique item ids and the paging cursor from a find response.
///
/// Pages from every message are merged. The cursor reports done only when
/// every page includes the last item of its listing; a page that continues
/// but offers no next offset is treated as done, there is nowhere to resume
/// from.
pub fn parse_find_item_ids(response: &FindItemResponse) -> Result<(HashSet<ItemId>, PageCursor)> {
    confirm_success(response)?;
    let mut ids = HashSet::new();
    let mut includes_last = true;
    let mut next_offset = None;
    for page in response.messages.iter().filter_map(|m| m.payload.as_ref()) {
        ids.extend(page.item_ids.iter().cloned());
        if !page.includes_last_item_in_range {
            includes_last = false;
            if let Some(offset) = page.indexed_paging_offset {
                next_offset = Some(offset);
            }
        }
    }
    let cursor = match next_offset {
        Some(offset) if !includes_last => PageCursor { offset, includes_last: false },
        _ => PageCursor { offset: 0, includes_last: true },
    };
    Ok((ids, cursor))
}

pub fn parse_items(response: &GetItemResponse) -> Result<Vec<CalendarItem>> {
    confirm_success(response)?;
    Ok(response
        .messages
        .iter()
        .filter_map(|m| m.payload.as_ref())
        .flat_map(|batch| batch.items.iter().cloned())
        .collect())
}

/// Extracts the ids of the items a create produced.
pub fn parse_created_item_ids(response: &CreateItemResponse) -> Result<Vec<ItemId>> {
    confirm_success(response)?;
    Ok(response
        .messages
        .iter()
        .filter_map(|m| m.payload.as_ref())
        .flat_map(|batch| batch.items.iter().map(|item| item.item_id.clone()))
        .collect())
}

pub fn parse_folders(response: &ResponseMessages<FolderBatch>) -> Result<Vec<RemoteFolder>> {
    confirm_success(response)?;
    Ok(response
        .messages
        .iter()
        .filter_map(|m| m.payload.as_ref())
        .flat_map(|batch| batch.folders.iter().cloned())
        .collect())
}

/// Extracts the ids of the folders a create produced.
pub fn parse_created_folder_ids(response: &CreateFolderResponse) -> Result<Vec<FolderRef>> {
    Ok(parse_folders(response)?.into_iter().map(|folder| folder.folder_id).collect())
}

/// Extracts resolved smtp addresses, lowercased and stripped of the
/// `smtp:` routing prefix. Warnings are tolerated because the directory
/// reports one when a resolution is ambiguous but still returns candidates.
pub fn parse_resolved_addresses(response: &ResolveNamesResponse) -> Result<HashSet<String>> {
    confirm_success_or_warning(response)?;
    Ok(response
        .messages
        .iter()
        .filter_map(|m| m.payload.as_ref())
        .flat_map(|resolutions| resolutions.smtp_addresses.iter())
        .map(|address| {
            let lowered = address.to_lowercase();
            lowered.strip_prefix("smtp:").map(str::to_owned).unwrap_or(lowered)
        })
        .collect())
}

pub fn parse_server_time_zones(
    response: &GetServerTimeZonesResponse,
) -> Result<Vec<TimeZoneDefinition>> {
    confirm_success(response)?;
    Ok(response
        .messages
        .iter()
        .filter_map(|m| m.payload.as_ref())
        .flat_map(|batch| batch.zones.iter().cloned())
        .collect())
}
