//! Response framing as the service reports it.

use calbridge_domain::{CalendarItem, ItemId, RemoteFolder, TimeZoneDefinition};
use serde::{Deserialize, Serialize};

/// Overall class of a single response message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseClass {
    Success,
    Warning,
    Error,
}

/// Fine-grained outcome code of a single response message.
///
/// Only the codes the client acts on are modeled as variants; everything
/// else lands in `Other` and is treated as transient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseCode {
    NoError,
    ErrorTimeoutExpired,
    ErrorCannotDeleteObject,
    ErrorItemNotFound,
    ErrorExceededFindCountLimit,
    ErrorImpersonateUserDenied,
    ErrorInternalServerError,
    ErrorInternalServerTransientError,
    Other(String),
}

/// One per-operation message inside a response batch.
///
/// Batched requests yield one message per input object; the class and code
/// of each message are judged independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage<P> {
    pub class: ResponseClass,
    pub code: ResponseCode,
    pub message_text: Option<String>,
    pub payload: Option<P>,
}

impl<P> ResponseMessage<P> {
    pub fn success(payload: P) -> Self {
        Self {
            class: ResponseClass::Success,
            code: ResponseCode::NoError,
            message_text: None,
            payload: Some(payload),
        }
    }

    pub fn warning(code: ResponseCode, text: impl Into<String>) -> Self {
        Self {
            class: ResponseClass::Warning,
            code,
            message_text: Some(text.into()),
            payload: None,
        }
    }

    pub fn error(code: ResponseCode, text: impl Into<String>) -> Self {
        Self { class: ResponseClass::Error, code, message_text: Some(text.into()), payload: None }
    }
}

/// The outer batch wrapper every operation returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessages<P> {
    pub messages: Vec<ResponseMessage<P>>,
}

impl<P> ResponseMessages<P> {
    pub fn new(messages: Vec<ResponseMessage<P>>) -> Self {
        Self { messages }
    }

    pub fn single(message: ResponseMessage<P>) -> Self {
        Self { messages: vec![message] }
    }
}

/// One page of an id sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindItemPage {
    pub item_ids: Vec<ItemId>,
    /// True when this page reaches the end of the listing.
    pub includes_last_item_in_range: bool,
    /// Offset the next page should start at, when the listing continues.
    pub indexed_paging_offset: Option<u32>,
    pub total_items_in_view: Option<u32>,
}

/// Full items returned by a get or created by a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBatch {
    pub items: Vec<CalendarItem>,
}

/// Folders returned by get-folder, find-folder or create-folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderBatch {
    pub folders: Vec<RemoteFolder>,
}

/// Directory resolutions of one alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolutions {
    pub smtp_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeZoneBatch {
    pub zones: Vec<TimeZoneDefinition>,
}

pub type FindItemResponse = ResponseMessages<FindItemPage>;
pub type GetItemResponse = ResponseMessages<ItemBatch>;
pub type CreateItemResponse = ResponseMessages<ItemBatch>;
pub type DeleteItemResponse = ResponseMessages<()>;
pub type GetFolderResponse = ResponseMessages<FolderBatch>;
pub type FindFolderResponse = ResponseMessages<FolderBatch>;
pub type CreateFolderResponse = ResponseMessages<FolderBatch>;
pub type DeleteFolderResponse = ResponseMessages<()>;
pub type ResolveNamesResponse = ResponseMessages<Resolutions>;
pub type GetServerTimeZonesResponse = ResponseMessages<TimeZoneBatch>;
