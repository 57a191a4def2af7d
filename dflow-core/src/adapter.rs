//! Response adapter: turns a [`ResponsePayload`] into the ordered send operations that
//! deliver it to one chat.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, ReplyMarkup};
use tracing::debug;

use crate::error::{DflowError, Result};
use crate::response::{Attachment, MediaKind, MediaSource, Response, ResponsePayload};

/// Order in which single-attachment slots are sent.
pub const MEDIA_SEND_ORDER: [MediaKind; 4] = [
    MediaKind::Image,
    MediaKind::Video,
    MediaKind::Document,
    MediaKind::Audio,
];

/// Media reference carried by a send operation. Local files are opened only when the
/// operation is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Url(reqwest::Url),
    Path(PathBuf),
    FileId(String),
}

impl MediaRef {
    fn from_attachment(attachment: &Attachment) -> Result<Self> {
        attachment.validate()?;
        match (&attachment.source, &attachment.id) {
            (Some(MediaSource::Url(url)), _) => {
                reqwest::Url::parse(url).map(MediaRef::Url).map_err(|e| {
                    DflowError::InvalidAttachment(format!("Malformed source URL {}: {}", url, e))
                })
            }
            (Some(MediaSource::Path(path)), _) => Ok(MediaRef::Path(path.clone())),
            (None, Some(id)) => Ok(MediaRef::FileId(id.clone())),
            (None, None) => Err(DflowError::InvalidAttachment(
                "Attachment has neither `source` nor `id`".to_string(),
            )),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, MediaRef::Path(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub media: MediaRef,
    pub caption: Option<String>,
}

/// One Bot API call delivering part of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOperation {
    Media {
        chat_id: ChatId,
        item: MediaItem,
    },
    Location {
        chat_id: ChatId,
        latitude: f64,
        longitude: f64,
    },
    MediaGroup {
        chat_id: ChatId,
        items: Vec<MediaItem>,
    },
    Message {
        chat_id: ChatId,
        text: String,
        reply_markup: Option<ReplyMarkup>,
    },
}

impl SendOperation {
    pub fn name(&self) -> &'static str {
        match self {
            SendOperation::Media { item, .. } => match item.kind {
                MediaKind::Image => "send_photo",
                MediaKind::Video => "send_video",
                MediaKind::Document => "send_document",
                MediaKind::Audio => "send_audio",
            },
            SendOperation::Location { .. } => "send_location",
            SendOperation::MediaGroup { .. } => "send_media_group",
            SendOperation::Message { .. } => "send_message",
        }
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            SendOperation::Media { chat_id, .. }
            | SendOperation::Location { chat_id, .. }
            | SendOperation::MediaGroup { chat_id, .. }
            | SendOperation::Message { chat_id, .. } => *chat_id,
        }
    }
}

/// Whether the closing text message is sent when it would be empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTextPolicy {
    /// Always send the text message, even with empty text.
    #[default]
    Always,
    /// Skip the text message when its text is empty and no keyboard is attached.
    SkipWhenBare,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterOptions {
    pub empty_text: EmptyTextPolicy,
}

fn media_item(kind: MediaKind, attachment: &Attachment) -> Result<MediaItem> {
    Ok(MediaItem {
        kind,
        media: MediaRef::from_attachment(attachment)?,
        caption: attachment.title.clone(),
    })
}

/// Adapts a response payload into send operations for `chat_id`.
///
/// Order: single media (image, video, document, audio), location, media group, text
/// message. Validation runs before anything is emitted, so an invalid response yields
/// no operations at all.
pub fn adapt(
    payload: ResponsePayload,
    chat_id: ChatId,
    options: &AdapterOptions,
) -> Result<Vec<SendOperation>> {
    let response = payload.resolve()?;
    adapt_response(&response, chat_id, options)
}

/// Same as [`adapt`] for an already structured response.
pub fn adapt_response(
    response: &Response,
    chat_id: ChatId,
    options: &AdapterOptions,
) -> Result<Vec<SendOperation>> {
    response.validate()?;
    let reply_markup = response.ui.as_ref().map(|ui| ui.render()).transpose()?;

    let mut operations = Vec::new();

    for kind in MEDIA_SEND_ORDER {
        if let Some(attachment) = response.media(kind) {
            operations.push(SendOperation::Media {
                chat_id,
                item: media_item(kind, attachment)?,
            });
        }
    }

    if let Some(location) = response.location {
        operations.push(SendOperation::Location {
            chat_id,
            latitude: location.latitude,
            longitude: location.longitude,
        });
    }

    if let Some(group) = &response.attachments {
        let items = group
            .files
            .iter()
            .map(|item| media_item(item.kind, &item.attachment))
            .collect::<Result<Vec<_>>>()?;
        operations.push(SendOperation::MediaGroup { chat_id, items });
    }

    let bare = response.text.is_empty() && reply_markup.is_none();
    if !(bare && options.empty_text == EmptyTextPolicy::SkipWhenBare) {
        operations.push(SendOperation::Message {
            chat_id,
            text: response.text.clone(),
            reply_markup,
        });
    }

    debug!(
        chat_id = chat_id.0,
        operations = operations.len(),
        "Adapted response into send operations"
    );

    Ok(operations)
}
