//! Platform-agnostic response shape shared with other channels, and its conversion into
//! the Telegram [`Response`].

use serde::{Deserialize, Serialize};

use super::attachment::{coordinate, Attachment, AttachmentGroup, GroupItem, Location, MediaKind};
use super::keyboard::{Button, Keyboard, DEFAULT_ROW_WIDTH};
use super::Response;

/// Cross-channel media item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericMedia {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GenericMedia {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    fn into_attachment(self) -> Attachment {
        Attachment {
            source: self.source.map(Into::into),
            id: self.id,
            title: self.title,
        }
    }
}

/// Typed entry of a cross-channel gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenericFile {
    Image(GenericMedia),
    Video(GenericMedia),
    Document(GenericMedia),
    Audio(GenericMedia),
}

impl GenericFile {
    fn into_group_item(self) -> GroupItem {
        let (kind, media) = match self {
            GenericFile::Image(m) => (MediaKind::Image, m),
            GenericFile::Video(m) => (MediaKind::Video, m),
            GenericFile::Document(m) => (MediaKind::Document, m),
            GenericFile::Audio(m) => (MediaKind::Audio, m),
        };
        GroupItem::new(kind, media.into_attachment())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericGallery {
    pub files: Vec<GenericFile>,
}

/// Cross-channel button: `source` is a link target, `payload` an opaque callback value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericButton {
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericKeyboard {
    #[serde(default)]
    pub buttons: Vec<GenericButton>,
    #[serde(default)]
    pub is_inline: Option<bool>,
    #[serde(default)]
    pub row_width: Option<usize>,
    /// Asks the channel to hide any custom keyboard.
    #[serde(default)]
    pub remove: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenericLocation {
    #[serde(deserialize_with = "coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "coordinate")]
    pub longitude: f64,
}

/// Response description produced by channel-independent dialog scripts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ui: Option<GenericKeyboard>,
    #[serde(default)]
    pub image: Option<GenericMedia>,
    #[serde(default)]
    pub video: Option<GenericMedia>,
    #[serde(default)]
    pub document: Option<GenericMedia>,
    #[serde(default)]
    pub audio: Option<GenericMedia>,
    #[serde(default)]
    pub location: Option<GenericLocation>,
    #[serde(default)]
    pub gallery: Option<GenericGallery>,
}

impl GenericResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

impl From<GenericResponse> for Response {
    fn from(generic: GenericResponse) -> Self {
        let ui = match generic.ui {
            None => None,
            Some(ui) if ui.remove => Some(Keyboard::Remove),
            Some(ui) => Some(Keyboard::Buttons {
                buttons: ui
                    .buttons
                    .into_iter()
                    .map(|b| Button {
                        text: b.text,
                        url: b.source,
                        payload: b.payload,
                    })
                    .collect(),
                is_inline: ui.is_inline.unwrap_or(true),
                row_width: ui.row_width.unwrap_or(DEFAULT_ROW_WIDTH),
            }),
        };

        Response {
            text: generic.text,
            ui,
            location: generic
                .location
                .map(|l| Location::new(l.latitude, l.longitude)),
            image: generic.image.map(GenericMedia::into_attachment),
            video: generic.video.map(GenericMedia::into_attachment),
            document: generic.document.map(GenericMedia::into_attachment),
            audio: generic.audio.map(GenericMedia::into_attachment),
            attachments: generic.gallery.map(|g| {
                AttachmentGroup::new(g.files.into_iter().map(GenericFile::into_group_item).collect())
            }),
        }
    }
}
