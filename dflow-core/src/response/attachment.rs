//! Media attachments: single attachments, attachment groups, and locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DflowError, Result};

/// Minimum and maximum number of items Telegram accepts in one media group.
pub const MEDIA_GROUP_MIN: usize = 2;
pub const MEDIA_GROUP_MAX: usize = 10;

/// Kind of media slot; also selects the Bot API method used to send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Document,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::Audio => "audio",
        }
    }
}

/// Where an attachment's bytes come from: a remote URL or a local file.
///
/// Strings with an `http://` or `https://` scheme are remote; everything else is a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaSource {
    Url(String),
    Path(PathBuf),
}

impl From<String> for MediaSource {
    fn from(value: String) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            MediaSource::Url(value)
        } else {
            MediaSource::Path(PathBuf::from(value))
        }
    }
}

impl From<&str> for MediaSource {
    fn from(value: &str) -> Self {
        MediaSource::from(value.to_string())
    }
}

impl From<PathBuf> for MediaSource {
    fn from(value: PathBuf) -> Self {
        MediaSource::Path(value)
    }
}

impl From<MediaSource> for String {
    fn from(value: MediaSource) -> Self {
        match value {
            MediaSource::Url(url) => url,
            MediaSource::Path(path) => path.to_string_lossy().into_owned(),
        }
    }
}

impl MediaSource {
    fn validate(&self) -> Result<()> {
        match self {
            MediaSource::Url(url) => reqwest::Url::parse(url).map(|_| ()).map_err(|e| {
                DflowError::InvalidAttachment(format!("Malformed source URL {}: {}", url, e))
            }),
            MediaSource::Path(path) => {
                if path.as_os_str().is_empty() {
                    return Err(DflowError::InvalidAttachment(
                        "Source path is empty".to_string(),
                    ));
                }
                if !path.exists() {
                    return Err(DflowError::InvalidAttachment(format!(
                        "Provided filepath {} does not exist",
                        path.display()
                    )));
                }
                Ok(())
            }
        }
    }
}

/// A single media item: exactly one of `source` or `id` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MediaSource>,
    /// Opaque file id previously issued by Telegram.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sent as the media caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Attachment {
    pub fn from_source(source: impl Into<MediaSource>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Checks the `source`/`id` exclusivity and that the source is usable.
    pub fn validate(&self) -> Result<()> {
        let has_id = self.id.as_deref().is_some_and(|id| !id.is_empty());
        match (&self.source, has_id) {
            (Some(_), true) | (None, false) => Err(DflowError::InvalidAttachment(
                "Attachment requires exactly one parameter, `source` or `id`, to be set"
                    .to_string(),
            )),
            (Some(source), false) => source.validate(),
            (None, true) => Ok(()),
        }
    }

    /// Local file backing this attachment, if any.
    pub fn local_path(&self) -> Option<&Path> {
        match &self.source {
            Some(MediaSource::Path(path)) => Some(path.as_path()),
            _ => None,
        }
    }
}

/// One member of an attachment group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupItem {
    pub kind: MediaKind,
    #[serde(flatten)]
    pub attachment: Attachment,
}

impl GroupItem {
    pub fn new(kind: MediaKind, attachment: Attachment) -> Self {
        Self { kind, attachment }
    }

    pub fn image(source: impl Into<MediaSource>) -> Self {
        Self::new(MediaKind::Image, Attachment::from_source(source))
    }

    pub fn video(source: impl Into<MediaSource>) -> Self {
        Self::new(MediaKind::Video, Attachment::from_source(source))
    }

    pub fn document(source: impl Into<MediaSource>) -> Self {
        Self::new(MediaKind::Document, Attachment::from_source(source))
    }

    pub fn audio(source: impl Into<MediaSource>) -> Self {
        Self::new(MediaKind::Audio, Attachment::from_source(source))
    }
}

/// Multi-media "gallery": between [`MEDIA_GROUP_MIN`] and [`MEDIA_GROUP_MAX`] items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentGroup {
    pub files: Vec<GroupItem>,
}

impl AttachmentGroup {
    pub fn new(files: Vec<GroupItem>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let count = self.files.len();
        if !(MEDIA_GROUP_MIN..=MEDIA_GROUP_MAX).contains(&count) {
            return Err(DflowError::InvalidAttachment(format!(
                "Attachment group must hold {} to {} items, got {}",
                MEDIA_GROUP_MIN, MEDIA_GROUP_MAX, count
            )));
        }
        for item in &self.files {
            item.attachment.validate()?;
        }
        Ok(())
    }
}

/// Geographic point sent with `sendLocation`.
///
/// A `null` coordinate (JSON's encoding of a non-finite float) reads back as NaN and fails
/// [`Location::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(deserialize_with = "coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "coordinate")]
    pub longitude: f64,
}

pub(crate) fn coordinate<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude must be finite and within [-90, 90], longitude within [-180, 180].
    pub fn validate(&self) -> Result<()> {
        if !(self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude)) {
            return Err(DflowError::InvalidLocation(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !(self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude)) {
            return Err(DflowError::InvalidLocation(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}
