//! Outbound response model.
//!
//! [`Response`] is the structured Telegram response. [`ResponsePayload`] is what a dialog
//! engine may store as a turn's response: plain text, a structured response, a
//! cross-channel [`GenericResponse`], or a schemaless JSON value. The payload is resolved
//! into a [`Response`] once, at the adapter's entry point.

mod attachment;
mod generic;
mod keyboard;

pub use attachment::{
    Attachment, AttachmentGroup, GroupItem, Location, MediaKind, MediaSource, MEDIA_GROUP_MAX,
    MEDIA_GROUP_MIN,
};
pub use generic::{
    GenericButton, GenericFile, GenericGallery, GenericKeyboard, GenericLocation, GenericMedia,
    GenericResponse,
};
pub use keyboard::{Button, Keyboard, DEFAULT_ROW_WIDTH};

use serde::{Deserialize, Serialize};

use crate::error::{DflowError, Result};

/// Structured response: media first, then the text message carrying the keyboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<Keyboard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<AttachmentGroup>,
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_ui(mut self, ui: Keyboard) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_media(mut self, kind: MediaKind, attachment: Attachment) -> Self {
        *self.slot_mut(kind) = Some(attachment);
        self
    }

    pub fn with_attachments(mut self, group: AttachmentGroup) -> Self {
        self.attachments = Some(group);
        self
    }

    /// Single-attachment slot for the given kind.
    pub fn media(&self, kind: MediaKind) -> Option<&Attachment> {
        match kind {
            MediaKind::Image => self.image.as_ref(),
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Document => self.document.as_ref(),
            MediaKind::Audio => self.audio.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: MediaKind) -> &mut Option<Attachment> {
        match kind {
            MediaKind::Image => &mut self.image,
            MediaKind::Video => &mut self.video,
            MediaKind::Document => &mut self.document,
            MediaKind::Audio => &mut self.audio,
        }
    }

    /// Validates every attachment, the location, the group bounds and the keyboard.
    pub fn validate(&self) -> Result<()> {
        for kind in [
            MediaKind::Image,
            MediaKind::Video,
            MediaKind::Document,
            MediaKind::Audio,
        ] {
            if let Some(attachment) = self.media(kind) {
                attachment.validate().map_err(|e| match e {
                    DflowError::InvalidAttachment(msg) => {
                        DflowError::InvalidAttachment(format!("{}: {}", kind.as_str(), msg))
                    }
                    other => other,
                })?;
            }
        }
        if let Some(location) = &self.location {
            location.validate()?;
        }
        if let Some(group) = &self.attachments {
            group.validate()?;
        }
        if let Some(ui) = &self.ui {
            ui.validate()?;
        }
        Ok(())
    }
}

/// A turn's response as stored on the context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponsePayload {
    PlainText(String),
    Structured(Response),
    Generic(GenericResponse),
    /// Schemaless value following the [`Response`] field layout.
    Raw(serde_json::Value),
}

impl ResponsePayload {
    /// Resolves the payload into a structured [`Response`].
    pub fn resolve(self) -> Result<Response> {
        match self {
            ResponsePayload::PlainText(text) => Ok(Response::text(text)),
            ResponsePayload::Structured(response) => Ok(response),
            ResponsePayload::Generic(generic) => Ok(Response::from(generic)),
            ResponsePayload::Raw(serde_json::Value::String(text)) => Ok(Response::text(text)),
            ResponsePayload::Raw(value @ serde_json::Value::Object(_)) => {
                serde_json::from_value(value).map_err(|e| {
                    DflowError::UnsupportedResponseShape(format!(
                        "object does not match the response layout: {}",
                        e
                    ))
                })
            }
            ResponsePayload::Raw(other) => Err(DflowError::UnsupportedResponseShape(format!(
                "expected a string or an object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl From<&str> for ResponsePayload {
    fn from(text: &str) -> Self {
        ResponsePayload::PlainText(text.to_string())
    }
}

impl From<String> for ResponsePayload {
    fn from(text: String) -> Self {
        ResponsePayload::PlainText(text)
    }
}

impl From<Response> for ResponsePayload {
    fn from(response: Response) -> Self {
        ResponsePayload::Structured(response)
    }
}

impl From<GenericResponse> for ResponsePayload {
    fn from(response: GenericResponse) -> Self {
        ResponsePayload::Generic(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_resolves() {
        let response = ResponsePayload::from("hi").resolve().unwrap();
        assert_eq!(response, Response::text("hi"));
    }

    #[test]
    fn test_raw_object_resolves() {
        let payload = ResponsePayload::Raw(json!({
            "text": "Success!",
            "ui": {"type": "remove"}
        }));
        let response = payload.resolve().unwrap();
        assert_eq!(response.text, "Success!");
        assert_eq!(response.ui, Some(Keyboard::Remove));
    }

    #[test]
    fn test_raw_string_is_plain_text() {
        let response = ResponsePayload::Raw(json!("plain")).resolve().unwrap();
        assert_eq!(response.text, "plain");
    }

    #[test]
    fn test_raw_unsupported_shapes() {
        for value in [json!(42), json!([1, 2]), json!(null), json!({"ui": 7})] {
            let result = ResponsePayload::Raw(value.clone()).resolve();
            assert!(
                matches!(result, Err(DflowError::UnsupportedResponseShape(_))),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_validate_reports_slot() {
        let response = Response::text("x").with_media(MediaKind::Audio, Attachment::default());
        match response.validate() {
            Err(DflowError::InvalidAttachment(msg)) => assert!(msg.starts_with("audio")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_payload_serde_round_trip_keeps_variant() {
        let payload = ResponsePayload::from(Response::text("hello").with_ui(Keyboard::Remove));
        let encoded = serde_json::to_string(&payload).unwrap();
        let decoded: ResponsePayload = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, payload);
    }
}
