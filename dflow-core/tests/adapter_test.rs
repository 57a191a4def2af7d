//! Integration tests for [`dflow_core::adapt`].
//!
//! Covers media-before-text ordering, validation before emission, media group ordering,
//! keyboard rendering on the final message and the empty-text policy.

use dflow_core::{
    adapt, AdapterOptions, Attachment, AttachmentGroup, Button, DflowError, EmptyTextPolicy,
    GroupItem, Keyboard, Location, MediaKind, MediaRef, Response, ResponsePayload, SendOperation,
};
use teloxide::types::{ChatId, ReplyMarkup};
use tempfile::NamedTempFile;

const CHAT: ChatId = ChatId(42);

fn local_file() -> NamedTempFile {
    NamedTempFile::new().expect("temp file")
}

/// **Test: One local media slot yields one media operation of that kind, then the text.**
///
/// **Setup:** For each kind, a response with only that slot pointing to an existing file.
/// **Action:** `adapt`.
/// **Expected:** `[Media(kind), Message]`.
#[test]
fn test_single_local_media_then_message() {
    let file = local_file();
    for kind in [
        MediaKind::Image,
        MediaKind::Video,
        MediaKind::Document,
        MediaKind::Audio,
    ] {
        let response = Response::text("caption follows").with_media(
            kind,
            Attachment::from_source(file.path().to_path_buf()).with_title("title"),
        );
        let ops = adapt(response.into(), CHAT, &AdapterOptions::default()).unwrap();

        assert_eq!(ops.len(), 2, "kind {:?}", kind);
        match &ops[0] {
            SendOperation::Media { chat_id, item } => {
                assert_eq!(*chat_id, CHAT);
                assert_eq!(item.kind, kind);
                assert_eq!(item.media, MediaRef::Path(file.path().to_path_buf()));
                assert_eq!(item.caption.as_deref(), Some("title"));
            }
            other => panic!("expected media first, got {:?}", other),
        }
        assert!(matches!(
            &ops[1],
            SendOperation::Message { text, .. } if text == "caption follows"
        ));
    }
}

/// **Test: All slots, location and group come out in the fixed order.**
#[test]
fn test_full_response_order() {
    let response = Response::text("everything")
        .with_media(MediaKind::Audio, Attachment::from_id("audio-id"))
        .with_media(MediaKind::Image, Attachment::from_source("https://example.com/a.jpg"))
        .with_media(MediaKind::Document, Attachment::from_id("doc-id"))
        .with_media(MediaKind::Video, Attachment::from_source("https://example.com/v.mp4"))
        .with_location(Location::new(59.9386, 30.3141))
        .with_attachments(AttachmentGroup::new(vec![
            GroupItem::image("https://example.com/1.jpg"),
            GroupItem::image("https://example.com/2.jpg"),
        ]));

    let ops = adapt(response.into(), CHAT, &AdapterOptions::default()).unwrap();
    let names: Vec<&str> = ops.iter().map(SendOperation::name).collect();
    assert_eq!(
        names,
        vec![
            "send_photo",
            "send_video",
            "send_document",
            "send_audio",
            "send_location",
            "send_media_group",
            "send_message"
        ]
    );
    match &ops[3] {
        SendOperation::Media { item, .. } => {
            assert_eq!(item.media, MediaRef::FileId("audio-id".to_string()))
        }
        other => panic!("unexpected {:?}", other),
    }
    match &ops[4] {
        SendOperation::Location {
            latitude,
            longitude,
            ..
        } => {
            assert_eq!(*latitude, 59.9386);
            assert_eq!(*longitude, 30.3141);
        }
        other => panic!("unexpected {:?}", other),
    }
}

/// **Test: Scenario "Success!" with Remove keyboard yields exactly one message.**
#[test]
fn test_remove_keyboard_scenario() {
    let response = Response::text("Success!").with_ui(Keyboard::Remove);
    let ops = adapt(response.into(), CHAT, &AdapterOptions::default()).unwrap();

    assert_eq!(ops.len(), 1);
    match &ops[0] {
        SendOperation::Message {
            text, reply_markup, ..
        } => {
            assert_eq!(text, "Success!");
            assert!(matches!(reply_markup, Some(ReplyMarkup::KeyboardRemove(_))));
        }
        other => panic!("unexpected {:?}", other),
    }
}

/// **Test: Scenario "pic gallery" yields one group of two items then the message.**
#[test]
fn test_picture_gallery_scenario() {
    let a = local_file();
    let b = local_file();
    let response = Response::text("pic gallery").with_attachments(AttachmentGroup::new(vec![
        GroupItem::image(a.path().to_path_buf()),
        GroupItem::image(b.path().to_path_buf()),
    ]));

    let ops = adapt(response.into(), CHAT, &AdapterOptions::default()).unwrap();
    assert_eq!(ops.len(), 2);
    match &ops[0] {
        SendOperation::MediaGroup { items, .. } => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].media, MediaRef::Path(a.path().to_path_buf()));
            assert_eq!(items[1].media, MediaRef::Path(b.path().to_path_buf()));
            assert!(items.iter().all(|i| i.media.is_local()));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(&ops[1], SendOperation::Message { text, .. } if text == "pic gallery"));
}

/// **Test: Group sizes within bounds keep input order; out of bounds fail.**
#[test]
fn test_group_bounds_and_order() {
    for count in 0..=11usize {
        let items: Vec<GroupItem> = (0..count)
            .map(|i| GroupItem::video(format!("https://example.com/{}.mp4", i)))
            .collect();
        let response = Response::text("videos").with_attachments(AttachmentGroup::new(items));
        let result = adapt(response.into(), CHAT, &AdapterOptions::default());

        if (2..=10).contains(&count) {
            let ops = result.unwrap();
            let SendOperation::MediaGroup { items, .. } = &ops[0] else {
                panic!("expected media group first");
            };
            assert_eq!(items.len(), count);
            for (i, item) in items.iter().enumerate() {
                assert_eq!(
                    item.media,
                    MediaRef::Url(format!("https://example.com/{}.mp4", i).parse().unwrap())
                );
            }
        } else {
            assert!(matches!(result, Err(DflowError::InvalidAttachment(_))));
        }
    }
}

/// **Test: Invalid attachments fail the whole call before anything is emitted.**
///
/// **Setup:** A valid image plus an audio with both `source` and `id`.
/// **Expected:** `InvalidAttachment`, no operations.
#[test]
fn test_validation_happens_before_emission() {
    let mut audio = Attachment::from_id("audio-id");
    audio.source = Some("https://example.com/a.mp3".into());
    let response = Response::text("x")
        .with_media(MediaKind::Image, Attachment::from_source("https://example.com/a.jpg"))
        .with_media(MediaKind::Audio, audio);

    let result = adapt(response.into(), CHAT, &AdapterOptions::default());
    assert!(matches!(result, Err(DflowError::InvalidAttachment(_))));
}

/// **Test: A keyboard without buttons fails validation.**
#[test]
fn test_invalid_keyboard_rejected() {
    let response = Response::text("x").with_ui(Keyboard::reply(vec![]));
    let result = adapt(response.into(), CHAT, &AdapterOptions::default());
    assert!(matches!(result, Err(DflowError::InvalidKeyboard(_))));
}

/// **Test: Inline keyboard is rendered on the final message.**
#[test]
fn test_inline_keyboard_on_message() {
    let buttons = vec![
        Button::new("Cute kitten").with_payload("cute"),
        Button::new("Not at all").with_payload("not"),
    ];
    let response = Response::text("Do you like it?").with_ui(Keyboard::inline(buttons).with_row_width(1));
    let ops = adapt(response.into(), CHAT, &AdapterOptions::default()).unwrap();

    let SendOperation::Message {
        reply_markup: Some(ReplyMarkup::InlineKeyboard(markup)),
        ..
    } = &ops[0]
    else {
        panic!("expected inline keyboard message, got {:?}", ops);
    };
    assert_eq!(markup.inline_keyboard.len(), 2);
    assert_eq!(markup.inline_keyboard[0][0].text, "Cute kitten");
}

/// **Test: Empty-text policy.**
///
/// **Setup:** Media-only response with empty text and no keyboard.
/// **Expected:** `Always` sends an empty message; `SkipWhenBare` omits it. A keyboard
/// keeps the message even under `SkipWhenBare`.
#[test]
fn test_empty_text_policy() {
    let media_only =
        Response::text("").with_media(MediaKind::Image, Attachment::from_id("photo-id"));

    let always = adapt(
        media_only.clone().into(),
        CHAT,
        &AdapterOptions {
            empty_text: EmptyTextPolicy::Always,
        },
    )
    .unwrap();
    assert_eq!(always.len(), 2);

    let skip = AdapterOptions {
        empty_text: EmptyTextPolicy::SkipWhenBare,
    };
    let skipped = adapt(media_only.clone().into(), CHAT, &skip).unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].name(), "send_photo");

    let with_ui = media_only.with_ui(Keyboard::Remove);
    assert_eq!(adapt(with_ui.into(), CHAT, &skip).unwrap().len(), 2);
}

/// **Test: Unsupported raw payloads are rejected.**
#[test]
fn test_unsupported_payload() {
    let result = adapt(
        ResponsePayload::Raw(serde_json::json!(3.5)),
        CHAT,
        &AdapterOptions::default(),
    );
    assert!(matches!(result, Err(DflowError::UnsupportedResponseShape(_))));
}

/// **Test: Non-finite or out-of-range coordinates fail before anything is emitted.**
///
/// **Setup:** Responses carrying a location with NaN, infinity, or latitude beyond 90.
/// **Action:** `adapt`.
/// **Expected:** `InvalidLocation`; the same response with a valid point yields
/// `[Location, Message]`.
#[test]
fn test_invalid_location_rejected() {
    for location in [
        Location::new(f64::NAN, 0.0),
        Location::new(10.0, f64::NEG_INFINITY),
        Location::new(91.0, 10.0),
    ] {
        let response = Response::text("where").with_location(location);
        let result = adapt(response.into(), CHAT, &AdapterOptions::default());
        assert!(
            matches!(result, Err(DflowError::InvalidLocation(_))),
            "{:?} should be rejected",
            location
        );
    }

    let response = Response::text("where").with_location(Location::new(59.93, 30.31));
    let ops = adapt(response.into(), CHAT, &AdapterOptions::default()).unwrap();
    assert_eq!(ops.len(), 2);
    assert!(matches!(ops[0], SendOperation::Location { .. }));
}
