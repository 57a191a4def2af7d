//! Update fixtures built from Bot API JSON, for tests in this and dependent crates.

use serde_json::{json, Value};
use teloxide::types::Update;

const DATE: i64 = 1_700_000_000;

fn user(id: i64) -> Value {
    json!({ "id": id, "is_bot": false, "first_name": "Test", "username": "test_user" })
}

fn private_chat(id: i64) -> Value {
    json!({ "id": id, "type": "private", "first_name": "Test" })
}

fn parse(value: Value) -> Update {
    serde_json::from_value(value).expect("fixture is a valid Bot API update")
}

/// Private-chat text message from `user_id`.
pub fn text_message_update(update_id: i32, user_id: i64, text: &str) -> Update {
    parse(json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": DATE,
            "chat": private_chat(user_id),
            "from": user(user_id),
            "text": text
        }
    }))
}

/// Text message from `user_id` in group chat `chat_id`.
pub fn group_message_update(update_id: i32, chat_id: i64, user_id: i64, text: &str) -> Update {
    parse(json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": DATE,
            "chat": { "id": chat_id, "type": "group", "title": "Test group" },
            "from": user(user_id),
            "text": text
        }
    }))
}

/// Photo message (no text) from `user_id`.
pub fn photo_message_update(update_id: i32, user_id: i64) -> Update {
    parse(json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": DATE,
            "chat": private_chat(user_id),
            "from": user(user_id),
            "photo": [{
                "file_id": "AgACAgIAAxkBAAI",
                "file_unique_id": "AQAD",
                "width": 90,
                "height": 90,
                "file_size": 1024
            }]
        }
    }))
}

/// Document message with the given MIME type from `user_id`.
pub fn document_message_update(update_id: i32, user_id: i64, mime_type: &str) -> Update {
    parse(json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": DATE,
            "chat": private_chat(user_id),
            "from": user(user_id),
            "document": {
                "file_id": "BQACAgIAAxkBAAI",
                "file_unique_id": "AgAD",
                "file_name": "kitten.jpg",
                "mime_type": mime_type,
                "file_size": 2048
            }
        }
    }))
}

/// Callback query with `data` from `user_id`.
pub fn callback_query_update(update_id: i32, user_id: i64, data: &str) -> Update {
    parse(json!({
        "update_id": update_id,
        "callback_query": {
            "id": update_id.to_string(),
            "from": user(user_id),
            "chat_instance": "instance",
            "data": data
        }
    }))
}

/// Inline query with `query` text from `user_id`.
pub fn inline_query_update(update_id: i32, user_id: i64, query: &str) -> Update {
    parse(json!({
        "update_id": update_id,
        "inline_query": {
            "id": update_id.to_string(),
            "from": user(user_id),
            "query": query,
            "offset": ""
        }
    }))
}

/// Channel post: has no originating user.
pub fn channel_post_update(update_id: i32, chat_id: i64, text: &str) -> Update {
    parse(json!({
        "update_id": update_id,
        "channel_post": {
            "message_id": update_id,
            "date": DATE,
            "chat": { "id": chat_id, "type": "channel", "title": "News" },
            "text": text
        }
    }))
}
