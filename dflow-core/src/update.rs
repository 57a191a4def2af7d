//! Update classifier: category, identity and request text of an inbound update.

use std::fmt;

use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, Message, Update, UpdateKind};

use crate::error::{DflowError, Result};

/// Request text recorded when an update carries no text (callback queries, media, ...).
pub const NO_TEXT_SENTINEL: &str = "data";

/// Closed set of update categories the connector routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateCategory {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
}

impl UpdateCategory {
    /// `None` for update kinds outside the routed set.
    pub fn of(update: &Update) -> Option<Self> {
        let category = match &update.kind {
            UpdateKind::Message(_) => UpdateCategory::Message,
            UpdateKind::EditedMessage(_) => UpdateCategory::EditedMessage,
            UpdateKind::ChannelPost(_) => UpdateCategory::ChannelPost,
            UpdateKind::EditedChannelPost(_) => UpdateCategory::EditedChannelPost,
            UpdateKind::InlineQuery(_) => UpdateCategory::InlineQuery,
            UpdateKind::ChosenInlineResult(_) => UpdateCategory::ChosenInlineResult,
            UpdateKind::CallbackQuery(_) => UpdateCategory::CallbackQuery,
            UpdateKind::ShippingQuery(_) => UpdateCategory::ShippingQuery,
            UpdateKind::PreCheckoutQuery(_) => UpdateCategory::PreCheckoutQuery,
            UpdateKind::Poll(_) => UpdateCategory::Poll,
            UpdateKind::PollAnswer(_) => UpdateCategory::PollAnswer,
            UpdateKind::MyChatMember(_) => UpdateCategory::MyChatMember,
            UpdateKind::ChatMember(_) => UpdateCategory::ChatMember,
            UpdateKind::ChatJoinRequest(_) => UpdateCategory::ChatJoinRequest,
            _ => return None,
        };
        Some(category)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateCategory::Message => "message",
            UpdateCategory::EditedMessage => "edited_message",
            UpdateCategory::ChannelPost => "channel_post",
            UpdateCategory::EditedChannelPost => "edited_channel_post",
            UpdateCategory::InlineQuery => "inline_query",
            UpdateCategory::ChosenInlineResult => "chosen_inline_result",
            UpdateCategory::CallbackQuery => "callback_query",
            UpdateCategory::ShippingQuery => "shipping_query",
            UpdateCategory::PreCheckoutQuery => "pre_checkout_query",
            UpdateCategory::Poll => "poll",
            UpdateCategory::PollAnswer => "poll_answer",
            UpdateCategory::MyChatMember => "my_chat_member",
            UpdateCategory::ChatMember => "chat_member",
            UpdateCategory::ChatJoinRequest => "chat_join_request",
        }
    }
}

impl fmt::Display for UpdateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a context key is derived from an update.
///
/// `User` keys by the sender alone, so one user shares a context across chats.
/// `ChatAndUser` keys by `"<chat_id>:<user_id>"`, giving each member of a group chat a
/// separate context per chat. Updates without a chat fall back to the user id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityScheme {
    #[default]
    User,
    ChatAndUser,
}

impl std::str::FromStr for IdentityScheme {
    type Err = DflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(IdentityScheme::User),
            "chat_user" | "chat_and_user" => Ok(IdentityScheme::ChatAndUser),
            other => Err(DflowError::Config(format!(
                "Unknown identity scheme {:?} (expected `user` or `chat_user`)",
                other
            ))),
        }
    }
}

/// Result of classifying one inbound update.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedUpdate {
    pub category: UpdateCategory,
    /// Context key derived with the configured [`IdentityScheme`].
    pub user_id: String,
    /// Numeric id of the originating user.
    pub sender_id: u64,
    pub chat_id: Option<ChatId>,
    /// Text content, or [`NO_TEXT_SENTINEL`].
    pub text: String,
    pub update: Update,
}

impl ClassifiedUpdate {
    /// Chat that receives the reply: the update's chat, or the sender's private chat.
    pub fn recipient(&self) -> ChatId {
        self.chat_id.unwrap_or(ChatId(self.sender_id as i64))
    }
}

/// Message carried by message-family updates.
pub fn message_of(update: &Update) -> Option<&Message> {
    match &update.kind {
        UpdateKind::Message(m)
        | UpdateKind::EditedMessage(m)
        | UpdateKind::ChannelPost(m)
        | UpdateKind::EditedChannelPost(m) => Some(m),
        _ => None,
    }
}

fn text_of(update: &Update) -> String {
    message_of(update)
        .and_then(Message::text)
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_TEXT_SENTINEL)
        .to_string()
}

/// Classifies an update. Pure: no I/O, no logging.
///
/// Fails with [`DflowError::MalformedUpdate`] when the update kind is not routed or the
/// update has no originating user.
pub fn classify(update: Update, scheme: IdentityScheme) -> Result<ClassifiedUpdate> {
    let category = UpdateCategory::of(&update).ok_or_else(|| {
        DflowError::MalformedUpdate(format!("update {} has an unsupported kind", update.id.0))
    })?;

    let sender_id = update
        .from()
        .map(|user| user.id.0)
        .ok_or_else(|| {
            DflowError::MalformedUpdate(format!(
                "{} update {} carries no originating user",
                category, update.id.0
            ))
        })?;

    let chat_id = update.chat().map(|chat| chat.id);
    let user_id = match (scheme, chat_id) {
        (IdentityScheme::ChatAndUser, Some(chat)) => format!("{}:{}", chat.0, sender_id),
        _ => sender_id.to_string(),
    };

    Ok(ClassifiedUpdate {
        category,
        user_id,
        sender_id,
        chat_id,
        text: text_of(&update),
        update,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_classify_text_message() {
        let update = testing::text_message_update(7, 42, "Hello");
        let classified = classify(update, IdentityScheme::User).unwrap();
        assert_eq!(classified.category, UpdateCategory::Message);
        assert_eq!(classified.user_id, "42");
        assert_eq!(classified.text, "Hello");
        assert_eq!(classified.recipient(), ChatId(42));
    }

    #[test]
    fn test_classify_callback_query_uses_sentinel() {
        let update = testing::callback_query_update(8, 42, "4");
        let classified = classify(update, IdentityScheme::User).unwrap();
        assert_eq!(classified.category, UpdateCategory::CallbackQuery);
        assert_eq!(classified.user_id, "42");
        assert_eq!(classified.text, NO_TEXT_SENTINEL);
    }

    #[test]
    fn test_classify_empty_text_uses_sentinel() {
        let update = testing::text_message_update(9, 42, "");
        let classified = classify(update, IdentityScheme::User).unwrap();
        assert_eq!(classified.text, NO_TEXT_SENTINEL);
    }

    #[test]
    fn test_classify_without_sender_is_malformed() {
        let update = testing::channel_post_update(10, -100123, "post");
        let result = classify(update, IdentityScheme::User);
        assert!(matches!(result, Err(DflowError::MalformedUpdate(_))));
    }

    #[test]
    fn test_chat_and_user_identity() {
        let update = testing::group_message_update(11, -555, 42, "hi all");
        let classified = classify(update, IdentityScheme::ChatAndUser).unwrap();
        assert_eq!(classified.user_id, "-555:42");
        assert_eq!(classified.recipient(), ChatId(-555));

        let update = testing::group_message_update(12, -555, 42, "hi all");
        let classified = classify(update, IdentityScheme::User).unwrap();
        assert_eq!(classified.user_id, "42");
    }

    #[test]
    fn test_identity_scheme_parses() {
        assert_eq!("user".parse::<IdentityScheme>().unwrap(), IdentityScheme::User);
        assert_eq!(
            "chat_user".parse::<IdentityScheme>().unwrap(),
            IdentityScheme::ChatAndUser
        );
        assert!("nobody".parse::<IdentityScheme>().is_err());
    }
}
