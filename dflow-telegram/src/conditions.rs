//! Condition adapter: builds dialog transition conditions from teloxide-style handler
//! filters. A condition inspects the update stored in the context for the current turn.
//!
//! ```ignore
//! let start = message_handler(HandlerFilter::new().commands(["start", "restart"]));
//! let correct = callback_query_handler(HandlerFilter::new().func(|u| callback_data(u) == Some("4")));
//! ```

use std::fmt;
use std::sync::Arc;

use dflow_core::{message_of, Context, DflowError, Result, UpdateCategory};
use regex::{Regex, RegexBuilder};
use teloxide::types::{Chat, Message, Update, UpdateKind};

/// Transition condition evaluated by the dialog engine.
pub type Condition = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Custom predicate over the raw update.
pub type UpdatePredicate = Arc<dyn Fn(&Update) -> bool + Send + Sync>;

/// Filter arguments of a handler. Every set field must pass.
#[derive(Clone, Default)]
pub struct HandlerFilter {
    /// Command names without the leading slash.
    pub commands: Vec<String>,
    /// Matched case-insensitively against the update text.
    pub regexp: Option<Regex>,
    /// Message content types (`text`, `photo`, `document`, ...).
    pub content_types: Vec<String>,
    /// Chat types (`private`, `group`, `supergroup`, `channel`).
    pub chat_types: Vec<String>,
    pub func: Option<UpdatePredicate>,
}

impl fmt::Debug for HandlerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFilter")
            .field("commands", &self.commands)
            .field("regexp", &self.regexp.as_ref().map(Regex::as_str))
            .field("content_types", &self.content_types)
            .field("chat_types", &self.chat_types)
            .field("func", &self.func.is_some())
            .finish()
    }
}

impl HandlerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands = commands
            .into_iter()
            .map(|c| c.into().trim_start_matches('/').to_string())
            .collect();
        self
    }

    /// Fails with [`DflowError::Config`] when the pattern does not compile.
    pub fn regexp(mut self, pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DflowError::Config(format!("Invalid regexp {:?}: {}", pattern, e)))?;
        self.regexp = Some(regex);
        Ok(self)
    }

    pub fn content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn chat_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chat_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn func<F>(mut self, func: F) -> Self
    where
        F: Fn(&Update) -> bool + Send + Sync + 'static,
    {
        self.func = Some(Arc::new(func));
        self
    }

    pub fn matches(&self, update: &Update) -> bool {
        let message = message_of(update);

        if !self.content_types.is_empty() {
            match message.and_then(content_type) {
                Some(kind) if self.content_types.iter().any(|t| t == kind) => {}
                _ => return false,
            }
        }

        if !self.commands.is_empty() {
            match message.and_then(Message::text).and_then(extract_command) {
                Some(command) if self.commands.iter().any(|c| c == command) => {}
                _ => return false,
            }
        }

        if let Some(regex) = &self.regexp {
            match update_text(update) {
                Some(text) if regex.is_match(text) => {}
                _ => return false,
            }
        }

        if !self.chat_types.is_empty() {
            match update.chat().map(chat_type) {
                Some(kind) if self.chat_types.iter().any(|t| t == kind) => {}
                _ => return false,
            }
        }

        self.func.as_ref().map_or(true, |func| func(update))
    }
}

/// Builds a condition that holds when the current update is of `category` and passes
/// `filter`. False when the context has no current update.
pub fn condition(category: UpdateCategory, filter: HandlerFilter) -> Condition {
    Arc::new(move |ctx: &Context| {
        ctx.current_update()
            .filter(|update| UpdateCategory::of(update) == Some(category))
            .is_some_and(|update| filter.matches(update))
    })
}

macro_rules! handler_conditions {
    ($($name:ident => $category:ident),* $(,)?) => {
        $(
            pub fn $name(filter: HandlerFilter) -> Condition {
                condition(UpdateCategory::$category, filter)
            }
        )*
    };
}

handler_conditions! {
    message_handler => Message,
    edited_message_handler => EditedMessage,
    channel_post_handler => ChannelPost,
    edited_channel_post_handler => EditedChannelPost,
    inline_handler => InlineQuery,
    chosen_inline_handler => ChosenInlineResult,
    callback_query_handler => CallbackQuery,
    shipping_query_handler => ShippingQuery,
    pre_checkout_query_handler => PreCheckoutQuery,
    poll_handler => Poll,
    poll_answer_handler => PollAnswer,
    my_chat_member_handler => MyChatMember,
    chat_member_handler => ChatMember,
    chat_join_request_handler => ChatJoinRequest,
}

/// Content type name of a message, `None` for service messages.
pub fn content_type(message: &Message) -> Option<&'static str> {
    let kind = if message.text().is_some() {
        "text"
    } else if message.photo().is_some() {
        "photo"
    } else if message.animation().is_some() {
        "animation"
    } else if message.document().is_some() {
        "document"
    } else if message.audio().is_some() {
        "audio"
    } else if message.video().is_some() {
        "video"
    } else if message.video_note().is_some() {
        "video_note"
    } else if message.voice().is_some() {
        "voice"
    } else if message.sticker().is_some() {
        "sticker"
    } else if message.venue().is_some() {
        "venue"
    } else if message.location().is_some() {
        "location"
    } else if message.contact().is_some() {
        "contact"
    } else if message.poll().is_some() {
        "poll"
    } else if message.dice().is_some() {
        "dice"
    } else {
        return None;
    };
    Some(kind)
}

pub fn chat_type(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else {
        "channel"
    }
}

/// `/start@my_bot args` → `start`.
pub fn extract_command(text: &str) -> Option<&str> {
    let token = text.strip_prefix('/')?.split_whitespace().next()?;
    let command = token.split('@').next().unwrap_or(token);
    (!command.is_empty()).then_some(command)
}

/// Text a regexp filter looks at: message text or caption, callback data, inline query.
pub fn update_text(update: &Update) -> Option<&str> {
    match &update.kind {
        UpdateKind::CallbackQuery(query) => query.data.as_deref(),
        UpdateKind::InlineQuery(query) => Some(query.query.as_str()),
        UpdateKind::ChosenInlineResult(result) => Some(result.query.as_str()),
        _ => message_of(update).and_then(|m| m.text().or_else(|| m.caption())),
    }
}

/// Data of a callback query update.
pub fn callback_data(update: &Update) -> Option<&str> {
    match &update.kind {
        UpdateKind::CallbackQuery(query) => query.data.as_deref(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dflow_core::testing::{
        callback_query_update, document_message_update, group_message_update,
        inline_query_update, photo_message_update, text_message_update,
    };

    fn ctx_with(update: Update) -> Context {
        let mut ctx = Context::new("1");
        ctx.set_current_update(update);
        ctx
    }

    #[test]
    fn test_no_current_update_is_false() {
        let cond = message_handler(HandlerFilter::new());
        assert!(!cond(&Context::new("1")));
    }

    #[test]
    fn test_wrong_category_is_false() {
        let cond = callback_query_handler(HandlerFilter::new());
        assert!(!cond(&ctx_with(text_message_update(1, 1, "hi"))));

        let cond = message_handler(HandlerFilter::new());
        assert!(!cond(&ctx_with(callback_query_update(1, 1, "4"))));
    }

    #[test]
    fn test_commands() {
        let cond = message_handler(HandlerFilter::new().commands(["start", "/restart"]));
        assert!(cond(&ctx_with(text_message_update(1, 1, "/start"))));
        assert!(cond(&ctx_with(text_message_update(1, 1, "/restart@dflow_bot now"))));
        assert!(!cond(&ctx_with(text_message_update(1, 1, "/pets"))));
        assert!(!cond(&ctx_with(text_message_update(1, 1, "start"))));
        assert!(!cond(&ctx_with(photo_message_update(1, 1))));
    }

    #[test]
    fn test_regexp_is_case_insensitive() {
        let cond = message_handler(HandlerFilter::new().regexp("^hello").unwrap());
        assert!(cond(&ctx_with(text_message_update(1, 1, "HELLO there"))));
        assert!(!cond(&ctx_with(text_message_update(1, 1, "well hello"))));

        let inline = inline_handler(HandlerFilter::new().regexp("cats?").unwrap());
        assert!(inline(&ctx_with(inline_query_update(1, 1, "Cat pictures"))));
    }

    #[test]
    fn test_invalid_regexp_is_config_error() {
        assert!(matches!(
            HandlerFilter::new().regexp("("),
            Err(DflowError::Config(_))
        ));
    }

    #[test]
    fn test_content_types() {
        let cond = message_handler(HandlerFilter::new().content_types(["photo", "sticker"]));
        assert!(cond(&ctx_with(photo_message_update(1, 1))));
        assert!(!cond(&ctx_with(text_message_update(1, 1, "hi"))));
    }

    #[test]
    fn test_content_type_with_func() {
        let cond = message_handler(
            HandlerFilter::new()
                .content_types(["document"])
                .func(|update| {
                    message_of(update)
                        .and_then(Message::document)
                        .and_then(|d| d.mime_type.as_ref())
                        .is_some_and(|mime| mime.essence_str() == "image/jpeg")
                }),
        );
        assert!(cond(&ctx_with(document_message_update(1, 1, "image/jpeg"))));
        assert!(!cond(&ctx_with(document_message_update(1, 1, "application/pdf"))));
    }

    #[test]
    fn test_chat_types() {
        let cond = message_handler(HandlerFilter::new().chat_types(["group", "supergroup"]));
        assert!(cond(&ctx_with(group_message_update(1, -5, 1, "hi"))));
        assert!(!cond(&ctx_with(text_message_update(1, 1, "hi"))));
    }

    #[test]
    fn test_callback_func() {
        let correct =
            callback_query_handler(HandlerFilter::new().func(|u| callback_data(u) == Some("4")));
        assert!(correct(&ctx_with(callback_query_update(1, 1, "4"))));
        assert!(!correct(&ctx_with(callback_query_update(1, 1, "5"))));
    }

    #[test]
    fn test_extract_command() {
        assert_eq!(extract_command("/start"), Some("start"));
        assert_eq!(extract_command("/start@bot arg"), Some("start"));
        assert_eq!(extract_command("/"), None);
        assert_eq!(extract_command("start"), None);
    }
}
