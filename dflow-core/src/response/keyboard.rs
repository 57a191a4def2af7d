//! UI descriptor: an ordered button list laid out as inline or reply keyboard, or a
//! "remove keyboard" marker. Rendered into teloxide's [`ReplyMarkup`].

use serde::{Deserialize, Serialize};
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, KeyboardRemove,
    ReplyMarkup,
};

use crate::error::{DflowError, Result};

pub const DEFAULT_ROW_WIDTH: usize = 3;

fn default_inline() -> bool {
    true
}

fn default_row_width() -> usize {
    DEFAULT_ROW_WIDTH
}

/// One keyboard button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    /// Navigation target; only meaningful on inline keyboards.
    #[serde(default, alias = "source", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Opaque callback payload; strings are sent as-is, other JSON values serialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            payload: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<serde_json::Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Callback data for an inline button without a URL. Falls back to the button text.
    pub fn callback_data(&self) -> String {
        match &self.payload {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => self.text.clone(),
        }
    }

    fn to_inline(&self) -> Result<InlineKeyboardButton> {
        match &self.url {
            Some(url) => {
                let url = reqwest::Url::parse(url).map_err(|e| {
                    DflowError::InvalidKeyboard(format!(
                        "Button {:?} has malformed url {}: {}",
                        self.text, url, e
                    ))
                })?;
                Ok(InlineKeyboardButton::url(self.text.clone(), url))
            }
            None => Ok(InlineKeyboardButton::callback(
                self.text.clone(),
                self.callback_data(),
            )),
        }
    }
}

/// Keyboard attached to the final text message of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Keyboard {
    Buttons {
        buttons: Vec<Button>,
        #[serde(default = "default_inline")]
        is_inline: bool,
        #[serde(default = "default_row_width")]
        row_width: usize,
    },
    /// Removes a previously shown reply keyboard.
    Remove,
}

impl Keyboard {
    pub fn inline(buttons: Vec<Button>) -> Self {
        Keyboard::Buttons {
            buttons,
            is_inline: true,
            row_width: DEFAULT_ROW_WIDTH,
        }
    }

    pub fn reply(buttons: Vec<Button>) -> Self {
        Keyboard::Buttons {
            buttons,
            is_inline: false,
            row_width: DEFAULT_ROW_WIDTH,
        }
    }

    /// Sets the row width; no effect on [`Keyboard::Remove`].
    pub fn with_row_width(mut self, width: usize) -> Self {
        if let Keyboard::Buttons { row_width, .. } = &mut self {
            *row_width = width;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Keyboard::Remove => Ok(()),
            Keyboard::Buttons {
                buttons, row_width, ..
            } => {
                if buttons.is_empty() {
                    return Err(DflowError::InvalidKeyboard(
                        "`buttons` are required unless the keyboard is Remove".to_string(),
                    ));
                }
                if *row_width == 0 {
                    return Err(DflowError::InvalidKeyboard(
                        "`row_width` must be positive".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Maps the descriptor to a Bot API reply markup, keeping button order and wrapping
    /// rows at `row_width`.
    pub fn render(&self) -> Result<ReplyMarkup> {
        self.validate()?;
        match self {
            Keyboard::Remove => Ok(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
            Keyboard::Buttons {
                buttons,
                is_inline: true,
                row_width,
            } => {
                let rows = buttons
                    .chunks(*row_width)
                    .map(|row| row.iter().map(Button::to_inline).collect::<Result<Vec<_>>>())
                    .collect::<Result<Vec<_>>>()?;
                Ok(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows)))
            }
            Keyboard::Buttons {
                buttons,
                is_inline: false,
                row_width,
            } => {
                let rows: Vec<Vec<KeyboardButton>> = buttons
                    .chunks(*row_width)
                    .map(|row| {
                        row.iter()
                            .map(|button| KeyboardButton::new(button.text.clone()))
                            .collect()
                    })
                    .collect();
                Ok(ReplyMarkup::Keyboard(KeyboardMarkup::new(rows)))
            }
        }
    }
}
