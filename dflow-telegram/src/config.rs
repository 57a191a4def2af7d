//! Connector config: token, API URL, log path, context database and dialog options.
//! Loaded from environment variables BOT_TOKEN, TELEGRAM_API_URL (or TELOXIDE_API_URL),
//! LOG_FILE, DATABASE_URL, IDENTITY_SCHEME, SEND_EMPTY_TEXT, HISTORY_LIMIT.

use anyhow::Result;
use dflow_core::{AdapterOptions, EmptyTextPolicy, IdentityScheme};
use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    pub log_file: Option<String>,
    /// SQLite URL for contexts; in-memory store when unset.
    pub database_url: Option<String>,
    pub identity_scheme: IdentityScheme,
    pub empty_text: EmptyTextPolicy,
    /// Keep only this many turns of history per context.
    pub history_limit: Option<usize>,
}

impl TelegramConfig {
    /// Loads from environment variables: BOT_TOKEN is required, the rest optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads from an arbitrary key lookup (environment, map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = non_empty("BOT_TOKEN").ok_or_else(|| anyhow::anyhow!("BOT_TOKEN not set"))?;
        let telegram_api_url = non_empty("TELEGRAM_API_URL").or_else(|| non_empty("TELOXIDE_API_URL"));

        let identity_scheme = match non_empty("IDENTITY_SCHEME") {
            Some(value) => value.parse()?,
            None => IdentityScheme::default(),
        };

        let empty_text = match non_empty("SEND_EMPTY_TEXT") {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => EmptyTextPolicy::Always,
                "false" | "0" | "no" => EmptyTextPolicy::SkipWhenBare,
                other => anyhow::bail!("SEND_EMPTY_TEXT must be true or false, got {:?}", other),
            },
            None => EmptyTextPolicy::default(),
        };

        let history_limit = non_empty("HISTORY_LIMIT")
            .map(|value| {
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| anyhow::anyhow!("HISTORY_LIMIT must be a number: {}", e))
            })
            .transpose()?;

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file: non_empty("LOG_FILE"),
            database_url: non_empty("DATABASE_URL"),
            identity_scheme,
            empty_text,
            history_limit,
        })
    }

    /// Uses the given token, defaults for the rest.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
            log_file: None,
            database_url: None,
            identity_scheme: IdentityScheme::default(),
            empty_text: EmptyTextPolicy::default(),
            history_limit: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if self.history_limit == Some(0) {
            anyhow::bail!("HISTORY_LIMIT must be at least 1");
        }
        Ok(())
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            empty_text: self.empty_text,
        }
    }
}
