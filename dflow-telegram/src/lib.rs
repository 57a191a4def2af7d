//! # dflow-telegram
//!
//! Telegram layer of the dialog-flow connector: [`TelegramBotAdapter`] executes send
//! operations through teloxide, [`conditions`] turns teloxide handler filters into dialog
//! transition conditions, [`TelegramConfig`] loads env config, and [`run_polling`] feeds
//! classified updates into a [`handler_chain::HandlerChain`].

mod bot_adapter;
pub mod conditions;
mod components;
mod config;
mod runner;

pub use bot_adapter::TelegramBotAdapter;
pub use components::{build_context_store, build_handler_chain, build_teloxide_bot};
pub use conditions::{condition, Condition, HandlerFilter};
pub use config::TelegramConfig;
pub use runner::{process_update, run_dialog_bot, run_polling};
