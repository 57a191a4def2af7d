//! # Handlers for the dialog-flow connector
//!
//! [`DialogHandler`] runs the dialog engine for one turn and delivers the response it
//! produced.

mod dialog_handler;

#[cfg(test)]
mod test;

pub use dialog_handler::DialogHandler;
