//! Demo bots for the dialog-flow connector.
//!
//! [`script`] is a minimal dialog engine (labelled nodes, prioritized transitions, fallback)
//! used only to drive the demos; [`scripts`] holds the demo scripts; [`cli`] the shared
//! command line.

pub mod cli;
pub mod script;
pub mod scripts;
