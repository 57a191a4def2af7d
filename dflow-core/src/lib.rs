//! # dflow-core
//!
//! Core of the dialog-flow Telegram connector: the per-user [`Context`], the response model
//! ([`Response`], [`ResponsePayload`]), the update classifier, the response adapter that turns
//! a response into ordered [`SendOperation`]s, and the traits the other crates plug into
//! ([`Bot`], [`ContextStore`], [`ContextLifecycle`], [`Middleware`], [`Handler`], [`Actor`]).

pub mod adapter;
pub mod bot;
pub mod context;
pub mod error;
pub mod logger;
pub mod response;
pub mod store;
pub mod types;
pub mod update;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use adapter::{
    adapt, adapt_response, AdapterOptions, EmptyTextPolicy, MediaItem, MediaRef, SendOperation,
    MEDIA_SEND_ORDER,
};
pub use bot::Bot;
pub use context::{ConnectorState, Context, NodeLabel};
pub use error::{DflowError, Result};
pub use logger::init_tracing;
pub use response::{
    Attachment, AttachmentGroup, Button, GenericResponse, GroupItem, Keyboard, Location,
    MediaKind, MediaSource, Response, ResponsePayload,
};
pub use store::ContextStore;
pub use types::{Actor, ContextLifecycle, Handler, HandlerResponse, Middleware};
pub use update::{
    classify, message_of, ClassifiedUpdate, IdentityScheme, UpdateCategory, NO_TEXT_SENTINEL,
};
