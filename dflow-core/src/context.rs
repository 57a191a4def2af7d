//! Per-user conversation state shared with the dialog engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use teloxide::types::Update;

use crate::response::ResponsePayload;

/// Position in the dialog graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLabel {
    pub flow: String,
    pub node: String,
}

impl NodeLabel {
    pub fn new(flow: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            node: node.into(),
        }
    }
}

/// Transient connector data. Overwritten every turn, never serialized, never compacted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectorState {
    pub current_update: Option<Box<Update>>,
}

/// Conversation context for one identity.
///
/// Histories are keyed by a turn index that keeps growing after [`Context::clear`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    #[serde(default)]
    pub requests: BTreeMap<u64, String>,
    #[serde(default)]
    pub responses: BTreeMap<u64, ResponsePayload>,
    #[serde(default)]
    pub labels: BTreeMap<u64, NodeLabel>,
    /// Free-form scratch area for dialog scripts.
    #[serde(default)]
    pub misc: serde_json::Map<String, serde_json::Value>,
    #[serde(skip)]
    pub connector: ConnectorState,
}

fn next_index<V>(map: &BTreeMap<u64, V>) -> u64 {
    map.keys().next_back().map(|k| k + 1).unwrap_or(0)
}

fn retain_last<V>(map: &mut BTreeMap<u64, V>, keep: usize) {
    while map.len() > keep {
        map.pop_first();
    }
}

impl Context {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn add_request(&mut self, request: impl Into<String>) -> u64 {
        let index = next_index(&self.requests);
        self.requests.insert(index, request.into());
        index
    }

    pub fn add_response(&mut self, response: impl Into<ResponsePayload>) -> u64 {
        let index = next_index(&self.responses);
        self.responses.insert(index, response.into());
        index
    }

    pub fn add_label(&mut self, label: NodeLabel) -> u64 {
        let index = next_index(&self.labels);
        self.labels.insert(index, label);
        index
    }

    pub fn last_request(&self) -> Option<&str> {
        self.requests.values().next_back().map(String::as_str)
    }

    pub fn last_response(&self) -> Option<&ResponsePayload> {
        self.responses.values().next_back()
    }

    pub fn last_label(&self) -> Option<&NodeLabel> {
        self.labels.values().next_back()
    }

    /// Stores the inbound update of the current turn, replacing the previous one.
    pub fn set_current_update(&mut self, update: Update) {
        self.connector.current_update = Some(Box::new(update));
    }

    pub fn current_update(&self) -> Option<&Update> {
        self.connector.current_update.as_deref()
    }

    /// Compacts histories to the last `hold_last_n` entries each (at least one, so turn
    /// indices continue from the kept tail). `misc` and the current update are kept.
    pub fn clear(&mut self, hold_last_n: usize) {
        let keep = hold_last_n.max(1);
        retain_last(&mut self.requests, keep);
        retain_last(&mut self.responses, keep);
        retain_last(&mut self.labels, keep);
    }
}
