//! Minimal dialog engine for the demos: nodes addressed by [`NodeLabel`], each with a
//! response and prioritized transitions guarded by [`Condition`]s.
//!
//! A turn starts from the context's last label (the start label on the first turn),
//! evaluates global and node transitions, moves to the highest-priority target whose
//! condition holds (the fallback when none does), then records the new label and the
//! node's response.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dflow_core::{Actor, Context, DflowError, NodeLabel, ResponsePayload, Result};
use dflow_telegram::Condition;
use tracing::debug;

#[derive(Clone)]
pub struct Transition {
    pub target: NodeLabel,
    pub priority: f32,
    pub condition: Condition,
}

impl Transition {
    pub fn to(flow: &str, node: &str, condition: Condition) -> Self {
        Self {
            target: NodeLabel::new(flow, node),
            priority: 1.0,
            condition,
        }
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }
}

struct Node {
    response: ResponsePayload,
    transitions: Vec<Transition>,
}

pub struct Script {
    nodes: HashMap<NodeLabel, Node>,
    global: Vec<Transition>,
    start: NodeLabel,
    fallback: NodeLabel,
}

impl Script {
    pub fn new(start: NodeLabel, fallback: NodeLabel) -> Self {
        Self {
            nodes: HashMap::new(),
            global: Vec::new(),
            start,
            fallback,
        }
    }

    /// Transition checked from every node.
    pub fn global(mut self, transition: Transition) -> Self {
        self.global.push(transition);
        self
    }

    pub fn node(
        mut self,
        flow: &str,
        node: &str,
        response: impl Into<ResponsePayload>,
        transitions: Vec<Transition>,
    ) -> Self {
        self.nodes.insert(
            NodeLabel::new(flow, node),
            Node {
                response: response.into(),
                transitions,
            },
        );
        self
    }

    /// Fails when the start or fallback label has no node.
    pub fn into_actor(self) -> Result<ScriptActor> {
        for label in [&self.start, &self.fallback] {
            if !self.nodes.contains_key(label) {
                return Err(DflowError::Config(format!(
                    "Script has no node {}/{}",
                    label.flow, label.node
                )));
            }
        }
        Ok(ScriptActor {
            script: Arc::new(self),
        })
    }

    fn next_label(&self, ctx: &Context) -> NodeLabel {
        let current = ctx.last_label().unwrap_or(&self.start);
        let local = self
            .nodes
            .get(current)
            .map(|node| node.transitions.as_slice())
            .unwrap_or_default();

        let mut best: Option<&Transition> = None;
        for transition in self.global.iter().chain(local) {
            if best.is_some_and(|b| b.priority >= transition.priority) {
                continue;
            }
            if (transition.condition)(ctx) {
                best = Some(transition);
            }
        }

        best.map(|t| t.target.clone())
            .filter(|label| self.nodes.contains_key(label))
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Clone)]
pub struct ScriptActor {
    script: Arc<Script>,
}

#[async_trait]
impl Actor for ScriptActor {
    async fn turn(&self, ctx: &mut Context) -> Result<()> {
        let label = self.script.next_label(ctx);
        let node = self.script.nodes.get(&label).ok_or_else(|| {
            DflowError::Handler(format!("Script has no node {}/{}", label.flow, label.node))
        })?;
        debug!(flow = %label.flow, node = %label.node, "Script transition");

        ctx.add_response(node.response.clone());
        ctx.add_label(label);
        Ok(())
    }
}

/// Always true.
pub fn always() -> Condition {
    Arc::new(|_| true)
}

/// Last request equals `text`.
pub fn exact_match(text: &str) -> Condition {
    let text = text.to_string();
    Arc::new(move |ctx: &Context| ctx.last_request() == Some(text.as_str()))
}

/// Any of `conditions` holds.
pub fn any(conditions: Vec<Condition>) -> Condition {
    Arc::new(move |ctx: &Context| conditions.iter().any(|c| c(ctx)))
}
