//! Terminal abstraction and lookup.
//!
//! The host owns terminal processes; this crate only ever needs the single
//! capability of sending literal text for execution.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::TerminalId;

/// Failure sending text to a terminal.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("terminal unavailable: {0}")]
    Closed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A handle to one managed terminal session.
#[async_trait]
pub trait Terminal: Send + Sync {
    /// Send literal text to the terminal for execution.
    async fn send_text(&self, text: &str) -> Result<(), TerminalError>;
}

/// Ordered terminal lookup; order is configuration order. Built once per
/// session by the layout collaborator and read-only afterwards.
#[derive(Default)]
pub struct TerminalRegistry {
    ordered: Vec<(TerminalId, Arc<dyn Terminal>)>,
    index: HashMap<TerminalId, usize>,
}

impl TerminalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a terminal; re-registering an id replaces its handle while
    /// keeping its position.
    pub fn register(&mut self, id: TerminalId, terminal: Arc<dyn Terminal>) {
        match self.index.get(&id) {
            Some(position) => self.ordered[*position] = (id, terminal),
            None => {
                self.index.insert(id.clone(), self.ordered.len());
                self.ordered.push((id, terminal));
            }
        }
    }

    pub fn get(&self, id: &TerminalId) -> Option<Arc<dyn Terminal>> {
        self.index
            .get(id)
            .map(|position| self.ordered[*position].1.clone())
    }

    /// The terminal at position 0 in configuration order.
    pub fn first(&self) -> Option<Arc<dyn Terminal>> {
        self.ordered.first().map(|(_, terminal)| terminal.clone())
    }

    /// Resolve a routing hint to a terminal handle.
    ///
    /// A present, known id resolves to that terminal; an absent or unknown
    /// id falls back to the first configured terminal. `None` only when no
    /// terminal exists at all.
    pub fn resolve(&self, hint: Option<&TerminalId>) -> Option<Arc<dyn Terminal>> {
        match hint {
            Some(id) => self.get(id).or_else(|| self.first()),
            None => self.first(),
        }
    }

    /// Terminal ids in configuration order.
    pub fn ids(&self) -> Vec<TerminalId> {
        self.ordered.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
