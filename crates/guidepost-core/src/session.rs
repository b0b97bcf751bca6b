//! Session context shared by every core operation.
//!
//! One `Session` value per scenario run, passed by reference into parsing,
//! dispatch, and navigation. Nothing in this crate is ambient or static,
//! so tests and multi-session hosts can build as many isolated sessions
//! as they need.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::ledger::InvocationLedger;
use crate::navigation::StepHistory;
use crate::terminal::TerminalRegistry;
use crate::types::{CodeBlockId, OnLoadCommand, StepId, TerminalId};

/// Failure presenting a step: loading, rendering, or displaying it.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("step resource not found: {0}")]
    NotFound(StepId),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Renders a step and pushes it to the display surface.
///
/// Implemented by the rendering collaborator; the navigation state machine
/// only sees this seam.
#[async_trait]
pub trait StepPresenter: Send + Sync {
    async fn present(&self, step: &StepId) -> Result<(), PresentError>;
}

/// Display surface for rendered content. Exposes no feedback into the
/// core; notification clearing is purely cosmetic.
#[async_trait]
pub trait DisplaySurface: Send + Sync {
    async fn show(&self, html: &str);
    async fn clear_notifications(&self);
}

/// Per-step map of configured on-load commands, keyed by terminal.
pub type OnLoadCommandMap = HashMap<StepId, BTreeMap<TerminalId, OnLoadCommand>>;

/// Explicit session context: terminals, configuration-driven on-load
/// commands, the invocation ledger, and the step history.
pub struct Session {
    terminals: TerminalRegistry,
    on_load_commands: OnLoadCommandMap,
    presenter: Arc<dyn StepPresenter>,
    display: Arc<dyn DisplaySurface>,
    ledger: RwLock<InvocationLedger>,
    history: RwLock<StepHistory>,
}

impl Session {
    pub fn new(
        terminals: TerminalRegistry,
        on_load_commands: OnLoadCommandMap,
        presenter: Arc<dyn StepPresenter>,
        display: Arc<dyn DisplaySurface>,
    ) -> Self {
        Self {
            terminals,
            on_load_commands,
            presenter,
            display,
            ledger: RwLock::new(InvocationLedger::new()),
            history: RwLock::new(StepHistory::new()),
        }
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        &self.terminals
    }

    pub fn on_load_commands(&self, step: &StepId) -> Option<&BTreeMap<TerminalId, OnLoadCommand>> {
        self.on_load_commands.get(step)
    }

    pub fn presenter(&self) -> &dyn StepPresenter {
        self.presenter.as_ref()
    }

    pub fn display(&self) -> &dyn DisplaySurface {
        self.display.as_ref()
    }

    /// Recorded dispatches for a block (0 if never dispatched).
    pub fn invocation_count(&self, id: &CodeBlockId) -> u32 {
        self.ledger
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
    }

    /// Record one successful dispatch for a block.
    pub(crate) fn record_invocation(&self, id: &CodeBlockId) {
        self.ledger
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .increment(id);
    }

    /// Most recently entered step, if any.
    pub fn current_step(&self) -> Option<StepId> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
            .cloned()
    }

    /// Snapshot of the visited-step sequence, oldest first.
    pub fn history_snapshot(&self) -> Vec<StepId> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .to_vec()
    }

    pub(crate) fn push_history(&self, step: StepId) {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(step);
    }
}
