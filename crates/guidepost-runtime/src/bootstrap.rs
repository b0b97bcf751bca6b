//! Session assembly.
//!
//! Builds an explicit `Session` from scenario configuration plus the
//! collaborator handles. Terminal order always follows the configuration,
//! regardless of the order handles were attached in.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use guidepost_config::ScenarioConfig;
use guidepost_core::session::{DisplaySurface, OnLoadCommandMap, Session, StepPresenter};
use guidepost_core::terminal::{Terminal, TerminalRegistry};
use guidepost_core::types::TerminalId;

use crate::display::NullDisplay;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("no handle provided for configured terminal '{0}'")]
    MissingTerminal(TerminalId),
    #[error("a step presenter is required")]
    MissingPresenter,
}

/// Assembles a `Session` from configuration and collaborator handles.
pub struct SessionBuilder {
    config: ScenarioConfig,
    handles: HashMap<TerminalId, Arc<dyn Terminal>>,
    presenter: Option<Arc<dyn StepPresenter>>,
    display: Arc<dyn DisplaySurface>,
}

impl SessionBuilder {
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            handles: HashMap::new(),
            presenter: None,
            display: Arc::new(NullDisplay),
        }
    }

    /// Attach the handle for one configured terminal.
    pub fn terminal(mut self, id: impl Into<TerminalId>, handle: Arc<dyn Terminal>) -> Self {
        self.handles.insert(id.into(), handle);
        self
    }

    pub fn presenter(mut self, presenter: Arc<dyn StepPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn display(mut self, display: Arc<dyn DisplaySurface>) -> Self {
        self.display = display;
        self
    }

    /// Build the session. Every configured terminal must have a handle;
    /// handles for unknown ids are ignored.
    pub fn build(self) -> Result<Session, BootstrapError> {
        let mut registry = TerminalRegistry::new();
        for spec in &self.config.layout.terminals {
            let id = TerminalId::from(spec.id.as_str());
            let handle = self
                .handles
                .get(&id)
                .cloned()
                .ok_or_else(|| BootstrapError::MissingTerminal(id.clone()))?;
            registry.register(id, handle);
        }

        let presenter = self.presenter.ok_or(BootstrapError::MissingPresenter)?;
        let on_load: OnLoadCommandMap = self.config.navigation.on_load_commands;

        tracing::debug!(
            terminals = registry.len(),
            steps_with_commands = on_load.len(),
            "session assembled"
        );
        Ok(Session::new(registry, on_load, presenter, self.display))
    }
}
