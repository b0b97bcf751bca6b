//! Host command registry.
//!
//! A plain function table mapping command names to handlers, independent
//! of any particular host's registration mechanism. Rendered pages embed
//! `command:<name>?<urlencoded JSON [args]>` URIs; `dispatch_uri` parses
//! that shape back and routes to the named handler.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use guidepost_core::dispatcher::{self, DispatchError};
use guidepost_core::navigation::{self, NavigationError};
use guidepost_core::session::Session;
use guidepost_core::types::{CommandOrigin, CommandRequest, TargetStep};
use guidepost_render::{LOAD_PAGE_COMMAND, RELOAD_PAGE_COMMAND, SEND_TEXT_COMMAND};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("malformed command uri: {0}")]
    MalformedUri(String),
    #[error("bad payload: {0}")]
    BadPayload(#[from] serde_json::Error),
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("navigation failed: {0}")]
    Navigation(#[from] NavigationError),
}

/// A host-invocable command: a name plus a payload handler.
#[async_trait]
pub trait HostCommand: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, payload: Value, session: &Session) -> Result<(), CommandError>;
}

/// Command lookup by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn HostCommand>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in guidepost commands.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SendTextCommand));
        registry.register(Arc::new(LoadPageCommand));
        registry.register(Arc::new(ReloadPageCommand));
        registry
    }

    pub fn register(&mut self, command: Arc<dyn HostCommand>) {
        self.commands.insert(command.name().to_string(), command);
    }

    /// All registered command names.
    pub fn names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    /// Invoke a command by name.
    pub async fn invoke(
        &self,
        name: &str,
        payload: Value,
        session: &Session,
    ) -> Result<(), CommandError> {
        match self.commands.get(name) {
            Some(command) => command.invoke(payload, session).await,
            None => Err(CommandError::Unknown(name.to_string())),
        }
    }

    /// Parse and route a full command URI.
    pub async fn dispatch_uri(&self, uri: &str, session: &Session) -> Result<(), CommandError> {
        let (name, payload) = parse_command_uri(uri)?;
        tracing::debug!(command = %name, "dispatching command uri");
        self.invoke(&name, payload, session).await
    }
}

/// Split a `command:<name>?<urlencoded JSON [args]>` URI into its name and
/// the unwrapped single-argument payload.
fn parse_command_uri(uri: &str) -> Result<(String, Value), CommandError> {
    let rest = uri
        .strip_prefix("command:")
        .ok_or_else(|| CommandError::MalformedUri(uri.to_string()))?;

    let (name, query) = match rest.split_once('?') {
        Some((name, query)) => (name, Some(query)),
        None => (rest, None),
    };

    let payload = match query {
        Some(query) => {
            let decoded = urlencoding::decode(query)
                .map_err(|_| CommandError::MalformedUri(uri.to_string()))?;
            let args: Value = serde_json::from_str(&decoded)?;
            // Args travel as a single-element array.
            match args {
                Value::Array(mut items) if items.len() == 1 => items.remove(0),
                other => other,
            }
        }
        None => Value::Null,
    };

    Ok((name.to_string(), payload))
}

/// `guidepost.sendText`: run one code-block command.
pub struct SendTextCommand;

#[async_trait]
impl HostCommand for SendTextCommand {
    fn name(&self) -> &str {
        SEND_TEXT_COMMAND
    }

    async fn invoke(&self, payload: Value, session: &Session) -> Result<(), CommandError> {
        let request: CommandRequest = serde_json::from_value(payload)?;
        let resolved = request.resolve(CommandOrigin::Interactive);
        dispatcher::dispatch(&resolved, session).await?;
        Ok(())
    }
}

/// `guidepost.loadPage`: navigate to a step.
pub struct LoadPageCommand;

#[async_trait]
impl HostCommand for LoadPageCommand {
    fn name(&self) -> &str {
        LOAD_PAGE_COMMAND
    }

    async fn invoke(&self, payload: Value, session: &Session) -> Result<(), CommandError> {
        let target: TargetStep = serde_json::from_value(payload)?;
        navigation::load_step(&target.step, session).await?;
        Ok(())
    }
}

/// `guidepost.reloadPage`: re-enter the current step. Takes no payload.
pub struct ReloadPageCommand;

#[async_trait]
impl HostCommand for ReloadPageCommand {
    fn name(&self) -> &str {
        RELOAD_PAGE_COMMAND
    }

    async fn invoke(&self, _payload: Value, session: &Session) -> Result<(), CommandError> {
        navigation::reload_step(session).await?;
        Ok(())
    }
}
