//! Command descriptor types.
//!
//! The serde representation of these types is a wire contract: the
//! directive mini-language and the command-URI payloads both use camelCase
//! field names, and an invocation budget is either a JSON number or the
//! literal string `"unlimited"`.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::types::StepId;

/// Strongly-typed terminal ID. Order among terminals is configuration
/// order; the first configured terminal is the routing fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerminalId(pub String);

impl TerminalId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TerminalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TerminalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

const CB_ID_SEPARATOR: &str = ":";
const IN_PAGE_TAG: &str = "inPage";
const ON_LOAD_TAG: &str = "onLoad";

/// Budget-tracking key for one executable block occurrence.
///
/// The derivation is deterministic so that re-rendering the same step
/// reproduces the same ids: budgets are step-scoped, not render-pass-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeBlockId(String);

impl CodeBlockId {
    /// Id for a clicked in-page block: its zero-based position among the
    /// untagged fences of one render pass of `step`.
    pub fn in_page(step: &StepId, index: usize) -> Self {
        Self(format!(
            "{}{}{}{}{}",
            IN_PAGE_TAG, CB_ID_SEPARATOR, step, CB_ID_SEPARATOR, index
        ))
    }

    /// Id for a configuration-driven on-load command.
    pub fn on_load(step: &StepId, terminal: &TerminalId) -> Self {
        Self(format!(
            "{}{}{}{}{}",
            ON_LOAD_TAG, CB_ID_SEPARATOR, step, CB_ID_SEPARATOR, terminal
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Invocation budget for one code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationLimit {
    /// At most this many dispatches over the block's lifetime.
    Bounded(u32),
    /// No bound.
    Unlimited,
}

impl InvocationLimit {
    /// Whether one more dispatch is allowed after `used` prior ones.
    pub fn allows(&self, used: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Bounded(max) => used < *max,
        }
    }
}

impl Serialize for InvocationLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bounded(count) => serializer.serialize_u32(*count),
            Self::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for InvocationLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(u32),
            Keyword(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Count(count) => Ok(Self::Bounded(count)),
            Repr::Keyword(word) if word == "unlimited" => Ok(Self::Unlimited),
            Repr::Keyword(word) => Err(DeError::custom(format!(
                "invalid invocation limit '{}': expected a number or \"unlimited\"",
                word
            ))),
        }
    }
}

impl fmt::Display for InvocationLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(count) => count.fmt(f),
            Self::Unlimited => "unlimited".fmt(f),
        }
    }
}

/// Where a command came from. The default-budget policy lives here and
/// nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    /// Clicked in-page code block.
    Interactive,
    /// Configuration-driven on-load command.
    OnLoad,
}

impl CommandOrigin {
    pub fn default_limit(&self) -> InvocationLimit {
        match self {
            Self::Interactive => InvocationLimit::Unlimited,
            Self::OnLoad => InvocationLimit::Bounded(1),
        }
    }
}

/// Command spec attached to a step/terminal pair in configuration, run
/// when that step becomes current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnLoadCommand {
    /// Literal text to run.
    pub command: String,
    /// Explicit `false` disables running entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_invocations: Option<InvocationLimit>,
}

impl OnLoadCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            execute: None,
            max_invocations: None,
        }
    }

    pub fn with_execute(mut self, execute: bool) -> Self {
        self.execute = Some(execute);
        self
    }

    pub fn with_max_invocations(mut self, limit: InvocationLimit) -> Self {
        self.max_invocations = Some(limit);
        self
    }
}

/// Author/wire shape of an executable command: the raw spec plus the
/// budget-tracking id, before defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub code_block_id: CodeBlockId,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<TerminalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_invocations: Option<InvocationLimit>,
}

impl CommandRequest {
    pub fn new(code_block_id: CodeBlockId, command: impl Into<String>) -> Self {
        Self {
            code_block_id,
            command: command.into(),
            terminal_id: None,
            execute: None,
            max_invocations: None,
        }
    }

    pub fn with_terminal_id(mut self, terminal_id: impl Into<TerminalId>) -> Self {
        self.terminal_id = Some(terminal_id.into());
        self
    }

    pub fn with_execute(mut self, execute: bool) -> Self {
        self.execute = Some(execute);
        self
    }

    pub fn with_max_invocations(mut self, limit: InvocationLimit) -> Self {
        self.max_invocations = Some(limit);
        self
    }

    /// Normalize into the only shape the dispatcher accepts. Only an
    /// explicit `execute: false` vetoes; a missing budget takes the
    /// origin's default.
    pub fn resolve(self, origin: CommandOrigin) -> ResolvedCommand {
        ResolvedCommand {
            code_block_id: self.code_block_id,
            command: self.command,
            terminal_id: self.terminal_id,
            execute: self.execute != Some(false),
            max_invocations: self
                .max_invocations
                .unwrap_or_else(|| origin.default_limit()),
        }
    }
}

/// Fully normalized command, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommand {
    pub code_block_id: CodeBlockId,
    pub command: String,
    pub terminal_id: Option<TerminalId>,
    pub execute: bool,
    pub max_invocations: InvocationLimit,
}
