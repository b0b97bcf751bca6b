//! # Guidepost Config
//!
//! Scenario configuration management: a single `guidepost.json` at the
//! scenario root describes the terminal layout and the per-step on-load
//! commands. The loader supplies well-informed defaults when the file is
//! absent, so the core always receives an already-valid shape.

mod loader;

pub use loader::{load_or_default, load_scenario_config, validate_config, ConfigError};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use guidepost_core::types::{OnLoadCommand, StepId, TerminalId};

/// File name of the scenario configuration, looked up in the scenario root.
pub const CONFIG_FILE_NAME: &str = "guidepost.json";
/// Conventional startup script auto-wired when no config file exists.
pub const DEFAULT_STARTUP_SCRIPT: &str = "setup.sh";
/// Terminal id used by the default single-terminal layout.
pub const DEFAULT_TERMINAL_ID: &str = "main";
/// Display name used by the default single-terminal layout.
pub const DEFAULT_TERMINAL_NAME: &str = "bash";
/// Step every scenario starts on unless told otherwise.
pub const DEFAULT_INTRO_STEP: &str = "intro";

/// One terminal pane in the scenario layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalSpec {
    pub id: String,
    /// Display name; falls back to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TerminalSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Terminal layout section. Order is meaningful: the first terminal is the
/// routing fallback for commands without a resolvable hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_terminals")]
    pub terminals: Vec<TerminalSpec>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            terminals: default_terminals(),
        }
    }
}

fn default_terminals() -> Vec<TerminalSpec> {
    vec![TerminalSpec::new(DEFAULT_TERMINAL_ID).with_name(DEFAULT_TERMINAL_NAME)]
}

/// Navigation section: per-step on-load commands keyed by terminal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationConfig {
    #[serde(default)]
    pub on_load_commands: HashMap<StepId, BTreeMap<TerminalId, OnLoadCommand>>,
}

/// Top-level scenario configuration schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

impl ScenarioConfig {
    /// On-load commands for one step, if any are configured.
    pub fn on_load_commands(&self, step: &StepId) -> Option<&BTreeMap<TerminalId, OnLoadCommand>> {
        self.navigation.on_load_commands.get(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_has_one_terminal_and_no_commands() {
        let config = ScenarioConfig::default();
        assert_eq!(config.layout.terminals.len(), 1);
        assert_eq!(config.layout.terminals[0].id, DEFAULT_TERMINAL_ID);
        assert_eq!(config.layout.terminals[0].display_name(), DEFAULT_TERMINAL_NAME);
        assert!(config.navigation.on_load_commands.is_empty());
    }

    #[test]
    fn test_config_parses_camel_case_navigation_section() {
        let config: ScenarioConfig = serde_json::from_value(json!({
            "layout": {
                "terminals": [
                    {"id": "editor", "name": "Editor"},
                    {"id": "db"},
                ]
            },
            "navigation": {
                "onLoadCommands": {
                    "intro": {
                        "editor": {"command": "./setup.sh;", "maxInvocations": 1}
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(config.layout.terminals.len(), 2);
        assert_eq!(config.layout.terminals[1].display_name(), "db");
        let commands = config
            .on_load_commands(&StepId::from("intro"))
            .expect("intro commands");
        assert_eq!(
            commands
                .get(&TerminalId::from("editor"))
                .map(|c| c.command.as_str()),
            Some("./setup.sh;")
        );
    }

    #[test]
    fn test_missing_sections_default() {
        let config: ScenarioConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.layout.terminals.len(), 1);
        assert!(config.navigation.on_load_commands.is_empty());
    }
}
