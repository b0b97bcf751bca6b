//! Configuration loading, validation, and defaulting.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use thiserror::Error;

use guidepost_core::types::{OnLoadCommand, StepId, TerminalId};

use crate::{
    ScenarioConfig, CONFIG_FILE_NAME, DEFAULT_INTRO_STEP, DEFAULT_STARTUP_SCRIPT,
    DEFAULT_TERMINAL_ID,
};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load and validate configuration from an explicit file path.
pub fn load_scenario_config(path: &Path) -> Result<ScenarioConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ScenarioConfig = serde_json::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Resolve a scenario directory's configuration, with defaults.
///
/// A present config file is parsed scrupulously and validated; an
/// unparseable one falls back to the default layout with an error log.
/// With no file at all, the default single-terminal layout is used, and a
/// conventional startup script at the scenario root is wired as the intro
/// step's on-load command.
pub fn load_or_default(scenario_dir: &Path) -> Result<ScenarioConfig, ConfigError> {
    let config_path = scenario_dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        tracing::debug!(path = %config_path.display(), "reading scenario config");
        let content = fs::read_to_string(&config_path)?;
        return match serde_json::from_str::<ScenarioConfig>(&content) {
            Ok(config) => {
                validate_config(&config)?;
                Ok(config)
            }
            Err(error) => {
                tracing::error!(%error, "unparseable scenario config, falling back to default");
                Ok(ScenarioConfig::default())
            }
        };
    }

    tracing::debug!("scenario config not found, falling back to default");
    let mut config = ScenarioConfig::default();
    let startup_script = scenario_dir.join(DEFAULT_STARTUP_SCRIPT);
    if startup_script.is_file() {
        tracing::debug!(script = DEFAULT_STARTUP_SCRIPT, "default startup script found");
        let mut per_terminal = BTreeMap::new();
        per_terminal.insert(
            TerminalId::from(DEFAULT_TERMINAL_ID),
            OnLoadCommand::new(format!("./{};", DEFAULT_STARTUP_SCRIPT)),
        );
        config
            .navigation
            .on_load_commands
            .insert(StepId::from(DEFAULT_INTRO_STEP), per_terminal);
    } else {
        tracing::debug!("no default startup script");
    }
    Ok(config)
}

/// Validate an already-parsed configuration.
pub fn validate_config(config: &ScenarioConfig) -> Result<(), ConfigError> {
    if config.layout.terminals.is_empty() {
        return Err(ConfigError::Invalid(
            "layout.terminals must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for terminal in &config.layout.terminals {
        if terminal.id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "layout.terminals[].id must not be empty".to_string(),
            ));
        }
        if !seen.insert(terminal.id.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "layout.terminals[].id '{}' is duplicated",
                terminal.id
            )));
        }
    }

    for (step, per_terminal) in &config.navigation.on_load_commands {
        if step.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid(
                "navigation.onLoadCommands step names must not be empty".to_string(),
            ));
        }
        for (terminal_id, command) in per_terminal {
            if command.command.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "navigation.onLoadCommands[{}][{}].command must not be empty",
                    step, terminal_id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TerminalSpec;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut file = File::create(dir.join(name)).expect("create file");
        file.write_all(content.as_bytes()).expect("write file");
    }

    #[test]
    fn test_load_or_default_reads_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            CONFIG_FILE_NAME,
            r#"{
                "layout": {"terminals": [{"id": "t1"}, {"id": "t2"}]},
                "navigation": {"onLoadCommands": {"intro": {"t1": {"command": "echo hi"}}}}
            }"#,
        );

        let config = load_or_default(dir.path()).expect("config");
        assert_eq!(config.layout.terminals.len(), 2);
        assert!(config
            .on_load_commands(&StepId::from("intro"))
            .is_some());
    }

    #[test]
    fn test_load_or_default_without_file_uses_default_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_or_default(dir.path()).expect("config");
        assert_eq!(config.layout.terminals.len(), 1);
        assert_eq!(config.layout.terminals[0].id, DEFAULT_TERMINAL_ID);
        assert!(config.navigation.on_load_commands.is_empty());
    }

    #[test]
    fn test_load_or_default_wires_startup_script_into_intro() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), DEFAULT_STARTUP_SCRIPT, "#!/bin/sh\n");

        let config = load_or_default(dir.path()).expect("config");
        let commands = config
            .on_load_commands(&StepId::from(DEFAULT_INTRO_STEP))
            .expect("intro commands");
        assert_eq!(
            commands
                .get(&TerminalId::from(DEFAULT_TERMINAL_ID))
                .map(|c| c.command.as_str()),
            Some("./setup.sh;")
        );
    }

    #[test]
    fn test_load_or_default_falls_back_on_unparseable_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), CONFIG_FILE_NAME, "{not json");

        let config = load_or_default(dir.path()).expect("config");
        assert_eq!(config, ScenarioConfig::default());
    }

    #[test]
    fn test_validate_rejects_empty_terminal_list() {
        let mut config = ScenarioConfig::default();
        config.layout.terminals.clear();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_terminal_ids() {
        let mut config = ScenarioConfig::default();
        config.layout.terminals = vec![TerminalSpec::new("t1"), TerminalSpec::new("t1")];
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_on_load_command_text() {
        let mut config = ScenarioConfig::default();
        let mut per_terminal = BTreeMap::new();
        per_terminal.insert(TerminalId::from("main"), OnLoadCommand::new("  "));
        config
            .navigation
            .on_load_commands
            .insert(StepId::from("intro"), per_terminal);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_explicit_load_propagates_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), CONFIG_FILE_NAME, "{not json");
        let result = load_scenario_config(&dir.path().join(CONFIG_FILE_NAME));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
