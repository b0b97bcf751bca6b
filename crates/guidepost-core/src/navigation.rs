//! Step navigation: ordered history and the load/reload entry points.

use thiserror::Error;

use crate::dispatcher;
use crate::session::{PresentError, Session};
use crate::types::StepId;

/// Ordered record of visited steps. Empty until the first navigation;
/// append-only afterwards.
#[derive(Debug, Default)]
pub struct StepHistory {
    entries: Vec<StepId>,
}

impl StepHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: StepId) {
        self.entries.push(step);
    }

    /// Most recently entered step, if any.
    pub fn current(&self) -> Option<&StepId> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[StepId] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("failed to present step: {0}")]
    Present(#[from] PresentError),
}

/// Enter a step: record it, present it, then run its configured on-load
/// commands.
///
/// The navigation attempt is recorded before the step resource is touched;
/// history reflects intent, not success. A missing step resource surfaces
/// from the presenter and is not retried or papered over.
pub async fn load_step(step: &StepId, session: &Session) -> Result<(), NavigationError> {
    session.push_history(step.clone());
    tracing::debug!(history = %format_history(session), "step history");

    session.presenter().present(step).await?;

    if let Some(commands) = session.on_load_commands(step) {
        tracing::debug!(step = %step, entries = commands.len(), "running on-load commands");
        dispatcher::dispatch_on_load(step, commands, session).await;
    }
    session.display().clear_notifications().await;
    Ok(())
}

/// Re-enter the most recent step, re-running the same presentation and
/// on-load pipeline. Before the first navigation this is a silent no-op:
/// there is nothing to reload.
///
/// Re-triggered on-load dispatch is usually suppressed by the default
/// single-invocation budget; that interaction is intentional.
pub async fn reload_step(session: &Session) -> Result<(), NavigationError> {
    match session.current_step() {
        Some(step) => load_step(&step, session).await,
        None => {
            tracing::debug!("reload requested before any step was loaded");
            Ok(())
        }
    }
}

fn format_history(session: &Session) -> String {
    session
        .history_snapshot()
        .iter()
        .map(|step| step.to_string())
        .collect::<Vec<_>>()
        .join(" => ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use crate::session::{DisplaySurface, OnLoadCommandMap, StepPresenter};
    use crate::terminal::{Terminal, TerminalError, TerminalRegistry};
    use crate::types::{OnLoadCommand, TerminalId};

    struct RecordingTerminal {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingTerminal {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Terminal for RecordingTerminal {
        async fn send_text(&self, text: &str) -> Result<(), TerminalError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    /// Presenter that records which steps were presented and can refuse
    /// unknown steps like a missing markdown file would.
    struct ScriptedPresenter {
        known_steps: Vec<StepId>,
        presented: Mutex<Vec<StepId>>,
    }

    impl ScriptedPresenter {
        fn knowing(steps: &[&str]) -> Self {
            Self {
                known_steps: steps.iter().map(|s| StepId::from(*s)).collect(),
                presented: Mutex::new(Vec::new()),
            }
        }

        fn presented(&self) -> Vec<StepId> {
            self.presented.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StepPresenter for ScriptedPresenter {
        async fn present(&self, step: &StepId) -> Result<(), PresentError> {
            if !self.known_steps.contains(step) {
                return Err(PresentError::NotFound(step.clone()));
            }
            self.presented.lock().unwrap().push(step.clone());
            Ok(())
        }
    }

    struct NullDisplay;

    #[async_trait]
    impl DisplaySurface for NullDisplay {
        async fn show(&self, _html: &str) {}
        async fn clear_notifications(&self) {}
    }

    fn on_load_map(step: &str, terminal: &str, command: &str) -> OnLoadCommandMap {
        let mut per_terminal = BTreeMap::new();
        per_terminal.insert(TerminalId::from(terminal), OnLoadCommand::new(command));
        let mut map = OnLoadCommandMap::new();
        map.insert(StepId::from(step), per_terminal);
        map
    }

    fn session(
        presenter: Arc<ScriptedPresenter>,
        terminal: Arc<RecordingTerminal>,
        on_load: OnLoadCommandMap,
    ) -> Session {
        let mut registry = TerminalRegistry::new();
        registry.register(TerminalId::from("term1"), terminal);
        Session::new(registry, on_load, presenter, Arc::new(NullDisplay))
    }

    #[test]
    fn test_reload_before_any_load_is_a_noop() {
        tokio_test::block_on(async {
            let presenter = Arc::new(ScriptedPresenter::knowing(&["intro"]));
            let terminal = Arc::new(RecordingTerminal::new());
            let session = session(presenter.clone(), terminal.clone(), OnLoadCommandMap::new());

            reload_step(&session).await.unwrap();

            assert!(session.history_snapshot().is_empty());
            assert!(presenter.presented().is_empty());
            assert!(terminal.sent().is_empty());
        });
    }

    #[test]
    fn test_load_step_presents_and_runs_on_load_commands_once() {
        tokio_test::block_on(async {
            let presenter = Arc::new(ScriptedPresenter::knowing(&["intro"]));
            let terminal = Arc::new(RecordingTerminal::new());
            let session = session(
                presenter.clone(),
                terminal.clone(),
                on_load_map("intro", "term1", "echo hi"),
            );
            let intro = StepId::from("intro");

            load_step(&intro, &session).await.unwrap();

            assert_eq!(session.history_snapshot(), vec![intro.clone()]);
            assert_eq!(presenter.presented(), vec![intro.clone()]);
            assert_eq!(terminal.sent(), vec!["echo hi".to_string()]);

            // Reload re-presents but the consumed on-load budget suppresses
            // the command.
            reload_step(&session).await.unwrap();
            assert_eq!(session.current_step(), Some(intro.clone()));
            assert_eq!(presenter.presented().len(), 2);
            assert_eq!(terminal.sent(), vec!["echo hi".to_string()]);
        });
    }

    #[test]
    fn test_revisiting_a_step_reuses_its_consumed_budget() {
        tokio_test::block_on(async {
            let presenter = Arc::new(ScriptedPresenter::knowing(&["intro", "next"]));
            let terminal = Arc::new(RecordingTerminal::new());
            let session = session(
                presenter.clone(),
                terminal.clone(),
                on_load_map("intro", "term1", "echo hi"),
            );
            let intro = StepId::from("intro");
            let next = StepId::from("next");

            load_step(&intro, &session).await.unwrap();
            load_step(&next, &session).await.unwrap();
            load_step(&intro, &session).await.unwrap();

            // Same on-load code-block id on the second visit, so the
            // command ran exactly once overall.
            assert_eq!(terminal.sent(), vec!["echo hi".to_string()]);
            assert_eq!(
                session.history_snapshot(),
                vec![intro.clone(), next, intro]
            );
        });
    }

    #[test]
    fn test_missing_step_resource_surfaces_but_history_records_intent() {
        tokio_test::block_on(async {
            let presenter = Arc::new(ScriptedPresenter::knowing(&["intro"]));
            let terminal = Arc::new(RecordingTerminal::new());
            let session = session(presenter.clone(), terminal.clone(), OnLoadCommandMap::new());
            let ghost = StepId::from("ghost");

            let result = load_step(&ghost, &session).await;
            assert!(matches!(
                result,
                Err(NavigationError::Present(PresentError::NotFound(_)))
            ));
            assert_eq!(session.history_snapshot(), vec![ghost]);
            assert!(terminal.sent().is_empty());
        });
    }

    #[test]
    fn test_reload_reenters_the_tail_after_failure_free_navigation() {
        tokio_test::block_on(async {
            let presenter = Arc::new(ScriptedPresenter::knowing(&["intro", "next"]));
            let terminal = Arc::new(RecordingTerminal::new());
            let session = session(presenter.clone(), terminal.clone(), OnLoadCommandMap::new());

            load_step(&StepId::from("intro"), &session).await.unwrap();
            load_step(&StepId::from("next"), &session).await.unwrap();
            reload_step(&session).await.unwrap();

            assert_eq!(session.current_step(), Some(StepId::from("next")));
            assert_eq!(
                presenter.presented(),
                vec![
                    StepId::from("intro"),
                    StepId::from("next"),
                    StepId::from("next"),
                ]
            );
        });
    }
}
