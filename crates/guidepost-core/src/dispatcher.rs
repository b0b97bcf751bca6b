//! Command dispatch: execution policy and terminal routing.
//!
//! The pipeline is veto, budget, resolution, then increment-and-send. The
//! ledger increment is committed before the text reaches the terminal so a
//! transient host fault cannot lead to repeated execution.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::session::Session;
use crate::terminal::TerminalError;
use crate::types::{
    CodeBlockId, CommandOrigin, CommandRequest, OnLoadCommand, ResolvedCommand, StepId, TerminalId,
};

/// What became of one dispatch attempt. Suppressed outcomes are silent
/// no-ops, distinguishable only via debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The command text was sent to a terminal.
    Executed,
    /// An explicit `execute: false` vetoed the command.
    VetoedByFlag,
    /// The invocation budget for this block is spent.
    BudgetExhausted,
    /// No terminal exists to receive the command.
    NoTerminal,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("terminal send failed: {0}")]
    Terminal(#[from] TerminalError),
}

/// Decide whether, and where, a resolved command actually executes.
///
/// Once the veto and budget checks pass, the increment is committed; there
/// is no rollback path, even when the send itself faults.
pub async fn dispatch(
    command: &ResolvedCommand,
    session: &Session,
) -> Result<DispatchOutcome, DispatchError> {
    if !command.execute {
        tracing::debug!(
            code_block_id = %command.code_block_id,
            "refusing to execute: explicit execute=false"
        );
        return Ok(DispatchOutcome::VetoedByFlag);
    }

    let used = session.invocation_count(&command.code_block_id);
    if !command.max_invocations.allows(used) {
        tracing::debug!(
            code_block_id = %command.code_block_id,
            used,
            limit = %command.max_invocations,
            "invocation budget exhausted"
        );
        return Ok(DispatchOutcome::BudgetExhausted);
    }

    let terminal = match session.terminals().resolve(command.terminal_id.as_ref()) {
        Some(terminal) => terminal,
        None => {
            tracing::debug!(
                code_block_id = %command.code_block_id,
                "no terminal available, dropping command"
            );
            return Ok(DispatchOutcome::NoTerminal);
        }
    };

    session.record_invocation(&command.code_block_id);
    tracing::debug!(
        code_block_id = %command.code_block_id,
        terminal_id = ?command.terminal_id,
        command = %command.command,
        "running command"
    );
    terminal.send_text(&command.command).await?;
    session.display().clear_notifications().await;
    Ok(DispatchOutcome::Executed)
}

/// Dispatch a step's configured on-load commands, one per terminal entry,
/// each independently in map iteration order. Order across terminals
/// carries no meaning beyond log readability. A send fault in one entry is
/// logged and does not stop the remaining entries.
pub async fn dispatch_on_load(
    step: &StepId,
    commands: &BTreeMap<TerminalId, OnLoadCommand>,
    session: &Session,
) -> Vec<DispatchOutcome> {
    let mut outcomes = Vec::with_capacity(commands.len());
    for (terminal_id, spec) in commands {
        tracing::debug!(
            step = %step,
            terminal_id = %terminal_id,
            command = %spec.command,
            "dispatching on-load entry"
        );
        let mut request = CommandRequest::new(
            CodeBlockId::on_load(step, terminal_id),
            spec.command.clone(),
        )
        .with_terminal_id(terminal_id.clone());
        if let Some(execute) = spec.execute {
            request = request.with_execute(execute);
        }
        if let Some(limit) = spec.max_invocations {
            request = request.with_max_invocations(limit);
        }

        match dispatch(&request.resolve(CommandOrigin::OnLoad), session).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(error) => {
                tracing::warn!(
                    step = %step,
                    terminal_id = %terminal_id,
                    error = %error,
                    "on-load command failed"
                );
            }
        }
    }
    outcomes
}
