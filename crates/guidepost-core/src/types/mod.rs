//! Type definitions shared across the session core.

mod command;
mod step;

pub use command::{
    CodeBlockId, CommandOrigin, CommandRequest, InvocationLimit, OnLoadCommand, ResolvedCommand,
    TerminalId,
};
pub use step::{StepId, TargetStep};
