//! # Guidepost Runtime
//!
//! Assembles scenario sessions from configuration and hosts the pieces the
//! core treats as collaborators: the command registry (a plain function
//! table mapping command names to handlers), terminal implementations, and
//! display surfaces.

pub mod bootstrap;
pub mod commands;
pub mod display;
pub mod terminal;

pub use bootstrap::{BootstrapError, SessionBuilder};
pub use commands::{
    CommandError, CommandRegistry, HostCommand, LoadPageCommand, ReloadPageCommand,
    SendTextCommand,
};
pub use display::{HtmlFileDisplay, NullDisplay};
pub use terminal::{RecordingTerminal, ShellTerminal};
