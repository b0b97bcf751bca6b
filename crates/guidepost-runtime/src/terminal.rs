//! Terminal implementations.

use std::process::Stdio;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Mutex;

use guidepost_core::terminal::{Terminal, TerminalError};

/// In-memory terminal for development and testing: keeps a transcript of
/// everything sent to it.
#[derive(Default)]
pub struct RecordingTerminal {
    transcript: StdMutex<Vec<String>>,
}

impl RecordingTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    pub fn transcript(&self) -> Vec<String> {
        self.transcript
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Terminal for RecordingTerminal {
    async fn send_text(&self, text: &str) -> Result<(), TerminalError> {
        if let Ok(mut lines) = self.transcript.lock() {
            lines.push(text.to_string());
        }
        Ok(())
    }
}

/// Terminal backed by a persistent child shell.
///
/// The child's lifetime belongs to this handle, never to the core: when
/// the handle drops, the shell's stdin closes and the shell exits on its
/// own.
pub struct ShellTerminal {
    stdin: Mutex<ChildStdin>,
    _child: Mutex<Child>,
}

impl ShellTerminal {
    /// Spawn a shell process whose stdin receives the command text.
    pub fn spawn(program: &str) -> Result<Self, TerminalError> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TerminalError::Closed("child stdin not captured".to_string()))?;
        tracing::debug!(program, pid = ?child.id(), "spawned shell terminal");
        Ok(Self {
            stdin: Mutex::new(stdin),
            _child: Mutex::new(child),
        })
    }
}

#[async_trait]
impl Terminal for ShellTerminal {
    async fn send_text(&self, text: &str) -> Result<(), TerminalError> {
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(text.as_bytes()).await?;
        if !text.ends_with('\n') {
            stdin.write_all(b"\n").await?;
        }
        stdin.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_terminal_keeps_order() {
        tokio_test::block_on(async {
            let terminal = RecordingTerminal::new();
            terminal.send_text("first").await.unwrap();
            terminal.send_text("second").await.unwrap();
            assert_eq!(
                terminal.transcript(),
                vec!["first".to_string(), "second".to_string()]
            );
        });
    }
}
