//! Markdown resource loading.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use guidepost_core::types::StepId;

/// Failure loading a step's markdown.
#[derive(Debug, Error)]
pub enum StepSourceError {
    #[error("step '{0}' not found")]
    NotFound(StepId),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Markdown resource loader: one step id maps to one markdown document.
#[async_trait]
pub trait StepSource: Send + Sync {
    async fn load(&self, step: &StepId) -> Result<String, StepSourceError>;
}

/// Reads `<root>/<step>.md` from the scenario directory.
pub struct FileStepSource {
    root: PathBuf,
}

impl FileStepSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn step_path(&self, step: &StepId) -> PathBuf {
        self.root.join(format!("{}.md", step))
    }
}

#[async_trait]
impl StepSource for FileStepSource {
    async fn load(&self, step: &StepId) -> Result<String, StepSourceError> {
        let path = self.step_path(step);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(StepSourceError::NotFound(step.clone()))
            }
            Err(error) => Err(StepSourceError::Io(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_step_source_reads_markdown() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("tempdir");
            fs::write(dir.path().join("intro.md"), "# Intro\n").expect("write step");

            let source = FileStepSource::new(dir.path());
            let content = source.load(&StepId::from("intro")).await.expect("load");
            assert_eq!(content, "# Intro\n");
        });
    }

    #[test]
    fn test_missing_step_is_not_found() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("tempdir");
            let source = FileStepSource::new(dir.path());
            let result = source.load(&StepId::from("ghost")).await;
            assert!(matches!(result, Err(StepSourceError::NotFound(_))));
        });
    }
}
