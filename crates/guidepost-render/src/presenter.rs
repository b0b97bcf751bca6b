//! Step presentation: load, render, display.

use std::sync::Arc;

use async_trait::async_trait;

use guidepost_core::session::{DisplaySurface, PresentError, StepPresenter};
use guidepost_core::types::StepId;

use crate::render::{render_step, wrap_page};
use crate::source::{StepSource, StepSourceError};

/// Presents markdown-backed steps: loads the resource, renders it with the
/// command rewrites, and pushes the full page to the display surface.
pub struct MarkdownPresenter {
    source: Arc<dyn StepSource>,
    display: Arc<dyn DisplaySurface>,
}

impl MarkdownPresenter {
    pub fn new(source: Arc<dyn StepSource>, display: Arc<dyn DisplaySurface>) -> Self {
        Self { source, display }
    }
}

#[async_trait]
impl StepPresenter for MarkdownPresenter {
    async fn present(&self, step: &StepId) -> Result<(), PresentError> {
        let markdown = self.source.load(step).await.map_err(|error| match error {
            StepSourceError::NotFound(step) => PresentError::NotFound(step),
            StepSourceError::Io(io) => PresentError::Io(io),
        })?;

        let rendered = render_step(step, &markdown);
        self.display.show(&wrap_page(&rendered.html)).await;
        Ok(())
    }
}
