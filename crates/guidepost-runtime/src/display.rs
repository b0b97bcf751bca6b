//! Display surface implementations.

use std::path::PathBuf;

use async_trait::async_trait;

use guidepost_core::session::DisplaySurface;

/// Display surface that drops everything; useful for headless runs and
/// tests.
pub struct NullDisplay;

#[async_trait]
impl DisplaySurface for NullDisplay {
    async fn show(&self, _html: &str) {}

    async fn clear_notifications(&self) {}
}

/// Display surface that writes the latest page to a file, overwriting the
/// previous one.
pub struct HtmlFileDisplay {
    path: PathBuf,
}

impl HtmlFileDisplay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DisplaySurface for HtmlFileDisplay {
    async fn show(&self, html: &str) {
        if let Err(error) = tokio::fs::write(&self.path, html).await {
            tracing::warn!(path = %self.path.display(), %error, "failed to write page");
        }
    }

    async fn clear_notifications(&self) {}
}
