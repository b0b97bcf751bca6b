//! # Guidepost Render
//!
//! Turns a step's markdown into display HTML. The one rendering rule that
//! depends on core data lives here: untagged fenced code blocks become
//! clickable command actions, and `loadPage` links get their step payload
//! re-encoded as a command URI. Everything else is stock markdown
//! rendering.

mod presenter;
mod render;
mod source;
mod uri;

pub use presenter::MarkdownPresenter;
pub use render::{render_step, wrap_page, RenderedStep};
pub use source::{FileStepSource, StepSource, StepSourceError};
pub use uri::{
    load_page_uri, send_text_uri, LOAD_PAGE_COMMAND, RELOAD_PAGE_COMMAND, SEND_TEXT_COMMAND,
};
