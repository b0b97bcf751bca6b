//! Command URI building.
//!
//! Executable actions are embedded in the rendered HTML as
//! `command:<name>?<urlencoded JSON args>` URIs, with the args carried as
//! a single-element JSON array. The runtime's command registry parses the
//! same shape back.

use guidepost_core::types::{CommandRequest, StepId, TargetStep};

/// Command name bound to clicked code-block execution.
pub const SEND_TEXT_COMMAND: &str = "guidepost.sendText";
/// Command name bound to step navigation links.
pub const LOAD_PAGE_COMMAND: &str = "guidepost.loadPage";
/// Command name bound to re-entering the current step.
pub const RELOAD_PAGE_COMMAND: &str = "guidepost.reloadPage";

/// URI that dispatches one code-block command when triggered.
pub fn send_text_uri(request: &CommandRequest) -> String {
    let payload = serde_json::to_string(std::slice::from_ref(request))
        .unwrap_or_else(|_| "[]".to_string());
    format!(
        "command:{}?{}",
        SEND_TEXT_COMMAND,
        urlencoding::encode(&payload)
    )
}

/// URI that navigates to `step` when triggered.
pub fn load_page_uri(step: &StepId) -> String {
    let target = TargetStep::new(step.clone());
    let payload =
        serde_json::to_string(std::slice::from_ref(&target)).unwrap_or_else(|_| "[]".to_string());
    format!(
        "command:{}?{}",
        LOAD_PAGE_COMMAND,
        urlencoding::encode(&payload)
    )
}
