//! Markdown-to-HTML step rendering.
//!
//! Fenced blocks carrying a language tag render through the default HTML
//! path. Fenced blocks without one are executable: their raw text goes
//! through the directive parser, gets a deterministic in-page code-block
//! id, and is replaced by a play-button command link (unless the block is
//! marked `execute: false`, which removes the run affordance).

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use pulldown_cmark_escape::escape_html;

use guidepost_core::parser::parse_code_block;
use guidepost_core::types::{CodeBlockId, CommandRequest, StepId};

use crate::uri::{load_page_uri, send_text_uri, LOAD_PAGE_COMMAND};

const PAGE_PREAMBLE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
    <meta charset=\"UTF-8\">\n\
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
    <link rel=\"stylesheet\" type=\"text/css\" href=\"assets/guidepost.css\" />\n\
    <script src=\"assets/guidepost.js\"></script>\n\
    </head>\n<body>";
const PAGE_POSTAMBLE: &str = "</body></html>";

/// One rendered step: display HTML plus the parsed executable blocks in
/// step-local order.
#[derive(Debug, Clone)]
pub struct RenderedStep {
    pub html: String,
    pub blocks: Vec<CommandRequest>,
}

/// Render a step's markdown body to HTML, rewriting executable fences and
/// navigation links.
pub fn render_step(step: &StepId, markdown: &str) -> RenderedStep {
    let parser = Parser::new_ext(markdown, Options::empty());

    let mut events: Vec<Event> = Vec::new();
    let mut blocks: Vec<CommandRequest> = Vec::new();
    let mut block_index = 0usize;
    // Buffer for the untagged fence currently being collected, if any.
    let mut pending: Option<String> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if info.trim().is_empty() =>
            {
                pending = Some(String::new());
            }
            Event::Text(text) if pending.is_some() => {
                if let Some(buffer) = pending.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) if pending.is_some() => {
                let content = pending.take().unwrap_or_default();
                // The fence body carries one trailing newline from the
                // markdown source; it is not part of the command.
                let content = content.strip_suffix('\n').unwrap_or(&content);
                let parsed = parse_code_block(content);

                let mut request = CommandRequest::new(
                    CodeBlockId::in_page(step, block_index),
                    parsed.command,
                );
                if let Some(terminal_id) = parsed.terminal_id {
                    request = request.with_terminal_id(terminal_id);
                }
                if let Some(execute) = parsed.execute {
                    request = request.with_execute(execute);
                }
                if let Some(limit) = parsed.max_invocations {
                    request = request.with_max_invocations(limit);
                }
                block_index += 1;

                events.push(Event::Html(render_executable_block(&request).into()));
                blocks.push(request);
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = rewrite_load_page_href(&dest_url).into();
                events.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }
            other => events.push(other),
        }
    }

    let mut html_out = String::new();
    html::push_html(&mut html_out, events.into_iter());

    tracing::debug!(step = %step, blocks = blocks.len(), "rendered step markdown");
    RenderedStep {
        html: html_out,
        blocks,
    }
}

/// Wrap a rendered step body in the fixed page shell.
pub fn wrap_page(body: &str) -> String {
    format!("{}{}{}", PAGE_PREAMBLE, body, PAGE_POSTAMBLE)
}

fn render_executable_block(request: &CommandRequest) -> String {
    let mut escaped = String::new();
    let _ = escape_html(&mut escaped, &request.command);

    if request.execute != Some(false) {
        format!(
            "<pre title=\"Click the play button to execute\"><code>\
             <a class=\"command_link\" title=\"Click to execute\" href=\"{}\">\u{25B6}</a>{}\
             </code></pre>\n",
            send_text_uri(request),
            escaped
        )
    } else {
        format!("<pre><code>{}</code></pre>\n", escaped)
    }
}

/// Re-encode author-written `command:guidepost.loadPage?<step>` links into
/// the wire payload shape; all other hrefs pass through untouched.
fn rewrite_load_page_href(href: &str) -> String {
    let prefix = format!("command:{}?", LOAD_PAGE_COMMAND);
    match href.strip_prefix(prefix.as_str()) {
        Some(step) => load_page_uri(&StepId::from(step)),
        None => href.to_string(),
    }
}
