//! Code-block directive parsing.
//!
//! An untagged fenced block may carry one directive line (`### ` prefix)
//! with execution metadata; everything else is the executable content.

use serde::Deserialize;

use crate::types::{InvocationLimit, TerminalId};

/// Reserved prefix marking a directive line inside an executable block:
/// three hash characters and a space.
const DIRECTIVE_PREFIX: &str = "### ";

/// Partial command descriptor produced from one code block's raw text.
/// The caller layers a code-block id on top.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedBlock {
    pub command: String,
    pub terminal_id: Option<TerminalId>,
    pub execute: Option<bool>,
    pub max_invocations: Option<InvocationLimit>,
}

/// Structured directive payload, e.g.
/// `### {"terminalId": "t2", "execute": false}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectivePayload {
    #[serde(default)]
    terminal_id: Option<TerminalId>,
    #[serde(default)]
    execute: Option<bool>,
    #[serde(default)]
    max_invocations: Option<InvocationLimit>,
}

/// Parse a code block's raw text into a partial command descriptor.
///
/// Directive lines are removed from the executable content; the remaining
/// lines are rejoined in original order. When several directive lines
/// appear, only the last one is honored and the earlier ones are silently
/// discarded. The directive text is first read as a structured JSON
/// payload; anything that does not parse as one is taken to be a bare
/// terminal id, leaving `execute` untouched. This function has no failure
/// path.
pub fn parse_code_block(raw: &str) -> ParsedBlock {
    let mut content_lines: Vec<&str> = Vec::new();
    let mut directive: Option<&str> = None;

    for line in raw.split('\n') {
        if let Some(rest) = line.strip_prefix(DIRECTIVE_PREFIX) {
            directive = Some(rest.trim());
        } else {
            content_lines.push(line);
        }
    }

    let command = content_lines.join("\n");
    // An empty directive is still stripped from the content but carries
    // no metadata.
    let directive = directive.filter(|text| !text.is_empty());

    match directive {
        Some(text) => match serde_json::from_str::<DirectivePayload>(text) {
            Ok(payload) => ParsedBlock {
                command,
                terminal_id: payload.terminal_id,
                execute: payload.execute,
                max_invocations: payload.max_invocations,
            },
            Err(_) => ParsedBlock {
                command,
                terminal_id: Some(TerminalId::new(text)),
                ..Default::default()
            },
        },
        None => ParsedBlock {
            command,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_without_directive_passes_through_unchanged() {
        let parsed = parse_code_block("ls -la\ncat file.txt");
        assert_eq!(parsed.command, "ls -la\ncat file.txt");
        assert_eq!(parsed.terminal_id, None);
        assert_eq!(parsed.execute, None);
        assert_eq!(parsed.max_invocations, None);
    }

    #[test]
    fn test_last_directive_wins() {
        let parsed = parse_code_block("### a\nfoo\n### b\nbar");
        assert_eq!(parsed.command, "foo\nbar");
        assert_eq!(parsed.terminal_id, Some(TerminalId::from("b")));
        assert_eq!(parsed.execute, None);
    }

    #[test]
    fn test_structured_directive() {
        let parsed = parse_code_block("### {\"terminalId\":\"t2\",\"execute\":false}\nrm -rf /");
        assert_eq!(parsed.command, "rm -rf /");
        assert_eq!(parsed.terminal_id, Some(TerminalId::from("t2")));
        assert_eq!(parsed.execute, Some(false));
    }

    #[test]
    fn test_bare_identifier_directive_leaves_execute_untouched() {
        let parsed = parse_code_block("### t2\nls");
        assert_eq!(parsed.command, "ls");
        assert_eq!(parsed.terminal_id, Some(TerminalId::from("t2")));
        assert_eq!(parsed.execute, None);
    }

    #[test]
    fn test_malformed_json_directive_becomes_bare_identifier() {
        // Preserved as-is: intent cannot be inferred, so the broken payload
        // is a terminal id containing brace characters.
        let parsed = parse_code_block("### {\"bad json\nls");
        assert_eq!(parsed.command, "ls");
        assert_eq!(parsed.terminal_id, Some(TerminalId::from("{\"bad json")));
        assert_eq!(parsed.execute, None);
    }

    #[test]
    fn test_directive_may_state_a_budget() {
        let parsed = parse_code_block("### {\"maxInvocations\": 2}\n./run-once.sh");
        assert_eq!(parsed.command, "./run-once.sh");
        assert_eq!(parsed.max_invocations, Some(InvocationLimit::Bounded(2)));

        let parsed = parse_code_block("### {\"maxInvocations\": \"unlimited\"}\nmake");
        assert_eq!(parsed.max_invocations, Some(InvocationLimit::Unlimited));
    }

    #[test]
    fn test_directive_prefix_requires_trailing_space() {
        let parsed = parse_code_block("###no-space\nls");
        assert_eq!(parsed.command, "###no-space\nls");
        assert_eq!(parsed.terminal_id, None);
    }

    #[test]
    fn test_empty_directive_is_stripped_but_ignored() {
        let parsed = parse_code_block("### \nls");
        assert_eq!(parsed.command, "ls");
        assert_eq!(parsed.terminal_id, None);
        assert_eq!(parsed.execute, None);
    }
}
