//! Session-lifetime invocation counting.

use std::collections::HashMap;

use crate::types::CodeBlockId;

/// Invocation counter store keyed by code-block id.
///
/// Entries are created lazily at zero and only ever grow; no removal is
/// exposed. The ledger lives exactly as long as its session, so budgets
/// survive step reloads but not a session restart.
#[derive(Debug, Default)]
pub struct InvocationLedger {
    counts: HashMap<CodeBlockId, u32>,
}

impl InvocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded dispatches for this block (0 if never seen).
    pub fn get(&self, id: &CodeBlockId) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Record one successful dispatch.
    pub fn increment(&mut self, id: &CodeBlockId) {
        *self.counts.entry(id.clone()).or_insert(0) += 1;
    }

    /// Number of blocks that have been dispatched at least once.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
