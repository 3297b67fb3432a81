//! Scope and generation bookkeeping for the identity resolver.
//!
//! A generation is one full render pass: cells requested during the pass
//! are live, cells carried over from the previous pass are candidates for
//! reuse, and whatever was not re-requested by the end of the pass is
//! pruned. Within a pass, scopes contribute naming segments and a
//! per-scope ordinal so cells get stable default keys from their call
//! position alone.
//!
//! Cells are stored type-erased; the resolver downcasts on reuse.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased cell storage.
pub(crate) type AnyCell = Arc<dyn Any + Send + Sync>;

struct ScopeFrame {
    name: String,
    saved_ordinal: u64,
}

pub(crate) struct ScopeState {
    /// Cells requested during the current generation, by key.
    live: HashMap<String, AnyCell>,
    /// Cells carried over from the previous generation, awaiting reuse.
    previous: HashMap<String, AnyCell>,
    stack: Vec<ScopeFrame>,
    /// Position of the next keyless cell within the current scope.
    ordinal: u64,
}

impl ScopeState {
    pub fn new() -> Self {
        Self {
            live: HashMap::new(),
            previous: HashMap::new(),
            stack: Vec::new(),
            ordinal: 0,
        }
    }

    /// Synthesize the default key for the next cell: the scope path
    /// joined by `/`, plus the ordinal.
    pub fn next_key(&mut self) -> String {
        let ordinal = self.ordinal;
        self.ordinal += 1;

        if self.stack.is_empty() {
            format!("#{ordinal}")
        } else {
            let path: Vec<&str> = self
                .stack
                .iter()
                .map(|frame| frame.name.as_str())
                .collect();
            format!("{}#{}", path.join("/"), ordinal)
        }
    }

    /// Snapshot the live pool as the previous generation and start fresh.
    pub fn begin_generation(&mut self) {
        self.previous = std::mem::take(&mut self.live);
        self.stack.clear();
        self.ordinal = 0;
    }

    /// Drop every previous-generation cell that was not re-requested.
    /// Returns how many were pruned.
    pub fn end_generation(&mut self) -> usize {
        let pruned = self.previous.len();
        self.previous.clear();
        self.stack.clear();
        self.ordinal = 0;
        pruned
    }

    pub fn push_scope(&mut self, name: &str) {
        self.stack.push(ScopeFrame {
            name: name.to_string(),
            saved_ordinal: self.ordinal,
        });
        self.ordinal = 0;
    }

    pub fn pop_scope(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.ordinal = frame.saved_ordinal;
        }
    }

    pub fn live_get(&self, key: &str) -> Option<&AnyCell> {
        self.live.get(key)
    }

    pub fn take_previous(&mut self, key: &str) -> Option<AnyCell> {
        self.previous.remove(key)
    }

    pub fn register(&mut self, key: String, cell: AnyCell) {
        self.live.insert(key, cell);
    }

    #[cfg(test)]
    pub fn live_len(&self) -> usize {
        self.live.len()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
