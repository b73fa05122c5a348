// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifier allocation for items without an explicit id.

/// Hands out generated item ids.
///
/// Each [`ItemStore`](crate::ItemStore) owns its own allocator, so two stories
/// never share a counter. Generated ids take the form `{prefix}-{n}` with `n`
/// counting up from zero; an id that is already taken is skipped.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    prefix: String,
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new("story")
    }
}

impl IdAllocator {
    /// Create an allocator using `prefix` for generated ids.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Prefix used for generated ids.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Allocate the next id for which `taken` returns false.
    pub fn allocate(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = format!("{}-{}", self.prefix, self.next);
            self.next += 1;
            if !taken(&id) {
                return id;
            }
        }
    }

    /// Restart numbering from zero.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}
