use std::collections::BTreeSet;

use serde::Serialize;

/// Which roadmap phases are expanded. Starts fully collapsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Disclosure {
    open: BTreeSet<usize>,
}

impl Disclosure {
    /// Flips phase `index` only. Returns whether it is now open.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.open.remove(&index) {
            false
        } else {
            self.open.insert(index);
            true
        }
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open.contains(&index)
    }

    pub fn collapse_all(&mut self) {
        self.open.clear();
    }
}
