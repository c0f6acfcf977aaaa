use loam_core::Value;

/// A pending action that releases a resource acquired while lowering a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    DeallocStack(Value),
    Release(Value),
}

/// Cleanups owned by one function lowering, innermost last.
#[derive(Debug, Default)]
pub struct CleanupStack {
    entries: Vec<Cleanup>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cleanup: Cleanup) {
        self.entries.push(cleanup);
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cleanups above `depth`, innermost first, leaving the stack untouched.
    pub fn active_above(&self, depth: usize) -> Vec<Cleanup> {
        self.entries
            .get(depth..)
            .unwrap_or_default()
            .iter()
            .rev()
            .cloned()
            .collect()
    }

    /// Removes the cleanups above `depth` and returns them innermost first.
    pub fn pop_to(&mut self, depth: usize) -> Vec<Cleanup> {
        if depth >= self.entries.len() {
            return Vec::new();
        }
        let mut popped = self.entries.split_off(depth);
        popped.reverse();
        popped
    }
}
