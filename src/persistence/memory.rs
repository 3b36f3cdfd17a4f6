use std::cell::Cell;
use std::rc::Rc;

use super::ScoreStore;
use crate::Result;

/// In-memory store. Clones share one slot, which stands in for "the same
/// storage seen by the next session".
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<Cell<Option<u64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: u64) -> Self {
        let store = Self::new();
        store.slot.set(Some(score));
        store
    }
}

impl ScoreStore for MemoryStore {
    fn load_high_score(&self) -> Result<Option<u64>> {
        Ok(self.slot.get())
    }

    fn save_high_score(&mut self, score: u64) -> Result<()> {
        self.slot.set(Some(score));
        Ok(())
    }
}
