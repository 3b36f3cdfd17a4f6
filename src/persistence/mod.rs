//! High score persistence
//!
//! Backends:
//! - `MemoryStore`: in-process, for tests and storage-less sessions
//! - `JsonFileStore`: versioned JSON record on disk (native)
//! - `LocalStorageStore`: browser LocalStorage (wasm32)

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

use crate::Result;

/// Where the best score survives between sessions
pub trait ScoreStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load_high_score(&self) -> Result<Option<u64>>;

    fn save_high_score(&mut self, score: u64) -> Result<()>;
}
