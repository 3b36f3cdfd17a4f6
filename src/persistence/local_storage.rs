use super::ScoreStore;
use crate::{Error, Result};

/// High score in browser LocalStorage, stored as a plain integer string
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub const DEFAULT_KEY: &'static str = "rhythmHopperHighScore";

    pub fn new() -> Self {
        Self::with_key(Self::DEFAULT_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| Error::Storage("LocalStorage unavailable".into()))
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for LocalStorageStore {
    fn load_high_score(&self) -> Result<Option<u64>> {
        let value = Self::storage()?
            .get_item(&self.key)
            .map_err(|e| Error::Storage(format!("{:?}", e)))?;
        match value {
            None => Ok(None),
            Some(text) => text
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|e| Error::Storage(format!("bad high score {:?}: {}", text, e))),
        }
    }

    fn save_high_score(&mut self, score: u64) -> Result<()> {
        Self::storage()?
            .set_item(&self.key, &score.to_string())
            .map_err(|e| Error::Storage(format!("{:?}", e)))?;
        log::info!("High score {} saved", score);
        Ok(())
    }
}
