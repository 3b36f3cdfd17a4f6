//! Session high score
//!
//! Wraps a `ScoreStore` so storage trouble never reaches the game: a failed
//! load counts as 0 and a failed save keeps the value in memory.

use crate::persistence::ScoreStore;

pub struct HighScoreBook {
    best: u64,
    store: Box<dyn ScoreStore>,
}

impl HighScoreBook {
    /// Read the persisted best score; absence or failure gives 0
    pub fn load(store: Box<dyn ScoreStore>) -> Self {
        let best = match store.load_high_score() {
            Ok(Some(score)) => {
                log::info!("Loaded high score {}", score);
                score
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("High score unavailable ({}), starting from 0", e);
                0
            }
        };
        Self { best, store }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Record a finished round. Only a strictly better score is kept and
    /// persisted; returns whether it was.
    pub fn commit(&mut self, score: u64) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = self.store.save_high_score(score) {
            log::warn!("Failed to save high score {}: {}", score, e);
        }
        true
    }
}
