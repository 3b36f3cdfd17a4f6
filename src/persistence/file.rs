use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ScoreStore;
use crate::Result;

const RECORD_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreRecord {
    version: u32,
    high_score: u64,
}

/// High score kept in a small JSON file.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileStore {
    fn load_high_score(&self) -> Result<Option<u64>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: HighScoreRecord = serde_json::from_str(&json)?;
        if record.version != RECORD_VERSION {
            log::warn!(
                "High score record version {} (expected {}), reading anyway",
                record.version,
                RECORD_VERSION
            );
        }
        Ok(Some(record.high_score))
    }

    fn save_high_score(&mut self, score: u64) -> Result<()> {
        let record = HighScoreRecord {
            version: RECORD_VERSION,
            high_score: score,
        };
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&record)?)?;
        std::fs::rename(&tmp, &self.path)?;
        log::info!("High score {} saved to {}", score, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rhythm_hopper_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_is_absent() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.load_high_score().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_next_session() {
        let path = temp_path("roundtrip");
        let mut store = JsonFileStore::new(&path);
        store.save_high_score(1234).unwrap();

        let next_session = JsonFileStore::new(&path);
        assert_eq!(next_session.load_high_score().unwrap(), Some(1234));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.load_high_score().is_err());
        let _ = std::fs::remove_file(&path);
    }
}
