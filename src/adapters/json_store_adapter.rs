//! JSON strategy-store adapter.
//!
//! Persists the winning configuration of a search as one JSON file per
//! instrument, `<dir>/<INSTRUMENT>.json`. The fitted model itself is
//! not serialized; fitting is deterministic, so the stored
//! hyperparameters are enough to reproduce it from the candle history.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::error::PairtraderError;
use crate::domain::instrument::Instrument;
use crate::domain::search::BestResult;
use crate::domain::strategy::StrategyParams;
use crate::ports::model_port::ModelParams;

/// The durable form of a search winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStrategy {
    pub instrument: String,
    pub model: String,
    pub model_params: ModelParams,
    pub strategy_params: StrategyParams,
    pub score: f64,
}

impl StoredStrategy {
    pub fn from_result(instrument: &Instrument, result: &BestResult) -> Self {
        Self {
            instrument: instrument.name().to_string(),
            model: result.model.name().to_string(),
            model_params: result.model_params.clone(),
            strategy_params: result.strategy_params.clone(),
            score: result.score,
        }
    }
}

pub struct JsonStrategyStore {
    base_path: PathBuf,
}

impl JsonStrategyStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn json_path(&self, instrument: &Instrument) -> PathBuf {
        self.base_path.join(format!("{}.json", instrument.name()))
    }

    pub fn save(&self, strategy: &StoredStrategy) -> Result<(), PairtraderError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self
            .base_path
            .join(format!("{}.json", strategy.instrument));
        let json =
            serde_json::to_string_pretty(strategy).map_err(|e| PairtraderError::Data {
                reason: format!("failed to serialize strategy for {}: {}", strategy.instrument, e),
            })?;
        fs::write(&path, json)?;
        Ok(())
    }

    pub fn load(&self, instrument: &Instrument) -> Result<StoredStrategy, PairtraderError> {
        let path = self.json_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| PairtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| PairtraderError::Data {
            reason: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    pub fn list(&self) -> Result<Vec<String>, PairtraderError> {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PairtraderError::Data {
                    reason: format!(
                        "failed to read directory {}: {}",
                        self.base_path.display(),
                        e
                    ),
                });
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PairtraderError::Data {
                reason: format!("directory entry error: {e}"),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".json") {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::simulator::TradeControls;
    use crate::domain::sizing::UnitShape;
    use tempfile::TempDir;

    fn sample() -> StoredStrategy {
        let mut model_params = ModelParams::new();
        model_params.insert("max_depth".into(), 6.0);
        model_params.insert("min_samples_split".into(), 10.0);
        StoredStrategy {
            instrument: "GBP_USD".into(),
            model: "regression_tree".into(),
            model_params,
            strategy_params: StrategyParams::new(60.0, UnitShape::Quadratic).with_controls(
                TradeControls {
                    trailing_stop: Some(15.0),
                    ..TradeControls::NONE
                },
            ),
            score: 0.6471,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonStrategyStore::new(dir.path().to_path_buf());

        let strategy = sample();
        store.save(&strategy).unwrap();
        let back = store.load(&Instrument::new("GBP_USD")).unwrap();

        assert_eq!(back, strategy);
    }

    #[test]
    fn save_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = JsonStrategyStore::new(dir.path().join("nested"));
        store.save(&sample()).unwrap();
        assert!(dir.path().join("nested/GBP_USD.json").exists());
    }

    #[test]
    fn load_missing_instrument_is_a_data_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonStrategyStore::new(dir.path().to_path_buf());
        let err = store.load(&Instrument::new("EUR_USD")).unwrap_err();
        assert!(matches!(err, PairtraderError::Data { .. }));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("EUR_USD.json"), "{not json").unwrap();
        let store = JsonStrategyStore::new(dir.path().to_path_buf());
        assert!(store.load(&Instrument::new("EUR_USD")).is_err());
    }

    #[test]
    fn list_returns_sorted_instruments() {
        let dir = TempDir::new().unwrap();
        let store = JsonStrategyStore::new(dir.path().to_path_buf());

        let mut b = sample();
        b.instrument = "USD_JPY".into();
        store.save(&sample()).unwrap();
        store.save(&b).unwrap();

        assert_eq!(store.list().unwrap(), vec!["GBP_USD", "USD_JPY"]);
    }

    #[test]
    fn list_on_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStrategyStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }
}
