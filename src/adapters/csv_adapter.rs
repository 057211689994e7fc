//! CSV candle-store adapter.
//!
//! One space-delimited file per instrument under a base directory,
//! `<dir>/<INSTRUMENT>.csv`, with a header line and ten columns:
//! date, bid OHLC, ask OHLC, volume.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::candle::Candle;
use crate::domain::error::PairtraderError;
use crate::domain::instrument::Instrument;
use crate::ports::data_port::CandleSource;

pub struct CsvCandleStore {
    base_path: PathBuf,
}

impl CsvCandleStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &Instrument) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument.name()))
    }
}

impl CandleSource for CsvCandleStore {
    fn fetch_candles(&self, instrument: &Instrument) -> Result<Vec<Candle>, PairtraderError> {
        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| PairtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        // Flexible so short and long rows reach the column-count check
        // below instead of surfacing as an opaque reader error.
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut candles = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PairtraderError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            if record.len() != 10 {
                return Err(PairtraderError::MalformedCandle {
                    date: None,
                    reason: format!("expected 10 columns, found {}", record.len()),
                });
            }

            let date = NaiveDate::parse_from_str(&record[0], "%Y-%m-%d").map_err(|e| {
                PairtraderError::MalformedCandle {
                    date: None,
                    reason: format!("invalid date {:?}: {}", &record[0], e),
                }
            })?;

            let mut prices = [0.0f64; 8];
            for (slot, field) in prices.iter_mut().zip(record.iter().skip(1)) {
                *slot = field
                    .parse()
                    .map_err(|e| PairtraderError::MalformedCandle {
                        date: Some(date),
                        reason: format!("invalid price {field:?}: {e}"),
                    })?;
            }

            let volume: i64 = record[9]
                .parse()
                .map_err(|e| PairtraderError::MalformedCandle {
                    date: Some(date),
                    reason: format!("invalid volume {:?}: {}", &record[9], e),
                })?;

            candles.push(Candle {
                date,
                open_bid: prices[0],
                high_bid: prices[1],
                low_bid: prices[2],
                close_bid: prices[3],
                open_ask: prices[4],
                high_ask: prices[5],
                low_ask: prices[6],
                close_ask: prices[7],
                volume,
            });
        }

        candles.sort_by_key(|c| c.date);
        Ok(candles)
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>, PairtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PairtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut instruments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PairtraderError::Data {
                reason: format!("directory entry error: {e}"),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                instruments.push(Instrument::new(stem));
            }
        }

        instruments.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(instruments)
    }
}
