//! Feature and target construction from daily candles.
//!
//! Features are the seven candle prices relative to that day's open bid,
//! in pips. The target is the next day's realizable price change in pips:
//! positive when a long taken at the open ask could close profitably at
//! the close bid, negative when a short taken at the open bid could close
//! profitably at the close ask, zero otherwise.

use chrono::NaiveDate;
use log::warn;

use super::candle::Candle;
use super::error::PairtraderError;
use super::instrument::price_to_pip;

pub const FEATURE_COUNT: usize = 7;

/// One supervised training row: today's features paired with tomorrow's
/// realizable pip change.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub features: [f64; FEATURE_COUNT],
    pub target: f64,
}

/// Stateless candle-to-row transformer for one instrument.
#[derive(Debug, Clone, Copy)]
pub struct FeatureTransformer {
    pip_factor: i64,
}

impl FeatureTransformer {
    pub fn new(pip_factor: i64) -> Self {
        Self { pip_factor }
    }

    /// The seven prices relative to open bid, in pips, rounded to 1 dp:
    /// high_bid, low_bid, close_bid, open_ask, high_ask, low_ask, close_ask.
    pub fn to_features(&self, candle: &Candle) -> Result<[f64; FEATURE_COUNT], PairtraderError> {
        candle.validate()?;
        let open = candle.open_bid;
        let raw = [
            candle.high_bid,
            candle.low_bid,
            candle.close_bid,
            candle.open_ask,
            candle.high_ask,
            candle.low_ask,
            candle.close_ask,
        ];
        Ok(raw.map(|price| price_to_pip(price - open, self.pip_factor)))
    }

    /// The realizable price change of a day, in pips, rounded to 1 dp.
    pub fn price_change(&self, candle: &Candle) -> f64 {
        let diff = if candle.close_bid - candle.open_ask > 0.0 {
            candle.close_bid - candle.open_ask
        } else if candle.close_ask - candle.open_bid < 0.0 {
            candle.close_ask - candle.open_bid
        } else {
            0.0
        };
        price_to_pip(diff, self.pip_factor)
    }

    /// Pair each candle's features with the following candle's price change.
    ///
    /// n candles yield at most n-1 rows in input order; the final candle
    /// has no successor. Rows involving a malformed candle are skipped.
    pub fn build_dataset(&self, candles: &[Candle]) -> Vec<FeatureRow> {
        let mut rows = Vec::with_capacity(candles.len().saturating_sub(1));

        for pair in candles.windows(2) {
            let (today, next) = (&pair[0], &pair[1]);

            let features = match self.to_features(today) {
                Ok(features) => features,
                Err(err) => {
                    warn!("skipping dataset row: {err}");
                    continue;
                }
            };
            if let Err(err) = next.validate() {
                warn!("skipping dataset row: {err}");
                continue;
            }

            rows.push(FeatureRow {
                date: today.date,
                features,
                target: self.price_change(next),
            });
        }

        rows
    }
}
