//! Candle access port trait.

use crate::domain::candle::Candle;
use crate::domain::error::PairtraderError;
use crate::domain::instrument::Instrument;

/// Source of historical daily candles for an instrument.
///
/// Implementations must return candles with strictly increasing dates
/// and all ten fields present.
pub trait CandleSource {
    fn fetch_candles(&self, instrument: &Instrument) -> Result<Vec<Candle>, PairtraderError>;

    fn list_instruments(&self) -> Result<Vec<Instrument>, PairtraderError>;
}
