//! Daily bid/ask candle representation.

use chrono::NaiveDate;

use super::error::PairtraderError;

/// One trading day's aggregated bid/ask OHLC prices and volume.
///
/// Immutable once produced; one candle per trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open_bid: f64,
    pub high_bid: f64,
    pub low_bid: f64,
    pub close_bid: f64,
    pub open_ask: f64,
    pub high_ask: f64,
    pub low_ask: f64,
    pub close_ask: f64,
    pub volume: i64,
}

impl Candle {
    /// Check the candle invariants: positive prices, non-negative volume,
    /// and the high of each side at or above its open, low and close.
    pub fn validate(&self) -> Result<(), PairtraderError> {
        let fields = [
            ("open_bid", self.open_bid),
            ("high_bid", self.high_bid),
            ("low_bid", self.low_bid),
            ("close_bid", self.close_bid),
            ("open_ask", self.open_ask),
            ("high_ask", self.high_ask),
            ("low_ask", self.low_ask),
            ("close_ask", self.close_ask),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(self.malformed(format!("{name} is not a positive price: {value}")));
            }
        }

        if self.volume < 0 {
            return Err(self.malformed(format!("negative volume: {}", self.volume)));
        }

        let bid_max = self.open_bid.max(self.low_bid).max(self.close_bid);
        if self.high_bid < bid_max {
            return Err(self.malformed(format!(
                "high_bid {} below another bid price {bid_max}",
                self.high_bid
            )));
        }

        let ask_max = self.open_ask.max(self.low_ask).max(self.close_ask);
        if self.high_ask < ask_max {
            return Err(self.malformed(format!(
                "high_ask {} below another ask price {ask_max}",
                self.high_ask
            )));
        }

        Ok(())
    }

    fn malformed(&self, reason: String) -> PairtraderError {
        PairtraderError::MalformedCandle {
            date: Some(self.date),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candle() -> Candle {
        Candle {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open_bid: 1.26278,
            high_bid: 1.26953,
            low_bid: 1.26234,
            close_bid: 1.269,
            open_ask: 1.26293,
            high_ask: 1.27015,
            low_ask: 1.26249,
            close_ask: 1.27,
            volume: 13111,
        }
    }

    #[test]
    fn valid_candle_passes() {
        assert!(sample_candle().validate().is_ok());
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut candle = sample_candle();
        candle.low_bid = 0.0;
        let err = candle.validate().unwrap_err();
        assert!(err.to_string().contains("low_bid"));
    }

    #[test]
    fn nan_price_rejected() {
        let mut candle = sample_candle();
        candle.close_ask = f64::NAN;
        assert!(candle.validate().is_err());
    }

    #[test]
    fn high_bid_below_close_rejected() {
        let mut candle = sample_candle();
        candle.high_bid = candle.close_bid - 0.001;
        let err = candle.validate().unwrap_err();
        assert!(err.to_string().contains("high_bid"));
    }

    #[test]
    fn high_ask_below_open_rejected() {
        let mut candle = sample_candle();
        candle.high_ask = candle.open_ask - 0.001;
        let err = candle.validate().unwrap_err();
        assert!(err.to_string().contains("high_ask"));
    }

    #[test]
    fn negative_volume_rejected() {
        let mut candle = sample_candle();
        candle.volume = -1;
        assert!(candle.validate().is_err());
    }
}
