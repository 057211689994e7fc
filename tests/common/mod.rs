#![allow(dead_code)]

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use pairtrader::domain::candle::Candle;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A candle whose realizable long move is 60.7 pips at pip factor 10000.
pub fn rising_candle(date: NaiveDate) -> Candle {
    Candle {
        date,
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

/// The mirror image: the close sits below the open on both sides.
pub fn falling_candle(date: NaiveDate) -> Candle {
    Candle {
        date,
        open_bid: 1.269,
        high_bid: 1.26953,
        low_bid: 1.26234,
        close_bid: 1.26278,
        open_ask: 1.27,
        high_ask: 1.27015,
        low_ask: 1.26249,
        close_ask: 1.26293,
        volume: 13111,
    }
}

pub fn rising_series(count: u32) -> Vec<Candle> {
    (1..=count)
        .map(|n| rising_candle(date(2024, 1, 1) + chrono::Days::new(u64::from(n - 1))))
        .collect()
}

/// Write candles in the store's space-delimited file format.
pub fn write_candle_csv(dir: &Path, instrument: &str, candles: &[Candle]) {
    let mut content = String::from(
        "date openBid highBid lowBid closeBid openAsk highAsk lowAsk closeAsk volume\n",
    );
    for c in candles {
        content.push_str(&format!(
            "{} {:.5} {:.5} {:.5} {:.5} {:.5} {:.5} {:.5} {:.5} {}\n",
            c.date,
            c.open_bid,
            c.high_bid,
            c.low_bid,
            c.close_bid,
            c.open_ask,
            c.high_ask,
            c.low_ask,
            c.close_ask,
            c.volume
        ));
    }
    fs::write(dir.join(format!("{instrument}.csv")), content).unwrap();
}
