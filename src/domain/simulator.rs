//! Single-day trade settlement against a historical candle.

use serde::{Deserialize, Serialize};

use super::candle::Candle;
use super::error::PairtraderError;

/// Optional order controls attached to a day's trade.
///
/// An explicit stop-loss price takes precedence over a trailing stop;
/// the trailing stop is a pip distance converted off the day's open.
/// Take-profit is carried for live execution but never triggers in the
/// simulation: a daily bar cannot order an intraday take-profit ahead
/// of the stop without path data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeControls {
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub trailing_stop: Option<f64>,
}

impl TradeControls {
    pub const NONE: TradeControls = TradeControls {
        stop_loss: None,
        take_profit: None,
        trailing_stop: None,
    };

    fn long_stop_price(&self, candle: &Candle, pip_factor: i64) -> Option<f64> {
        self.stop_loss.or_else(|| {
            self.trailing_stop
                .map(|pips| candle.open_bid - pips / pip_factor as f64)
        })
    }

    fn short_stop_price(&self, candle: &Candle, pip_factor: i64) -> Option<f64> {
        self.stop_loss.or_else(|| {
            self.trailing_stop
                .map(|pips| candle.open_ask + pips / pip_factor as f64)
        })
    }
}

/// Realized profit/loss of holding `units` across one candle, in the
/// same unit currency as `units`.
///
/// Longs enter at the open bid and exit at the close bid, or at the
/// stop price when the day's low bid breaches it. Shorts enter at the
/// open ask and exit at the close ask, or at the stop price when the
/// day's high ask breaches it. Pure function of its inputs.
pub fn settle(
    candle: &Candle,
    units: i64,
    controls: &TradeControls,
    pip_factor: i64,
) -> Result<f64, PairtraderError> {
    if units == 0 {
        return Ok(0.0);
    }

    if units > 0 {
        let exit = match controls.long_stop_price(candle, pip_factor) {
            Some(stop) if stop > 0.0 && candle.low_bid < stop => stop,
            _ => candle.close_bid,
        };
        check_exit_price(candle, exit)?;
        let units = units as f64;
        Ok(units - units * candle.open_bid / exit)
    } else {
        let exit = match controls.short_stop_price(candle, pip_factor) {
            Some(stop) if stop > 0.0 && candle.high_ask > stop => stop,
            _ => candle.close_ask,
        };
        check_exit_price(candle, exit)?;
        let units = units.unsigned_abs() as f64;
        Ok(units * candle.open_ask / exit - units)
    }
}

fn check_exit_price(candle: &Candle, exit: f64) -> Result<(), PairtraderError> {
    if exit > 0.0 {
        Ok(())
    } else {
        Err(PairtraderError::DegenerateMarketData {
            date: candle.date,
            price: exit,
        })
    }
}
