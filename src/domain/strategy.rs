//! Strategy parameter set.

use serde::{Deserialize, Serialize};

use super::simulator::TradeControls;
use super::sizing::UnitShape;

/// One strategy configuration: action threshold, sizing policy and
/// the order controls attached to every trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub threshold: f64,
    pub unit_shape: UnitShape,
    #[serde(default)]
    pub controls: TradeControls,
}

impl StrategyParams {
    pub fn new(threshold: f64, unit_shape: UnitShape) -> Self {
        Self {
            threshold,
            unit_shape,
            controls: TradeControls::NONE,
        }
    }

    pub fn with_controls(mut self, controls: TradeControls) -> Self {
        self.controls = controls;
        self
    }

    /// One-line description for reports and logs.
    pub fn describe(&self) -> String {
        let mut out = format!(
            "threshold {:.1}, unit shape {}",
            self.threshold, self.unit_shape
        );
        if let Some(sl) = self.controls.stop_loss {
            out.push_str(&format!(", stop loss {sl}"));
        }
        if let Some(tp) = self.controls.take_profit {
            out.push_str(&format!(", take profit {tp}"));
        }
        if let Some(ts) = self.controls.trailing_stop {
            out.push_str(&format!(", trailing stop {ts} pips"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_lists_controls() {
        let params = StrategyParams::new(60.0, UnitShape::Linear).with_controls(TradeControls {
            trailing_stop: Some(15.0),
            ..TradeControls::NONE
        });
        let text = params.describe();
        assert!(text.contains("threshold 60.0"));
        assert!(text.contains("unit shape linear"));
        assert!(text.contains("trailing stop 15 pips"));
        assert!(!text.contains("stop loss"));
    }

    #[test]
    fn serde_round_trip() {
        let params = StrategyParams::new(80.0, UnitShape::Quadratic).with_controls(TradeControls {
            stop_loss: Some(1.25),
            take_profit: Some(1.30),
            trailing_stop: None,
        });
        let json = serde_json::to_string(&params).unwrap();
        let back: StrategyParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn controls_default_to_none_when_absent() {
        let params: StrategyParams =
            serde_json::from_str(r#"{"threshold": 40.0, "unit_shape": "constant"}"#).unwrap();
        assert_eq!(params.controls, TradeControls::NONE);
    }
}
