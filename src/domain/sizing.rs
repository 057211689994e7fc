//! Position sizing: predicted pip change to signed trade units.

use serde::{Deserialize, Serialize};

use super::error::PairtraderError;

/// Units bought or sold under the constant shape, and the anchor point
/// at which every other shape is calibrated to match it.
pub const CONSTANT_UNITS: i64 = 200;

/// Hard cap on the magnitude of any single trade.
pub const MAX_UNITS: i64 = 500;

const QUADRATIC_FACTOR: f64 = 1.0 / CONSTANT_UNITS as f64;
const ROOT_FACTOR: f64 = 14.142135623730951; // 200 / sqrt(200)

/// Policy mapping a predicted pip move to a trade's position size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitShape {
    Constant,
    Linear,
    Quadratic,
    Root,
}

impl UnitShape {
    pub const ALL: [UnitShape; 4] = [
        UnitShape::Constant,
        UnitShape::Linear,
        UnitShape::Quadratic,
        UnitShape::Root,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitShape::Constant => "constant",
            UnitShape::Linear => "linear",
            UnitShape::Quadratic => "quadratic",
            UnitShape::Root => "root",
        }
    }
}

impl std::fmt::Display for UnitShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnitShape {
    type Err = PairtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(UnitShape::Constant),
            "linear" => Ok(UnitShape::Linear),
            "quadratic" => Ok(UnitShape::Quadratic),
            "root" => Ok(UnitShape::Root),
            other => Err(PairtraderError::InvalidPolicy {
                name: other.to_string(),
            }),
        }
    }
}

/// Convert a prediction into signed units: positive buys, negative sells,
/// zero stays out of the market.
///
/// Predictions at or below the threshold in magnitude take no action.
/// Above it, the magnitude follows the unit shape, calibrated so that
/// every shape trades [`CONSTANT_UNITS`] at a 200-pip prediction, and is
/// capped at [`MAX_UNITS`].
pub fn size_trade(predicted: f64, threshold: f64, shape: UnitShape) -> i64 {
    if !predicted.is_finite() || predicted.abs() <= threshold {
        return 0;
    }

    let magnitude = match shape {
        UnitShape::Constant => CONSTANT_UNITS,
        UnitShape::Linear => predicted.abs().floor() as i64,
        UnitShape::Quadratic => (predicted * predicted * QUADRATIC_FACTOR).floor() as i64,
        UnitShape::Root => (predicted.abs().sqrt() * ROOT_FACTOR).floor() as i64,
    };
    let magnitude = magnitude.min(MAX_UNITS);

    if predicted > 0.0 { magnitude } else { -magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn at_or_below_threshold_takes_no_action() {
        for shape in UnitShape::ALL {
            assert_eq!(size_trade(0.0, 100.0, shape), 0);
            assert_eq!(size_trade(99.9, 100.0, shape), 0);
            assert_eq!(size_trade(-100.0, 100.0, shape), 0);
            assert_eq!(size_trade(100.0, 100.0, shape), 0);
        }
    }

    #[test]
    fn constant_shape_trades_fixed_units() {
        assert_eq!(size_trade(150.0, 100.0, UnitShape::Constant), 200);
        assert_eq!(size_trade(-150.0, 100.0, UnitShape::Constant), -200);
    }

    #[test]
    fn linear_shape_floors_prediction() {
        assert_eq!(size_trade(150.7, 100.0, UnitShape::Linear), 150);
        assert_eq!(size_trade(-150.7, 100.0, UnitShape::Linear), -150);
    }

    #[test]
    fn quadratic_shape_scaled() {
        // 150^2 / 200 = 112.5 -> 112
        assert_eq!(size_trade(150.0, 100.0, UnitShape::Quadratic), 112);
        assert_eq!(size_trade(-150.0, 100.0, UnitShape::Quadratic), -112);
    }

    #[test]
    fn root_shape_scaled() {
        // sqrt(150) * sqrt(200) = sqrt(30000) = 173.2... -> 173
        assert_eq!(size_trade(150.0, 100.0, UnitShape::Root), 173);
        assert_eq!(size_trade(-150.0, 100.0, UnitShape::Root), -173);
    }

    #[test]
    fn all_shapes_agree_at_calibration_point() {
        for shape in UnitShape::ALL {
            assert_eq!(size_trade(200.0, 100.0, shape), 200, "shape {shape}");
        }
    }

    #[test]
    fn magnitude_capped_at_max_units() {
        assert_eq!(size_trade(900.0, 100.0, UnitShape::Linear), MAX_UNITS);
        assert_eq!(size_trade(-900.0, 100.0, UnitShape::Quadratic), -MAX_UNITS);
    }

    #[test]
    fn non_finite_prediction_takes_no_action() {
        assert_eq!(size_trade(f64::NAN, 100.0, UnitShape::Linear), 0);
        assert_eq!(size_trade(f64::INFINITY, 100.0, UnitShape::Constant), 0);
    }

    #[test]
    fn unit_shape_round_trips_through_str() {
        for shape in UnitShape::ALL {
            assert_eq!(shape.as_str().parse::<UnitShape>().unwrap(), shape);
        }
    }

    #[test]
    fn unknown_shape_name_is_invalid_policy() {
        let err = "cubic".parse::<UnitShape>().unwrap_err();
        assert!(err.to_string().contains("cubic"));
    }

    proptest! {
        #[test]
        fn threshold_gates_and_sign_never_flips(
            predicted in -1000.0f64..1000.0,
            threshold in 1.0f64..500.0,
        ) {
            for shape in UnitShape::ALL {
                let units = size_trade(predicted, threshold, shape);
                if predicted.abs() <= threshold {
                    prop_assert_eq!(units, 0);
                } else {
                    // The curved shapes may floor a small prediction down to
                    // zero units, but a non-zero trade always follows the
                    // prediction's direction and respects the cap.
                    prop_assert!(units as f64 * predicted >= 0.0);
                    prop_assert!(units.abs() <= MAX_UNITS);
                }
            }
        }

        #[test]
        fn sign_matches_above_calibrated_thresholds(
            predicted in -1000.0f64..1000.0,
            threshold in 20.0f64..500.0,
        ) {
            for shape in UnitShape::ALL {
                let units = size_trade(predicted, threshold, shape);
                if predicted.abs() > threshold {
                    prop_assert_eq!(units.signum() as f64, predicted.signum());
                }
            }
        }
    }
}
