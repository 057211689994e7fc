//! Backtest runner: day-by-day replay of a strategy over a test window.

use log::warn;

use super::candle::Candle;
use super::error::PairtraderError;
use super::features::{FEATURE_COUNT, FeatureRow};
use super::simulator::settle;
use super::sizing::size_trade;
use super::strategy::StrategyParams;
use crate::ports::model_port::PredictiveModel;

/// One simulated day: the features the prediction is made from, the
/// candle the resulting trade settles against, and that candle's
/// actual realizable pip change (for reporting).
#[derive(Debug, Clone)]
pub struct BacktestDay {
    pub candle: Candle,
    pub features: [f64; FEATURE_COUNT],
    pub actual: f64,
}

/// Output of a dry run: the cumulative balance per day and a
/// human-readable report.
#[derive(Debug, Clone, PartialEq)]
pub struct DryRun {
    pub balance: Vec<f64>,
    pub report: String,
}

/// Pair each test row with its settlement candle (the candle after the
/// row's feature candle, the one whose price change the row predicts).
pub fn align_test_days(
    candles: &[Candle],
    rows: &[FeatureRow],
) -> Result<Vec<BacktestDay>, PairtraderError> {
    let mut days = Vec::with_capacity(rows.len());
    let mut i = 0usize;

    for row in rows {
        while i < candles.len() && candles[i].date != row.date {
            i += 1;
        }
        if i >= candles.len() {
            return Err(PairtraderError::Data {
                reason: format!("no candle found for feature row dated {}", row.date),
            });
        }
        let next = candles.get(i + 1).ok_or_else(|| PairtraderError::Data {
            reason: format!("no settlement candle after {}", row.date),
        })?;
        days.push(BacktestDay {
            candle: next.clone(),
            features: row.features,
            actual: row.target,
        });
        i += 1;
    }

    Ok(days)
}

/// Replay the strategy over the test window: predict, size, settle and
/// accumulate, one day at a time.
///
/// A single forward pass with no retries. A day that fails to settle is
/// logged, reported and carried as zero impact; the balance always has
/// exactly one entry per test day.
pub fn dry_run(
    model: &dyn PredictiveModel,
    days: &[BacktestDay],
    params: &StrategyParams,
    pip_factor: i64,
    instrument: &str,
) -> Result<DryRun, PairtraderError> {
    let features: Vec<[f64; FEATURE_COUNT]> = days.iter().map(|d| d.features).collect();
    let predictions = model.predict(&features)?;
    if predictions.len() != days.len() {
        return Err(PairtraderError::Model {
            reason: format!(
                "model returned {} predictions for {} rows",
                predictions.len(),
                days.len()
            ),
        });
    }
    Ok(run_with_predictions(
        &predictions,
        days,
        params,
        pip_factor,
        instrument,
    ))
}

/// The sequential state machine behind [`dry_run`], reusable when one
/// set of predictions is replayed under many strategy parameters.
pub(crate) fn run_with_predictions(
    predictions: &[f64],
    days: &[BacktestDay],
    params: &StrategyParams,
    pip_factor: i64,
    instrument: &str,
) -> DryRun {
    let mut report = format!(
        "\nDry run report: {instrument}\n{}\n{}\n",
        params.describe(),
        "=".repeat(80)
    );

    let mut balance = Vec::with_capacity(days.len());
    let mut running = 0.0f64;

    for (day, &predicted) in days.iter().zip(predictions) {
        let units = size_trade(predicted, params.threshold, params.unit_shape);

        match settle(&day.candle, units, &params.controls, pip_factor) {
            Ok(profit_loss) => {
                running += profit_loss;
                if units != 0 {
                    report.push_str(&format_day(
                        &day.candle,
                        units,
                        predicted,
                        day.actual,
                        profit_loss,
                    ));
                }
            }
            Err(err) => {
                warn!("dry run day skipped: {err}");
                report.push_str(&format!("{}. Skipped: {err}.\n", day.candle.date));
            }
        }

        balance.push(running);
    }

    report.push_str(&format!(
        "Total profit/loss: {}\n",
        balance.last().copied().unwrap_or(0.0)
    ));

    DryRun { balance, report }
}

fn format_day(candle: &Candle, units: i64, predicted: f64, actual: f64, profit_loss: f64) -> String {
    let words = if units > 0 {
        format!("Bought {units} units")
    } else {
        format!("Sold {} units", -units)
    };
    format!(
        "{}. {}. Predicted: {:>6.1}  Actual: {:>6.1} PL: {:.4}.\n",
        candle.date, words, predicted, actual, profit_loss
    )
}
