//! Exhaustive search over model hyperparameters × strategy parameters.

use log::{info, warn};
use rayon::prelude::*;

use super::backtest::{BacktestDay, align_test_days, run_with_predictions};
use super::candle::Candle;
use super::error::PairtraderError;
use super::features::{FEATURE_COUNT, FeatureRow};
use super::scoring::score;
use super::strategy::StrategyParams;
use crate::ports::model_port::{ModelFactory, ModelParams, PredictiveModel};

/// The cross product to evaluate and the time-ordered train/test split.
#[derive(Debug, Clone)]
pub struct SearchGrid {
    pub model_space: Vec<ModelParams>,
    pub strategy_space: Vec<StrategyParams>,
    /// Fraction of the dataset used for training, in (0, 1).
    pub split_ratio: f64,
}

/// The winning configuration of a search, with the model refit on the
/// full dataset for later live use.
pub struct BestResult {
    pub model_params: ModelParams,
    pub strategy_params: StrategyParams,
    pub model: Box<dyn PredictiveModel>,
    pub score: f64,
}

/// Prediction-quality summary of a fitted model on a test slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    pub avg_abs_error: f64,
    pub wrong_direction_rate: f64,
}

/// Mean absolute prediction error and the fraction of predictions
/// pointing in the wrong direction.
pub fn evaluate(
    model: &dyn PredictiveModel,
    test: &[FeatureRow],
) -> Result<ModelReport, PairtraderError> {
    let features: Vec<[f64; FEATURE_COUNT]> = test.iter().map(|r| r.features).collect();
    let predictions = model.predict(&features)?;

    let n = predictions.len().min(test.len());
    if n == 0 {
        return Ok(ModelReport {
            avg_abs_error: 0.0,
            wrong_direction_rate: 0.0,
        });
    }

    let mut abs_error = 0.0;
    let mut wrong = 0usize;
    for (pred, row) in predictions.iter().zip(test) {
        abs_error += (pred - row.target).abs();
        if pred * row.target < 0.0 {
            wrong += 1;
        }
    }

    Ok(ModelReport {
        avg_abs_error: abs_error / n as f64,
        wrong_direction_rate: wrong as f64 / n as f64,
    })
}

/// Evaluate every (model params, strategy params) combination in
/// declared order and return the best-scoring one.
///
/// The dataset is split at `split_ratio` into a leading train window
/// and a trailing test window, never shuffled. Model-parameter cells
/// run in parallel; each fits a fresh model, predicts the test window
/// once and replays it under every strategy parameter set. A failing
/// combination is logged and scored 0.0 rather than aborting the
/// search. Exact ties go to the first combination seen. The winner is
/// refit on the full dataset before being returned.
pub fn search(
    factory: ModelFactory<'_>,
    grid: &SearchGrid,
    candles: &[Candle],
    dataset: &[FeatureRow],
    pip_factor: i64,
    instrument: &str,
) -> Result<BestResult, PairtraderError> {
    let (train, test) = split_dataset(dataset, grid.split_ratio)?;
    if grid.model_space.is_empty() || grid.strategy_space.is_empty() {
        return Err(PairtraderError::Data {
            reason: "empty parameter space".into(),
        });
    }

    let days = align_test_days(candles, test)?;
    let train_features: Vec<[f64; FEATURE_COUNT]> = train.iter().map(|r| r.features).collect();
    let train_targets: Vec<f64> = train.iter().map(|r| r.target).collect();

    info!(
        "searching {} model x {} strategy combinations for {instrument} \
         ({} train rows, {} test rows)",
        grid.model_space.len(),
        grid.strategy_space.len(),
        train.len(),
        test.len()
    );

    // One parallel task per model-parameter cell; predictions are shared
    // across the strategy parameters within the cell. Collecting keeps
    // declared order, so the argmax below is deterministic.
    let score_rows: Vec<Vec<f64>> = grid
        .model_space
        .par_iter()
        .map(|model_params| {
            score_model_cell(
                factory,
                model_params,
                &grid.strategy_space,
                &train_features,
                &train_targets,
                &days,
                pip_factor,
                instrument,
            )
        })
        .collect();

    let mut best: Option<(usize, usize, f64)> = None;
    for (mi, row) in score_rows.iter().enumerate() {
        for (si, &value) in row.iter().enumerate() {
            if best.is_none_or(|(_, _, top)| value > top) {
                best = Some((mi, si, value));
            }
        }
    }
    let (mi, si, best_score) = best.ok_or_else(|| PairtraderError::Data {
        reason: "empty parameter space".into(),
    })?;

    let model_params = grid.model_space[mi].clone();
    let strategy_params = grid.strategy_space[si].clone();
    info!(
        "best score {best_score:.4} for {instrument}: {} / {:?}",
        strategy_params.describe(),
        model_params
    );

    // Refit on the full dataset so the returned model sees every row.
    let all_features: Vec<[f64; FEATURE_COUNT]> = dataset.iter().map(|r| r.features).collect();
    let all_targets: Vec<f64> = dataset.iter().map(|r| r.target).collect();
    let mut model = factory();
    model.fit(&all_features, &all_targets, &model_params)?;

    Ok(BestResult {
        model_params,
        strategy_params,
        model,
        score: best_score,
    })
}

/// Leading train window, trailing test window. Fails when either side
/// would be empty.
pub fn split_dataset(
    dataset: &[FeatureRow],
    split_ratio: f64,
) -> Result<(&[FeatureRow], &[FeatureRow]), PairtraderError> {
    let n = dataset.len();
    let train_len = (n as f64 * split_ratio) as usize;
    let train_len = train_len.min(n);

    if n == 0 || train_len == 0 || train_len == n {
        return Err(PairtraderError::InsufficientData {
            rows: n,
            train: train_len,
            test: n - train_len,
        });
    }

    Ok(dataset.split_at(train_len))
}

#[allow(clippy::too_many_arguments)]
fn score_model_cell(
    factory: ModelFactory<'_>,
    model_params: &ModelParams,
    strategy_space: &[StrategyParams],
    train_features: &[[f64; FEATURE_COUNT]],
    train_targets: &[f64],
    days: &[BacktestDay],
    pip_factor: i64,
    instrument: &str,
) -> Vec<f64> {
    let zeros = vec![0.0; strategy_space.len()];

    let mut model = factory();
    if let Err(err) = model.fit(train_features, train_targets, model_params) {
        warn!("model fit failed for {model_params:?}, scoring 0: {err}");
        return zeros;
    }

    let features: Vec<[f64; FEATURE_COUNT]> = days.iter().map(|d| d.features).collect();
    let predictions = match model.predict(&features) {
        Ok(p) if p.len() == days.len() => p,
        Ok(p) => {
            warn!(
                "model returned {} predictions for {} rows, scoring 0",
                p.len(),
                days.len()
            );
            return zeros;
        }
        Err(err) => {
            warn!("model predict failed for {model_params:?}, scoring 0: {err}");
            return zeros;
        }
    };

    strategy_space
        .iter()
        .map(|params| {
            let run = run_with_predictions(&predictions, days, params, pip_factor, instrument);
            score(&run.balance)
        })
        .collect()
}
