//! Predictive model port trait.

use std::collections::BTreeMap;

use crate::domain::error::PairtraderError;
use crate::domain::features::FEATURE_COUNT;

/// Opaque hyperparameter mapping. Keys are interpreted only by the
/// model behind the trait, never by the core.
pub type ModelParams = BTreeMap<String, f64>;

/// A regression capability consumed as a black box: fit on feature
/// rows with pip targets, then predict one value per row.
pub trait PredictiveModel: Send {
    fn name(&self) -> &'static str;

    fn fit(
        &mut self,
        features: &[[f64; FEATURE_COUNT]],
        targets: &[f64],
        params: &ModelParams,
    ) -> Result<(), PairtraderError>;

    /// Predictions, one per input row in order.
    fn predict(&self, features: &[[f64; FEATURE_COUNT]]) -> Result<Vec<f64>, PairtraderError>;
}

/// Constructor for fresh model instances, one per search combination.
pub type ModelFactory<'a> = &'a (dyn Fn() -> Box<dyn PredictiveModel> + Sync);
