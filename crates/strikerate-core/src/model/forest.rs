// Random forest regression on smartcore's `RandomForestRegressor`.
//
// Every feature is a split candidate at every node. The fitted forest keeps
// its feature width so single rows are checked before prediction, and it
// serializes to JSON through smartcore's serde support.

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::arrays::Array;
use tracing::debug;

use super::{check_training_set, matrix, Matrix, ModelError};
use crate::config::ModelConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// Unlimited when `None`.
    pub max_depth: Option<usize>,
    /// Nodes with fewer samples become leaves.
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

impl From<&ModelConfig> for ForestParams {
    fn from(config: &ModelConfig) -> Self {
        ForestParams {
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            seed: config.seed,
        }
    }
}

impl ForestParams {
    fn regressor_params(
        &self,
        n_features: usize,
    ) -> Result<RandomForestRegressorParameters, ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParameter {
                name: "n_estimators".into(),
                message: "at least one tree is required".into(),
            });
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidParameter {
                name: "min_samples_split".into(),
                message: format!("{} is below 2", self.min_samples_split),
            });
        }
        let mut params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_estimators)
            .with_min_samples_split(self.min_samples_split)
            .with_m(n_features)
            .with_seed(self.seed);
        if let Some(depth) = self.max_depth {
            let depth = u16::try_from(depth).map_err(|_| ModelError::InvalidParameter {
                name: "max_depth".into(),
                message: format!("{depth} exceeds {}", u16::MAX),
            })?;
            params = params.with_max_depth(depth);
        }
        Ok(params)
    }
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    regressor: RandomForestRegressor<f64, f64, Matrix, Vec<f64>>,
}

impl RandomForest {
    /// Fit on a feature matrix and its targets.
    pub fn fit(x: &Matrix, y: &Vec<f64>, params: &ForestParams) -> Result<Self, ModelError> {
        let (rows, n_features) = x.shape();
        if rows == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if rows != y.len() {
            return Err(ModelError::LengthMismatch {
                features: rows,
                targets: y.len(),
            });
        }
        let regressor = RandomForestRegressor::fit(x, y, params.regressor_params(n_features)?)?;
        debug!(rows, n_features, trees = params.n_estimators, "random forest fitted");
        Ok(RandomForest {
            n_features,
            regressor,
        })
    }

    pub fn fit_rows(
        rows: &[Vec<f64>],
        targets: &[f64],
        params: &ForestParams,
    ) -> Result<Self, ModelError> {
        check_training_set(rows, targets)?;
        Self::fit(&matrix(rows)?, &targets.to_vec(), params)
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vec<f64>, ModelError> {
        let (_, width) = x.shape();
        if width != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                got: width,
            });
        }
        Ok(self.regressor.predict(x)?)
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        self.predict(&matrix(&[row.to_vec()])?)?
            .into_iter()
            .next()
            .ok_or(ModelError::ShapeMismatch {
                expected: 1,
                got: 0,
            })
    }
}
