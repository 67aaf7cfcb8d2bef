// Hold-out splitting, regression error metrics and k-fold cross-validation
// through smartcore's `model_selection` and `metrics` modules.

use serde::{Deserialize, Serialize};
use smartcore::metrics::{mean_absolute_error, mean_squared_error, r2};
use smartcore::model_selection::{train_test_split, BaseKFold, KFold};

use super::forest::{ForestParams, RandomForest};
use super::{check_training_set, matrix, take, Matrix, ModelError};

/// R^2 where a constant `actual` scores 1 when matched exactly and 0
/// otherwise, instead of dividing by a zero total sum of squares.
fn r2_score(actual: &Vec<f64>, predicted: &Vec<f64>) -> f64 {
    let Some(&first) = actual.first() else {
        return 0.0;
    };
    if actual.iter().all(|&a| a == first) {
        return if actual == predicted { 1.0 } else { 0.0 };
    }
    r2(actual, predicted)
}

/// Held-out error metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
}

impl Evaluation {
    /// Both slices must have the same length. Empty input scores zeros.
    pub fn of(actual: &[f64], predicted: &[f64]) -> Self {
        if actual.is_empty() {
            return Evaluation {
                r2: 0.0,
                mae: 0.0,
                rmse: 0.0,
            };
        }
        let (actual, predicted) = (actual.to_vec(), predicted.to_vec());
        Evaluation {
            r2: r2_score(&actual, &predicted),
            mae: mean_absolute_error(&actual, &predicted),
            rmse: mean_squared_error(&actual, &predicted).sqrt(),
        }
    }
}

// ---------------------------------------------------------------------------
// Hold-out split
// ---------------------------------------------------------------------------

pub struct HoldOut {
    pub x_train: Matrix,
    pub x_test: Matrix,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
}

fn fraction_error(message: String) -> ModelError {
    ModelError::InvalidParameter {
        name: "test_fraction".into(),
        message,
    }
}

/// Shuffle with `seed` and hold out `floor(n * test_fraction)` rows. Both
/// sides must end up non-empty.
pub fn hold_out(
    features: &[Vec<f64>],
    targets: &[f64],
    test_fraction: f64,
    seed: u64,
) -> Result<HoldOut, ModelError> {
    check_training_set(features, targets)?;
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(fraction_error(format!("{test_fraction} is not between 0 and 1")));
    }
    let n = features.len();
    let fraction = test_fraction as f32;
    // Same sizing smartcore applies internally; it panics on an empty side.
    let n_test = (n as f32 * fraction) as usize;
    if n_test == 0 || n_test >= n {
        return Err(fraction_error(format!(
            "{n} rows cannot be split into non-empty train and test sets"
        )));
    }

    let (x_train, x_test, y_train, y_test) =
        train_test_split(&matrix(features)?, &targets.to_vec(), fraction, true, Some(seed));
    Ok(HoldOut {
        x_train,
        x_test,
        y_train,
        y_test,
    })
}

// ---------------------------------------------------------------------------
// Cross-validation
// ---------------------------------------------------------------------------

/// Per-fold R^2 with its mean and population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidation {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

/// Fit a fresh forest on each k-1 shuffled folds and score R^2 on the rest.
pub fn cross_val_r2(
    features: &[Vec<f64>],
    targets: &[f64],
    params: &ForestParams,
    k: usize,
    seed: u64,
) -> Result<CrossValidation, ModelError> {
    check_training_set(features, targets)?;
    let n = features.len();
    if k < 2 || k > n {
        return Err(ModelError::InvalidParameter {
            name: "cv_folds".into(),
            message: format!("{k} folds cannot partition {n} rows"),
        });
    }

    let folds = KFold {
        n_splits: k,
        shuffle: true,
        seed: Some(seed),
    };
    let mut scores = Vec::with_capacity(k);
    for (train, test) in folds.split(&matrix(features)?) {
        let forest = RandomForest::fit_rows(&take(features, &train), &take(targets, &train), params)?;
        let predicted = forest.predict(&matrix(&take(features, &test))?)?;
        scores.push(r2_score(&take(targets, &test), &predicted));
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
    Ok(CrossValidation {
        scores,
        mean,
        std: var.sqrt(),
    })
}
