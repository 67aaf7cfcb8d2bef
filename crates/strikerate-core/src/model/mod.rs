// Regression model layer over smartcore: random forest, feature encoders,
// scaling, evaluation and JSON persistence of trained artifacts.

pub mod encoder;
pub mod evaluation;
pub mod forest;
pub mod persistence;
pub mod scaler;

use smartcore::error::Failed;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use thiserror::Error;

pub type Matrix = DenseMatrix<f64>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot fit a model on an empty training set")]
    EmptyTrainingSet,

    #[error("feature row has {got} columns, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("{features} feature rows but {targets} targets")]
    LengthMismatch { features: usize, targets: usize },

    #[error("smartcore: {0}")]
    Fit(#[from] Failed),

    #[error("unknown label `{0}`")]
    UnknownLabel(String),

    #[error("invalid parameter `{name}`: {message}")]
    InvalidParameter { name: String, message: String },

    #[error("failed to access model file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid model JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Check that a training set is non-empty, rectangular and matches its targets.
/// Returns the feature count.
pub(crate) fn check_training_set(
    features: &[Vec<f64>],
    targets: &[f64],
) -> Result<usize, ModelError> {
    if features.len() != targets.len() {
        return Err(ModelError::LengthMismatch {
            features: features.len(),
            targets: targets.len(),
        });
    }
    let Some(first) = features.first() else {
        return Err(ModelError::EmptyTrainingSet);
    };
    let width = first.len();
    if let Some(bad) = features.iter().find(|row| row.len() != width) {
        return Err(ModelError::ShapeMismatch {
            expected: width,
            got: bad.len(),
        });
    }
    Ok(width)
}

/// Dense row-major matrix from feature rows. smartcore panics on ragged or
/// empty input, so both are rejected here first.
pub fn matrix(rows: &[Vec<f64>]) -> Result<Matrix, ModelError> {
    check_training_set(rows, &vec![0.0; rows.len()])?;
    Ok(DenseMatrix::from_2d_vec(&rows.to_vec()))
}

/// Feature rows back out of a matrix.
pub fn rows_of(x: &Matrix) -> Vec<Vec<f64>> {
    let (rows, cols) = x.shape();
    (0..rows)
        .map(|r| (0..cols).map(|c| *x.get((r, c))).collect())
        .collect()
}

/// Select rows by index.
pub(crate) fn take<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}
