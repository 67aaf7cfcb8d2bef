// Run projections: per-player series totals and career-run forecasts.

pub mod career;
pub mod series;

use thiserror::Error;

use crate::data::DataError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("no innings available for {0}")]
    NoInnings(String),

    #[error("{player} has never played `{opposition}`")]
    UnknownOpposition { player: String, opposition: String },

    #[error("series length must be between 1 and {max} matches, got {got}")]
    SeriesLength { got: u32, max: u32 },

    #[error("expected innings must be greater than current innings ({current})")]
    ExpectedInningsTooFew { current: u32 },

    #[error("expected innings must be at most {max}")]
    ExpectedInningsTooMany { max: u32 },
}

/// Round a projected run total to a whole number of runs.
pub(crate) fn whole_runs(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
