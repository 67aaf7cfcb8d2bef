// Per-column min-max scaling onto [0, 1].

use serde::{Deserialize, Serialize};

use super::{check_training_set, ModelError};

/// Learned column minima and maxima. A constant column maps to
/// `value - min`, so its training values become 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl MinMaxScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ModelError> {
        let width = check_training_set(rows, &vec![0.0; rows.len()])?;
        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];
        for row in rows {
            for (col, &v) in row.iter().enumerate() {
                min[col] = min[col].min(v);
                max[col] = max[col].max(v);
            }
        }
        Ok(MinMaxScaler { min, max })
    }

    /// Fit a single-column scaler, used for regression targets.
    pub fn fit_values(values: &[f64]) -> Result<Self, ModelError> {
        let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
        Self::fit(&rows)
    }

    fn width(&self) -> usize {
        self.min.len()
    }

    fn range(&self, col: usize) -> f64 {
        let r = self.max[col] - self.min[col];
        if r == 0.0 {
            1.0
        } else {
            r
        }
    }

    pub fn scale(&self, col: usize, value: f64) -> f64 {
        (value - self.min[col]) / self.range(col)
    }

    pub fn unscale(&self, col: usize, scaled: f64) -> f64 {
        scaled * self.range(col) + self.min[col]
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.width() {
            return Err(ModelError::ShapeMismatch {
                expected: self.width(),
                got: row.len(),
            });
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(col, &v)| self.scale(col, v))
            .collect())
    }
}
