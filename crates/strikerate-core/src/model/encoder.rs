// Categorical encoders: ordinal label codes, and one-hot indicator columns
// produced by smartcore's `preprocessing::categorical::OneHotEncoder`.

use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::preprocessing::categorical::{self, OneHotEncoderParams};

use super::ModelError;

/// Maps each distinct label to its index in the sorted class list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        LabelEncoder { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, label: &str) -> Result<usize, ModelError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| ModelError::UnknownLabel(label.to_string()))
    }
}

/// Indicator columns for each category, sorted. With `drop_first` the first
/// category has no column and is encoded as all zeros; so is any category
/// not seen during fitting.
///
/// Categories are label-coded first and smartcore expands the code column.
#[derive(Debug)]
pub struct OneHotEncoder {
    labels: LabelEncoder,
    /// `None` when fitted on no values.
    indicators: Option<categorical::OneHotEncoder>,
    drop_first: bool,
}

impl OneHotEncoder {
    pub fn fit<'a, I>(values: I, drop_first: bool) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let labels = LabelEncoder::fit(values);
        let indicators = if labels.classes().is_empty() {
            None
        } else {
            // One row per code, in code order, so indicator j is class j.
            let codes: Vec<Vec<f64>> = (0..labels.classes().len())
                .map(|code| vec![code as f64])
                .collect();
            let params = OneHotEncoderParams::from_cat_idx(&[0]);
            Some(categorical::OneHotEncoder::fit(
                &DenseMatrix::from_2d_vec(&codes),
                params,
            )?)
        };
        Ok(OneHotEncoder {
            labels,
            indicators,
            drop_first,
        })
    }

    fn skipped(&self) -> usize {
        usize::from(self.drop_first && !self.labels.classes().is_empty())
    }

    pub fn width(&self) -> usize {
        self.labels.classes().len() - self.skipped()
    }

    /// Column names in the form `<prefix>_<category>`.
    pub fn feature_names(&self, prefix: &str) -> Vec<String> {
        self.labels.classes()[self.skipped()..]
            .iter()
            .map(|c| format!("{prefix}_{c}"))
            .collect()
    }

    pub fn transform(&self, value: Option<&str>) -> Result<Vec<f64>, ModelError> {
        let code = value.and_then(|v| self.labels.transform(v).ok());
        let (Some(code), Some(indicators)) = (code, &self.indicators) else {
            return Ok(vec![0.0; self.width()]);
        };
        let row = DenseMatrix::from_2d_vec(&vec![vec![code as f64]]);
        let encoded = indicators.transform(&row)?;
        Ok((self.skipped()..self.labels.classes().len())
            .map(|col| *encoded.get((0, col)))
            .collect())
    }
}
