// Career-run forecasting from career snapshot tables.
//
// The model is fitted on the past snapshot: 17 min-max scaled numeric
// columns plus one-hot Country (first category dropped), target Runs scaled
// the same way. Projections grow a player's counting stats with fixed ratios
// per additional innings and rebuild the derived rates from them.

use tracing::info;

use super::{whole_runs, PredictError};
use crate::config::{GrowthConfig, ModelConfig};
use crate::data::career::{find_player, CareerRecord};
use crate::model::encoder::OneHotEncoder;
use crate::model::evaluation::{cross_val_r2, hold_out, CrossValidation, Evaluation};
use crate::model::forest::{ForestParams, RandomForest};
use crate::model::scaler::MinMaxScaler;
use crate::model::{rows_of, ModelError};
use crate::preprocess::career::{build_record, CareerCounts};

pub const NUMERIC_FEATURES: [&str; 17] = [
    "Matches",
    "Innings",
    "NotOut",
    "HighestScore",
    "Ducks",
    "Centuries",
    "HalfCenturies",
    "Average",
    "FirstMatch",
    "LastMatch",
    "CenturyConversion",
    "FiftyPlusScorePercentage",
    "DuckPercentage",
    "NotOutPercentage",
    "CareerLength",
    "MatchesPerYear",
    "CurrentPlayer",
];

fn numeric_features(r: &CareerRecord) -> Vec<f64> {
    vec![
        r.matches as f64,
        r.innings as f64,
        r.not_out as f64,
        r.highest_score as f64,
        r.ducks as f64,
        r.centuries as f64,
        r.half_centuries as f64,
        r.average,
        r.first_match as f64,
        r.last_match as f64,
        r.century_conversion,
        r.fifty_plus_score_percentage,
        r.duck_percentage,
        r.not_out_percentage,
        r.career_length as f64,
        r.matches_per_year,
        r.current_player as f64,
    ]
}

/// Scaled numeric columns followed by the country indicators.
fn encode_row(
    scaler: &MinMaxScaler,
    countries: &OneHotEncoder,
    record: &CareerRecord,
) -> Result<Vec<f64>, ModelError> {
    let mut row = scaler.transform_row(&numeric_features(record))?;
    row.extend(countries.transform(record.country.as_deref())?);
    Ok(row)
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CareerModel {
    forest: RandomForest,
    features: MinMaxScaler,
    target: MinMaxScaler,
    countries: OneHotEncoder,
    /// Hold-out metrics in runs (unscaled).
    pub evaluation: Evaluation,
    /// R^2 across folds of the training split.
    pub cross_validation: CrossValidation,
}

impl CareerModel {
    pub fn train(records: &[CareerRecord], config: &ModelConfig) -> Result<CareerModel, PredictError> {
        if records.is_empty() {
            return Err(ModelError::EmptyTrainingSet.into());
        }
        let numeric: Vec<Vec<f64>> = records.iter().map(numeric_features).collect();
        let features = MinMaxScaler::fit(&numeric)?;
        let runs: Vec<f64> = records.iter().map(|r| r.runs as f64).collect();
        let target = MinMaxScaler::fit_values(&runs)?;
        let countries = OneHotEncoder::fit(records.iter().filter_map(|r| r.country.as_deref()), true)?;

        let x = records
            .iter()
            .map(|r| encode_row(&features, &countries, r))
            .collect::<Result<Vec<_>, _>>()?;
        let y: Vec<f64> = runs.iter().map(|&v| target.scale(0, v)).collect();

        let params = ForestParams::from(config);
        let split = hold_out(&x, &y, config.test_fraction, config.seed)?;
        let forest = RandomForest::fit(&split.x_train, &split.y_train, &params)?;

        let unscale = |values: &[f64]| -> Vec<f64> {
            values.iter().map(|&v| target.unscale(0, v)).collect()
        };
        let predicted = forest.predict(&split.x_test)?;
        let evaluation = Evaluation::of(&unscale(&split.y_test), &unscale(&predicted));

        let cross_validation = cross_val_r2(
            &rows_of(&split.x_train),
            &split.y_train,
            &params,
            config.cv_folds,
            config.seed,
        )?;

        let model = CareerModel {
            forest,
            features,
            target,
            countries,
            evaluation,
            cross_validation,
        };
        info!(
            rows = records.len(),
            features = model.feature_names().len(),
            r2 = model.evaluation.r2,
            cv_mean = model.cross_validation.mean,
            "career model trained"
        );
        Ok(model)
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        names.extend(self.countries.feature_names("Country"));
        names
    }

    pub fn encode(&self, record: &CareerRecord) -> Result<Vec<f64>, ModelError> {
        encode_row(&self.features, &self.countries, record)
    }

    /// Predicted career runs for a record, in whole runs.
    pub fn predict_runs(&self, record: &CareerRecord) -> Result<u32, PredictError> {
        let scaled = self.forest.predict_one(&self.encode(record)?)?;
        Ok(whole_runs(self.target.unscale(0, scaled)))
    }
}

// ---------------------------------------------------------------------------
// Lookup and projection
// ---------------------------------------------------------------------------

/// Where a player was found among the two snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CareerLookup<'a> {
    Both {
        past: &'a CareerRecord,
        latest: &'a CareerRecord,
    },
    PastOnly(&'a CareerRecord),
    LatestOnly(&'a CareerRecord),
}

impl<'a> CareerLookup<'a> {
    pub fn find(past: &'a [CareerRecord], latest: &'a [CareerRecord], name: &str) -> Option<Self> {
        match (find_player(past, name), find_player(latest, name)) {
            (Some(past), Some(latest)) => Some(CareerLookup::Both { past, latest }),
            (Some(past), None) => Some(CareerLookup::PastOnly(past)),
            (None, Some(latest)) => Some(CareerLookup::LatestOnly(latest)),
            (None, None) => None,
        }
    }

    /// Most recent stats, shown to the user and predicted as-is.
    pub fn latest(&self) -> &'a CareerRecord {
        match *self {
            CareerLookup::Both { latest, .. } | CareerLookup::LatestOnly(latest) => latest,
            CareerLookup::PastOnly(past) => past,
        }
    }

    /// Stats the projection grows from; the past snapshot when available.
    pub fn base(&self) -> &'a CareerRecord {
        match *self {
            CareerLookup::Both { past, .. } | CareerLookup::PastOnly(past) => past,
            CareerLookup::LatestOnly(latest) => latest,
        }
    }

    pub fn describe(&self, past_year: i32, latest_year: i32) -> String {
        match self {
            CareerLookup::Both { .. } => {
                format!("Player found in both the {past_year} and {latest_year} snapshots.")
            }
            CareerLookup::PastOnly(_) => format!("Player found only in the {past_year} snapshot."),
            CareerLookup::LatestOnly(_) => {
                format!("Player found only in the {latest_year} snapshot.")
            }
        }
    }
}

/// Expected innings must exceed the current count and stay within `max`.
pub fn check_expected_innings(expected: u32, current: u32, max: u32) -> Result<(), PredictError> {
    if expected <= current {
        return Err(PredictError::ExpectedInningsTooFew { current });
    }
    if expected > max {
        return Err(PredictError::ExpectedInningsTooMany { max });
    }
    Ok(())
}

/// Grow `base` to `expected_innings` with the fixed per-innings ratios and
/// rebuild every derived field. Runs, highest score, average and the career
/// span are carried over unchanged.
pub fn project_record(base: &CareerRecord, expected_innings: u32, growth: &GrowthConfig) -> CareerRecord {
    let added = expected_innings.saturating_sub(base.innings);
    let mut counts = CareerCounts::from_record(base);
    counts.matches += added / growth.innings_per_match;
    counts.innings = expected_innings;
    counts.not_out += added / growth.not_out_every;
    counts.centuries += added / growth.century_every;
    counts.half_centuries += added / growth.half_century_every;
    counts.ducks += added / growth.duck_every;

    let mut projected = build_record(base.player_name.clone(), base.country.clone(), &counts, base.last_match);
    projected.current_player = base.current_player;
    projected
}

#[derive(Debug, Clone, PartialEq)]
pub struct CareerProjection {
    pub player: String,
    pub current_innings: u32,
    pub current_runs: u32,
    pub current_average: f64,
    /// Prediction at the current innings count.
    pub predicted_current: u32,
    pub expected_innings: u32,
    /// Prediction at the expected innings count.
    pub predicted_expected: u32,
}

pub fn project_career(
    model: &CareerModel,
    lookup: CareerLookup<'_>,
    expected_innings: u32,
    max_expected: u32,
    growth: &GrowthConfig,
) -> Result<CareerProjection, PredictError> {
    let base = lookup.base();
    check_expected_innings(expected_innings, base.innings, max_expected)?;

    let latest = lookup.latest();
    let predicted_current = model.predict_runs(latest)?;
    let projected = project_record(base, expected_innings, growth);
    let predicted_expected = model.predict_runs(&projected)?;

    Ok(CareerProjection {
        player: latest.player_name.clone(),
        current_innings: latest.innings,
        current_runs: latest.runs,
        current_average: latest.average,
        predicted_current,
        expected_innings,
        predicted_expected,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn growth() -> GrowthConfig {
        GrowthConfig {
            innings_per_match: 2,
            not_out_every: 10,
            century_every: 7,
            half_century_every: 3,
            duck_every: 20,
        }
    }

    fn record(name: &str, innings: u32, runs: u32, country: Option<&str>) -> CareerRecord {
        let counts = CareerCounts {
            matches: innings / 2 + 1,
            innings,
            not_out: innings / 10,
            runs,
            highest_score: runs / 10 + 20,
            average: runs as f64 / innings.max(1) as f64,
            centuries: runs / 900,
            half_centuries: runs / 400,
            ducks: innings / 15,
            first_match: 2000 + (innings % 7) as i32,
            last_match: 2019,
        };
        build_record(name.into(), country.map(str::to_string), &counts, 2019)
    }

    fn cohort() -> Vec<CareerRecord> {
        let countries = ["AUS", "ENG", "IND", "NZ"];
        (1..=40)
            .map(|i| {
                let innings = i * 5;
                record(&format!("Player {i}"), innings, innings * 40, Some(countries[i as usize % 4]))
            })
            .collect()
    }

    fn config() -> ModelConfig {
        ModelConfig {
            model_dir: "MODELS".into(),
            n_estimators: 20,
            seed: 42,
            test_fraction: 0.2,
            cv_folds: 4,
            max_depth: None,
            min_samples_split: 2,
        }
    }

    #[test]
    fn growth_ratios_use_integer_division() {
        let base = record("Base", 100, 4000, Some("ENG"));
        let projected = project_record(&base, 150, &growth());
        assert_eq!(projected.innings, 150);
        assert_eq!(projected.matches, base.matches + 25);
        assert_eq!(projected.not_out, base.not_out + 5);
        assert_eq!(projected.centuries, base.centuries + 7);
        assert_eq!(projected.half_centuries, base.half_centuries + 16);
        assert_eq!(projected.ducks, base.ducks + 2);
        assert_eq!(projected.runs, base.runs);
        assert_eq!(projected.current_player, base.current_player);
        // Derived rates follow the grown counts
        assert!((projected.duck_percentage - projected.ducks as f64 / 150.0).abs() < 1e-4);
    }

    #[test]
    fn expected_innings_bounds() {
        assert!(matches!(
            check_expected_innings(100, 100, 500),
            Err(PredictError::ExpectedInningsTooFew { current: 100 })
        ));
        assert!(matches!(
            check_expected_innings(501, 100, 500),
            Err(PredictError::ExpectedInningsTooMany { max: 500 })
        ));
        assert!(check_expected_innings(500, 100, 500).is_ok());
    }

    #[test]
    fn lookup_prefers_latest_for_display_and_past_for_growth() {
        let past = vec![record("SPD Smith", 100, 5000, Some("AUS"))];
        let latest = vec![
            record("SPD Smith", 140, 7000, Some("AUS")),
            record("New Face", 10, 300, Some("ENG")),
        ];

        let both = CareerLookup::find(&past, &latest, "spd smith").unwrap();
        assert!(matches!(both, CareerLookup::Both { .. }));
        assert_eq!(both.latest().innings, 140);
        assert_eq!(both.base().innings, 100);

        let only_latest = CareerLookup::find(&past, &latest, "NEW FACE").unwrap();
        assert_eq!(only_latest.base().innings, 10);
        assert!(only_latest.describe(2019, 2024).contains("only in the 2024"));

        assert!(CareerLookup::find(&past, &latest, "Nobody").is_none());
    }

    #[test]
    fn trains_and_projects() {
        let records = cohort();
        let model = CareerModel::train(&records, &config()).unwrap();
        assert_eq!(model.cross_validation.scores.len(), 4);
        assert_eq!(model.feature_names().len(), 17 + 3);
        assert_eq!(model.feature_names()[17], "Country_ENG");
        assert!(model.evaluation.mae >= 0.0);

        let lookup = CareerLookup::find(&records, &[], "Player 20").unwrap();
        let projection = project_career(&model, lookup, 180, 500, &growth()).unwrap();
        assert_eq!(projection.current_innings, 100);
        assert_eq!(projection.current_runs, 4000);
        assert_eq!(projection.expected_innings, 180);
        // Forest output stays within the range of training targets
        assert!(projection.predicted_current <= 8000);
        assert!(projection.predicted_expected <= 8000);
        assert!(projection.predicted_expected >= 200);
    }

    #[test]
    fn projection_rejects_unrealistic_innings() {
        let records = cohort();
        let model = CareerModel::train(&records, &config()).unwrap();
        let lookup = CareerLookup::find(&records, &[], "Player 20").unwrap();
        assert!(project_career(&model, lookup, 90, 500, &growth()).is_err());
        assert!(project_career(&model, lookup, 600, 500, &growth()).is_err());
    }

    #[test]
    fn unknown_country_encodes_as_dropped_category() {
        let records = cohort();
        let model = CareerModel::train(&records, &config()).unwrap();
        let mut stranger = records[0].clone();
        stranger.country = Some("NEP".into());
        let row = model.encode(&stranger).unwrap();
        assert_eq!(&row[17..], &[0.0, 0.0, 0.0]);
    }
}
