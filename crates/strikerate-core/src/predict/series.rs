// Series run projection from a per-player innings model.
//
// Features, in order: Year, Opposition (label code), Home/Away, BallsFaced,
// StrikeRate, MatchInning. Target: Runs.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use super::{whole_runs, PredictError};
use crate::analysis::filter::Venue;
use crate::config::ModelConfig;
use crate::data::innings::InningsRecord;
use crate::model::encoder::LabelEncoder;
use crate::model::evaluation::{hold_out, Evaluation};
use crate::model::forest::{ForestParams, RandomForest};
use crate::model::persistence::{encoder_path, load_json, model_path, save_json, TrainedModel};

pub const SERIES_FEATURES: [&str; 6] = [
    "Year",
    "Opposition",
    "Home/Away",
    "BallsFaced",
    "StrikeRate",
    "MatchInning",
];

/// Innings of each match that a series projection covers.
const PROJECTED_INNINGS: [u8; 2] = [1, 2];

fn feature_row(
    year: i32,
    opposition: usize,
    home_away: u8,
    balls_faced: f64,
    strike_rate: f64,
    match_inning: u8,
) -> Vec<f64> {
    vec![
        year as f64,
        opposition as f64,
        home_away as f64,
        balls_faced,
        strike_rate,
        match_inning as f64,
    ]
}

/// A player's trained innings model and the opposition encoder it needs.
#[derive(Debug)]
pub struct SeriesModel {
    pub model: TrainedModel,
    pub encoder: LabelEncoder,
}

impl SeriesModel {
    /// Fit on a player's merged innings with a seeded hold-out split and
    /// score the held-out rows.
    pub fn train(
        player: &str,
        rows: &[InningsRecord],
        config: &ModelConfig,
    ) -> Result<SeriesModel, PredictError> {
        if rows.is_empty() {
            return Err(PredictError::NoInnings(player.to_string()));
        }
        let encoder = LabelEncoder::fit(rows.iter().map(|r| r.opposition.as_str()));

        let mut features = Vec::with_capacity(rows.len());
        for r in rows {
            let code = encoder.transform(&r.opposition)?;
            features.push(feature_row(
                r.year,
                code,
                r.home_away,
                r.balls_faced,
                r.strike_rate,
                r.match_inning,
            ));
        }
        let targets: Vec<f64> = rows.iter().map(|r| r.runs as f64).collect();

        let split = hold_out(&features, &targets, config.test_fraction, config.seed)?;
        let forest = RandomForest::fit(&split.x_train, &split.y_train, &ForestParams::from(config))?;

        let predicted = forest.predict(&split.x_test)?;
        let evaluation = Evaluation::of(&split.y_test, &predicted);
        info!(
            player,
            train = split.y_train.len(),
            test = split.y_test.len(),
            mae = evaluation.mae,
            r2 = evaluation.r2,
            "series model trained"
        );

        Ok(SeriesModel {
            model: TrainedModel {
                player: player.to_string(),
                trained_at: Utc::now(),
                features: SERIES_FEATURES.iter().map(|f| f.to_string()).collect(),
                evaluation,
                forest,
            },
            encoder,
        })
    }

    pub fn save(&self, model_dir: &Path) -> Result<(), PredictError> {
        let player = &self.model.player;
        save_json(&model_path(model_dir, player), &self.model)?;
        save_json(&encoder_path(model_dir, player), &self.encoder)?;
        Ok(())
    }

    pub fn load(model_dir: &Path, player: &str) -> Result<SeriesModel, PredictError> {
        let model = load_json(&model_path(model_dir, player))?;
        let encoder = load_json(&encoder_path(model_dir, player))?;
        Ok(SeriesModel { model, encoder })
    }

    /// Project the runs a player scores in a series.
    pub fn predict(
        &self,
        rows: &[InningsRecord],
        request: &SeriesRequest,
        season_year: i32,
    ) -> Result<SeriesPrediction, PredictError> {
        let code = self.encoder.transform(&request.opposition).map_err(|_| {
            PredictError::UnknownOpposition {
                player: self.model.player.clone(),
                opposition: request.opposition.clone(),
            }
        })?;
        let (balls_faced, strike_rate) = opposition_averages(rows, &request.opposition)
            .ok_or_else(|| PredictError::NoInnings(self.model.player.clone()))?;

        let mut per_innings = Vec::new();
        for _ in 0..request.matches {
            for inning in PROJECTED_INNINGS {
                let row = feature_row(
                    season_year,
                    code,
                    request.venue.flag(),
                    balls_faced,
                    strike_rate,
                    inning,
                );
                per_innings.push(self.model.forest.predict_one(&row)?);
            }
        }
        let total = whole_runs(per_innings.iter().sum());
        Ok(SeriesPrediction { per_innings, total })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    /// Lower-cased opposition as stored in the merged data.
    pub opposition: String,
    pub venue: Venue,
    pub matches: u32,
}

impl SeriesRequest {
    pub fn new(opposition: &str, venue: Venue, matches: u32, max_matches: u32) -> Result<Self, PredictError> {
        if matches == 0 || matches > max_matches {
            return Err(PredictError::SeriesLength {
                got: matches,
                max: max_matches,
            });
        }
        Ok(SeriesRequest {
            opposition: opposition.trim().to_lowercase(),
            venue,
            matches,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPrediction {
    /// Raw model output for each projected innings, match by match.
    pub per_innings: Vec<f64>,
    pub total: u32,
}

/// Mean BallsFaced and StrikeRate against `opposition`, or over every
/// innings when the player has never faced them. `None` without innings.
pub fn opposition_averages(rows: &[InningsRecord], opposition: &str) -> Option<(f64, f64)> {
    let against: Vec<&InningsRecord> = rows.iter().filter(|r| r.opposition == opposition).collect();
    let pool: Vec<&InningsRecord> = if against.is_empty() {
        rows.iter().collect()
    } else {
        against
    };
    if pool.is_empty() {
        return None;
    }
    let n = pool.len() as f64;
    let balls = pool.iter().map(|r| r.balls_faced).sum::<f64>() / n;
    let rate = pool.iter().map(|r| r.strike_rate).sum::<f64>() / n;
    Some((balls, rate))
}

/// Distinct oppositions a player has batted against, sorted.
pub fn valid_oppositions(rows: &[InningsRecord]) -> Vec<String> {
    rows.iter()
        .map(|r| r.opposition.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
