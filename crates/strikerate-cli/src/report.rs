// Console report formatting: rankings, detailed breakdowns, predictions.

use strikerate_core::analysis::filter::Venue;
use strikerate_core::analysis::scoring::RankedPlayer;
use strikerate_core::model::evaluation::{CrossValidation, Evaluation};
use strikerate_core::predict::career::CareerProjection;

/// "1. Joe Root - Final Score: 7.50/10", best first.
pub fn ranking_lines(ranked: &[RankedPlayer]) -> Vec<String> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {} - Final Score: {:.2}/10",
                i + 1,
                r.player,
                r.score.final_score
            )
        })
        .collect()
}

/// Every selected metric's value, then each scored metric's 0-10 score and
/// the normalization basis it was scored against.
pub fn detail_lines(ranked: &[RankedPlayer]) -> Vec<String> {
    let mut lines = Vec::new();
    for r in ranked {
        lines.push(String::new());
        lines.push(format!("{}:", r.player));
        for (metric, value) in r.metrics.iter() {
            lines.push(format!("{metric}: {value}"));
        }
        for (metric, score) in &r.score.scores {
            let basis = r
                .score
                .bases
                .get(metric)
                .map(|b| format!(" ({b})"))
                .unwrap_or_default();
            lines.push(format!("{metric} (Score): {score:.2}{basis}"));
        }
        lines.push(format!("Final Score: {:.2}/10", r.score.final_score));
    }
    lines
}

/// Capitalize the first letter of every word ("v new zealand" -> "V New Zealand").
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn training_line(player: &str, evaluation: &Evaluation) -> String {
    format!(
        "Model trained for {player} - MAE: {:.2}, R²: {:.2}",
        evaluation.mae, evaluation.r2
    )
}

pub fn series_line(player: &str, opposition: &str, venue: Venue, matches: u32, total: u32) -> String {
    let plural = if matches == 1 { "match" } else { "matches" };
    format!(
        "{player} - Predicted Runs vs {} ({venue}) in {matches} {plural}: {total}",
        opposition.to_uppercase()
    )
}

pub fn career_model_lines(evaluation: &Evaluation, cv: &CrossValidation) -> Vec<String> {
    vec![
        "GENERAL MODEL METRICS".to_string(),
        format!("R² Score: {:.4}", evaluation.r2),
        format!("Mean Absolute Error (MAE): {:.2}", evaluation.mae),
        format!("Root Mean Squared Error (RMSE): {:.2}", evaluation.rmse),
        String::new(),
        "CROSS-VALIDATION RESULTS".to_string(),
        format!("Mean R² Score: {:.4}", cv.mean),
        format!("Standard Deviation of R² Scores: {:.4}", cv.std),
    ]
}

pub fn projection_lines(projection: &CareerProjection) -> Vec<String> {
    vec![
        "----- PLAYER STATS -----".to_string(),
        format!("PLAYER NAME: {}", projection.player.to_uppercase()),
        format!("CURRENT INNINGS: {}", projection.current_innings),
        format!("CURRENT RUNS: {}", projection.current_runs),
        format!("CURRENT AVERAGE: {:.2}", projection.current_average),
        String::new(),
        "Predictions:".to_string(),
        format!(
            "PREDICTED RUNS AFTER {} INNINGS: {}",
            projection.current_innings, projection.predicted_current
        ),
        format!(
            "PREDICTED RUNS AFTER {} INNINGS: {}",
            projection.expected_innings, projection.predicted_expected
        ),
    ]
}
