// Normalization of raw metrics onto a 0-10 scale and cohort ranking.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::analysis::metrics::{Metric, MetricResult, PlayerMetrics};
use crate::analysis::round2;
use crate::config::ScoringConfig;

/// The maximum a metric value is divided by, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizationBasis {
    /// Shared ceiling for every average-type metric.
    AverageCeiling(f64),
    /// Per-metric ceiling from settings.toml.
    FixedCeiling(f64),
    /// Best value of the metric among the players in this run.
    RunMaximum(f64),
}

impl NormalizationBasis {
    pub fn max(&self) -> f64 {
        match *self {
            NormalizationBasis::AverageCeiling(m)
            | NormalizationBasis::FixedCeiling(m)
            | NormalizationBasis::RunMaximum(m) => m,
        }
    }
}

impl fmt::Display for NormalizationBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationBasis::AverageCeiling(m) => write!(f, "average ceiling {m}"),
            NormalizationBasis::FixedCeiling(m) => write!(f, "fixed ceiling {m}"),
            NormalizationBasis::RunMaximum(m) => write!(f, "run maximum {m}"),
        }
    }
}

/// `round(10 * value / max, 2)`, or 0 when `max` is 0.
pub fn normalize(value: f64, max: f64) -> f64 {
    if max == 0.0 {
        return 0.0;
    }
    round2(10.0 * value / max)
}

/// Pick the basis for `metric` given the whole run's results.
pub fn basis_for(
    metric: Metric,
    scoring: &ScoringConfig,
    run: &[PlayerMetrics],
) -> NormalizationBasis {
    if metric.is_average() {
        return NormalizationBasis::AverageCeiling(scoring.average_ceiling);
    }
    if let Some(&ceiling) = scoring.ceilings.get(&metric) {
        return NormalizationBasis::FixedCeiling(ceiling);
    }
    let best = run
        .iter()
        .filter_map(|p| p.metrics.numeric(metric))
        .fold(0.0_f64, f64::max);
    NormalizationBasis::RunMaximum(best)
}

/// Per-metric scores for one player plus the averaged final score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub scores: BTreeMap<Metric, f64>,
    pub bases: BTreeMap<Metric, NormalizationBasis>,
    pub final_score: f64,
}

impl ScoreResult {
    pub fn score(&self, metric: Metric) -> Option<f64> {
        self.scores.get(&metric).copied()
    }
}

/// Score one player's metrics against precomputed bases.
pub fn score_player(
    metrics: &MetricResult,
    bases: &BTreeMap<Metric, NormalizationBasis>,
) -> ScoreResult {
    let mut scores = BTreeMap::new();
    let mut used = BTreeMap::new();
    for (metric, value) in metrics.iter() {
        if !metric.is_scored() {
            continue;
        }
        let (Some(v), Some(basis)) = (value.as_f64(), bases.get(&metric)) else {
            continue;
        };
        scores.insert(metric, normalize(v, basis.max()));
        used.insert(metric, *basis);
    }
    let final_score = if scores.is_empty() {
        0.0
    } else {
        round2(scores.values().sum::<f64>() / scores.len() as f64)
    };
    ScoreResult {
        scores,
        bases: used,
        final_score,
    }
}

/// One row of the final ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    pub player: String,
    pub metrics: MetricResult,
    pub score: ScoreResult,
}

/// Score every player and sort by final score, best first. Equal scores
/// keep the order the players were given in.
pub fn rank(run: Vec<PlayerMetrics>, scoring: &ScoringConfig) -> Vec<RankedPlayer> {
    let mut bases = BTreeMap::new();
    for metric in Metric::ALL.into_iter().filter(|m| m.is_scored()) {
        if run.iter().any(|p| p.metrics.get(metric).is_some()) {
            let basis = basis_for(metric, scoring, &run);
            debug!(metric = metric.key(), %basis, "normalization basis");
            bases.insert(metric, basis);
        }
    }

    let mut ranked: Vec<RankedPlayer> = run
        .into_iter()
        .map(|p| {
            let score = score_player(&p.metrics, &bases);
            RankedPlayer {
                player: p.player,
                metrics: p.metrics,
                score,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.final_score.total_cmp(&a.score.final_score));
    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
