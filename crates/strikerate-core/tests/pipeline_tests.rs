// End-to-end tests over the fixture exports: merge raw innings, compare the
// merged tables, train and reload a series model, then clean the career
// snapshots and project a career.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use strikerate_core::analysis::filter::{InningsFilter, Venue, YearRange};
use strikerate_core::analysis::metrics::{self, Metric, MetricValue, PlayerMetrics};
use strikerate_core::analysis::scoring;
use strikerate_core::config::{CareerPaths, GrowthConfig, ModelConfig, PlayerEntry, ScoringConfig};
use strikerate_core::data::{career, innings};
use strikerate_core::predict::career::{project_career, CareerLookup, CareerModel};
use strikerate_core::predict::series::{self, SeriesModel, SeriesRequest};
use strikerate_core::predict::PredictError;
use strikerate_core::preprocess::career::clean_snapshot_files;
use strikerate_core::preprocess::merge;

// ===========================================================================
// Test helpers
// ===========================================================================

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> String {
    format!("{FIXTURES}/{name}")
}

/// A fresh scratch directory under the system temp dir.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("strikerate_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn root(out: &Path) -> PlayerEntry {
    PlayerEntry {
        name: "Joe Root".into(),
        code: "JE Root".into(),
        home_nation: "England".into(),
        home_csv: fixture("root_home.csv"),
        away_csv: fixture("root_away.csv"),
        merged_csv: out.join("JE_ROOT_MERGED.csv").display().to_string(),
        colour: "red".into(),
    }
}

fn williamson(out: &Path) -> PlayerEntry {
    PlayerEntry {
        name: "Kane Williamson".into(),
        code: "KS Williamson".into(),
        home_nation: "New Zealand".into(),
        home_csv: fixture("kane_home.csv"),
        away_csv: fixture("kane_away.csv"),
        merged_csv: out.join("KS_WILLIAMSON_MERGED.csv").display().to_string(),
        colour: "grey".into(),
    }
}

fn model_config(model_dir: &Path) -> ModelConfig {
    ModelConfig {
        model_dir: model_dir.display().to_string(),
        n_estimators: 20,
        seed: 42,
        test_fraction: 0.2,
        cv_folds: 3,
        max_depth: None,
        min_samples_split: 2,
    }
}

fn merged(player: &PlayerEntry) -> Vec<innings::InningsRecord> {
    merge::merge_player_files(player).unwrap();
    innings::load_merged(Path::new(&player.merged_csv)).unwrap()
}

// ===========================================================================
// Merge
// ===========================================================================

#[test]
fn merge_writes_sorted_innings_without_dnb_rows() {
    let out = scratch("merge_sorted");
    let player = root(&out);
    let written = merge::merge_player_files(&player).unwrap();
    assert_eq!(written, 11);

    let rows = innings::load_merged(Path::new(&player.merged_csv)).unwrap();
    assert_eq!(rows.len(), 11);
    assert!(rows.windows(2).all(|w| w[0].year <= w[1].year));
    assert!(rows.iter().all(|r| r.nationality == "England"));
    assert!(rows.iter().all(|r| r.opposition == r.opposition.to_lowercase()));
    assert_eq!(rows.iter().filter(|r| r.is_home()).count(), 7);

    // 2021 is "v india" away before "v sri lanka" at home
    let year_2021: Vec<&str> = rows
        .iter()
        .filter(|r| r.year == 2021)
        .map(|r| r.opposition.as_str())
        .collect();
    assert_eq!(year_2021, vec!["v india", "v india", "v sri lanka", "v sri lanka"]);
}

#[test]
fn rerunning_the_merge_produces_identical_output() {
    let out = scratch("merge_idempotent");
    let player = root(&out);
    merge::merge_player_files(&player).unwrap();
    let first = std::fs::read_to_string(&player.merged_csv).unwrap();
    merge::merge_player_files(&player).unwrap();
    let second = std::fs::read_to_string(&player.merged_csv).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_raw_export_is_an_error() {
    let out = scratch("merge_missing");
    let mut player = root(&out);
    player.away_csv = fixture("does_not_exist.csv");
    assert!(merge::merge_player_files(&player).is_err());
    assert!(!Path::new(&player.merged_csv).exists());
}

// ===========================================================================
// Comparison
// ===========================================================================

#[test]
fn metrics_over_merged_innings() {
    let out = scratch("metrics");
    let rows = merged(&root(&out));
    let selected = [
        Metric::TotalRuns,
        Metric::Centuries,
        Metric::DoubleCenturies,
        Metric::FiftyPlusScores,
        Metric::PeakYear,
    ];
    let result = metrics::compute_metrics(&rows, &selected);

    assert_eq!(result.get(Metric::TotalRuns), Some(&MetricValue::Count(776)));
    assert_eq!(result.get(Metric::Centuries), Some(&MetricValue::Count(2)));
    assert_eq!(result.get(Metric::DoubleCenturies), Some(&MetricValue::Count(1)));
    assert_eq!(result.get(Metric::FiftyPlusScores), Some(&MetricValue::Count(6)));
    match result.get(Metric::PeakYear) {
        Some(MetricValue::Peak(Some(peak))) => {
            assert_eq!(peak.year, 2021);
            assert_eq!(peak.runs, 457);
        }
        other => panic!("expected a peak year, got {other:?}"),
    }
}

#[test]
fn filters_narrow_the_merged_table() {
    let out = scratch("filters");
    let rows = merged(&root(&out));

    let away = InningsFilter {
        venue: Some(Venue::Away),
        ..InningsFilter::default()
    };
    assert_eq!(away.apply(&rows).len(), 4);

    let india_2018 = InningsFilter {
        years: Some(YearRange { start: 2018, end: 2018 }),
        opposition: Some("INDIA".into()),
        ..InningsFilter::default()
    };
    let kept = india_2018.apply(&rows);
    assert_eq!(kept.len(), 3);
    let totals = metrics::compute_metrics(&kept, &[Metric::TotalRuns]);
    assert_eq!(totals.numeric(Metric::TotalRuns), Some(212.0));
}

#[test]
fn cohort_ranking_prefers_the_stronger_record() {
    let out = scratch("ranking");
    let selected = [Metric::TotalRuns, Metric::Centuries, Metric::BattingAverage];
    let run: Vec<PlayerMetrics> = [root(&out), williamson(&out)]
        .iter()
        .map(|p| PlayerMetrics {
            player: p.name.clone(),
            metrics: metrics::compute_metrics(&merged(p), &selected),
        })
        .collect();

    let mut ceilings = HashMap::new();
    ceilings.insert(Metric::TotalRuns, 10000.0);
    ceilings.insert(Metric::Centuries, 50.0);
    let scoring_config = ScoringConfig {
        average_ceiling: 100.0,
        ceilings,
    };

    let ranked = scoring::rank(run, &scoring_config);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].player, "Joe Root");
    assert!(ranked[0].score.final_score >= ranked[1].score.final_score);
    for r in &ranked {
        assert!((0.0..=10.0).contains(&r.score.final_score));
        assert_eq!(r.score.scores.len(), 3);
    }
}

// ===========================================================================
// Series prediction
// ===========================================================================

#[test]
fn series_model_trains_saves_and_predicts() {
    let out = scratch("series");
    let player = root(&out);
    let rows = merged(&player);
    let config = model_config(&out.join("models"));

    let model = SeriesModel::train(&player.name, &rows, &config).unwrap();
    model.save(Path::new(&config.model_dir)).unwrap();
    assert!(out.join("models").join("Joe Root_model.json").exists());
    assert!(out.join("models").join("Joe Root_label_encoder.json").exists());

    let valid = series::valid_oppositions(&rows);
    assert_eq!(valid, vec!["v australia", "v india", "v sri lanka"]);

    let request = SeriesRequest::new("V India", Venue::Home, 2, 5).unwrap();
    let prediction = model.predict(&rows, &request, 2025).unwrap();
    // Two innings per match
    assert_eq!(prediction.per_innings.len(), 4);
    for runs in &prediction.per_innings {
        assert!((0.0..=228.0).contains(runs), "prediction {runs} out of range");
    }
    let sum: f64 = prediction.per_innings.iter().sum();
    assert!((prediction.total as f64 - sum).abs() <= 0.5);

    let reloaded = SeriesModel::load(Path::new(&config.model_dir), &player.name).unwrap();
    let again = reloaded.predict(&rows, &request, 2025).unwrap();
    assert_eq!(again.total, prediction.total);
}

#[test]
fn series_prediction_rejects_unseen_opposition() {
    let out = scratch("series_unknown");
    let player = root(&out);
    let rows = merged(&player);
    let model = SeriesModel::train(&player.name, &rows, &model_config(&out)).unwrap();

    let request = SeriesRequest::new("v pakistan", Venue::Away, 1, 5).unwrap();
    match model.predict(&rows, &request, 2025) {
        Err(PredictError::UnknownOpposition { opposition, .. }) => {
            assert_eq!(opposition, "v pakistan");
        }
        other => panic!("expected UnknownOpposition, got {other:?}"),
    }
}

#[test]
fn loading_an_untrained_player_fails() {
    let out = scratch("series_missing");
    assert!(SeriesModel::load(&out, "Nobody").is_err());
}

// ===========================================================================
// Career prediction
// ===========================================================================

fn cleaned_snapshots(out: &Path) -> (Vec<career::CareerRecord>, Vec<career::CareerRecord>) {
    let paths = CareerPaths {
        past_raw: fixture("stats_2019.csv"),
        latest_raw: fixture("stats_2024.csv"),
        past_clean: out.join("D19_CLEAN.csv").display().to_string(),
        latest_clean: out.join("D24_CLEAN.csv").display().to_string(),
        past_year: 2019,
        latest_year: 2024,
    };
    let (past_rows, latest_rows) = clean_snapshot_files(&paths).unwrap();
    assert_eq!((past_rows, latest_rows), (12, 5));
    (
        career::load_clean(Path::new(&paths.past_clean)).unwrap(),
        career::load_clean(Path::new(&paths.latest_clean)).unwrap(),
    )
}

fn growth() -> GrowthConfig {
    GrowthConfig {
        innings_per_match: 2,
        not_out_every: 10,
        century_every: 7,
        half_century_every: 3,
        duck_every: 20,
    }
}

#[test]
fn career_snapshots_clean_with_normalized_countries() {
    let out = scratch("career_clean");
    let (past, latest) = cleaned_snapshots(&out);

    let kohli = career::find_player(&past, "v kohli").unwrap();
    assert_eq!(kohli.country.as_deref(), Some("IND"));
    assert_eq!(kohli.highest_score, 254);
    let tamim = career::find_player(&past, "Tamim Iqbal").unwrap();
    assert_eq!(tamim.country.as_deref(), Some("BAN"));
    assert!(career::find_player(&past, "Did Not Bat").is_none());
    assert!(career::find_player(&latest, "Unbatted").is_none());
    assert!(latest.iter().all(|r| r.current_player == 1));
}

#[test]
fn career_projection_for_a_player_in_both_snapshots() {
    let out = scratch("career_projection");
    let (past, latest) = cleaned_snapshots(&out);
    let model = CareerModel::train(&past, &model_config(&out)).unwrap();
    assert_eq!(model.cross_validation.scores.len(), 3);

    let lookup = CareerLookup::find(&past, &latest, "JE Root").unwrap();
    assert!(matches!(lookup, CareerLookup::Both { .. }));
    assert_eq!(lookup.base().innings, 169);

    let projection = project_career(&model, lookup, 300, 500, &growth()).unwrap();
    assert_eq!(projection.player, "JE Root");
    assert_eq!(projection.current_innings, 267);
    assert_eq!(projection.current_runs, 12402);
    assert_eq!(projection.expected_innings, 300);

    // Forest output is bounded by the training targets
    let min = past.iter().map(|r| r.runs).min().unwrap();
    let max = past.iter().map(|r| r.runs).max().unwrap();
    for predicted in [projection.predicted_current, projection.predicted_expected] {
        assert!((min..=max).contains(&predicted), "{predicted} outside {min}..={max}");
    }
}

#[test]
fn career_projection_validates_expected_innings() {
    let out = scratch("career_bounds");
    let (past, latest) = cleaned_snapshots(&out);
    let model = CareerModel::train(&past, &model_config(&out)).unwrap();

    let lookup = CareerLookup::find(&past, &latest, "JE Root").unwrap();
    assert!(matches!(
        project_career(&model, lookup, 150, 500, &growth()),
        Err(PredictError::ExpectedInningsTooFew { current: 169 })
    ));
    assert!(matches!(
        project_career(&model, lookup, 600, 500, &growth()),
        Err(PredictError::ExpectedInningsTooMany { max: 500 })
    ));
}

#[test]
fn newcomer_only_in_latest_snapshot_is_projected_from_latest() {
    let out = scratch("career_newcomer");
    let (past, latest) = cleaned_snapshots(&out);
    let model = CareerModel::train(&past, &model_config(&out)).unwrap();

    let lookup = CareerLookup::find(&past, &latest, "new cap").unwrap();
    assert!(matches!(lookup, CareerLookup::LatestOnly(_)));
    let projection = project_career(&model, lookup, 40, 500, &growth()).unwrap();
    assert_eq!(projection.current_innings, 3);
    assert_eq!(projection.expected_innings, 40);
}
