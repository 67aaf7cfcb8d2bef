// Configuration loading and parsing (cohort.toml, settings.toml).

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::analysis::metrics::Metric;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub cohort: CohortConfig,
    pub scoring: ScoringConfig,
    pub model: ModelConfig,
    pub prediction: PredictionConfig,
    pub growth: GrowthConfig,
    pub career: CareerPaths,
}

impl Config {
    /// Look up a cohort player by display name (case-insensitive).
    pub fn player(&self, name: &str) -> Option<&PlayerEntry> {
        self.cohort
            .players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }
}

// ---------------------------------------------------------------------------
// cohort.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[cohort]` table in cohort.toml.
#[derive(Debug, Clone, Deserialize)]
struct CohortFile {
    cohort: CohortConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohortConfig {
    pub name: String,
    pub players: Vec<PlayerEntry>,
}

/// One player of the fixed comparison cohort and where their data lives.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerEntry {
    /// Display name used in menus, rankings and model file names.
    pub name: String,
    /// Name as it appears in the raw scorecard source (e.g. "JE Root").
    pub code: String,
    pub home_nation: String,
    pub home_csv: String,
    pub away_csv: String,
    pub merged_csv: String,
    /// Chart colour name ("blue", "red", ...). Unknown names render gray.
    #[serde(default = "default_colour")]
    pub colour: String,
}

fn default_colour() -> String {
    "gray".into()
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire settings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    scoring: ScoringSection,
    model: ModelConfig,
    prediction: PredictionConfig,
    growth: GrowthConfig,
    career: CareerPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct ScoringSection {
    average_ceiling: f64,
    #[serde(default)]
    ceilings: HashMap<String, f64>,
}

/// Normalization settings resolved against the metric catalog.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Ceiling applied to every average-type metric.
    pub average_ceiling: f64,
    /// Fixed ceilings for the remaining metrics. Metrics absent here are
    /// normalized against the best value observed in the run.
    pub ceilings: HashMap<Metric, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub model_dir: String,
    pub n_estimators: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub cv_folds: usize,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
}

fn default_min_samples_split() -> usize {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    /// Season the series projection is made for.
    pub season_year: i32,
    pub max_series_matches: u32,
    pub max_expected_innings: u32,
}

/// Fixed linear ratios used to grow a career record over new innings.
/// Each field is "one event every N additional innings".
#[derive(Debug, Clone, Deserialize)]
pub struct GrowthConfig {
    pub innings_per_match: u32,
    pub not_out_every: u32,
    pub century_every: u32,
    pub half_century_every: u32,
    pub duck_every: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareerPaths {
    pub past_raw: String,
    pub latest_raw: String,
    pub past_clean: String,
    pub latest_clean: String,
    pub past_year: i32,
    pub latest_year: i32,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/cohort.toml` and
/// `config/settings.toml`, relative to the given `base_dir`.
///
/// This does not auto-copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let cohort_path = config_dir.join(COHORT_FILE);
    let cohort_text = read_file(&cohort_path)?;
    let cohort_file: CohortFile =
        toml::from_str(&cohort_text).map_err(|e| ConfigError::ParseError {
            path: cohort_path.clone(),
            source: e,
        })?;

    let settings_path = config_dir.join(SETTINGS_FILE);
    let settings_text = read_file(&settings_path)?;
    let settings: SettingsFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    let scoring = resolve_scoring(settings.scoring)?;

    let config = Config {
        cohort: cohort_file.cohort,
        scoring,
        model: settings.model,
        prediction: settings.prediction,
        growth: settings.growth,
        career: settings.career,
    };

    validate(&config)?;

    Ok(config)
}

/// The cohort and settings files, read from `config/` and shipped in
/// `defaults/`.
pub const COHORT_FILE: &str = "cohort.toml";
pub const SETTINGS_FILE: &str = "settings.toml";

/// Fill in `config/` from `defaults/` for the cohort and settings files.
///
/// Files already present in `config/` are left untouched. Returns the paths
/// written, cohort first. A file found in neither directory is an error.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    let shipped_dir = base_dir.join("defaults");

    let mut written = Vec::new();
    for name in [COHORT_FILE, SETTINGS_FILE] {
        let target = config_dir.join(name);
        if target.is_file() {
            continue;
        }
        let shipped = shipped_dir.join(name);
        if !shipped.is_file() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "config/{name} is missing and {} has no shipped copy; \
                     run from the strikerate project root",
                    shipped_dir.display()
                ),
            });
        }
        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot create {}: {e}", config_dir.display()),
        })?;
        std::fs::copy(&shipped, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot install default {name}: {e}"),
        })?;
        info!(file = name, "installed default config");
        written.push(target);
    }
    Ok(written)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Map the string-keyed ceiling table onto the metric catalog.
fn resolve_scoring(section: ScoringSection) -> Result<ScoringConfig, ConfigError> {
    let mut ceilings = HashMap::new();
    for (key, value) in section.ceilings {
        let metric = Metric::from_key(&key).ok_or_else(|| ConfigError::ValidationError {
            field: format!("scoring.ceilings.{key}"),
            message: "unknown metric key".into(),
        })?;
        ceilings.insert(metric, value);
    }
    Ok(ScoringConfig {
        average_ceiling: section.average_ceiling,
        ceilings,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.cohort.players.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "cohort.players".into(),
            message: "at least one player is required".into(),
        });
    }

    let mut seen = HashSet::new();
    for player in &config.cohort.players {
        if !seen.insert(player.name.to_lowercase()) {
            return Err(ConfigError::ValidationError {
                field: "cohort.players".into(),
                message: format!("duplicate player name '{}'", player.name),
            });
        }
    }

    if config.scoring.average_ceiling <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "scoring.average_ceiling".into(),
            message: format!("must be > 0, got {}", config.scoring.average_ceiling),
        });
    }

    for (metric, val) in &config.scoring.ceilings {
        if *val <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: format!("scoring.ceilings.{}", metric.key()),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    let model = &config.model;
    if model.n_estimators == 0 {
        return Err(ConfigError::ValidationError {
            field: "model.n_estimators".into(),
            message: "must be > 0".into(),
        });
    }
    if !(model.test_fraction > 0.0 && model.test_fraction < 1.0) {
        return Err(ConfigError::ValidationError {
            field: "model.test_fraction".into(),
            message: format!("must be strictly between 0.0 and 1.0, got {}", model.test_fraction),
        });
    }
    if model.cv_folds < 2 {
        return Err(ConfigError::ValidationError {
            field: "model.cv_folds".into(),
            message: format!("must be >= 2, got {}", model.cv_folds),
        });
    }
    if model.min_samples_split < 2 {
        return Err(ConfigError::ValidationError {
            field: "model.min_samples_split".into(),
            message: format!("must be >= 2, got {}", model.min_samples_split),
        });
    }

    if config.prediction.max_series_matches == 0 {
        return Err(ConfigError::ValidationError {
            field: "prediction.max_series_matches".into(),
            message: "must be > 0".into(),
        });
    }

    let g = &config.growth;
    let growth_fields: &[(&str, u32)] = &[
        ("growth.innings_per_match", g.innings_per_match),
        ("growth.not_out_every", g.not_out_every),
        ("growth.century_every", g.century_every),
        ("growth.half_century_every", g.half_century_every),
        ("growth.duck_every", g.duck_every),
    ];
    for (name, val) in growth_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if config.career.past_year >= config.career.latest_year {
        return Err(ConfigError::ValidationError {
            field: "career.past_year".into(),
            message: format!(
                "must be earlier than career.latest_year ({} >= {})",
                config.career.past_year, config.career.latest_year
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
