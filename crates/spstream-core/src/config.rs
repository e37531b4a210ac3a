// Configuration loading and parsing (league.toml, analysis.toml).

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

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

/// A rejected analysis setting. Raised before any analysis work starts.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid setting `{field}`: {message}")]
pub struct SettingsError {
    pub field: String,
    pub message: String,
}

impl From<SettingsError> for ConfigError {
    fn from(e: SettingsError) -> Self {
        ConfigError::ValidationError {
            field: format!("analysis.{}", e.field),
            message: e.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub analysis: AnalysisSettings,
    pub cache: CacheConfig,
    pub sources: SourcePaths,
    pub mlb: MlbConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// The manager's team key; also the team half of every cache key.
    pub team_key: String,
    /// First day of league week 1.
    pub season_start: NaiveDate,
}

// ---------------------------------------------------------------------------
// analysis.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire analysis.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AnalysisFile {
    analysis: AnalysisSettings,
    cache: CacheConfig,
    sources: SourcePaths,
    mlb: MlbConfig,
}

/// User-facing knobs for one analysis run.
///
/// `min_ownership_pct` is a ceiling for waiver players (0 shows everyone);
/// `low_ownership_pct` only decides which recommendation note a pitcher gets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub target_weekdays: Vec<Weekday>,
    pub min_ownership_pct: f64,
    pub low_ownership_pct: f64,
    pub detect_second_starts: bool,
    pub include_waiver: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            target_weekdays: vec![Weekday::Mon, Weekday::Tue],
            min_ownership_pct: 50.0,
            low_ownership_pct: 25.0,
            detect_second_starts: true,
            include_waiver: true,
        }
    }
}

impl AnalysisSettings {
    /// Reject settings the analysis engine cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.target_weekdays.is_empty() {
            return Err(SettingsError {
                field: "target_weekdays".into(),
                message: "must name at least one weekday".into(),
            });
        }

        let pct_fields: &[(&str, f64)] = &[
            ("min_ownership_pct", self.min_ownership_pct),
            ("low_ownership_pct", self.low_ownership_pct),
        ];
        for (name, val) in pct_fields {
            if !val.is_finite() || !(0.0..=100.0).contains(val) {
                return Err(SettingsError {
                    field: name.to_string(),
                    message: format!("must be between 0 and 100 inclusive, got {val}"),
                });
            }
        }

        Ok(())
    }

    /// Target weekdays deduplicated and ordered Monday-first.
    pub fn normalized_weekdays(&self) -> Vec<Weekday> {
        let mut days = self.target_weekdays.clone();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        days
    }

    /// Stable serialized form used to key cached results. Two settings that
    /// differ only in weekday order or duplicates share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let canonical = AnalysisSettings {
            target_weekdays: self.normalized_weekdays(),
            ..self.clone()
        };
        serde_json::to_string(&canonical).unwrap_or_else(|_| format!("{canonical:?}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Where the snapshot collaborators read from.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePaths {
    pub roster: String,
    pub ownership: String,
    /// Saved schedule JSON. When absent the MLB Stats API is queried.
    #[serde(default)]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MlbConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/analysis.toml`, both relative to the given `base_dir`.
///
/// This does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let analysis_path = config_dir.join("analysis.toml");
    let analysis_text = read_file(&analysis_path)?;
    let analysis_file: AnalysisFile =
        toml::from_str(&analysis_text).map_err(|e| ConfigError::ParseError {
            path: analysis_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        analysis: analysis_file.analysis,
        cache: analysis_file.cache,
        sources: analysis_file.sources,
        mlb: analysis_file.mlb,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
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

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.team_key.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.team_key".into(),
            message: "must not be empty".into(),
        });
    }

    config.analysis.validate()?;

    if config.cache.ttl_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "cache.ttl_secs".into(),
            message: "must be > 0".into(),
        });
    }

    if config.mlb.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "mlb.timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    if config.sources.roster.trim().is_empty() || config.sources.ownership.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "sources".into(),
            message: "roster and ownership paths must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DEFAULT_LEAGUE: &str = include_str!("../../../defaults/league.toml");
    const DEFAULT_ANALYSIS: &str = include_str!("../../../defaults/analysis.toml");

    /// Fresh scratch directory with `config/` populated from the given texts.
    fn scratch(name: &str, league: Option<&str>, analysis: Option<&str>) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        let config_dir = tmp.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        if let Some(text) = league {
            fs::write(config_dir.join("league.toml"), text).unwrap();
        }
        if let Some(text) = analysis {
            fs::write(config_dir.join("analysis.toml"), text).unwrap();
        }
        tmp
    }

    fn expect_validation_field(err: ConfigError, expected: &str) {
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_valid_config_from_default_files() {
        let tmp = scratch("spstream_config_defaults", Some(DEFAULT_LEAGUE), Some(DEFAULT_ANALYSIS));
        let config = load_config_from(&tmp).expect("should load default config");

        assert_eq!(config.league.name, "Sunday Night Streamers");
        assert_eq!(config.league.team_key, "458.l.135626.t.6");
        assert_eq!(
            config.league.season_start,
            NaiveDate::from_ymd_opt(2025, 3, 24).unwrap()
        );

        assert_eq!(config.analysis.target_weekdays, vec![Weekday::Mon, Weekday::Tue]);
        assert!((config.analysis.min_ownership_pct - 50.0).abs() < f64::EPSILON);
        assert!((config.analysis.low_ownership_pct - 25.0).abs() < f64::EPSILON);
        assert!(config.analysis.detect_second_starts);
        assert!(config.analysis.include_waiver);

        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(config.sources.roster, "data/roster.csv");
        assert_eq!(config.sources.ownership, "data/ownership.csv");
        assert!(config.sources.schedule.is_none());
        assert_eq!(config.mlb.base_url, "https://statsapi.mlb.com/api/v1");
        assert_eq!(config.mlb.timeout_secs, 10);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn long_weekday_names_are_accepted() {
        let analysis = DEFAULT_ANALYSIS.replace(
            r#"target_weekdays = ["Mon", "Tue"]"#,
            r#"target_weekdays = ["Monday", "thursday"]"#,
        );
        let tmp = scratch("spstream_config_long_days", Some(DEFAULT_LEAGUE), Some(&analysis));
        let config = load_config_from(&tmp).expect("should accept long weekday names");
        assert_eq!(config.analysis.target_weekdays, vec![Weekday::Mon, Weekday::Thu]);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_target_weekdays() {
        let analysis = DEFAULT_ANALYSIS.replace(
            r#"target_weekdays = ["Mon", "Tue"]"#,
            "target_weekdays = []",
        );
        let tmp = scratch("spstream_config_no_days", Some(DEFAULT_LEAGUE), Some(&analysis));
        let err = load_config_from(&tmp).unwrap_err();
        expect_validation_field(err, "analysis.target_weekdays");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_ownership_threshold_above_100() {
        let analysis =
            DEFAULT_ANALYSIS.replace("min_ownership_pct = 50.0", "min_ownership_pct = 150.0");
        let tmp = scratch("spstream_config_pct_high", Some(DEFAULT_LEAGUE), Some(&analysis));
        let err = load_config_from(&tmp).unwrap_err();
        expect_validation_field(err, "analysis.min_ownership_pct");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_negative_low_ownership_cutoff() {
        let analysis =
            DEFAULT_ANALYSIS.replace("low_ownership_pct = 25.0", "low_ownership_pct = -1.0");
        let tmp = scratch("spstream_config_low_neg", Some(DEFAULT_LEAGUE), Some(&analysis));
        let err = load_config_from(&tmp).unwrap_err();
        expect_validation_field(err, "analysis.low_ownership_pct");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_ttl() {
        let analysis = DEFAULT_ANALYSIS.replace("ttl_secs = 3600", "ttl_secs = 0");
        let tmp = scratch("spstream_config_zero_ttl", Some(DEFAULT_LEAGUE), Some(&analysis));
        let err = load_config_from(&tmp).unwrap_err();
        expect_validation_field(err, "cache.ttl_secs");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_blank_team_key() {
        let league = DEFAULT_LEAGUE.replace(r#"team_key = "458.l.135626.t.6""#, r#"team_key = " ""#);
        let tmp = scratch("spstream_config_blank_team", Some(&league), Some(DEFAULT_ANALYSIS));
        let err = load_config_from(&tmp).unwrap_err();
        expect_validation_field(err, "league.team_key");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_league_toml() {
        let tmp = scratch("spstream_config_missing_league", None, Some(DEFAULT_ANALYSIS));
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = scratch(
            "spstream_config_invalid_toml",
            Some(DEFAULT_LEAGUE),
            Some("this is not valid [[[ toml"),
        );
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("analysis.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_and_skips_existing() {
        let tmp = std::env::temp_dir().join("spstream_config_ensure");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();

        fs::write(defaults_dir.join("league.toml"), DEFAULT_LEAGUE).unwrap();
        fs::write(defaults_dir.join("analysis.toml"), DEFAULT_ANALYSIS).unwrap();
        fs::write(defaults_dir.join("notes.toml.example"), "# nothing\n").unwrap();
        fs::write(config_dir.join("league.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(copied[0].ends_with("analysis.toml"));
        assert!(!config_dir.join("notes.toml.example").exists());
        assert_eq!(
            fs::read_to_string(config_dir.join("league.toml")).unwrap(),
            "# custom\n"
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("spstream_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    // -- AnalysisSettings --

    #[test]
    fn default_settings_are_valid() {
        assert!(AnalysisSettings::default().validate().is_ok());
    }

    #[test]
    fn settings_reject_nan_threshold() {
        let settings = AnalysisSettings {
            min_ownership_pct: f64::NAN,
            ..AnalysisSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(err.field, "min_ownership_pct");
    }

    #[test]
    fn settings_accept_inclusive_bounds() {
        let settings = AnalysisSettings {
            min_ownership_pct: 100.0,
            low_ownership_pct: 0.0,
            ..AnalysisSettings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn fingerprint_ignores_weekday_order_and_duplicates() {
        let a = AnalysisSettings {
            target_weekdays: vec![Weekday::Tue, Weekday::Mon, Weekday::Tue],
            ..AnalysisSettings::default()
        };
        let b = AnalysisSettings::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_differs_when_filters_differ() {
        let a = AnalysisSettings::default();
        let b = AnalysisSettings {
            include_waiver: false,
            ..AnalysisSettings::default()
        };
        let c = AnalysisSettings {
            min_ownership_pct: 30.0,
            ..AnalysisSettings::default()
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
