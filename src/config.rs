use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::model::ModelKey;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ensemble: EnsembleConfig,
    #[serde(default)]
    pub regime: RegimeConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Per-model minimum sample count before the model may vote or be
    /// trained on. Zero marks a rule-based model.
    #[serde(default = "default_model_table")]
    pub models: HashMap<String, u32>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnsembleConfig {
    /// Weight floor for an active rule-based model, so it can never be
    /// starved to near-zero influence.
    pub weight_min_rule_based: u32,
    /// Breakeven win probability; a model must clear this (at confidence) to
    /// earn any weight at all.
    pub baseline_prob: f64,
    /// Integer weight budget a perfect bound rescales to.
    pub weight_scale: u32,
    /// Wilson z parameter (~82% one-sided confidence at 1.34).
    pub wilson_z: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegimeConfig {
    /// Explore -> Exploit at this many recent wins.
    pub exploit_enter: u32,
    /// Exploit -> Explore below this many recent wins. Must be < enter so
    /// the band acts as hysteresis.
    pub exploit_exit: u32,
    /// How many of the most recent closed trades the win count is taken over.
    pub window: usize,
    /// Position-size multiplier while exploring.
    pub explore_risk_factor: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Processed closed trades kept after a trim pass. Unprocessed trades
    /// are never counted against this cap.
    pub keep_processed_trades: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            weight_min_rule_based: 5,
            baseline_prob: 0.52,
            weight_scale: 20,
            wilson_z: 1.34,
        }
    }
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            exploit_enter: 7,
            exploit_exit: 5,
            window: 10,
            explore_risk_factor: 0.8,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            keep_processed_trades: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ensemble: EnsembleConfig::default(),
            regime: RegimeConfig::default(),
            retention: RetentionConfig::default(),
            models: default_model_table(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_model_table() -> HashMap<String, u32> {
    HashMap::from([
        ("logistic".to_string(), 50),
        ("randomforest".to_string(), 50),
        ("decisiontree".to_string(), 20),
        ("naivebayes".to_string(), 30),
        ("original".to_string(), 0),
        ("momentum".to_string(), 0),
        ("meanreversion".to_string(), 0),
    ])
}

/// Typed view of the per-model minimum-samples table, built once at startup.
#[derive(Debug, Clone)]
pub struct ModelTable {
    min_samples: HashMap<ModelKey, u32>,
}

impl ModelTable {
    pub fn from_config(models: &HashMap<String, u32>) -> Result<Self> {
        let mut min_samples = HashMap::new();
        for (key_text, min) in models {
            let key: ModelKey = key_text
                .parse()
                .with_context(|| format!("models table has unrecognized key '{}'", key_text))?;
            if min_samples.insert(key, *min).is_some() {
                bail!("models table lists '{}' more than once", key);
            }
        }
        Ok(Self { min_samples })
    }

    /// `None` means the model is not configured at all; callers treat that
    /// the same as an unknown key (disabled, zero influence).
    pub fn min_samples(&self, key: ModelKey) -> Option<u32> {
        self.min_samples.get(&key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = ModelKey> + '_ {
        self.min_samples.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.min_samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.min_samples.is_empty()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/default.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.regime.exploit_exit >= self.regime.exploit_enter {
            bail!(
                "regime.exploit_exit ({}) must be below regime.exploit_enter ({})",
                self.regime.exploit_exit,
                self.regime.exploit_enter
            );
        }
        if self.regime.window == 0 {
            bail!("regime.window must be > 0");
        }
        if !(self.regime.explore_risk_factor > 0.0 && self.regime.explore_risk_factor <= 1.0) {
            bail!(
                "regime.explore_risk_factor ({}) must be in (0, 1]",
                self.regime.explore_risk_factor
            );
        }
        if !(self.ensemble.baseline_prob > 0.0 && self.ensemble.baseline_prob < 1.0) {
            bail!(
                "ensemble.baseline_prob ({}) must be in (0, 1)",
                self.ensemble.baseline_prob
            );
        }
        if self.ensemble.weight_scale == 0 {
            bail!("ensemble.weight_scale must be > 0");
        }
        if self.ensemble.wilson_z <= 0.0 {
            bail!("ensemble.wilson_z ({}) must be > 0", self.ensemble.wilson_z);
        }
        if self.models.is_empty() {
            bail!("models table must list at least one model");
        }
        ModelTable::from_config(&self.models)?;
        Ok(())
    }

    pub fn model_table(&self) -> Result<ModelTable> {
        ModelTable::from_config(&self.models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let toml_str = r#"
[ensemble]
weight_min_rule_based = 5
baseline_prob = 0.52
weight_scale = 20
wilson_z = 1.34

[regime]
exploit_enter = 7
exploit_exit = 5
window = 10
explore_risk_factor = 0.8

[retention]
keep_processed_trades = 10

[models]
logistic = 50
decisiontree = 20
momentum = 0

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();
        assert_eq!(config.ensemble.weight_min_rule_based, 5);
        assert_eq!(config.regime.exploit_enter, 7);
        assert_eq!(config.retention.keep_processed_trades, 10);
        assert_eq!(config.models["logistic"], 50);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_toml_falls_back_to_built_in_defaults() {
        let config: Config = toml::from_str("").unwrap();
        config.validate().unwrap();
        assert_eq!(config.ensemble.weight_min_rule_based, 5);
        assert!((config.ensemble.baseline_prob - 0.52).abs() < f64::EPSILON);
        assert_eq!(config.regime.exploit_enter, 7);
        assert_eq!(config.regime.exploit_exit, 5);
        assert_eq!(config.models["randomforest"], 50);
        assert_eq!(config.models["meanreversion"], 0);
    }

    #[test]
    fn load_from_reads_and_validates_file() {
        let path = std::env::temp_dir().join(format!(
            "ensemble-quant-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[regime]\nexploit_enter = 9\nexploit_exit = 6\nwindow = 12\nexplore_risk_factor = 0.5\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.regime.exploit_enter, 9);
        assert_eq!(config.regime.window, 12);
        // Untouched sections keep their defaults.
        assert_eq!(config.retention.keep_processed_trades, 10);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn validate_rejects_inverted_regime_band() {
        let mut config = Config::default();
        config.regime.exploit_exit = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_model_key() {
        let mut config = Config::default();
        config.models.insert("xgboost".to_string(), 40);
        assert!(config.validate().is_err());
    }

    #[test]
    fn model_table_resolves_typed_keys() {
        let table = Config::default().model_table().unwrap();
        assert_eq!(table.min_samples(ModelKey::Logistic), Some(50));
        assert_eq!(table.min_samples(ModelKey::Momentum), Some(0));
        assert_eq!(table.len(), 7);
    }
}
