use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{Chain, Result, ScoreError};
use crate::scoring::{HealthWeights, RiskWeights};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub scoring: ScoringSettings,
    pub source: SourceSettings,
    pub chains: ChainSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringSettings {
    pub risk_weights: RiskWeights,
    pub health_weights: HealthWeights,
}

/// Cache and throttle settings for the upstream data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    pub cache_ttl_seconds: u64,
    pub max_cache_entries: usize,
    pub min_request_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    pub supported_chain_ids: Vec<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "DeFi Scorer".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
            },
            scoring: ScoringSettings::default(),
            source: SourceSettings {
                cache_ttl_seconds: 30,
                max_cache_entries: 1000,
                min_request_interval_ms: 100,
            },
            chains: ChainSettings {
                supported_chain_ids: Chain::ALL.iter().map(Chain::chain_id).collect(),
            },
        }
    }
}

impl Settings {
    pub fn new() -> std::result::Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("DEFI_SCORE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.risk_weights.validate()?;
        self.scoring.health_weights.validate()?;

        if self.chains.supported_chain_ids.is_empty() {
            return Err(ScoreError::Config("At least one chain must be supported".to_string()));
        }
        for id in &self.chains.supported_chain_ids {
            Chain::from_id(*id)
                .map_err(|_| ScoreError::Config(format!("No known chain with ID {}", id)))?;
        }

        if self.source.max_cache_entries == 0 {
            return Err(ScoreError::Config("max_cache_entries must be positive".to_string()));
        }

        Ok(())
    }

    /// Resolves a chain ID against the configured allow-list.
    pub fn resolve_chain(&self, chain_id: u64) -> Result<Chain> {
        if !self.chains.supported_chain_ids.contains(&chain_id) {
            return Err(ScoreError::UnsupportedChain(chain_id));
        }
        Chain::from_id(chain_id)
    }
}
