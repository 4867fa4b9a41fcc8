use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::NamePolicy;
use crate::error::StatsError;
use crate::parser::ColumnLayout;
use crate::stats::{DEFAULT_IQR_MULTIPLIER, DEFAULT_MIN_FILTER_SIZE, FilterSettings};
use crate::writer::DEFAULT_PRECISION;

pub const MAX_PRECISION: usize = 12;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub precision: Option<usize>,
    #[serde(default)]
    pub iqr_multiplier: Option<f64>,
    #[serde(default)]
    pub min_filter_size: Option<usize>,
    #[serde(default)]
    pub name_policy: Option<NamePolicy>,
    #[serde(default)]
    pub columns: Option<ColumnLayout>,
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub precision: Option<usize>,
    pub iqr_multiplier: Option<f64>,
    pub min_filter_size: Option<usize>,
    pub name_policy: Option<NamePolicy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub precision: usize,
    pub filter: FilterSettings,
    pub name_policy: NamePolicy,
    pub columns: ColumnLayout,
    /// Set when columns were pinned explicitly; header lines are then ignored.
    pub fixed_columns: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            precision: DEFAULT_PRECISION,
            filter: FilterSettings::default(),
            name_policy: NamePolicy::default(),
            columns: ColumnLayout::default(),
            fixed_columns: false,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, StatsError> {
        let config = match path {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => Config::default(),
        };
        Self::resolve_config(config, overrides)
    }

    fn load(path: PathBuf) -> Result<Config, StatsError> {
        let content = fs::read_to_string(&path).map_err(|_| StatsError::ConfigRead(path.clone()))?;
        serde_json::from_str(&content).map_err(|err| StatsError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, StatsError> {
        let precision = overrides
            .precision
            .or(config.precision)
            .unwrap_or(DEFAULT_PRECISION);
        if precision > MAX_PRECISION {
            return Err(StatsError::InvalidConfig(format!(
                "precision must be at most {MAX_PRECISION}, got {precision}"
            )));
        }

        let multiplier = overrides
            .iqr_multiplier
            .or(config.iqr_multiplier)
            .unwrap_or(DEFAULT_IQR_MULTIPLIER);
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(StatsError::InvalidConfig(format!(
                "iqr_multiplier must be a non-negative number, got {multiplier}"
            )));
        }

        let min_size = overrides
            .min_filter_size
            .or(config.min_filter_size)
            .unwrap_or(DEFAULT_MIN_FILTER_SIZE);
        if min_size == 0 {
            return Err(StatsError::InvalidConfig(
                "min_filter_size must be at least 1".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            precision,
            filter: FilterSettings {
                multiplier,
                min_size,
            },
            name_policy: overrides
                .name_policy
                .or(config.name_policy)
                .unwrap_or_default(),
            fixed_columns: config.columns.is_some(),
            columns: config.columns.unwrap_or_default(),
        })
    }
}
