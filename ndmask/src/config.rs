/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Traversal configuration.
//!
//! Only the randomised cursor kinds are configurable: the seed of
//! their generator and the number of samples drawn with
//! replacement. Configuration is layered:
//!
//! 1. [`TraversalConfig::default`],
//! 2. optionally a YAML document ([`TraversalConfig::from_yaml_str`],
//!    [`TraversalConfig::from_yaml_file`]),
//! 3. environment overrides ([`TraversalConfig::apply_env`]):
//!    `NDMASK_RANDOM_SEED` and `NDMASK_RANDOM_SAMPLES`.
//!
//! Cursors read the process-wide configuration returned by
//! [`global`], which is initialised from the environment on first
//! use unless [`init`] installed one earlier. Every cursor bound in
//! the process therefore replays the same random sequence for the
//! same region.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable overriding [`TraversalConfig::random_seed`].
pub const RANDOM_SEED_ENV: &str = "NDMASK_RANDOM_SEED";

/// Environment variable overriding [`TraversalConfig::random_samples`].
pub const RANDOM_SAMPLES_ENV: &str = "NDMASK_RANDOM_SAMPLES";

const DEFAULT_RANDOM_SEED: u64 = 0x6e64_6d61_736b;

/// The type of error for configuration loading.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value `{value}` for {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("global traversal configuration already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Settings consulted when cursors are bound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Seed of the generator behind the random cursor kinds.
    pub random_seed: u64,
    /// Number of positions drawn by `RandomSample`; `None` draws as
    /// many as the region holds.
    pub random_samples: Option<usize>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            random_seed: DEFAULT_RANDOM_SEED,
            random_samples: None,
        }
    }
}

impl TraversalConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::from_yaml_str(&fs::read_to_string(path)?)?;
        tracing::debug!(path = %path.display(), ?config, "loaded traversal config");
        Ok(config)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Override fields from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(RANDOM_SEED_ENV) {
            self.random_seed = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: RANDOM_SEED_ENV,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(RANDOM_SAMPLES_ENV) {
            let samples = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: RANDOM_SAMPLES_ENV,
                value: value.clone(),
            })?;
            self.random_samples = Some(samples);
        }
        Ok(())
    }
}

static GLOBAL: OnceLock<TraversalConfig> = OnceLock::new();

/// The process-wide configuration. On first use this is loaded from
/// the environment; malformed overrides are logged and ignored.
pub fn global() -> &'static TraversalConfig {
    GLOBAL.get_or_init(|| {
        TraversalConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring traversal config from environment");
            TraversalConfig::default()
        })
    })
}

/// Install the process-wide configuration. Fails if [`global`] was
/// already read or [`init`] already called.
pub fn init(config: TraversalConfig) -> Result<(), ConfigError> {
    GLOBAL
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}
