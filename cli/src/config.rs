// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use tokio::fs;

use lunarcal_core::{APP_NAME, Config as CoreConfig, get_config_dir};

const LUNARCAL_CONFIG_ENV: &str = "LUNARCAL_CONFIG";

/// Load the configuration.
///
/// The file is taken from `--config`, then `$LUNARCAL_CONFIG`, then the default location.
/// Only a missing default file falls back to the built-in defaults.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<CoreConfig, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(LUNARCAL_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        let path = get_config_dir()?.join(APP_NAME).join("config.toml");
        if !fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "no config file found, using defaults");
            let mut config = CoreConfig::default();
            config.normalize()?;
            return Ok(config);
        }
        path
    };

    tracing::debug!(path = %path.display(), "reading config file");
    let mut config = fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse::<ConfigRaw>()
        .map_err(|e| format!("Invalid config file at {}: {}", path.display(), e))?
        .0;

    config.normalize()?;
    Ok(config)
}

#[derive(Debug)]
struct ConfigRaw(CoreConfig);

impl FromStr for ConfigRaw {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(toml::from_str(s)?))
    }
}
