use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use txlog_state::StateConfig;
use txlog_storage::{RenameStrategy, StoreConfig};

use crate::cli::Cli;

/// Contents of the `--config` file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub state: StateConfig,
}

impl CliConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// The config file (if any) with command-line overrides applied.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(root) = &cli.root {
            let rename_strategy = match &config.store {
                StoreConfig::Local { rename_strategy, .. } => *rename_strategy,
                StoreConfig::Memory => RenameStrategy::default(),
            };
            config.store = StoreConfig::Local {
                root: root.clone(),
                rename_strategy,
            };
        }
        if let Some(path) = &cli.state {
            config.state = StateConfig::File { path: path.clone() };
        }
        Ok(config)
    }
}
