use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::PathBuf,
};

use crate::{error::MarginaliaError, outline::container::DEFAULT_MAX_DEPTH, style::StylePalette};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Depth of the collapsed outline view notes and flashcards attach to.
    pub max_depth: usize,
    /// Label given to items created by outline edits.
    pub new_item_label: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        OutlineConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            new_item_label: "New Chapter".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginaliaConfig {
    pub outline: OutlineConfig,
    pub palette: StylePalette,
}

pub trait ConfigProvider {
    fn load(&self) -> Result<MarginaliaConfig, MarginaliaError>;
    fn save(&self, config: &MarginaliaConfig) -> Result<(), MarginaliaError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn load(&self) -> Result<MarginaliaConfig, MarginaliaError> {
        tracing::debug!("Attempting to read config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(MarginaliaConfig::default());
        }
        let content = read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn save(&self, config: &MarginaliaConfig) -> Result<(), MarginaliaError> {
        tracing::debug!("Attempting to write config to: {:?}", &self.path);
        let toml_string = toml::to_string(config)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}
