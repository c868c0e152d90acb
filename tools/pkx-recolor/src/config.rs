use std::fs;
use std::path::Path;

use recolor::ScaleStrategy;
use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_ASSET_PREFIX: &str = "pkx_";
pub const DEFAULT_MODEL_EXTENSION: &str = "pkx";
pub const DEFAULT_TEXTURE_EXTENSION: &str = "png";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Only sub-folders whose name starts with this prefix are treated as assets.
    pub asset_prefix: String,
    pub model_extension: String,
    pub texture_extension: String,
    pub strategy: ScaleStrategy,
    /// Worker threads; 0 lets rayon decide.
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_prefix: String::from(DEFAULT_ASSET_PREFIX),
            model_extension: String::from(DEFAULT_MODEL_EXTENSION),
            texture_extension: String::from(DEFAULT_TEXTURE_EXTENSION),
            strategy: ScaleStrategy::default(),
            jobs: 0,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(Error::io(path))?;
        Self::parse(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
