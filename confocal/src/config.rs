use std::path::Path;

use serde::{Deserialize, Serialize};

/// Percentile passed to the threshold search when normalizing the mask channel.
///
/// Already expressed in percent (0.01 means 0.01%); the threshold search divides by 100 once more.
pub const DEFAULT_PERCENTILE: f64 = 0.01;

/// Reader settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub percentile: f64,
    /// Extensions matched when the reader path is a directory. Empty uses the backend's list.
    pub extensions: Vec<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_PERCENTILE,
            extensions: Vec::new(),
        }
    }
}

impl ReaderConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        common::read_config_file(path)
    }
}
