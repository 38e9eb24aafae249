//! TOML configuration for the command-line tool.

use cloudclean_filters::{
    CentroidDistanceFilter, DensityClusterFilter, RadiusOutlierFilter, StatisticalOutlierFilter,
};
use cloudclean_io::PlyEncoding;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Encoding of written PLY files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    Ascii,
    #[default]
    Binary,
    BinaryBigEndian,
}

impl From<OutputEncoding> for PlyEncoding {
    fn from(e: OutputEncoding) -> Self {
        match e {
            OutputEncoding::Ascii => PlyEncoding::Ascii,
            OutputEncoding::Binary => PlyEncoding::BinaryLittleEndian,
            OutputEncoding::BinaryBigEndian => PlyEncoding::BinaryBigEndian,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub encoding: OutputEncoding,
}

/// Full configuration, one table per filter. Missing tables and keys keep
/// their defaults.
///
/// ```toml
/// [output]
/// encoding = "ascii"
///
/// [statistical]
/// k_neighbors = 30
///
/// [clustering]
/// eps = 0.05
/// min_samples = 15
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    pub output: OutputSection,
    pub statistical: StatisticalOutlierFilter,
    pub radius: RadiusOutlierFilter,
    pub centroid: CentroidDistanceFilter,
    pub clustering: DensityClusterFilter,
}

impl CleanConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse from TOML string
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn encoding(&self) -> PlyEncoding {
        self.output.encoding.into()
    }
}
