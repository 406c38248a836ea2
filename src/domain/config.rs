use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    patterns::DEFAULT_REQUIREMENT_PREFIX,
    splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE},
};

/// Configuration for chunking.
///
/// This struct holds the tunable parameters of the chunker: the size budget
/// of a chunk, the overlap between split pieces, and the code prefix which
/// identifies requirement headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The maximum length of a chunk's content, in characters.
    ///
    /// Sections longer than this are split.
    max_chunk_size: usize,

    /// The number of characters shared between consecutive pieces of a split
    /// section.
    chunk_overlap: usize,

    /// The prefix of requirement codes.
    ///
    /// For example 'PSE' matches headers such as 'PSE1.1 – User
    /// Registration'.
    requirement_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            requirement_prefix: default_requirement_prefix(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the maximum chunk size, in characters.
    #[must_use]
    pub const fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Returns the overlap between split pieces, in characters.
    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Returns the requirement code prefix.
    #[must_use]
    pub fn requirement_prefix(&self) -> &str {
        &self.requirement_prefix
    }

    /// Sets the maximum chunk size.
    pub const fn set_max_chunk_size(&mut self, value: usize) {
        self.max_chunk_size = value;
    }

    /// Sets the overlap between split pieces.
    pub const fn set_chunk_overlap(&mut self, value: usize) {
        self.chunk_overlap = value;
    }

    /// Sets the requirement code prefix.
    pub fn set_requirement_prefix(&mut self, value: String) {
        self.requirement_prefix = value;
    }
}

const fn default_max_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

const fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

fn default_requirement_prefix() -> String {
    DEFAULT_REQUIREMENT_PREFIX.to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        /// The maximum length of a chunk's content, in characters.
        #[serde(default = "default_max_chunk_size")]
        max_chunk_size: usize,

        #[serde(default = "default_chunk_overlap")]
        chunk_overlap: usize,

        #[serde(default = "default_requirement_prefix")]
        requirement_prefix: String,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                max_chunk_size,
                chunk_overlap,
                requirement_prefix,
            } => Self {
                max_chunk_size,
                chunk_overlap,
                requirement_prefix,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            max_chunk_size: config.max_chunk_size,
            chunk_overlap: config.chunk_overlap,
            requirement_prefix: config.requirement_prefix,
        }
    }
}
