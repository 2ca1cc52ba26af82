//! Configuration for the Tomasulo core simulator.
//!
//! This module defines the configuration structures used to parameterize a run.
//! It provides:
//! 1. **Defaults:** Baseline run constants (memory size, start PC, cycle cap).
//! 2. **Structures:** Hierarchical config for general, memory, and pipeline settings.
//! 3. **Enums:** The static branch prediction policy.
//!
//! Configuration is read from JSON (`sim --config run.json`) or taken from
//! `Config::default()`. Command-line flags override individual fields.

use serde::Deserialize;

use crate::common::constants::DEFAULT_MEMORY_SIZE;

/// Default configuration constants for the simulator.
mod defaults {
    /// Program counter the first fetch uses.
    pub const START_PC: u32 = 0;

    /// Cycle cap; 0 means run until the halt sentinel commits.
    pub const MAX_CYCLES: u64 = 0;

    /// Seed of the evaluation-order shuffle.
    ///
    /// Any non-zero value works; xorshift maps 0 to itself forever.
    pub const SHUFFLE_SEED: u64 = 0x2545_F491_4F6C_DD1D;
}

/// Static guess the CSU makes for a conditional branch at issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPrediction {
    /// Always fetch the fall-through instruction.
    NotTaken,
    /// Always fetch the branch target.
    Taken,
    /// Backward branches are taken, forward branches are not (loop heuristic).
    #[default]
    BackwardTaken,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use tomasulo_core::config::{BranchPrediction, Config};
///
/// let config = Config::default();
/// assert_eq!(config.general.max_cycles, 0);
/// assert_eq!(config.memory.size_bytes, 1 << 20);
/// assert_eq!(config.pipeline.branch_prediction, BranchPrediction::BackwardTaken);
/// ```
///
/// Deserializing from JSON, with omitted fields taking their defaults:
///
/// ```
/// use tomasulo_core::config::{BranchPrediction, Config};
///
/// let json = r#"{
///     "general": { "max_cycles": 5000, "shuffle": true },
///     "pipeline": { "branch_prediction": "NotTaken" }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.general.max_cycles, 5000);
/// assert!(config.general.shuffle);
/// assert_eq!(config.general.start_pc, 0);
/// assert_eq!(config.pipeline.branch_prediction, BranchPrediction::NotTaken);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General run settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Data memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Front-end configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or unknown enum names.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Stop after this many cycles with exit code 255 (0 = unlimited)
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,

    /// Randomize unit evaluation order every tick
    #[serde(default)]
    pub shuffle: bool,

    /// Seed for the shuffled evaluation order
    #[serde(default = "GeneralConfig::default_shuffle_seed")]
    pub shuffle_seed: u64,

    /// Initial fetch PC
    #[serde(default = "GeneralConfig::default_start_pc")]
    pub start_pc: u32,
}

impl GeneralConfig {
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    fn default_shuffle_seed() -> u64 {
        defaults::SHUFFLE_SEED
    }

    fn default_start_pc() -> u32 {
        defaults::START_PC
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
            shuffle: false,
            shuffle_seed: defaults::SHUFFLE_SEED,
            start_pc: defaults::START_PC,
        }
    }
}

/// Data memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// RAM size in bytes; the loader grows it to fit the image
    #[serde(default = "MemoryConfig::default_size_bytes")]
    pub size_bytes: usize,
}

impl MemoryConfig {
    fn default_size_bytes() -> usize {
        DEFAULT_MEMORY_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_bytes: DEFAULT_MEMORY_SIZE,
        }
    }
}

/// Front-end configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Static prediction for conditional branches
    #[serde(default)]
    pub branch_prediction: BranchPrediction,
}
