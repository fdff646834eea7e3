//! # Error Module
//!
//! The error type returned by the fallible parts of the engine: configuration
//! loading and chunk payload decoding. Everything else in the world model is
//! absorbed locally (out-of-range reads return air, missing islands return
//! `None`), so this enum stays small.

use thiserror::Error;

/// Errors surfaced by the island engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A chunk payload did not contain exactly one byte per voxel.
    #[error("invalid chunk payload: expected {expected} bytes, got {actual}")]
    InvalidChunkPayload {
        /// Number of bytes a chunk holds.
        expected: usize,
        /// Number of bytes that were supplied.
        actual: usize,
    },

    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file was not valid JSON for `EngineConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configuration value from the environment could not be parsed.
    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnvOverride {
        /// Variable name.
        name: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}
