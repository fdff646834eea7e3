//! # Engine Configuration
//!
//! Tunables for generation, connectivity analysis and physics, loaded from a
//! JSON document. Every field has a default, so an empty object (or no file at
//! all) yields the stock behaviour:
//!
//! ```json
//! {
//!     "worker_count": 2,
//!     "generation": { "noise_frequency": 0.03 },
//!     "connectivity": { "separation_speed": 1.0 }
//! }
//! ```
//!
//! `NOISE_FREQ_3D` and `NOISE_THRESHOLD` in the environment override the
//! matching generation values, which is handy when tuning island shapes
//! without editing files.

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::EngineError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of worker threads used for mesh builds and background generation.
    pub worker_count: usize,
    /// Whether this process renders. Client-side edits invalidate meshes and
    /// notify renderer hooks; server-side edits only touch voxel data.
    pub is_client: bool,
    /// Organic island generation parameters.
    pub generation: GenerationConfig,
    /// Split detection and fragment extraction parameters.
    pub connectivity: ConnectivityConfig,
    /// Rigid-body integration parameters.
    pub physics: PhysicsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            worker_count: 2,
            is_client: true,
            generation: GenerationConfig::default(),
            connectivity: ConnectivityConfig::default(),
            physics: PhysicsConfig::default(),
        }
    }
}

/// Parameters of the three-pass organic generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Minimum product of the acceptance factors for a cell to become solid.
    pub density_threshold: f32,
    /// Half-height of the island as a fraction of its radius.
    pub base_height_ratio: f32,
    /// Hard spherical cutoff, as a multiple of the radius.
    pub spherical_cutoff_factor: f32,
    /// Distance (as a multiple of the radius) at which the radial falloff reaches zero.
    pub radial_falloff_factor: f32,
    /// Base frequency of the shape noise.
    pub noise_frequency: f64,
    /// Number of fBm octaves.
    pub fractal_octaves: usize,
    /// Amplitude multiplier between octaves.
    pub fractal_gain: f64,
    /// Frequency multiplier between octaves.
    pub fractal_lacunarity: f64,
    /// Tree chance per surface column, in percent per unit of vegetation density.
    pub tree_chance_scale: f32,
    /// Grass chance per surface column, in percent per unit of vegetation density.
    pub grass_chance_scale: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            density_threshold: 0.25,
            base_height_ratio: 0.15,
            spherical_cutoff_factor: 1.4,
            radial_falloff_factor: 1.2,
            noise_frequency: 0.02,
            fractal_octaves: 2,
            fractal_gain: 0.4,
            fractal_lacunarity: 2.0,
            tree_chance_scale: 1.5,
            grass_chance_scale: 80.0,
        }
    }
}

/// Caps and tuning for split detection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Visited-set size at which one side of the dual search gives up.
    pub max_voxels_per_side: usize,
    /// Fragment size at which extraction aborts without mutating anything.
    pub max_fragment_size: usize,
    /// Speed added to a fragment along the parent-to-fragment direction.
    pub separation_speed: f32,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            max_voxels_per_side: 5000,
            max_fragment_size: 5000,
            separation_speed: 0.5,
        }
    }
}

/// Rigid-body integration settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Squared speed below which an island is treated as stationary.
    pub motion_epsilon: f32,
    /// Give newly created islands a small seeded drift velocity.
    pub initial_drift: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            motion_epsilon: 0.0001,
            initial_drift: true,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a JSON string.
    ///
    /// # Arguments
    /// * `json` - The JSON document; missing fields take their defaults
    ///
    /// # Returns
    /// The parsed configuration or `EngineError::Parse`
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file and applies environment overrides.
    ///
    /// # Arguments
    /// * `path` - Path to a JSON configuration file
    ///
    /// # Returns
    /// The loaded configuration, or an error if the file is missing or malformed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&text)?;
        config.apply_env_overrides()?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Applies `NOISE_FREQ_3D` and `NOISE_THRESHOLD` from the environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), EngineError> {
        if let Some(freq) = read_env::<f64>("NOISE_FREQ_3D")? {
            info!("NOISE_FREQ_3D override: {freq}");
            self.generation.noise_frequency = freq;
        }
        if let Some(threshold) = read_env::<f32>("NOISE_THRESHOLD")? {
            info!("NOISE_THRESHOLD override: {threshold}");
            self.generation.density_threshold = threshold;
        }
        Ok(())
    }
}

fn read_env<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, EngineError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| EngineError::InvalidEnvOverride { name, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config.connectivity.max_voxels_per_side, 5000);
        assert_eq!(config.generation.density_threshold, 0.25);
        assert!(config.is_client);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "worker_count": 4, "connectivity": { "separation_speed": 2.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.connectivity.separation_speed, 2.0);
        assert_eq!(config.connectivity.max_fragment_size, 5000);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let err = EngineConfig::from_json_str("{ worker_count: }").unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
