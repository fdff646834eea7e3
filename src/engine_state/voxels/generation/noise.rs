//! Noise source for island shapes.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::config::GenerationConfig;

/// A deterministic 3D scalar field with values in roughly `[-1, 1]`.
pub trait NoiseSampler: Send + Sync {
    /// Samples the field at an island-local position.
    fn noise3(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Fractal Brownian motion over Perlin noise.
pub struct FbmNoise {
    fbm: Fbm<Perlin>,
}

impl FbmNoise {
    /// Builds the sampler for a seed using the configured frequency and
    /// fractal parameters.
    pub fn new(seed: u32, config: &GenerationConfig) -> Self {
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(config.fractal_octaves)
            .set_frequency(config.noise_frequency)
            .set_persistence(config.fractal_gain)
            .set_lacunarity(config.fractal_lacunarity);
        FbmNoise { fbm }
    }
}

impl NoiseSampler for FbmNoise {
    fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        self.fbm.get([x, y, z])
    }
}

/// A sampler that returns the same value everywhere. Useful to see the
/// shape the envelope alone produces.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(pub f64);

impl NoiseSampler for ConstantNoise {
    fn noise3(&self, _x: f64, _y: f64, _z: f64) -> f64 {
        self.0
    }
}

/// Maps a noise sample from `[-1, 1]` into `[0, 1]`, clamping overshoot.
#[inline]
pub fn remap_unit(sample: f64) -> f32 {
    ((sample + 1.0) * 0.5).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_field() {
        let config = GenerationConfig::default();
        let a = FbmNoise::new(7, &config);
        let b = FbmNoise::new(7, &config);
        for i in 0..50 {
            let p = (i as f64 * 3.7, -(i as f64) * 1.3, i as f64 * 0.5);
            assert_eq!(a.noise3(p.0, p.1, p.2), b.noise3(p.0, p.1, p.2));
        }
    }

    #[test]
    fn test_origin_is_neutral() {
        let noise = FbmNoise::new(1234, &GenerationConfig::default());
        assert!(noise.noise3(0.0, 0.0, 0.0).abs() < 1e-9);
        assert_eq!(remap_unit(0.0), 0.5);
    }

    #[test]
    fn test_remap_clamps() {
        assert_eq!(remap_unit(-3.0), 0.0);
        assert_eq!(remap_unit(3.0), 1.0);
        assert_eq!(remap_unit(1.0), 1.0);
    }
}
