//! Procedural density source feeding the rejection sampler.
//!
//! Each request label is hashed into a noise offset and an RNG seed, so a
//! given label always yields the same raster and the same points. The
//! raster itself is a product of two fractal 1-D simplex signals; darker
//! bands appear where both signals swing hard.

use std::hash::{DefaultHasher, Hash, Hasher};

use morph_core::config::Config;
use morph_core::error::MorphResult;
use morph_core::noise::{PermutationTable, Simplex1d};
use morph_core::sampler::{self, DensityMap, PointSource};
use morph_core::types::PointSet;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub struct NoiseDensity {
    noise: Simplex1d,
    size: usize,
    count: usize,
    min_distance: f32,
    scale: f32,
}

impl NoiseDensity {
    pub fn new(cfg: &Config) -> Self {
        Self {
            noise: Simplex1d::new(PermutationTable::reference()),
            size: cfg.density_size,
            count: cfg.point_count(),
            min_distance: cfg.min_distance,
            scale: cfg.point_scale,
        }
    }

    fn density_at(&self, x: usize, y: usize, offset: f32) -> u8 {
        let fx = x as f32 / self.size as f32;
        let fy = y as f32 / self.size as f32;
        let band_x = self.noise.fractal(fx * 6.0 + offset, 4, 0.5);
        let band_y = self.noise.fractal(fy * 6.0 - offset * 1.7, 4, 0.5);
        let darkness = (band_x * band_y).abs().min(1.0);
        (255.0 - darkness * 255.0) as u8
    }
}

fn label_seed(label: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    label.hash(&mut hasher);
    hasher.finish()
}

impl PointSource for NoiseDensity {
    fn generate(&mut self, label: &str) -> MorphResult<PointSet> {
        let seed = label_seed(label);
        let offset = (seed % 4096) as f32 * 0.271;

        let map = DensityMap::from_fn(self.size, self.size, |x, y| self.density_at(x, y, offset));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut points = sampler::sample_density(&map, self.count, self.min_distance, &mut rng)?;

        for p in &mut points {
            *p *= self.scale;
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cfg() -> Config {
        Config {
            grid_layers: 2,
            density_size: 32,
            min_distance: 0.5,
            ..Config::default()
        }
    }

    #[test]
    fn generates_the_configured_point_count() {
        let cfg = small_cfg();
        let mut source = NoiseDensity::new(&cfg);
        let set = source.generate("17").unwrap();
        assert_eq!(set.len(), cfg.point_count());
    }

    #[test]
    fn same_label_is_deterministic_different_labels_diverge() {
        let cfg = small_cfg();
        let mut source = NoiseDensity::new(&cfg);

        let a = source.generate("05").unwrap();
        let b = source.generate("05").unwrap();
        assert_eq!(a, b);

        let c = source.generate("06").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn points_stay_inside_the_scaled_raster() {
        let cfg = small_cfg();
        let limit = cfg.density_size as f32 * cfg.point_scale;
        let mut source = NoiseDensity::new(&cfg);
        for p in source.generate("42").unwrap() {
            assert!(p.x >= 0.0 && p.x < limit);
            assert!(p.y >= 0.0 && p.y < limit);
        }
    }
}
