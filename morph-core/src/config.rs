use std::time::Duration;

use crate::sampler;

/// Tunable parameters for the morph pipeline.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Layers in the uniform seed grid; the per-run point count is
    /// `4^grid_layers - 1`.
    pub grid_layers: u32,
    /// Capacity of the worker-to-render channel. 1 gives mailbox behavior.
    pub channel_capacity: usize,
    /// Side length of the square density raster fed to the sampler.
    pub density_size: usize,
    /// Minimum spacing between sampled points, in raster pixels.
    pub min_distance: f32,
    /// Raster-to-world scale applied to sampled points.
    pub point_scale: f32,
    /// Eased progress at which a transition snaps to 1 and settles.
    pub settle_threshold: f32,
    /// How often the worker polls its gate.
    pub worker_poll: Duration,
}

impl Config {
    /// Fixed number of points per set under this configuration.
    pub fn point_count(&self) -> usize {
        sampler::grid_point_count(self.grid_layers)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_layers: 5,
            channel_capacity: 1,
            density_size: 256,
            min_distance: 1.0,
            point_scale: 3.0,
            settle_threshold: 0.99,
            worker_poll: Duration::from_millis(50),
        }
    }
}
