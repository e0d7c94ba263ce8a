//! Point placement: density-weighted rejection sampling and the uniform
//! seed grid.
//!
//! [`sample_density`] draws positions from a grayscale raster, weighting
//! each pixel by its darkness and rejecting candidates that crowd points
//! already accepted. [`uniform_grid`] produces the deterministic layered
//! grid used as the very first origin set; its count (`4^layers - 1`)
//! fixes the per-run point count.

use glam::Vec2;
use rand::Rng;

use crate::error::{MorphError, MorphResult};
use crate::types::PointSet;

/// Sampling attempts allowed per requested point before giving up.
const MAX_ATTEMPTS_PER_POINT: usize = 200;

/// Grayscale density raster. Darker pixels (lower values) attract more
/// sample points. How the raster is produced — glyphs, noise, anything —
/// is the caller's concern.
pub struct DensityMap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl DensityMap {
    /// Wraps raw row-major grayscale data.
    ///
    /// ### Panics
    /// Panics if `data.len() != width * height`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "density data must be width * height bytes"
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Fills a raster by evaluating `f` at every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// A producer of point sets, one per request label.
///
/// Implementations must return the same point count for every call within
/// one run; the animation driver rejects sets that do not match.
pub trait PointSource: Send {
    fn generate(&mut self, label: &str) -> MorphResult<PointSet>;
}

/// Draws `count` points from `map`, weighted by pixel darkness, keeping a
/// minimum spacing between accepted points.
///
/// Each pixel gets weight `255 - value + 1e-6`; candidates are drawn from
/// the cumulative distribution and rejected when closer than
/// `min_distance` to an already accepted point. The attempt budget is
/// `count * 200`; running out before placing every point yields
/// [`MorphError::ShortSample`] so the caller can keep its last good set
/// instead of animating toward a partial one.
///
/// ### Panics
/// Panics if `count > 0` and the map has no pixels.
pub fn sample_density(
    map: &DensityMap,
    count: usize,
    min_distance: f32,
    rng: &mut impl Rng,
) -> MorphResult<PointSet> {
    if count == 0 {
        return Ok(Vec::new());
    }
    assert!(
        !map.data.is_empty(),
        "cannot sample a nonzero point count from an empty density map"
    );

    // Cumulative darkness distribution. The epsilon keeps fully white
    // pixels drawable, so a blank raster degrades to uniform sampling.
    let mut cumulative = Vec::with_capacity(map.data.len());
    let mut total = 0.0f64;
    for &v in &map.data {
        total += 255.0 - f64::from(v) + 1e-6;
        cumulative.push(total);
    }

    let mut points: PointSet = Vec::with_capacity(count);
    let min_dist_sq = min_distance * min_distance;
    let max_attempts = count * MAX_ATTEMPTS_PER_POINT;

    let mut attempts = 0;
    while points.len() < count && attempts < max_attempts {
        attempts += 1;

        let r = rng.random_range(0.0..total);
        let index = cumulative.partition_point(|&c| c < r);
        let candidate = Vec2::new((index % map.width) as f32, (index / map.width) as f32);

        if points
            .iter()
            .all(|p| p.distance_squared(candidate) >= min_dist_sq)
        {
            points.push(candidate);
        }
    }

    if points.len() < count {
        return Err(MorphError::ShortSample {
            requested: count,
            accepted: points.len(),
        });
    }
    Ok(points)
}

/// Number of points produced by [`uniform_grid`] for a layer count.
pub fn grid_point_count(layers: u32) -> usize {
    4usize.pow(layers) - 1
}

/// Deterministic layered grid over a `width` x `height` region.
///
/// Layer `l` divides the region into `2^l` x `2^l` cells and drops a
/// vertical triple of points in each, giving `3 * 4^l` points per layer
/// and `4^layers - 1` in total.
pub fn uniform_grid(width: u32, height: u32, layers: u32) -> PointSet {
    let mut points = Vec::with_capacity(grid_point_count(layers));
    for layer in 0..layers {
        let box_w = width / 2u32.pow(layer + 1);
        let box_h = height / 2u32.pow(layer + 1);
        let segments = 2u32.pow(layer);
        for n in 0..segments * segments {
            let x = box_w + (n % segments) * box_w * 2;
            let y_bias = box_h / 2 + (n / segments) * box_h * 2;
            for y in [y_bias, y_bias + box_h / 2, y_bias + box_h] {
                points.push(Vec2::new(x as f32, y as f32));
            }
        }
    }
    debug_assert_eq!(points.len(), grid_point_count(layers));
    points
}
