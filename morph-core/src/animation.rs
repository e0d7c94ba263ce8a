//! Per-frame animation state machine.
//!
//! The driver owns the current `origin`/`target` point sets and the
//! transition clock. Each frame the render loop calls
//! [`AnimationDriver::advance`] with the frame time, then
//! [`AnimationDriver::build_tree`] to get a fresh partition tree; the tree
//! is always rebuilt from scratch, never patched.

use glam::Vec2;
use tracing::warn;

use crate::channel::BoundedChannel;
use crate::error::{MorphError, MorphResult};
use crate::tree::{self, PartitionNode};
use crate::types::PointSet;

/// Progress of the morph between the previous and current point set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// `t` is advancing from 0 toward 1.
    Transitioning,
    /// `t` is pinned at exactly 1, holding until a new set arrives.
    Settled,
}

/// Smoothstep-family easing: `t < 0.5 ? 4t³ : 1 - 4(1-t)³`.
///
/// Monotonic on [0, 1] with `ease(0) = 0`, `ease(0.5) = 0.5` and
/// `ease(1) = 1`. The driver feeds it raw elapsed seconds, so a
/// transition spans roughly one second of wall-clock time.
pub fn ease(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 1.0 - t;
        1.0 - 4.0 * u * u * u
    }
}

/// Owns the two point sets being morphed between and decides, per frame,
/// the interpolation parameter the tree is rebuilt with.
///
/// State machine:
/// - `Settled` → `Transitioning`: a new set is available on the channel.
///   The old target becomes the origin, the received set becomes the
///   target, and the clock resets.
/// - `Transitioning` → `Settled`: eased elapsed time reaches the settle
///   threshold; `t` snaps to exactly 1.
/// - `Settled` → `Settled`: the non-blocking receive found nothing.
#[derive(Debug)]
pub struct AnimationDriver {
    origin: PointSet,
    target: PointSet,
    origin_scratch: PointSet,
    target_scratch: PointSet,
    phase: Phase,
    started_at: f64,
    settle_threshold: f32,
    t: f32,
}

impl AnimationDriver {
    /// Creates a driver transitioning from `origin` toward `target`,
    /// with the clock referenced to `now`.
    ///
    /// ### Returns
    /// The driver, or [`MorphError::SetLenMismatch`] if the two sets
    /// differ in length.
    pub fn new(
        origin: PointSet,
        target: PointSet,
        settle_threshold: f32,
        now: f64,
    ) -> MorphResult<Self> {
        if origin.len() != target.len() {
            return Err(MorphError::SetLenMismatch {
                expected: origin.len(),
                got: target.len(),
            });
        }
        let n = origin.len();
        Ok(Self {
            origin,
            target,
            origin_scratch: Vec::with_capacity(n),
            target_scratch: Vec::with_capacity(n),
            phase: Phase::Transitioning,
            started_at: now,
            settle_threshold,
            t: 0.0,
        })
    }

    /// Advances the state machine by one frame and returns the
    /// interpolation parameter to rebuild the tree with.
    ///
    /// While settled, polls the channel without blocking; a received set
    /// whose length matches is adopted (old target becomes origin, clock
    /// resets). A mismatched set is logged and discarded, keeping the
    /// last good pair on screen.
    pub fn advance(&mut self, channel: &BoundedChannel<PointSet>, now: f64) -> f32 {
        if self.phase == Phase::Settled
            && let Some(set) = channel.try_recv()
            && let Err(e) = self.adopt(set, now)
        {
            warn!(error = %e, "discarding generated point set");
        }

        self.t = match self.phase {
            Phase::Settled => 1.0,
            Phase::Transitioning => {
                let eased = ease((now - self.started_at) as f32).clamp(0.0, 1.0);
                if eased >= self.settle_threshold {
                    self.phase = Phase::Settled;
                    1.0
                } else {
                    eased
                }
            }
        };
        self.t
    }

    /// Starts a transition toward `set`.
    ///
    /// On success the driver takes ownership of `set` as the new target
    /// and drops the old origin. A length mismatch leaves the driver
    /// untouched and returns [`MorphError::SetLenMismatch`].
    pub fn adopt(&mut self, set: PointSet, now: f64) -> MorphResult<()> {
        if set.len() != self.target.len() {
            return Err(MorphError::SetLenMismatch {
                expected: self.target.len(),
                got: set.len(),
            });
        }
        self.origin = std::mem::replace(&mut self.target, set);
        self.started_at = now;
        self.phase = Phase::Transitioning;
        self.t = 0.0;
        Ok(())
    }

    /// Rebuilds the partition tree for the current frame.
    ///
    /// Copies both sets into scratch buffers (the builder sorts in
    /// place) and builds from depth 1 with the last `advance` result.
    pub fn build_tree(&mut self) -> Option<Box<PartitionNode>> {
        self.origin_scratch.clear();
        self.origin_scratch.extend_from_slice(&self.origin);
        self.target_scratch.clear();
        self.target_scratch.extend_from_slice(&self.target);
        tree::build(&mut self.origin_scratch, &mut self.target_scratch, 1, self.t)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Interpolation parameter computed by the last `advance`.
    pub fn t(&self) -> f32 {
        self.t
    }

    /// Fixed per-run point count.
    pub fn point_count(&self) -> usize {
        self.target.len()
    }

    pub fn origin(&self) -> &[Vec2] {
        &self.origin
    }

    pub fn target(&self) -> &[Vec2] {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn set(offset: f32, n: usize) -> PointSet {
        (0..n)
            .map(|i| Vec2::new(i as f32 + offset, (i * i) as f32))
            .collect()
    }

    fn channel() -> BoundedChannel<PointSet> {
        BoundedChannel::new(1).unwrap()
    }

    #[test]
    fn ease_endpoints_and_midpoint() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(0.5), 0.5);
        assert_eq!(ease(1.0), 1.0);
    }

    #[test]
    fn ease_is_monotonic_on_unit_interval() {
        let mut prev = ease(0.0);
        for i in 1..=100 {
            let next = ease(i as f32 / 100.0);
            assert!(next >= prev, "ease must not decrease (i = {i})");
            prev = next;
        }
    }

    #[test]
    fn mismatched_initial_sets_are_rejected() {
        let err = AnimationDriver::new(set(0.0, 3), set(0.0, 4), 0.99, 0.0).unwrap_err();
        assert_eq!(err, MorphError::SetLenMismatch { expected: 3, got: 4 });
    }

    #[test]
    fn transition_settles_at_exactly_one() {
        let ch = channel();
        let mut driver = AnimationDriver::new(set(0.0, 4), set(10.0, 4), 0.99, 0.0).unwrap();

        // Early in the transition t is strictly between 0 and 1.
        let t = driver.advance(&ch, 0.25);
        assert!(t > 0.0 && t < 1.0);
        assert_eq!(driver.phase(), Phase::Transitioning);

        // Well past the transition the driver snaps to exactly 1.
        let t = driver.advance(&ch, 5.0);
        assert_eq!(t, 1.0);
        assert_eq!(driver.phase(), Phase::Settled);

        // Settled with nothing on the channel is a no-op.
        assert_eq!(driver.advance(&ch, 6.0), 1.0);
        assert_eq!(driver.phase(), Phase::Settled);
    }

    #[test]
    fn settled_driver_adopts_channel_item_and_swaps_sets() {
        let ch = channel();
        let mut driver = AnimationDriver::new(set(0.0, 4), set(10.0, 4), 0.99, 0.0).unwrap();
        driver.advance(&ch, 5.0);
        assert_eq!(driver.phase(), Phase::Settled);

        let fresh = set(20.0, 4);
        ch.send_blocking(fresh.clone());

        let t = driver.advance(&ch, 6.0);
        assert_eq!(driver.phase(), Phase::Transitioning);
        assert_eq!(t, 0.0);
        // The former target is now the origin.
        assert_eq!(driver.origin(), set(10.0, 4).as_slice());
        assert_eq!(driver.target(), fresh.as_slice());

        // The clock was re-referenced to the adoption frame.
        let t = driver.advance(&ch, 6.25);
        assert!(t > 0.0 && t < 1.0);
    }

    #[test]
    fn mismatched_channel_item_is_discarded_keeping_last_good_sets() {
        let ch = channel();
        let mut driver = AnimationDriver::new(set(0.0, 4), set(10.0, 4), 0.99, 0.0).unwrap();
        driver.advance(&ch, 5.0);

        ch.send_blocking(set(0.0, 7));

        let t = driver.advance(&ch, 6.0);
        // The bad set is gone from the channel but was not adopted.
        assert_eq!(t, 1.0);
        assert_eq!(driver.phase(), Phase::Settled);
        assert_eq!(driver.target(), set(10.0, 4).as_slice());
        assert!(ch.is_empty());
    }

    #[test]
    fn build_tree_covers_every_point_each_frame() {
        let ch = channel();
        let mut driver = AnimationDriver::new(set(0.0, 15), set(3.0, 15), 0.99, 0.0).unwrap();

        driver.advance(&ch, 0.3);
        let tree = driver.build_tree().unwrap();
        assert_eq!(tree::node_count(Some(tree.as_ref())), 15);

        // Rebuilding without state changes yields an identical tree.
        let again = driver.build_tree().unwrap();
        assert_eq!(tree.pos, again.pos);
        assert_eq!(tree::node_count(Some(again.as_ref())), 15);
    }

    #[test]
    fn empty_sets_build_empty_trees() {
        let ch = channel();
        let mut driver = AnimationDriver::new(Vec::new(), Vec::new(), 0.99, 0.0).unwrap();
        driver.advance(&ch, 0.5);
        assert!(driver.build_tree().is_none());
    }
}
