//! Interpolating KD partition tree.
//!
//! The tree is built fresh every frame over two parallel point slices
//! (`origin` and `target`) of equal length. Both slices are sorted and
//! split by the same rule, so the tree's shape depends only on the point
//! count and depth; interpolating the split positions between the two
//! layouts therefore morphs the partition continuously without the
//! topology flipping.

use std::cmp::Ordering;

use glam::Vec2;

/// Split axis at a given tree depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Axis is a pure function of depth parity: even depths split on X,
    /// odd depths on Y. Full builds start at depth 1 (see [`build`]), so
    /// the root of a tree splits on Y.
    pub fn for_depth(depth: usize) -> Self {
        if depth % 2 == 0 { Axis::X } else { Axis::Y }
    }
}

/// One split in the partition tree. Owns its children exclusively; the
/// whole tree is discarded and rebuilt each frame, never mutated.
#[derive(Debug)]
pub struct PartitionNode {
    pub pos: Vec2,
    pub axis: Axis,
    pub left: Option<Box<PartitionNode>>,
    pub right: Option<Box<PartitionNode>>,
}

/// Axis-aligned box handed down during partition traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Splits the box at a node's position along its axis, yielding the
    /// left/below half and the right/above half.
    pub fn split(&self, axis: Axis, at: Vec2) -> (Bounds, Bounds) {
        match axis {
            Axis::X => (
                Bounds::new(self.min, Vec2::new(at.x, self.max.y)),
                Bounds::new(Vec2::new(at.x, self.min.y), self.max),
            ),
            Axis::Y => (
                Bounds::new(self.min, Vec2::new(self.max.x, at.y)),
                Bounds::new(Vec2::new(self.min.x, at.y), self.max),
            ),
        }
    }
}

/// Total order along `axis` with the other coordinate as tie-break.
///
/// The tie-break matters: it decides which point occupies the median index
/// when many points share a coordinate, and both input slices must agree
/// on it for the morph to stay shape-stable.
fn compare_on(axis: Axis, a: &Vec2, b: &Vec2) -> Ordering {
    match axis {
        Axis::X => a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)),
        Axis::Y => a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)),
    }
}

/// Builds the partition tree over two parallel point slices.
///
/// Each node's position is the component-wise interpolation, by `t`,
/// between the median of the sorted `origin` sub-slice and the median of
/// the sorted `target` sub-slice. The split index is always the median
/// (`count / 2`); at `t = 0` the tree is the origin-only build, at
/// `t = 1` the target-only build. Both slices are sorted in place, so
/// callers pass scratch copies.
///
/// `depth` selects the split axis via [`Axis::for_depth`]; pass 1 for a
/// full build, which makes the root split on Y.
///
/// ### Panics
/// Panics if the slices differ in length; mismatched sets are a caller
/// bug, not a recoverable condition.
pub fn build(
    origin: &mut [Vec2],
    target: &mut [Vec2],
    depth: usize,
    t: f32,
) -> Option<Box<PartitionNode>> {
    assert_eq!(
        origin.len(),
        target.len(),
        "origin and target partitions must have equal length"
    );
    if origin.is_empty() {
        return None;
    }
    let t = t.clamp(0.0, 1.0);

    let axis = Axis::for_depth(depth);
    origin.sort_unstable_by(|a, b| compare_on(axis, a, b));
    target.sort_unstable_by(|a, b| compare_on(axis, a, b));

    let median = (origin.len() / 2).min(origin.len() - 1);
    let pos = origin[median].lerp(target[median], t);

    let (origin_left, origin_rest) = origin.split_at_mut(median);
    let (target_left, target_rest) = target.split_at_mut(median);

    Some(Box::new(PartitionNode {
        pos,
        axis,
        left: build(origin_left, target_left, depth + 1, t),
        right: build(&mut origin_rest[1..], &mut target_rest[1..], depth + 1, t),
    }))
}

/// Number of nodes in a (sub)tree.
pub fn node_count(node: Option<&PartitionNode>) -> usize {
    match node {
        None => 0,
        Some(n) => {
            1 + node_count(n.left.as_deref()) + node_count(n.right.as_deref())
        }
    }
}

/// Pre-order traversal for rendering: visits the node's split line first,
/// then the left child inside the box clipped below/left of the line,
/// then the right child inside the box clipped above/right of it.
pub fn visit_partitions<F>(node: &PartitionNode, bounds: Bounds, f: &mut F)
where
    F: FnMut(Axis, Vec2, Bounds),
{
    f(node.axis, node.pos, bounds);
    let (left_bounds, right_bounds) = bounds.split(node.axis, node.pos);
    if let Some(left) = &node.left {
        visit_partitions(left, left_bounds, f);
    }
    if let Some(right) = &node.right {
        visit_partitions(right, right_bounds, f);
    }
}
