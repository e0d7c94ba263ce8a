use glam::Vec2;

/// An ordered, fixed-length collection of 2-D points.
///
/// Every `PointSet` flowing through one run must have the same length;
/// the animation driver refuses to adopt a set whose length differs.
pub type PointSet = Vec<Vec2>;
