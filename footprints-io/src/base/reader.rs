use anyhow::Result;
use footprints_core::{containers::Point, math::AABB};

/// Base trait for all types that support reading classified points
pub trait PointCloudReader {
    /// Read up to `count` points from this `PointCloudReader`. Returns less than `count` points if the end of the
    /// underlying source is reached first. Fails on the first point that can't be read or that has a non-finite
    /// coordinate
    fn read(&mut self, count: usize) -> Result<Vec<Point>>;

    /// Total number of points in the underlying source, if known in advance
    fn point_count(&self) -> Option<usize>;

    /// Bounds of all points in the underlying source, if known in advance
    fn bounds(&self) -> Option<AABB<f64>> {
        None
    }
}
