use anyhow::{bail, Result};

use super::Point;
use crate::{math::AABB, meta::Crs};

/// An ordered sequence of [`Point`]s that share one coordinate reference system. The order of the points is
/// the order in which they were read and is preserved by all operations that derive new point sets.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
    crs: Crs,
}

impl PointSet {
    /// Creates a new `PointSet` without validating the coordinates of `points`
    pub fn new(points: Vec<Point>, crs: Crs) -> Self {
        Self { points, crs }
    }

    /// Creates a new `PointSet`, failing if any of the `points` has a non-finite coordinate
    /// ```
    /// # use footprints_core::{containers::*, meta::Crs};
    /// let crs = Crs::from_epsg(2180).unwrap();
    /// assert!(PointSet::try_new(vec![Point::new(1.0, 2.0, 3.0, 6)], crs).is_ok());
    /// assert!(PointSet::try_new(vec![Point::new(f64::NAN, 2.0, 3.0, 6)], crs).is_err());
    /// ```
    pub fn try_new(points: Vec<Point>, crs: Crs) -> Result<Self> {
        if let Some((index, point)) = points
            .iter()
            .enumerate()
            .find(|(_, point)| !point.is_finite())
        {
            bail!(
                "Point {} has non-finite coordinates ({}, {}, {})",
                index,
                point.x,
                point.y,
                point.z
            );
        }
        Ok(Self { points, crs })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Bounding box of all points, or `None` if this set is empty
    pub fn bounds(&self) -> Option<AABB<f64>> {
        AABB::from_positions(self.points.iter().map(Point::position))
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
