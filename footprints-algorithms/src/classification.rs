use std::collections::BTreeMap;

use footprints_core::{
    containers::{Point, PointSet},
    layout::ClassSet,
};

/// Returns the points of `points` whose classification is contained in `classes`, in their original order and
/// with the same CRS. An empty result is not an error.
/// ```
/// # use footprints_core::{containers::*, layout::ClassSet, meta::Crs};
/// # use footprints_algorithms::classification::filter_by_classes;
/// let crs = Crs::from_epsg(2180).unwrap();
/// let points = PointSet::new(
///     vec![
///         Point::new(0.0, 0.0, 0.0, 2),
///         Point::new(1.0, 0.0, 0.0, 6),
///         Point::new(2.0, 0.0, 0.0, 6),
///     ],
///     crs,
/// );
/// let buildings = filter_by_classes(&points, &ClassSet::buildings());
/// assert_eq!(buildings.len(), 2);
/// assert_eq!(buildings.points()[0].x, 1.0);
/// ```
pub fn filter_by_classes(points: &PointSet, classes: &ClassSet) -> PointSet {
    let selected: Vec<Point> = points
        .iter()
        .filter(|point| classes.contains(point.classification))
        .copied()
        .collect();
    PointSet::new(selected, points.crs())
}

/// Number of points per classification code. Codes without points are not contained in the result
pub fn count_by_class(points: &PointSet) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for point in points {
        *counts.entry(point.classification).or_insert(0) += 1;
    }
    counts
}
