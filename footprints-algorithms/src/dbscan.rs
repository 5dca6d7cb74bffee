use std::{cmp::Ordering, collections::VecDeque};

use footprints_core::{containers::Point, error::ConfigError};
use log::debug;

use crate::neighborhood::{DistanceMetric, NeighborhoodIndex};

/// Parameters of the DBSCAN algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbscanParameters {
    eps: f64,
    min_points: usize,
}

impl DbscanParameters {
    /// Creates new `DbscanParameters`. `eps` is the neighbourhood radius and must be finite and greater than zero.
    /// `min_points` is the number of points (including the point itself) that a neighbourhood must contain so that
    /// its center becomes a core point, and must be at least 1
    /// ```
    /// # use footprints_algorithms::dbscan::DbscanParameters;
    /// assert!(DbscanParameters::new(3.5, 35).is_ok());
    /// assert!(DbscanParameters::new(0.0, 35).is_err());
    /// assert!(DbscanParameters::new(3.5, 0).is_err());
    /// ```
    pub fn new(eps: f64, min_points: usize) -> Result<Self, ConfigError> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(ConfigError::InvalidEps(eps));
        }
        if min_points == 0 {
            return Err(ConfigError::InvalidMinPoints(min_points));
        }
        Ok(Self { eps, min_points })
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }
}

/// The cluster that a point was assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    Noise,
    Cluster(usize),
}

impl ClusterLabel {
    /// The cluster id, or `None` for noise
    pub fn cluster_id(&self) -> Option<usize> {
        match self {
            ClusterLabel::Noise => None,
            ClusterLabel::Cluster(id) => Some(*id),
        }
    }

    pub fn is_noise(&self) -> bool {
        *self == ClusterLabel::Noise
    }
}

/// The role a point played during clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Core,
    Border,
    Noise,
}

/// Result of a DBSCAN run: one label and one kind per input point, in input order. Cluster ids are contiguous and
/// start at 0
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    labels: Vec<ClusterLabel>,
    kinds: Vec<PointKind>,
    cluster_count: usize,
}

impl Clustering {
    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    /// Label of the point at `index`
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds
    pub fn label(&self, index: usize) -> ClusterLabel {
        self.labels[index]
    }

    /// Kind of the point at `index`
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds
    pub fn kind(&self, index: usize) -> PointKind {
        self.kinds[index]
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Number of labelled points
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The point indices of every cluster, indexed by cluster id. The indices of each cluster are ascending
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut clusters = vec![Vec::new(); self.cluster_count];
        for (index, label) in self.labels.iter().enumerate() {
            if let ClusterLabel::Cluster(id) = label {
                clusters[*id].push(index);
            }
        }
        clusters
    }

    /// Indices of all noise points, ascending
    pub fn noise(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.is_noise())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn core_point_count(&self) -> usize {
        self.count_kind(PointKind::Core)
    }

    pub fn border_point_count(&self) -> usize {
        self.count_kind(PointKind::Border)
    }

    pub fn noise_point_count(&self) -> usize {
        self.count_kind(PointKind::Noise)
    }

    fn count_kind(&self, kind: PointKind) -> usize {
        self.kinds.iter().filter(|k| **k == kind).count()
    }

    /// Renumbers the clusters by the (x, y) centroid of their points, ascending by x and then by y, so that cluster
    /// ids no longer depend on the order of the input points. `points` must be the points this `Clustering` was
    /// computed from. Partition and point kinds are unchanged.
    ///
    /// # Panics
    ///
    /// If `points` has a different length than this `Clustering`
    pub fn sorted_by_centroid(&self, points: &[Point]) -> Clustering {
        assert_eq!(
            points.len(),
            self.labels.len(),
            "Clustering was computed for a different number of points"
        );
        let mut centroids: Vec<(usize, f64, f64)> = self
            .clusters()
            .iter()
            .enumerate()
            .map(|(id, members)| {
                let count = members.len() as f64;
                let (sum_x, sum_y) = members.iter().fold((0.0, 0.0), |(sx, sy), idx| {
                    (sx + points[*idx].x, sy + points[*idx].y)
                });
                (id, sum_x / count, sum_y / count)
            })
            .collect();
        centroids.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal))
                .then(a.0.cmp(&b.0))
        });

        let mut new_ids = vec![0; self.cluster_count];
        for (new_id, (old_id, _, _)) in centroids.iter().enumerate() {
            new_ids[*old_id] = new_id;
        }
        let labels = self
            .labels
            .iter()
            .map(|label| match label {
                ClusterLabel::Noise => ClusterLabel::Noise,
                ClusterLabel::Cluster(id) => ClusterLabel::Cluster(new_ids[*id]),
            })
            .collect();
        Clustering {
            labels,
            kinds: self.kinds.clone(),
            cluster_count: self.cluster_count,
        }
    }
}

/// Clusters `points` with DBSCAN, using the 3D euclidean distance between point positions.
///
/// A point is a core point if at least `min_points` points (itself included) lie within a distance of `eps`
/// (inclusive). Clusters are grown from core points in input order and receive ids in the order they are
/// discovered. A non-core point within reach of a core point is a border point of the first cluster that reaches
/// it. All other points are noise. For the same input order and parameters the result is always the same.
/// ```
/// # use footprints_core::containers::Point;
/// # use footprints_algorithms::dbscan::*;
/// let points = vec![
///     Point::new(0.0, 0.0, 0.0, 6),
///     Point::new(1.0, 0.0, 0.0, 6),
///     Point::new(50.0, 0.0, 0.0, 6),
/// ];
/// let clustering = dbscan(&points, &DbscanParameters::new(1.5, 2).unwrap());
/// assert_eq!(clustering.cluster_count(), 1);
/// assert_eq!(clustering.label(1), ClusterLabel::Cluster(0));
/// assert_eq!(clustering.label(2), ClusterLabel::Noise);
/// ```
pub fn dbscan(points: &[Point], parameters: &DbscanParameters) -> Clustering {
    let index = NeighborhoodIndex::build(points, DistanceMetric::Spatial);
    let mut labels: Vec<Option<ClusterLabel>> = vec![None; points.len()];
    let mut kinds = vec![PointKind::Noise; points.len()];
    let mut cluster_count = 0;

    for point_index in 0..points.len() {
        if labels[point_index].is_some() {
            continue;
        }
        let neighbors = index.within_radius(&points[point_index], parameters.eps);
        if neighbors.len() < parameters.min_points {
            labels[point_index] = Some(ClusterLabel::Noise);
            continue;
        }

        let cluster_id = cluster_count;
        cluster_count += 1;
        labels[point_index] = Some(ClusterLabel::Cluster(cluster_id));
        kinds[point_index] = PointKind::Core;

        let mut queue: VecDeque<usize> = neighbors.into();
        while let Some(candidate) = queue.pop_front() {
            match labels[candidate] {
                Some(ClusterLabel::Cluster(_)) => {}
                Some(ClusterLabel::Noise) => {
                    // Its neighbourhood was already too small, so it can only be a border point
                    labels[candidate] = Some(ClusterLabel::Cluster(cluster_id));
                    kinds[candidate] = PointKind::Border;
                }
                None => {
                    labels[candidate] = Some(ClusterLabel::Cluster(cluster_id));
                    let candidate_neighbors =
                        index.within_radius(&points[candidate], parameters.eps);
                    if candidate_neighbors.len() >= parameters.min_points {
                        kinds[candidate] = PointKind::Core;
                        queue.extend(candidate_neighbors);
                    } else {
                        kinds[candidate] = PointKind::Border;
                    }
                }
            }
        }
        debug!("Cluster {} complete", cluster_id);
    }

    let labels = labels
        .into_iter()
        .map(|label| label.unwrap_or(ClusterLabel::Noise))
        .collect();
    Clustering {
        labels,
        kinds,
        cluster_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rand::{distributions::Uniform, thread_rng, Rng};
    use std::collections::HashSet;

    fn grid(origin_x: f64, origin_y: f64, size: usize, spacing: f64) -> Vec<Point> {
        let mut points = Vec::new();
        for ix in 0..size {
            for iy in 0..size {
                points.push(Point::new(
                    origin_x + ix as f64 * spacing,
                    origin_y + iy as f64 * spacing,
                    10.0,
                    6,
                ));
            }
        }
        points
    }

    fn assert_valid_partition(clustering: &Clustering, num_points: usize) {
        assert_eq!(clustering.len(), num_points);
        let mut seen = HashSet::new();
        let clusters = clustering.clusters();
        assert_eq!(clusters.len(), clustering.cluster_count());
        for members in clusters.iter() {
            assert!(!members.is_empty());
            for member in members {
                assert!(seen.insert(*member));
            }
        }
        for noise in clustering.noise() {
            assert!(seen.insert(noise));
        }
        assert_eq!(seen.len(), num_points);
        for label in clustering.labels() {
            if let ClusterLabel::Cluster(id) = label {
                assert!(*id < clustering.cluster_count());
            }
        }
    }

    #[test]
    fn test_parameter_validation() {
        assert_eq!(
            DbscanParameters::new(-1.0, 3),
            Err(ConfigError::InvalidEps(-1.0))
        );
        assert!(matches!(
            DbscanParameters::new(f64::NAN, 3),
            Err(ConfigError::InvalidEps(_))
        ));
        assert_eq!(
            DbscanParameters::new(1.0, 0),
            Err(ConfigError::InvalidMinPoints(0))
        );
    }

    #[test]
    fn test_empty_input_has_no_clusters() -> Result<()> {
        let clustering = dbscan(&[], &DbscanParameters::new(3.5, 35)?);
        assert_eq!(clustering.cluster_count(), 0);
        assert!(clustering.is_empty());
        assert!(clustering.clusters().is_empty());
        Ok(())
    }

    #[test]
    fn test_two_separated_groups() -> Result<()> {
        let mut points = grid(0.0, 0.0, 10, 0.5);
        points.extend(grid(100.0, 0.0, 10, 0.5));
        let clustering = dbscan(&points, &DbscanParameters::new(1.0, 5)?);
        assert_eq!(clustering.cluster_count(), 2);
        assert!(clustering.noise().is_empty());
        assert!((0..100).all(|i| clustering.label(i) == ClusterLabel::Cluster(0)));
        assert!((100..200).all(|i| clustering.label(i) == ClusterLabel::Cluster(1)));
        assert_valid_partition(&clustering, points.len());
        Ok(())
    }

    #[test]
    fn test_groups_merge_when_eps_bridges_the_gap() -> Result<()> {
        let mut points = grid(0.0, 0.0, 10, 0.5);
        // Gap between the groups is 1.5
        points.extend(grid(6.0, 0.0, 10, 0.5));
        let separate = dbscan(&points, &DbscanParameters::new(1.0, 3)?);
        assert_eq!(separate.cluster_count(), 2);
        let merged = dbscan(&points, &DbscanParameters::new(1.5, 3)?);
        assert_eq!(merged.cluster_count(), 1);
        assert_valid_partition(&merged, points.len());
        Ok(())
    }

    #[test]
    fn test_isolated_point_is_noise() -> Result<()> {
        let mut points = grid(0.0, 0.0, 6, 1.0);
        points.push(Point::new(500.0, 500.0, 10.0, 6));
        let clustering = dbscan(&points, &DbscanParameters::new(1.5, 4)?);
        assert_eq!(clustering.cluster_count(), 1);
        assert_eq!(clustering.noise(), vec![points.len() - 1]);
        assert_eq!(clustering.kind(points.len() - 1), PointKind::Noise);
        assert_eq!(clustering.noise_point_count(), 1);
        Ok(())
    }

    #[test]
    fn test_min_points_includes_the_point_itself() -> Result<()> {
        let points = vec![Point::new(0.0, 0.0, 0.0, 6), Point::new(2.0, 0.0, 0.0, 6)];
        let clustering = dbscan(&points, &DbscanParameters::new(2.0, 2)?);
        assert_eq!(clustering.cluster_count(), 1);
        assert_eq!(clustering.core_point_count(), 2);

        let single = dbscan(&points[..1], &DbscanParameters::new(1.0, 1)?);
        assert_eq!(single.cluster_count(), 1);
        assert_eq!(single.kind(0), PointKind::Core);
        Ok(())
    }

    #[test]
    fn test_border_point_visited_as_noise_first_is_claimed() -> Result<()> {
        // Point 0 comes first, is not core and is labelled noise, until the core point 2 reaches it
        let points = vec![
            Point::new(0.0, 0.0, 0.0, 6),
            Point::new(2.0, 0.0, 0.0, 6),
            Point::new(1.0, 0.0, 0.0, 6),
            Point::new(1.0, 0.5, 0.0, 6),
        ];
        let clustering = dbscan(&points, &DbscanParameters::new(1.0, 4)?);
        assert_eq!(clustering.cluster_count(), 1);
        assert_eq!(clustering.kind(2), PointKind::Core);
        assert_eq!(clustering.kind(0), PointKind::Border);
        assert_eq!(clustering.label(0), ClusterLabel::Cluster(0));
        assert!(clustering.noise().is_empty());
        Ok(())
    }

    #[test]
    fn test_border_point_belongs_to_first_cluster_reaching_it() -> Result<()> {
        // Two dense groups whose inner edges lie at x = 0 and x = 4. The point at x = 2 is in reach of both edges
        // but only sees 7 points itself
        let mut points = vec![];
        for (x, count) in [(-1.5, 5), (0.0, 3), (4.0, 3), (5.5, 5)] {
            for _ in 0..count {
                points.push(Point::new(x, 0.0, 0.0, 6));
            }
        }
        points.push(Point::new(2.0, 0.0, 0.0, 6));
        let middle = points.len() - 1;
        let clustering = dbscan(&points, &DbscanParameters::new(2.0, 8)?);
        assert_eq!(clustering.cluster_count(), 2);
        assert_eq!(clustering.kind(middle), PointKind::Border);
        assert_eq!(clustering.label(middle), ClusterLabel::Cluster(0));
        assert_eq!(clustering.label(8), ClusterLabel::Cluster(1));
        assert_eq!(clustering.border_point_count(), 1);
        assert_eq!(clustering.core_point_count(), 16);
        Ok(())
    }

    #[test]
    fn test_rerun_is_identical() -> Result<()> {
        let mut rng = thread_rng();
        let points: Vec<Point> = (0..500)
            .map(|_| {
                Point::new(
                    rng.sample(Uniform::new(0.0, 50.0)),
                    rng.sample(Uniform::new(0.0, 50.0)),
                    rng.sample(Uniform::new(0.0, 5.0)),
                    6,
                )
            })
            .collect();
        let parameters = DbscanParameters::new(3.0, 5)?;
        let first = dbscan(&points, &parameters);
        let second = dbscan(&points, &parameters);
        assert_eq!(first, second);
        assert_valid_partition(&first, points.len());
        Ok(())
    }

    #[test]
    fn test_sorted_by_centroid_is_independent_of_input_order() -> Result<()> {
        let west = grid(0.0, 0.0, 5, 1.0);
        let east = grid(50.0, 0.0, 5, 1.0);
        let parameters = DbscanParameters::new(1.5, 3)?;

        let mut east_first = east.clone();
        east_first.extend(west.iter().copied());
        let clustering = dbscan(&east_first, &parameters);
        assert_eq!(clustering.label(0), ClusterLabel::Cluster(0));

        let sorted = clustering.sorted_by_centroid(&east_first);
        assert_eq!(sorted.label(0), ClusterLabel::Cluster(1));
        assert_eq!(sorted.label(east.len()), ClusterLabel::Cluster(0));
        assert_eq!(sorted.cluster_count(), clustering.cluster_count());
        assert_eq!(sorted.noise(), clustering.noise());
        assert_valid_partition(&sorted, east_first.len());
        Ok(())
    }
}
