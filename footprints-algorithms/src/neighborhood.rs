use footprints_core::containers::Point;
use kd_tree::{KdPoint, KdTree};

/// Relative amount by which kd-tree radius queries are widened. Candidates are filtered again with the exact
/// inclusive distance test, so points lying exactly on the query sphere are never lost to rounding.
const QUERY_RADIUS_SLACK: f64 = 1e-9;

/// How distances between two points are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Euclidean distance of the (x, y, z) positions
    Spatial,
    /// Euclidean distance of the (x, y) positions, ignoring z
    Planar,
}

impl DistanceMetric {
    fn project(&self, point: &Point) -> [f64; 3] {
        match self {
            DistanceMetric::Spatial => [point.x, point.y, point.z],
            DistanceMetric::Planar => [point.x, point.y, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexedPosition {
    position: [f64; 3],
    index: usize,
}

impl IndexedPosition {
    fn squared_distance(&self, other: &[f64; 3]) -> f64 {
        self.position
            .iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl KdPoint for IndexedPosition {
    type Scalar = f64;
    type Dim = typenum::U3;
    fn at(&self, k: usize) -> f64 {
        self.position[k]
    }
}

/// Spatial index over a slice of points that answers fixed-radius neighbourhood queries. Points are identified
/// by their index in the slice the index was built from.
pub struct NeighborhoodIndex {
    tree: KdTree<IndexedPosition>,
    metric: DistanceMetric,
    len: usize,
}

impl NeighborhoodIndex {
    /// Builds a new `NeighborhoodIndex` over `points`, measuring distances with `metric`
    pub fn build(points: &[Point], metric: DistanceMetric) -> Self {
        let positions: Vec<IndexedPosition> = points
            .iter()
            .enumerate()
            .map(|(index, point)| IndexedPosition {
                position: metric.project(point),
                index,
            })
            .collect();
        Self {
            tree: KdTree::build_by_ordered_float(positions),
            metric,
            len: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of all indexed points whose distance to `query` is at most `radius`, sorted ascending. If `query`
    /// is itself an indexed point, its own index is part of the result
    pub fn within_radius(&self, query: &Point, radius: f64) -> Vec<usize> {
        if self.is_empty() {
            return vec![];
        }
        let query = IndexedPosition {
            position: self.metric.project(query),
            index: usize::MAX,
        };
        let squared_radius = radius * radius;
        let mut indices: Vec<usize> = self
            .tree
            .within_radius(&query, radius * (1.0 + QUERY_RADIUS_SLACK))
            .into_iter()
            .filter(|candidate| candidate.squared_distance(&query.position) <= squared_radius)
            .map(|candidate| candidate.index)
            .collect();
        indices.sort_unstable();
        indices
    }
}
