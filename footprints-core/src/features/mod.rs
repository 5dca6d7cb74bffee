use anyhow::{bail, ensure, Result};
use nalgebra::Vector2;

use crate::meta::Crs;

/// The outline of a building as a simple polygon in the xy-plane. The vertices form an open ring (the first vertex
/// is not repeated) in counter-clockwise order.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintPolygon {
    vertices: Vec<Vector2<f64>>,
}

impl FootprintPolygon {
    /// Creates a new `FootprintPolygon` from an open ring of vertices. Fails if there are less than 3 vertices, if
    /// a vertex is not finite, or if the ring is not counter-clockwise with a non-zero area
    pub fn new(vertices: Vec<Vector2<f64>>) -> Result<Self> {
        ensure!(
            vertices.len() >= 3,
            "A footprint polygon needs at least 3 vertices, got {}",
            vertices.len()
        );
        ensure!(
            vertices.iter().all(|v| v.x.is_finite() && v.y.is_finite()),
            "Footprint polygon vertices must be finite"
        );
        let signed_area = shoelace(&vertices);
        if signed_area <= 0.0 {
            bail!(
                "Footprint polygon must be counter-clockwise with positive area (signed area {})",
                signed_area
            );
        }
        Ok(Self { vertices })
    }

    /// The vertices of this polygon as an open ring in counter-clockwise order
    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    /// The vertices as a closed ring, i.e. with the first vertex repeated at the end, as vector formats expect it
    /// ```
    /// # use footprints_core::{features::FootprintPolygon, nalgebra::Vector2};
    /// let polygon = FootprintPolygon::new(vec![
    ///     Vector2::new(0.0, 0.0),
    ///     Vector2::new(1.0, 0.0),
    ///     Vector2::new(0.0, 1.0),
    /// ]).unwrap();
    /// let ring = polygon.closed_ring();
    /// assert_eq!(ring.len(), 4);
    /// assert_eq!(ring.first(), ring.last());
    /// ```
    pub fn closed_ring(&self) -> Vec<[f64; 2]> {
        self.vertices
            .iter()
            .chain(self.vertices.first())
            .map(|v| [v.x, v.y])
            .collect()
    }

    /// Planar area enclosed by this polygon
    pub fn area(&self) -> f64 {
        shoelace(&self.vertices).abs()
    }

    /// 2D bounding box as `[min_x, min_y, max_x, max_y]`
    pub fn bounds(&self) -> [f64; 4] {
        self.vertices.iter().fold(
            [f64::MAX, f64::MAX, f64::MIN, f64::MIN],
            |[min_x, min_y, max_x, max_y], v| {
                [min_x.min(v.x), min_y.min(v.y), max_x.max(v.x), max_y.max(v.y)]
            },
        )
    }
}

/// Signed area of the given open ring; positive for counter-clockwise rings
fn shoelace(ring: &[Vector2<f64>]) -> f64 {
    let twice_area: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice_area / 2.0
}

/// One building: its footprint polygon plus the `area` and `volume` attributes. The cluster id orders features
/// within a [`FeatureCollection`] and is not part of the attribute schema.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFeature {
    cluster_id: usize,
    geometry: FootprintPolygon,
    area: f64,
    volume: f64,
}

impl VectorFeature {
    pub fn new(cluster_id: usize, geometry: FootprintPolygon, area: f64, volume: f64) -> Result<Self> {
        ensure!(
            area.is_finite() && area >= 0.0,
            "Feature {} has invalid area {}",
            cluster_id,
            area
        );
        ensure!(
            volume.is_finite() && volume >= 0.0,
            "Feature {} has invalid volume {}",
            cluster_id,
            volume
        );
        Ok(Self {
            cluster_id,
            geometry,
            area,
            volume,
        })
    }

    pub fn cluster_id(&self) -> usize {
        self.cluster_id
    }

    pub fn geometry(&self) -> &FootprintPolygon {
        &self.geometry
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

/// All features of one extraction run, in ascending cluster id order and tagged with the CRS of the input points
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    crs: Crs,
    features: Vec<VectorFeature>,
}

impl FeatureCollection {
    /// Creates a new `FeatureCollection`. Fails if the cluster ids of `features` are not strictly ascending
    pub fn new(crs: Crs, features: Vec<VectorFeature>) -> Result<Self> {
        if let Some(pair) = features
            .windows(2)
            .find(|pair| pair[0].cluster_id >= pair[1].cluster_id)
        {
            bail!(
                "Features must be ordered by ascending cluster id, but cluster {} is followed by cluster {}",
                pair[0].cluster_id,
                pair[1].cluster_id
            );
        }
        Ok(Self { crs, features })
    }

    /// Builds one [`VectorFeature`] per `(cluster_id, polygon, area, volume)` tuple and collects them into a
    /// `FeatureCollection` tagged with `crs`. The tuples must already be in ascending cluster id order
    pub fn from_footprints<I>(crs: Crs, footprints: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, FootprintPolygon, f64, f64)>,
    {
        let features = footprints
            .into_iter()
            .map(|(cluster_id, polygon, area, volume)| {
                VectorFeature::new(cluster_id, polygon, area, volume)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(crs, features)
    }

    pub fn empty(crs: Crs) -> Self {
        Self {
            crs,
            features: vec![],
        }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn features(&self) -> &[VectorFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VectorFeature> {
        self.features.iter()
    }

    /// 2D bounding box of all footprints as `[min_x, min_y, max_x, max_y]`, or `None` if there are no features
    pub fn bounds(&self) -> Option<[f64; 4]> {
        self.features
            .iter()
            .map(|feature| feature.geometry.bounds())
            .reduce(|a, b| {
                [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])]
            })
    }
}
