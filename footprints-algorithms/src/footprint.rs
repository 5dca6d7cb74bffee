use anyhow::Result;
use footprints_core::{
    containers::Point,
    features::{FeatureCollection, FootprintPolygon},
    meta::Crs,
    nalgebra::{Vector2, Vector3},
};
use log::{info, warn};
use rayon::prelude::*;

use crate::{
    convexhull::{convex_hull_2d, convex_hull_3d, HullError},
    dbscan::Clustering,
};

/// Why a cluster did not produce a footprint
pub type SkipReason = HullError;

/// Footprint polygon, area and volume of one building cluster
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingFootprint {
    pub cluster_id: usize,
    pub polygon: FootprintPolygon,
    pub area: f64,
    pub volume: f64,
    pub point_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedCluster {
    pub cluster_id: usize,
    pub reason: SkipReason,
}

/// Result of running the footprint extraction over all clusters. Both footprints and skipped clusters are in
/// ascending cluster id order, and every cluster id appears in exactly one of them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FootprintExtraction {
    footprints: Vec<BuildingFootprint>,
    skipped: Vec<SkippedCluster>,
}

impl FootprintExtraction {
    pub fn footprints(&self) -> &[BuildingFootprint] {
        &self.footprints
    }

    pub fn skipped(&self) -> &[SkippedCluster] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Turns the extracted footprints into a [`FeatureCollection`] in the given CRS, one feature per footprint
    pub fn into_feature_collection(self, crs: Crs) -> Result<FeatureCollection> {
        FeatureCollection::from_footprints(
            crs,
            self.footprints.into_iter().map(|footprint| {
                (
                    footprint.cluster_id,
                    footprint.polygon,
                    footprint.area,
                    footprint.volume,
                )
            }),
        )
    }
}

/// Computes footprint polygon, area and volume of a single cluster.
///
/// The footprint is the 2D convex hull of the (x, y) coordinates of `points`, its area is the area of that hull and
/// the volume is the volume of the 3D convex hull. Fails if either hull is degenerate.
pub fn extract_footprint(points: &[Point]) -> Result<(FootprintPolygon, f64, f64), SkipReason> {
    let planar: Vec<Vector2<f64>> = points.iter().map(|p| Vector2::new(p.x, p.y)).collect();
    let ring = convex_hull_2d(&planar)?;
    let polygon = FootprintPolygon::new(ring).map_err(|_| HullError::Collinear)?;
    let area = polygon.area();

    let positions: Vec<Vector3<f64>> = points.iter().map(Point::position_vector).collect();
    let volume = convex_hull_3d(&positions)?.volume();
    Ok((polygon, area, volume))
}

/// Extracts the footprint of every cluster in `clustering`. Noise points are ignored.
///
/// Clusters whose 2D or 3D hull is degenerate (too few points, all points collinear or coplanar) are skipped and
/// reported in [`FootprintExtraction::skipped`]; all other clusters produce one [`BuildingFootprint`]. Clusters
/// are processed in parallel, the results are in ascending cluster id order.
///
/// # Panics
///
/// If `clustering` was computed for a different number of points than `points` contains
pub fn extract_footprints(points: &[Point], clustering: &Clustering) -> FootprintExtraction {
    assert_eq!(
        points.len(),
        clustering.len(),
        "Clustering was computed for a different number of points"
    );
    let results: Vec<(usize, usize, Result<(FootprintPolygon, f64, f64), SkipReason>)> = clustering
        .clusters()
        .into_par_iter()
        .enumerate()
        .map(|(cluster_id, members)| {
            let cluster_points: Vec<Point> = members.iter().map(|idx| points[*idx]).collect();
            (cluster_id, members.len(), extract_footprint(&cluster_points))
        })
        .collect();

    let mut extraction = FootprintExtraction::default();
    for (cluster_id, point_count, result) in results {
        match result {
            Ok((polygon, area, volume)) => extraction.footprints.push(BuildingFootprint {
                cluster_id,
                polygon,
                area,
                volume,
                point_count,
            }),
            Err(reason) => {
                warn!(
                    "Skipping cluster {} ({} points): {}",
                    cluster_id, point_count, reason
                );
                extraction.skipped.push(SkippedCluster { cluster_id, reason });
            }
        }
    }
    info!(
        "Extracted {} footprints from {} clusters ({} skipped)",
        extraction.footprints.len(),
        clustering.cluster_count(),
        extraction.skipped.len()
    );
    extraction
}
