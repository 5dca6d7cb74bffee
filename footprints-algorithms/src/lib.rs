#![warn(clippy::all)]
//! Algorithms that turn a classified point cloud into building footprints.
//!
//! The extraction pipeline runs the modules of this crate in order: points are filtered by their
//! classification, grouped into buildings with DBSCAN, and every building is reduced to a footprint
//! polygon with area and volume through its 2D and 3D convex hulls.

// Select points by classification code and count points per class.
pub mod classification;
// 2D convex hull (footprint polygon) and 3D convex hull (volume) of a set of points.
pub mod convexhull;
// Density-based spatial clustering (DBSCAN) of building points into individual buildings.
pub mod dbscan;
// Number of neighbours within a radius for every point, with a summary and a text histogram.
pub mod density;
// Per-cluster footprint and volume extraction, skipping clusters with degenerate geometry.
pub mod footprint;
// Radius queries over point positions, backed by a kd-tree.
pub mod neighborhood;
