#![warn(clippy::all)]

//! Core data structures for extracting building footprints from classified point clouds
//!
//! The central types are [`Point`](crate::containers::Point) and [`PointSet`](crate::containers::PointSet),
//! a fixed-layout point record and an ordered set of such records sharing one coordinate reference system.
//! Extraction results end up in a [`FeatureCollection`](crate::features::FeatureCollection), which is what
//! the writers in `footprints-io` persist.

pub extern crate nalgebra;

pub mod containers;
/// Typed errors for invalid configuration values
pub mod error;
/// Vector features (footprint polygons with area and volume attributes)
pub mod features;
/// Point classification codes and sets of codes
pub mod layout;
/// Bounding boxes
pub mod math;
/// Coordinate reference systems
pub mod meta;
