#![warn(clippy::all)]
//! Reading classified point clouds and writing building footprints.
//!
//! Point clouds are read from LAS/LAZ files or from ASCII files with one point per line. The file type is
//! determined from the file extension, see [`base::GenericPointReader`]. Footprints are written as GeoJSON
//! feature collections through the [`base::FeatureWriter`] trait.

/// ASCII point cloud reader with a configurable column format
pub mod ascii;
/// Common reader and writer traits, file type detection and convenience functions
pub mod base;
/// GeoJSON feature writer
pub mod geojson;
/// LAS/LAZ point cloud reader
pub mod las;
