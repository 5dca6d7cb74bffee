#![warn(clippy::all)]
//! The pipelines behind the `extract_buildings` and `class_info` command line tools.
//!
//! Both binaries only parse their arguments into one of the configurations of this crate and run the matching
//! pipeline, so everything a binary does can be exercised from tests.

/// Building footprint extraction: classification filter, clustering, hulls and GeoJSON output
pub mod extraction;
/// Point counts per classification code and point density analysis
pub mod inspection;
