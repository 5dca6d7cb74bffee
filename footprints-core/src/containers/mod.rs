//! Point records and ordered point sets
//!
//! Points are read once by one of the readers in `footprints-io` and are not modified afterwards. Every
//! processing step (classification filtering, clustering, hull computation) borrows or copies from a
//! [`PointSet`] and produces new values instead of mutating it.

mod point;
pub use self::point::*;

mod point_set;
pub use self::point_set::*;
