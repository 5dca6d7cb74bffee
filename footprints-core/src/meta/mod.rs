mod crs;
pub use self::crs::*;
