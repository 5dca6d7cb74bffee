mod classification;
pub use self::classification::*;
