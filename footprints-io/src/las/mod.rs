mod las_reader;
pub use self::las_reader::*;
