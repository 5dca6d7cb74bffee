mod geojson_writer;
pub use self::geojson_writer::*;
