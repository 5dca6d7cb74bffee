mod ascii_reader;
pub use self::ascii_reader::*;
