use anyhow::Result;
use footprints_core::features::FeatureCollection;

/// Base trait for all types that support writing vector features
pub trait FeatureWriter {
    /// Write all features of the given `FeatureCollection` to the associated `FeatureWriter`
    fn write(&mut self, features: &FeatureCollection) -> Result<()>;
    /// Flush this `FeatureWriter`, ensuring that all features are written to their destination
    fn flush(&mut self) -> Result<()>;
}
