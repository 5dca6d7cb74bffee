use std::fmt::Display;

use crate::error::ConfigError;

/// Coordinate reference system of a point cloud, identified by its EPSG code. All coordinates of a
/// [`PointSet`](crate::containers::PointSet) and all features derived from it share one `Crs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    /// Creates a `Crs` from the given EPSG code. Fails for code 0, which no registry entry uses
    /// ```
    /// # use footprints_core::meta::Crs;
    /// let crs = Crs::from_epsg(2180).unwrap();
    /// assert_eq!(crs.to_string(), "EPSG:2180");
    /// assert!(Crs::from_epsg(0).is_err());
    /// ```
    pub fn from_epsg(epsg: u32) -> Result<Self, ConfigError> {
        if epsg == 0 {
            return Err(ConfigError::InvalidEpsg);
        }
        Ok(Self { epsg })
    }

    /// The EPSG code of this `Crs`
    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// The OGC URN of this `Crs`, which is how GeoJSON readers (GDAL, QGIS) expect a named CRS
    /// ```
    /// # use footprints_core::meta::Crs;
    /// let crs = Crs::from_epsg(2180).unwrap();
    /// assert_eq!(crs.ogc_urn(), "urn:ogc:def:crs:EPSG::2180");
    /// ```
    pub fn ogc_urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}
