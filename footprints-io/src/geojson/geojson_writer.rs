use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use footprints_core::features::{FeatureCollection, VectorFeature};
use serde::Serialize;

use crate::base::FeatureWriter;

#[derive(Serialize, Debug)]
struct GeoJsonFeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    crs: NamedCrs,
    #[serde(skip_serializing_if = "Option::is_none")]
    bbox: Option<[f64; 4]>,
    features: Vec<GeoJsonFeature>,
}

/// Named CRS member as used by GeoJSON 2008, which GIS software still reads to georeference a dataset
#[derive(Serialize, Debug)]
struct NamedCrs {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: NamedCrsProperties,
}

#[derive(Serialize, Debug)]
struct NamedCrsProperties {
    name: String,
}

#[derive(Serialize, Debug)]
struct GeoJsonFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    bbox: [f64; 4],
    geometry: GeoJsonPolygon,
    properties: FeatureProperties,
}

#[derive(Serialize, Debug)]
struct GeoJsonPolygon {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Serialize, Debug)]
struct FeatureProperties {
    area: f64,
    volume: f64,
}

impl From<&VectorFeature> for GeoJsonFeature {
    fn from(feature: &VectorFeature) -> Self {
        Self {
            kind: "Feature",
            bbox: feature.geometry().bounds(),
            geometry: GeoJsonPolygon {
                kind: "Polygon",
                coordinates: vec![feature.geometry().closed_ring()],
            },
            properties: FeatureProperties {
                area: feature.area(),
                volume: feature.volume(),
            },
        }
    }
}

impl From<&FeatureCollection> for GeoJsonFeatureCollection {
    fn from(collection: &FeatureCollection) -> Self {
        Self {
            kind: "FeatureCollection",
            crs: NamedCrs {
                kind: "name",
                properties: NamedCrsProperties {
                    name: collection.crs().ogc_urn(),
                },
            },
            bbox: collection.bounds(),
            features: collection.iter().map(GeoJsonFeature::from).collect(),
        }
    }
}

/// `FeatureWriter` implementation that writes a GeoJSON `FeatureCollection`. Every feature has a `Polygon` geometry
/// with a single closed ring and the properties `area` and `volume`. The collection carries the CRS of the
/// features as a named `crs` member (`urn:ogc:def:crs:EPSG::<code>`)
pub struct GeoJsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> GeoJsonWriter<W> {
    pub fn from_write(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes this writer and returns the underlying `Write`
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl GeoJsonWriter<BufWriter<File>> {
    /// Creates a new `GeoJsonWriter` that writes to a newly created file at `path`. An existing file is truncated
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).with_context(|| {
            format!(
                "Could not open file {} for writing",
                path.as_ref().display()
            )
        })?;
        Ok(Self::from_write(BufWriter::new(file)))
    }
}

impl<W: Write> FeatureWriter for GeoJsonWriter<W> {
    fn write(&mut self, features: &FeatureCollection) -> Result<()> {
        let collection = GeoJsonFeatureCollection::from(features);
        serde_json::to_writer_pretty(&mut self.writer, &collection)
            .context("Failed to serialize features to GeoJSON")?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush GeoJSON output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use footprints_core::{features::FootprintPolygon, meta::Crs, nalgebra::Vector2};
    use serde_json::Value;

    fn write_to_json(collection: &FeatureCollection) -> Result<Value> {
        let mut writer = GeoJsonWriter::from_write(Vec::new());
        writer.write(collection)?;
        writer.flush()?;
        Ok(serde_json::from_slice(&writer.into_inner())?)
    }

    fn triangle(offset: f64) -> Result<FootprintPolygon> {
        FootprintPolygon::new(vec![
            Vector2::new(offset, 0.0),
            Vector2::new(offset + 4.0, 0.0),
            Vector2::new(offset, 3.0),
        ])
    }

    #[test]
    fn test_write_feature_collection() -> Result<()> {
        let collection = FeatureCollection::from_footprints(
            Crs::from_epsg(2180)?,
            vec![
                (0, triangle(0.0)?, 6.0, 42.0),
                (1, triangle(10.0)?, 6.0, 12.5),
            ],
        )?;
        let json = write_to_json(&collection)?;

        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["crs"]["type"], "name");
        assert_eq!(
            json["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::2180"
        );
        assert_eq!(json["bbox"], serde_json::json!([0.0, 0.0, 14.0, 3.0]));

        let features = json["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        let first = &features[0];
        assert_eq!(first["type"], "Feature");
        assert_eq!(first["geometry"]["type"], "Polygon");
        let ring = first["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], ring[3]);
        assert_approx_eq!(first["properties"]["area"].as_f64().unwrap(), 6.0);
        assert_approx_eq!(features[1]["properties"]["volume"].as_f64().unwrap(), 12.5);
        assert_eq!(first["properties"].as_object().unwrap().len(), 2);
        Ok(())
    }

    #[test]
    fn test_write_empty_collection() -> Result<()> {
        let json = write_to_json(&FeatureCollection::empty(Crs::from_epsg(4326)?))?;
        assert_eq!(json["type"], "FeatureCollection");
        assert!(json["features"].as_array().unwrap().is_empty());
        assert!(json.get("bbox").is_none());
        assert_eq!(
            json["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::4326"
        );
        Ok(())
    }
}
