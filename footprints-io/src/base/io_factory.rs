use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{anyhow, bail, Result};
use footprints_core::{containers::Point, features::FeatureCollection, math::AABB};

use crate::{
    ascii::{AsciiFormat, AsciiReader},
    geojson::GeoJsonWriter,
    las::{LASMetadata, LASReader},
};

use super::{FeatureWriter, PointCloudReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SupportedFileExtensions {
    Las,
    Ascii,
    GeoJson,
}

/// Returns a lookup value for the file extension of the given file path
fn get_extension_lookup(path: &Path) -> Result<Option<SupportedFileExtensions>> {
    let extension = match path.extension() {
        Some(ex) => ex,
        None => return Ok(None),
    };
    let extension_str = extension.to_str().ok_or_else(|| {
        anyhow!(
            "File extension of path {} is no valid Unicode string",
            path.display()
        )
    })?;
    match extension_str.to_lowercase().as_str() {
        "las" | "laz" => Ok(Some(SupportedFileExtensions::Las)),
        "txt" | "xyz" | "csv" => Ok(Some(SupportedFileExtensions::Ascii)),
        "geojson" | "json" => Ok(Some(SupportedFileExtensions::GeoJson)),
        _ => Ok(None),
    }
}

/// A `PointCloudReader` for any of the supported point cloud formats, selected by file extension:
/// `.las`/`.laz` for LAS/LAZ and `.txt`/`.xyz`/`.csv` for ASCII files
pub enum GenericPointReader {
    LAS(LASReader),
    Ascii(AsciiReader<BufReader<File>>),
}

impl GenericPointReader {
    /// Opens the point cloud file at `path`. ASCII files are read with the default [`AsciiFormat`]
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_file_with_ascii_format(path, AsciiFormat::default())
    }

    /// Opens the point cloud file at `path`, reading ASCII files with the given `ascii_format`
    pub fn open_file_with_ascii_format<P: AsRef<Path>>(
        path: P,
        ascii_format: AsciiFormat,
    ) -> Result<Self> {
        let extension = get_extension_lookup(path.as_ref())?;
        match extension {
            Some(SupportedFileExtensions::Las) => {
                let reader = LASReader::from_path(path)?;
                Ok(Self::LAS(reader))
            }
            Some(SupportedFileExtensions::Ascii) => {
                let reader = AsciiReader::from_path(path, ascii_format)?;
                Ok(Self::Ascii(reader))
            }
            _ => bail!(
                "Unsupported file format of file {}",
                path.as_ref().display()
            ),
        }
    }

    /// Header information of LAS/LAZ files. ASCII files have no header, so this is `None` for them
    pub fn las_metadata(&self) -> Option<&LASMetadata> {
        match self {
            GenericPointReader::LAS(reader) => Some(reader.metadata()),
            GenericPointReader::Ascii(_) => None,
        }
    }
}

impl PointCloudReader for GenericPointReader {
    fn read(&mut self, count: usize) -> Result<Vec<Point>> {
        match self {
            GenericPointReader::LAS(reader) => reader.read(count),
            GenericPointReader::Ascii(reader) => reader.read(count),
        }
    }

    fn point_count(&self) -> Option<usize> {
        match self {
            GenericPointReader::LAS(reader) => reader.point_count(),
            GenericPointReader::Ascii(reader) => reader.point_count(),
        }
    }

    fn bounds(&self) -> Option<AABB<f64>> {
        match self {
            GenericPointReader::LAS(reader) => reader.bounds(),
            GenericPointReader::Ascii(reader) => reader.bounds(),
        }
    }
}

/// A `FeatureWriter` for any of the supported vector formats, selected by file extension. Currently this is GeoJSON
/// (`.geojson`/`.json`)
pub enum GenericFeatureWriter {
    GeoJson(GeoJsonWriter<BufWriter<File>>),
}

impl GenericFeatureWriter {
    /// Creates the file at `path` and a matching writer for it
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let extension = get_extension_lookup(path.as_ref())?;
        match extension {
            Some(SupportedFileExtensions::GeoJson) => {
                Ok(Self::GeoJson(GeoJsonWriter::from_path(path)?))
            }
            _ => bail!(
                "Unsupported file format of file {}",
                path.as_ref().display()
            ),
        }
    }
}

impl FeatureWriter for GenericFeatureWriter {
    fn write(&mut self, features: &FeatureCollection) -> Result<()> {
        match self {
            GenericFeatureWriter::GeoJson(writer) => writer.write(features),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            GenericFeatureWriter::GeoJson(writer) => writer.flush(),
        }
    }
}
