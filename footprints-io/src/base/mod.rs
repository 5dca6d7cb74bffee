use std::{fs, path::Path};

use anyhow::{Context, Result};
use footprints_core::{containers::Point, features::FeatureCollection};
use log::{debug, warn};

use crate::{ascii::AsciiFormat, las::LASMetadata};

mod reader;
pub use self::reader::*;

mod writer;
pub use self::writer::*;

mod io_factory;
pub use self::io_factory::*;

/// Try to read all points in the given point cloud file. This function uses `GenericPointReader` to determine the
/// file type from the file extension of `path`. ASCII files are read with the default [`AsciiFormat`], use
/// `read_all_with_ascii_format` for other column layouts.
pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<Point>> {
    read_all_with_ascii_format(path, AsciiFormat::default())
}

/// Try to read all points in the given point cloud file, reading ASCII files with `ascii_format`. Otherwise behaves
/// exactly like `read_all`.
pub fn read_all_with_ascii_format<P: AsRef<Path>>(
    path: P,
    ascii_format: AsciiFormat,
) -> Result<Vec<Point>> {
    let (points, _) = read_all_with_metadata(path, ascii_format)?;
    Ok(points)
}

/// Like `read_all_with_ascii_format`, but also returns the header information if `path` is a LAS/LAZ file
pub fn read_all_with_metadata<P: AsRef<Path>>(
    path: P,
    ascii_format: AsciiFormat,
) -> Result<(Vec<Point>, Option<LASMetadata>)> {
    let mut reader = GenericPointReader::open_file_with_ascii_format(path.as_ref(), ascii_format)
        .with_context(|| {
            format!(
                "Could not create appropriate reader for point cloud file {}",
                path.as_ref().display()
            )
        })?;
    let metadata = reader.las_metadata().cloned();
    // ASCII files have no header, so their number of points is only known once everything is read
    let num_points = reader.point_count().unwrap_or(usize::MAX);
    let points = reader.read(num_points).with_context(|| {
        format!(
            "Could not read points from point cloud file {}",
            path.as_ref().display()
        )
    })?;
    debug!("Read {} points from {}", points.len(), path.as_ref().display());
    Ok((points, metadata))
}

/// Writes all features of the given `FeatureCollection` into the file at `path`, choosing the output format from the
/// file extension. If writing fails after the file was created, the partially written file is removed before the
/// error is returned.
pub fn write_features<P: AsRef<Path>>(path: P, features: &FeatureCollection) -> Result<()> {
    let path = path.as_ref();
    let writer = GenericFeatureWriter::open_file(path).with_context(|| {
        format!(
            "Could not create appropriate writer for feature file {}",
            path.display()
        )
    })?;
    write_or_remove(path, writer, features)
        .with_context(|| format!("Failed to write features to {}", path.display()))
}

/// Writes and flushes `features` with `writer`, which writes to the file at `path`. On failure, the writer is
/// closed and the file at `path` is removed
fn write_or_remove<W: FeatureWriter>(
    path: &Path,
    mut writer: W,
    features: &FeatureCollection,
) -> Result<()> {
    let result = writer.write(features).and_then(|_| writer.flush());
    drop(writer);
    if result.is_err() && path.exists() {
        if let Err(remove_error) = fs::remove_file(path) {
            warn!(
                "Could not remove partially written file {}: {}",
                path.display(),
                remove_error
            );
        }
    }
    result
}
