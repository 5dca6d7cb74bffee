use std::path::Path;

use anyhow::{bail, Context, Result};
use footprints_core::{containers::Point, math::AABB, nalgebra::Point3};
use las::{point::Format, Reader};

use crate::base::PointCloudReader;

/// Header information of a LAS/LAZ file
#[derive(Debug, Clone, PartialEq)]
pub struct LASMetadata {
    bounds: AABB<f64>,
    point_count: usize,
    version: String,
    system_identifier: String,
    generating_software: String,
    point_format: Option<u8>,
    dimensions: Vec<String>,
}

impl LASMetadata {
    pub fn bounds(&self) -> AABB<f64> {
        self.bounds
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// LAS version of the file, e.g. `"1.2"`
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn system_identifier(&self) -> &str {
        &self.system_identifier
    }

    pub fn generating_software(&self) -> &str {
        &self.generating_software
    }

    /// Point data record format, or `None` if the combination of attributes matches no format of the LAS standard
    pub fn point_format(&self) -> Option<u8> {
        self.point_format
    }

    /// Names of the attributes stored for every point, in record order
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }
}

impl From<&las::Header> for LASMetadata {
    fn from(header: &las::Header) -> Self {
        let min_point = Point3::new(
            header.bounds().min.x,
            header.bounds().min.y,
            header.bounds().min.z,
        );
        let max_point = Point3::new(
            header.bounds().max.x,
            header.bounds().max.y,
            header.bounds().max.z,
        );
        let version = header.version();
        Self {
            bounds: AABB::from_min_max_unchecked(min_point, max_point),
            point_count: header.number_of_points() as usize,
            version: format!("{}.{}", version.major, version.minor),
            system_identifier: header.system_identifier().to_owned(),
            generating_software: header.generating_software().to_owned(),
            point_format: header.point_format().to_u8().ok(),
            dimensions: dimension_names(header.point_format()),
        }
    }
}

fn dimension_names(format: &Format) -> Vec<String> {
    let mut names = vec![
        "X",
        "Y",
        "Z",
        "intensity",
        "return_number",
        "number_of_returns",
    ];
    if format.is_extended {
        names.extend([
            "synthetic",
            "key_point",
            "withheld",
            "overlap",
            "scanner_channel",
            "scan_direction_flag",
            "edge_of_flight_line",
            "classification",
            "user_data",
            "scan_angle",
            "point_source_id",
        ]);
    } else {
        names.extend([
            "scan_direction_flag",
            "edge_of_flight_line",
            "classification",
            "synthetic",
            "key_point",
            "withheld",
            "scan_angle_rank",
            "user_data",
            "point_source_id",
        ]);
    }
    if format.has_gps_time {
        names.push("gps_time");
    }
    if format.has_color {
        names.extend(["red", "green", "blue"]);
    }
    if format.has_nir {
        names.push("nir");
    }
    if format.has_waveform {
        names.extend([
            "wavepacket_index",
            "wavepacket_offset",
            "wavepacket_size",
            "return_point_wave_location",
            "x_t",
            "y_t",
            "z_t",
        ]);
    }
    names.into_iter().map(str::to_owned).collect()
}

/// `PointCloudReader` implementation for LAS and LAZ files. Coordinates are read in world space, i.e. with scale and
/// offset of the file applied
pub struct LASReader {
    reader: Reader,
    metadata: LASMetadata,
    current_point_index: usize,
}

impl LASReader {
    /// Creates a new `LASReader` by opening the file at the given `path`.
    ///
    /// # Errors
    ///
    /// If `path` does not exist, cannot be opened or does not point to a valid LAS/LAZ file, an error is returned.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let las_reader = Reader::from_path(path.as_ref())
            .with_context(|| format!("Could not open LAS file {}", path.as_ref().display()))?;
        Ok(Self::from_las_reader(las_reader))
    }

    fn from_las_reader(reader: Reader) -> Self {
        let metadata: LASMetadata = reader.header().into();
        Self {
            reader,
            metadata,
            current_point_index: 0,
        }
    }

    pub fn metadata(&self) -> &LASMetadata {
        &self.metadata
    }

    /// Returns the number of remaining points that can be read from this `LASReader`
    pub fn remaining_points(&self) -> usize {
        self.metadata.point_count - self.current_point_index
    }
}

impl PointCloudReader for LASReader {
    fn read(&mut self, count: usize) -> Result<Vec<Point>> {
        let num_points_to_read = usize::min(count, self.remaining_points());
        let mut points = Vec::with_capacity(num_points_to_read);
        for las_point in self.reader.points().take(num_points_to_read) {
            let point_index = self.current_point_index + points.len();
            let las_point =
                las_point.with_context(|| format!("Could not read point {}", point_index))?;
            let point = Point::new(
                las_point.x,
                las_point.y,
                las_point.z,
                u8::from(las_point.classification),
            );
            if !point.is_finite() {
                bail!(
                    "Point {} has non-finite coordinates ({}, {}, {})",
                    point_index,
                    point.x,
                    point.y,
                    point.z
                );
            }
            points.push(point);
        }
        if points.len() < num_points_to_read {
            bail!(
                "LAS file ended after {} points, but its header announced {}",
                self.current_point_index + points.len(),
                self.metadata.point_count
            );
        }
        self.current_point_index += points.len();
        Ok(points)
    }

    fn point_count(&self) -> Option<usize> {
        Some(self.metadata.point_count)
    }

    fn bounds(&self) -> Option<AABB<f64>> {
        Some(self.metadata.bounds)
    }
}
