use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{Context, Result};
use footprints_algorithms::{
    classification::{count_by_class, filter_by_classes},
    density::{
        density_histogram, point_densities, DensitySummary, DistanceMetric, HistogramBin,
        DEFAULT_HISTOGRAM_BINS,
    },
};
use footprints_core::{
    containers::PointSet,
    error::ConfigError,
    layout::{class_name, ClassSet},
    math::AABB,
    meta::Crs,
};
use footprints_io::{ascii::AsciiFormat, base::read_all_with_metadata, las::LASMetadata};
use log::{debug, info};

pub const DEFAULT_DENSITY_RADIUS: f64 = 1.0;

/// Settings for the point density part of [`run_inspection`]
#[derive(Debug, Clone, PartialEq)]
pub struct DensityConfig {
    pub radius: f64,
    pub metric: DistanceMetric,
    /// Only points of these classes are counted, both as query points and as neighbours. `None` uses all points
    pub classes: Option<ClassSet>,
    pub bins: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_DENSITY_RADIUS,
            metric: DistanceMetric::Planar,
            classes: None,
            bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectionConfig {
    pub input: PathBuf,
    pub ascii_format: AsciiFormat,
    /// `None` skips the density analysis
    pub density: Option<DensityConfig>,
}

impl InspectionConfig {
    /// Inspection of `input` with a planar density analysis over all points
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            ascii_format: AsciiFormat::default(),
            density: Some(DensityConfig::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityReport {
    pub metric: DistanceMetric,
    pub radius: f64,
    /// `None` if no point was selected for the density analysis
    pub summary: Option<DensitySummary>,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectionReport {
    /// Header information of LAS/LAZ input, `None` for ASCII files
    pub las_metadata: Option<LASMetadata>,
    pub point_count: usize,
    pub bounds: Option<AABB<f64>>,
    pub class_counts: BTreeMap<u8, usize>,
    pub density: Option<DensityReport>,
}

impl InspectionReport {
    /// One line per classification code that occurs in the point cloud, e.g. `"6 (building): 1234 points"`
    pub fn class_count_lines(&self) -> Vec<String> {
        self.class_counts
            .iter()
            .map(|(code, count)| format!("{} ({}): {} points", code, class_name(*code), count))
            .collect()
    }
}

/// Reads the point cloud at `config.input` and counts its points per classification code. If `config.density` is
/// set (the default), also computes the number of neighbours of every selected point and summarizes them in a histogram
pub fn run_inspection(config: &InspectionConfig) -> Result<InspectionReport> {
    if let Some(density) = &config.density {
        if !density.radius.is_finite() || density.radius <= 0.0 {
            return Err(ConfigError::InvalidRadius(density.radius).into());
        }
    }

    let (points, las_metadata) =
        read_all_with_metadata(&config.input, config.ascii_format.clone())?;
    // Class statistics do not depend on the CRS, any valid code will do
    let point_set = PointSet::try_new(points, Crs::from_epsg(4326)?)
        .with_context(|| format!("Invalid points in {}", config.input.display()))?;
    info!("Read {} points from {}", point_set.len(), config.input.display());

    let class_counts = count_by_class(&point_set);
    let density = match &config.density {
        Some(density_config) => Some(analyze_density(&point_set, density_config)?),
        None => None,
    };

    Ok(InspectionReport {
        las_metadata,
        point_count: point_set.len(),
        bounds: point_set.bounds(),
        class_counts,
        density,
    })
}

fn analyze_density(points: &PointSet, config: &DensityConfig) -> Result<DensityReport> {
    let selected = match &config.classes {
        Some(classes) => filter_by_classes(points, classes),
        None => points.clone(),
    };
    debug!(
        "Computing {:?} densities of {} points with radius {}",
        config.metric,
        selected.len(),
        config.radius
    );
    let densities = point_densities(selected.points(), config.radius, config.metric)?;
    Ok(DensityReport {
        metric: config.metric,
        radius: config.radius,
        summary: DensitySummary::from_densities(&densities),
        histogram: density_histogram(&densities, config.bins),
    })
}
