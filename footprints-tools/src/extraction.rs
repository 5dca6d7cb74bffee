use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use footprints_algorithms::{
    classification::filter_by_classes,
    dbscan::{dbscan, DbscanParameters},
    footprint::extract_footprints,
};
use footprints_core::{
    containers::PointSet, error::ConfigError, layout::ClassSet, meta::Crs,
};
use footprints_io::{
    ascii::AsciiFormat,
    base::{read_all_with_ascii_format, write_features},
};
use log::info;

pub const DEFAULT_EPS: f64 = 3.5;
pub const DEFAULT_MIN_POINTS: usize = 35;
pub const DEFAULT_EPSG: u32 = 2180;
pub const DEFAULT_OUTPUT_DIR: &str = "out";
pub const DEFAULT_OUTPUT_NAME: &str = "buildings.geojson";

/// Everything needed for one extraction run. The raw values are validated by [`run_extraction`] before any file is
/// touched
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub eps: f64,
    pub min_points: usize,
    pub epsg: u32,
    pub classes: ClassSet,
    pub sort_clusters: bool,
    pub ascii_format: AsciiFormat,
}

impl ExtractionConfig {
    /// Creates a configuration for the given input file with all other values at their defaults: eps 3.5,
    /// 35 points per core neighbourhood, EPSG:2180, class 6 (building), output `out/buildings.geojson`
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_name: DEFAULT_OUTPUT_NAME.to_owned(),
            eps: DEFAULT_EPS,
            min_points: DEFAULT_MIN_POINTS,
            epsg: DEFAULT_EPSG,
            classes: ClassSet::buildings(),
            sort_clusters: false,
            ascii_format: AsciiFormat::default(),
        }
    }

    /// Path of the output file, i.e. `output_name` inside `output_dir`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    fn validate(&self) -> Result<(DbscanParameters, Crs), ConfigError> {
        let parameters = DbscanParameters::new(self.eps, self.min_points)?;
        let crs = Crs::from_epsg(self.epsg)?;
        Ok((parameters, crs))
    }
}

/// Summary of one extraction run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub input_points: usize,
    pub building_points: usize,
    pub cluster_count: usize,
    pub noise_points: usize,
    pub feature_count: usize,
    /// Ids of the clusters that produced no feature because their geometry was degenerate
    pub skipped_clusters: Vec<usize>,
    pub output_path: PathBuf,
}

/// Runs the full extraction: reads `config.input`, keeps the points of `config.classes`, clusters them, computes
/// footprint, area and volume per cluster and writes one GeoJSON feature per building into
/// [`ExtractionConfig::output_path`]. The output directory is created if it does not exist.
///
/// # Errors
///
/// Invalid parameters are reported as a [`ConfigError`] before the input is read. Errors reading the input or writing
/// the output abort the run; a partially written output file is removed.
pub fn run_extraction(config: &ExtractionConfig) -> Result<ExtractionReport> {
    let (parameters, crs) = config.validate()?;
    let t_start = Instant::now();

    info!("Reading points from {}", config.input.display());
    let points = read_all_with_ascii_format(&config.input, config.ascii_format.clone())?;
    let point_set = PointSet::try_new(points, crs)
        .with_context(|| format!("Invalid points in {}", config.input.display()))?;
    info!("Read {} points", point_set.len());

    let buildings = filter_by_classes(&point_set, &config.classes);
    info!(
        "{} points belong to the classes {}",
        buildings.len(),
        config.classes
    );

    info!(
        "Clustering with eps {} and min_points {}",
        parameters.eps(),
        parameters.min_points()
    );
    let mut clustering = dbscan(buildings.points(), &parameters);
    if config.sort_clusters {
        clustering = clustering.sorted_by_centroid(buildings.points());
    }
    info!(
        "Found {} clusters and {} noise points",
        clustering.cluster_count(),
        clustering.noise_point_count()
    );

    let extraction = extract_footprints(buildings.points(), &clustering);
    let skipped_clusters = extraction
        .skipped()
        .iter()
        .map(|skipped| skipped.cluster_id)
        .collect::<Vec<_>>();
    let features = extraction.into_feature_collection(crs)?;

    create_output_dir(&config.output_dir)?;
    let output_path = config.output_path();
    write_features(&output_path, &features)?;
    info!(
        "Wrote {} buildings to {} in {:.2}s",
        features.len(),
        output_path.display(),
        t_start.elapsed().as_secs_f64()
    );

    Ok(ExtractionReport {
        input_points: point_set.len(),
        building_points: buildings.len(),
        cluster_count: clustering.cluster_count(),
        noise_points: clustering.noise_point_count(),
        feature_count: features.len(),
        skipped_clusters,
        output_path,
    })
}

fn create_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Could not create output directory {}", dir.display()))?;
    }
    Ok(())
}
