#![warn(clippy::all)]

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{value_t, App, Arg};
use footprints_core::layout::ClassSet;
use footprints_io::ascii::AsciiFormat;
use footprints_tools::extraction::{
    run_extraction, ExtractionConfig, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_NAME,
};
use log::info;

fn get_args() -> Result<ExtractionConfig> {
    let ascii_format_help = format!(
        "Column format of ASCII input files. {}",
        AsciiFormat::format_literals()
    );
    let matches = App::new("extract_buildings")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extracts building footprints with area and volume from a classified point cloud and writes them as GeoJSON")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("FILE")
                .help("Input point cloud file (.las, .laz, .txt, .xyz or .csv)")
                .required(true),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("DIR")
                .default_value(DEFAULT_OUTPUT_DIR)
                .help("Output directory, created if it does not exist"),
        )
        .arg(
            Arg::with_name("OUTPUT_NAME")
                .long("output-name")
                .takes_value(true)
                .value_name("NAME")
                .default_value(DEFAULT_OUTPUT_NAME)
                .help("Name of the GeoJSON file inside the output directory"),
        )
        .arg(
            Arg::with_name("EPS")
                .long("eps")
                .takes_value(true)
                .default_value("3.5")
                .help("Neighbourhood radius for clustering, in units of the input CRS"),
        )
        .arg(
            Arg::with_name("MIN_POINTS")
                .long("min-points")
                .takes_value(true)
                .default_value("35")
                .help("Minimum number of points within eps (the point itself included) that makes a point a core point"),
        )
        .arg(
            Arg::with_name("EPSG")
                .long("epsg")
                .takes_value(true)
                .default_value("2180")
                .help("EPSG code of the coordinate reference system of the input"),
        )
        .arg(
            Arg::with_name("CLASSES")
                .long("classes")
                .takes_value(true)
                .default_value("6")
                .help("Comma-separated classification codes of building points"),
        )
        .arg(
            Arg::with_name("SORT_CLUSTERS")
                .long("sort-clusters")
                .help("Number the buildings by the position of their centroid instead of the input order"),
        )
        .arg(
            Arg::with_name("ASCII_FORMAT")
                .long("ascii-format")
                .takes_value(true)
                .default_value("xyzc")
                .help(&ascii_format_help),
        )
        .arg(
            Arg::with_name("DELIMITER")
                .long("delimiter")
                .takes_value(true)
                .help("Column delimiter of ASCII input files. Whitespace and commas if omitted"),
        )
        .get_matches();

    let input = PathBuf::from(
        matches
            .value_of("INPUT")
            .ok_or_else(|| anyhow!("Missing input file"))?,
    );
    let mut config = ExtractionConfig::new(input);
    if let Some(output_dir) = matches.value_of("OUTPUT") {
        config.output_dir = output_dir.into();
    }
    if let Some(output_name) = matches.value_of("OUTPUT_NAME") {
        config.output_name = output_name.to_owned();
    }
    config.eps = value_t!(matches, "EPS", f64)?;
    config.min_points = value_t!(matches, "MIN_POINTS", usize)?;
    config.epsg = value_t!(matches, "EPSG", u32)?;
    config.classes = matches
        .value_of("CLASSES")
        .unwrap_or("6")
        .parse::<ClassSet>()?;
    config.sort_clusters = matches.is_present("SORT_CLUSTERS");
    config.ascii_format = AsciiFormat::new(
        matches.value_of("ASCII_FORMAT").unwrap_or("xyzc"),
        matches.value_of("DELIMITER"),
    )?;

    Ok(config)
}

fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let config = get_args()?;
    let report = run_extraction(&config)?;

    info!(
        "{} of {} input points are building points, grouped into {} clusters ({} noise points)",
        report.building_points, report.input_points, report.cluster_count, report.noise_points
    );
    if !report.skipped_clusters.is_empty() {
        info!(
            "{} degenerate clusters were skipped: {:?}",
            report.skipped_clusters.len(),
            report.skipped_clusters
        );
    }
    info!(
        "{} buildings written to {}",
        report.feature_count,
        report.output_path.display()
    );

    Ok(())
}
