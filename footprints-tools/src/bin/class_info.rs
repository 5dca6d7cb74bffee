#![warn(clippy::all)]

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{value_t, App, Arg};
use footprints_algorithms::density::{render_histogram, DistanceMetric};
use footprints_core::layout::ClassSet;
use footprints_io::ascii::AsciiFormat;
use footprints_tools::inspection::{run_inspection, DensityConfig, InspectionConfig};
use log::info;

const HISTOGRAM_WIDTH: usize = 60;

fn get_args() -> Result<InspectionConfig> {
    let matches = App::new("class_info")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Prints header information, the number of points per classification and a point density histogram")
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
            Arg::with_name("DENSITY")
                .short("d")
                .long("density")
                .takes_value(true)
                .possible_values(&["2d", "3d"])
                .default_value("2d")
                .help("Count the neighbours of every point within a circle (2d) or a sphere (3d)"),
        )
        .arg(
            Arg::with_name("NO_DENSITY")
                .long("no-density")
                .help("Skip the density analysis"),
        )
        .arg(
            Arg::with_name("RADIUS")
                .short("r")
                .long("radius")
                .takes_value(true)
                .default_value("1.0")
                .help("Search radius for the density analysis"),
        )
        .arg(
            Arg::with_name("GROUND_ONLY")
                .short("g")
                .long("ground-only")
                .help("Restrict the density analysis to ground points (class 2)"),
        )
        .arg(
            Arg::with_name("ASCII_FORMAT")
                .long("ascii-format")
                .takes_value(true)
                .default_value("xyzc")
                .help("Column format of ASCII input files (x, y, z, c for classification, s to skip a column)"),
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
    let mut config = InspectionConfig::new(input);
    config.ascii_format = AsciiFormat::new(
        matches.value_of("ASCII_FORMAT").unwrap_or("xyzc"),
        matches.value_of("DELIMITER"),
    )?;

    if matches.is_present("NO_DENSITY") {
        config.density = None;
    } else {
        let metric = match matches.value_of("DENSITY").unwrap_or("2d") {
            "2d" => DistanceMetric::Planar,
            "3d" => DistanceMetric::Spatial,
            other => bail!("Unknown density mode {}", other),
        };
        config.density = Some(DensityConfig {
            radius: value_t!(matches, "RADIUS", f64)?,
            metric,
            classes: if matches.is_present("GROUND_ONLY") {
                Some(ClassSet::ground())
            } else {
                None
            },
            ..Default::default()
        });
    }

    Ok(config)
}

fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let config = get_args()?;
    let report = run_inspection(&config)?;

    info!("Points: {}", report.point_count);
    if let Some(metadata) = &report.las_metadata {
        info!("LAS version: {}", metadata.version());
        info!("System identifier: {}", metadata.system_identifier());
        info!("Generating software: {}", metadata.generating_software());
        match metadata.point_format() {
            Some(format) => info!("Point format {}: {}", format, metadata.dimensions().join(", ")),
            None => info!("Point dimensions: {}", metadata.dimensions().join(", ")),
        }
    }
    if let Some(bounds) = report.bounds {
        info!("Bounds: min {} max {}", bounds.min(), bounds.max());
    }
    info!("Points per classification:");
    for line in report.class_count_lines() {
        info!("\t{}", line);
    }

    if let Some(density) = report.density {
        match density.summary {
            Some(summary) => {
                info!(
                    "Neighbours within radius {} ({:?}): min {} max {} mean {:.2} median {:.1}",
                    density.radius,
                    density.metric,
                    summary.min,
                    summary.max,
                    summary.mean,
                    summary.median
                );
                for line in render_histogram(&density.histogram, HISTOGRAM_WIDTH) {
                    info!("{}", line);
                }
            }
            None => info!("No points selected for the density analysis"),
        }
    }

    Ok(())
}
