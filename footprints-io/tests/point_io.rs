use std::fs;

use anyhow::Result;
use assert_approx_eq::assert_approx_eq;
use footprints_core::{
    containers::Point, features::FeatureCollection, features::FootprintPolygon, meta::Crs,
    nalgebra::Vector2,
};
use footprints_io::{
    ascii::AsciiFormat,
    base::{
        read_all, read_all_with_ascii_format, read_all_with_metadata, write_features,
        GenericPointReader, PointCloudReader,
    },
};
use las::{
    point::{Classification, Format},
    Builder, Header,
};
use tempfile::TempDir;

fn write_las_file(dir: &TempDir, name: &str, points: &[Point]) -> Result<std::path::PathBuf> {
    let path = dir.path().join(name);
    {
        let mut writer = las::Writer::from_path(&path, Header::default())?;
        for point in points {
            writer.write_point(las::Point {
                x: point.x,
                y: point.y,
                z: point.z,
                classification: Classification::new(point.classification)?,
                ..Default::default()
            })?;
        }
        writer.close()?;
    }
    Ok(path)
}

#[test]
fn test_read_las_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let expected = vec![
        Point::new(10.0, 20.0, 1.5, 2),
        Point::new(11.25, 20.5, 7.75, 6),
        Point::new(12.5, 21.0, 8.0, 6),
    ];
    let path = write_las_file(&dir, "tile.las", &expected)?;

    let mut reader = GenericPointReader::open_file(&path)?;
    assert_eq!(reader.point_count(), Some(3));
    let bounds = reader.bounds().expect("LAS files have bounds");
    assert_approx_eq!(bounds.min().x, 10.0, 1e-3);
    assert_approx_eq!(bounds.max().z, 8.0, 1e-3);

    let points = reader.read(10)?;
    assert_eq!(points.len(), 3);
    for (actual, expected) in points.iter().zip(expected.iter()) {
        // LAS stores coordinates with a scale of 0.001
        assert_approx_eq!(actual.x, expected.x, 1e-3);
        assert_approx_eq!(actual.y, expected.y, 1e-3);
        assert_approx_eq!(actual.z, expected.z, 1e-3);
        assert_eq!(actual.classification, expected.classification);
    }
    assert!(reader.read(10)?.is_empty());
    Ok(())
}

#[test]
fn test_read_all_las_in_chunks_matches_read_all() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let expected = (0..25)
        .map(|i| Point::new(i as f64, 2.0 * i as f64, 0.5, if i % 2 == 0 { 6 } else { 2 }))
        .collect::<Vec<_>>();
    let path = write_las_file(&dir, "chunks.las", &expected)?;

    let mut reader = GenericPointReader::open_file(&path)?;
    let mut chunked = reader.read(10)?;
    chunked.extend(reader.read(10)?);
    chunked.extend(reader.read(10)?);

    let all = read_all(&path)?;
    assert_eq!(all.len(), 25);
    assert_eq!(chunked, all);
    Ok(())
}

#[test]
fn test_las_header_information() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("header.las");
    {
        let mut builder = Builder::from((1, 2));
        builder.system_identifier = "ALS survey".to_owned();
        builder.generating_software = "footprints tests".to_owned();
        builder.point_format = Format::new(1)?;
        let mut writer = las::Writer::from_path(&path, builder.into_header()?)?;
        for i in 0..4 {
            writer.write_point(las::Point {
                x: i as f64,
                y: 1.0,
                z: 2.0,
                classification: Classification::new(6)?,
                gps_time: Some(i as f64),
                ..Default::default()
            })?;
        }
        writer.close()?;
    }

    let (points, metadata) = read_all_with_metadata(&path, AsciiFormat::default())?;
    assert_eq!(points.len(), 4);
    let metadata = metadata.expect("LAS files have a header");
    assert_eq!(metadata.point_count(), 4);
    assert_eq!(metadata.version(), "1.2");
    assert_eq!(metadata.system_identifier(), "ALS survey");
    assert_eq!(metadata.generating_software(), "footprints tests");
    assert_eq!(metadata.point_format(), Some(1));
    assert_eq!(metadata.dimensions().len(), 16);
    assert_eq!(metadata.dimensions()[8], "classification");
    assert_eq!(metadata.dimensions().last().map(String::as_str), Some("gps_time"));
    Ok(())
}

#[test]
fn test_read_ascii_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("points.xyz");
    fs::write(
        &path,
        "# x y z classification\n1.0 2.0 3.0 6\n\n4.5 5.5 6.5 2\n",
    )?;
    let points = read_all(&path)?;
    assert_eq!(
        points,
        vec![Point::new(1.0, 2.0, 3.0, 6), Point::new(4.5, 5.5, 6.5, 2)]
    );
    let (_, metadata) = read_all_with_metadata(&path, AsciiFormat::default())?;
    assert!(metadata.is_none());
    Ok(())
}

#[test]
fn test_read_csv_with_custom_format() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("points.csv");
    fs::write(&path, "6;1.0;2.0;3.0\n2;4.0;5.0;6.0\n")?;
    let points = read_all_with_ascii_format(&path, AsciiFormat::new("cxyz", Some(";"))?)?;
    assert_eq!(
        points,
        vec![Point::new(1.0, 2.0, 3.0, 6), Point::new(4.0, 5.0, 6.0, 2)]
    );
    Ok(())
}

#[test]
fn test_read_missing_file_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    assert!(read_all(dir.path().join("missing.las")).is_err());
    assert!(read_all(dir.path().join("missing.txt")).is_err());
    Ok(())
}

#[test]
fn test_read_malformed_ascii_file_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.txt");
    fs::write(&path, "1.0 2.0 3.0 6\n1.0 two 3.0 6\n")?;
    let error = read_all(&path).unwrap_err();
    assert!(format!("{:?}", error).contains("line 2"));
    Ok(())
}

#[test]
fn test_write_features_to_geojson_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("buildings.geojson");
    let square = FootprintPolygon::new(vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(2.0, 0.0),
        Vector2::new(2.0, 2.0),
        Vector2::new(0.0, 2.0),
    ])?;
    let collection =
        FeatureCollection::from_footprints(Crs::from_epsg(2180)?, vec![(0, square, 4.0, 20.0)])?;
    write_features(&path, &collection)?;

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["features"].as_array().map(|f| f.len()), Some(1));
    assert_approx_eq!(json["features"][0]["properties"]["area"].as_f64().unwrap(), 4.0);
    Ok(())
}
