use std::{
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use anyhow::{anyhow, bail, Context, Result};
use footprints_core::{containers::Point, layout::CLASS_NEVER_CLASSIFIED};

use crate::base::PointCloudReader;

/// Format string used for ASCII files if none is given: x, y and z coordinate followed by the classification
pub const DEFAULT_ASCII_FORMAT: &str = "xyzc";

// One column of an ASCII point record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AsciiField {
    Skip,
    CoordinateX,
    CoordinateY,
    CoordinateZ,
    Classification,
}

impl AsciiField {
    fn literal(&self) -> char {
        match self {
            AsciiField::Skip => 's',
            AsciiField::CoordinateX => 'x',
            AsciiField::CoordinateY => 'y',
            AsciiField::CoordinateZ => 'z',
            AsciiField::Classification => 'c',
        }
    }
}

impl Display for AsciiField {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Column layout of an ASCII point cloud file.
///
/// The layout is given as a format string with one literal per column:
/// - `x`, `y`, `z`: coordinates (required, each exactly once)
/// - `c`: classification code (optional, points without it are never classified)
/// - `s`: skip this column
///
/// Columns are separated by `delimiter`. Without a delimiter, any run of whitespace and commas separates columns.
/// Columns after the last literal of the format string are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiFormat {
    fields: Vec<AsciiField>,
    delimiter: Option<String>,
}

impl AsciiFormat {
    /// Parses the given format string
    /// ```
    /// # use footprints_io::ascii::AsciiFormat;
    /// assert!(AsciiFormat::new("sxyzc", Some(";")).is_ok());
    /// assert!(AsciiFormat::new("xyi", None).is_err());
    /// assert!(AsciiFormat::new("xyzz", None).is_err());
    /// ```
    pub fn new(format: &str, delimiter: Option<&str>) -> Result<Self> {
        let mut fields = Vec::with_capacity(format.len());
        for character in format.chars() {
            let field = match character {
                's' => AsciiField::Skip,
                'x' => AsciiField::CoordinateX,
                'y' => AsciiField::CoordinateY,
                'z' => AsciiField::CoordinateZ,
                'c' => AsciiField::Classification,
                _ => bail!(
                    "FormatError can't interpret format literal '{}' in format string '{}'.",
                    character,
                    format
                ),
            };
            if field != AsciiField::Skip && fields.contains(&field) {
                bail!(
                    "FormatError format literal '{}' appears more than once in format string '{}'.",
                    character,
                    format
                );
            }
            fields.push(field);
        }
        for required in [
            AsciiField::CoordinateX,
            AsciiField::CoordinateY,
            AsciiField::CoordinateZ,
        ] {
            if !fields.contains(&required) {
                bail!(
                    "FormatError format string '{}' is missing the format literal '{}'.",
                    format,
                    required.literal()
                );
            }
        }
        if let Some(delimiter) = delimiter {
            if delimiter.is_empty() {
                bail!("FormatError the column delimiter must not be empty.");
            }
        }
        Ok(Self {
            fields,
            delimiter: delimiter.map(str::to_owned),
        })
    }

    /// Human readable description of the supported format literals
    pub fn format_literals() -> &'static str {
        "The following literals can be interpreted from an ASCII file:
            s - skip this column
            x - x coordinate
            y - y coordinate
            z - z coordinate
            c - classification"
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match &self.delimiter {
            Some(delimiter) => line.split(delimiter.as_str()).map(str::trim).collect(),
            None => line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|column| !column.is_empty())
                .collect(),
        }
    }

    fn parse_point(&self, line: &str) -> Result<Point> {
        let columns = self.split(line);
        if columns.len() < self.fields.len() {
            bail!(
                "Input format string expected {} items in the line. Found End-of-Line after {} items.",
                self.fields.len(),
                columns.len()
            );
        }
        let mut point = Point::new(0.0, 0.0, 0.0, CLASS_NEVER_CLASSIFIED);
        for (value_str, field) in columns.iter().zip(self.fields.iter()) {
            match field {
                AsciiField::Skip => {}
                AsciiField::CoordinateX => {
                    point.x = parse_string(value_str).with_context(|| generate_parse_error(field))?
                }
                AsciiField::CoordinateY => {
                    point.y = parse_string(value_str).with_context(|| generate_parse_error(field))?
                }
                AsciiField::CoordinateZ => {
                    point.z = parse_string(value_str).with_context(|| generate_parse_error(field))?
                }
                AsciiField::Classification => {
                    point.classification =
                        parse_string(value_str).with_context(|| generate_parse_error(field))?
                }
            }
        }
        if !point.is_finite() {
            bail!(
                "Point has non-finite coordinates ({}, {}, {})",
                point.x,
                point.y,
                point.z
            );
        }
        Ok(point)
    }
}

impl Default for AsciiFormat {
    fn default() -> Self {
        Self {
            fields: vec![
                AsciiField::CoordinateX,
                AsciiField::CoordinateY,
                AsciiField::CoordinateZ,
                AsciiField::Classification,
            ],
            delimiter: None,
        }
    }
}

fn parse_string<V: FromStr>(value_str: &str) -> Result<V> {
    value_str.parse::<V>().map_err(|_| {
        anyhow!(
            "ParseError expected {} found '{}'.",
            std::any::type_name::<V>(),
            value_str
        )
    })
}

fn generate_parse_error(field: &AsciiField) -> String {
    format!(
        "ParseError at parsing {} for format literal '{}'.",
        field,
        field.literal()
    )
}

/// `PointCloudReader` implementation for ASCII files with one point per line. Empty lines and lines starting with
/// `#` are ignored
pub struct AsciiReader<R: BufRead> {
    reader: R,
    format: AsciiFormat,
    line_number: usize,
}

impl<R: BufRead> AsciiReader<R> {
    pub fn from_read(read: R, format: AsciiFormat) -> Self {
        Self {
            reader: read,
            format,
            line_number: 0,
        }
    }
}

impl AsciiReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P, format: AsciiFormat) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Could not open file {}", path.as_ref().display()))?;
        Ok(Self::from_read(BufReader::new(file), format))
    }
}

impl<R: BufRead> PointCloudReader for AsciiReader<R> {
    fn read(&mut self, count: usize) -> Result<Vec<Point>> {
        let mut points = Vec::new();
        let mut line = String::new();
        while points.len() < count {
            line.clear();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .with_context(|| format!("ReadError in line {}.", self.line_number + 1))?;
            if bytes_read == 0 {
                break;
            }
            self.line_number += 1;
            let content = line.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            let point = self
                .format
                .parse_point(content)
                .with_context(|| format!("ReadError in line {}.", self.line_number))?;
            points.push(point);
        }
        Ok(points)
    }

    fn point_count(&self) -> Option<usize> {
        None
    }
}
