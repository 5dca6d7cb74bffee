use footprints_core::{containers::Point, error::ConfigError};
use rayon::prelude::*;

pub use crate::neighborhood::DistanceMetric;
use crate::neighborhood::NeighborhoodIndex;

/// Number of histogram bins used by the `class_info` tool
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// For every point, the number of other points within `radius` (inclusive), measured with `metric`. A
/// [`DistanceMetric::Planar`] density counts neighbours per circle, a [`DistanceMetric::Spatial`] density per
/// sphere. Fails if `radius` is not a finite value greater than zero
/// ```
/// # use footprints_core::containers::Point;
/// # use footprints_algorithms::density::*;
/// let points = vec![
///     Point::new(0.0, 0.0, 0.0, 2),
///     Point::new(0.5, 0.0, 9.0, 2),
///     Point::new(5.0, 0.0, 0.0, 2),
/// ];
/// assert_eq!(point_densities(&points, 1.0, DistanceMetric::Planar).unwrap(), vec![1, 1, 0]);
/// assert_eq!(point_densities(&points, 1.0, DistanceMetric::Spatial).unwrap(), vec![0, 0, 0]);
/// ```
pub fn point_densities(
    points: &[Point],
    radius: f64,
    metric: DistanceMetric,
) -> Result<Vec<usize>, ConfigError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ConfigError::InvalidRadius(radius));
    }
    let index = NeighborhoodIndex::build(points, metric);
    Ok(points
        .par_iter()
        .map(|point| index.within_radius(point, radius).len() - 1)
        .collect())
}

/// Minimum, maximum, mean and median of a set of point densities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensitySummary {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
}

impl DensitySummary {
    /// Summarizes `densities`, or returns `None` if there are none
    pub fn from_densities(densities: &[usize]) -> Option<Self> {
        if densities.is_empty() {
            return None;
        }
        let mut sorted = densities.to_vec();
        sorted.sort_unstable();
        let count = sorted.len();
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) as f64 / 2.0
        } else {
            sorted[count / 2] as f64
        };
        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sorted.iter().sum::<usize>() as f64 / count as f64,
            median,
        })
    }
}

/// One bin of a density histogram, covering the densities `lower..upper`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Sorts `densities` into `bins` bins of equal width between the minimum and maximum density. The maximum falls into
/// the last bin. Returns no bins for empty input or `bins == 0`
pub fn density_histogram(densities: &[usize], bins: usize) -> Vec<HistogramBin> {
    let summary = match DensitySummary::from_densities(densities) {
        Some(summary) if bins > 0 => summary,
        _ => return vec![],
    };
    let min = summary.min as f64;
    let range = (summary.max - summary.min) as f64;
    // All densities equal: a single bin of width one
    let width = if range > 0.0 { range / bins as f64 } else { 1.0 };
    let bins = if range > 0.0 { bins } else { 1 };

    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|bin| HistogramBin {
            lower: min + bin as f64 * width,
            upper: min + (bin + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for density in densities {
        let bin = (((*density as f64) - min) / width) as usize;
        histogram[bin.min(bins - 1)].count += 1;
    }
    histogram
}

/// Renders `histogram` as text, one line per bin, with bars scaled so that the largest bin is `width` characters wide
pub fn render_histogram(histogram: &[HistogramBin], width: usize) -> Vec<String> {
    let largest = histogram.iter().map(|bin| bin.count).max().unwrap_or(0);
    histogram
        .iter()
        .map(|bin| {
            let bar_length = if largest == 0 {
                0
            } else {
                (bin.count * width + largest - 1) / largest
            };
            format!(
                "{:>8.1} - {:>8.1} | {:<width$} {}",
                bin.lower,
                bin.upper,
                "#".repeat(bar_length),
                bin.count,
                width = width
            )
        })
        .collect()
}
