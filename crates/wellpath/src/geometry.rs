//! Casing/riser/liner/open-hole boundaries and measured-depth classification.

use crate::error::{Result, WellError};
use std::io::{BufRead, BufReader, Read};

const METERS_PER_INCH: f64 = 0.0254;

/// The end of one pipe type along the well.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBoundary {
    pub label: String,
    /// Inner radius in meters.
    pub radius: f64,
    /// Deepest measured depth still covered by this pipe type.
    pub measured_depth_limit: f64,
}

impl GeometryBoundary {
    pub fn new(label: impl Into<String>, radius: f64, measured_depth_limit: f64) -> Self {
        Self {
            label: label.into(),
            radius,
            measured_depth_limit,
        }
    }
}

/// Result of classifying one measured depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeClass<'a> {
    pub label: &'a str,
    pub radius: f64,
}

impl PipeClass<'_> {
    /// Depth lies beyond the deepest boundary.
    pub const UNCLASSIFIED: PipeClass<'static> = PipeClass {
        label: "",
        radius: 0.0,
    };

    #[inline]
    pub fn is_renderable(&self) -> bool {
        self.radius > 0.0
    }
}

/// Returns the first boundary whose limit is at or beyond `measured_depth`,
/// i.e. the nearest enclosing pipe type. Depths past the last limit map to
/// [`PipeClass::UNCLASSIFIED`].
pub fn classify(measured_depth: f64, boundaries: &[GeometryBoundary]) -> PipeClass<'_> {
    boundaries
        .iter()
        .find(|b| measured_depth <= b.measured_depth_limit)
        .map(|b| PipeClass {
            label: &b.label,
            radius: b.radius,
        })
        .unwrap_or(PipeClass::UNCLASSIFIED)
}

/// Checks that boundary limits strictly increase.
pub fn validate_boundaries(boundaries: &[GeometryBoundary]) -> Result<()> {
    for pair in boundaries.windows(2) {
        if !(pair[1].measured_depth_limit > pair[0].measured_depth_limit) {
            return Err(WellError::MalformedInput(format!(
                "geometry boundary '{}' at {} m does not lie below '{}' at {} m",
                pair[1].label,
                pair[1].measured_depth_limit,
                pair[0].label,
                pair[0].measured_depth_limit
            )));
        }
    }
    Ok(())
}

/// Parses a `geometrydef.txt` style file: one number per line, anything
/// after `#` is a description. Blank and comment-only lines are skipped.
pub fn read_numbered_values<R: Read>(reader: R) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (lineno, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.map_err(|e| WellError::MalformedInput(e.to_string()))?;
        let value = line.split('#').next().unwrap_or("").trim();
        if value.is_empty() {
            continue;
        }
        let value = value.parse::<f64>().map_err(|_| {
            WellError::MalformedInput(format!("line {}: '{}' is not a number", lineno + 1, value))
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Builds the ordered boundary list from the numeric geometry definition.
///
/// Layout of the relevant entries: `[0]` open hole diameter (in),
/// `[1]` riser diameter (in), `[2]` riser length (m), `[3]` casing diameter
/// (in), `[4]` cased section end (m), `[5]` liner diameter (in),
/// `[6]` liner length (m), `[10]` total well length (m).
/// Sections of zero length are left out.
pub fn boundaries_from_definition(values: &[f64]) -> Result<Vec<GeometryBoundary>> {
    if values.len() < 11 {
        return Err(WellError::MalformedInput(format!(
            "geometry definition has {} values, expected at least 11",
            values.len()
        )));
    }
    let radius = |inches: f64| 0.5 * METERS_PER_INCH * inches;

    let sections = [
        ("riser", radius(values[1]), values[2]),
        ("cased section", radius(values[3]), values[4]),
        ("liner", radius(values[5]), values[4] + values[6]),
        ("open hole", radius(values[0]), values[10]),
    ];

    let mut start = 0.0;
    let mut boundaries = Vec::with_capacity(sections.len());
    for (label, r, stop) in sections {
        if stop > start {
            boundaries.push(GeometryBoundary::new(label, r, stop));
            start = stop;
        }
    }
    validate_boundaries(&boundaries)?;
    Ok(boundaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sections() -> Vec<GeometryBoundary> {
        vec![
            GeometryBoundary::new("casing", 1.0, 1500.0),
            GeometryBoundary::new("open hole", 0.5, 2500.0),
        ]
    }

    #[test]
    fn picks_nearest_enclosing_boundary() {
        let b = two_sections();
        let radii: Vec<f64> = [0.0, 1000.0, 2000.0, 3000.0]
            .iter()
            .map(|&md| classify(md, &b).radius)
            .collect();
        assert_eq!(radii, vec![1.0, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn limit_is_inclusive() {
        let b = two_sections();
        assert_eq!(classify(1500.0, &b).label, "casing");
        assert_eq!(classify(1500.0001, &b).label, "open hole");
        assert!(!classify(2500.1, &b).is_renderable());
    }

    #[test]
    fn rejects_unsorted_boundaries() {
        let mut b = two_sections();
        b.swap(0, 1);
        assert!(validate_boundaries(&b).is_err());
    }

    #[test]
    fn parses_definition_and_skips_empty_liner() {
        let text = "\
8.5 # Well diameter in inches (open section)
19.5 # Inner riser diameter in inches
373.2 # Length of riser in meters

9.625 # Inner casing diameter in inches
1930 # Length of cased section
8.88 # Liner Inner Diameter
0.00 # Liner length
4597 # Pipe length
100 # Heavy weight drill pipe length
42 # BHA length
5192 # Total well length in meters
";
        let values = read_numbered_values(text.as_bytes()).unwrap();
        assert_eq!(values.len(), 11);

        let b = boundaries_from_definition(&values).unwrap();
        let labels: Vec<&str> = b.iter().map(|x| x.label.as_str()).collect();
        assert_eq!(labels, ["riser", "cased section", "open hole"]);
        assert!((b[0].radius - 0.5 * 0.0254 * 19.5).abs() < 1e-12);
        assert_eq!(b[2].measured_depth_limit, 5192.0);
    }

    #[test]
    fn reports_bad_numbers() {
        let err = read_numbered_values("1.0\nabc # oops\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
