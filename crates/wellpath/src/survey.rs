//! Directional survey parsing and path resolution.
//!
//! A survey is an ordered list of stations (measured depth, inclination,
//! azimuth). Each resolved [`PathSample`] describes the stretch of hole that
//! ends at a station, so the first station only anchors the path and does not
//! produce a sample of its own.

use crate::error::{Result, WellError};
use crate::normalize::LinearScale;
use serde::Deserialize;
use std::io::Read;

/// Unit of the inclination/azimuth columns in a survey source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    #[inline]
    fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Degrees => value.to_radians(),
            AngleUnit::Radians => value,
        }
    }
}

/// One raw survey station, angles in the source unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyRecord {
    pub measured_depth: f64,
    pub inclination: f64,
    pub azimuth: f64,
    pub true_vertical_depth: Option<f64>,
}

impl SurveyRecord {
    pub fn new(measured_depth: f64, inclination: f64, azimuth: f64) -> Self {
        Self {
            measured_depth,
            inclination,
            azimuth,
            true_vertical_depth: None,
        }
    }

    pub fn with_tvd(mut self, tvd: f64) -> Self {
        self.true_vertical_depth = Some(tvd);
        self
    }
}

/// A resolved stretch of the well path. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub measured_depth: f64,
    pub true_vertical_depth: f64,
    pub inclination: f64,
    pub azimuth: f64,
    /// Difference to the previous station's measured depth.
    pub segment_length: f64,
}

/// Fails with [`WellError::MalformedPath`] unless measured depth strictly
/// increases.
fn check_order(records: &[SurveyRecord]) -> Result<()> {
    for (i, pair) in records.windows(2).enumerate() {
        let (prev, next) = (pair[0].measured_depth, pair[1].measured_depth);
        // Written as a negated comparison so NaN depths are rejected too.
        if !(next > prev) {
            return Err(WellError::MalformedPath {
                row: i + 1,
                prev,
                next,
            });
        }
    }
    Ok(())
}

/// True vertical depth at every station, the first one included. Stations
/// without one get it integrated from the inclination of the stretch above;
/// the first station defaults to 0.
fn station_tvds(records: &[SurveyRecord], unit: AngleUnit) -> Vec<f64> {
    let mut tvds = Vec::with_capacity(records.len());
    let mut prev: Option<(&SurveyRecord, f64)> = None;
    for station in records {
        let tvd = match (station.true_vertical_depth, prev) {
            (Some(v), _) => v,
            (None, Some((above, tvd))) => {
                let length = station.measured_depth - above.measured_depth;
                tvd + length * unit.to_radians(station.inclination).cos()
            }
            (None, None) => 0.0,
        };
        tvds.push(tvd);
        prev = Some((station, tvd));
    }
    tvds
}

/// Validates the station order and derives one [`PathSample`] per station
/// after the first.
///
/// Fails with [`WellError::MalformedPath`] unless measured depth strictly
/// increases. Stations without a true vertical depth get one integrated from
/// the segment inclination.
pub fn resolve_path(records: &[SurveyRecord], unit: AngleUnit) -> Result<Vec<PathSample>> {
    check_order(records)?;

    let tvds = station_tvds(records, unit);
    let samples: Vec<PathSample> = records
        .windows(2)
        .zip(tvds.iter().skip(1))
        .map(|(pair, &true_vertical_depth)| {
            let (prev, station) = (&pair[0], &pair[1]);
            PathSample {
                measured_depth: station.measured_depth,
                true_vertical_depth,
                inclination: unit.to_radians(station.inclination),
                azimuth: unit.to_radians(station.azimuth),
                segment_length: station.measured_depth - prev.measured_depth,
            }
        })
        .collect();

    let integrated = records
        .iter()
        .skip(1)
        .filter(|r| r.true_vertical_depth.is_none())
        .count();
    if integrated > 0 {
        log::warn!(
            "{} of {} survey stations had no TVD; integrated from inclination",
            integrated,
            samples.len()
        );
    }

    Ok(samples)
}

/// Measured depth → true vertical depth over every station of the survey,
/// the anchoring first station included.
pub fn vertical_depth_scale(records: &[SurveyRecord], unit: AngleUnit) -> Result<LinearScale> {
    check_order(records)?;
    LinearScale::new(
        records.iter().map(|r| r.measured_depth).collect(),
        station_tvds(records, unit),
    )
}

#[derive(Debug, Deserialize)]
struct SurveyRow {
    #[serde(rename = "Md")]
    md: f64,
    #[serde(rename = "Inc")]
    inc: f64,
    #[serde(rename = "Azi")]
    azi: f64,
    #[serde(rename = "Tvd", alias = "TVD(m)", default)]
    tvd: Option<f64>,
}

/// Reads a `;`-separated survey table with `Md`, `Inc`, `Azi` and an
/// optional `Tvd`/`TVD(m)` column. Other columns are ignored.
pub fn read_survey<R: Read>(reader: R) -> Result<Vec<SurveyRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in rdr.deserialize::<SurveyRow>() {
        let row = row?;
        records.push(SurveyRecord {
            measured_depth: row.md,
            inclination: row.inc,
            azimuth: row.azi,
            true_vertical_depth: row.tvd,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn drops_first_station_and_derives_lengths() {
        let records = [
            SurveyRecord::new(0.0, 0.0, 0.0),
            SurveyRecord::new(100.0, 0.0, 0.0),
            SurveyRecord::new(250.0, 90.0, 180.0),
        ];
        let path = resolve_path(&records, AngleUnit::Degrees).unwrap();

        assert_eq!(path.len(), 2);
        assert_eq!(path[0].measured_depth, 100.0);
        assert_eq!(path[0].segment_length, 100.0);
        assert_eq!(path[1].segment_length, 150.0);
        assert!((path[1].inclination - FRAC_PI_2).abs() < 1e-12);
        assert!((path[1].azimuth - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn radians_pass_through() {
        let records = [
            SurveyRecord::new(0.0, 0.0, 0.0),
            SurveyRecord::new(10.0, 0.5, 1.5),
        ];
        let path = resolve_path(&records, AngleUnit::Radians).unwrap();
        assert_eq!(path[0].inclination, 0.5);
        assert_eq!(path[0].azimuth, 1.5);
    }

    #[test]
    fn rejects_non_increasing_depth() {
        let records = [
            SurveyRecord::new(0.0, 0.0, 0.0),
            SurveyRecord::new(100.0, 0.0, 0.0),
            SurveyRecord::new(100.0, 0.0, 0.0),
        ];
        let err = resolve_path(&records, AngleUnit::Degrees).unwrap_err();
        assert!(matches!(err, WellError::MalformedPath { row: 2, .. }));
        assert!(err.is_malformed_input());
    }

    #[test]
    fn short_surveys_yield_no_samples() {
        assert!(resolve_path(&[], AngleUnit::Degrees).unwrap().is_empty());
        let one = [SurveyRecord::new(5.0, 0.0, 0.0)];
        assert!(resolve_path(&one, AngleUnit::Degrees).unwrap().is_empty());
    }

    #[test]
    fn integrates_missing_tvd() {
        let records = [
            SurveyRecord::new(0.0, 0.0, 0.0).with_tvd(0.0),
            SurveyRecord::new(100.0, 0.0, 0.0),
            SurveyRecord::new(200.0, 60.0, 0.0),
        ];
        let path = resolve_path(&records, AngleUnit::Degrees).unwrap();
        assert!((path[0].true_vertical_depth - 100.0).abs() < 1e-9);
        assert!((path[1].true_vertical_depth - 150.0).abs() < 1e-9);
    }

    #[test]
    fn vertical_scale_spans_every_station() {
        let records = [
            SurveyRecord::new(0.0, 0.0, 0.0).with_tvd(0.0),
            SurveyRecord::new(200.0, 0.0, 0.0).with_tvd(180.0),
        ];
        let scale = vertical_depth_scale(&records, AngleUnit::Degrees).unwrap();
        assert_eq!(scale.domain(), [0.0, 200.0]);
        assert!((scale.map(0.0) - 0.0).abs() < 1e-12);
        assert!((scale.map(100.0) - 90.0).abs() < 1e-12);
        assert!((scale.map(200.0) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn vertical_scale_integrates_missing_tvd_from_the_top() {
        let records = [
            SurveyRecord::new(0.0, 0.0, 0.0),
            SurveyRecord::new(100.0, 60.0, 0.0),
        ];
        let scale = vertical_depth_scale(&records, AngleUnit::Degrees).unwrap();
        assert!((scale.map(100.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn vertical_scale_rejects_unordered_stations() {
        let records = [
            SurveyRecord::new(100.0, 0.0, 0.0),
            SurveyRecord::new(50.0, 0.0, 0.0),
        ];
        let err = vertical_depth_scale(&records, AngleUnit::Degrees).unwrap_err();
        assert!(matches!(err, WellError::MalformedPath { row: 1, .. }));
    }

    #[test]
    fn reads_semicolon_table() {
        let text = "Md;Inc;Azi;TVD(m);Comment\n0;0;0;0;top\n120.5; 3.5 ;270;120.4;x\n";
        let records = read_survey(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].measured_depth, 120.5);
        assert_eq!(records[1].inclination, 3.5);
        assert_eq!(records[1].true_vertical_depth, Some(120.4));
    }
}
