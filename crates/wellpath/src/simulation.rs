//! Simulation time series (depth columns × time rows) and their rendering
//! into data textures.

use crate::colormap::Colormap;
use crate::error::{Result, WellError};
use crate::geometry::read_numbered_values;
use crate::normalize::{DepthToRow, LinearScale, TimeToColumn};
use crate::texture::DataTexture;
use crate::timeline::TimeBounds;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

const GRAVITY: f64 = 9.81;
const PASCAL_TO_BAR: f64 = 1e-5;

/// Which simulated quantity to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationKind {
    #[default]
    PipePressure,
    AnnulusPressure,
    PipeStress,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 3] = [
        SimulationKind::PipePressure,
        SimulationKind::AnnulusPressure,
        SimulationKind::PipeStress,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SimulationKind::PipePressure => "pipepressure",
            SimulationKind::AnnulusPressure => "annuluspressure",
            SimulationKind::PipeStress => "pipestress",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.name())
    }

    /// Pressure series are corrected with the mud column and need the
    /// fluid definition.
    pub fn is_pressure(self) -> bool {
        !matches!(self, SimulationKind::PipeStress)
    }

    /// Gradient removed per meter of true vertical depth before colouring.
    /// Pressures lose the mud column (bar/m); stress uses a fixed gradient.
    pub fn gradient_per_meter(self, mud_density: f64) -> f64 {
        match self {
            SimulationKind::PipePressure | SimulationKind::AnnulusPressure => {
                mud_density * GRAVITY * PASCAL_TO_BAR
            }
            SimulationKind::PipeStress => -0.75,
        }
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SimulationKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown simulation '{}'", s))
    }
}

/// Colour range limits. `None` falls back to the data's own min/max.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thresholds {
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
}

/// Values sampled at `times × depths`, stored time-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationGrid {
    times: Vec<f64>,
    depths: Vec<f64>,
    values: Vec<f64>,
}

impl SimulationGrid {
    pub fn new(times: Vec<f64>, depths: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if values.len() != times.len() * depths.len() {
            return Err(WellError::MalformedInput(format!(
                "simulation grid has {} values for {} times x {} depths",
                values.len(),
                times.len(),
                depths.len()
            )));
        }
        Ok(Self {
            times,
            depths,
            values,
        })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    #[inline]
    pub fn value(&self, time_index: usize, depth_index: usize) -> f64 {
        self.values[time_index * self.depths.len() + depth_index]
    }

    pub fn time_bounds(&self) -> Result<TimeBounds> {
        TimeBounds::from_keys(&self.times)
    }

    pub fn depth_to_row(&self) -> Result<DepthToRow> {
        DepthToRow::new(&self.depths)
    }

    pub fn time_to_column(&self) -> Result<TimeToColumn> {
        TimeToColumn::new(&self.times)
    }

    /// Finite min and max over all values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Subtracts `gradient * tvd(md)` from every depth column, leaving the
    /// part of the signal not explained by the fluid column.
    pub fn relative_to_hydrostatic(&self, md_to_tvd: &LinearScale, gradient: f64) -> Self {
        let offsets: Vec<f64> = self
            .depths
            .iter()
            .map(|&md| gradient * md_to_tvd.map(md))
            .collect();
        let values = self
            .values
            .chunks(self.depths.len().max(1))
            .flat_map(|row| row.iter().zip(&offsets).map(|(v, o)| v - o))
            .collect();
        Self {
            times: self.times.clone(),
            depths: self.depths.clone(),
            values,
        }
    }

    /// Renders the grid: one column per time sample, one row per depth
    /// sample.
    pub fn render(&self, colormap: Colormap, thresholds: Thresholds) -> Result<DataTexture> {
        let (lo, hi) = self.value_range().unwrap_or((0.0, 1.0));
        let vmin = thresholds.vmin.unwrap_or(lo);
        let vmax = thresholds.vmax.unwrap_or(hi);
        let span = vmax - vmin;

        let (w, h) = (self.times.len(), self.depths.len());
        let mut pixels = Vec::with_capacity(4 * w * h);
        for d in 0..h {
            for t in 0..w {
                let v = self.value(t, d);
                let norm = if span != 0.0 { (v - vmin) / span } else { 0.0 };
                pixels.extend_from_slice(&colormap.rgba(norm));
            }
        }
        DataTexture::from_rgba(w as u32, h as u32, pixels)
    }
}

/// Reads a simulation table: the first column is time, every other header
/// cell is a measured depth. Empty cells become NaN.
pub fn read_simulation<R: Read>(reader: R) -> Result<SimulationGrid> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let parse = |cell: &str, what: &str| -> Result<f64> {
        cell.parse::<f64>()
            .map_err(|_| WellError::MalformedInput(format!("{} '{}' is not a number", what, cell)))
    };

    let depths = rdr
        .headers()?
        .iter()
        .skip(1)
        .map(|h| parse(h, "depth header"))
        .collect::<Result<Vec<_>>>()?;

    let mut times = Vec::new();
    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut cells = record.iter();
        times.push(parse(cells.next().unwrap_or(""), "time")?);
        for cell in cells {
            values.push(if cell.is_empty() {
                f64::NAN
            } else {
                parse(cell, "value")?
            });
        }
    }
    SimulationGrid::new(times, depths, values)
}

/// Mud density (kg/m³): the first value of a `fluiddef.txt` file.
pub fn read_mud_density<R: Read>(reader: R) -> Result<f64> {
    read_numbered_values(reader)?
        .first()
        .copied()
        .ok_or_else(|| WellError::MalformedInput("fluid definition is empty".into()))
}
