//! Monotonic piecewise-linear scales mapping measured depth to texture rows
//! and simulation time to texture columns.

use crate::error::{Result, WellError};

/// Piecewise-linear interpolation through a set of knots, extrapolating past
/// either end with the slope of the nearest segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    domain: Vec<f64>,
    range: Vec<f64>,
}

impl LinearScale {
    /// Builds a scale through `(domain[i], range[i])`. The domain must hold at
    /// least two strictly increasing values.
    pub fn new(domain: Vec<f64>, range: Vec<f64>) -> Result<Self> {
        if domain.len() != range.len() {
            return Err(WellError::MalformedInput(format!(
                "scale has {} domain knots but {} range values",
                domain.len(),
                range.len()
            )));
        }
        if domain.len() < 2 {
            return Err(WellError::MalformedInput(format!(
                "scale needs at least two knots, got {}",
                domain.len()
            )));
        }
        if let Some(i) = domain.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(WellError::MalformedInput(format!(
                "scale knots must strictly increase (knot {} = {}, knot {} = {})",
                i,
                domain[i],
                i + 1,
                domain[i + 1]
            )));
        }
        Ok(Self { domain, range })
    }

    /// Maps `knots` onto evenly spaced values from 0 to 1.
    pub fn uniform(knots: &[f64]) -> Result<Self> {
        let last = knots.len().saturating_sub(1).max(1) as f64;
        let range = (0..knots.len()).map(|i| i as f64 / last).collect();
        Self::new(knots.to_vec(), range)
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn map(&self, x: f64) -> f64 {
        let n = self.domain.len();
        // Index of the segment [i, i + 1] used for x, clamped to the end
        // segments so values outside the domain extrapolate.
        let upper = self.domain.partition_point(|&d| d < x).clamp(1, n - 1);
        let i = upper - 1;

        let (x0, x1) = (self.domain[i], self.domain[i + 1]);
        let (y0, y1) = (self.range[i], self.range[i + 1]);
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }
}

/// Measured depth (m) to normalized texture row. Built once per simulation
/// load from the depth keys of the simulation grid. Outputs are not clamped:
/// values outside `[0, 1]` mean "no simulation data here".
#[derive(Debug, Clone, PartialEq)]
pub struct DepthToRow(LinearScale);

impl DepthToRow {
    pub fn new(depth_keys: &[f64]) -> Result<Self> {
        LinearScale::uniform(depth_keys).map(Self)
    }

    #[inline]
    pub fn map(&self, measured_depth: f64) -> f64 {
        self.0.map(measured_depth)
    }
}

/// Simulation time (s) to normalized texture column.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeToColumn(LinearScale);

impl TimeToColumn {
    pub fn new(time_keys: &[f64]) -> Result<Self> {
        LinearScale::uniform(time_keys).map(Self)
    }

    #[inline]
    pub fn map(&self, elapsed_seconds: f64) -> f64 {
        self.0.map(elapsed_seconds)
    }
}
