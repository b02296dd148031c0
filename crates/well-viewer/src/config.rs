use clap::Parser;
use std::path::PathBuf;
use wellpath::{Catalog, Colormap, ImageRequest, MeshOptions, SimulationKind, Technique, Thresholds};

/// `well_viewer` - 3D wellbore viewer with animated simulation data.
///
/// Reads `<data-dir>/<well>/<connection>/` directories and colours the pipe
/// by the selected simulation as time plays back.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Root of the simulation catalog.
    #[arg(long, env = "WELL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Well to open. Defaults to the first well in the catalog.
    #[arg(long)]
    pub well: Option<String>,

    /// Connection to open. Defaults to the well's last connection.
    #[arg(long)]
    pub connection: Option<String>,

    /// Pipe radius exaggeration.
    #[arg(long, default_value_t = 300.0)]
    pub radius_scaling: f64,

    /// Simulated seconds per wall-clock second.
    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    pub speedup: f64,

    #[arg(long, default_value_t = SimulationKind::PipePressure)]
    pub simulation: SimulationKind,

    #[arg(long, default_value_t = Colormap::Turbo)]
    pub colormap: Colormap,

    #[arg(long, default_value_t = Technique::Standard)]
    pub technique: Technique,
}

pub const RADIUS_SCALING_RANGE: std::ops::RangeInclusive<f64> = 1.0..=1000.0;
pub const SPEEDUP_RANGE: std::ops::RangeInclusive<f64> = -15.0..=15.0;

/// Live viewer settings. Seeded from [`Args`], then changed only through
/// [`crate::events::ConfigEvent`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub well: String,
    pub connection: String,
    pub radius_scaling: f64,
    pub simulation: SimulationKind,
    pub colormap: Colormap,
    pub custom_thresholds: bool,
    pub vmin: f64,
    pub vmax: f64,
    pub technique: Technique,
    pub speedup: f64,
    pub show_markers: bool,
    pub show_fps: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            well: String::new(),
            connection: String::new(),
            radius_scaling: 300.0,
            simulation: SimulationKind::PipePressure,
            colormap: Colormap::Turbo,
            custom_thresholds: false,
            vmin: -10.0,
            vmax: 10.0,
            technique: Technique::Standard,
            speedup: 3.0,
            show_markers: true,
            show_fps: false,
        }
    }
}

impl ViewerConfig {
    /// Resolves the initial selection against the catalog. Unknown or
    /// missing names fall back to the catalog defaults.
    pub fn from_args(args: &Args, catalog: &Catalog) -> Self {
        let well = args
            .well
            .clone()
            .filter(|w| !catalog.connections(w).is_empty())
            .or_else(|| catalog.wells().next().map(str::to_owned))
            .unwrap_or_default();
        let connection = args
            .connection
            .clone()
            .filter(|c| catalog.connections(&well).contains(c))
            .or_else(|| catalog.default_connection(&well).map(str::to_owned))
            .unwrap_or_default();

        Self {
            well,
            connection,
            radius_scaling: args.radius_scaling,
            simulation: args.simulation,
            colormap: args.colormap,
            technique: args.technique,
            speedup: args.speedup,
            ..Self::default()
        }
    }

    /// Radius scaling is given relative to the scaled path length, so the
    /// pipe keeps its proportions whatever the length scale.
    pub fn mesh_options(&self) -> MeshOptions {
        let base = MeshOptions::default();
        MeshOptions {
            radius_scaling: self.radius_scaling * base.length_scaling,
            ..base
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        if self.custom_thresholds {
            Thresholds {
                vmin: Some(self.vmin),
                vmax: Some(self.vmax),
            }
        } else {
            Thresholds::default()
        }
    }

    pub fn image_request(&self) -> ImageRequest {
        ImageRequest {
            simulation: self.simulation,
            colormap: self.colormap,
            thresholds: self.thresholds(),
        }
    }
}
