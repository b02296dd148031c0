//! Discrete configuration changes emitted by the control panel and the
//! timeline bar.

use crate::config::{ViewerConfig, RADIUS_SCALING_RANGE, SPEEDUP_RANGE};
use wellpath::{Catalog, Colormap, SimulationKind, Technique};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    SelectWell(String),
    SelectConnection(String),
    RadiusScaling(f64),
    Simulation(SimulationKind),
    Colormap(Colormap),
    CustomThresholds(bool),
    Vmin(f64),
    Vmax(f64),
    Technique(Technique),
    Speedup(f64),
    TogglePause,
    ScrubTo(f64),
    ShowMarkers(bool),
    ShowFps(bool),
}

/// Which resources an event invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reload {
    pub geometry: bool,
    pub image: bool,
}

impl Reload {
    pub const NONE: Reload = Reload {
        geometry: false,
        image: false,
    };
    pub const IMAGE: Reload = Reload {
        geometry: false,
        image: true,
    };
    /// The image depends on the path too, so it reloads with the geometry.
    pub const ALL: Reload = Reload {
        geometry: true,
        image: true,
    };

    pub fn any(self) -> bool {
        self.geometry || self.image
    }
}

impl ViewerConfig {
    /// Records the event and reports what has to be reloaded.
    pub fn apply(&mut self, event: &ConfigEvent, catalog: &Catalog) -> Reload {
        match event {
            ConfigEvent::SelectWell(well) => {
                if *well == self.well {
                    return Reload::NONE;
                }
                self.well = well.clone();
                self.connection = catalog
                    .default_connection(well)
                    .map(str::to_owned)
                    .unwrap_or_default();
                Reload::ALL
            }
            ConfigEvent::SelectConnection(connection) => {
                if *connection == self.connection {
                    return Reload::NONE;
                }
                self.connection = connection.clone();
                Reload::ALL
            }
            ConfigEvent::RadiusScaling(s) => {
                self.radius_scaling = s.clamp(*RADIUS_SCALING_RANGE.start(), *RADIUS_SCALING_RANGE.end());
                Reload::ALL
            }
            ConfigEvent::Simulation(kind) => {
                self.simulation = *kind;
                Reload::IMAGE
            }
            ConfigEvent::Colormap(colormap) => {
                self.colormap = *colormap;
                Reload::IMAGE
            }
            ConfigEvent::CustomThresholds(on) => {
                debug_assert!(
                    *on != self.custom_thresholds,
                    "custom thresholds already {}",
                    if *on { "enabled" } else { "disabled" }
                );
                self.custom_thresholds = *on;
                Reload::IMAGE
            }
            ConfigEvent::Vmin(v) => {
                self.vmin = *v;
                if self.custom_thresholds {
                    Reload::IMAGE
                } else {
                    Reload::NONE
                }
            }
            ConfigEvent::Vmax(v) => {
                self.vmax = *v;
                if self.custom_thresholds {
                    Reload::IMAGE
                } else {
                    Reload::NONE
                }
            }
            ConfigEvent::Technique(t) => {
                self.technique = *t;
                Reload::NONE
            }
            ConfigEvent::Speedup(s) => {
                self.speedup = s.clamp(*SPEEDUP_RANGE.start(), *SPEEDUP_RANGE.end());
                Reload::NONE
            }
            ConfigEvent::ShowMarkers(on) => {
                self.show_markers = *on;
                Reload::NONE
            }
            ConfigEvent::ShowFps(on) => {
                self.show_fps = *on;
                Reload::NONE
            }
            ConfigEvent::TogglePause | ConfigEvent::ScrubTo(_) => Reload::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ViewerConfig {
        ViewerConfig {
            well: "Well_1".into(),
            connection: "Connection_A".into(),
            ..ViewerConfig::default()
        }
    }

    #[test]
    fn geometry_changes_reload_everything() {
        let catalog = Catalog::default();
        let mut cfg = config();
        assert_eq!(
            cfg.apply(&ConfigEvent::SelectConnection("Connection_B".into()), &catalog),
            Reload::ALL
        );
        assert_eq!(cfg.connection, "Connection_B");
        assert_eq!(cfg.apply(&ConfigEvent::RadiusScaling(50.0), &catalog), Reload::ALL);
        assert_eq!(cfg.radius_scaling, 50.0);
    }

    #[test]
    fn reselecting_the_same_connection_is_a_no_op() {
        let mut cfg = config();
        let event = ConfigEvent::SelectConnection("Connection_A".into());
        assert_eq!(cfg.apply(&event, &Catalog::default()), Reload::NONE);
    }

    #[test]
    fn new_well_picks_its_default_connection() {
        let mut cfg = config();
        let reload = cfg.apply(&ConfigEvent::SelectWell("Well_9".into()), &Catalog::default());
        assert_eq!(reload, Reload::ALL);
        assert_eq!(cfg.well, "Well_9");
        // Unknown to the catalog, so no connection is available.
        assert!(cfg.connection.is_empty());
    }

    #[test]
    fn image_changes_reload_only_the_image() {
        let catalog = Catalog::default();
        let mut cfg = config();
        for event in [
            ConfigEvent::Simulation(SimulationKind::AnnulusPressure),
            ConfigEvent::Colormap(Colormap::Plasma),
            ConfigEvent::CustomThresholds(true),
            ConfigEvent::Vmax(20.0),
        ] {
            assert_eq!(cfg.apply(&event, &catalog), Reload::IMAGE);
        }
        assert_eq!(cfg.image_request().thresholds.vmax, Some(20.0));
    }

    #[test]
    fn thresholds_are_ignored_while_disabled() {
        let mut cfg = config();
        assert_eq!(cfg.apply(&ConfigEvent::Vmin(-3.0), &Catalog::default()), Reload::NONE);
        assert_eq!(cfg.vmin, -3.0);
    }

    #[test]
    fn presentation_changes_never_reload() {
        let catalog = Catalog::default();
        let mut cfg = config();
        for event in [
            ConfigEvent::Technique(Technique::Basic),
            ConfigEvent::Speedup(-40.0),
            ConfigEvent::TogglePause,
            ConfigEvent::ScrubTo(4.0),
            ConfigEvent::ShowMarkers(false),
            ConfigEvent::ShowFps(true),
        ] {
            assert!(!cfg.apply(&event, &catalog).any());
        }
        assert_eq!(cfg.technique, Technique::Basic);
        assert_eq!(cfg.speedup, -15.0);
        assert!(!cfg.show_markers);
        assert!(cfg.show_fps);
    }
}
