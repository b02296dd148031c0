//! Pairs the halves of a scene reload.
//!
//! Mesh, time bounds and data texture of a connection are swapped in
//! together or not at all. The geometry half waits for the image half of
//! the same batch (and vice versa); if either fails the whole batch is
//! dropped and the previous scene stays up.

use crate::loader::{Finished, Loaded, ResourceKind};
use wellpath::{DataTexture, LoadedGeometry, WellError};

/// What the app has to apply after a finished load.
#[derive(Debug)]
pub enum Update {
    /// Both halves of a scene reload.
    Scene {
        geometry: LoadedGeometry,
        image: DataTexture,
    },
    /// A new image for the scene currently shown.
    Image(DataTexture),
    /// A load failed; nothing is applied.
    Failed { kind: ResourceKind, error: WellError },
}

#[derive(Debug, Default)]
enum SceneState {
    /// No scene yet, or the last scene reload was abandoned.
    #[default]
    Stale,
    Pending {
        batch: u64,
        geometry: Option<LoadedGeometry>,
        image: Option<DataTexture>,
    },
    Current {
        batch: u64,
    },
}

#[derive(Debug, Default)]
pub struct SceneAssembler {
    state: SceneState,
}

impl SceneAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts collecting `batch`, forgetting any half of an older one.
    pub fn begin(&mut self, batch: u64) {
        self.state = SceneState::Pending {
            batch,
            geometry: None,
            image: None,
        };
    }

    /// True when the scene shown does not match the selection, so an image
    /// change must reload the whole scene.
    pub fn needs_scene(&self) -> bool {
        matches!(self.state, SceneState::Stale)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SceneState::Pending { .. })
    }

    /// Marks the current scene as not matching the selection.
    pub fn abandon(&mut self) {
        self.state = SceneState::Stale;
    }

    pub fn accept(&mut self, finished: Finished) -> Option<Update> {
        let Finished {
            kind,
            generation,
            batch,
            result,
        } = finished;

        let (state, update) = match (std::mem::take(&mut self.state), result) {
            (SceneState::Pending { batch: open, .. }, Err(error)) if open == batch => {
                log::warn!("Abandoning reload {}: {:?} load failed", batch, kind);
                (SceneState::Stale, Some(Update::Failed { kind, error }))
            }
            (state, Err(error)) => (state, Some(Update::Failed { kind, error })),
            (
                SceneState::Pending {
                    batch: open,
                    geometry,
                    image,
                },
                Ok(loaded),
            ) if open == batch => {
                let (geometry, image) = match loaded {
                    Loaded::Geometry(g) => (Some(g), image),
                    Loaded::Image(i) => (geometry, Some(i)),
                };
                match (geometry, image) {
                    (Some(geometry), Some(image)) => (
                        SceneState::Current { batch },
                        Some(Update::Scene { geometry, image }),
                    ),
                    (geometry, image) => (
                        SceneState::Pending {
                            batch,
                            geometry,
                            image,
                        },
                        None,
                    ),
                }
            }
            (SceneState::Current { batch: shown }, Ok(Loaded::Image(image))) if shown == batch => {
                (SceneState::Current { batch }, Some(Update::Image(image)))
            }
            (state, Ok(_)) => {
                log::debug!(
                    "Dropping {:?} load {} of abandoned reload {}",
                    kind,
                    generation,
                    batch
                );
                (state, None)
            }
        };
        self.state = state;
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Loader;
    use std::{fs, path::PathBuf, time::Duration};
    use wellpath::{
        load_geometry, Catalog, ConnectionDir, ImageRequest, MeshOptions, SimulationKind,
    };

    fn demo_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    fn demo_connection() -> ConnectionDir {
        Catalog::scan(demo_root())
            .unwrap()
            .connection("Well_1", "Connection_A")
            .unwrap()
    }

    fn geometry(batch: u64) -> Finished {
        let loaded = load_geometry(&demo_connection(), &MeshOptions::default()).unwrap();
        Finished {
            kind: ResourceKind::Geometry,
            generation: batch,
            batch,
            result: Ok(Loaded::Geometry(loaded)),
        }
    }

    fn image(generation: u64, batch: u64) -> Finished {
        let texture = DataTexture::from_rgba(1, 1, vec![9, 9, 9, 255]).unwrap();
        Finished {
            kind: ResourceKind::Image,
            generation,
            batch,
            result: Ok(Loaded::Image(texture)),
        }
    }

    fn failed(kind: ResourceKind, batch: u64) -> Finished {
        Finished {
            kind,
            generation: batch,
            batch,
            result: Err(WellError::MalformedInput("broken".into())),
        }
    }

    #[test]
    fn halves_are_applied_together() {
        let mut scene = SceneAssembler::new();
        assert!(scene.needs_scene());
        scene.begin(1);

        assert!(scene.accept(image(1, 1)).is_none());
        assert!(scene.is_pending());
        match scene.accept(geometry(1)) {
            Some(Update::Scene { image, .. }) => assert_eq!(image.width(), 1),
            other => panic!("expected a scene, got {:?}", other),
        }
        assert!(!scene.needs_scene());
        assert!(!scene.is_pending());
    }

    #[test]
    fn failed_half_drops_the_whole_reload() {
        let mut scene = SceneAssembler::new();
        scene.begin(1);

        assert!(scene.accept(geometry(1)).is_none());
        assert!(matches!(
            scene.accept(failed(ResourceKind::Image, 1)),
            Some(Update::Failed {
                kind: ResourceKind::Image,
                ..
            })
        ));
        assert!(scene.needs_scene());

        // A late image of the abandoned batch must not land on the old scene.
        assert!(scene.accept(image(2, 1)).is_none());
        assert!(scene.needs_scene());
    }

    #[test]
    fn geometry_failure_swallows_the_image() {
        let mut scene = SceneAssembler::new();
        scene.begin(3);
        assert!(matches!(
            scene.accept(failed(ResourceKind::Geometry, 3)),
            Some(Update::Failed { .. })
        ));
        assert!(scene.accept(image(3, 3)).is_none());
    }

    #[test]
    fn images_of_the_shown_scene_apply_directly() {
        let mut scene = SceneAssembler::new();
        scene.begin(1);
        scene.accept(geometry(1));
        scene.accept(image(1, 1));

        assert!(matches!(scene.accept(image(2, 1)), Some(Update::Image(_))));
        // Image failures leave the shown scene in place.
        assert!(matches!(
            scene.accept(failed(ResourceKind::Image, 1)),
            Some(Update::Failed { .. })
        ));
        assert!(!scene.needs_scene());
    }

    #[test]
    fn newer_batch_discards_older_halves() {
        let mut scene = SceneAssembler::new();
        scene.begin(1);
        scene.accept(image(1, 1));
        scene.begin(2);

        assert!(scene.accept(geometry(1)).is_none());
        assert!(scene.accept(geometry(2)).is_none());
        assert!(matches!(
            scene.accept(image(2, 2)),
            Some(Update::Scene { .. })
        ));
    }

    #[test]
    fn missing_simulation_keeps_the_previous_scene() {
        let src = demo_root().join("Well_1/Connection_A");
        let dst = std::env::temp_dir().join(format!("well-viewer-partial-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dst);
        fs::create_dir_all(&dst).unwrap();
        for entry in fs::read_dir(&src).unwrap() {
            let entry = entry.unwrap();
            if entry.file_name() != "pipestress.csv" {
                fs::copy(entry.path(), dst.join(entry.file_name())).unwrap();
            }
        }

        let mut loader = Loader::new();
        let mut scene = SceneAssembler::new();
        let request = ImageRequest {
            simulation: SimulationKind::PipeStress,
            ..ImageRequest::default()
        };
        scene.begin(loader.request_scene(
            ConnectionDir::new(&dst),
            MeshOptions::default(),
            request,
        ));

        let mut updates = Vec::new();
        for _ in 0..2 {
            let finished = loader.wait(Duration::from_secs(30)).expect("scene half");
            updates.extend(scene.accept(finished));
        }
        assert_eq!(updates.len(), 1);
        assert!(matches!(
            updates[0],
            Update::Failed {
                kind: ResourceKind::Image,
                ..
            }
        ));
        assert!(scene.needs_scene());

        fs::remove_dir_all(&dst).unwrap();
    }
}
