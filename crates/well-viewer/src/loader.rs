//! Background asset loads.
//!
//! Every request runs on the rayon pool and reports back over a channel.
//! Each resource kind carries its own generation counter; a result is only
//! handed out if no newer request of the same kind was issued meanwhile.
//!
//! A scene reload issues a geometry and an image request under one batch id
//! (the geometry generation). Image-only requests join the latest batch.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;
use wellpath::{
    load_geometry, load_image, ConnectionDir, DataTexture, ImageRequest, LoadedGeometry,
    MeshOptions, WellError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Geometry,
    Image,
}

#[derive(Debug)]
pub enum Loaded {
    Geometry(LoadedGeometry),
    Image(DataTexture),
}

/// A completed load, successful or not.
#[derive(Debug)]
pub struct Finished {
    pub kind: ResourceKind,
    pub generation: u64,
    /// Scene reload this result belongs to.
    pub batch: u64,
    pub result: Result<Loaded, WellError>,
}

/// Latest issued generation per resource kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Generations {
    geometry: u64,
    image: u64,
}

impl Generations {
    fn slot(&mut self, kind: ResourceKind) -> &mut u64 {
        match kind {
            ResourceKind::Geometry => &mut self.geometry,
            ResourceKind::Image => &mut self.image,
        }
    }

    pub fn issue(&mut self, kind: ResourceKind) -> u64 {
        let slot = self.slot(kind);
        *slot += 1;
        *slot
    }

    pub fn latest(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Geometry => self.geometry,
            ResourceKind::Image => self.image,
        }
    }

    pub fn is_latest(&self, kind: ResourceKind, generation: u64) -> bool {
        self.latest(kind) == generation
    }
}

pub struct Loader {
    tx: Sender<Finished>,
    rx: Receiver<Finished>,
    generations: Generations,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            generations: Generations::default(),
        }
    }

    pub fn generations(&self) -> Generations {
        self.generations
    }

    /// Loads geometry and image of one connection as a pair. Returns the
    /// batch id both results carry.
    pub fn request_scene(
        &mut self,
        dir: ConnectionDir,
        options: MeshOptions,
        request: ImageRequest,
    ) -> u64 {
        let batch = self.generations.issue(ResourceKind::Geometry);
        log::info!(
            "Loading scene from {} (batch {})",
            dir.path().display(),
            batch
        );
        let geometry_dir = dir.clone();
        self.spawn(ResourceKind::Geometry, batch, batch, move || {
            load_geometry(&geometry_dir, &options).map(Loaded::Geometry)
        });
        self.request_image(dir, request);
        batch
    }

    /// Re-renders the image of the latest batch's connection.
    pub fn request_image(&mut self, dir: ConnectionDir, request: ImageRequest) -> u64 {
        let generation = self.generations.issue(ResourceKind::Image);
        let batch = self.generations.latest(ResourceKind::Geometry);
        log::info!(
            "Loading {} image from {} (generation {}, batch {})",
            request.simulation,
            dir.path().display(),
            generation,
            batch
        );
        self.spawn(ResourceKind::Image, generation, batch, move || {
            load_image(&dir, &request).map(Loaded::Image)
        });
        generation
    }

    fn spawn<F>(&self, kind: ResourceKind, generation: u64, batch: u64, job: F)
    where
        F: FnOnce() -> Result<Loaded, WellError> + Send + 'static,
    {
        let tx = self.tx.clone();
        rayon::spawn(move || {
            let result = job();
            if tx
                .send(Finished {
                    kind,
                    generation,
                    batch,
                    result,
                })
                .is_err()
            {
                log::debug!("Loader gone before {:?} load {} finished", kind, generation);
            }
        });
    }

    /// Drains finished loads without blocking, dropping stale ones.
    pub fn poll(&self) -> Vec<Finished> {
        self.rx.try_iter().filter_map(|f| self.accept(f)).collect()
    }

    /// Blocks until the next current load arrives or `timeout` passes.
    pub fn wait(&self, timeout: Duration) -> Option<Finished> {
        while let Ok(finished) = self.rx.recv_timeout(timeout) {
            if let Some(finished) = self.accept(finished) {
                return Some(finished);
            }
        }
        None
    }

    fn accept(&self, finished: Finished) -> Option<Finished> {
        let latest = self.generations.latest(finished.kind);
        if finished.generation == latest {
            Some(finished)
        } else {
            log::debug!(
                "Discarding stale {:?} load (generation {}, latest {})",
                finished.kind,
                finished.generation,
                latest
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wellpath::Catalog;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn demo_connection() -> ConnectionDir {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data");
        Catalog::scan(root)
            .unwrap()
            .connection("Well_1", "Connection_A")
            .unwrap()
    }

    #[test]
    fn generations_are_tracked_per_kind() {
        let mut g = Generations::default();
        assert_eq!(g.issue(ResourceKind::Geometry), 1);
        assert_eq!(g.issue(ResourceKind::Geometry), 2);
        assert_eq!(g.issue(ResourceKind::Image), 1);
        assert!(g.is_latest(ResourceKind::Geometry, 2));
        assert!(!g.is_latest(ResourceKind::Geometry, 1));
        assert!(g.is_latest(ResourceKind::Image, 1));
    }

    #[test]
    fn only_the_latest_request_is_delivered() {
        let mut loader = Loader::new();
        let dir = demo_connection();
        let request = ImageRequest::default();
        loader.request_scene(dir.clone(), MeshOptions::default(), request);
        let latest = loader.request_scene(dir, MeshOptions::default(), request);

        let mut kinds = Vec::new();
        for _ in 0..2 {
            let finished = loader.wait(TIMEOUT).expect("scene half");
            assert_eq!(finished.batch, latest);
            assert!(finished.result.is_ok());
            kinds.push(finished.kind);
        }
        assert!(kinds.contains(&ResourceKind::Geometry));
        assert!(kinds.contains(&ResourceKind::Image));

        // The superseded batch is swallowed.
        assert!(loader.wait(Duration::from_millis(200)).is_none());
    }

    #[test]
    fn image_requests_join_the_latest_batch() {
        let mut loader = Loader::new();
        let dir = demo_connection();
        let batch = loader.request_scene(dir.clone(), MeshOptions::default(), ImageRequest::default());
        let image = loader.request_image(dir, ImageRequest::default());
        assert_eq!(loader.generations().latest(ResourceKind::Image), image);

        let mut images = 0;
        while let Some(finished) = loader.wait(Duration::from_secs(5)) {
            assert_eq!(finished.batch, batch);
            if finished.kind == ResourceKind::Image {
                assert_eq!(finished.generation, image);
                images += 1;
            }
        }
        assert_eq!(images, 1);
    }

    #[test]
    fn failures_are_delivered_as_errors() {
        let mut loader = Loader::new();
        let missing = ConnectionDir::new(std::env::temp_dir().join("well-viewer-missing-dir"));
        loader.request_image(missing, ImageRequest::default());

        let finished = loader.wait(TIMEOUT).expect("image load");
        assert_eq!(finished.kind, ResourceKind::Image);
        let err = finished.result.unwrap_err();
        assert!(matches!(err, WellError::AssetLoad { .. }));
    }
}
