//! Full load pipeline over the bundled `data/` directory.

use std::path::PathBuf;
use wellpath::{
    load_geometry, load_image, Catalog, Colormap, ImageRequest, MeshOptions, SimulationKind,
    Thresholds,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[test]
fn catalog_lists_demo_well() {
    let catalog = Catalog::scan(data_dir()).unwrap();
    assert_eq!(catalog.wells().collect::<Vec<_>>(), ["Well_1"]);
    assert_eq!(catalog.connections("Well_1"), ["Connection_A", "Connection_B"]);
    assert_eq!(
        catalog.default_selection(),
        Some(("Well_1", "Connection_B"))
    );
}

#[test]
fn geometry_load_builds_classified_pipe() {
    let catalog = Catalog::scan(data_dir()).unwrap();
    let dir = catalog.connection("Well_1", "Connection_A").unwrap();
    let loaded = load_geometry(&dir, &MeshOptions::default()).unwrap();
    let model = &loaded.model;

    // Stations 100..=2100 m; the last one lies past the 2000 m well length.
    assert_eq!(model.segments.len(), 20);
    assert!(model.segments.iter().all(|s| s.measured_depth <= 2000.0));

    let labels: Vec<_> = model.shoes.iter().map(|s| s.label()).collect();
    assert_eq!(
        labels,
        [
            "end of riser",
            "end of cased section",
            "end of liner",
            "end of open hole"
        ]
    );
    let shoe_depths: Vec<_> = model.shoes.iter().map(|s| s.measured_depth).collect();
    assert_eq!(shoe_depths, [300.0, 1200.0, 1600.0, 2000.0]);

    // Every segment lies within the sampled depth range.
    assert!(model
        .pipe
        .vertices
        .iter()
        .all(|v| (0.0..=1.0).contains(&v.depth_row)));

    assert_eq!(loaded.time_bounds.min, 0.0);
    assert_eq!(loaded.time_bounds.max, 10.0);
    assert_eq!(loaded.time_bounds.step, 0.5);
    assert!((loaded.time_to_column.map(5.0) - 0.5).abs() < 1e-12);
}

#[test]
fn geometry_rebuild_is_deterministic() {
    let catalog = Catalog::scan(data_dir()).unwrap();
    let dir = catalog.connection("Well_1", "Connection_B").unwrap();
    let a = load_geometry(&dir, &MeshOptions::default()).unwrap();
    let b = load_geometry(&dir, &MeshOptions::default()).unwrap();
    assert_eq!(a.model.pipe, b.model.pipe);
    assert_eq!(a.model.shoe_mesh, b.model.shoe_mesh);
}

#[test]
fn image_load_renders_every_simulation() {
    let catalog = Catalog::scan(data_dir()).unwrap();
    let dir = catalog.connection("Well_1", "Connection_A").unwrap();

    for simulation in SimulationKind::ALL {
        let request = ImageRequest {
            simulation,
            colormap: Colormap::Inferno,
            thresholds: Thresholds::default(),
        };
        let texture = load_image(&dir, &request).unwrap();
        // 21 time samples across, 9 depth samples down.
        assert_eq!((texture.width(), texture.height()), (21, 9));
        let first = texture.pixel(0, 0).unwrap();
        assert!((0..texture.height()).any(|y| texture.pixel(0, y).unwrap() != first));
    }
}
