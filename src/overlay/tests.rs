use super::*;
#[cfg(feature = "catalog")]
use std::fs;
use std::path::Path;

use crate::config::{EngineConfig, OverlayDefaults};
use crate::control::ControlPointSet;
use crate::error::GeoError;
use crate::geometry::AnchorCorners;
use crate::manipulate::{EditOutcome, Handle};
use crate::placement::place_overlay;
use crate::projection;
use crate::types::{GeoPoint, ImageSize, PixelPoint, PlanarPoint};

fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::new(width, height)
        .save(path)
        .expect("write png");
}

/// 2 km square centered on the origin of the Mercator plane.
fn planar_square() -> AnchorCorners {
    let at = |x, y| projection::unproject(PlanarPoint::new(x, y)).unwrap();
    AnchorCorners {
        top_left: at(-1000.0, 1000.0),
        top_right: at(1000.0, 1000.0),
        bottom_left: at(-1000.0, -1000.0),
        bottom_right: at(1000.0, -1000.0),
    }
}

fn madrid_set() -> ControlPointSet {
    ControlPointSet::from_pairs([
        (PixelPoint::new(0.0, 0.0), GeoPoint::new(40.4168, -3.7038)),
        (
            PixelPoint::new(100.0, 100.0),
            GeoPoint::new(40.4268, -3.6938),
        ),
    ])
    .unwrap()
}

fn sample_record(dir: &Path) -> OverlayRecord {
    let image_path = dir.join("sheet.png");
    write_png(&image_path, 100, 100);
    let image = ImageRef::from_path(&image_path).unwrap();
    let mut record = OverlayRecord::new(
        "Madrid 1875",
        image,
        GeoPoint::new(40.42, -3.70),
        &OverlayDefaults::default(),
    );
    let size = record.image.size;
    let placement = place_overlay(&madrid_set(), size, &EngineConfig::default()).unwrap();
    record.apply_placement(&placement).unwrap();
    record
}

#[test]
fn visual_state_clamps_and_normalizes() {
    let visual = OverlayVisualState::default()
        .with_opacity(1.7)
        .with_scale(0.01)
        .with_rotation(-90.0);
    assert!((visual.opacity - 1.0).abs() < f64::EPSILON);
    assert!((visual.scale - MIN_SCALE).abs() < f64::EPSILON);
    assert!((visual.rotation_degrees - 270.0).abs() < 1e-12);

    let visual = visual.with_scale(9.0).with_opacity(f64::NAN).with_rotation(720.0);
    assert!((visual.scale - MAX_SCALE).abs() < f64::EPSILON);
    assert!((visual.opacity - 1.0).abs() < f64::EPSILON);
    assert!(visual.rotation_degrees.abs() < 1e-12);
    assert_eq!(visual.scale_percent(), 500);
    assert_eq!(visual.with_opacity(0.456).opacity_percent(), 46);
}

#[test]
fn display_corners_identity_leaves_quad_alone() {
    let corners = planar_square();
    let shown = display_corners(&corners, &OverlayVisualState::default()).unwrap();
    for (a, b) in corners.to_array().into_iter().zip(shown.to_array()) {
        assert!(a.degree_distance(b) < 1e-12);
    }
}

#[test]
fn display_rotation_turns_clockwise_about_center() {
    let corners = planar_square();
    let visual = OverlayVisualState::default().with_rotation(90.0);
    let shown = display_corners(&corners, &visual).unwrap();
    assert!(shown.top_left.degree_distance(corners.top_right) < 1e-9);
    assert!(shown.top_right.degree_distance(corners.bottom_right) < 1e-9);
    assert!(shown.bottom_right.degree_distance(corners.bottom_left) < 1e-9);

    let doubled = display_corners(&corners, &OverlayVisualState::default().with_scale(2.0))
        .unwrap();
    let tl = projection::project(doubled.top_left).unwrap();
    assert!((tl.x + 2000.0).abs() < 1e-6 && (tl.y - 2000.0).abs() < 1e-6);
}

#[test]
fn placement_sets_anchors_and_position() {
    let dir = tempfile::tempdir().unwrap();
    let record = sample_record(dir.path());
    let anchors = record.anchors.unwrap();
    assert!(record.is_placed());
    assert_eq!(record.position, anchors.center());
    assert_eq!(record.image.size, ImageSize::new(100, 100).unwrap());
    assert!(record.image.crc32.is_some());
}

#[test]
fn collapsed_edit_is_rejected_and_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = sample_record(dir.path());
    let before = record.anchors;
    let corner = GeoPoint::new(40.42, -3.70);
    let outcome = EditOutcome {
        handle: Handle::Center,
        corners: AnchorCorners::rectangle(corner, corner),
        center: corner,
    };
    assert!(matches!(
        record.apply_edit(&outcome),
        Err(GeoError::DegenerateConfiguration(_))
    ));
    assert_eq!(record.anchors, before);
}

#[test]
fn set_position_moves_footprint_rigidly() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = sample_record(dir.path());
    let before = record.anchors.unwrap();
    let target = GeoPoint::new(41.0, -3.0);
    record.set_position(target).unwrap();
    let after = record.anchors.unwrap();
    assert!(after.center().degree_distance(target) < 1e-12);
    let span = |c: AnchorCorners| c.top_left.degree_distance(c.bottom_right);
    assert!((span(before) - span(after)).abs() < 1e-12);

    assert!(record.set_position(GeoPoint::new(95.0, 0.0)).is_err());
    assert_eq!(record.anchors, Some(after));
}

#[test]
fn record_json_round_trip() {
    let record = OverlayRecord::new(
        "remote",
        ImageRef::from_url("https://tiles.example/map.jpg", ImageSize::new(640, 480).unwrap()),
        GeoPoint::new(10.0, 20.0),
        &OverlayDefaults::default(),
    );
    let json = record.to_json().unwrap();
    assert!(json.contains("\"rotationDegrees\""));
    assert_eq!(OverlayRecord::from_json(&json).unwrap(), record);
}

#[test]
fn image_ref_checksum_follows_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.png");
    write_png(&path, 40, 30);
    let image = ImageRef::from_path(&path).unwrap();
    assert_eq!(image.size, ImageSize::new(40, 30).unwrap());
    assert_eq!(image.crc32, Some(compute_image_crc32(&path).unwrap()));

    write_png(&path, 41, 30);
    assert_ne!(image.crc32, Some(compute_image_crc32(&path).unwrap()));
    assert!(compute_image_crc32(&dir.path().join("absent.png")).is_err());
}

#[cfg(feature = "catalog")]
#[test]
fn catalog_round_trip_without_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let record = sample_record(dir.path());
    let catalog = OverlayCatalog {
        title: Some("Old Madrid".to_string()),
        overlays: vec![record.clone()],
    };
    let path = dir.path().join("maps.pinmap");
    save_catalog(&path, &catalog).unwrap();

    let loaded = load_catalog(&path).unwrap();
    assert_eq!(loaded.version, CATALOG_VERSION);
    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
    let restored = loaded.catalog.get(record.id).unwrap();
    assert_eq!(restored.anchors, record.anchors);
    assert_eq!(restored.visual, record.visual);
    assert_eq!(restored.created_at, record.created_at);
    assert!(matches!(
        &restored.image.source,
        ImageSource::Path { relative: Some(rel), .. } if rel == Path::new("sheet.png")
    ));
}

#[cfg(feature = "catalog")]
#[test]
fn moved_catalog_falls_back_to_relative_image_path() {
    let root = tempfile::tempdir().unwrap();
    let first_home = root.path().join("a");
    fs::create_dir_all(&first_home).unwrap();
    let record = sample_record(&first_home);
    let catalog = OverlayCatalog {
        title: None,
        overlays: vec![record],
    };
    save_catalog(&first_home.join("maps.pinmap"), &catalog).unwrap();

    let moved = root.path().join("b");
    fs::rename(&first_home, &moved).unwrap();
    let loaded = load_catalog(&moved.join("maps.pinmap")).unwrap();
    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
}

#[cfg(feature = "catalog")]
#[test]
fn changed_image_is_reported_as_checksum_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let record = sample_record(dir.path());
    let id = record.id;
    let catalog = OverlayCatalog {
        title: None,
        overlays: vec![record],
    };
    let path = dir.path().join("maps.pinmap");
    save_catalog(&path, &catalog).unwrap();
    write_png(&dir.path().join("sheet.png"), 50, 20);

    let loaded = load_catalog(&path).unwrap();
    assert!(!loaded.warnings.is_empty());
    assert!(loaded.warnings.iter().all(|w| matches!(
        w,
        CatalogWarning::ChecksumMismatch { overlay, .. } if *overlay == id
    )));
}

#[cfg(feature = "catalog")]
#[test]
fn missing_image_is_a_warning_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let record = sample_record(dir.path());
    let catalog = OverlayCatalog {
        title: None,
        overlays: vec![record],
    };
    let path = dir.path().join("maps.pinmap");
    save_catalog(&path, &catalog).unwrap();
    fs::remove_file(dir.path().join("sheet.png")).unwrap();

    let loaded = load_catalog(&path).unwrap();
    assert_eq!(loaded.catalog.overlays.len(), 1);
    assert!(
        loaded
            .warnings
            .iter()
            .any(|w| matches!(w, CatalogWarning::MissingImage { kind: PathKind::Absolute, .. }))
    );
}

#[cfg(feature = "catalog")]
#[test]
fn foreign_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-a-catalog.bin");
    fs::write(&path, b"GEOTIF\x02\x00\x00\x00garbage").unwrap();
    let err = load_catalog(&path).unwrap_err();
    assert!(format!("{err:#}").contains("magic"));

    fs::write(&path, b"PINM").unwrap();
    assert!(load_catalog(&path).is_err());
}

#[cfg(feature = "catalog")]
#[test]
fn catalog_lookup_and_removal() {
    let mut catalog = OverlayCatalog::default();
    let record = OverlayRecord::new(
        "remote",
        ImageRef::from_url("https://tiles.example/a.png", ImageSize::new(10, 10).unwrap()),
        GeoPoint::new(0.0, 0.0),
        &OverlayDefaults::default(),
    );
    let id = record.id;
    catalog.overlays.push(record);
    catalog.get_mut(id).unwrap().set_opacity(0.25);
    assert!((catalog.get(id).unwrap().visual.opacity - 0.25).abs() < f64::EPSILON);
    assert!(catalog.remove(id).is_some());
    assert!(catalog.get(id).is_none());
}
