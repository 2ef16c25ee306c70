use super::*;
use crate::config::{EditSettings, OverlayDefaults};
use crate::error::GeoError;
use crate::geometry::{AnchorCorners, Corner};
use crate::overlay::{ImageRef, OverlayRecord};
use crate::types::{GeoPoint, ImageSize, PixelPoint};

/// Plate carrée screen: one pixel is `step` degrees, y grows southward.
struct FlatViewport {
    origin: GeoPoint,
    step: f64,
}

impl MapViewport for FlatViewport {
    fn pixel_to_geo(&self, pixel: PixelPoint) -> Option<GeoPoint> {
        Some(GeoPoint::new(
            self.origin.lat - pixel.y * self.step,
            self.origin.lng + pixel.x * self.step,
        ))
    }

    fn geo_to_pixel(&self, geo: GeoPoint) -> Option<PixelPoint> {
        Some(PixelPoint::new(
            (geo.lng - self.origin.lng) / self.step,
            (self.origin.lat - geo.lat) / self.step,
        ))
    }
}

/// Map that has not been laid out yet.
struct DetachedViewport;

impl MapViewport for DetachedViewport {
    fn pixel_to_geo(&self, _: PixelPoint) -> Option<GeoPoint> {
        None
    }

    fn geo_to_pixel(&self, _: GeoPoint) -> Option<PixelPoint> {
        None
    }
}

fn viewport() -> FlatViewport {
    FlatViewport {
        origin: GeoPoint::new(50.0, 0.0),
        step: 0.01,
    }
}

/// Footprint covering screen pixels (10, 10) to (50, 50).
fn square(view: &FlatViewport) -> AnchorCorners {
    let nw = view.pixel_to_geo(PixelPoint::new(10.0, 10.0)).unwrap();
    let se = view.pixel_to_geo(PixelPoint::new(50.0, 50.0)).unwrap();
    AnchorCorners::rectangle(nw, se)
}

fn assert_geo_close(a: GeoPoint, b: GeoPoint) {
    assert!(
        (a.lat - b.lat).abs() < 1e-9 && (a.lng - b.lng).abs() < 1e-9,
        "{a:?} != {b:?}"
    );
}

#[test]
fn hit_test_prefers_corners_then_body() {
    let view = viewport();
    let corners = square(&view);
    assert_eq!(
        hit_test(&corners, PixelPoint::new(12.0, 9.0), &view, 10.0),
        Some(Handle::Corner(Corner::NorthWest))
    );
    assert_eq!(
        hit_test(&corners, PixelPoint::new(48.0, 52.0), &view, 10.0),
        Some(Handle::Corner(Corner::SouthEast))
    );
    assert_eq!(
        hit_test(&corners, PixelPoint::new(30.0, 30.0), &view, 10.0),
        Some(Handle::Center)
    );
    assert_eq!(
        hit_test(&corners, PixelPoint::new(90.0, 30.0), &view, 10.0),
        None
    );
    assert_eq!(
        hit_test(&corners, PixelPoint::new(30.0, 30.0), &DetachedViewport, 10.0),
        None
    );
}

#[test]
fn center_drag_translates_without_reshaping() {
    let view = viewport();
    let start = square(&view);
    let mut editor = OverlayEditor::new(start);

    assert_eq!(
        editor.press(PixelPoint::new(30.0, 30.0), &view),
        Some(Handle::Center)
    );
    editor.pointer_move(PixelPoint::new(35.0, 32.0), &view);
    let live = editor.pointer_move(PixelPoint::new(40.0, 35.0), &view);

    for corner in Corner::ALL {
        let before = start.corner(corner);
        let after = live.corner(corner);
        assert_geo_close(after, before.offset(-0.05, 0.1));
    }
    let span_before = start.top_left.degree_distance(start.bottom_right);
    let span_after = live.top_left.degree_distance(live.bottom_right);
    assert!((span_before - span_after).abs() < 1e-12);

    let outcome = editor.release().unwrap();
    assert_eq!(outcome.handle, Handle::Center);
    assert_eq!(outcome.corners, live);
    assert_geo_close(outcome.center, live.center());
    assert_eq!(editor.committed(), live);
    assert!(!editor.is_dragging());
}

#[test]
fn corner_drag_keeps_opposite_corner_fixed() {
    let view = viewport();
    let start = square(&view);
    let mut editor = OverlayEditor::new(start);

    assert_eq!(
        editor.press(PixelPoint::new(10.0, 10.0), &view),
        Some(Handle::Corner(Corner::NorthWest))
    );
    let live = editor.pointer_move(PixelPoint::new(20.0, 25.0), &view);

    assert_geo_close(live.top_left, GeoPoint::new(49.75, 0.2));
    assert_eq!(live.bottom_right, start.bottom_right);
    assert!(live.is_axis_aligned(1e-12));
    assert!(live.validate_footprint().is_ok());
}

#[test]
fn corner_dragged_past_opposite_is_normalized() {
    let view = viewport();
    let start = square(&view);
    let mut editor = OverlayEditor::new(start);
    editor.begin(Handle::Corner(Corner::NorthWest), PixelPoint::new(10.0, 10.0));

    let live = editor.pointer_move(PixelPoint::new(70.0, 70.0), &view);

    assert_eq!(live.top_left, start.bottom_right);
    assert_geo_close(live.bottom_right, GeoPoint::new(49.3, 0.7));
    assert!(live.validate_footprint().is_ok());
}

#[test]
fn crossing_over_and_back_keeps_the_start_opposite_corner() {
    let view = viewport();
    let start = square(&view);
    let mut editor = OverlayEditor::new(start);
    editor.begin(Handle::Corner(Corner::NorthWest), PixelPoint::new(10.0, 10.0));

    editor.pointer_move(PixelPoint::new(70.0, 70.0), &view);
    editor.pointer_move(PixelPoint::new(60.0, 30.0), &view);
    let live = editor.pointer_move(PixelPoint::new(20.0, 20.0), &view);

    let dragged = view.pixel_to_geo(PixelPoint::new(20.0, 20.0)).unwrap();
    assert_eq!(live, AnchorCorners::rectangle(dragged, start.bottom_right));
    assert_eq!(live.bottom_right, start.bottom_right);

    let outcome = editor.release().unwrap();
    assert_eq!(outcome.corners, live);
}

#[test]
fn corner_dropped_on_opposite_is_flagged_at_madrid() {
    let view = FlatViewport {
        origin: GeoPoint::new(40.45, -3.73),
        step: 0.001,
    };
    let mut editor = OverlayEditor::new(square(&view));
    assert_eq!(
        editor.press(PixelPoint::new(50.0, 50.0), &view),
        Some(Handle::Corner(Corner::SouthEast))
    );
    editor.pointer_move(PixelPoint::new(30.0, 40.0), &view);
    editor.pointer_move(PixelPoint::new(10.0, 10.0), &view);

    let outcome = editor.release().unwrap();
    assert!(matches!(
        outcome.corners.validate_footprint(),
        Err(GeoError::DegenerateConfiguration(_))
    ));
}

#[test]
fn corner_dropped_on_opposite_fails_footprint_check() {
    let view = viewport();
    let mut editor = OverlayEditor::new(square(&view));
    editor.begin(Handle::Corner(Corner::NorthWest), PixelPoint::new(10.0, 10.0));
    editor.pointer_move(PixelPoint::new(50.0, 50.0), &view);

    let outcome = editor.release().unwrap();
    assert!(matches!(
        outcome.corners.validate_footprint(),
        Err(GeoError::DegenerateConfiguration(_))
    ));
}

#[test]
fn unavailable_viewport_holds_last_geometry() {
    let view = viewport();
    let start = square(&view);
    let mut editor = OverlayEditor::new(start);
    editor.begin(Handle::Center, PixelPoint::new(30.0, 30.0));

    let moved = editor.pointer_move(PixelPoint::new(40.0, 30.0), &view);
    assert_ne!(moved, start);

    let held = editor.pointer_move(PixelPoint::new(80.0, 80.0), &DetachedViewport);
    assert_eq!(held, moved);

    let held = editor.pointer_move(PixelPoint::new(f64::NAN, 30.0), &view);
    assert_eq!(held, moved);
}

#[test]
fn locked_editor_refuses_drags() {
    let view = viewport();
    let start = square(&view);
    let mut editor = OverlayEditor::new(start);
    editor.set_locked(true);

    assert_eq!(editor.press(PixelPoint::new(30.0, 30.0), &view), None);
    assert!(!editor.begin(Handle::Center, PixelPoint::new(30.0, 30.0)));
    assert_eq!(editor.pointer_move(PixelPoint::new(40.0, 40.0), &view), start);
    assert_eq!(editor.release(), None);
}

#[test]
fn locking_mid_drag_restores_committed_corners() {
    let view = viewport();
    let start = square(&view);
    let mut editor = OverlayEditor::new(start);
    editor.begin(Handle::Center, PixelPoint::new(30.0, 30.0));
    editor.pointer_move(PixelPoint::new(45.0, 30.0), &view);

    editor.set_locked(true);
    assert!(!editor.is_dragging());
    assert_eq!(editor.corners(), start);
}

#[test]
fn press_while_dragging_and_idle_release_are_ignored() {
    let view = viewport();
    let mut editor = OverlayEditor::new(square(&view));
    assert_eq!(editor.release(), None);
    assert_eq!(editor.leave(), None);

    editor.press(PixelPoint::new(10.0, 10.0), &view);
    assert_eq!(editor.press(PixelPoint::new(30.0, 30.0), &view), None);
    assert_eq!(
        editor.active_handle(),
        Some(Handle::Corner(Corner::NorthWest))
    );
    assert!(!editor.set_committed(square(&view)));
    assert!(editor.leave().is_some());
    assert!(editor.set_committed(square(&view)));
}

#[test]
fn mercator_viewport_round_trips_and_pans() {
    let center = GeoPoint::new(40.4168, -3.7038);
    let view = WebMercatorViewport::new(center, 12.0, 800.0, 600.0);

    let at = view.geo_to_pixel(center).unwrap();
    assert!((at.x - 400.0).abs() < 1e-6 && (at.y - 300.0).abs() < 1e-6);

    let pixel = PixelPoint::new(123.0, 456.0);
    let geo = view.pixel_to_geo(pixel).unwrap();
    assert!(geo.lat < center.lat && geo.lng < center.lng);
    let back = view.geo_to_pixel(geo).unwrap();
    assert!(back.distance(pixel) < 1e-6);

    let panned = view.panned(100.0, 0.0);
    let moved = panned.geo_to_pixel(center).unwrap();
    assert!((moved.x - 500.0).abs() < 1e-6 && (moved.y - 300.0).abs() < 1e-6);
}

#[test]
fn mercator_viewport_without_size_converts_nothing() {
    let view = WebMercatorViewport::new(GeoPoint::new(0.0, 0.0), 3.0, 0.0, 0.0);
    assert!(!view.is_ready());
    assert_eq!(view.pixel_to_geo(PixelPoint::new(1.0, 1.0)), None);
    assert_eq!(view.geo_to_pixel(GeoPoint::new(0.0, 0.0)), None);
}

#[test]
fn editor_for_record_inherits_lock_and_footprint() {
    let view = viewport();
    let mut record = OverlayRecord::new(
        "survey",
        ImageRef::from_url("https://tiles.example/s.png", ImageSize::new(40, 40).unwrap()),
        GeoPoint::new(49.7, 0.3),
        &OverlayDefaults::default(),
    );
    let settings = EditSettings::default();
    assert!(OverlayEditor::for_record(&record, &settings).is_none());

    record.anchors = Some(square(&view));
    record.set_locked(true);
    let mut editor = OverlayEditor::for_record(&record, &settings).unwrap();
    assert!(editor.is_locked());
    assert_eq!(editor.committed(), square(&view));
    assert_eq!(editor.press(PixelPoint::new(30.0, 30.0), &view), None);

    record.set_locked(false);
    let mut editor = OverlayEditor::for_record(&record, &settings).unwrap();
    assert_eq!(
        editor.press(PixelPoint::new(30.0, 30.0), &view),
        Some(Handle::Center)
    );
}
