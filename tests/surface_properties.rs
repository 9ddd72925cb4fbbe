//! Behavioural properties of a single signature surface

use signsheet::platform::{KeyValueStore, MemoryStore};
use signsheet::restore::RestoreWorker;
use signsheet::{KeyScheme, PenStyle, Point, RowId, SignatureSurface, Tool};
use std::sync::Arc;

fn surface(row: usize, store: &Arc<MemoryStore>) -> SignatureSurface {
    let mut s = SignatureSurface::new(RowId(row), KeyScheme::Canvas, store.clone());
    s.mount(320.0, 100.0, 1.0);
    s
}

fn pen() -> Tool {
    Tool::Pen(PenStyle::default())
}

fn sign(s: &mut SignatureSurface, points: &[(f32, f32)], tool: Tool) {
    let mut it = points.iter().map(|&(x, y)| Point::new(x, y));
    let Some(first) = it.next() else { return };
    s.begin(first, tool);
    for p in it {
        s.extend(p);
    }
    s.end();
}

#[test]
fn persisted_stroke_restores_pixel_for_pixel() {
    let store = Arc::new(MemoryStore::new());
    for row in [0usize, 3, 11] {
        let mut s = surface(row, &store);
        sign(&mut s, &[(10.0, 10.0), (60.0, 40.0), (120.0, 20.0)], pen());
        let stored = store.get(&format!("canvas{}", row)).unwrap().expect("persisted value");
        assert!(!stored.is_empty());

        let other = Arc::new(MemoryStore::new());
        let mut fresh = surface(row, &other);
        let mut worker = RestoreWorker::spawn();
        assert!(fresh.restore(&stored, &mut worker));
        for outcome in worker.wait_all() {
            assert!(fresh.apply_restored(outcome.generation, &outcome.image.unwrap()));
        }
        assert_eq!(fresh.raster().unwrap().digest(), s.raster().unwrap().digest());
    }
}

#[test]
fn end_without_stroke_leaves_store_alone() {
    let store = Arc::new(MemoryStore::new());
    let mut s = surface(0, &store);
    assert!(!s.end());
    assert!(store.get("canvas0").unwrap().is_none());

    sign(&mut s, &[(10.0, 10.0), (30.0, 30.0)], pen());
    let before = store.get("canvas0").unwrap();
    assert!(!s.end());
    assert_eq!(store.get("canvas0").unwrap(), before);
}

#[test]
fn locked_surface_ignores_strokes() {
    let store = Arc::new(MemoryStore::new());
    let mut s = surface(0, &store);
    sign(&mut s, &[(10.0, 10.0), (30.0, 30.0)], pen());
    let digest = s.raster().unwrap().digest();
    let stored = store.get("canvas0").unwrap();

    s.set_locked(true);
    sign(&mut s, &[(50.0, 50.0), (90.0, 60.0)], pen());
    sign(&mut s, &[(10.0, 10.0), (30.0, 30.0)], Tool::Eraser { radius: 20.0 });

    assert_eq!(s.raster().unwrap().digest(), digest);
    assert_eq!(store.get("canvas0").unwrap(), stored);
}

#[test]
fn pen_adds_and_eraser_removes_pixels() {
    let store = Arc::new(MemoryStore::new());
    let mut s = surface(0, &store);

    let c0 = s.raster().unwrap().opaque_pixel_count();
    sign(&mut s, &[(10.0, 20.0), (150.0, 20.0)], pen());
    let c1 = s.raster().unwrap().opaque_pixel_count();
    assert!(c1 > c0);

    sign(&mut s, &[(10.0, 70.0), (150.0, 70.0)], pen());
    let c2 = s.raster().unwrap().opaque_pixel_count();
    assert!(c2 > c1);

    sign(&mut s, &[(80.0, 0.0), (80.0, 99.0)], Tool::Eraser { radius: 15.0 });
    let c3 = s.raster().unwrap().opaque_pixel_count();
    assert!(c3 < c2);
    assert_eq!(s.raster().unwrap().pixel_at(Point::new(80.0, 20.0)), Some([0, 0, 0, 0]));
}

#[test]
fn resize_preserves_signature() {
    let store = Arc::new(MemoryStore::new());
    let mut s = surface(0, &store);
    sign(&mut s, &[(10.0, 10.0), (20.0, 20.0), (30.0, 10.0)], pen());

    for (w, dpr) in [(480.0, 1.0), (480.0, 2.0), (200.0, 1.5)] {
        s.resize(w, 100.0, dpr);
        let r = s.raster().unwrap();
        assert_eq!(r.width(), (w * dpr) as u32);
        assert_eq!(r.pixel_at(Point::new(20.0, 20.0)), Some([255, 0, 0, 255]), "lost stroke at {}x{}", w, dpr);
    }
}
