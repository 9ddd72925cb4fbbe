use signsheet::platform::{DisplayMetrics, KeyValueStore, LocalPlatform, MemoryStore, PlatformApi, SharedDisplay, ViewportMetrics};
use std::sync::Arc;

#[test]
fn local_platform_smoke() {
    let p = LocalPlatform::in_memory();

    // display
    let d = p.display();
    assert_eq!(d.metrics().container_width, 640.0);
    d.set_metrics(ViewportMetrics {
        container_width: 360.0,
        device_pixel_ratio: 3.0,
        touch: true,
    });
    assert_eq!(p.display().metrics().container_width, 360.0);

    // storage
    let s = p.storage();
    s.set("canvas0", "data:image/png;base64,AA==").unwrap();
    assert_eq!(s.keys().unwrap(), vec!["canvas0".to_string()]);
}

#[test]
fn custom_handles_are_shared_not_copied() {
    let store = Arc::new(MemoryStore::new());
    let display = Arc::new(SharedDisplay::default());
    let p = LocalPlatform::new(store.clone(), display.clone());

    p.storage().set("signature_2", "x").unwrap();
    assert_eq!(store.get("signature_2").unwrap().as_deref(), Some("x"));

    display.set_metrics(ViewportMetrics { device_pixel_ratio: 0.0, ..Default::default() });
    assert_eq!(p.display().metrics().effective_dpr(), 1.0);
}

#[cfg(feature = "json-store")]
#[test]
fn json_store_backs_a_sheet_across_runs() {
    use signsheet::platform::JsonFileStore;
    use signsheet::{InputEvent, Point, Rect, RowId, Roster, SheetConfig, SignatureSheet};

    let path = std::env::temp_dir().join(format!("signsheet-sheet-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let open = || {
        let store = Arc::new(JsonFileStore::open(&path).unwrap());
        let platform = Arc::new(LocalPlatform::with_store(store, ViewportMetrics::default()));
        SignatureSheet::new(SheetConfig::default(), Roster::default(), platform).unwrap()
    };

    let digest = {
        let mut sheet = open();
        sheet.mount();
        let bounds = Rect::default();
        sheet.handle_event(InputEvent::PointerDown { row: RowId(5), client: Point::new(10.0, 10.0), bounds });
        sheet.handle_event(InputEvent::PointerMove { row: RowId(5), client: Point::new(90.0, 60.0), bounds });
        assert!(sheet.handle_event(InputEvent::PointerUp { row: RowId(5) }).persisted);
        sheet.surface(RowId(5)).unwrap().raster().unwrap().digest()
    };

    let mut sheet = open();
    assert_eq!(sheet.mount(), 1);
    sheet.wait_for_restores();
    assert_eq!(sheet.surface(RowId(5)).unwrap().raster().unwrap().digest(), digest);
    let _ = std::fs::remove_file(&path);
}
