//! The signature column of an attendance sheet.
//!
//! `SignatureSheet` owns one [`SignatureSurface`] per roster row and is the
//! only thing that routes input to them. Rows are addressed by [`RowId`];
//! toolbar state lives here and is turned into an explicit [`Tool`] at the
//! start of every stroke.

use crate::platform::{PlatformApi, ViewportMetrics};
use crate::rendering::{Point, Rect};
use crate::restore::RestoreWorker;
use crate::roster::{Roster, RosterRow, RowId};
use crate::surface::SignatureSurface;
use crate::tool::{Tool, ToolKind, ToolSettings};
use crate::{Error, Result, SheetConfig};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input delivered by the host, in client coordinates.
///
/// Pointer and touch events carry the bounding rect of the surface element
/// they hit, so the sheet can convert to surface-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        row: RowId,
        client: Point,
        #[serde(default)]
        bounds: Rect,
    },
    PointerMove {
        row: RowId,
        client: Point,
        #[serde(default)]
        bounds: Rect,
    },
    PointerUp {
        row: RowId,
    },
    TouchStart {
        row: RowId,
        touches: Vec<Point>,
        #[serde(default)]
        bounds: Rect,
    },
    TouchMove {
        row: RowId,
        touches: Vec<Point>,
        #[serde(default)]
        bounds: Rect,
    },
    TouchEnd {
        row: RowId,
    },
    Resize {
        container_width: f32,
        device_pixel_ratio: f32,
    },
}

/// What the host should do after dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    /// Suppress default handling (page scroll) for this touch event
    pub prevent_default: bool,
    /// The event ended a stroke and the row was written to storage
    pub persisted: bool,
}

pub struct SignatureSheet {
    config: SheetConfig,
    roster: Roster,
    platform: Arc<dyn PlatformApi>,
    surfaces: Vec<SignatureSurface>,
    row_locks: Vec<bool>,
    global_locked: bool,
    tools: ToolSettings,
    restores: RestoreWorker,
}

impl SignatureSheet {
    pub fn new(config: SheetConfig, roster: Roster, platform: Arc<dyn PlatformApi>) -> Result<Self> {
        config.validate()?;
        let store = platform.storage();
        let surfaces = roster
            .rows()
            .iter()
            .map(|row| SignatureSurface::new(row.id, config.key_scheme, store.clone()))
            .collect();
        let tools = ToolSettings::new(config.pen, config.eraser_radius, config.adjustable_eraser);
        let mut sheet = Self {
            row_locks: vec![false; roster.len()],
            global_locked: config.start_locked,
            config,
            roster,
            platform,
            surfaces,
            tools,
            restores: RestoreWorker::spawn(),
        };
        sheet.sync_locks();
        Ok(sheet)
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rows(&self) -> &[RosterRow] {
        self.roster.rows()
    }

    pub fn surface(&self, row: RowId) -> Option<&SignatureSurface> {
        self.surfaces.get(row.0)
    }

    pub fn surface_mut(&mut self, row: RowId) -> Option<&mut SignatureSurface> {
        self.surfaces.get_mut(row.0)
    }

    pub fn surfaces(&self) -> &[SignatureSurface] {
        &self.surfaces
    }

    pub fn metrics(&self) -> ViewportMetrics {
        self.platform.display().metrics()
    }

    /// Allocate every surface's raster and queue restores for rows that have
    /// a stored image. Returns the number of restores queued.
    pub fn mount(&mut self) -> usize {
        let metrics = self.metrics();
        let dpr = metrics.effective_dpr();
        let (w, h) = self.config.layout.logical_size(metrics.container_width);
        let store = self.platform.storage();

        let mut queued = 0;
        for surface in &mut self.surfaces {
            surface.mount(w, h, dpr);
            let saved = match store.get(surface.key()) {
                Ok(v) => v,
                Err(e) => {
                    warn!("failed to read {}: {}", surface.key(), e);
                    None
                }
            };
            if let Some(encoded) = saved {
                if surface.restore(&encoded, &mut self.restores) {
                    queued += 1;
                }
            }
        }
        debug!("mounted {} surfaces at {}x{} dpr {}; {} restores queued", self.surfaces.len(), w, h, dpr, queued);
        queued
    }

    pub fn unmount(&mut self) {
        for surface in &mut self.surfaces {
            surface.unmount();
        }
    }

    /// Draw whatever restores have finished decoding. Returns how many were
    /// applied.
    pub fn pump(&mut self) -> usize {
        let done = self.restores.try_completed();
        self.apply_restores(done)
    }

    /// Block until every queued restore is decoded and drawn.
    pub fn wait_for_restores(&mut self) -> usize {
        let done = self.restores.wait_all();
        self.apply_restores(done)
    }

    pub fn pending_restores(&self) -> usize {
        self.restores.in_flight()
    }

    fn apply_restores(&mut self, done: Vec<crate::restore::RestoreOutcome>) -> usize {
        let mut applied = 0;
        for outcome in done {
            let Some(surface) = self.surfaces.get_mut(outcome.row.0) else {
                continue;
            };
            match outcome.image {
                Ok(img) => {
                    if surface.apply_restored(outcome.generation, &img) {
                        applied += 1;
                    } else {
                        debug!("row {} was remounted or cleared before its restore finished", outcome.row);
                    }
                }
                Err(e) => warn!("could not restore row {}: {}", outcome.row, e),
            }
        }
        applied
    }

    pub fn handle_event(&mut self, event: InputEvent) -> EventResponse {
        let tool = self.tools.tool();
        match event {
            InputEvent::PointerDown { row, client, bounds } => {
                if let Some(s) = self.surfaces.get_mut(row.0) {
                    s.begin(bounds.to_local(client), tool);
                }
                EventResponse::default()
            }
            InputEvent::PointerMove { row, client, bounds } => {
                if let Some(s) = self.surfaces.get_mut(row.0) {
                    s.extend(bounds.to_local(client));
                }
                EventResponse::default()
            }
            InputEvent::PointerUp { row } | InputEvent::TouchEnd { row } => EventResponse {
                prevent_default: false,
                persisted: self.surfaces.get_mut(row.0).is_some_and(|s| s.end()),
            },
            InputEvent::TouchStart { row, touches, bounds } => {
                let Some(s) = self.surfaces.get_mut(row.0) else {
                    return EventResponse::default();
                };
                if let Some(first) = touches.first() {
                    s.begin(bounds.to_local(*first), tool);
                }
                EventResponse {
                    prevent_default: s.is_drawing(),
                    persisted: false,
                }
            }
            InputEvent::TouchMove { row, touches, bounds } => {
                let Some(s) = self.surfaces.get_mut(row.0) else {
                    return EventResponse::default();
                };
                if let Some(first) = touches.first() {
                    s.extend(bounds.to_local(*first));
                }
                EventResponse {
                    prevent_default: s.is_drawing(),
                    persisted: false,
                }
            }
            InputEvent::Resize { container_width, device_pixel_ratio } => {
                self.resize(container_width, device_pixel_ratio);
                EventResponse::default()
            }
        }
    }

    /// Record new viewport metrics and resize every surface to match.
    pub fn resize(&mut self, container_width: f32, device_pixel_ratio: f32) {
        let display = self.platform.display();
        let metrics = ViewportMetrics {
            container_width,
            device_pixel_ratio,
            ..display.metrics()
        };
        display.set_metrics(metrics);

        let dpr = metrics.effective_dpr();
        let (w, h) = self.config.layout.logical_size(container_width);
        for surface in &mut self.surfaces {
            surface.resize(w, h, dpr);
        }
    }

    pub fn set_tool(&mut self, kind: ToolKind) {
        self.tools.active = kind;
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tools.active
    }

    /// Tool the next stroke will be drawn with.
    pub fn current_tool(&self) -> Tool {
        self.tools.tool()
    }

    /// Returns the radius in effect after clamping.
    pub fn set_eraser_radius(&mut self, radius: f32) -> f32 {
        self.tools.set_eraser_radius(radius)
    }

    pub fn eraser_radius(&self) -> f32 {
        self.tools.eraser_radius
    }

    pub fn set_row_locked(&mut self, row: RowId, locked: bool) -> Result<()> {
        let slot = self.row_locks.get_mut(row.0).ok_or(Error::UnknownRow(row.0))?;
        *slot = locked;
        self.sync_locks();
        Ok(())
    }

    /// Global edit toggle; per-row locks are kept and re-apply when it is
    /// released.
    pub fn set_all_locked(&mut self, locked: bool) {
        self.global_locked = locked;
        self.sync_locks();
    }

    pub fn is_globally_locked(&self) -> bool {
        self.global_locked
    }

    pub fn is_locked(&self, row: RowId) -> bool {
        self.surfaces.get(row.0).map_or(true, SignatureSurface::is_locked)
    }

    fn sync_locks(&mut self) {
        for (surface, row_locked) in self.surfaces.iter_mut().zip(&self.row_locks) {
            surface.set_locked(self.global_locked || *row_locked);
        }
    }

    pub fn clear_row(&mut self, row: RowId) -> Result<()> {
        let surface = self.surfaces.get_mut(row.0).ok_or(Error::UnknownRow(row.0))?;
        surface.clear();
        Ok(())
    }

    pub fn clear_all(&mut self) {
        for surface in &mut self.surfaces {
            surface.clear();
        }
    }

    /// Stored image for a row, if any.
    pub fn persisted(&self, row: RowId) -> Option<String> {
        self.surfaces.get(row.0).and_then(SignatureSurface::persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::LocalPlatform;

    fn sheet() -> SignatureSheet {
        let mut s = SignatureSheet::new(
            SheetConfig::default(),
            Roster::default(),
            Arc::new(LocalPlatform::in_memory()),
        )
        .unwrap();
        s.mount();
        s
    }

    #[test]
    fn pointer_events_use_surface_local_coordinates() {
        let mut s = sheet();
        let bounds = Rect::new(100.0, 500.0, 640.0, 100.0);
        s.handle_event(InputEvent::PointerDown { row: RowId(1), client: Point::new(110.0, 510.0), bounds });
        s.handle_event(InputEvent::PointerMove { row: RowId(1), client: Point::new(150.0, 510.0), bounds });
        let r = s.handle_event(InputEvent::PointerUp { row: RowId(1) });
        assert!(r.persisted);

        let raster = s.surface(RowId(1)).unwrap().raster().unwrap();
        assert_eq!(raster.pixel_at(Point::new(30.0, 10.0)), Some([255, 0, 0, 255]));
    }

    #[test]
    fn touch_prevents_default_only_while_drawing() {
        let mut s = sheet();
        let r = s.handle_event(InputEvent::TouchStart {
            row: RowId(0),
            touches: vec![Point::new(5.0, 5.0)],
            bounds: Rect::default(),
        });
        assert!(r.prevent_default);

        let r = s.handle_event(InputEvent::TouchMove {
            row: RowId(0),
            touches: vec![Point::new(40.0, 5.0)],
            bounds: Rect::default(),
        });
        assert!(r.prevent_default);

        let r = s.handle_event(InputEvent::TouchEnd { row: RowId(0) });
        assert!(!r.prevent_default);
        assert!(r.persisted);

        // Between strokes a move lets the page scroll.
        let r = s.handle_event(InputEvent::TouchMove {
            row: RowId(0),
            touches: vec![Point::new(50.0, 5.0)],
            bounds: Rect::default(),
        });
        assert!(!r.prevent_default);

        s.set_all_locked(true);
        let r = s.handle_event(InputEvent::TouchStart {
            row: RowId(0),
            touches: vec![Point::new(5.0, 5.0)],
            bounds: Rect::default(),
        });
        assert!(!r.prevent_default);
        let r = s.handle_event(InputEvent::TouchMove {
            row: RowId(0),
            touches: vec![Point::new(60.0, 5.0)],
            bounds: Rect::default(),
        });
        assert!(!r.prevent_default);
    }

    #[test]
    fn locking_mid_touch_stops_preventing_scroll() {
        let mut s = sheet();
        s.handle_event(InputEvent::TouchStart {
            row: RowId(4),
            touches: vec![Point::new(5.0, 5.0)],
            bounds: Rect::default(),
        });
        s.set_row_locked(RowId(4), true).unwrap();
        let r = s.handle_event(InputEvent::TouchMove {
            row: RowId(4),
            touches: vec![Point::new(40.0, 5.0)],
            bounds: Rect::default(),
        });
        assert!(!r.prevent_default);
        assert!(s.surface(RowId(4)).unwrap().is_empty());
    }

    #[test]
    fn empty_touch_list_is_ignored() {
        let mut s = sheet();
        s.handle_event(InputEvent::TouchStart { row: RowId(0), touches: vec![], bounds: Rect::default() });
        assert!(!s.surface(RowId(0)).unwrap().is_drawing());
    }

    #[test]
    fn events_for_unknown_rows_are_ignored() {
        let mut s = sheet();
        let r = s.handle_event(InputEvent::PointerUp { row: RowId(99) });
        assert_eq!(r, EventResponse::default());
        assert!(matches!(s.set_row_locked(RowId(99), true), Err(Error::UnknownRow(99))));
    }

    #[test]
    fn row_lock_survives_global_toggle() {
        let mut s = sheet();
        s.set_row_locked(RowId(2), true).unwrap();
        s.set_all_locked(true);
        assert!(s.is_locked(RowId(0)));
        s.set_all_locked(false);
        assert!(!s.is_locked(RowId(0)));
        assert!(s.is_locked(RowId(2)));
    }

    #[test]
    fn tool_settings_flow_into_strokes() {
        let mut s = sheet();
        s.set_tool(ToolKind::Eraser);
        assert_eq!(s.set_eraser_radius(5.0), 10.0);
        assert_eq!(s.current_tool(), Tool::Eraser { radius: 10.0 });
    }

    #[test]
    fn pump_eventually_applies_restores() {
        let platform = Arc::new(LocalPlatform::in_memory());
        {
            let mut first = SignatureSheet::new(SheetConfig::default(), Roster::default(), platform.clone()).unwrap();
            first.mount();
            let bounds = Rect::default();
            first.handle_event(InputEvent::PointerDown { row: RowId(3), client: Point::new(10.0, 10.0), bounds });
            first.handle_event(InputEvent::PointerMove { row: RowId(3), client: Point::new(60.0, 10.0), bounds });
            first.handle_event(InputEvent::PointerUp { row: RowId(3) });
        }

        let mut s = SignatureSheet::new(SheetConfig::default(), Roster::default(), platform).unwrap();
        assert_eq!(s.mount(), 1);
        let mut applied = 0;
        for _ in 0..500 {
            applied += s.pump();
            if s.pending_restores() == 0 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert_eq!(applied, 1);
        assert!(!s.surface(RowId(3)).unwrap().is_empty());
    }

    #[test]
    fn unmounted_sheet_ignores_touch() {
        let mut s = sheet();
        s.unmount();
        let r = s.handle_event(InputEvent::TouchStart {
            row: RowId(0),
            touches: vec![Point::new(5.0, 5.0)],
            bounds: Rect::default(),
        });
        assert!(!r.prevent_default);
        assert!(s.surface_mut(RowId(0)).is_some_and(|surface| !surface.is_mounted()));
    }

    #[test]
    fn resize_event_updates_metrics_and_rasters() {
        let mut s = sheet();
        s.handle_event(InputEvent::Resize { container_width: 320.0, device_pixel_ratio: 2.0 });
        assert_eq!(s.metrics().container_width, 320.0);
        let r = s.surface(RowId(0)).unwrap().raster().unwrap();
        assert_eq!((r.width(), r.height()), (640, 200));
    }

    #[test]
    fn resize_keeps_touch_capability() {
        let display = ViewportMetrics { touch: true, ..Default::default() };
        let platform = Arc::new(LocalPlatform::with_store(Arc::new(crate::platform::MemoryStore::new()), display));
        let mut s = SignatureSheet::new(SheetConfig::default(), Roster::default(), platform).unwrap();
        s.mount();
        s.resize(300.0, 3.0);
        let m = s.metrics();
        assert!(m.touch);
        assert_eq!(m.effective_dpr(), 3.0);
    }
}
