//! One drawable signature cell.
//!
//! A surface runs a two-state machine: `begin` moves Idle to Drawing (only
//! while unlocked), `extend` renders segments while Drawing, and `end` returns
//! to Idle and persists the whole raster under the row's key. `resize` can
//! happen in either state and leaves the state alone.
//!
//! Nothing here returns an error. An unmounted surface (no raster yet) or a
//! locked one simply ignores input; storage and codec failures are logged.

use crate::codec;
use crate::platform::KeyValueStore;
use crate::rendering::layout::{device_size, Point};
use crate::rendering::{PaintCommand, Raster};
use crate::restore::RestoreWorker;
use crate::roster::RowId;
use crate::tool::Tool;
use image::RgbaImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a row index maps to a storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// `canvas{row}`
    #[default]
    Canvas,
    /// `signature_{row}`
    Signature,
}

impl KeyScheme {
    pub fn key(&self, row: RowId) -> String {
        match self {
            KeyScheme::Canvas => format!("canvas{}", row.0),
            KeyScheme::Signature => format!("signature_{}", row.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Idle,
    Drawing,
}

#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    tool: Tool,
    last: Point,
}

pub struct SignatureSurface {
    row: RowId,
    key: String,
    store: Arc<dyn KeyValueStore>,
    raster: Option<Raster>,
    stroke: Option<ActiveStroke>,
    locked: bool,
    /// Bumped whenever the raster is replaced or wiped; restores queued under
    /// an older generation are stale
    generation: u64,
}

impl SignatureSurface {
    /// A surface with no raster; call [`mount`](Self::mount) before drawing.
    pub fn new(row: RowId, scheme: KeyScheme, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            row,
            key: scheme.key(row),
            store,
            raster: None,
            stroke: None,
            locked: false,
            generation: 0,
        }
    }

    pub fn row(&self) -> RowId {
        self.row
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.raster.is_some()
    }

    pub fn state(&self) -> SurfaceState {
        if self.stroke.is_some() {
            SurfaceState::Drawing
        } else {
            SurfaceState::Idle
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Allocate a blank raster for a logical size at `dpr`.
    pub fn mount(&mut self, width: f32, height: f32, dpr: f32) {
        let (w, h) = device_size(width, height, dpr);
        self.raster = Some(Raster::new(w, h, dpr));
        self.stroke = None;
        self.generation += 1;
    }

    pub fn unmount(&mut self) {
        self.raster = None;
        self.stroke = None;
        self.generation += 1;
    }

    /// Rebuild the raster for a new logical size and pixel ratio, keeping
    /// what has been drawn so far.
    pub fn resize(&mut self, width: f32, height: f32, dpr: f32) {
        let Some(raster) = &self.raster else {
            debug!("resize on unmounted surface {}", self.row);
            return;
        };
        let (w, h) = device_size(width, height, dpr);
        if (w, h) == (raster.width(), raster.height()) && raster.scale() == dpr {
            return;
        }
        self.raster = Some(raster.rescaled(w, h, dpr));
    }

    pub fn begin(&mut self, point: Point, tool: Tool) {
        if self.locked {
            debug!("row {} is locked; ignoring stroke", self.row);
            return;
        }
        if self.raster.is_none() {
            debug!("begin on unmounted surface {}", self.row);
            return;
        }
        self.stroke = Some(ActiveStroke { tool, last: point });
    }

    pub fn extend(&mut self, point: Point) {
        if self.locked {
            return;
        }
        let (Some(stroke), Some(raster)) = (self.stroke.as_mut(), self.raster.as_mut()) else {
            return;
        };
        raster.apply(&stroke.tool.segment(stroke.last, point));
        stroke.last = point;
    }

    /// Finish the stroke and persist. Returns whether a stroke was ended.
    pub fn end(&mut self) -> bool {
        if self.locked || self.stroke.take().is_none() {
            return false;
        }
        self.persist();
        true
    }

    /// Lock or unlock editing. Locking mid-stroke abandons the stroke; the
    /// segments already drawn stay on the raster but are not persisted.
    pub fn set_locked(&mut self, locked: bool) {
        if locked && self.stroke.take().is_some() {
            debug!("row {} locked mid-stroke; stroke abandoned", self.row);
        }
        self.locked = locked;
    }

    /// Queue a persisted image for decoding; it is drawn when the worker's
    /// completion is handed to [`apply_restored`](Self::apply_restored).
    ///
    /// The stored image is drawn 1:1 in device pixels. An image saved at a
    /// different pixel ratio is not rescaled, so it comes back at the wrong
    /// logical size.
    pub fn restore(&self, encoded: &str, worker: &mut RestoreWorker) -> bool {
        if self.raster.is_none() {
            debug!("restore on unmounted surface {}", self.row);
            return false;
        }
        worker.submit(self.row, self.generation, encoded.to_string())
    }

    /// Draw a decoded image at the device-pixel origin. Returns false, drawing
    /// nothing, when the surface is unmounted or `generation` belongs to an
    /// earlier mount.
    pub fn apply_restored(&mut self, generation: u64, image: &RgbaImage) -> bool {
        if generation != self.generation {
            debug!("row {}: dropping restore from generation {} (now {})", self.row, generation, self.generation);
            return false;
        }
        let Some(raster) = self.raster.as_mut() else {
            return false;
        };
        raster.draw_image(image);
        true
    }

    /// Wipe the raster and delete the persisted image.
    pub fn clear(&mut self) {
        self.stroke = None;
        self.generation += 1;
        if let Some(raster) = self.raster.as_mut() {
            raster.apply(&PaintCommand::Clear);
        }
        if let Err(e) = self.store.remove(&self.key) {
            warn!("failed to delete {}: {}", self.key, e);
        }
    }

    /// True when nothing visible is on the surface (or it is unmounted).
    pub fn is_empty(&self) -> bool {
        self.raster.as_ref().map_or(true, Raster::is_blank)
    }

    pub fn to_data_url(&self) -> Option<String> {
        let raster = self.raster.as_ref()?;
        match codec::encode_data_url(raster.image()) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("failed to encode row {}: {}", self.row, e);
                None
            }
        }
    }

    /// Value currently stored under this surface's key.
    pub fn persisted(&self) -> Option<String> {
        match self.store.get(&self.key) {
            Ok(v) => v,
            Err(e) => {
                warn!("failed to read {}: {}", self.key, e);
                None
            }
        }
    }

    fn persist(&self) {
        let Some(url) = self.to_data_url() else {
            return;
        };
        match self.store.set(&self.key, &url) {
            Ok(()) => debug!("persisted {} ({} bytes)", self.key, url.len()),
            Err(e) => warn!("failed to persist {}: {}", self.key, e),
        }
    }
}
