//! signsheet
//!
//! Headless signature capture for attendance sheets. Every roster row gets a
//! raster surface that can be signed with pointer or touch input, erased, and
//! persisted to a local key-value store as a PNG data URL.
//!
//! # Features
//!
//! - **Pen and eraser strokes** rendered straight into an RGBA raster, scaled
//!   by the device pixel ratio
//! - **Per-row persistence** under `canvas{row}` or `signature_{row}` keys,
//!   rewritten whole after every stroke
//! - **Resize without loss**: content is carried over when the container or
//!   pixel ratio changes
//! - **Edit locks** per row and for the whole sheet
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use signsheet::{InputEvent, Point, Rect, RowId, Roster, SheetConfig, SignatureSheet};
//! use signsheet::platform::LocalPlatform;
//!
//! # fn main() -> signsheet::Result<()> {
//! let platform = Arc::new(LocalPlatform::in_memory());
//! let mut sheet = SignatureSheet::new(SheetConfig::default(), Roster::default(), platform)?;
//! sheet.mount();
//!
//! let bounds = Rect::new(0.0, 0.0, 640.0, 100.0);
//! sheet.handle_event(InputEvent::PointerDown { row: RowId(0), client: Point::new(10.0, 10.0), bounds });
//! sheet.handle_event(InputEvent::PointerMove { row: RowId(0), client: Point::new(40.0, 30.0), bounds });
//! let resp = sheet.handle_event(InputEvent::PointerUp { row: RowId(0) });
//! assert!(resp.persisted);
//! assert!(sheet.persisted(RowId(0)).is_some());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod codec;
pub mod platform;
pub mod rendering;
pub mod restore;
pub mod roster;
pub mod sheet;
pub mod surface;
pub mod tool;

pub use rendering::{Point, Rect, SurfaceLayout};
pub use roster::{Roster, RosterRow, RowId};
pub use sheet::{EventResponse, InputEvent, SignatureSheet};
pub use surface::{KeyScheme, SignatureSurface, SurfaceState};
pub use tool::{PenStyle, Tool, ToolKind};

use serde::Deserialize;

/// Configuration for a signature sheet
///
/// Defaults match the plain canvas sheet: fluid surfaces 100 units tall, red
/// 3-unit pen, an adjustable eraser starting at radius 10, `canvas{row}` keys
/// and rows open for signing.
///
/// Every field may be omitted when loading from JSON.
///
/// # Examples
///
/// ```
/// let cfg: signsheet::SheetConfig =
///     serde_json::from_str(r#"{ "key_scheme": "signature", "start_locked": true }"#).unwrap();
/// assert!(cfg.start_locked);
/// assert_eq!(cfg.pen.width, 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Storage key naming
    pub key_scheme: KeyScheme,
    /// Surface sizing relative to the container
    pub layout: SurfaceLayout,
    /// Pen ink
    pub pen: PenStyle,
    /// Initial eraser radius in logical units
    pub eraser_radius: f32,
    /// Whether the eraser radius can be changed (otherwise fixed at 10)
    pub adjustable_eraser: bool,
    /// Whether the global edit lock starts engaged
    pub start_locked: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            key_scheme: KeyScheme::Canvas,
            layout: SurfaceLayout::default(),
            pen: PenStyle::default(),
            eraser_radius: tool::DEFAULT_ERASER_RADIUS,
            adjustable_eraser: true,
            start_locked: false,
        }
    }
}

impl SheetConfig {
    /// Preset for the signature-pad sheet: fixed 250x100 boxes, `signature_{row}`
    /// keys, rows locked until editing is switched on.
    pub fn signature_pad() -> Self {
        Self {
            key_scheme: KeyScheme::Signature,
            layout: SurfaceLayout::FixedBox { width: 250.0, height: 100.0 },
            start_locked: true,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.pen.width.is_finite() && self.pen.width > 0.0) {
            return Err(Error::ConfigError(format!("pen width must be positive, got {}", self.pen.width)));
        }
        if !(tool::MIN_ERASER_RADIUS..=tool::MAX_ERASER_RADIUS).contains(&self.eraser_radius) {
            return Err(Error::ConfigError(format!(
                "eraser radius must be within {}..={}, got {}",
                tool::MIN_ERASER_RADIUS,
                tool::MAX_ERASER_RADIUS,
                self.eraser_radius
            )));
        }
        let (w, h) = match self.layout {
            SurfaceLayout::Fluid { height } => (1.0, height),
            SurfaceLayout::FixedBox { width, height } => (width, height),
        };
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(Error::ConfigError(format!("surface layout must have a positive size: {:?}", self.layout)));
        }
        Ok(())
    }
}
