//! Rendering: surface geometry, paint commands and the RGBA raster behind
//! every signature surface.

pub mod layout;
pub mod paint;
pub mod raster;

pub use layout::{Point, Rect, SurfaceLayout};
pub use paint::{CompositeOp, PaintCommand};
pub use raster::Raster;
