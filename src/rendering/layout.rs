/// Surface geometry: logical points, bounding rects and device-pixel sizing

use serde::{Deserialize, Serialize};

/// A point in logical (CSS-pixel-like) units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle of a surface in client coordinates, as a host would
/// report it for the element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Convert a client-space point into coordinates local to this rect.
    pub fn to_local(&self, client: Point) -> Point {
        Point::new(client.x - self.x, client.y - self.y)
    }
}

/// How surfaces are sized relative to their container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceLayout {
    /// Width follows the container, height is fixed (logical units)
    Fluid { height: f32 },
    /// Fixed logical box regardless of container width
    FixedBox { width: f32, height: f32 },
}

impl Default for SurfaceLayout {
    fn default() -> Self {
        SurfaceLayout::Fluid { height: 100.0 }
    }
}

impl SurfaceLayout {
    /// Logical size of a surface for the given container width.
    pub fn logical_size(&self, container_width: f32) -> (f32, f32) {
        match *self {
            SurfaceLayout::Fluid { height } => (container_width.max(0.0), height),
            SurfaceLayout::FixedBox { width, height } => (width, height),
        }
    }
}

/// Backing raster dimensions for a logical size at a device pixel ratio.
///
/// Fractional device sizes are truncated, as assigning a float to a canvas
/// dimension does.
pub fn device_size(logical_width: f32, logical_height: f32, dpr: f32) -> (u32, u32) {
    let w = (logical_width * dpr).max(0.0) as u32;
    let h = (logical_height * dpr).max(0.0) as u32;
    (w, h)
}
