/// Paint commands understood by the raster

use crate::rendering::layout::Point;

/// Compositing mode of a paint operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    /// Paint over existing pixels
    SourceOver,
    /// Remove existing pixels where the shape covers them
    DestinationOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// A round-capped line segment in logical coordinates
    Segment {
        from: Point,
        to: Point,
        width: f32,
        rgba: [u8; 4],
        op: CompositeOp,
    },
    /// Reset every pixel to transparent
    Clear,
}
