//! Drawing tools and the per-stroke tool value.
//!
//! Tool choice is not ambient state on a surface: the sheet builds a [`Tool`]
//! from its toolbar settings and hands it to `SignatureSurface::begin`, which
//! keeps it for the lifetime of that stroke.

use crate::rendering::{CompositeOp, PaintCommand, Point};
use serde::{Deserialize, Serialize};

pub const MIN_ERASER_RADIUS: f32 = 10.0;
pub const MAX_ERASER_RADIUS: f32 = 100.0;
pub const DEFAULT_ERASER_RADIUS: f32 = 10.0;

/// Clamp a requested eraser radius into the supported range.
pub fn clamp_eraser_radius(radius: f32) -> f32 {
    if radius.is_nan() {
        return DEFAULT_ERASER_RADIUS;
    }
    radius.clamp(MIN_ERASER_RADIUS, MAX_ERASER_RADIUS)
}

/// Which toolbar button is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
}

/// Ink used by the pen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenStyle {
    /// Stroke color, RGBA
    pub color: [u8; 4],
    /// Stroke width in logical units
    pub width: f32,
}

impl Default for PenStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0, 255],
            width: 3.0,
        }
    }
}

/// Tool captured for a single stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tool {
    Pen(PenStyle),
    /// Clears every pixel within `radius` logical units of the stroke path
    Eraser { radius: f32 },
}

impl Tool {
    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Pen(_) => ToolKind::Pen,
            Tool::Eraser { .. } => ToolKind::Eraser,
        }
    }

    /// Paint command for one segment of a stroke drawn with this tool.
    pub fn segment(&self, from: Point, to: Point) -> PaintCommand {
        match *self {
            Tool::Pen(style) => PaintCommand::Segment {
                from,
                to,
                width: style.width,
                rgba: style.color,
                op: CompositeOp::SourceOver,
            },
            Tool::Eraser { radius } => PaintCommand::Segment {
                from,
                to,
                width: radius * 2.0,
                rgba: [0, 0, 0, 255],
                op: CompositeOp::DestinationOut,
            },
        }
    }
}

/// Toolbar state held by the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub active: ToolKind,
    pub pen: PenStyle,
    pub eraser_radius: f32,
    /// Earlier sheets shipped a fixed-size eraser
    pub adjustable_eraser: bool,
}

impl ToolSettings {
    pub fn new(pen: PenStyle, eraser_radius: f32, adjustable_eraser: bool) -> Self {
        let eraser_radius = if adjustable_eraser {
            clamp_eraser_radius(eraser_radius)
        } else {
            DEFAULT_ERASER_RADIUS
        };
        Self {
            active: ToolKind::Pen,
            pen,
            eraser_radius,
            adjustable_eraser,
        }
    }

    /// Returns the radius actually in effect after the request.
    pub fn set_eraser_radius(&mut self, radius: f32) -> f32 {
        if self.adjustable_eraser {
            self.eraser_radius = clamp_eraser_radius(radius);
        }
        self.eraser_radius
    }

    pub fn tool(&self) -> Tool {
        match self.active {
            ToolKind::Pen => Tool::Pen(self.pen),
            ToolKind::Eraser => Tool::Eraser {
                radius: self.eraser_radius,
            },
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::new(PenStyle::default(), DEFAULT_ERASER_RADIUS, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_is_clamped() {
        assert_eq!(clamp_eraser_radius(2.0), 10.0);
        assert_eq!(clamp_eraser_radius(55.0), 55.0);
        assert_eq!(clamp_eraser_radius(500.0), 100.0);
        assert_eq!(clamp_eraser_radius(f32::NAN), DEFAULT_ERASER_RADIUS);
    }

    #[test]
    fn fixed_eraser_ignores_resize_requests() {
        let mut s = ToolSettings::new(PenStyle::default(), 40.0, false);
        assert_eq!(s.eraser_radius, 10.0);
        assert_eq!(s.set_eraser_radius(70.0), 10.0);
    }

    #[test]
    fn settings_build_explicit_tool() {
        let mut s = ToolSettings::default();
        assert!(matches!(s.tool(), Tool::Pen(p) if p.width == 3.0));
        s.active = ToolKind::Eraser;
        s.set_eraser_radius(25.0);
        assert_eq!(s.tool(), Tool::Eraser { radius: 25.0 });
    }

    #[test]
    fn eraser_segment_is_destination_out() {
        let t = Tool::Eraser { radius: 12.0 };
        match t.segment(Point::new(0.0, 0.0), Point::new(1.0, 1.0)) {
            PaintCommand::Segment { width, op, .. } => {
                assert_eq!(width, 24.0);
                assert_eq!(op, CompositeOp::DestinationOut);
            }
            _ => panic!("unexpected"),
        }
    }
}
