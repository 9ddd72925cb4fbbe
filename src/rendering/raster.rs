/// RGBA raster with a logical-to-device scale transform

use crate::rendering::layout::Point;
use crate::rendering::paint::{CompositeOp, PaintCommand};
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Backing pixels of one surface.
///
/// Dimensions are in device pixels; paint commands are given in logical units
/// and multiplied by `scale` (the device pixel ratio) before rasterizing.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
    scale: f32,
}

impl Raster {
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            scale,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pixel at device coordinates, `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.image.get_pixel(x, y).0)
    }

    /// Pixel under a logical point after applying the scale transform.
    pub fn pixel_at(&self, p: Point) -> Option<[u8; 4]> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        self.pixel((p.x * self.scale) as u32, (p.y * self.scale) as u32)
    }

    /// Number of pixels with non-zero alpha.
    pub fn opaque_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] != 0).count()
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    pub fn apply(&mut self, cmd: &PaintCommand) {
        match cmd {
            PaintCommand::Segment { from, to, width, rgba, op } => {
                self.stroke_segment(*from, *to, *width, *rgba, *op)
            }
            PaintCommand::Clear => self.clear(),
        }
    }

    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = TRANSPARENT;
        }
    }

    /// Rasterize a round-capped segment: every pixel whose center lies within
    /// `width / 2` of the segment is composited. No anti-aliasing, so results
    /// are reproducible across runs.
    fn stroke_segment(&mut self, from: Point, to: Point, width: f32, rgba: [u8; 4], op: CompositeOp) {
        if self.width() == 0 || self.height() == 0 || width <= 0.0 {
            return;
        }
        let s = self.scale;
        let (ax, ay) = (from.x * s, from.y * s);
        let (bx, by) = (to.x * s, to.y * s);
        let half = width * s / 2.0;

        let min_x = (ax.min(bx) - half).floor().max(0.0) as i64;
        let min_y = (ay.min(by) - half).floor().max(0.0) as i64;
        let max_x = ((ax.max(bx) + half).ceil() as i64).min(self.width() as i64 - 1);
        let max_y = ((ay.max(by) + half).ceil() as i64).min(self.height() as i64 - 1);
        if max_x < min_x || max_y < min_y {
            return;
        }

        let (dx, dy) = (bx - ax, by - ay);
        let len_sq = dx * dx + dy * dy;
        let half_sq = half * half;
        let src = Rgba(rgba);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    (((cx - ax) * dx + (cy - ay) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (px, py) = (ax + t * dx - cx, ay + t * dy - cy);
                if px * px + py * py > half_sq {
                    continue;
                }
                let dst = self.image.get_pixel_mut(x as u32, y as u32);
                match op {
                    CompositeOp::SourceOver => *dst = source_over(*dst, src),
                    CompositeOp::DestinationOut => *dst = destination_out(*dst, src),
                }
            }
        }
    }

    /// Composite `img` over the raster at the device-pixel origin, 1:1.
    ///
    /// `img` is taken to be in device pixels at this raster's scale; no
    /// resampling happens when it was produced at another scale.
    pub fn draw_image(&mut self, img: &RgbaImage) {
        let w = img.width().min(self.width());
        let h = img.height().min(self.height());
        for y in 0..h {
            for x in 0..w {
                let dst = self.image.get_pixel_mut(x, y);
                *dst = source_over(*dst, *img.get_pixel(x, y));
            }
        }
    }

    /// Rebuild the raster at a new device size and scale, carrying existing
    /// content over so that logical coordinates keep pointing at the same
    /// strokes. New area is transparent, content past the new bounds is cut.
    pub fn rescaled(&self, width: u32, height: u32, scale: f32) -> Raster {
        let mut out = Raster::new(width, height, scale);
        if self.scale == scale {
            let w = width.min(self.width());
            let h = height.min(self.height());
            for y in 0..h {
                for x in 0..w {
                    out.image.put_pixel(x, y, *self.image.get_pixel(x, y));
                }
            }
            return out;
        }

        let ratio = self.scale / scale;
        for y in 0..height {
            let sy = ((y as f32 + 0.5) * ratio) as u32;
            if sy >= self.height() {
                break;
            }
            for x in 0..width {
                let sx = ((x as f32 + 0.5) * ratio) as u32;
                if sx >= self.width() {
                    break;
                }
                out.image.put_pixel(x, y, *self.image.get_pixel(sx, sy));
            }
        }
        out
    }

    /// Content digest (sha256 over dimensions and raw RGBA bytes), hex encoded.
    pub fn digest(&self) -> String {
        digest_image(&self.image)
    }
}

pub fn digest_image(img: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(img.width().to_be_bytes());
    hasher.update(img.height().to_be_bytes());
    hasher.update(img.as_raw());
    hex::encode(hasher.finalize())
}

fn source_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src.0[3];
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let sa = sa as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src.0[i] as f32 * sa + dst.0[i] as f32 * da * (1.0 - sa)) / oa;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (oa * 255.0).round() as u8;
    Rgba(out)
}

fn destination_out(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let keep = 1.0 - src.0[3] as f32 / 255.0;
    let a = (dst.0[3] as f32 * keep).round() as u8;
    if a == 0 {
        TRANSPARENT
    } else {
        Rgba([dst.0[0], dst.0[1], dst.0[2], a])
    }
}
