// canvas.rs — drawable surfaces handed to a worker at init
//
// A worker owns exactly one `Canvas`. The controller builds it, moves it into
// the `Init` message, and never touches it again.

use crate::color::Rgba;

// ── Rect ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

// ── Canvas ────────────────────────────────────────────────────────────────────

pub trait Canvas: Send {
    fn size(&self) -> (u32, u32);

    /// Resize and clear to transparent black.
    fn resize(&mut self, width: u32, height: u32);

    /// Source-over fill, clipped to the surface.
    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Border band `thickness` px wide running inward from `rect`'s edges.
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, thickness: u32) {
        if rect.is_empty() || thickness == 0 {
            return;
        }
        let t = thickness.min(rect.w).min(rect.h);
        self.fill_rect(Rect::new(rect.x, rect.y, rect.w, t), color);
        self.fill_rect(Rect::new(rect.x, rect.y + rect.h - t, rect.w, t), color);
        let mid_h = rect.h.saturating_sub(t * 2);
        self.fill_rect(Rect::new(rect.x, rect.y + t, t, mid_h), color);
        self.fill_rect(Rect::new(rect.x + rect.w - t, rect.y + t, t, mid_h), color);
    }
}

// ── PixelCanvas ───────────────────────────────────────────────────────────────

/// In-memory RGBA8 framebuffer. Alpha is always stored as 0xFF once painted.
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// RGBA at (x, y), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl Canvas for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize((width as usize) * (height as usize) * 4, 0);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let x1 = rect.x.saturating_add(rect.w).min(self.width);
        let y1 = rect.y.saturating_add(rect.h).min(self.height);
        if rect.x >= x1 || rect.y >= y1 || color.3 == 0 {
            return;
        }
        for y in rect.y..y1 {
            for x in rect.x..x1 {
                let i = self.offset(x, y);
                let [r, g, b] = if color.3 == 0xFF {
                    [color.0, color.1, color.2]
                } else {
                    color.over([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
                };
                self.pixels[i] = r;
                self.pixels[i + 1] = g;
                self.pixels[i + 2] = b;
                self.pixels[i + 3] = 0xFF;
            }
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn fill_is_clipped() {
        let mut c = PixelCanvas::new(4, 4);
        c.fill_rect(Rect::new(2, 2, 10, 10), Rgb::new(1, 2, 3).opaque());
        assert_eq!(c.pixel(3, 3), Some([1, 2, 3, 255]));
        assert_eq!(c.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(c.pixel(4, 0), None);
    }

    #[test]
    fn translucent_fill_blends_over_existing() {
        let mut c = PixelCanvas::new(1, 1);
        c.fill_rect(Rect::new(0, 0, 1, 1), Rgb::WHITE.opaque());
        c.fill_rect(Rect::new(0, 0, 1, 1), Rgb::new(0, 0, 0).with_alpha(128));
        let [r, g, b, a] = c.pixel(0, 0).unwrap();
        assert_eq!((r, g, b, a), (127, 127, 127, 255));
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut c = PixelCanvas::new(16, 16);
        c.fill_rect(Rect::new(0, 0, 16, 16), Rgb::WHITE.opaque());
        c.stroke_rect(Rect::new(0, 0, 16, 16), Rgb::new(0x11, 0x5d, 0xf2).opaque(), 4);
        assert_eq!(c.pixel(0, 0), Some([0x11, 0x5d, 0xf2, 255]));
        assert_eq!(c.pixel(3, 8), Some([0x11, 0x5d, 0xf2, 255]));
        assert_eq!(c.pixel(15, 15), Some([0x11, 0x5d, 0xf2, 255]));
        assert_eq!(c.pixel(4, 4), Some([255, 255, 255, 255]));
        assert_eq!(c.pixel(11, 11), Some([255, 255, 255, 255]));
        assert_eq!(c.pixel(12, 8), Some([0x11, 0x5d, 0xf2, 255]));
    }

    #[test]
    fn resize_clears() {
        let mut c = PixelCanvas::new(2, 2);
        c.fill_rect(Rect::new(0, 0, 2, 2), Rgb::WHITE.opaque());
        c.resize(3, 1);
        assert_eq!(c.size(), (3, 1));
        assert_eq!(c.pixels().len(), 12);
        assert_eq!(c.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn empty_rects_draw_nothing() {
        let mut c = PixelCanvas::new(4, 4);
        c.stroke_rect(Rect::new(0, 0, 0, 4), Rgb::WHITE.opaque(), 2);
        c.fill_rect(Rect::new(1, 1, 4, 0), Rgb::WHITE.opaque());
        assert!(c.pixels().iter().all(|&b| b == 0));
    }
}
