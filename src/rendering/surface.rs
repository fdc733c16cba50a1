//! The mutable bitmap strokes accumulate on.

use super::paint::PaintCommand;
use super::raster::stroke_segment;
use super::Screenshot;
use crate::{Result, Viewport};
use image::{Rgba, RgbaImage};

/// A fixed-size RGBA bitmap owned by one controller.
///
/// The surface is only mutated through [`PixelSurface::apply`]; readers get
/// either a borrow or a frozen copy via [`PixelSurface::snapshot`].
#[derive(Debug, Clone)]
pub struct PixelSurface {
    image: RgbaImage,
    background: Rgba<u8>,
}

impl PixelSurface {
    pub fn new(viewport: Viewport, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(viewport.width, viewport.height, background),
            background,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Execute a paint command; returns the number of pixels written.
    pub fn apply(&mut self, cmd: &PaintCommand) -> usize {
        match cmd {
            PaintCommand::Clear { rgba } => {
                for p in self.image.pixels_mut() {
                    *p = *rgba;
                }
                self.image.width() as usize * self.image.height() as usize
            }
            PaintCommand::Line {
                from,
                to,
                width,
                rgba,
            } => stroke_segment(&mut self.image, *from, *to, *width, *rgba),
        }
    }

    /// A frozen copy of the current pixels.
    pub fn snapshot(&self) -> RgbaImage {
        self.image.clone()
    }

    /// True when every pixel still has the background color.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| *p == self.background)
    }

    /// Number of pixels that currently have `rgba`.
    pub fn count_pixels(&self, rgba: Rgba<u8>) -> usize {
        self.image.pixels().filter(|p| **p == rgba).count()
    }

    /// Encode the current pixels as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        Screenshot::encode(&self.image).map(|s| s.png_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn new_surface_is_blank_background() {
        let s = PixelSurface::new(Viewport::default(), WHITE);
        assert_eq!(s.width(), 400);
        assert_eq!(s.height(), 400);
        assert!(s.is_blank());
        assert_eq!(s.pixel(399, 399), Some(WHITE));
        assert_eq!(s.pixel(400, 0), None);
    }

    #[test]
    fn snapshot_is_detached_from_later_strokes() {
        let mut s = PixelSurface::new(Viewport { width: 32, height: 32 }, WHITE);
        let frozen = s.snapshot();
        let painted = s.apply(&PaintCommand::line(Point::new(2.0, 2.0), Point::new(30.0, 30.0), 4.0, BLACK));
        assert!(!s.is_blank());
        assert_eq!(s.count_pixels(BLACK), painted);
        assert_eq!(s.count_pixels(WHITE), 32 * 32 - painted);
        assert!(frozen.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn clear_resets_every_pixel() {
        let mut s = PixelSurface::new(Viewport { width: 10, height: 10 }, WHITE);
        s.apply(&PaintCommand::line(Point::new(0.0, 0.0), Point::new(9.0, 9.0), 2.0, BLACK));
        assert_eq!(s.apply(&PaintCommand::Clear { rgba: WHITE }), 100);
        assert!(s.is_blank());
    }

    #[test]
    fn blank_surface_encodes() {
        let s = PixelSurface::new(Viewport::default(), WHITE);
        let png = s.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
