//! Rendering: the pixel surface strokes are drawn onto, and PNG output

pub mod paint;
pub mod raster;
pub mod surface;

pub use paint::PaintCommand;
pub use surface::PixelSurface;

use crate::Result;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// An encoded snapshot of a pixel surface.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// Encode an RGBA buffer as PNG.
    pub fn encode(image: &RgbaImage) -> Result<Self> {
        let mut png_data: Vec<u8> = Vec::new();
        image.write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)?;
        Ok(Self {
            width: image.width(),
            height: image.height(),
            png_data,
        })
    }
}
