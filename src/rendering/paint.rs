/// Paint commands understood by the pixel surface

use crate::Point;
use image::Rgba;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Fill the whole surface with one color
    Clear { rgba: Rgba<u8> },
    /// A round-capped stroke between two points
    Line {
        from: Point,
        to: Point,
        width: f32,
        rgba: Rgba<u8>,
    },
}

impl PaintCommand {
    pub fn line(from: Point, to: Point, width: f32, rgba: Rgba<u8>) -> Self {
        PaintCommand::Line {
            from,
            to,
            width,
            rgba,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_constructor_keeps_endpoints() {
        let cmd = PaintCommand::line(
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            4.0,
            Rgba([0, 0, 0, 255]),
        );
        match cmd {
            PaintCommand::Line { from, to, width, .. } => {
                assert_eq!(from, Point::new(1.0, 2.0));
                assert_eq!(to, Point::new(3.0, 4.0));
                assert_eq!(width, 4.0);
            }
            _ => panic!("unexpected"),
        }
    }
}
