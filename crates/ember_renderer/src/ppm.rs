//! Plain-text PPM (P3) output.

use crate::ImageBuffer;
use std::io::{self, Write};

/// Write an image as ASCII PPM.
///
/// Header `P3`, then `width height`, then `255`, then one `r g b` line per
/// pixel in row-major order from the top-left.
pub fn write_ppm<W: Write>(out: &mut W, image: &ImageBuffer) -> io::Result<()> {
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", image.width, image.height)?;
    writeln!(out, "255")?;

    for [r, g, b] in image.to_rgb() {
        writeln!(out, "{} {} {}", r, g, b)?;
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_write_ppm() {
        let mut image = ImageBuffer::new(2, 2);
        image.set(0, 0, Color::new(1.0, 0.0, 0.0));
        image.set(1, 0, Color::new(0.0, 1.0, 0.0));
        image.set(0, 1, Color::new(0.0, 0.0, 1.0));
        image.set(1, 1, Color::splat(0.25));

        let mut out = Vec::new();
        write_ppm(&mut out, &image).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "P3\n2 2\n255\n255 0 0\n0 255 0\n0 0 255\n128 128 128\n"
        );
    }

    #[test]
    fn test_write_ppm_one_line_per_pixel() {
        let image = ImageBuffer::new(5, 3);
        let mut out = Vec::new();
        write_ppm(&mut out, &image).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3 + 15);
        assert_eq!(lines[1], "5 3");
        assert!(lines[3..].iter().all(|line| *line == "0 0 0"));
    }
}
