/// Rendered image buffer and its presentation (PNG file or terminal)
use std::io::Write;
use std::path::Path;

use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use image::{ImageBuffer, Rgba};

use crate::error::RenderResult;

/// Character luminosity ramp for terminal output (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// RGBA image with linear `f32` channels in `[0, 1]` plus a depth buffer.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 4]>,
    depth: Vec<f32>,
}

impl RenderedImage {
    /// Blank image: background colour, zero alpha, infinite depth.
    pub fn new(width: usize, height: usize, background: [f32; 3]) -> Self {
        let size = width * height;
        let [r, g, b] = background;
        Self {
            width,
            height,
            pixels: vec![[r, g, b, 0.0]; size],
            depth: vec![f32::INFINITY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        self.pixels[y * self.width + x]
    }

    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    /// Number of pixels covered by geometry.
    pub fn coverage(&self) -> usize {
        self.pixels.iter().filter(|p| p[3] > 0.0).count()
    }

    /// Write `color` at `(x, y)` if `depth` is nearer than what is there.
    pub(crate) fn write_if_nearer(&mut self, x: usize, y: usize, depth: f32, color: [f32; 3]) -> bool {
        let idx = y * self.width + x;
        if depth >= self.depth[idx] {
            return false;
        }
        self.depth[idx] = depth;
        self.pixels[idx] = [color[0], color[1], color[2], 1.0];
        true
    }

    /// Convert to 8-bit RGBA.
    pub fn to_rgba8(&self) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let p = self.pixel(x as usize, y as usize);
            Rgba(p.map(to_u8))
        })
    }

    /// Save as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        self.to_rgba8()
            .save_with_format(path.as_ref(), image::ImageFormat::Png)?;
        log::info!("saved render to {}", path.as_ref().display());
        Ok(())
    }

    /// Draw the image as coloured characters, one character per pixel.
    pub fn draw_ascii<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let [r, g, b, a] = self.pixel(x, y);
                if a <= 0.0 {
                    writer.queue(Print(' '))?;
                    continue;
                }

                let luminance = (0.2126 * r + 0.7152 * g + 0.0722 * b).clamp(0.0, 1.0);
                let char_index = (luminance * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
                // covered pixels never use the blank slot
                let character = LUMINOSITY_RAMP[char_index.clamp(1, LUMINOSITY_RAMP.len() - 1)];

                writer.queue(SetForegroundColor(Color::Rgb {
                    r: to_u8(r),
                    g: to_u8(g),
                    b: to_u8(b),
                }))?;
                writer.queue(Print(character))?;
            }
            writer.queue(ResetColor)?;
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
