//! The raster a renderer owns and paints into.

use std::collections::BTreeMap;

use crate::error::RenderResult;
use crate::png::create_png_auto;
use crate::style::Color;

/// An RGBA raster plus string attributes for legend consumers.
///
/// Pixels are non-premultiplied RGBA, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    attributes: BTreeMap<String, String>,
}

impl RasterFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            attributes: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Make every pixel transparent and drop all attributes.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.attributes.clear();
    }

    /// Match the frame to a new size. Returns whether it changed.
    ///
    /// A resized frame is cleared.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
        self.attributes.clear();
        true
    }

    /// Replace the pixels of a rectangle, clipped to the frame.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w as i64).min(self.width as i64);
        let y1 = (y + h as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let rgba = color.to_array();
        let stride = self.width as usize * 4;
        for row in y0 as usize..y1 as usize {
            let start = row * stride + x0 as usize * 4;
            let end = row * stride + x1 as usize * 4;
            for px in self.pixels[start..end].chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[i..i + 4];
        Some(Color::new(px[0], px[1], px[2], px[3]))
    }

    /// Count of pixels with non-zero alpha.
    pub fn drawn_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        create_png_auto(&self.pixels, self.width as usize, self.height as usize)
    }
}
