//! Raster buffers and the rendering capability.
//!
//! Rendering is an external concern: an embedding application turns a
//! logical [`Section`] into pixels however it likes (HTML layout, a canvas,
//! a headless browser) and hands the engine a fixed-width [`Bitmap`] over a
//! white background. The engine only ever asks two things of a renderer:
//! render one section, and re-render the table of contents with the
//! bounding boxes of its chapter links.

use crate::error::Result;
use crate::section::{Anchor, Section};

/// A fixed-width RGB pixel buffer rendered over a white background.
///
/// Rows are stored top to bottom, three bytes per pixel. The row accessors
/// are the only pixel knowledge the page slicer needs, which keeps it
/// testable against synthetic buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create an all-white bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Bitmap {
            width,
            height,
            data: vec![0xFF; width as usize * height as usize * 3],
        }
    }

    /// Wrap raw RGB8 row-major bytes. Returns `None` when `data` is not
    /// exactly `width * height * 3` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 3 {
            return None;
        }
        Some(Bitmap {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the buffer has no pixels in at least one dimension.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One row of pixels as raw RGB bytes.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 3;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// A contiguous run of rows `[start, end)` as raw RGB bytes.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the buffer height.
    pub fn rows(&self, start: u32, end: u32) -> &[u8] {
        let stride = self.width as usize * 3;
        &self.data[start as usize * stride..end as usize * stride]
    }

    /// True when every channel of every pixel in row `y` is at or above
    /// `threshold`, i.e. the row reads as blank interline space.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn is_blank_row(&self, y: u32, threshold: u8) -> bool {
        self.row(y).iter().all(|&channel| channel >= threshold)
    }

    /// Set one pixel. Out-of-bounds coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        self.data[offset..offset + 3].copy_from_slice(&rgb);
    }

    /// Fill the full width of rows `[start, end)` with one color. Rows
    /// beyond the buffer are ignored.
    pub fn fill_rows(&mut self, start: u32, end: u32, rgb: [u8; 3]) {
        let end = end.min(self.height);
        for y in start.min(end)..end {
            let stride = self.width as usize * 3;
            let row = &mut self.data[y as usize * stride..(y as usize + 1) * stride];
            for pixel in row.chunks_exact_mut(3) {
                pixel.copy_from_slice(&rgb);
            }
        }
    }
}

/// Axis-aligned rectangle in buffer pixel coordinates.
///
/// Coordinates are fractional because layout engines report sub-pixel
/// bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A chapter reference located during a table-of-contents render: the
/// anchor it targets and its bounding box relative to the toc buffer
/// origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRegion {
    pub target: Anchor,
    pub bounds: PixelRect,
}

/// A fresh table-of-contents render with the chapter links it laid out.
#[derive(Debug, Clone)]
pub struct TocLayout {
    pub bitmap: Bitmap,
    pub links: Vec<LinkRegion>,
}

/// Rendering capability supplied by the embedding application.
///
/// Implementations hold whatever layout state they need (the "layout
/// root"); a missing or torn-down root surfaces as
/// [`Error::Render`](crate::Error::Render) from [`render`](Self::render)
/// and aborts the export.
pub trait RasterSource {
    /// Render one logical section at fixed width over a white background.
    fn render(&mut self, section: &Section) -> Result<Bitmap>;

    /// Render the table of contents again and report the chapter links it
    /// lays out, with coordinates measured in buffer pixels.
    ///
    /// The default returns `Ok(None)`: sources that cannot report link
    /// geometry produce documents without navigation links rather than
    /// failing the export.
    fn render_toc_layout(&mut self) -> Result<Option<TocLayout>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bitmap_is_white() {
        let bitmap = Bitmap::new(4, 3);
        assert_eq!(bitmap.width(), 4);
        assert_eq!(bitmap.height(), 3);
        for y in 0..3 {
            assert!(bitmap.is_blank_row(y, 230));
            assert!(bitmap.row(y).iter().all(|&c| c == 0xFF));
        }
    }

    #[test]
    fn test_from_raw_validates_length() {
        assert!(Bitmap::from_raw(2, 2, vec![0; 12]).is_some());
        assert!(Bitmap::from_raw(2, 2, vec![0; 11]).is_none());
        assert!(Bitmap::from_raw(2, 2, vec![0; 13]).is_none());
    }

    #[test]
    fn test_single_dark_pixel_breaks_blankness() {
        let mut bitmap = Bitmap::new(8, 4);
        bitmap.set_pixel(5, 2, [10, 10, 10]);
        assert!(bitmap.is_blank_row(1, 230));
        assert!(!bitmap.is_blank_row(2, 230));
    }

    #[test]
    fn test_threshold_boundary() {
        let mut bitmap = Bitmap::new(2, 1);
        bitmap.set_pixel(0, 0, [230, 230, 230]);
        assert!(bitmap.is_blank_row(0, 230));
        bitmap.set_pixel(0, 0, [229, 255, 255]);
        assert!(!bitmap.is_blank_row(0, 230));
    }

    #[test]
    fn test_fill_rows_and_rows_slice() {
        let mut bitmap = Bitmap::new(2, 5);
        bitmap.fill_rows(1, 3, [0, 0, 0]);
        assert!(bitmap.is_blank_row(0, 230));
        assert!(!bitmap.is_blank_row(1, 230));
        assert!(!bitmap.is_blank_row(2, 230));
        assert!(bitmap.is_blank_row(3, 230));

        let slice = bitmap.rows(1, 3);
        assert_eq!(slice.len(), 2 * 2 * 3);
        assert!(slice.iter().all(|&c| c == 0));

        // Clamped past the end.
        bitmap.fill_rows(4, 100, [1, 2, 3]);
        assert_eq!(bitmap.row(4)[..3], [1, 2, 3]);
    }

    #[test]
    fn test_empty_bitmaps() {
        assert!(Bitmap::new(0, 10).is_empty());
        assert!(Bitmap::new(10, 0).is_empty());
        assert!(!Bitmap::new(1, 1).is_empty());
    }
}
