//! Pagination: page geometry, whitespace-aware slicing, page assembly,
//! and table-of-contents link resolution.
//!
//! The pipeline is strictly two-phase:
//!
//! 1. [`PageAssembler::paginate`] renders and slices every section in
//!    generation order, pushing one placed slice per physical page into a
//!    [`PageSink`] and returning a [`Pagination`] (continuous page count
//!    plus the [`PageMap`] of anchor start pages).
//! 2. [`resolve_toc_links`] re-renders the table of contents for link
//!    geometry and turns each link whose target is in the page map into a
//!    [`LinkAnnotation`].
//!
//! Page numbers for forward references are unknowable until the whole
//! document is laid out, which is why resolution cannot be folded into the
//! first pass.

mod assembler;
mod links;
mod slicer;

pub use assembler::{PageAssembler, PageMap, PagePlacement, PageSink, Pagination};
pub use links::{LinkAnnotation, resolve_toc_links};
pub use slicer::PageSlicer;

/// Physical page geometry for fixed-layout output. All lengths are
/// millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    /// Margin applied on all four sides.
    pub margin: f64,
}

impl PageGeometry {
    /// A4 portrait with 14 mm margins, the fixed format of every export.
    pub const A4: PageGeometry = PageGeometry {
        page_width: 210.0,
        page_height: 297.0,
        margin: 14.0,
    };

    /// Usable width between the side margins.
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Usable height between the top and bottom margins.
    pub fn content_height(&self) -> f64 {
        self.page_height - 2.0 * self.margin
    }

    /// Millimeters per buffer pixel when a buffer of `buffer_width`
    /// columns is scaled to fill the usable width. Applied uniformly to
    /// both axes so slices are never distorted.
    pub fn scale(&self, buffer_width: u32) -> f64 {
        self.content_width() / buffer_width as f64
    }

    /// Buffer rows that fill one page's usable height at this width.
    pub fn rows_per_page(&self, buffer_width: u32) -> u32 {
        (self.content_height() / self.scale(buffer_width)).round() as u32
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::A4
    }
}

/// Axis-aligned rectangle on a physical page, millimeters from the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectMm {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_usable_area() {
        let geometry = PageGeometry::A4;
        assert_eq!(geometry.content_width(), 182.0);
        assert_eq!(geometry.content_height(), 269.0);
    }

    #[test]
    fn test_scale_is_uniform() {
        let geometry = PageGeometry::A4;
        assert_eq!(geometry.scale(364), 0.5);
        assert_eq!(geometry.scale(182), 1.0);
    }

    #[test]
    fn test_rows_per_page() {
        let geometry = PageGeometry::A4;
        assert_eq!(geometry.rows_per_page(364), 538);
        assert_eq!(geometry.rows_per_page(182), 269);
        // 269 / (182 / 1200) = 1773.626..., rounded up.
        assert_eq!(geometry.rows_per_page(1200), 1774);
    }
}
