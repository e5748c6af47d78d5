//! Fixed-layout PDF exporter.
//!
//! Renders each planned section to a pixel buffer, slices the buffers
//! into page-sized bands at whitespace boundaries, and assembles the
//! result into a paginated PDF with clickable contents-page links.

mod writer;

pub use writer::PdfDocument;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::manuscript::Manuscript;
use crate::page::{PageAssembler, PageGeometry, PageSlicer, resolve_toc_links};
use crate::raster::RasterSource;
use crate::section;

/// Configuration for PDF export.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfConfig {
    /// Page size and margins. Defaults to A4 with 14 mm margins.
    pub geometry: PageGeometry,
    /// Break-point search parameters.
    pub slicer: PageSlicer,
}

/// Fixed-layout PDF exporter.
///
/// Rendering is delegated to a [`RasterSource`]; the exporter owns
/// pagination, link resolution, and document assembly.
///
/// # Example
///
/// ```no_run
/// use bindery::manuscript::Manuscript;
/// use bindery::pdf::PdfExporter;
/// use bindery::raster::{Bitmap, RasterSource};
/// use bindery::section::Section;
///
/// struct Renderer;
///
/// impl RasterSource for Renderer {
///     fn render(&mut self, _section: &Section) -> bindery::Result<Bitmap> {
///         Ok(Bitmap::new(800, 1200))
///     }
/// }
///
/// let manuscript = Manuscript::new("My Book", "Me");
/// let bytes = PdfExporter::new().export(&manuscript, false, &mut Renderer)?;
/// std::fs::write("output.pdf", bytes)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfExporter {
    config: PdfConfig,
}

impl PdfExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: PdfConfig::default(),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    /// Export `manuscript` as PDF bytes.
    ///
    /// `has_cover` controls whether the section plan opens with a cover
    /// page for the source to render. Link resolution failures degrade
    /// to a link-free document rather than failing the export.
    pub fn export<R>(
        &self,
        manuscript: &Manuscript,
        has_cover: bool,
        source: &mut R,
    ) -> Result<Vec<u8>>
    where
        R: RasterSource + ?Sized,
    {
        let plan = section::plan(manuscript, has_cover);
        let assembler =
            PageAssembler::new(self.config.geometry).with_slicer(self.config.slicer);
        let mut document =
            PdfDocument::new(self.config.geometry, manuscript.display_title());

        let pagination = assembler.paginate(source, &plan, &mut document)?;
        match resolve_toc_links(source, &pagination, &self.config.geometry) {
            Ok(links) => document.add_links(links),
            Err(err) => log::warn!("contents links skipped: {err}"),
        }
        log::debug!(
            "paginated {} sections onto {} pages",
            plan.len(),
            pagination.page_count()
        );

        Ok(document.finish())
    }

    /// Export `manuscript` as a PDF file on disk.
    pub fn export_to_file<R, P>(
        &self,
        manuscript: &Manuscript,
        has_cover: bool,
        source: &mut R,
        path: P,
    ) -> Result<()>
    where
        R: RasterSource + ?Sized,
        P: AsRef<Path>,
    {
        let bytes = self.export(manuscript, has_cover, source)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}
