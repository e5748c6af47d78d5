//! Reflowable EPUB export.
//!
//! Builds an EPUB 2 package from a [`Manuscript`]: XHTML content
//! documents for the cover, front matter, contents page, and chapters,
//! a shared stylesheet, the NCX navigation map, and the OPF root
//! manifest, all streamed into the zip container in a fixed entry
//! order with the uncompressed `mimetype` entry first.

mod writer;

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;
use crate::manuscript::Manuscript;
use crate::util::detect_media_format;

/// Configuration for EPUB export.
#[derive(Debug, Clone, Default)]
pub struct EpubConfig {
    /// Deflate level for compressed entries. `None` uses the zip
    /// library's default.
    pub compression_level: Option<u32>,
    /// Seed for generated identifiers. Seeded exports reproduce the
    /// same catalog number and package identifier every run.
    pub seed: Option<u64>,
    /// Publication date printed on the copyright page. Defaults to
    /// today's date.
    pub published: Option<chrono::NaiveDate>,
}

/// Exports a [`Manuscript`] as a reflowable EPUB package.
///
/// # Example
///
/// ```no_run
/// use bindery::epub::EpubExporter;
/// use bindery::manuscript::{Chapter, Manuscript};
///
/// let manuscript = Manuscript::new("Gone North", "R. Voss")
///     .with_chapter(Chapter::new(1, "The train left at dawn."));
///
/// let exporter = EpubExporter::new();
/// exporter.export_to_file(&manuscript, None, "gone_north.epub")?;
/// # Ok::<(), bindery::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EpubExporter {
    config: EpubConfig,
}

impl EpubExporter {
    /// Create an exporter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }

    /// Write the complete package for `manuscript` into `writer`.
    ///
    /// `cover` is an optional image given as a base64 data URL; see
    /// [`cover_data_url`] for wrapping raw bytes. A cover that fails to
    /// decode is logged and skipped, never fatal.
    pub fn export<W: Write + Seek>(
        &self,
        manuscript: &Manuscript,
        cover: Option<&str>,
        writer: &mut W,
    ) -> Result<()> {
        writer::write_package(manuscript, cover, &self.config, writer)
    }

    /// Write the package to a file on disk.
    pub fn export_to_file<P: AsRef<Path>>(
        &self,
        manuscript: &Manuscript,
        cover: Option<&str>,
        path: P,
    ) -> Result<()> {
        let mut file = File::create(path)?;
        self.export(manuscript, cover, &mut file)
    }
}

/// Write `manuscript` to an EPUB file with default settings.
pub fn write_epub<P: AsRef<Path>>(
    manuscript: &Manuscript,
    cover: Option<&str>,
    path: P,
) -> Result<()> {
    EpubExporter::new().export_to_file(manuscript, cover, path)
}

/// Write `manuscript` to any [`Write`] + [`Seek`] destination with
/// default settings.
pub fn write_epub_to_writer<W: Write + Seek>(
    manuscript: &Manuscript,
    cover: Option<&str>,
    writer: &mut W,
) -> Result<()> {
    EpubExporter::new().export(manuscript, cover, writer)
}

/// Wrap raw image bytes as the data URL the cover pipeline accepts,
/// sniffing the media type from `name` and the leading bytes.
pub fn cover_data_url(name: &str, data: &[u8]) -> String {
    let format = detect_media_format(name, data);
    format!(
        "data:{};base64,{}",
        format.mime_type(),
        STANDARD.encode(data)
    )
}
