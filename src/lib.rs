//! # bindery
//!
//! Turns a finished manuscript into shippable book files: a fixed-layout
//! paginated PDF assembled from rendered section bitmaps, and a
//! reflowable EPUB package.
//!
//! ## Features
//!
//! - Paginate rendered sections onto A4 pages, cutting at blank pixel
//!   rows so text lines survive page breaks intact
//! - Emit a PDF with one full-bleed page image per page and clickable
//!   table-of-contents links resolved after pagination
//! - Package an EPUB 2 with cover, front matter, contents page, and
//!   per-chapter content documents
//! - Reproducible output under a fixed identifier seed and publication
//!   date
//!
//! ## Quick Start
//!
//! ```no_run
//! use bindery::epub::write_epub;
//! use bindery::manuscript::{Chapter, Manuscript};
//!
//! let manuscript = Manuscript::new("Gone North", "R. Voss")
//!     .with_chapter(Chapter::new(1, "The train left at dawn.\n\nNobody waved."));
//! write_epub(&manuscript, None, "gone_north.epub")?;
//! # Ok::<(), bindery::Error>(())
//! ```
//!
//! ## Working with Manuscripts
//!
//! The [`Manuscript`] struct is the input to both exporters, usually
//! parsed from JSON but also buildable directly:
//!
//! ```
//! use bindery::manuscript::{Chapter, Manuscript};
//!
//! let manuscript = Manuscript::new("The Long Field", "Ada Quill")
//!     .with_genre("Mystery")
//!     .with_foreword("On the origins of this story.")
//!     .with_chapter(Chapter::new(1, "It began with a map.").with_title("The Map"));
//!
//! assert_eq!(manuscript.display_title(), "The Long Field");
//! assert_eq!(manuscript.chapters.len(), 1);
//! ```
//!
//! PDF export additionally needs a rendering collaborator implementing
//! [`RasterSource`], which turns each planned section into an RGB
//! bitmap; see the [`pdf`] module for a worked example.

mod error;
pub mod epub;
pub mod ident;
pub mod manuscript;
pub mod page;
pub mod pdf;
pub mod raster;
pub mod section;
pub(crate) mod util;

pub use epub::{EpubConfig, EpubExporter, write_epub};
pub use error::{Error, Result};
pub use manuscript::{Chapter, Manuscript};
pub use pdf::{PdfConfig, PdfExporter};
pub use raster::{Bitmap, RasterSource};
