//! Manuscript data model.
//!
//! A [`Manuscript`] is the read-only input to both export paths. It can be
//! built programmatically or deserialized from the upload collaborator's
//! JSON shape, which names the title and author fields `new_title` and
//! `new_author` (the plain names are accepted as aliases).

use serde::Deserialize;

use crate::error::Result;

/// A structured manuscript: metadata, chapters, and optional front/back
/// matter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manuscript {
    /// Book title. Blank values display as "Untitled".
    #[serde(default, rename = "new_title", alias = "title")]
    pub title: String,

    /// Author name. Blank values display as "Unknown Author".
    #[serde(default, rename = "new_author", alias = "author")]
    pub author: String,

    /// Genre label. Packaging defaults a missing genre to "Fiction".
    #[serde(default)]
    pub genre: Option<String>,

    /// Ordered list of theme tags.
    #[serde(default)]
    pub themes: Vec<String>,

    /// Chapters in reading order.
    #[serde(default)]
    pub chapters: Vec<Chapter>,

    /// Optional foreword text block.
    #[serde(default)]
    pub foreword: Option<String>,

    /// Optional preface text block.
    #[serde(default)]
    pub preface: Option<String>,

    /// Optional acknowledgements text block.
    #[serde(default)]
    pub acknowledgements: Option<String>,
}

/// One chapter of a manuscript.
///
/// `chapter_number` is expected to be unique, but duplicates are accepted:
/// the later chapter silently wins any page-map entry they contend for.
#[derive(Debug, Clone, Deserialize)]
pub struct Chapter {
    /// Number used for anchors, headings, and content file names.
    pub chapter_number: u32,

    /// Optional chapter title.
    #[serde(default)]
    pub title: Option<String>,

    /// Chapter body; paragraphs are separated by a blank line.
    #[serde(default)]
    pub content: String,
}

impl Manuscript {
    /// Create a manuscript with the given title and author.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Manuscript {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    /// Parse a manuscript from the upload collaborator's JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the genre (builder style).
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Add a theme tag (builder style).
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.themes.push(theme.into());
        self
    }

    /// Add a chapter (builder style).
    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Set the foreword (builder style).
    pub fn with_foreword(mut self, text: impl Into<String>) -> Self {
        self.foreword = Some(text.into());
        self
    }

    /// Set the preface (builder style).
    pub fn with_preface(mut self, text: impl Into<String>) -> Self {
        self.preface = Some(text.into());
        self
    }

    /// Set the acknowledgements (builder style).
    pub fn with_acknowledgements(mut self, text: impl Into<String>) -> Self {
        self.acknowledgements = Some(text.into());
        self
    }

    /// Title for display, falling back to "Untitled".
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// Author for display, falling back to "Unknown Author".
    pub fn display_author(&self) -> &str {
        if self.author.trim().is_empty() {
            "Unknown Author"
        } else {
            &self.author
        }
    }

    /// Suggested output file name: the title with whitespace collapsed to
    /// underscores, or "book" when the title is blank.
    pub fn export_file_name(&self, extension: &str) -> String {
        let stem: Vec<&str> = self.title.split_whitespace().collect();
        if stem.is_empty() {
            format!("book.{extension}")
        } else {
            format!("{}.{extension}", stem.join("_"))
        }
    }
}

impl Chapter {
    /// Create a chapter with the given number and body text.
    pub fn new(chapter_number: u32, content: impl Into<String>) -> Self {
        Chapter {
            chapter_number,
            title: None,
            content: content.into(),
        }
    }

    /// Set the chapter title (builder style).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
