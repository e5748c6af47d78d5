//! Logical document sections and their generation order.
//!
//! Both export paths walk the same section roster: cover (when a cover is
//! supplied), title page, copyright page, optional foreword and preface,
//! table of contents, chapters in input order, optional acknowledgements.
//! [`plan`] derives the fixed-layout rendering order from a manuscript;
//! the packaging path iterates the same roster internally.

use crate::manuscript::Manuscript;

/// The kind of a logical document section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Cover,
    Title,
    Copyright,
    Foreword,
    Preface,
    Toc,
    Chapter,
    Acknowledgements,
}

/// Stable key addressing a section for page-map lookup and link
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The table of contents.
    Toc,
    /// A chapter, addressed by its declared number.
    Chapter(u32),
}

/// One logical section to be rendered and paginated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// Set for chapter sections only.
    pub chapter_number: Option<u32>,
}

impl Section {
    /// Create a non-chapter section.
    pub fn of(kind: SectionKind) -> Self {
        Section {
            kind,
            chapter_number: None,
        }
    }

    /// Create a chapter section.
    pub fn chapter(number: u32) -> Self {
        Section {
            kind: SectionKind::Chapter,
            chapter_number: Some(number),
        }
    }

    /// The anchor this section registers in the page map, if any.
    /// Only the table of contents and chapters are addressable.
    pub fn anchor(&self) -> Option<Anchor> {
        match self.kind {
            SectionKind::Toc => Some(Anchor::Toc),
            SectionKind::Chapter => self.chapter_number.map(Anchor::Chapter),
            _ => None,
        }
    }
}

/// Sections of a manuscript in fixed-layout generation order.
///
/// The toc section is planned only when at least one chapter exists;
/// optional front/back matter appears only when the manuscript carries it.
pub fn plan(manuscript: &Manuscript, has_cover: bool) -> Vec<Section> {
    let mut sections = Vec::new();

    if has_cover {
        sections.push(Section::of(SectionKind::Cover));
    }
    sections.push(Section::of(SectionKind::Title));
    sections.push(Section::of(SectionKind::Copyright));
    if manuscript.foreword.is_some() {
        sections.push(Section::of(SectionKind::Foreword));
    }
    if manuscript.preface.is_some() {
        sections.push(Section::of(SectionKind::Preface));
    }
    if !manuscript.chapters.is_empty() {
        sections.push(Section::of(SectionKind::Toc));
    }
    for chapter in &manuscript.chapters {
        sections.push(Section::chapter(chapter.chapter_number));
    }
    if manuscript.acknowledgements.is_some() {
        sections.push(Section::of(SectionKind::Acknowledgements));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manuscript::Chapter;

    fn kinds(sections: &[Section]) -> Vec<SectionKind> {
        sections.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_plan_minimal_manuscript() {
        let manuscript = Manuscript::new("T", "A");
        let sections = plan(&manuscript, false);
        assert_eq!(
            kinds(&sections),
            vec![SectionKind::Title, SectionKind::Copyright]
        );
    }

    #[test]
    fn test_plan_orders_all_sections() {
        let manuscript = Manuscript::new("T", "A")
            .with_foreword("f")
            .with_preface("p")
            .with_chapter(Chapter::new(1, "one"))
            .with_chapter(Chapter::new(2, "two"))
            .with_acknowledgements("a");

        let sections = plan(&manuscript, true);
        assert_eq!(
            kinds(&sections),
            vec![
                SectionKind::Cover,
                SectionKind::Title,
                SectionKind::Copyright,
                SectionKind::Foreword,
                SectionKind::Preface,
                SectionKind::Toc,
                SectionKind::Chapter,
                SectionKind::Chapter,
                SectionKind::Acknowledgements,
            ]
        );
        assert_eq!(sections[6].chapter_number, Some(1));
        assert_eq!(sections[7].chapter_number, Some(2));
    }

    #[test]
    fn test_toc_requires_chapters() {
        let manuscript = Manuscript::new("T", "A").with_foreword("f");
        let sections = plan(&manuscript, false);
        assert!(sections.iter().all(|s| s.kind != SectionKind::Toc));

        let manuscript = manuscript.with_chapter(Chapter::new(1, "one"));
        let sections = plan(&manuscript, false);
        assert!(sections.iter().any(|s| s.kind == SectionKind::Toc));
    }

    #[test]
    fn test_chapters_keep_input_order() {
        let manuscript = Manuscript::new("T", "A")
            .with_chapter(Chapter::new(9, "nine"))
            .with_chapter(Chapter::new(3, "three"))
            .with_chapter(Chapter::new(7, "seven"));

        let numbers: Vec<u32> = plan(&manuscript, false)
            .iter()
            .filter_map(|s| s.chapter_number)
            .collect();
        assert_eq!(numbers, vec![9, 3, 7]);
    }

    #[test]
    fn test_anchors() {
        assert_eq!(Section::of(SectionKind::Toc).anchor(), Some(Anchor::Toc));
        assert_eq!(Section::chapter(4).anchor(), Some(Anchor::Chapter(4)));
        assert_eq!(Section::of(SectionKind::Title).anchor(), None);
        assert_eq!(Section::of(SectionKind::Cover).anchor(), None);
    }
}
