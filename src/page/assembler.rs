//! Drives rendering and slicing across a section plan, assigning page
//! numbers and recording where linkable sections begin.

use std::collections::HashMap;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::page::slicer::PageSlicer;
use crate::page::{PageGeometry, RectMm};
use crate::raster::{Bitmap, RasterSource};
use crate::section::{Anchor, Section};

/// Maps section anchors to the 1-based page where the section begins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMap {
    entries: HashMap<Anchor, usize>,
}

impl PageMap {
    pub(crate) fn record(&mut self, anchor: Anchor, page: usize) {
        self.entries.insert(anchor, page);
    }

    pub fn get(&self, anchor: &Anchor) -> Option<usize> {
        self.entries.get(anchor).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a pagination pass: how many pages were emitted and where
/// each anchored section landed.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    page_count: usize,
    page_map: PageMap,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn page_map(&self) -> &PageMap {
        &self.page_map
    }
}

/// One page's worth of content: a row range of a section buffer and the
/// rectangle it occupies on the page, in millimeters from the top-left
/// corner.
#[derive(Debug)]
pub struct PagePlacement<'a> {
    /// 1-based page number.
    pub number: usize,
    /// The section buffer this page is cut from.
    pub bitmap: &'a Bitmap,
    /// Row range of `bitmap` shown on this page.
    pub rows: Range<u32>,
    /// Placement rectangle on the page, top-left origin.
    pub rect: RectMm,
}

/// Receives pages as pagination produces them. Buffers are borrowed, so
/// a sink that outlives the pass must copy or encode what it needs.
pub trait PageSink {
    fn push_page(&mut self, placement: PagePlacement<'_>) -> Result<()>;
}

/// Walks a section plan in order, rendering each section once and
/// handing page-sized slices to a sink.
///
/// Page numbers run continuously across sections. The first slice of an
/// anchored section records the section's landing page; later slices do
/// not. Sections that render to an empty buffer contribute no pages and
/// record nothing.
#[derive(Debug, Clone)]
pub struct PageAssembler {
    geometry: PageGeometry,
    slicer: PageSlicer,
}

impl PageAssembler {
    pub fn new(geometry: PageGeometry) -> Self {
        PageAssembler {
            geometry,
            slicer: PageSlicer::new(),
        }
    }

    pub fn with_slicer(mut self, slicer: PageSlicer) -> Self {
        self.slicer = slicer;
        self
    }

    /// Paginate `plan` through `source` into `sink`.
    ///
    /// Each section is rendered exactly once and its buffer dropped
    /// before the next render, so peak memory holds a single section.
    pub fn paginate<R, S>(
        &self,
        source: &mut R,
        plan: &[Section],
        sink: &mut S,
    ) -> Result<Pagination>
    where
        R: RasterSource + ?Sized,
        S: PageSink + ?Sized,
    {
        if plan.is_empty() {
            return Err(Error::NoSections);
        }

        let mut page_count = 0;
        let mut page_map = PageMap::default();

        for section in plan {
            let bitmap = source.render(section)?;
            if bitmap.is_empty() {
                log::debug!("section {:?} rendered empty, skipping", section.kind);
                continue;
            }

            let capacity = self.geometry.rows_per_page(bitmap.width());
            let scale = self.geometry.scale(bitmap.width());
            let slices = self.slicer.slice(&bitmap, capacity);
            log::debug!(
                "section {:?}: {} rows across {} pages",
                section.kind,
                bitmap.height(),
                slices.len()
            );

            for (index, rows) in slices.into_iter().enumerate() {
                page_count += 1;
                if index == 0
                    && let Some(anchor) = section.anchor()
                {
                    page_map.record(anchor, page_count);
                }
                let rect = RectMm {
                    x: self.geometry.margin,
                    y: self.geometry.margin,
                    width: self.geometry.content_width(),
                    height: f64::from(rows.end - rows.start) * scale,
                };
                sink.push_page(PagePlacement {
                    number: page_count,
                    bitmap: &bitmap,
                    rows,
                    rect,
                })?;
            }
        }

        Ok(Pagination {
            page_count,
            page_map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionKind;

    /// Renders all-white buffers with per-section heights, so slicing
    /// cuts at exact page capacity.
    struct FixtureSource {
        width: u32,
    }

    impl FixtureSource {
        fn height_for(&self, section: &Section) -> u32 {
            match section.kind {
                SectionKind::Title => 538,
                SectionKind::Copyright => 300,
                SectionKind::Toc => 538,
                SectionKind::Chapter => match section.chapter_number {
                    Some(2) => 0,
                    _ => 1076,
                },
                _ => 538,
            }
        }
    }

    impl RasterSource for FixtureSource {
        fn render(&mut self, section: &Section) -> Result<Bitmap> {
            Ok(Bitmap::new(self.width, self.height_for(section)))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        numbers: Vec<usize>,
        rects: Vec<RectMm>,
        row_spans: Vec<u32>,
    }

    impl PageSink for RecordingSink {
        fn push_page(&mut self, placement: PagePlacement<'_>) -> Result<()> {
            self.numbers.push(placement.number);
            self.rects.push(placement.rect);
            self.row_spans.push(placement.rows.end - placement.rows.start);
            Ok(())
        }
    }

    fn assembler() -> PageAssembler {
        PageAssembler::new(PageGeometry::A4)
    }

    #[test]
    fn test_page_numbers_run_continuously_across_sections() {
        // Width 364 gives 538 rows per A4 page.
        let mut source = FixtureSource { width: 364 };
        let mut sink = RecordingSink::default();
        let plan = vec![
            Section::of(SectionKind::Title),
            Section::of(SectionKind::Toc),
            Section::chapter(1),
        ];

        let pagination = assembler()
            .paginate(&mut source, &plan, &mut sink)
            .unwrap();

        assert_eq!(sink.numbers, vec![1, 2, 3, 4]);
        assert_eq!(pagination.page_count(), 4);
    }

    #[test]
    fn test_first_slice_records_anchor() {
        let mut source = FixtureSource { width: 364 };
        let mut sink = RecordingSink::default();
        let plan = vec![
            Section::of(SectionKind::Title),
            Section::of(SectionKind::Toc),
            Section::chapter(1),
            Section::chapter(3),
        ];

        let pagination = assembler()
            .paginate(&mut source, &plan, &mut sink)
            .unwrap();

        let map = pagination.page_map();
        assert_eq!(map.get(&Anchor::Toc), Some(2));
        // Chapter 1 spans pages 3 and 4; only the first is recorded.
        assert_eq!(map.get(&Anchor::Chapter(1)), Some(3));
        assert_eq!(map.get(&Anchor::Chapter(3)), Some(5));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_unanchored_sections_record_nothing() {
        let mut source = FixtureSource { width: 364 };
        let mut sink = RecordingSink::default();
        let plan = vec![
            Section::of(SectionKind::Title),
            Section::of(SectionKind::Copyright),
        ];

        let pagination = assembler()
            .paginate(&mut source, &plan, &mut sink)
            .unwrap();

        assert_eq!(pagination.page_count(), 2);
        assert!(pagination.page_map().is_empty());
    }

    #[test]
    fn test_duplicate_chapter_number_keeps_last_position() {
        let mut source = FixtureSource { width: 364 };
        let mut sink = RecordingSink::default();
        let plan = vec![Section::chapter(7), Section::chapter(7)];

        let pagination = assembler()
            .paginate(&mut source, &plan, &mut sink)
            .unwrap();

        // Both render at two pages each; the later occurrence wins.
        assert_eq!(pagination.page_count(), 4);
        assert_eq!(pagination.page_map().get(&Anchor::Chapter(7)), Some(3));
    }

    #[test]
    fn test_empty_buffer_contributes_no_pages_or_anchors() {
        let mut source = FixtureSource { width: 364 };
        let mut sink = RecordingSink::default();
        let plan = vec![
            Section::chapter(1),
            Section::chapter(2), // renders at height 0
            Section::chapter(3),
        ];

        let pagination = assembler()
            .paginate(&mut source, &plan, &mut sink)
            .unwrap();

        assert_eq!(pagination.page_count(), 4);
        assert_eq!(pagination.page_map().get(&Anchor::Chapter(2)), None);
        assert_eq!(pagination.page_map().get(&Anchor::Chapter(3)), Some(3));
    }

    #[test]
    fn test_empty_plan_is_an_error() {
        let mut source = FixtureSource { width: 364 };
        let mut sink = RecordingSink::default();
        let result = assembler().paginate(&mut source, &[], &mut sink);
        assert!(matches!(result, Err(Error::NoSections)));
    }

    #[test]
    fn test_placement_rect_tracks_slice_height() {
        let mut source = FixtureSource { width: 364 };
        let mut sink = RecordingSink::default();
        let plan = vec![Section::of(SectionKind::Copyright)];

        assembler().paginate(&mut source, &plan, &mut sink).unwrap();

        // 300 rows at 0.5 mm/px leaves a 150 mm band inside the margins.
        assert_eq!(sink.row_spans, vec![300]);
        let rect = &sink.rects[0];
        assert_eq!(rect.x, 14.0);
        assert_eq!(rect.y, 14.0);
        assert_eq!(rect.width, 182.0);
        assert_eq!(rect.height, 150.0);
    }
}
