//! Low-level PDF assembly on top of `pdf_writer`.
//!
//! Image data is written into the document as pages arrive, so raw
//! pixel buffers never accumulate. Page dictionaries, content streams,
//! and annotations are deferred to `finish`, when the page count and
//! object references are all known.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::error::Result;
use crate::page::{LinkAnnotation, PageGeometry, PagePlacement, PageSink, RectMm};

fn mm_to_pt(mm: f64) -> f32 {
    (mm * 72.0 / 25.4) as f32
}

/// A page awaiting assembly: its embedded image and placement.
#[derive(Debug, Clone, Copy)]
struct PageSlot {
    image: Ref,
    rect: RectMm,
}

/// Incrementally built fixed-layout document.
///
/// Feed pages through the [`PageSink`] impl, optionally attach link
/// annotations, then call [`finish`](PdfDocument::finish) to obtain the
/// serialized bytes.
pub struct PdfDocument {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    tree_id: Ref,
    geometry: PageGeometry,
    title: String,
    pages: Vec<PageSlot>,
    links: Vec<LinkAnnotation>,
}

impl PdfDocument {
    pub fn new(geometry: PageGeometry, title: &str) -> Self {
        PdfDocument {
            pdf: Pdf::new(),
            next_id: 3,
            catalog_id: Ref::new(1),
            tree_id: Ref::new(2),
            geometry,
            title: title.to_string(),
            pages: Vec::new(),
            links: Vec::new(),
        }
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Queue link annotations for emission during `finish`.
    pub fn add_links(&mut self, links: Vec<LinkAnnotation>) {
        self.links.extend(links);
    }

    /// Assemble page dictionaries, content streams, annotations, and the
    /// document catalog, and serialize the whole file.
    pub fn finish(mut self) -> Vec<u8> {
        let count = self.pages.len();
        let page_ids: Vec<Ref> = (0..count).map(|_| self.alloc()).collect();
        let content_ids: Vec<Ref> = (0..count).map(|_| self.alloc()).collect();

        let page_width = mm_to_pt(self.geometry.page_width);
        let page_height = mm_to_pt(self.geometry.page_height);

        // Annotation objects, grouped by the page that carries them.
        let mut page_annots: Vec<Vec<Ref>> = vec![Vec::new(); count];
        let links = std::mem::take(&mut self.links);
        for link in links {
            if link.page == 0
                || link.page > count
                || link.target_page == 0
                || link.target_page > count
            {
                log::debug!(
                    "link outside page range ({} -> {})",
                    link.page,
                    link.target_page
                );
                continue;
            }
            let rect = self.annotation_rect(&link.rect);
            let annot_id = self.alloc();
            let mut annot = self.pdf.annotation(annot_id);
            annot
                .subtype(AnnotationType::Link)
                .rect(rect)
                .border(0.0, 0.0, 0.0, None);
            annot
                .action()
                .action_type(ActionType::GoTo)
                .destination()
                .page(page_ids[link.target_page - 1])
                .fit();
            drop(annot);
            page_annots[link.page - 1].push(annot_id);
        }

        // One content stream per page: paint the page's image into its
        // placement rectangle. PDF origin is bottom-left.
        for (index, slot) in self.pages.iter().enumerate() {
            let width = mm_to_pt(slot.rect.width);
            let height = mm_to_pt(slot.rect.height);
            let x = mm_to_pt(slot.rect.x);
            let y_bottom = mm_to_pt(self.geometry.page_height - slot.rect.y - slot.rect.height);

            let mut content = Content::new();
            content.save_state();
            content.transform([width, 0.0, 0.0, height, x, y_bottom]);
            content.x_object(Name(b"Im0"));
            content.restore_state();
            let compressed = deflate(&content.finish());
            self.pdf
                .stream(content_ids[index], &compressed)
                .filter(Filter::FlateDecode);
        }

        for (index, slot) in self.pages.iter().enumerate() {
            let mut page = self.pdf.page(page_ids[index]);
            page.media_box(Rect::new(0.0, 0.0, page_width, page_height))
                .parent(self.tree_id)
                .contents(content_ids[index]);
            if !page_annots[index].is_empty() {
                page.annotations(page_annots[index].iter().copied());
            }
            page.resources().x_objects().pair(Name(b"Im0"), slot.image);
        }

        self.pdf.catalog(self.catalog_id).pages(self.tree_id);
        self.pdf
            .pages(self.tree_id)
            .kids(page_ids.iter().copied())
            .count(count as i32);

        let info_id = self.alloc();
        self.pdf
            .document_info(info_id)
            .title(TextStr(&self.title))
            .producer(TextStr(concat!(
                env!("CARGO_PKG_NAME"),
                " ",
                env!("CARGO_PKG_VERSION")
            )));

        self.pdf.finish()
    }

    /// Convert a top-left millimeter rect to a bottom-left point rect.
    fn annotation_rect(&self, rect: &RectMm) -> Rect {
        Rect::new(
            mm_to_pt(rect.x),
            mm_to_pt(self.geometry.page_height - rect.y - rect.height),
            mm_to_pt(rect.x + rect.width),
            mm_to_pt(self.geometry.page_height - rect.y),
        )
    }
}

impl PageSink for PdfDocument {
    fn push_page(&mut self, placement: PagePlacement<'_>) -> Result<()> {
        let rows = placement
            .bitmap
            .rows(placement.rows.start, placement.rows.end);
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
        encoder.write_all(rows)?;
        let compressed = encoder.finish()?;

        let image = self.alloc();
        {
            let mut xobj = self.pdf.image_xobject(image, &compressed);
            xobj.filter(Filter::FlateDecode);
            xobj.width(placement.bitmap.width() as i32);
            xobj.height((placement.rows.end - placement.rows.start) as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }

        self.pages.push(PageSlot {
            image,
            rect: placement.rect,
        });
        Ok(())
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
    // Writing to a Vec cannot fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}
