//! Resolves contents-page link regions against the page map after
//! pagination completes.

use crate::error::Result;
use crate::page::assembler::Pagination;
use crate::page::{PageGeometry, RectMm};
use crate::raster::RasterSource;
use crate::section::Anchor;

/// A clickable region on one page pointing at another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkAnnotation {
    /// 1-based page carrying the link.
    pub page: usize,
    /// Hit region in millimeters, top-left origin.
    pub rect: RectMm,
    /// 1-based destination page.
    pub target_page: usize,
}

/// Turn the contents page's link regions into page annotations.
///
/// The contents section is re-rendered through `render_toc_layout` since
/// the pagination pass only keeps page numbers, not sub-region
/// coordinates. Returns an empty list when the document has no contents
/// page, when the source exposes no layout, or when the layout buffer
/// has zero width. Regions whose target never landed on a page are
/// dropped silently.
pub fn resolve_toc_links<R>(
    source: &mut R,
    pagination: &Pagination,
    geometry: &PageGeometry,
) -> Result<Vec<LinkAnnotation>>
where
    R: RasterSource + ?Sized,
{
    let Some(toc_page) = pagination.page_map().get(&Anchor::Toc) else {
        return Ok(Vec::new());
    };
    let Some(layout) = source.render_toc_layout()? else {
        return Ok(Vec::new());
    };
    if layout.bitmap.width() == 0 {
        return Ok(Vec::new());
    }

    let scale = geometry.scale(layout.bitmap.width());
    let mut annotations = Vec::new();
    for region in &layout.links {
        let Some(target_page) = pagination.page_map().get(&region.target) else {
            log::debug!("dropping link to {:?}: no page recorded", region.target);
            continue;
        };
        annotations.push(LinkAnnotation {
            page: toc_page,
            rect: RectMm {
                x: geometry.margin + region.bounds.x * scale,
                y: geometry.margin + region.bounds.y * scale,
                width: region.bounds.width * scale,
                height: region.bounds.height * scale,
            },
            target_page,
        });
    }
    Ok(annotations)
}
