//! Zip container invariants for exported EPUB packages.
//!
//! Readers sniff the `mimetype` entry at a fixed offset, so these tests
//! check the raw bytes of the archive as well as its logical contents.

use std::io::{Cursor, Read};

use bindery::epub::EpubExporter;
use bindery::manuscript::{Chapter, Manuscript};
use zip::{CompressionMethod, ZipArchive};

fn sample_manuscript() -> Manuscript {
    Manuscript::new("Gone North", "R. Voss")
        .with_chapter(Chapter::new(1, "The train left at dawn.\n\nNobody waved."))
        .with_chapter(Chapter::new(2, "Snow by noon."))
}

/// A 1x1 PNG, base64-encoded as the cover pipeline expects.
fn png_cover() -> String {
    use base64::Engine;
    let png: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52,
    ];
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

fn export_bytes(manuscript: &Manuscript, cover: Option<&str>) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    EpubExporter::new()
        .export(manuscript, cover, &mut buffer)
        .expect("Failed to export EPUB");
    buffer.into_inner()
}

fn entry_names(bytes: Vec<u8>) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("Failed to open archive");
    (0..archive.len())
        .map(|i| {
            archive
                .by_index(i)
                .expect("Failed to read entry")
                .name()
                .to_string()
        })
        .collect()
}

fn read_entry(bytes: Vec<u8>, name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("Failed to open archive");
    let mut entry = archive.by_name(name).expect("Entry not found");
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .expect("Failed to read entry");
    content
}

// ============================================================================
// Raw byte layout
// ============================================================================

#[test]
fn test_mimetype_is_first_and_stored() {
    let bytes = export_bytes(&sample_manuscript(), None);

    // Local file header: signature, then compression method at offset 8,
    // name length at 26, extra length at 28, name at 30.
    assert_eq!(&bytes[0..4], b"PK\x03\x04", "Not a zip archive");

    let method = u16::from_le_bytes([bytes[8], bytes[9]]);
    assert_eq!(method, 0, "mimetype must be stored, not compressed");

    let name_len = u16::from_le_bytes([bytes[26], bytes[27]]) as usize;
    let extra_len = u16::from_le_bytes([bytes[28], bytes[29]]) as usize;
    assert_eq!(&bytes[30..30 + name_len], b"mimetype");

    let data_start = 30 + name_len + extra_len;
    assert_eq!(
        &bytes[data_start..data_start + 20],
        b"application/epub+zip",
        "mimetype payload must be readable at a fixed offset"
    );
}

#[test]
fn test_mimetype_entry_metadata() {
    let bytes = export_bytes(&sample_manuscript(), None);
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("Failed to open archive");

    let mimetype = archive.by_name("mimetype").expect("mimetype missing");
    assert_eq!(mimetype.compression(), CompressionMethod::Stored);
}

// ============================================================================
// Entry order
// ============================================================================

#[test]
fn test_entry_order_without_cover() {
    let names = entry_names(export_bytes(&sample_manuscript(), None));
    assert_eq!(
        names,
        vec![
            "mimetype",
            "META-INF/container.xml",
            "OEBPS/title.xhtml",
            "OEBPS/copyright.xhtml",
            "OEBPS/toc_page.xhtml",
            "OEBPS/chapter_1.xhtml",
            "OEBPS/chapter_2.xhtml",
            "OEBPS/style.css",
            "OEBPS/toc.ncx",
            "OEBPS/content.opf",
        ]
    );
}

#[test]
fn test_entry_order_full_manuscript_with_cover() {
    let manuscript = sample_manuscript()
        .with_foreword("A word before.")
        .with_preface("Why this book.")
        .with_acknowledgements("Thanks all.");
    let cover = png_cover();
    let names = entry_names(export_bytes(&manuscript, Some(&cover)));

    assert_eq!(
        names,
        vec![
            "mimetype",
            "META-INF/container.xml",
            "OEBPS/cover.xhtml",
            "OEBPS/title.xhtml",
            "OEBPS/copyright.xhtml",
            "OEBPS/foreword.xhtml",
            "OEBPS/preface.xhtml",
            "OEBPS/toc_page.xhtml",
            "OEBPS/chapter_1.xhtml",
            "OEBPS/chapter_2.xhtml",
            "OEBPS/acknowledgements.xhtml",
            "OEBPS/style.css",
            "OEBPS/cover.png",
            "OEBPS/toc.ncx",
            "OEBPS/content.opf",
        ]
    );
}

#[test]
fn test_chapterless_manuscript_keeps_contents_page() {
    // Unlike the fixed-layout plan, the package always carries a
    // contents document; without chapters its list is just empty.
    let manuscript = Manuscript::new("Essay", "A. Writer");
    let names = entry_names(export_bytes(&manuscript, None));
    assert_eq!(
        names,
        vec![
            "mimetype",
            "META-INF/container.xml",
            "OEBPS/title.xhtml",
            "OEBPS/copyright.xhtml",
            "OEBPS/toc_page.xhtml",
            "OEBPS/style.css",
            "OEBPS/toc.ncx",
            "OEBPS/content.opf",
        ]
    );
}

// ============================================================================
// Container pointer
// ============================================================================

#[test]
fn test_container_points_to_opf() {
    let container = read_entry(
        export_bytes(&sample_manuscript(), None),
        "META-INF/container.xml",
    );
    assert!(container.contains(r#"full-path="OEBPS/content.opf""#));
    assert!(container.contains(r#"media-type="application/oebps-package+xml""#));
}

#[test]
fn test_all_documents_live_under_oebps() {
    let names = entry_names(export_bytes(&sample_manuscript(), None));
    for name in &names {
        if name == "mimetype" || name.starts_with("META-INF/") {
            continue;
        }
        assert!(
            name.starts_with("OEBPS/"),
            "Entry outside OEBPS: {}",
            name
        );
    }
}
