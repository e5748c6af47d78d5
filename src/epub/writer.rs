//! Package assembly: content documents, manifest, spine, navigation
//! map, and the zip container itself.

use std::io::{Seek, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Datelike, NaiveDate};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::epub::EpubConfig;
use crate::error::Result;
use crate::ident::IdGenerator;
use crate::manuscript::{Chapter, Manuscript};
use crate::util::MediaFormat;

/// Shared stylesheet referenced by every content document.
const STYLESHEET: &str = r#"body { font-family: 'Lora', Georgia, serif; line-height: 1.6; padding: 2% 5%; text-align: justify; }
h1, h2, h3 { font-family: 'Playfair Display', serif; text-align: center; }
.title-page { text-align: center; margin-top: 20%; }
p { margin-bottom: 1em; text-indent: 1.5em; }
p:first-of-type { text-indent: 0; }
.cover-image { width: 100%; height: auto; max-height: 100vh; object-fit: contain; }
"#;

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

struct ManifestEntry {
    id: String,
    href: String,
    media_type: String,
    properties: Option<String>,
}

struct SpineEntry {
    idref: String,
    linear_yes: bool,
}

struct NavPoint {
    label: String,
    src: String,
}

/// A cover image decoded out of its data-URL envelope.
struct DecodedCover {
    data: Vec<u8>,
    format: MediaFormat,
}

/// Accumulates manifest, spine, and navigation entries while streaming
/// package entries into the zip in generation order.
///
/// Every content document passes through [`add_document`], which writes
/// the entry and registers all three bookkeeping records in one step,
/// so the counts can never drift apart.
///
/// [`add_document`]: PackageWriter::add_document
struct PackageWriter<'a, W: Write + Seek> {
    zip: ZipWriter<&'a mut W>,
    deflated: SimpleFileOptions,
    manifest: Vec<ManifestEntry>,
    spine: Vec<SpineEntry>,
    nav: Vec<NavPoint>,
}

impl<'a, W: Write + Seek> PackageWriter<'a, W> {
    /// Start the archive: the uncompressed mimetype entry must come
    /// first, followed by the container pointer.
    fn open(writer: &'a mut W, compression_level: Option<u32>) -> Result<Self> {
        // Fixed timestamps keep seeded exports byte-identical.
        let stored = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(zip::DateTime::default());
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(compression_level.map(i64::from))
            .last_modified_time(zip::DateTime::default());

        let mut zip = ZipWriter::new(writer);
        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;
        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML.as_bytes())?;

        Ok(PackageWriter {
            zip,
            deflated,
            manifest: Vec::new(),
            spine: Vec::new(),
            nav: Vec::new(),
        })
    }

    /// Write one content document and register its manifest, spine, and
    /// navigation entries together.
    fn add_document(&mut self, file_name: &str, title: &str, body: &str) -> Result<()> {
        let document = document_shell(title, body);
        self.zip
            .start_file(format!("OEBPS/{file_name}"), self.deflated)?;
        self.zip.write_all(document.as_bytes())?;

        let id = file_name.trim_end_matches(".xhtml").to_string();
        self.manifest.push(ManifestEntry {
            id: id.clone(),
            href: file_name.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            properties: None,
        });
        self.spine.push(SpineEntry {
            idref: id,
            linear_yes: false,
        });
        self.nav.push(NavPoint {
            label: title.to_string(),
            src: file_name.to_string(),
        });
        Ok(())
    }

    /// Register the cover image's manifest entry without writing its
    /// bytes yet; the binary payload lands after the stylesheet.
    fn register_cover_image(&mut self, href: &str, media_type: &str) {
        self.manifest.push(ManifestEntry {
            id: "cover-image".to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
            properties: Some("cover-image".to_string()),
        });
    }

    fn add_stylesheet(&mut self) -> Result<()> {
        self.zip.start_file("OEBPS/style.css", self.deflated)?;
        self.zip.write_all(STYLESHEET.as_bytes())?;
        Ok(())
    }

    fn add_cover_asset(&mut self, file_name: &str, data: &[u8]) -> Result<()> {
        self.zip
            .start_file(format!("OEBPS/{file_name}"), self.deflated)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    /// Force the cover document into the first reading-order position.
    fn promote_cover_spine(&mut self) {
        if let Some(position) = self.spine.iter().position(|entry| entry.idref == "cover") {
            let mut entry = self.spine.remove(position);
            entry.linear_yes = true;
            self.spine.insert(0, entry);
        }
    }

    /// Emit the navigation document and root manifest, then close the
    /// archive.
    fn finish(mut self, title: &str, author: &str, identifier: &str) -> Result<()> {
        let ncx = generate_ncx(title, identifier, &self.nav);
        self.zip.start_file("OEBPS/toc.ncx", self.deflated)?;
        self.zip.write_all(ncx.as_bytes())?;

        let opf = generate_opf(title, author, identifier, &self.manifest, &self.spine);
        self.zip.start_file("OEBPS/content.opf", self.deflated)?;
        self.zip.write_all(opf.as_bytes())?;

        self.zip.finish()?;
        Ok(())
    }
}

/// Assemble the complete package for `manuscript` into `writer`.
pub(crate) fn write_package<W: Write + Seek>(
    manuscript: &Manuscript,
    cover: Option<&str>,
    config: &EpubConfig,
    writer: &mut W,
) -> Result<()> {
    let cover = cover.and_then(decode_cover);
    let mut ids = match config.seed {
        Some(seed) => IdGenerator::seeded(seed),
        None => IdGenerator::new(),
    };
    let published = config
        .published
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut package = PackageWriter::open(writer, config.compression_level)?;

    let cover_file = cover
        .as_ref()
        .map(|c| format!("cover.{}", c.format.extension()));
    if let (Some(cover), Some(file_name)) = (&cover, &cover_file) {
        package.register_cover_image(file_name, cover.format.mime_type());
        package.add_document("cover.xhtml", "Cover", &cover_body(file_name))?;
    }

    package.add_document("title.xhtml", "Title Page", &title_body(manuscript))?;
    package.add_document(
        "copyright.xhtml",
        "Copyright",
        &copyright_body(manuscript, published, &ids.catalog_number()),
    )?;

    if let Some(ref foreword) = manuscript.foreword {
        package.add_document(
            "foreword.xhtml",
            "Foreword",
            &front_matter_body("Foreword", foreword),
        )?;
    }
    if let Some(ref preface) = manuscript.preface {
        package.add_document(
            "preface.xhtml",
            "Preface",
            &front_matter_body("Preface", preface),
        )?;
    }

    package.add_document(
        "toc_page.xhtml",
        "Table of Contents",
        &contents_body(&manuscript.chapters),
    )?;

    for chapter in &manuscript.chapters {
        package.add_document(
            &format!("chapter_{}.xhtml", chapter.chapter_number),
            &format!("Chapter {}", chapter.chapter_number),
            &chapter_body(chapter),
        )?;
    }

    if let Some(ref acknowledgements) = manuscript.acknowledgements {
        package.add_document(
            "acknowledgements.xhtml",
            "Acknowledgements",
            &front_matter_body("Acknowledgements", acknowledgements),
        )?;
    }

    package.add_stylesheet()?;

    if let (Some(cover), Some(file_name)) = (&cover, &cover_file) {
        package.add_cover_asset(file_name, &cover.data)?;
        package.promote_cover_spine();
    }

    let identifier = ids.package_identifier();
    package.finish(
        manuscript.display_title(),
        manuscript.display_author(),
        &identifier,
    )
}

/// Pull the base64 payload out of a data-URL envelope and sniff the
/// image type.
///
/// The type token in the URL header wins; otherwise magic bytes decide,
/// with JPEG as the final default. A payload that fails to decode drops
/// the cover rather than the export.
fn decode_cover(src: &str) -> Option<DecodedCover> {
    let (header, payload) = match src.split_once(',') {
        Some((header, payload)) => (header, payload),
        None => ("", src),
    };

    let data = match STANDARD.decode(payload.trim()) {
        Ok(data) => data,
        Err(err) => {
            log::warn!("could not decode cover image, continuing without it: {err}");
            return None;
        }
    };

    let format = if header.contains("image/png") {
        MediaFormat::Png
    } else if header.contains("image/jpeg") {
        MediaFormat::Jpeg
    } else if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        MediaFormat::Png
    } else {
        MediaFormat::Jpeg
    };

    Some(DecodedCover { data, format })
}

// ============================================================================
// Content documents
// ============================================================================

fn document_shell(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
  <title>{}</title>
  <link rel="stylesheet" type="text/css" href="style.css"/>
</head>
<body>
{}
</body>
</html>"#,
        escape_xml(title),
        body
    )
}

fn cover_body(file_name: &str) -> String {
    format!(
        r#"<div style="text-align: center; padding: 0; margin: 0;"><img class="cover-image" src="{file_name}" alt="Cover"/></div>"#
    )
}

fn title_body(manuscript: &Manuscript) -> String {
    let genre = manuscript.genre.as_deref().unwrap_or("Fiction");
    format!(
        "<div class=\"title-page\">\n  <h2>{}</h2>\n  <h1>{}</h1>\n  <h3>by {}</h3>\n</div>",
        escape_xml(genre),
        escape_xml(manuscript.display_title()),
        escape_xml(manuscript.display_author())
    )
}

fn copyright_body(manuscript: &Manuscript, published: NaiveDate, catalog_number: &str) -> String {
    let author = escape_xml(manuscript.display_author());
    let mut body = String::new();
    body.push_str(
        "<div style=\"text-align: center; margin-top: 20%; font-size: 0.9em; color: #555;\">\n",
    );
    body.push_str(&format!(
        "  <p>Copyright © {} {}</p>\n  <br />\n",
        published.year(),
        author
    ));
    body.push_str(
        "  <p>All rights reserved. No portion of this book may be reproduced, stored in a \
         retrieval system, or transmitted in any form or by any means without prior written \
         permission from the author.</p>\n  <br />\n",
    );
    body.push_str(
        "  <p>This is a work of fiction. Names, characters, places, and incidents are either \
         products of the author's imagination or are used fictitiously.</p>\n  <br />\n",
    );
    body.push_str(&format!(
        "  <p>First published: {}</p>\n",
        published.format("%B %Y")
    ));
    body.push_str(&format!("  <p>ISBN: {catalog_number}</p>\n"));
    body.push_str("</div>");
    body
}

fn front_matter_body(heading: &str, text: &str) -> String {
    format!("<h2>{}</h2>\n{}", escape_xml(heading), paragraph_html(text))
}

fn contents_body(chapters: &[Chapter]) -> String {
    let mut body = String::new();
    body.push_str("<h2 style=\"text-align: center; margin-bottom: 2em;\">Table of Contents</h2>\n");
    body.push_str("<ul style=\"list-style-type: none; padding: 0; text-align: center;\">\n");
    for chapter in chapters {
        let label = match chapter.title {
            Some(ref title) => {
                format!("Chapter {}: {}", chapter.chapter_number, escape_xml(title))
            }
            None => format!("Chapter {}", chapter.chapter_number),
        };
        body.push_str(&format!(
            "  <li style=\"margin-bottom: 1em;\"><a href=\"chapter_{}.xhtml\" \
             style=\"text-decoration: none; color: inherit;\">{}</a></li>\n",
            chapter.chapter_number, label
        ));
    }
    body.push_str("</ul>");
    body
}

fn chapter_body(chapter: &Chapter) -> String {
    let mut body = format!("<h3>Chapter {}</h3>\n", chapter.chapter_number);
    if let Some(ref title) = chapter.title {
        body.push_str(&format!("<h2>{}</h2>\n", escape_xml(title)));
    }
    body.push_str(&paragraph_html(&chapter.content));
    body
}

/// Split on blank lines and wrap each surviving paragraph in order.
fn paragraph_html(text: &str) -> String {
    text.split("\n\n")
        .filter(|paragraph| !paragraph.trim().is_empty())
        .map(|paragraph| format!("<p>{}</p>", escape_xml(paragraph.trim())))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Package documents
// ============================================================================

fn generate_ncx(title: &str, identifier: &str, nav: &[NavPoint]) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content=""#,
    );
    ncx.push_str(&escape_xml(identifier));
    ncx.push_str(
        r#""/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>"#,
    );
    ncx.push_str(&escape_xml(title));
    ncx.push_str(
        r#"</text>
  </docTitle>
  <navMap>
"#,
    );

    for (index, point) in nav.iter().enumerate() {
        let play_order = index + 1;
        ncx.push_str(&format!(
            "    <navPoint id=\"navPoint-{play_order}\" playOrder=\"{play_order}\">\n"
        ));
        ncx.push_str(&format!(
            "      <navLabel><text>{}</text></navLabel>\n",
            escape_xml(&point.label)
        ));
        ncx.push_str(&format!(
            "      <content src=\"{}\"/>\n",
            escape_xml(&point.src)
        ));
        ncx.push_str("    </navPoint>\n");
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

fn generate_opf(
    title: &str,
    author: &str,
    identifier: &str,
    manifest: &[ManifestEntry],
    spine: &[SpineEntry],
) -> String {
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );
    opf.push_str(&format!("    <dc:title>{}</dc:title>\n", escape_xml(title)));
    opf.push_str(&format!(
        "    <dc:creator opf:role=\"aut\">{}</dc:creator>\n",
        escape_xml(author)
    ));
    opf.push_str("    <dc:language>en-US</dc:language>\n");
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape_xml(identifier)
    ));
    if manifest.iter().any(|item| item.id == "cover-image") {
        opf.push_str("    <meta name=\"cover\" content=\"cover-image\"/>\n");
    }
    opf.push_str("  </metadata>\n");

    opf.push_str("  <manifest>\n");
    opf.push_str("    <item id=\"style\" href=\"style.css\" media-type=\"text/css\"/>\n");
    for item in manifest {
        match item.properties {
            Some(ref properties) => opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\" properties=\"{}\"/>\n",
                escape_xml(&item.id),
                escape_xml(&item.href),
                escape_xml(&item.media_type),
                escape_xml(properties)
            )),
            None => opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
                escape_xml(&item.id),
                escape_xml(&item.href),
                escape_xml(&item.media_type)
            )),
        }
    }
    opf.push_str(
        "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );
    opf.push_str("  </manifest>\n");

    opf.push_str("  <spine toc=\"ncx\">\n");
    for entry in spine {
        if entry.linear_yes {
            opf.push_str(&format!(
                "    <itemref idref=\"{}\" linear=\"yes\"/>\n",
                escape_xml(&entry.idref)
            ));
        } else {
            opf.push_str(&format!(
                "    <itemref idref=\"{}\"/>\n",
                escape_xml(&entry.idref)
            ));
        }
    }
    opf.push_str("  </spine>\n");

    opf.push_str("</package>\n");
    opf
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
