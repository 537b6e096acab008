//! Word document extractor (OOXML).
//!
//! Reads `word/document.xml` straight out of the archive. Body-level paragraphs
//! come first in the result, followed by every table cell in document order
//! (tables, then rows, then cells), matching how word processors present the
//! two groups separately. A table nested inside a cell contributes its text to
//! that cell.

use super::{ExtractError, finish_accumulated, xml_local_name};
use anyhow::Context;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Extract the textual content of a Word document.
pub(crate) fn extract(path: &Path) -> Result<String, ExtractError> {
    run(path)
        .map(finish_accumulated)
        .map_err(|source| ExtractError::Extraction {
            format: "docx",
            source,
        })
}

fn run(path: &Path) -> anyhow::Result<String> {
    let file = File::open(path).context("failed to open document")?;
    let mut archive = ZipArchive::new(file).context("document is not a valid OOXML archive")?;
    let mut entry = archive
        .by_name("word/document.xml")
        .context("archive has no word/document.xml part")?;
    let mut xml = Vec::new();
    entry.read_to_end(&mut xml).context("failed to read document body")?;
    parse_document_xml(&xml)
}

/// Walk the document body, collecting body paragraphs and table cell texts.
fn parse_document_xml(xml: &[u8]) -> anyhow::Result<String> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut cells: Vec<String> = Vec::new();
    // Open cells, innermost last; a nested table's text merges into its parent
    // cell so nothing is lost.
    let mut cell_stack: Vec<Vec<String>> = Vec::new();
    let mut paragraph = String::new();
    let mut table_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => match xml_local_name(element.name().as_ref()) {
                b"tbl" => table_depth += 1,
                b"tc" => cell_stack.push(Vec::new()),
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Text(text) if in_text => paragraph.push_str(&text.unescape()?),
            Event::End(element) => match xml_local_name(element.name().as_ref()) {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"tc" => {
                    if let Some(parts) = cell_stack.pop() {
                        let text = parts.join("\n");
                        match cell_stack.last_mut() {
                            Some(parent) => {
                                if !text.is_empty() {
                                    parent.push(text);
                                }
                            }
                            None => cells.push(text),
                        }
                    }
                }
                b"p" => {
                    if let Some(parts) = cell_stack.last_mut() {
                        parts.push(std::mem::take(&mut paragraph));
                    } else if table_depth == 0 {
                        paragraphs.push(std::mem::take(&mut paragraph));
                    } else {
                        paragraph.clear();
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs
        .into_iter()
        .chain(cells)
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::NO_TEXT_SENTINEL;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn save_docx(dir: &tempfile::TempDir, name: &str, body_xml: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).expect("create docx");
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .expect("start entry");
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{body_xml}</w:body></w:document>"#
        );
        writer.write_all(document.as_bytes()).expect("write entry");
        writer.finish().expect("finish docx");
        path
    }

    #[test]
    fn paragraphs_come_before_table_cells() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = save_docx(
            &dir,
            "hello.docx",
            "<w:p><w:r><w:t>Hello</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>World</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        let text = extract(&path).expect("extract");
        assert_eq!(text, "Hello\nWorld");
    }

    #[test]
    fn table_order_is_rows_then_cells() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = save_docx(
            &dir,
            "table.docx",
            "<w:p><w:r><w:t>Intro</w:t></w:r></w:p>\
             <w:tbl>\
             <w:tr><w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc>\
                   <w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p></w:tc></w:tr>\
             <w:tr><w:tc><w:p><w:r><w:t>A2</w:t></w:r></w:p></w:tc>\
                   <w:tc><w:p><w:r><w:t>B2</w:t></w:r></w:p></w:tc></w:tr>\
             </w:tbl>",
        );
        let text = extract(&path).expect("extract");
        assert_eq!(text, "Intro\nA1\nB1\nA2\nB2");
    }

    #[test]
    fn nested_tables_keep_outer_cell_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = save_docx(
            &dir,
            "nested.docx",
            "<w:p><w:r><w:t>Intro</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc>\
             <w:p><w:r><w:t>Outer</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>After</w:t></w:r></w:p>\
             </w:tc></w:tr></w:tbl>",
        );
        let text = extract(&path).expect("extract");
        assert_eq!(text, "Intro\nOuter\nInner\nAfter");
    }

    #[test]
    fn split_runs_join_within_a_paragraph() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = save_docx(
            &dir,
            "runs.docx",
            "<w:p><w:r><w:t>Hel</w:t></w:r><w:r><w:t>lo</w:t></w:r></w:p>",
        );
        let text = extract(&path).expect("extract");
        assert_eq!(text, "Hello");
    }

    #[test]
    fn empty_document_yields_sentinel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = save_docx(&dir, "blank.docx", "<w:p><w:r><w:t></w:t></w:r></w:p>");
        let text = extract(&path).expect("extract");
        assert_eq!(text, NO_TEXT_SENTINEL);
    }

    #[test]
    fn non_archive_bytes_are_an_extraction_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("legacy.doc");
        std::fs::write(&path, b"\xd0\xcf\x11\xe0 legacy binary").expect("write");
        let error = extract(&path).expect_err("extraction failure");
        assert!(matches!(
            error,
            ExtractError::Extraction { format: "docx", .. }
        ));
    }
}
