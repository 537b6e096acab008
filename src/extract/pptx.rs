//! Presentation extractor (OOXML).
//!
//! Slides are visited in numeric order. Within a slide, each shape's text body
//! is appended when present (pure images and connectors carry none), followed
//! by the slide's speaker notes when a notes part exists. Notes slides only
//! contribute their body placeholder; slide-number and header placeholders are
//! not speaker notes.

use super::{ExtractError, finish_accumulated, xml_local_name};
use anyhow::Context;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Extract the textual content of a slide deck.
pub(crate) fn extract(path: &Path) -> Result<String, ExtractError> {
    run(path)
        .map(finish_accumulated)
        .map_err(|source| ExtractError::Extraction {
            format: "pptx",
            source,
        })
}

fn run(path: &Path) -> anyhow::Result<String> {
    let file = File::open(path).context("failed to open presentation")?;
    let mut archive = ZipArchive::new(file).context("presentation is not a valid OOXML archive")?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let mut slide_numbers: Vec<u32> = names
        .iter()
        .filter_map(|name| slide_number(name))
        .collect();
    slide_numbers.sort_unstable();

    let mut units: Vec<String> = Vec::new();
    for number in slide_numbers {
        let slide_xml = read_entry(&mut archive, &format!("{SLIDE_PREFIX}{number}.xml"))?;
        units.extend(parse_shape_texts(&slide_xml, false)?);

        let notes_name = format!("ppt/notesSlides/notesSlide{number}.xml");
        if names.iter().any(|name| name == &notes_name) {
            let notes_xml = read_entry(&mut archive, &notes_name)?;
            let notes = parse_shape_texts(&notes_xml, true)?.join("\n");
            if !notes.is_empty() {
                units.push(notes);
            }
        }
    }

    Ok(units.join("\n"))
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> anyhow::Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .with_context(|| format!("missing archive entry {name}"))?;
    let mut xml = Vec::new();
    entry
        .read_to_end(&mut xml)
        .with_context(|| format!("failed to read archive entry {name}"))?;
    Ok(xml)
}

/// Collect the text of each shape's text body, in slide order.
///
/// With `body_placeholders_only` set, only shapes whose placeholder type is
/// `body` are kept; notes slides carry the slide image, slide number, and
/// header placeholders alongside the actual notes frame.
fn parse_shape_texts(xml: &[u8], body_placeholders_only: bool) -> anyhow::Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut shapes: Vec<String> = Vec::new();
    let mut shape = String::new();
    let mut body_depth = 0usize;
    let mut in_text = false;
    // Placeholder type of the current shape, if it declares one.
    let mut ph_type: Option<Vec<u8>> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => match xml_local_name(element.name().as_ref()) {
                b"sp" => ph_type = None,
                b"ph" => ph_type = placeholder_type(&element)?,
                b"txBody" => {
                    body_depth += 1;
                    shape.clear();
                }
                b"t" if body_depth > 0 => in_text = true,
                _ => {}
            },
            Event::Empty(element) if xml_local_name(element.name().as_ref()) == b"ph" => {
                ph_type = placeholder_type(&element)?;
            }
            Event::Text(text) if in_text => shape.push_str(&text.unescape()?),
            Event::End(element) => match xml_local_name(element.name().as_ref()) {
                b"txBody" => {
                    body_depth = body_depth.saturating_sub(1);
                    let text = shape.trim();
                    let keep =
                        !body_placeholders_only || matches!(ph_type.as_deref(), Some(b"body"));
                    if !text.is_empty() && keep {
                        shapes.push(text.to_string());
                    }
                    shape.clear();
                }
                // Paragraph boundaries inside a text body become line breaks.
                b"p" if body_depth > 0 && !shape.is_empty() && !shape.ends_with('\n') => {
                    shape.push('\n');
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}

fn placeholder_type(element: &BytesStart) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(element
        .try_get_attribute("type")?
        .map(|attribute| attribute.value.into_owned()))
}
