//! PDF extractor with page-level OCR fallback.
//!
//! Pages are walked in document order. Each page's embedded text layer is taken
//! when present; pages without one (typically scans) fall back to OCR over the
//! page's raster image XObjects. OCR never runs on pages that already yielded
//! text, so text-native documents pay no recognition cost.

use super::{ExtractError, finish_accumulated, ocr};
use anyhow::Context;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

/// Recognition backend used for pages without a text layer.
pub(crate) trait OcrEngine {
    /// Recognize text in a PNG-encoded page image.
    fn recognize(&self, image_png: &[u8]) -> anyhow::Result<String>;
}

/// Default engine shelling out to the Tesseract CLI with the configured language.
pub(crate) struct TesseractEngine;

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image_png: &[u8]) -> anyhow::Result<String> {
        ocr::recognize(image_png, &crate::config::get_config().ocr_language)
    }
}

/// Extract the textual content of a PDF document.
pub(crate) fn extract(path: &Path) -> Result<String, ExtractError> {
    extract_with(path, &TesseractEngine)
}

fn extract_with(path: &Path, engine: &dyn OcrEngine) -> Result<String, ExtractError> {
    run(path, engine)
        .map(finish_accumulated)
        .map_err(|source| ExtractError::Extraction {
            format: "pdf",
            source,
        })
}

fn run(path: &Path, engine: &dyn OcrEngine) -> anyhow::Result<String> {
    let doc = Document::load(path).context("failed to open PDF document")?;
    let mut text = String::new();

    for (page_number, page_id) in doc.get_pages() {
        let layer = doc
            .extract_text(&[page_number])
            .with_context(|| format!("failed to extract text from page {page_number}"))?;
        if !layer.trim().is_empty() {
            text.push_str(layer.trim_end());
            text.push('\n');
            continue;
        }

        let images = page_images(&doc, page_id)?;
        if images.is_empty() {
            tracing::debug!(
                page = page_number,
                "Page has no text layer and no embedded images"
            );
            continue;
        }

        tracing::debug!(
            page = page_number,
            images = images.len(),
            "Page has no text layer; running OCR fallback"
        );
        for png in images {
            let recognized = engine.recognize(&png)?;
            if !recognized.is_empty() {
                text.push_str(&recognized);
                text.push('\n');
            }
        }
    }

    Ok(text)
}

/// Collect the page's raster image XObjects, PNG-encoded, in document order.
fn page_images(doc: &Document, page_id: ObjectId) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut images = Vec::new();
    let (direct, resource_ids) = doc
        .get_page_resources(page_id)
        .context("failed to read page resources")?;

    let mut dicts: Vec<&Dictionary> = Vec::new();
    if let Some(dict) = direct {
        dicts.push(dict);
    }
    for id in resource_ids {
        if let Ok(dict) = doc.get_object(id).and_then(Object::as_dict) {
            dicts.push(dict);
        }
    }

    for resources in dicts {
        let Ok(xobjects) = resources.get(b"XObject").and_then(Object::as_dict) else {
            continue;
        };
        for (_name, entry) in xobjects.iter() {
            let stream = match entry {
                Object::Reference(id) => match doc.get_object(*id).and_then(Object::as_stream) {
                    Ok(stream) => stream,
                    Err(_) => continue,
                },
                Object::Stream(stream) => stream,
                _ => continue,
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|name| name == b"Image")
                .unwrap_or(false);
            if !is_image {
                continue;
            }
            let image = decode_image(stream)?;
            images.push(encode_png(&image)?);
        }
    }

    Ok(images)
}

/// Decode an image XObject stream into a bitmap.
///
/// DCTDecode streams hold a complete JPEG; everything else is decompressed and
/// reconstructed from raw 8-bit DeviceRGB or DeviceGray samples. Anything more
/// exotic is surfaced as an error rather than silently skipped.
fn decode_image(stream: &Stream) -> anyhow::Result<image::DynamicImage> {
    let dict = &stream.dict;
    let filters = filter_names(dict);

    if filters.iter().any(|name| name == "DCTDecode") {
        return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
            .context("failed to decode embedded JPEG image");
    }

    let width = dict
        .get(b"Width")
        .and_then(Object::as_i64)
        .context("image is missing a width")? as u32;
    let height = dict
        .get(b"Height")
        .and_then(Object::as_i64)
        .context("image is missing a height")? as u32;
    let bits = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        anyhow::bail!("unsupported image depth: {bits} bits per component");
    }

    // Unfiltered streams hold the raw samples directly.
    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .context("failed to decompress image stream")?
    };
    let color_space = dict
        .get(b"ColorSpace")
        .and_then(Object::as_name)
        .unwrap_or(b"DeviceRGB" as &[u8]);

    match color_space {
        b"DeviceGray" => {
            image::GrayImage::from_raw(width, height, data).map(image::DynamicImage::ImageLuma8)
        }
        b"DeviceRGB" => {
            image::RgbImage::from_raw(width, height, data).map(image::DynamicImage::ImageRgb8)
        }
        other => anyhow::bail!(
            "unsupported image color space: {}",
            String::from_utf8_lossy(other)
        ),
    }
    .ok_or_else(|| anyhow::anyhow!("image data does not match declared {width}x{height} size"))
}

fn filter_names(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}

fn encode_png(image: &image::DynamicImage) -> anyhow::Result<Vec<u8>> {
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .context("failed to encode page image as PNG")?;
    Ok(out.into_inner())
}
