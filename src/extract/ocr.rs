//! Optical character recognition via the Tesseract CLI.
//!
//! Tesseract only reads from disk, so each recognition round-trips through
//! uniquely named scratch files in the system temp directory. Scratch files
//! are removed after every invocation, including on failure.

use anyhow::Context;
use std::process::Command;
use uuid::Uuid;

/// Recognize text in a PNG-encoded image.
///
/// Returns the trimmed recognized text, which may be empty when the engine
/// finds nothing. Engine startup failures and non-zero exits surface as
/// errors for the caller to wrap.
pub(crate) fn recognize(image_png: &[u8], language: &str) -> anyhow::Result<String> {
    let scratch = std::env::temp_dir();
    let input_path = scratch.join(format!("docbrief-ocr-{}.png", Uuid::new_v4()));
    let output_base = scratch.join(format!("docbrief-ocr-{}", Uuid::new_v4()));

    std::fs::write(&input_path, image_png).context("failed to write OCR scratch image")?;

    let output = Command::new("tesseract")
        .arg(&input_path)
        .arg(&output_base)
        .args(["-l", language, "--oem", "3", "--psm", "3"])
        .output();
    let _ = std::fs::remove_file(&input_path);
    let output = output.context("failed to run tesseract (is it installed?)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("tesseract exited with {}: {}", output.status, stderr.trim());
    }

    // Tesseract appends .txt to the output base it is given.
    let text_path = output_base.with_extension("txt");
    let text = std::fs::read_to_string(&text_path);
    let _ = std::fs::remove_file(&text_path);
    let text = text.context("failed to read tesseract output")?;

    Ok(text.trim().to_string())
}
