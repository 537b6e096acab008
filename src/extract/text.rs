//! Plain-text extractor: reads stored bytes verbatim as UTF-8.

use super::ExtractError;
use std::path::Path;

/// Read the stored bytes as UTF-8 text.
///
/// Invalid UTF-8 surfaces as [`ExtractError::Decode`] rather than a silently
/// empty result.
pub(crate) fn extract(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|err| ExtractError::Extraction {
        format: "txt",
        source: err.into(),
    })?;
    Ok(String::from_utf8(bytes)?)
}
