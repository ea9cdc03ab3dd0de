//! Preview path parsing.
//!
//! A preview URL looks like `/preview/{alias}/{modifiers}/{filename}.{format}`, where the
//! modifier segment is optional, e.g. `h200-w200-cfill`. Supported modifier tokens:
//!
//! - `h`, `w`, `s`, `c`, `y`, `x`, `q` followed by a positive integer (height, width,
//!   square, crop, top, left, quality)
//! - `c`, `g`, `f` followed by a lowercase word (crop mode, gravity, filter)
//!
//! Tokens may be joined with `-`; at most nine are accepted.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

/// Output formats the codec can produce. Anything else falls back to [`DEFAULT_FORMAT`].
pub const OUTPUT_FORMATS: &[&str] = &["jpeg", "jpg", "png", "webp", "gif"];
pub const DEFAULT_FORMAT: &str = "jpeg";

const MODIFIERS_PATTERN: &str = r"^(?:(?:[hwscyxq][1-9][0-9]*|[cgf][a-z]+)-?){1,9}$";

static MODIFIERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MODIFIERS_PATTERN).expect("modifier pattern is valid"));

/// A parsed preview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    /// File identifier with the format extension removed when it named a known format.
    pub filename: String,
    pub format: String,
    pub modifiers: Option<String>,
}

impl PreviewRequest {
    /// Path handed to the codec: the modifiers (if any) followed by the stored preview path.
    pub fn codec_path(&self, preview: &str) -> String {
        match &self.modifiers {
            Some(modifiers) => format!("{}/{}", modifiers, preview),
            None => preview.to_string(),
        }
    }

    /// Content type of the rendered image.
    pub fn content_type(&self) -> &'static str {
        match self.format.as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "image/jpeg",
        }
    }
}

/// Validate a modifier segment.
pub fn validate_modifiers(modifiers: &str) -> Result<(), AppError> {
    if !MODIFIERS.is_match(modifiers) {
        return Err(AppError::validation("modifiers", "invalid modifiers"));
    }
    Ok(())
}

/// Split `filename` into identifier and output format, and validate `modifiers`.
pub fn parse_preview(filename: &str, modifiers: Option<&str>) -> Result<PreviewRequest, AppError> {
    let modifiers = modifiers.filter(|m| !m.is_empty());
    if let Some(modifiers) = modifiers {
        validate_modifiers(modifiers)?;
    }

    let (filename, format) = match filename.rsplit_once('.') {
        Some((stem, ext)) if OUTPUT_FORMATS.contains(&ext) => (stem.to_string(), ext.to_string()),
        _ => (filename.to_string(), DEFAULT_FORMAT.to_string()),
    };

    if filename.is_empty() {
        return Err(AppError::validation("filename", "must not be empty"));
    }

    Ok(PreviewRequest {
        filename,
        format,
        modifiers: modifiers.map(str::to_string),
    })
}
