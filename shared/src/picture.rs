//! Validation for profile pictures: the bytes the user picked and the URL
//! the storage service hands back once the upload completes.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;
use url::Url;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PictureError {
    #[error("image bytes empty")]
    Empty,

    #[error("image too large: {size} bytes, max {max}")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("image could not be read: {reason}")]
    Unreadable { reason: String },

    #[error("invalid file name '{name}'")]
    InvalidFileName { name: String },

    #[error("invalid picture URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// An image the user picked, already compressed by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    file_name: String,
    content_type: String,
    format: ImageFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageSelection {
    pub fn new(
        file_name: &str,
        content_type: Option<String>,
        data: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, PictureError> {
        if data.is_empty() {
            return Err(PictureError::Empty);
        }

        if data.len() > max_bytes {
            return Err(PictureError::TooLarge {
                size: data.len(),
                max: max_bytes,
            });
        }

        let file_name = base_name(file_name)?;

        let reader = ImageReader::new(Cursor::new(data.as_slice()))
            .with_guessed_format()
            .map_err(|e| PictureError::Unreadable {
                reason: e.to_string(),
            })?;
        let format = reader.format().ok_or(PictureError::UnsupportedFormat)?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| PictureError::Unreadable {
                reason: e.to_string(),
            })?;

        let content_type = content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| format.to_mime_type().to_string());

        Ok(Self {
            file_name,
            content_type,
            format,
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

// Browsers may report a full local path; only the last component is kept.
fn base_name(file_name: &str) -> Result<String, PictureError> {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.chars().any(char::is_control) {
        return Err(PictureError::InvalidFileName {
            name: file_name.to_string(),
        });
    }

    Ok(name.to_string())
}

pub fn validate_download_url(url: &str) -> Result<Url, PictureError> {
    let invalid = |reason: &str| PictureError::InvalidUrl {
        url: truncate_url(url),
        reason: reason.to_string(),
    };

    if url.trim().is_empty() {
        return Err(invalid("URL cannot be empty"));
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(invalid("URL is too long"));
    }

    let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid("only 'http' and 'https' are allowed"));
    }

    if parsed.host_str().is_none() {
        return Err(invalid("URL must have a host"));
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(invalid("credentials in URL are not allowed"));
    }

    Ok(parsed)
}

fn truncate_url(url: &str) -> String {
    if url.len() <= 100 {
        return url.to_string();
    }
    let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
    format!("{}...", &url[..cut])
}
