//! Inline images sent to vision models

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME type assumed when the image carries no `data:` prefix
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Image rejected before it is sent anywhere
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// No image data
    #[error("Image data is required")]
    Empty,

    /// A `data:` URL that does not hold a base64 image
    #[error("Unsupported image data URL: {0}")]
    UnsupportedDataUrl(String),
}

/// Base64 image payload with its MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,

    /// Base64 data without any `data:` prefix
    pub data: String,
}

impl InlineImage {
    /// Parse either a `data:image/<type>;base64,` URL or bare base64 data
    ///
    /// Bare data is assumed to be [`DEFAULT_IMAGE_MIME`].
    ///
    /// # Examples
    ///
    /// ```
    /// use scholar_domain::InlineImage;
    ///
    /// let image = InlineImage::from_data_url("data:image/png;base64,iVBORw0").unwrap();
    /// assert_eq!(image.mime_type, "image/png");
    /// assert_eq!(image.data, "iVBORw0");
    /// ```
    pub fn from_data_url(input: &str) -> Result<Self, ImageError> {
        let input = input.trim();

        let (mime_type, data) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (mime_type, data) = rest
                    .split_once(";base64,")
                    .ok_or_else(|| ImageError::UnsupportedDataUrl(prefix_of(input)))?;
                let subtype = mime_type.strip_prefix("image/").unwrap_or("");
                if subtype.is_empty() || !subtype.bytes().all(|b| b.is_ascii_lowercase()) {
                    return Err(ImageError::UnsupportedDataUrl(prefix_of(input)));
                }
                (mime_type.to_string(), data)
            }
            None => (DEFAULT_IMAGE_MIME.to_string(), input),
        };

        if data.is_empty() {
            return Err(ImageError::Empty);
        }

        Ok(Self {
            mime_type,
            data: data.to_string(),
        })
    }
}

// Error messages never echo the payload
fn prefix_of(input: &str) -> String {
    input
        .split(',')
        .next()
        .unwrap_or("")
        .chars()
        .take(40)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_base64_defaults_to_jpeg() {
        let image = InlineImage::from_data_url("  /9j/4AAQ  ").unwrap();
        assert_eq!(image.mime_type, DEFAULT_IMAGE_MIME);
        assert_eq!(image.data, "/9j/4AAQ");
    }

    #[test]
    fn test_data_url_prefix_is_stripped() {
        let image = InlineImage::from_data_url("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "/9j/4AAQ");
    }

    #[test]
    fn test_empty_image_is_rejected() {
        assert_eq!(InlineImage::from_data_url(""), Err(ImageError::Empty));
        assert_eq!(
            InlineImage::from_data_url("data:image/png;base64,"),
            Err(ImageError::Empty)
        );
    }

    #[test]
    fn test_non_image_data_url_is_rejected() {
        for input in [
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,raw",
            "data:image/;base64,abc",
            "data:image/svg+xml;base64,abc",
        ] {
            assert!(
                matches!(
                    InlineImage::from_data_url(input),
                    Err(ImageError::UnsupportedDataUrl(_))
                ),
                "{input}"
            );
        }
    }
}
