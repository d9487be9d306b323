//! Error types for the conf2text library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the extraction cannot proceed at all
//!   (unparseable URL, missing credentials, rejected login, page does not
//!   exist). Returned as `Err(ExtractError)` from [`crate::extract`].
//!
//! * [`ImageError`] — **Non-fatal**: a single embedded image failed
//!   (download error, Tesseract missing, unreadable bytes) but the rest of
//!   the page is fine. Stored inside
//!   [`crate::output::ExtractedImageResult`] so one bad image never blanks
//!   out the page text.
//!
//! The separation lets callers decide their own tolerance: surface every
//! per-image note, or ignore them and take the page text alone.

use thiserror::Error;

/// All fatal errors returned by the conf2text library.
///
/// Per-image failures use [`ImageError`] and are stored in
/// [`crate::output::ExtractedImageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No numeric page id could be derived from the input string.
    #[error("Unable to extract a page id from '{input}'\nExpected a URL containing /pages/<id>/ or pageId=<id>, or a bare numeric id.")]
    InvalidUrl { input: String },

    /// A credential was neither passed explicitly nor found in the environment.
    #[error("{var} not provided in params or environment variables")]
    MissingCredentials { var: &'static str },

    /// The agent-mode parameters did not validate against the schema.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    // ── Confluence errors ─────────────────────────────────────────────────
    /// Confluence rejected the credentials (HTTP 401/403).
    #[error("Authentication failed (HTTP {status}). Please check your credentials.")]
    AuthError { status: u16 },

    /// The page id does not exist or is not visible to this user (HTTP 404).
    #[error("Page {page_id} not found")]
    NotFound { page_id: String },

    /// Network-level failure or an unexpected HTTP status.
    #[error("Error fetching content from '{url}': {reason}")]
    TransportError { url: String, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single embedded image.
///
/// Stored alongside [`crate::output::ExtractedImageResult`] when an image
/// fails. The overall extraction continues regardless.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// The image bytes could not be downloaded.
    #[error("download failed for '{reference}': {detail}")]
    DownloadFailed { reference: String, detail: String },

    /// The OCR engine could not be initialised (Tesseract or its language
    /// data missing from the host).
    #[error("OCR engine unavailable: {detail}")]
    OcrUnavailable { detail: String },

    /// The OCR engine ran but failed on this image (corrupt or unsupported
    /// bytes, recognition error).
    #[error("OCR failed: {detail}")]
    OcrFailed { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_display() {
        let e = ExtractError::InvalidUrl {
            input: "https://example.com/nothing-here".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("nothing-here"), "got: {msg}");
        assert!(msg.contains("pageId=<id>"));
    }

    #[test]
    fn missing_credentials_display() {
        let e = ExtractError::MissingCredentials {
            var: "CONFLUENCE_EMAIL",
        };
        assert!(e.to_string().contains("CONFLUENCE_EMAIL"));
    }

    #[test]
    fn auth_error_display() {
        let e = ExtractError::AuthError { status: 403 };
        assert!(e.to_string().contains("403"));
    }

    #[test]
    fn image_error_serialises() {
        let e = ImageError::DownloadFailed {
            reference: "chart.png".into(),
            detail: "HTTP 404".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("chart.png"));
    }
}
