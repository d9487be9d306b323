//! Configuration types for Confluence page extraction.
//!
//! All extraction behaviour is controlled through [`ExtractConfig`], built
//! via its [`ExtractConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across calls, serialise the scalar fields for
//! logging, and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::ExtractError;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::table::TableReconstructor;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default name of the raw-HTML debug artifact, matching the path a debug
/// run has always written next to the working directory.
pub const DEBUG_HTML_FILE: &str = "debug_html.html";

/// Configuration for a Confluence page extraction.
///
/// Built via [`ExtractConfig::builder()`] or using
/// [`ExtractConfig::default()`].
///
/// # Example
/// ```rust
/// use conf2text::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .ocr_language("eng")
///     .http_timeout_secs(20)
///     .debug(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractConfig {
    /// Confluence base URL (scheme + host), e.g. `https://acme.atlassian.net`.
    ///
    /// Only needed when the input is a bare numeric page id; a full page URL
    /// carries its own host. Falls back to the `CONFLUENCE_BASE_URL`
    /// environment variable when unset.
    pub base_url: Option<String>,

    /// Write the raw storage-format HTML to [`Self::debug_html_path`] and log
    /// per-step diagnostics. Default: false.
    pub debug: bool,

    /// Destination of the raw-HTML debug artifact. Default: `debug_html.html`.
    ///
    /// Overridable mainly so tests can point it into a temp directory; the
    /// file is only written when `debug` is set.
    pub debug_html_path: PathBuf,

    /// Timeout applied to every HTTP request, in seconds. Default: 30.
    ///
    /// Every network call in the pipeline blocks the caller, so an
    /// unreachable host without a timeout would hang the whole invocation.
    pub http_timeout_secs: u64,

    /// Tesseract language code(s), e.g. `"eng"` or `"eng+fra"`. Default: `"eng"`.
    pub ocr_language: String,

    /// Tesseract page segmentation mode. Default: 6 (assume a single uniform
    /// block of text).
    ///
    /// PSM 6 reads a rendered table screenshot row by row instead of trying
    /// to segment it into columns of prose, which is what the downstream
    /// line heuristic expects.
    pub ocr_psm: u32,

    /// Legibility threshold in pixels. Default: 600.
    ///
    /// Images whose shorter dimension is below this are upscaled 2× before
    /// OCR. Table screenshots pasted into Confluence are often small enough
    /// that Tesseract misreads digits at native resolution.
    pub min_ocr_dimension: u32,

    /// Pre-constructed OCR engine. If None, a Tesseract engine is created
    /// lazily from `ocr_language`/`ocr_psm` on first use.
    pub ocr: Option<Arc<dyn OcrEngine>>,

    /// Table reconstruction strategy. If None, the built-in column-count
    /// heuristic is used.
    pub reconstructor: Option<Arc<dyn TableReconstructor>>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            debug: false,
            debug_html_path: PathBuf::from(DEBUG_HTML_FILE),
            http_timeout_secs: 30,
            ocr_language: "eng".to_string(),
            ocr_psm: 6,
            min_ocr_dimension: 600,
            ocr: None,
            reconstructor: None,
        }
    }
}

impl fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("base_url", &self.base_url)
            .field("debug", &self.debug)
            .field("debug_html_path", &self.debug_html_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("ocr_language", &self.ocr_language)
            .field("ocr_psm", &self.ocr_psm)
            .field("min_ocr_dimension", &self.min_ocr_dimension)
            .field("ocr", &self.ocr.as_ref().map(|_| "<dyn OcrEngine>"))
            .field(
                "reconstructor",
                &self.reconstructor.as_ref().map(|_| "<dyn TableReconstructor>"),
            )
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn debug(mut self, v: bool) -> Self {
        self.config.debug = v;
        self
    }

    pub fn debug_html_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.debug_html_path = path.into();
        self
    }

    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = secs.max(1);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn ocr_psm(mut self, psm: u32) -> Self {
        self.config.ocr_psm = psm.min(13);
        self
    }

    pub fn min_ocr_dimension(mut self, px: u32) -> Self {
        self.config.min_ocr_dimension = px;
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr = Some(engine);
        self
    }

    pub fn reconstructor(mut self, strategy: Arc<dyn TableReconstructor>) -> Self {
        self.config.reconstructor = Some(strategy);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, ExtractError> {
        let c = &self.config;
        if c.ocr_language.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if let Some(ref base) = c.base_url {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(ExtractError::InvalidConfig(format!(
                    "base_url must start with http:// or https://, got '{base}'"
                )));
            }
        }
        Ok(self.config)
    }
}
