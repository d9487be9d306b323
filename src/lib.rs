//! # conf2text
//!
//! Extract a single Confluence page into one LLM-ready text document.
//!
//! ## Why this crate?
//!
//! Confluence storage format is macro-laden pseudo-XML, and the tables that
//! matter are frequently pasted in as screenshots. Feeding either straight to
//! a language model buries the signal in markup noise and blank images. This
//! crate fetches the page over the REST API, strips the markup down to clean
//! prose, and runs OCR over embedded table images so their rows and columns
//! come back as text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL or page id
//!  │
//!  ├─ 1. Resolve    numeric page id + API base URL
//!  ├─ 2. Fetch      page body (storage format) + attachment listing
//!  ├─ 3. Scan       embedded-image references, in document order
//!  ├─ 4. Download   each image via the same authenticated session
//!  ├─ 5. OCR        Tesseract over grayscaled/upscaled bytes
//!  ├─ 6. Tables     column-count heuristic → Headers/Row framing
//!  ├─ 7. Normalize  storage HTML → clean plain text
//!  └─ 8. Assemble   header + body + image/table appendix
//! ```
//!
//! One invocation is one linear pass of blocking I/O. A failed image is
//! recorded on its own result and never suppresses the rest of the page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use conf2text::{extract, Credentials, ExtractConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials {
//!         email: "me@example.com".into(),
//!         api_token: std::env::var("CONFLUENCE_API_TOKEN")?,
//!     };
//!     let config = ExtractConfig::default();
//!     let output = extract(
//!         "https://acme.atlassian.net/wiki/spaces/ENG/pages/123456/Release+Notes",
//!         &credentials,
//!         &config,
//!     )?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! Orchestrated callers use the JSON surface instead: [`describe`] advertises
//! the parameter schema, [`run`] takes a parameter object and returns a
//! [`ResultEnvelope`] that carries success and failure alike.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `conf2text` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! conf2text = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod agent;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use agent::{describe, run, AgentMetadata, ResultEnvelope, RunParams};
pub use config::{ExtractConfig, ExtractConfigBuilder};
pub use credentials::{Credentials, CredentialSource, EnvCredentials};
pub use error::{ExtractError, ImageError};
pub use extract::extract;
pub use output::{
    AttachmentRef, ExtractOutput, ExtractStats, ExtractedImageResult, ImageReference, PageContent,
};
pub use pipeline::ocr::OcrEngine;
pub use pipeline::table::{Reconstruction, TableReconstructor};
