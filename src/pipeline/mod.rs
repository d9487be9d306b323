//! The extraction pipeline, one module per stage.
//!
//! Stages run strictly in order for each invocation:
//! url → client (page, attachments) → content (image refs) → per-image
//! download + ocr + table → normalize → assembly (in [`crate::output`]).

pub mod client;
pub mod content;
pub mod normalize;
pub mod ocr;
pub mod table;
pub mod url;
