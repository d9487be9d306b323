//! Output types and final document assembly.
//!
//! Everything the pipeline produces lands here: the fetched page, the
//! per-image OCR results, run statistics, and [`assemble_document`], which
//! merges them into the single LLM-ready text the caller asked for.

use crate::error::ImageError;
use serde::{Deserialize, Serialize};

/// Page content fetched once per invocation; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub title: String,
    /// Confluence content type, e.g. `"page"` or `"blogpost"`.
    pub kind: String,
    /// Confluence content status, e.g. `"current"`.
    pub status: String,
    /// Storage-format body markup.
    pub body_html: String,
    pub page_id: String,
}

/// One attachment descriptor from the page's attachment listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub filename: String,
    pub media_type: String,
    /// Absolute download URL.
    pub download_url: String,
}

/// An embedded-image reference discovered in the page body, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageReference {
    /// A page attachment referenced by filename.
    Attachment { filename: String },
    /// An image hosted elsewhere, referenced by absolute URL.
    External { url: String },
}

impl ImageReference {
    /// Short human-readable label used in log lines and appendix headings.
    pub fn label(&self) -> &str {
        match self {
            ImageReference::Attachment { filename } => filename,
            ImageReference::External { url } => url,
        }
    }
}

/// The per-image outcome: recognized text, a table rendering, or an error.
///
/// Download and OCR failures are data here, not propagated errors — one bad
/// image must not blank out the rest of the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedImageResult {
    pub reference: ImageReference,
    /// Raw recognized text, present whenever OCR succeeded.
    pub ocr_text: Option<String>,
    /// Tabular rendering (`Headers:` / `Row N:` lines), present when the
    /// recognized lines looked like a table.
    pub table_text: Option<String>,
    pub error: Option<ImageError>,
}

impl ExtractedImageResult {
    pub fn failed(reference: ImageReference, error: ImageError) -> Self {
        Self {
            reference,
            ocr_text: None,
            table_text: None,
            error: Some(error),
        }
    }
}

/// Statistics about one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractStats {
    /// Image references discovered in the body markup.
    pub images_found: usize,
    /// Images that produced recognized text.
    pub images_processed: usize,
    /// Images that failed to download or OCR.
    pub images_failed: usize,
    /// Wall-clock time spent on page + attachment + image HTTP calls.
    pub fetch_duration_ms: u64,
    /// Wall-clock time spent in OCR and table reconstruction.
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The complete result of [`crate::extract`].
#[derive(Debug, Clone, Serialize)]
pub struct ExtractOutput {
    /// The assembled LLM-ready document.
    pub text: String,
    pub page: PageContent,
    /// One entry per discovered image reference, in discovery order.
    pub images: Vec<ExtractedImageResult>,
    pub stats: ExtractStats,
}

/// Heading of the trailing image/table appendix.
pub const APPENDIX_HEADING: &str = "EXTRACTED IMAGES AND TABLES:";

/// Assemble the final document: metadata header, normalized body, and — when
/// any image produced text or a failure worth noting — the appendix, one
/// subsection per image in discovery order.
pub fn assemble_document(
    page: &PageContent,
    body_text: &str,
    images: &[ExtractedImageResult],
) -> String {
    let mut doc = String::with_capacity(body_text.len() + 256);

    doc.push_str(&format!("# {}\n", page.title));
    doc.push_str(&format!("Type: {}\n", page.kind));
    doc.push_str(&format!("Status: {}\n", page.status));
    doc.push('\n');
    doc.push_str(body_text.trim_end());
    doc.push('\n');

    let has_appendix = images
        .iter()
        .any(|r| r.table_text.is_some() || r.ocr_text.is_some() || r.error.is_some());
    if !has_appendix {
        return doc;
    }

    doc.push('\n');
    doc.push_str(APPENDIX_HEADING);
    doc.push('\n');

    for (i, result) in images.iter().enumerate() {
        doc.push_str(&format!(
            "\n--- IMAGE {}: {} ---\n",
            i + 1,
            result.reference.label()
        ));

        if let Some(ref err) = result.error {
            doc.push_str(&format!("[image could not be processed: {err}]\n"));
        } else if let Some(ref table) = result.table_text {
            doc.push_str("TABLE DATA (structured for analysis):\n");
            doc.push_str(table.trim_end());
            doc.push('\n');
        } else if let Some(ref text) = result.ocr_text {
            doc.push_str("IMAGE TEXT:\n");
            doc.push_str(text.trim_end());
            doc.push('\n');
        }
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageContent {
        PageContent {
            title: "Quarterly Report".into(),
            kind: "page".into(),
            status: "current".into(),
            body_html: String::new(),
            page_id: "123456".into(),
        }
    }

    fn ok_result(name: &str, table: Option<&str>, text: &str) -> ExtractedImageResult {
        ExtractedImageResult {
            reference: ImageReference::Attachment {
                filename: name.into(),
            },
            ocr_text: Some(text.into()),
            table_text: table.map(str::to_string),
            error: None,
        }
    }

    #[test]
    fn no_images_no_appendix() {
        let doc = assemble_document(&page(), "Body text.", &[]);
        assert!(doc.starts_with("# Quarterly Report\n"));
        assert!(doc.contains("Type: page"));
        assert!(doc.contains("Body text."));
        assert!(!doc.contains(APPENDIX_HEADING));
    }

    #[test]
    fn failed_image_isolated_and_order_preserved() {
        // Image #2 of 3 fails; #1 and #3 still appear, in discovery order,
        // with an explicit failure note for #2.
        let images = vec![
            ok_result("a.png", Some("Headers: A B\nRow 1: 1 2"), "A B\n1 2"),
            ExtractedImageResult::failed(
                ImageReference::Attachment {
                    filename: "b.png".into(),
                },
                crate::error::ImageError::DownloadFailed {
                    reference: "b.png".into(),
                    detail: "HTTP 404".into(),
                },
            ),
            ok_result("c.png", None, "just a caption"),
        ];
        let doc = assemble_document(&page(), "Body.", &images);

        let a = doc.find("--- IMAGE 1: a.png ---").unwrap();
        let b = doc.find("--- IMAGE 2: b.png ---").unwrap();
        let c = doc.find("--- IMAGE 3: c.png ---").unwrap();
        assert!(a < b && b < c, "subsections must follow discovery order");

        assert!(doc.contains("Headers: A B"));
        assert!(doc.contains("[image could not be processed:"));
        assert!(doc.contains("HTTP 404"));
        assert!(doc.contains("IMAGE TEXT:\njust a caption"));
    }

    #[test]
    fn table_preferred_over_raw_text() {
        let images = vec![ok_result(
            "t.png",
            Some("Headers: X Y\nRow 1: 1 2"),
            "X Y\n1 2",
        )];
        let doc = assemble_document(&page(), "Body.", &images);
        assert!(doc.contains("TABLE DATA (structured for analysis):"));
        assert!(!doc.contains("IMAGE TEXT:"));
    }

    #[test]
    fn duplicate_references_render_twice() {
        // The same filename referenced twice is processed independently.
        let images = vec![
            ok_result("dup.png", None, "first"),
            ok_result("dup.png", None, "second"),
        ];
        let doc = assemble_document(&page(), "Body.", &images);
        assert!(doc.contains("--- IMAGE 1: dup.png ---"));
        assert!(doc.contains("--- IMAGE 2: dup.png ---"));
    }
}
