//! The top-level extraction entry point.
//!
//! Control flow is strictly linear per invocation: resolve → fetch page →
//! fetch attachments → extract image refs → download each → OCR each →
//! normalize text → assemble → return. Per-image failures degrade to a note
//! on that image's result; only URL resolution and the page fetch are fatal.

use crate::config::ExtractConfig;
use crate::credentials::Credentials;
use crate::error::ExtractError;
use crate::output::{
    assemble_document, ExtractOutput, ExtractStats, ExtractedImageResult, ImageReference,
};
use crate::pipeline::client::ConfluenceClient;
use crate::pipeline::content::extract_image_references;
use crate::pipeline::normalize::normalize;
use crate::pipeline::ocr::{OcrEngine, TesseractOcr};
use crate::pipeline::table::{ColumnHeuristic, Reconstruction, TableReconstructor};
use crate::pipeline::url;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract one Confluence page to LLM-ready text.
///
/// `input` is a full page URL or a bare numeric page id (the latter needs a
/// base URL in `config` or `CONFLUENCE_BASE_URL`).
///
/// # Errors
/// Returns `Err(ExtractError)` only for fatal failures: an unresolvable
/// input, rejected credentials, a missing page, or a transport failure on
/// the page fetch. Attachment-listing, download, and OCR failures are
/// recorded per image in `ExtractOutput::images` instead.
pub fn extract(
    input: &str,
    credentials: &Credentials,
    config: &ExtractConfig,
) -> Result<ExtractOutput, ExtractError> {
    let total_start = Instant::now();
    info!("Starting extraction: {input}");

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let env_base = std::env::var("CONFLUENCE_BASE_URL").ok().filter(|v| !v.is_empty());
    let fallback_base = config.base_url.as_deref().or(env_base.as_deref());
    let (reference, base_url) = url::resolve(input, fallback_base)?;
    debug!("Resolved page id {} at {}", reference.page_id, base_url);

    let client = ConfluenceClient::new(&base_url, credentials.clone(), config.http_timeout_secs)?;

    // ── Step 2: Verify credentials (debug mode only) ─────────────────────
    if config.debug {
        let user = client.verify_auth()?;
        debug!("Authentication successful. User: {user}");
    }

    // ── Step 3: Fetch page content ───────────────────────────────────────
    let fetch_start = Instant::now();
    let page = client.fetch_page(&reference.page_id)?;

    if config.debug {
        // Diagnostic side effect, not part of the functional contract.
        if let Err(e) = std::fs::write(&config.debug_html_path, &page.body_html) {
            warn!("Could not write {}: {e}", config.debug_html_path.display());
        } else {
            debug!("Saved raw HTML to {}", config.debug_html_path.display());
        }
    }

    // ── Step 4: Fetch attachment listing (non-fatal) ─────────────────────
    let attachments = match client.fetch_attachments(&page.page_id) {
        Ok(list) => list,
        Err(e) => {
            // Most pages have no table images; a broken listing should not
            // cost the caller the page text.
            debug!("Attachment listing failed ({e}); proceeding with an empty list");
            Vec::new()
        }
    };
    let mut fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

    // ── Step 5: Extract image references ─────────────────────────────────
    let references = extract_image_references(&page.body_html, &base_url);
    info!("Found {} image references", references.len());

    // ── Step 6: Download + OCR each image, in discovery order ────────────
    let ocr_engine: Arc<dyn OcrEngine> = config.ocr.clone().unwrap_or_else(|| {
        Arc::new(TesseractOcr::new(
            config.ocr_language.clone(),
            config.ocr_psm,
            config.min_ocr_dimension,
        ))
    });
    let reconstructor: Arc<dyn TableReconstructor> = config
        .reconstructor
        .clone()
        .unwrap_or_else(|| Arc::new(ColumnHeuristic));

    let mut ocr_duration_ms = 0u64;
    let mut images: Vec<ExtractedImageResult> = Vec::with_capacity(references.len());

    for (i, reference) in references.into_iter().enumerate() {
        debug!("Processing image {}: {}", i + 1, reference.label());

        let download_url = match &reference {
            ImageReference::Attachment { filename } => attachments
                .iter()
                .find(|a| a.filename == *filename)
                .map(|a| a.download_url.clone())
                .unwrap_or_else(|| client.conventional_download_url(&page.page_id, filename)),
            ImageReference::External { url } => url.clone(),
        };

        let dl_start = Instant::now();
        let bytes = match client.download(&download_url) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Image {} failed: {e}", i + 1);
                fetch_duration_ms += dl_start.elapsed().as_millis() as u64;
                images.push(ExtractedImageResult::failed(reference, e));
                continue;
            }
        };
        fetch_duration_ms += dl_start.elapsed().as_millis() as u64;

        let ocr_start = Instant::now();
        let result = match ocr_engine.recognize(&bytes) {
            Ok(lines) => match reconstructor.reconstruct(&lines) {
                Reconstruction::Table(table) => ExtractedImageResult {
                    reference,
                    ocr_text: Some(lines.join("\n")),
                    table_text: Some(table),
                    error: None,
                },
                Reconstruction::Plain(text) => ExtractedImageResult {
                    reference,
                    ocr_text: Some(text),
                    table_text: None,
                    error: None,
                },
            },
            Err(e) => {
                warn!("OCR on image {} failed: {e}", i + 1);
                ExtractedImageResult::failed(reference, e)
            }
        };
        ocr_duration_ms += ocr_start.elapsed().as_millis() as u64;
        images.push(result);
    }

    // ── Step 7: Normalize the page body ──────────────────────────────────
    let body_text = normalize(&page.body_html);

    // ── Step 8: Assemble the final document ──────────────────────────────
    let text = assemble_document(&page, &body_text, &images);

    let stats = ExtractStats {
        images_found: images.len(),
        images_processed: images.iter().filter(|r| r.error.is_none()).count(),
        images_failed: images.iter().filter(|r| r.error.is_some()).count(),
        fetch_duration_ms,
        ocr_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} chars, {}/{} images, {}ms total",
        text.len(),
        stats.images_processed,
        stats.images_found,
        stats.total_duration_ms
    );

    Ok(ExtractOutput {
        text,
        page,
        images,
        stats,
    })
}
