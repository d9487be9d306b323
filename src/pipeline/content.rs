//! Image-reference extraction from storage-format markup.
//!
//! Confluence embeds images in two idioms: the structured
//! `<ac:image><ri:attachment ri:filename="…"/></ac:image>` shape for page
//! attachments, and plain `<img src="…">` for everything else. Storage
//! format is namespaced pseudo-XML that an HTML5 parser mangles, so the scan
//! is a single alternation regex walked in document order — both shapes come
//! out interleaved exactly as they appear on the page.
//!
//! No de-duplication: the same filename referenced twice yields two entries,
//! processed independently downstream.

use crate::output::ImageReference;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

// Group 1: ri:attachment filename. Group 2: img src.
static IMAGE_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<ri:attachment[^>]*\bri:filename\s*=\s*["']([^"']*)["']|<img[^>]*\bsrc\s*=\s*["']([^"']*)["']"#,
    )
    .unwrap()
});

/// Scan the page body for embedded-image references, in document order.
///
/// `base_url` (scheme + host) resolves relative `<img>` sources. Filenames
/// that have no matching attachment are still recorded; their download fails
/// per-item later rather than blocking extraction here.
pub fn extract_image_references(body_html: &str, base_url: &str) -> Vec<ImageReference> {
    let mut refs = Vec::new();

    for caps in IMAGE_REF_RE.captures_iter(body_html) {
        if let Some(filename) = caps.get(1) {
            refs.push(ImageReference::Attachment {
                filename: unescape_entities(filename.as_str()),
            });
        } else if let Some(src) = caps.get(2) {
            refs.push(classify_img_src(&unescape_entities(src.as_str()), base_url));
        }
    }

    debug!("Found {} image references in body markup", refs.len());
    refs
}

/// Classify an `<img src>` value: attachment download paths resolve back to
/// the filename; anything else stays an external URL (relative sources are
/// resolved against the base URL).
fn classify_img_src(src: &str, base_url: &str) -> ImageReference {
    let absolute = if src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else if src.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), src)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), src)
    };

    if let Some(filename) = attachment_filename_of(&absolute) {
        ImageReference::Attachment { filename }
    } else {
        ImageReference::External { url: absolute }
    }
}

/// Filename of a `/download/attachments/<page>/<filename>` URL, query
/// stripped; None for any other path.
fn attachment_filename_of(url: &str) -> Option<String> {
    let (path, _query) = url.split_once('?').unwrap_or((url, ""));
    let idx = path.find("/download/attachments/")?;
    let rest = &path[idx + "/download/attachments/".len()..];
    let filename = rest.split('/').nth(1)?;
    if filename.is_empty() {
        return None;
    }
    Some(filename.to_string())
}

/// Minimal entity unescape for attribute values (storage format escapes the
/// usual five). `&amp;` goes last so `&amp;lt;` yields the literal `&lt;`
/// instead of double-unescaping to `<`.
fn unescape_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
