//! URL resolution: derive a page id and an API base URL from user input.
//!
//! Confluence page URLs come in several shapes depending on how they were
//! copied — the pretty space URL (`…/wiki/spaces/ENG/pages/123456/Title`),
//! the legacy viewer (`…/pages/viewpage.action?pageId=123456`), and bare
//! numeric ids pasted out of other tooling. All three resolve to the same
//! numeric content id; the shapes are tried in that order and the first
//! match wins.

use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// ── Lazy static regexes ──────────────────────────────────────────────────────

static PAGES_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/pages/(\d+)").unwrap());

static PAGE_ID_PARAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]pageId=(\d+)").unwrap());

static BARE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// A resolved page identity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReference {
    /// Numeric Confluence content id, as a string.
    pub page_id: String,
    /// The input the id was derived from, kept for the result envelope.
    pub source_url: String,
}

/// Extract the numeric page id from a URL or bare id string.
///
/// Recognised shapes, in precedence order: a `/pages/<digits>` path segment,
/// a `pageId=<digits>` query parameter, a bare digit string.
pub fn extract_page_id(input: &str) -> Result<String, ExtractError> {
    let trimmed = input.trim();

    if let Some(caps) = PAGES_PATH_RE.captures(trimmed) {
        return Ok(caps[1].to_string());
    }
    if let Some(caps) = PAGE_ID_PARAM_RE.captures(trimmed) {
        return Ok(caps[1].to_string());
    }
    if BARE_ID_RE.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(ExtractError::InvalidUrl {
        input: input.to_string(),
    })
}

/// Resolve the input into a [`PageReference`] plus the API base URL
/// (scheme + host, no trailing slash).
///
/// A full page URL carries its own host; a bare numeric id needs
/// `fallback_base` (config or `CONFLUENCE_BASE_URL`), otherwise resolution
/// fails with [`ExtractError::InvalidUrl`].
pub fn resolve(
    input: &str,
    fallback_base: Option<&str>,
) -> Result<(PageReference, String), ExtractError> {
    let page_id = extract_page_id(input)?;

    let base = if let Some(base) = base_url_of(input) {
        base
    } else if let Some(base) = fallback_base {
        base.trim_end_matches('/').to_string()
    } else {
        return Err(ExtractError::InvalidUrl {
            input: format!(
                "{input} (bare page id given but no base URL configured; \
                 pass a full page URL or set CONFLUENCE_BASE_URL)"
            ),
        });
    };

    Ok((
        PageReference {
            page_id,
            source_url: input.trim().to_string(),
        },
        base,
    ))
}

/// `scheme://host[:port]` of an absolute URL, or None for anything else.
fn base_url_of(input: &str) -> Option<String> {
    let url = reqwest::Url::parse(input.trim()).ok()?;
    let host = url.host_str()?;
    let mut base = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        base.push_str(&format!(":{port}"));
    }
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_space_url() {
        let id = extract_page_id(
            "https://acme.atlassian.net/wiki/spaces/ENG/pages/123456/Release+Notes",
        )
        .unwrap();
        assert_eq!(id, "123456");
    }

    #[test]
    fn legacy_viewer_url() {
        let id = extract_page_id(
            "https://confluence.acme.com/pages/viewpage.action?pageId=98765&src=sidebar",
        )
        .unwrap();
        assert_eq!(id, "98765");
    }

    #[test]
    fn bare_numeric_id() {
        assert_eq!(extract_page_id("  424242  ").unwrap(), "424242");
    }

    #[test]
    fn pages_path_wins_over_query_param() {
        // Both shapes present: the path segment takes precedence.
        let id =
            extract_page_id("https://acme.atlassian.net/wiki/pages/111/Title?pageId=222").unwrap();
        assert_eq!(id, "111");
    }

    #[test]
    fn no_digits_fails() {
        let err = extract_page_id("https://acme.atlassian.net/wiki/spaces/ENG/overview")
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl { .. }));
    }

    #[test]
    fn resolve_derives_base_from_url() {
        let (reference, base) = resolve(
            "https://acme.atlassian.net/wiki/spaces/ENG/pages/123456/Notes",
            None,
        )
        .unwrap();
        assert_eq!(reference.page_id, "123456");
        assert_eq!(base, "https://acme.atlassian.net");
    }

    #[test]
    fn resolve_keeps_explicit_port() {
        let (_, base) = resolve("http://localhost:8090/pages/55/Title", None).unwrap();
        assert_eq!(base, "http://localhost:8090");
    }

    #[test]
    fn bare_id_needs_fallback_base() {
        let err = resolve("123456", None).unwrap_err();
        assert!(err.to_string().contains("CONFLUENCE_BASE_URL"));

        let (reference, base) =
            resolve("123456", Some("https://acme.atlassian.net/")).unwrap();
        assert_eq!(reference.page_id, "123456");
        assert_eq!(base, "https://acme.atlassian.net");
    }
}
