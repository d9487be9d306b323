//! Confluence REST API client.
//!
//! A thin blocking client over the two Cloud REST endpoints this tool needs:
//! page content by id (with the storage-format body expanded) and the page's
//! attachment listing. Authentication is HTTP Basic with the account email as
//! username and an API token as password, attached to every request.
//!
//! One attempt per request, no retry — callers needing retry compose it
//! externally. Every request carries the configured timeout so an
//! unreachable host cannot block an invocation indefinitely.

use crate::credentials::Credentials;
use crate::error::{ExtractError, ImageError};
use crate::output::{AttachmentRef, PageContent};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Blocking Confluence REST client bound to one host and one credential pair.
pub struct ConfluenceClient {
    http: reqwest::blocking::Client,
    base_url: String,
    credentials: Credentials,
}

impl ConfluenceClient {
    /// Create a client for `base_url` (scheme + host, no trailing slash).
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout_secs: u64,
    ) -> Result<Self, ExtractError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExtractError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/wiki/rest/api", self.base_url)
    }

    /// Fetch page content including its storage-format body and metadata.
    ///
    /// 401/403 map to [`ExtractError::AuthError`], 404 to
    /// [`ExtractError::NotFound`], anything else non-2xx (and transport
    /// failures) to [`ExtractError::TransportError`].
    pub fn fetch_page(&self, page_id: &str) -> Result<PageContent, ExtractError> {
        let url = format!("{}/content/{}?expand=body.storage", self.api_url(), page_id);
        debug!("Fetching: {url}");

        let response = self.get(&url)?;
        let status = response.status();
        debug!("Response status: {status}");

        if let Some(err) = map_status(status.as_u16(), &url, page_id) {
            return Err(err);
        }

        let page: PageResponse =
            response.json().map_err(|e| ExtractError::TransportError {
                url: url.clone(),
                reason: format!("invalid JSON body: {e}"),
            })?;

        let body_html = page
            .body
            .and_then(|b| b.storage)
            .map(|s| s.value)
            .unwrap_or_default();

        info!("Fetched page '{}' ({} bytes of storage HTML)", page.title, body_html.len());

        Ok(PageContent {
            title: page.title,
            kind: page.kind,
            status: page.status,
            body_html,
            page_id: page.id,
        })
    }

    /// Fetch the page's attachment listing.
    ///
    /// A page with no attachments yields an empty list, not an error. The
    /// caller treats any failure here as non-fatal.
    pub fn fetch_attachments(&self, page_id: &str) -> Result<Vec<AttachmentRef>, ExtractError> {
        let url = format!(
            "{}/content/{}/child/attachment?expand=metadata.mediaType&limit=200",
            self.api_url(),
            page_id
        );
        debug!("Fetching attachments: {url}");

        let response = self.get(&url)?;
        if let Some(err) = map_status(response.status().as_u16(), &url, page_id) {
            return Err(err);
        }

        let listing: AttachmentsResponse =
            response.json().map_err(|e| ExtractError::TransportError {
                url: url.clone(),
                reason: format!("invalid JSON body: {e}"),
            })?;

        let attachments: Vec<AttachmentRef> = listing
            .results
            .into_iter()
            .map(|a| {
                let download_url = self.absolute_download_url(page_id, &a);
                AttachmentRef {
                    filename: a.title,
                    media_type: a.metadata.media_type,
                    download_url,
                }
            })
            .collect();

        debug!("Found {} attachments", attachments.len());
        Ok(attachments)
    }

    /// Download raw bytes from an authenticated URL.
    ///
    /// Failure is data: the caller records the [`ImageError`] on the
    /// corresponding per-image result instead of aborting the run.
    pub fn download(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        debug!("Downloading image: {url}");
        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.email, Some(&self.credentials.api_token))
            .send()
            .map_err(|e| ImageError::DownloadFailed {
                reference: url.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::DownloadFailed {
                reference: url.to_string(),
                detail: format!("HTTP {status}"),
            });
        }

        let bytes = response.bytes().map_err(|e| ImageError::DownloadFailed {
            reference: url.to_string(),
            detail: e.to_string(),
        })?;
        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Check the credentials against `/user/current`.
    ///
    /// Only invoked in debug mode, to tell bad credentials apart from
    /// page-level failures before the page fetch runs.
    pub fn verify_auth(&self) -> Result<String, ExtractError> {
        let url = format!("{}/user/current", self.api_url());
        let response = self.get(&url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::AuthError {
                status: status.as_u16(),
            });
        }
        let user: UserResponse = response.json().map_err(|e| ExtractError::TransportError {
            url,
            reason: format!("invalid JSON body: {e}"),
        })?;
        Ok(user.display_name.unwrap_or_else(|| "Unknown".to_string()))
    }

    /// Conventional attachment download URL, used when the listing carries no
    /// entry for a referenced filename.
    pub fn conventional_download_url(&self, page_id: &str, filename: &str) -> String {
        format!(
            "{}/wiki/download/attachments/{}/{}",
            self.base_url, page_id, filename
        )
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ExtractError> {
        self.http
            .get(url)
            .basic_auth(&self.credentials.email, Some(&self.credentials.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| ExtractError::TransportError {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn absolute_download_url(&self, page_id: &str, att: &AttachmentResult) -> String {
        let link = att.links.download.trim();
        if link.is_empty() {
            self.conventional_download_url(page_id, &att.title)
        } else if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            // Download links in the listing are relative to the wiki root.
            format!("{}/wiki{}", self.base_url, link)
        }
    }
}

/// Map a non-2xx status to the matching fatal error; None for success.
fn map_status(status: u16, url: &str, page_id: &str) -> Option<ExtractError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(ExtractError::AuthError { status }),
        404 => Some(ExtractError::NotFound {
            page_id: page_id.to_string(),
        }),
        other => Some(ExtractError::TransportError {
            url: url.to_string(),
            reason: format!("HTTP {other}"),
        }),
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PageResponse {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    status: String,
    title: String,
    body: Option<PageBody>,
}

#[derive(Deserialize)]
struct PageBody {
    storage: Option<StorageBody>,
}

#[derive(Deserialize)]
struct StorageBody {
    value: String,
}

#[derive(Deserialize)]
struct AttachmentsResponse {
    #[serde(default)]
    results: Vec<AttachmentResult>,
}

#[derive(Deserialize)]
struct AttachmentResult {
    title: String,
    #[serde(default)]
    metadata: AttachmentMetadata,
    #[serde(rename = "_links", default)]
    links: AttachmentLinks,
}

#[derive(Deserialize, Default)]
struct AttachmentMetadata {
    #[serde(rename = "mediaType", default)]
    media_type: String,
}

#[derive(Deserialize, Default)]
struct AttachmentLinks {
    #[serde(default)]
    download: String,
}

#[derive(Deserialize)]
struct UserResponse {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;

    fn client() -> ConfluenceClient {
        ConfluenceClient::new(
            "https://acme.atlassian.net",
            Credentials {
                email: "me@example.com".into(),
                api_token: "tok".into(),
            },
            5,
        )
        .unwrap()
    }

    #[test]
    fn status_mapping() {
        assert!(map_status(200, "u", "1").is_none());
        assert!(matches!(
            map_status(403, "u", "1"),
            Some(ExtractError::AuthError { status: 403 })
        ));
        assert!(matches!(
            map_status(404, "u", "1"),
            Some(ExtractError::NotFound { .. })
        ));
        assert!(matches!(
            map_status(500, "u", "1"),
            Some(ExtractError::TransportError { .. })
        ));
    }

    #[test]
    fn page_response_deserialises() {
        let json = r#"{
            "id": "123456",
            "type": "page",
            "status": "current",
            "title": "Release Notes",
            "body": { "storage": { "value": "<p>hi</p>", "representation": "storage" } }
        }"#;
        let page: PageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.id, "123456");
        assert_eq!(page.kind, "page");
        assert_eq!(page.body.unwrap().storage.unwrap().value, "<p>hi</p>");
    }

    #[test]
    fn attachment_listing_deserialises() {
        let json = r#"{
            "results": [
                {
                    "title": "chart.png",
                    "metadata": { "mediaType": "image/png" },
                    "_links": { "download": "/download/attachments/123456/chart.png?version=2" }
                },
                { "title": "notes.txt" }
            ],
            "size": 2
        }"#;
        let listing: AttachmentsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(listing.results.len(), 2);
        assert_eq!(listing.results[0].metadata.media_type, "image/png");
        assert_eq!(listing.results[1].links.download, "");
    }

    #[test]
    fn relative_download_link_is_joined_under_wiki() {
        let att: AttachmentResult = serde_json::from_str(
            r#"{"title":"chart.png","_links":{"download":"/download/attachments/123/chart.png"}}"#,
        )
        .unwrap();
        let url = client().absolute_download_url("123", &att);
        assert_eq!(
            url,
            "https://acme.atlassian.net/wiki/download/attachments/123/chart.png"
        );
    }

    #[test]
    fn missing_download_link_falls_back_to_convention() {
        let att: AttachmentResult = serde_json::from_str(r#"{"title":"chart.png"}"#).unwrap();
        let url = client().absolute_download_url("123", &att);
        assert_eq!(
            url,
            "https://acme.atlassian.net/wiki/download/attachments/123/chart.png"
        );
    }
}
