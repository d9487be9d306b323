//! The agent surface: `describe` / `run`.
//!
//! Orchestrated callers speak structured JSON: [`describe`] advertises the
//! tool and its parameter schema (static, no I/O), [`run`] validates a
//! parameter object against that schema and executes one extraction. The
//! envelope carries success and failure alike — a failed run is still a
//! well-formed JSON answer, not a crash.

use crate::config::ExtractConfig;
use crate::credentials::{resolve_credentials, CredentialSource, EnvCredentials};
use crate::error::ExtractError;
use crate::extract::extract;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Agent name advertised to orchestrators.
pub const AGENT_NAME: &str = "confluence_converter";

/// Static agent description for orchestrator discovery.
#[derive(Debug, Clone, Serialize)]
pub struct AgentMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: Vec<&'static str>,
    /// JSON schema for [`run`]'s parameter object.
    pub parameters: Value,
}

/// Describe this agent: name, capabilities, and the `run` parameter schema.
pub fn describe() -> AgentMetadata {
    AgentMetadata {
        name: AGENT_NAME,
        description: "Extracts Confluence pages and converts them to LLM-optimized text \
                      with embedded image/table processing using OCR",
        capabilities: vec![
            "extract_confluence_content",
            "convert_html_to_text",
            "process_table_images",
            "ocr_extraction",
        ],
        parameters: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Confluence page URL (e.g. https://domain.atlassian.net/wiki/spaces/SPACE/pages/123456/Page+Title) or a bare numeric page id"
                },
                "email": {
                    "type": "string",
                    "description": "Confluence account email (optional if CONFLUENCE_EMAIL env var is set)"
                },
                "api_token": {
                    "type": "string",
                    "description": "Confluence API token (optional if CONFLUENCE_API_TOKEN env var is set)"
                },
                "debug": {
                    "type": "boolean",
                    "description": "Enable debug output with detailed processing information",
                    "default": false
                }
            },
            "required": ["url"]
        }),
    }
}

/// Validated `run` parameters. Unknown fields are rejected before any I/O.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunParams {
    pub url: String,
    pub email: Option<String>,
    pub api_token: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

impl RunParams {
    /// Validate a raw JSON object against the schema [`describe`] advertises.
    pub fn from_value(params: &Value) -> Result<Self, ExtractError> {
        serde_json::from_value(params.clone())
            .map_err(|e| ExtractError::InvalidParams(e.to_string()))
    }
}

/// The sole return value of [`run`]: success with the page fields populated,
/// or an error with a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResultEnvelope {
    Success {
        title: String,
        #[serde(rename = "type")]
        kind: String,
        /// The page's own status ("current", "draft", …) — named
        /// `status_field` on the wire because `status` tags the envelope.
        status_field: String,
        content: String,
        page_id: String,
        url: String,
    },
    Error {
        message: String,
    },
}

impl ResultEnvelope {
    fn error(message: impl std::fmt::Display) -> Self {
        ResultEnvelope::Error {
            message: message.to_string(),
        }
    }
}

/// Execute one extraction from a raw parameter object.
///
/// Validation and credential resolution happen before any network call;
/// a missing `url` or credential comes back as an error envelope without
/// touching the network. Credentials are looked up explicit-first,
/// environment-second.
pub fn run(params: &Value) -> ResultEnvelope {
    run_with_source(params, &EnvCredentials, &ExtractConfig::default())
}

/// [`run`] with an injected credential source and base config, for callers
/// (and tests) that cannot rely on process-wide environment variables.
pub fn run_with_source(
    params: &Value,
    source: &dyn CredentialSource,
    base_config: &ExtractConfig,
) -> ResultEnvelope {
    let params = match RunParams::from_value(params) {
        Ok(p) => p,
        Err(e) => return ResultEnvelope::error(e),
    };

    let credentials = match resolve_credentials(
        params.email.as_deref(),
        params.api_token.as_deref(),
        source,
    ) {
        Ok(c) => c,
        Err(e) => return ResultEnvelope::error(e),
    };

    let mut config = base_config.clone();
    config.debug = config.debug || params.debug;

    match extract(&params.url, &credentials, &config) {
        Ok(output) => ResultEnvelope::Success {
            title: output.page.title,
            kind: output.page.kind,
            status_field: output.page.status,
            content: output.text,
            page_id: output.page.page_id,
            url: params.url,
        },
        Err(e) => ResultEnvelope::error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_is_static_and_names_url_required() {
        let meta = describe();
        assert_eq!(meta.name, AGENT_NAME);
        assert_eq!(meta.parameters["required"], json!(["url"]));
        assert!(meta.parameters["properties"]["url"].is_object());
        assert_eq!(
            meta.parameters["properties"]["debug"]["default"],
            json!(false)
        );
    }

    #[test]
    fn params_missing_url_fails_naming_the_field() {
        let err = RunParams::from_value(&json!({})).unwrap_err();
        assert!(err.to_string().contains("url"), "got: {err}");
    }

    #[test]
    fn params_unknown_field_rejected() {
        let err =
            RunParams::from_value(&json!({"url": "123", "page": "extra"})).unwrap_err();
        assert!(err.to_string().contains("page"), "got: {err}");
    }

    #[test]
    fn params_debug_defaults_false() {
        let p = RunParams::from_value(&json!({"url": "123456"})).unwrap();
        assert!(!p.debug);
        assert!(p.email.is_none());
    }

    #[test]
    fn envelope_wire_format() {
        let ok = ResultEnvelope::Success {
            title: "T".into(),
            kind: "page".into(),
            status_field: "current".into(),
            content: "body".into(),
            page_id: "1".into(),
            url: "https://x/pages/1/T".into(),
        };
        let v: Value = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["type"], "page");
        assert_eq!(v["status_field"], "current");

        let err: Value = serde_json::to_value(ResultEnvelope::error("boom")).unwrap();
        assert_eq!(err["status"], "error");
        assert_eq!(err["message"], "boom");
    }
}
