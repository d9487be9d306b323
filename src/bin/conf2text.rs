//! CLI binary for conf2text.
//!
//! Three entry styles share one `run` contract:
//!
//! * zero arguments — print the agent description (`describe()`) as JSON;
//! * one argument starting with `{` — agent mode: the argument is the JSON
//!   parameter object, the output is the JSON result envelope;
//! * anything else — legacy mode: a bare page URL plus flags, printing the
//!   assembled document.
//!
//! A produced envelope always exits 0, success or error — the envelope
//! carries the failure. Only argument parsing failures exit non-zero.

use anyhow::{Context, Result};
use clap::Parser;
use conf2text::{describe, run, ResultEnvelope};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Legacy mode: print the page as text
  conf2text https://acme.atlassian.net/wiki/spaces/ENG/pages/123456/Release+Notes

  # Legacy mode with per-step diagnostics (also writes debug_html.html)
  conf2text --debug https://acme.atlassian.net/wiki/pages/viewpage.action?pageId=123456

  # Agent mode: JSON in, JSON envelope out
  conf2text '{"url": "https://acme.atlassian.net/wiki/spaces/ENG/pages/123456/Notes"}'

  # Zero arguments: print the agent description (name, capabilities, schema)
  conf2text

ENVIRONMENT VARIABLES:
  CONFLUENCE_EMAIL       Account email (used when --email / params.email absent)
  CONFLUENCE_API_TOKEN   API token (used when --api-token / params.api_token absent)
  CONFLUENCE_BASE_URL    Base URL, only needed for bare numeric page ids

SETUP:
  1. Create an API token at https://id.atlassian.com/manage-profile/security/api-tokens
  2. export CONFLUENCE_EMAIL=me@example.com CONFLUENCE_API_TOKEN=...
  3. conf2text <page url>

  OCR requires a tesseract install with the relevant language data
  (e.g. `apt install tesseract-ocr` or `brew install tesseract`).
"#;

/// Extract a Confluence page to LLM-ready text (tables in images included).
#[derive(Parser, Debug)]
#[command(
    name = "conf2text",
    version,
    about = "Extract a Confluence page to LLM-ready text, OCR-ing embedded table images",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Confluence page URL or bare numeric page id.
    url: String,

    /// Confluence account email (falls back to CONFLUENCE_EMAIL).
    #[arg(long)]
    email: Option<String>,

    /// Confluence API token (falls back to CONFLUENCE_API_TOKEN).
    #[arg(long)]
    api_token: Option<String>,

    /// Enable debug output and write the raw page HTML to debug_html.html.
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // ── Describe mode ────────────────────────────────────────────────────
    if args.len() < 2 {
        init_logging(false);
        let json = serde_json::to_string_pretty(&describe())
            .context("Failed to serialise agent description")?;
        println!("{json}");
        return Ok(());
    }

    // ── Agent mode ───────────────────────────────────────────────────────
    if args.len() == 2 && args[1].trim_start().starts_with('{') {
        let params = match serde_json::from_str::<serde_json::Value>(&args[1]) {
            Ok(params) => params,
            Err(e) => {
                // Malformed arguments, not a produced envelope: exit non-zero,
                // but still answer in the envelope shape.
                init_logging(false);
                let envelope = ResultEnvelope::Error {
                    message: format!("Invalid JSON: {e}"),
                };
                println!("{}", serde_json::to_string_pretty(&envelope)?);
                std::process::exit(1);
            }
        };
        // The debug flag has to be read before validation so the subscriber
        // is verbose for the run it applies to.
        init_logging(agent_debug_flag(&params));
        let envelope = run(&params);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    // ── Legacy mode ──────────────────────────────────────────────────────
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut params = serde_json::json!({ "url": cli.url, "debug": cli.debug });
    if let Some(ref email) = cli.email {
        params["email"] = serde_json::json!(email);
    }
    if let Some(ref token) = cli.api_token {
        params["api_token"] = serde_json::json!(token);
    }

    match run(&params) {
        ResultEnvelope::Success { content, .. } => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            if !content.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
        ResultEnvelope::Error { message } => {
            // The envelope carries the failure; the process still exits 0.
            eprintln!("Error: {message}");
        }
    }

    Ok(())
}

/// The `debug` flag of a raw agent parameter object; false when absent or
/// not a boolean (full validation happens inside `run`).
fn agent_debug_flag(params: &serde_json::Value) -> bool {
    params
        .get("debug")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::agent_debug_flag;
    use serde_json::json;

    #[test]
    fn debug_flag_read_from_raw_params() {
        assert!(agent_debug_flag(&json!({"url": "1", "debug": true})));
        assert!(!agent_debug_flag(&json!({"url": "1", "debug": false})));
        assert!(!agent_debug_flag(&json!({"url": "1"})));
        // Wrong type falls back to quiet; run() reports the type error.
        assert!(!agent_debug_flag(&json!({"url": "1", "debug": "yes"})));
    }
}
