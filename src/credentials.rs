//! Credential resolution: explicit parameters first, environment second.
//!
//! The lookup order mirrors how callers actually configure the tool: an
//! orchestrator passes `email`/`api_token` in the request, a shell user
//! exports `CONFLUENCE_EMAIL`/`CONFLUENCE_API_TOKEN` once. The environment
//! read sits behind [`CredentialSource`] so tests can inject a fixed map
//! instead of racing on process-wide env vars.

use crate::error::ExtractError;

/// Environment variable holding the Confluence account email.
pub const EMAIL_VAR: &str = "CONFLUENCE_EMAIL";
/// Environment variable holding the Confluence API token.
pub const TOKEN_VAR: &str = "CONFLUENCE_API_TOKEN";

/// Basic-auth credentials for one invocation. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub api_token: String,
}

impl std::fmt::Debug for Credentials {
    // The token must not leak into logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// A passive lookup collaborator for named credential values.
pub trait CredentialSource {
    fn lookup(&self, var: &str) -> Option<String>;
}

/// The process environment.
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn lookup(&self, var: &str) -> Option<String> {
        std::env::var(var).ok().filter(|v| !v.is_empty())
    }
}

/// Resolve credentials, explicit-first, source-second.
///
/// Fails with [`ExtractError::MissingCredentials`] naming the first variable
/// that could not be resolved.
pub fn resolve_credentials(
    explicit_email: Option<&str>,
    explicit_token: Option<&str>,
    source: &dyn CredentialSource,
) -> Result<Credentials, ExtractError> {
    let email = explicit_email
        .map(str::to_string)
        .or_else(|| source.lookup(EMAIL_VAR))
        .ok_or(ExtractError::MissingCredentials { var: EMAIL_VAR })?;

    let api_token = explicit_token
        .map(str::to_string)
        .or_else(|| source.lookup(TOKEN_VAR))
        .ok_or(ExtractError::MissingCredentials { var: TOKEN_VAR })?;

    Ok(Credentials { email, api_token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource(HashMap<&'static str, &'static str>);

    impl CredentialSource for MapSource {
        fn lookup(&self, var: &str) -> Option<String> {
            self.0.get(var).map(|v| (*v).to_string())
        }
    }

    fn full_source() -> MapSource {
        MapSource(HashMap::from([
            (EMAIL_VAR, "env@example.com"),
            (TOKEN_VAR, "env-token"),
        ]))
    }

    #[test]
    fn explicit_wins_over_source() {
        let creds =
            resolve_credentials(Some("me@example.com"), Some("tok"), &full_source()).unwrap();
        assert_eq!(creds.email, "me@example.com");
        assert_eq!(creds.api_token, "tok");
    }

    #[test]
    fn source_fills_gaps() {
        let creds = resolve_credentials(Some("me@example.com"), None, &full_source()).unwrap();
        assert_eq!(creds.email, "me@example.com");
        assert_eq!(creds.api_token, "env-token");
    }

    #[test]
    fn missing_email_names_the_variable() {
        let err = resolve_credentials(None, Some("tok"), &MapSource(HashMap::new())).unwrap_err();
        assert!(err.to_string().contains(EMAIL_VAR));
    }

    #[test]
    fn missing_token_names_the_variable() {
        let err =
            resolve_credentials(Some("me@example.com"), None, &MapSource(HashMap::new()))
                .unwrap_err();
        assert!(err.to_string().contains(TOKEN_VAR));
    }

    #[test]
    fn debug_redacts_token() {
        let creds = Credentials {
            email: "me@example.com".into(),
            api_token: "sekrit".into(),
        };
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("sekrit"));
        assert!(dbg.contains("<redacted>"));
    }
}
