//! Backend configuration parsed from environment variables.
//!
//! Two values are required: the service endpoint and the public API key.
//! Missing either one is a fatal startup error for every host (CLI, browser
//! build). The site URL only shapes the redirect target embedded in
//! sign-in and sign-up emails.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::error::BackendError;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const SITE_URL_VAR: &str = "AUTAMEDICA_SITE_URL";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const AUTH_CALLBACK_PATH: &str = "/auth/callback";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Service endpoint without a trailing slash, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Origin of the web application, used for email redirect links.
    pub site_url: String,
}

impl BackendConfig {
    /// Build config from the process environment.
    ///
    /// Required: `SUPABASE_URL`, `SUPABASE_ANON_KEY`.
    /// Optional: `AUTAMEDICA_SITE_URL` (default `http://localhost:3000`).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingConfig`] for an absent or blank required
    /// variable and [`BackendError::InvalidConfig`] for a non-HTTP URL.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (env, compile-time values, tests).
    ///
    /// # Errors
    ///
    /// Same as [`BackendConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BackendError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = required(&lookup, URL_VAR)?;
        let anon_key = required(&lookup, ANON_KEY_VAR)?;
        let site_url = lookup(SITE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_owned());

        let url = normalize_http_url(URL_VAR, &url)?;
        let site_url = normalize_http_url(SITE_URL_VAR, &site_url)?;
        Ok(Self { url, anon_key, site_url })
    }

    /// Base of the identity service endpoints.
    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }

    /// Base of the row-store endpoints.
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// Websocket endpoint of the change feed, authenticated with the public key.
    #[must_use]
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.url.clone()
        };
        format!("{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0", self.anon_key)
    }

    /// Where confirmation and magic-link emails send the user back to.
    #[must_use]
    pub fn email_redirect_url(&self) -> String {
        format!("{}{AUTH_CALLBACK_PATH}", self.site_url)
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, BackendError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(BackendError::MissingConfig { var })
}

fn normalize_http_url(var: &str, raw: &str) -> Result<String, BackendError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(trimmed.to_owned())
    } else {
        Err(BackendError::InvalidConfig(format!("{var} must be an http(s) URL, got '{raw}'")))
    }
}
