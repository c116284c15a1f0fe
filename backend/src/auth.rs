//! Identity-service calls: password and passwordless sign-in, sign-up,
//! sign-out, current-user lookup, and session refresh.
//!
//! SYSTEM CONTEXT
//! ==============
//! The auth client owns the only copy of the signed-in session. The REST and
//! realtime clients read the access token from the shared slot, so a sign-out
//! here immediately downgrades every later row request to the public key.
//!
//! Every transition that changes who is signed in is announced on a broadcast
//! channel as an [`AuthEvent`]; the session store listens to it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use model::SignUpProfile;

use crate::config::BackendConfig;
use crate::error::{BackendError, api_error_message};

const AUTH_EVENT_CAPACITY: usize = 16;

/// Identity record returned by the auth service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Sign-up metadata (`name`, `role`) as stored by the service.
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Tokens for a signed-in identity.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthIdentity,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Auth-state change pushed to listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    SignedIn { user: AuthIdentity },
    SignedOut,
    TokenRefreshed { user: AuthIdentity },
}

/// Result of a sign-in request.
#[derive(Clone, Debug, PartialEq)]
pub enum SignInOutcome {
    /// Password grant succeeded; the session is stored.
    Session(AuthSession),
    /// Passwordless mode: a sign-in link was emailed.
    LinkSent,
}

impl SignInOutcome {
    /// Identity signed in by this call, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&AuthIdentity> {
        match self {
            Self::Session(session) => Some(&session.user),
            Self::LinkSent => None,
        }
    }
}

/// Result of a sign-up request.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    /// The service auto-confirmed the account and opened a session.
    Session(AuthSession),
    /// The account exists but must be confirmed from the emailed link.
    ConfirmationRequired(AuthIdentity),
}

pub(crate) type SessionSlot = Arc<RwLock<Option<AuthSession>>>;

/// Read the access token from a shared slot.
pub(crate) fn access_token(slot: &SessionSlot) -> Option<String> {
    slot.read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(|s| s.access_token.clone())
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct OtpRequest<'a> {
    email: &'a str,
    create_user: bool,
    data: serde_json::Value,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Serialize)]
struct SignUpMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    role: &'static str,
}

fn sign_up_request<'a>(email: &'a str, password: &'a str, profile: &'a SignUpProfile) -> SignUpRequest<'a> {
    SignUpRequest {
        email,
        password,
        data: SignUpMetadata { name: profile.name.as_deref(), role: profile.role_or_default().as_str() },
    }
}

/// Client for the `/auth/v1` endpoints.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    redirect_to: String,
    session: SessionSlot,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthClient {
    pub(crate) fn new(http: reqwest::Client, config: &BackendConfig, session: SessionSlot) -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            http,
            base_url: config.auth_url(),
            anon_key: config.anon_key.clone(),
            redirect_to: config.email_redirect_url(),
            session,
            events,
        }
    }

    /// Subscribe to auth-state changes from this point on.
    #[must_use]
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// The stored session, if signed in.
    #[must_use]
    pub fn current_session(&self) -> Option<AuthSession> {
        self.session.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Sign in with a password, or request a sign-in link when `password` is `None`.
    ///
    /// # Errors
    ///
    /// Returns the service's message for rejected credentials or transport failures.
    pub async fn sign_in(&self, email: &str, password: Option<&str>) -> Result<SignInOutcome, BackendError> {
        match password {
            Some(password) => {
                let session = self.sign_in_with_password(email, password).await?;
                Ok(SignInOutcome::Session(session))
            }
            None => {
                self.sign_in_with_otp(email).await?;
                Ok(SignInOutcome::LinkSent)
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        debug!(%email, "password sign-in");
        let url = format!("{}/token", self.base_url);
        let response = self
            .http
            .post(url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;
        let session: AuthSession = read_json(response).await?;
        self.store_session(session.clone());
        info!(user_id = %session.user.id, "signed in");
        self.emit(AuthEvent::SignedIn { user: session.user.clone() });
        Ok(session)
    }

    async fn sign_in_with_otp(&self, email: &str) -> Result<(), BackendError> {
        debug!(%email, "requesting sign-in link");
        let url = format!("{}/otp", self.base_url);
        let response = self
            .http
            .post(url)
            .query(&[("redirect_to", self.redirect_to.as_str())])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&OtpRequest { email, create_user: true, data: serde_json::json!({}) })
            .send()
            .await?;
        expect_success(response).await
    }

    /// Register a new account carrying `{name, role}` metadata.
    ///
    /// # Errors
    ///
    /// Returns the service's message when registration is refused.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> Result<SignUpOutcome, BackendError> {
        debug!(%email, role = %profile.role_or_default(), "sign-up");
        let url = format!("{}/signup", self.base_url);
        let response = self
            .http
            .post(url)
            .query(&[("redirect_to", self.redirect_to.as_str())])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&sign_up_request(email, password, profile))
            .send()
            .await?;
        let outcome: SignUpOutcome = read_json(response).await?;
        if let SignUpOutcome::Session(session) = &outcome {
            self.store_session(session.clone());
            self.emit(AuthEvent::SignedIn { user: session.user.clone() });
        }
        Ok(outcome)
    }

    /// End the stored session. Without a stored session this only announces
    /// the sign-out.
    ///
    /// # Errors
    ///
    /// Returns the service's message if it refuses the logout; the local
    /// session is kept in that case.
    pub async fn sign_out(&self) -> Result<(), BackendError> {
        if let Some(token) = access_token(&self.session) {
            let url = format!("{}/logout", self.base_url);
            let response = self
                .http
                .post(url)
                .header("apikey", &self.anon_key)
                .bearer_auth(token)
                .send()
                .await?;
            expect_success(response).await?;
        }
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("signed out");
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    /// Fetch the identity behind the stored session. `Ok(None)` when signed out.
    ///
    /// # Errors
    ///
    /// Returns the service's message if the stored token is rejected.
    pub async fn get_user(&self) -> Result<Option<AuthIdentity>, BackendError> {
        let Some(token) = access_token(&self.session) else {
            return Ok(None);
        };
        let url = format!("{}/user", self.base_url);
        let response = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;
        read_json(response).await.map(Some)
    }

    /// Exchange the stored refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NoSession`] when signed out, or the service's
    /// message if the refresh token is rejected.
    pub async fn refresh_session(&self) -> Result<AuthSession, BackendError> {
        let refresh_token = self
            .current_session()
            .map(|s| s.refresh_token)
            .ok_or(BackendError::NoSession)?;
        let url = format!("{}/token", self.base_url);
        let response = self
            .http
            .post(url)
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&RefreshGrant { refresh_token: &refresh_token })
            .send()
            .await?;
        let session: AuthSession = read_json(response).await?;
        self.store_session(session.clone());
        self.emit(AuthEvent::TokenRefreshed { user: session.user.clone() });
        Ok(session)
    }

    /// Install a session obtained elsewhere (e.g. persisted by the host) and
    /// announce it as a sign-in.
    pub fn restore_session(&self, session: AuthSession) {
        let user = session.user.clone();
        self.store_session(session);
        self.emit(AuthEvent::SignedIn { user });
    }

    fn store_session(&self, session: AuthSession) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    fn emit(&self, event: AuthEvent) {
        // No listeners is fine: the store may not be mounted (CLI one-shots).
        let _ = self.events.send(event);
    }
}

pub(crate) async fn read_json<T>(response: reqwest::Response) -> Result<T, BackendError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status().as_u16();
    let body = response.text().await?;
    if !(200..300).contains(&status) {
        return Err(BackendError::Api { status, message: api_error_message(status, &body) });
    }
    serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))
}

pub(crate) async fn expect_success(response: reqwest::Response) -> Result<(), BackendError> {
    let status = response.status().as_u16();
    if (200..300).contains(&status) {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api { status, message: api_error_message(status, &body) })
}
