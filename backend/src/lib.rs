//! # backend
//!
//! Backend-access facade for the hosted identity + row store + realtime
//! service used by Autamedica.
//!
//! Every function issues one remote operation and returns a `Result`; there
//! are no retries, timeouts, caches, or batching. [`Supabase`] bundles the
//! auth, row, and realtime clients around one shared session slot, and
//! implements [`Backend`], the narrow seam the session store depends on.

pub mod auth;
pub mod config;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod realtime;
pub mod rest;
pub mod services;

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use model::{DoctorProfile, PatientProfile, SignUpProfile, User, UserUpdate};

pub use auth::{AuthClient, AuthEvent, AuthIdentity, AuthSession, SignInOutcome, SignUpOutcome};
pub use config::BackendConfig;
pub use error::BackendError;
use auth::SessionSlot;
use rest::RestClient;
use services::{Appointments, Doctors, Patients, Users};

/// Remote operations the session store needs.
///
/// Implemented by [`Supabase`] for real deployments and by in-memory fakes
/// in tests.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait Backend: Send + Sync {
    /// Identity behind the stored session, `None` when signed out.
    async fn current_identity(&self) -> Result<Option<AuthIdentity>, BackendError>;

    /// Password sign-in when `password` is set, sign-in link otherwise.
    async fn sign_in(&self, email: &str, password: Option<&str>) -> Result<SignInOutcome, BackendError>;

    async fn sign_up(&self, email: &str, password: &str, profile: &SignUpProfile)
    -> Result<SignUpOutcome, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    async fn fetch_user(&self, user_id: &str) -> Result<User, BackendError>;

    async fn update_user(&self, user_id: &str, updates: &UserUpdate) -> Result<User, BackendError>;

    async fn fetch_patient(&self, user_id: &str) -> Result<PatientProfile, BackendError>;

    async fn fetch_doctor(&self, user_id: &str) -> Result<DoctorProfile, BackendError>;

    /// Push channel of sign-in / sign-out transitions.
    fn auth_events(&self) -> broadcast::Receiver<AuthEvent>;
}

/// The hosted service client.
pub struct Supabase {
    config: BackendConfig,
    auth: AuthClient,
    rest: RestClient,
    session: SessionSlot,
}

impl Supabase {
    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingConfig`] if a required variable is
    /// absent, or [`BackendError::HttpClientBuild`] if the HTTP client fails.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(BackendConfig::from_env()?)
    }

    /// Build a client from parsed config.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::HttpClientBuild`] if the HTTP client fails.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        let session: SessionSlot = Arc::new(RwLock::new(None));
        let auth = AuthClient::new(http.clone(), &config, session.clone());
        let rest = RestClient::new(http, &config, session.clone());
        Ok(Self { config, auth, rest, session })
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    #[must_use]
    pub fn users(&self) -> Users<'_> {
        Users { rest: &self.rest }
    }

    #[must_use]
    pub fn patients(&self) -> Patients<'_> {
        Patients { rest: &self.rest }
    }

    #[must_use]
    pub fn doctors(&self) -> Doctors<'_> {
        Doctors { rest: &self.rest }
    }

    #[must_use]
    pub fn appointments(&self) -> Appointments<'_> {
        Appointments { rest: &self.rest }
    }

    /// Change-feed client sharing this client's session.
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn realtime(&self) -> realtime::RealtimeClient {
        realtime::RealtimeClient::new(&self.config, self.session.clone())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl Backend for Supabase {
    async fn current_identity(&self) -> Result<Option<AuthIdentity>, BackendError> {
        self.auth.get_user().await
    }

    async fn sign_in(&self, email: &str, password: Option<&str>) -> Result<SignInOutcome, BackendError> {
        self.auth.sign_in(email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> Result<SignUpOutcome, BackendError> {
        self.auth.sign_up(email, password, profile).await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.auth.sign_out().await
    }

    async fn fetch_user(&self, user_id: &str) -> Result<User, BackendError> {
        self.users().get(user_id).await
    }

    async fn update_user(&self, user_id: &str, updates: &UserUpdate) -> Result<User, BackendError> {
        self.users().update(user_id, updates).await
    }

    async fn fetch_patient(&self, user_id: &str) -> Result<PatientProfile, BackendError> {
        self.patients().get(user_id).await
    }

    async fn fetch_doctor(&self, user_id: &str) -> Result<DoctorProfile, BackendError> {
        self.doctors().get(user_id).await
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth.on_auth_state_change()
    }
}
