//! Session store: the single writer of [`SessionState`].
//!
//! SYSTEM CONTEXT
//! ==============
//! The store sits between the UI (or CLI) and the [`Backend`]. It resolves
//! the current identity on mount, listens for pushed auth transitions, and
//! exposes the sign-in / sign-up / sign-out / profile actions. Readers get
//! snapshots via [`SessionStore::snapshot`] or a `watch` receiver.
//!
//! DESIGN
//! ======
//! Every operation takes a ticket from a monotonically increasing counter
//! before its first await. A result commits only while its ticket is still
//! the newest, so a slow profile fetch can never overwrite the outcome of a
//! later sign-out or profile update. Successful sign-out is the exception:
//! it resets unconditionally and advances the counter past everything in
//! flight.
//!
//! ERROR HANDLING
//! ==============
//! Failures are recorded as a message in `state.error` with `loading`
//! cleared. `sign_in`, `sign_up`, `send_magic_link`, and `update_profile`
//! also return the error. `sign_out` and profile loading only record it.
//! A missing role row (patient or doctor) is logged and leaves the profile
//! field empty without failing the load.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use backend::{AuthEvent, Backend, BackendError};
use model::{Role, SignUpProfile, UserUpdate};

use crate::error::SessionError;
use crate::state::SessionState;
use crate::subscription::SubscriptionToken;
#[cfg(not(target_arch = "wasm32"))]
use crate::subscription::Subscription;

/// Shared handle to the session state and its actions.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Arc<dyn Backend>,
    state: watch::Sender<SessionState>,
    generation: Mutex<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Ticket(u64);

impl SessionStore {
    /// Create a store in the initializing state.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (state, _) = watch::channel(SessionState::initializing());
        Self { inner: Arc::new(Inner { backend, state, generation: Mutex::new(0) }) }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every committed change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Spawn initialization and the auth-event listener on the current
    /// tokio runtime. Dropping the returned handle stops both.
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn mount(&self) -> Subscription {
        let subscription = Subscription::new();
        tokio::spawn(self.listen(subscription.token()));
        let store = self.clone();
        let token = subscription.token();
        tokio::spawn(async move { store.initialize(&token).await });
        subscription
    }

    /// Resolve the stored identity and load its profile.
    pub async fn initialize(&self, token: &SubscriptionToken) {
        let ticket = self.next_ticket();
        match self.inner.backend.current_identity().await {
            Ok(Some(identity)) => {
                if token.is_active() {
                    self.load_profile(&identity.id, Some(token)).await;
                }
            }
            Ok(None) => {
                self.commit(ticket, Some(token), |s| s.loading = false);
            }
            Err(e) => {
                tracing::error!(error = %e, "session initialization failed");
                self.commit(ticket, Some(token), |s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
            }
        }
    }

    /// Follow pushed auth transitions until `token` is cancelled.
    ///
    /// The event receiver is taken before this returns, so events emitted
    /// after the call are never missed.
    pub fn listen(&self, token: SubscriptionToken) -> impl Future<Output = ()> + 'static {
        let store = self.clone();
        let mut events = self.inner.backend.auth_events();
        async move {
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(AuthEvent::SignedIn { user }) => {
                            if !token.is_active() {
                                break;
                            }
                            tracing::debug!(user_id = %user.id, "auth event: signed in");
                            store.load_profile(&user.id, Some(&token)).await;
                        }
                        Ok(AuthEvent::SignedOut) => {
                            if !token.is_active() {
                                break;
                            }
                            tracing::debug!("auth event: signed out");
                            store.force(SessionState::reset);
                        }
                        Ok(AuthEvent::TokenRefreshed { .. }) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "auth event listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        }
    }

    /// Sign in with a password, or request a sign-in link when `password`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// Returns the backend failure after recording it in state. A failed
    /// profile load after a successful sign-in is recorded but not returned.
    pub async fn sign_in(&self, email: &str, password: Option<&str>) -> Result<(), SessionError> {
        let ticket = self.begin(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.inner.backend.sign_in(email, password).await {
            Ok(outcome) => {
                match outcome.identity() {
                    Some(identity) => {
                        tracing::info!(user_id = %identity.id, "signed in");
                        self.load_profile(&identity.id, None).await;
                    }
                    None => {
                        self.commit(ticket, None, |s| s.loading = false);
                    }
                }
                Ok(())
            }
            Err(e) => Err(self.fail(ticket, e)),
        }
    }

    /// Request a sign-in link for `email`.
    ///
    /// # Errors
    ///
    /// Returns the backend failure after recording it in state.
    pub async fn send_magic_link(&self, email: &str) -> Result<(), SessionError> {
        self.sign_in(email, None).await
    }

    /// Create an account. The profile is loaded by the listener when the
    /// service opens a session right away.
    ///
    /// # Errors
    ///
    /// Returns the backend failure after recording it in state.
    pub async fn sign_up(&self, email: &str, password: &str, profile: &SignUpProfile) -> Result<(), SessionError> {
        let ticket = self.begin(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.inner.backend.sign_up(email, password, profile).await {
            Ok(_) => {
                self.commit(ticket, None, |s| s.loading = false);
                Ok(())
            }
            Err(e) => Err(self.fail(ticket, e)),
        }
    }

    /// End the session. On success all state is cleared regardless of what
    /// is in flight; on failure the error is recorded and nothing is raised.
    pub async fn sign_out(&self) {
        let ticket = self.begin(|s| s.loading = true);
        match self.inner.backend.sign_out().await {
            Ok(()) => {
                tracing::info!("signed out");
                self.force(SessionState::reset);
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-out failed");
                self.commit(ticket, None, |s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
            }
        }
    }

    /// Write account fields for the signed-in user. A no-op without a user.
    ///
    /// # Errors
    ///
    /// Returns the backend failure after recording it in state.
    pub async fn update_profile(&self, updates: &UserUpdate) -> Result<(), SessionError> {
        let Some(user_id) = self.current_user_id() else {
            return Ok(());
        };
        let ticket = self.begin(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.inner.backend.update_user(&user_id, updates).await {
            Ok(user) => {
                self.commit(ticket, None, |s| {
                    s.user = Some(user);
                    s.loading = false;
                });
                Ok(())
            }
            Err(e) => Err(self.fail(ticket, e)),
        }
    }

    /// Reload the signed-in user's profile. A no-op without a user.
    pub async fn refresh_user(&self) {
        if let Some(user_id) = self.current_user_id() {
            self.load_profile(&user_id, None).await;
        }
    }

    async fn load_profile(&self, user_id: &str, token: Option<&SubscriptionToken>) {
        let ticket = self.next_ticket();
        let backend = &self.inner.backend;
        let user = match backend.fetch_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "user profile fetch failed");
                self.commit(ticket, token, |s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
                return;
            }
        };

        let (patient, doctor) = match user.role {
            Role::Patient => (role_row(backend.fetch_patient(user_id).await, user_id, "patient"), None),
            Role::Doctor => (None, role_row(backend.fetch_doctor(user_id).await, user_id, "doctor")),
            Role::CompanyAdmin | Role::PlatformAdmin => (None, None),
        };

        self.commit(ticket, token, |s| {
            s.user = Some(user);
            s.patient = patient;
            s.doctor = doctor;
            s.company = None;
            s.loading = false;
            s.error = None;
        });
    }

    fn current_user_id(&self) -> Option<String> {
        self.inner.state.borrow().user_id().map(str::to_owned)
    }

    fn next_ticket(&self) -> Ticket {
        let mut generation = self.inner.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        Ticket(*generation)
    }

    /// Take a ticket and apply the operation's opening write.
    fn begin(&self, apply: impl FnOnce(&mut SessionState)) -> Ticket {
        let mut generation = self.inner.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.inner.state.send_modify(apply);
        Ticket(*generation)
    }

    /// Apply `apply` if `ticket` is still the newest and `token` (when given)
    /// is active. Returns whether the write happened.
    fn commit(
        &self,
        ticket: Ticket,
        token: Option<&SubscriptionToken>,
        apply: impl FnOnce(&mut SessionState),
    ) -> bool {
        if token.is_some_and(|t| !t.is_active()) {
            return false;
        }
        let generation = self.inner.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *generation != ticket.0 {
            tracing::debug!(ticket = ticket.0, current = *generation, "discarding stale session result");
            return false;
        }
        self.inner.state.send_modify(apply);
        true
    }

    /// Apply `apply` unconditionally and invalidate everything in flight.
    fn force(&self, apply: impl FnOnce(&mut SessionState)) {
        let mut generation = self.inner.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.inner.state.send_modify(apply);
    }

    fn fail(&self, ticket: Ticket, error: BackendError) -> SessionError {
        let message = error.to_string();
        self.commit(ticket, None, |s| {
            s.loading = false;
            s.error = Some(message);
        });
        error.into()
    }
}

fn role_row<T>(result: Result<T, BackendError>, user_id: &str, role: &str) -> Option<T> {
    match result {
        Ok(row) => Some(row),
        Err(e) => {
            tracing::warn!(%user_id, role, error = %e, "role profile fetch failed");
            None
        }
    }
}
