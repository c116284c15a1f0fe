//! Session fixtures for component tests.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::broadcast;

use backend::{AuthEvent, AuthIdentity, Backend, BackendError, SignInOutcome, SignUpOutcome};
use model::{DoctorProfile, PatientProfile, Role, SignUpProfile, User, UserUpdate};
use session::{SessionState, SessionStore};

/// Backend that is never reached by the code under test.
struct OfflineBackend {
    events: broadcast::Sender<AuthEvent>,
}

fn offline() -> BackendError {
    BackendError::Request("offline".to_owned())
}

#[async_trait]
impl Backend for OfflineBackend {
    async fn current_identity(&self) -> Result<Option<AuthIdentity>, BackendError> {
        Err(offline())
    }

    async fn sign_in(&self, _email: &str, _password: Option<&str>) -> Result<SignInOutcome, BackendError> {
        Err(offline())
    }

    async fn sign_up(&self, _: &str, _: &str, _: &SignUpProfile) -> Result<SignUpOutcome, BackendError> {
        Err(offline())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        Err(offline())
    }

    async fn fetch_user(&self, _user_id: &str) -> Result<User, BackendError> {
        Err(offline())
    }

    async fn update_user(&self, _user_id: &str, _updates: &UserUpdate) -> Result<User, BackendError> {
        Err(offline())
    }

    async fn fetch_patient(&self, _user_id: &str) -> Result<PatientProfile, BackendError> {
        Err(offline())
    }

    async fn fetch_doctor(&self, _user_id: &str) -> Result<DoctorProfile, BackendError> {
        Err(offline())
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

pub(crate) fn test_store() -> SessionStore {
    let (events, _) = broadcast::channel(4);
    SessionStore::new(Arc::new(OfflineBackend { events }))
}

pub(crate) fn signed_in(role: Role) -> SessionState {
    SessionState {
        user: Some(User {
            id: "u1".to_owned(),
            email: "u1@example.com".to_owned(),
            name: "Ana López".to_owned(),
            role,
            phone: None,
            avatar_url: None,
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }),
        ..SessionState::signed_out()
    }
}
