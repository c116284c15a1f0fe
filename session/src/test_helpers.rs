//! In-memory [`Backend`] for store tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{broadcast, oneshot};

use backend::{AuthEvent, AuthIdentity, AuthSession, Backend, BackendError, SignInOutcome, SignUpOutcome};
use model::{Doctor, DoctorProfile, Joined, Patient, PatientProfile, Role, SignUpProfile, User, UserUpdate};

pub(crate) fn fake_user(id: &str, role: Role) -> User {
    User {
        id: id.to_owned(),
        email: format!("{id}@example.com"),
        name: format!("User {id}"),
        role,
        phone: None,
        avatar_url: None,
        is_active: true,
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

pub(crate) fn fake_patient(user_id: &str) -> PatientProfile {
    Joined::bare(Patient {
        id: format!("p-{user_id}"),
        user_id: user_id.to_owned(),
        date_of_birth: None,
        gender: None,
        address: None,
        emergency_contact_name: None,
        emergency_contact_phone: None,
        medical_record_number: None,
        insurance_provider: None,
        insurance_number: None,
        allergies: Vec::new(),
        chronic_conditions: Vec::new(),
    })
}

pub(crate) fn fake_doctor(user_id: &str) -> DoctorProfile {
    Joined::bare(Doctor {
        id: format!("d-{user_id}"),
        user_id: user_id.to_owned(),
        license_number: "LIC-1".to_owned(),
        specialties: vec!["cardiology".to_owned()],
        years_experience: 3,
        consultation_fee: None,
        education: Vec::new(),
        certifications: Vec::new(),
        languages: Vec::new(),
        timezone: "UTC".to_owned(),
        is_verified: true,
        is_available: true,
    })
}

pub(crate) fn identity(id: &str) -> AuthIdentity {
    AuthIdentity { id: id.to_owned(), email: Some(format!("{id}@example.com")), user_metadata: serde_json::Value::Null }
}

fn api_error(message: &str) -> BackendError {
    BackendError::Api { status: 400, message: message.to_owned() }
}

/// Pauses the next `fetch_user` after it has read its row.
pub(crate) struct HeldFetch {
    pub entered: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

struct Hold {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

pub(crate) struct FakeBackend {
    pub identity: Mutex<Result<Option<AuthIdentity>, String>>,
    pub users: Mutex<HashMap<String, User>>,
    pub patients: Mutex<HashMap<String, PatientProfile>>,
    pub doctors: Mutex<HashMap<String, DoctorProfile>>,
    pub sign_in_error: Mutex<Option<String>>,
    pub sign_up_error: Mutex<Option<String>>,
    pub sign_out_error: Mutex<Option<String>>,
    pub update_error: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
    hold: Mutex<Option<Hold>>,
    events: broadcast::Sender<AuthEvent>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            identity: Mutex::new(Ok(None)),
            users: Mutex::new(HashMap::new()),
            patients: Mutex::new(HashMap::new()),
            doctors: Mutex::new(HashMap::new()),
            sign_in_error: Mutex::new(None),
            sign_up_error: Mutex::new(None),
            sign_out_error: Mutex::new(None),
            update_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            hold: Mutex::new(None),
            events,
        }
    }

    /// Register a user with the role row matching `role`.
    pub fn with_user(self, id: &str, role: Role) -> Self {
        self.users.lock().unwrap().insert(id.to_owned(), fake_user(id, role));
        match role {
            Role::Patient => {
                self.patients.lock().unwrap().insert(id.to_owned(), fake_patient(id));
            }
            Role::Doctor => {
                self.doctors.lock().unwrap().insert(id.to_owned(), fake_doctor(id));
            }
            Role::CompanyAdmin | Role::PlatformAdmin => {}
        }
        self
    }

    pub fn signed_in_as(self, id: &str) -> Self {
        *self.identity.lock().unwrap() = Ok(Some(identity(id)));
        self
    }

    pub fn rename(&self, id: &str, name: &str) {
        if let Some(user) = self.users.lock().unwrap().get_mut(id) {
            user.name = name.to_owned();
        }
    }

    pub fn hold_next_user_fetch(&self) -> HeldFetch {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.hold.lock().unwrap() = Some(Hold { entered: entered_tx, release: release_rx });
        HeldFetch { entered: entered_rx, release: release_tx }
    }

    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_owned());
    }

    fn session_for(&self, email: &str) -> Option<AuthSession> {
        let users = self.users.lock().unwrap();
        let user = users.values().find(|u| u.email == email)?;
        Some(AuthSession {
            access_token: "access".to_owned(),
            token_type: "bearer".to_owned(),
            expires_in: 3600,
            expires_at: None,
            refresh_token: "refresh".to_owned(),
            user: identity(&user.id),
        })
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn current_identity(&self) -> Result<Option<AuthIdentity>, BackendError> {
        self.record("current_identity");
        self.identity.lock().unwrap().clone().map_err(|m| api_error(&m))
    }

    async fn sign_in(&self, email: &str, password: Option<&str>) -> Result<SignInOutcome, BackendError> {
        self.record("sign_in");
        if let Some(message) = self.sign_in_error.lock().unwrap().clone() {
            return Err(api_error(&message));
        }
        if password.is_none() {
            return Ok(SignInOutcome::LinkSent);
        }
        let session = self.session_for(email).ok_or_else(|| api_error("Invalid login credentials"))?;
        self.emit(AuthEvent::SignedIn { user: session.user.clone() });
        Ok(SignInOutcome::Session(session))
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _profile: &SignUpProfile,
    ) -> Result<SignUpOutcome, BackendError> {
        self.record("sign_up");
        if let Some(message) = self.sign_up_error.lock().unwrap().clone() {
            return Err(api_error(&message));
        }
        Ok(SignUpOutcome::ConfirmationRequired(identity(email)))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.record("sign_out");
        if let Some(message) = self.sign_out_error.lock().unwrap().clone() {
            return Err(api_error(&message));
        }
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<User, BackendError> {
        self.record("fetch_user");
        let user = self.users.lock().unwrap().get(user_id).cloned();
        let hold = self.hold.lock().unwrap().take();
        if let Some(hold) = hold {
            let _ = hold.entered.send(());
            let _ = hold.release.await;
        }
        user.ok_or(BackendError::Api { status: 406, message: "user not found".to_owned() })
    }

    async fn update_user(&self, user_id: &str, updates: &UserUpdate) -> Result<User, BackendError> {
        self.record("update_user");
        if let Some(message) = self.update_error.lock().unwrap().clone() {
            return Err(api_error(&message));
        }
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(user_id).ok_or_else(|| api_error("user not found"))?;
        if let Some(name) = &updates.name {
            user.name.clone_from(name);
        }
        if let Some(phone) = &updates.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(avatar_url) = &updates.avatar_url {
            user.avatar_url = Some(avatar_url.clone());
        }
        Ok(user.clone())
    }

    async fn fetch_patient(&self, user_id: &str) -> Result<PatientProfile, BackendError> {
        self.record("fetch_patient");
        self.patients.lock().unwrap().get(user_id).cloned().ok_or_else(|| api_error("patient not found"))
    }

    async fn fetch_doctor(&self, user_id: &str) -> Result<DoctorProfile, BackendError> {
        self.record("fetch_doctor");
        self.doctors.lock().unwrap().get(user_id).cloned().ok_or_else(|| api_error("doctor not found"))
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
