use std::sync::Arc;
use std::time::Duration;

use backend::AuthEvent;
use model::{Role, SignUpProfile, UserUpdate};

use super::*;
use crate::subscription::Subscription;
use crate::test_helpers::{FakeBackend, identity};

fn store_with(fake: FakeBackend) -> (SessionStore, Arc<FakeBackend>) {
    let fake = Arc::new(fake);
    (SessionStore::new(fake.clone()), fake)
}

async fn wait_until(store: &SessionStore, predicate: impl FnMut(&SessionState) -> bool) -> SessionState {
    let mut rx = store.watch();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("state change timed out")
        .expect("store dropped")
        .clone()
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// initialize
// =============================================================================

#[tokio::test]
async fn initialize_without_session_settles_signed_out() {
    let (store, _) = store_with(FakeBackend::new());
    let subscription = Subscription::new();
    store.initialize(&subscription.token()).await;

    assert_eq!(store.snapshot(), SessionState::signed_out());
}

#[tokio::test]
async fn initialize_loads_doctor_profile() {
    let (store, fake) = store_with(FakeBackend::new().with_user("d1", Role::Doctor).signed_in_as("d1"));
    let subscription = Subscription::new();
    store.initialize(&subscription.token()).await;

    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.user.as_ref().map(|u| u.role), Some(Role::Doctor));
    assert!(state.doctor.is_some());
    assert!(state.patient.is_none());
    assert!(state.company.is_none());
    assert!(state.error.is_none());
    assert_eq!(fake.calls(), vec!["current_identity", "fetch_user", "fetch_doctor"]);
}

#[tokio::test]
async fn initialize_loads_patient_profile() {
    let (store, _) = store_with(FakeBackend::new().with_user("p1", Role::Patient).signed_in_as("p1"));
    let subscription = Subscription::new();
    store.initialize(&subscription.token()).await;

    let state = store.snapshot();
    assert!(state.patient.is_some());
    assert!(state.doctor.is_none());
    assert!(state.profile_matches_role());
}

#[tokio::test]
async fn initialize_admin_has_no_role_row() {
    let (store, fake) = store_with(FakeBackend::new().with_user("a1", Role::PlatformAdmin).signed_in_as("a1"));
    let subscription = Subscription::new();
    store.initialize(&subscription.token()).await;

    let state = store.snapshot();
    assert_eq!(state.role(), Some(Role::PlatformAdmin));
    assert!(state.patient.is_none() && state.doctor.is_none() && state.company.is_none());
    assert_eq!(fake.calls(), vec!["current_identity", "fetch_user"]);
}

#[tokio::test]
async fn initialize_failure_records_error() {
    let fake = FakeBackend::new();
    *fake.identity.lock().unwrap() = Err("network down".to_owned());
    let (store, _) = store_with(fake);
    let subscription = Subscription::new();
    store.initialize(&subscription.token()).await;

    let state = store.snapshot();
    assert!(!state.loading);
    assert!(state.user.is_none());
    assert_eq!(state.error.as_deref(), Some("network down"));
}

#[tokio::test]
async fn initialize_after_unsubscribe_writes_nothing() {
    let (store, _) = store_with(FakeBackend::new().with_user("d1", Role::Doctor).signed_in_as("d1"));
    let subscription = Subscription::new();
    let token = subscription.token();
    subscription.unsubscribe();
    store.initialize(&token).await;

    assert_eq!(store.snapshot(), SessionState::initializing());
}

#[tokio::test]
async fn missing_user_row_ends_loading_with_error() {
    let (store, _) = store_with(FakeBackend::new().signed_in_as("ghost"));
    let subscription = Subscription::new();
    store.initialize(&subscription.token()).await;

    let state = store.snapshot();
    assert!(!state.loading);
    assert!(state.user.is_none());
    assert!(state.error.is_some());
}

#[tokio::test]
async fn missing_role_row_keeps_user_without_profile() {
    let fake = FakeBackend::new().with_user("d1", Role::Doctor).signed_in_as("d1");
    fake.doctors.lock().unwrap().clear();
    let (store, _) = store_with(fake);
    let subscription = Subscription::new();
    store.initialize(&subscription.token()).await;

    let state = store.snapshot();
    assert!(state.user.is_some());
    assert!(state.doctor.is_none());
    assert!(state.error.is_none());
    assert!(!state.loading);
}

// =============================================================================
// sign_in / sign_up / magic link
// =============================================================================

#[tokio::test]
async fn sign_in_with_password_loads_profile() {
    let (store, _) = store_with(FakeBackend::new().with_user("p1", Role::Patient));
    store.sign_in("p1@example.com", Some("secret")).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.user_id(), Some("p1"));
    assert!(state.patient.is_some());
    assert!(!state.loading);
}

#[tokio::test]
async fn sign_in_failure_records_and_returns_error() {
    let (store, _) = store_with(FakeBackend::new());
    let err = store.sign_in("nobody@example.com", Some("wrong")).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid login credentials");
    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Invalid login credentials"));
}

#[tokio::test]
async fn sign_in_clears_previous_error() {
    let (store, fake) = store_with(FakeBackend::new().with_user("p1", Role::Patient));
    *fake.sign_in_error.lock().unwrap() = Some("rate limited".to_owned());
    assert!(store.sign_in("p1@example.com", Some("secret")).await.is_err());

    *fake.sign_in_error.lock().unwrap() = None;
    store.sign_in("p1@example.com", Some("secret")).await.unwrap();
    assert!(store.snapshot().error.is_none());
}

#[tokio::test]
async fn magic_link_settles_without_user() {
    let (store, fake) = store_with(FakeBackend::new());
    store.send_magic_link("p1@example.com").await.unwrap();

    let state = store.snapshot();
    assert!(!state.loading);
    assert!(state.user.is_none());
    assert_eq!(fake.calls(), vec!["sign_in"]);
}

#[tokio::test]
async fn magic_link_failure_is_returned() {
    let fake = FakeBackend::new();
    *fake.sign_in_error.lock().unwrap() = Some("Email rate limit exceeded".to_owned());
    let (store, _) = store_with(fake);

    assert!(store.send_magic_link("p1@example.com").await.is_err());
    assert_eq!(store.snapshot().error.as_deref(), Some("Email rate limit exceeded"));
}

#[tokio::test]
async fn sign_up_settles_loading() {
    let (store, fake) = store_with(FakeBackend::new());
    let profile = SignUpProfile { name: Some("Ana".to_owned()), role: Some(Role::Doctor) };
    store.sign_up("ana@example.com", "secret", &profile).await.unwrap();

    let state = store.snapshot();
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(fake.calls(), vec!["sign_up"]);
}

#[tokio::test]
async fn sign_up_failure_records_and_returns_error() {
    let fake = FakeBackend::new();
    *fake.sign_up_error.lock().unwrap() = Some("User already registered".to_owned());
    let (store, _) = store_with(fake);

    let err = store.sign_up("ana@example.com", "secret", &SignUpProfile::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "User already registered");
    assert_eq!(store.snapshot().error.as_deref(), Some("User already registered"));
}

// =============================================================================
// sign_out
// =============================================================================

#[tokio::test]
async fn sign_out_clears_everything() {
    let (store, _) = store_with(FakeBackend::new().with_user("d1", Role::Doctor));
    store.sign_in("d1@example.com", Some("secret")).await.unwrap();
    assert!(store.snapshot().doctor.is_some());

    store.sign_out().await;
    assert_eq!(store.snapshot(), SessionState::signed_out());
}

#[tokio::test]
async fn sign_out_failure_records_error_without_raising() {
    let (store, fake) = store_with(FakeBackend::new().with_user("d1", Role::Doctor));
    store.sign_in("d1@example.com", Some("secret")).await.unwrap();
    *fake.sign_out_error.lock().unwrap() = Some("logout failed".to_owned());

    store.sign_out().await;
    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("logout failed"));
    assert!(state.user.is_some());
}

#[tokio::test]
async fn sign_out_beats_in_flight_profile_fetch() {
    let (store, fake) = store_with(FakeBackend::new().with_user("p1", Role::Patient));
    store.sign_in("p1@example.com", Some("secret")).await.unwrap();

    let held = fake.hold_next_user_fetch();
    let refresher = tokio::spawn({
        let store = store.clone();
        async move { store.refresh_user().await }
    });
    held.entered.await.unwrap();

    store.sign_out().await;
    held.release.send(()).unwrap();
    refresher.await.unwrap();

    assert_eq!(store.snapshot(), SessionState::signed_out());
}

// =============================================================================
// update_profile / refresh_user
// =============================================================================

#[tokio::test]
async fn update_profile_without_user_makes_no_call() {
    let (store, fake) = store_with(FakeBackend::new());
    let updates = UserUpdate { name: Some("Ana".to_owned()), ..UserUpdate::default() };
    store.update_profile(&updates).await.unwrap();

    assert!(fake.calls().is_empty());
    assert_eq!(store.snapshot(), SessionState::initializing());
}

#[tokio::test]
async fn update_profile_replaces_user() {
    let (store, _) = store_with(FakeBackend::new().with_user("p1", Role::Patient));
    store.sign_in("p1@example.com", Some("secret")).await.unwrap();

    let updates = UserUpdate { phone: Some("+52 55 0000 0000".to_owned()), ..UserUpdate::default() };
    store.update_profile(&updates).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.user.unwrap().phone.as_deref(), Some("+52 55 0000 0000"));
    assert!(state.patient.is_some());
    assert!(!state.loading);
}

#[tokio::test]
async fn update_profile_failure_keeps_user() {
    let (store, fake) = store_with(FakeBackend::new().with_user("p1", Role::Patient));
    store.sign_in("p1@example.com", Some("secret")).await.unwrap();
    *fake.update_error.lock().unwrap() = Some("permission denied".to_owned());

    let updates = UserUpdate { name: Some("Ana".to_owned()), ..UserUpdate::default() };
    assert!(store.update_profile(&updates).await.is_err());

    let state = store.snapshot();
    assert_eq!(state.user.unwrap().name, "User p1");
    assert_eq!(state.error.as_deref(), Some("permission denied"));
}

#[tokio::test]
async fn stale_profile_fetch_is_discarded() {
    let (store, fake) = store_with(FakeBackend::new().with_user("p1", Role::Patient));
    store.sign_in("p1@example.com", Some("secret")).await.unwrap();

    let held = fake.hold_next_user_fetch();
    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.refresh_user().await }
    });
    held.entered.await.unwrap();

    fake.rename("p1", "Renamed");
    store.refresh_user().await;
    assert_eq!(store.snapshot().user.unwrap().name, "Renamed");

    held.release.send(()).unwrap();
    slow.await.unwrap();
    assert_eq!(store.snapshot().user.unwrap().name, "Renamed");
}

#[tokio::test]
async fn refresh_without_user_is_a_no_op() {
    let (store, fake) = store_with(FakeBackend::new());
    store.refresh_user().await;
    assert!(fake.calls().is_empty());
}

// =============================================================================
// listener
// =============================================================================

#[tokio::test]
async fn listener_loads_profile_on_signed_in_event() {
    let (store, fake) = store_with(FakeBackend::new().with_user("d1", Role::Doctor));
    let subscription = Subscription::new();
    let listener = tokio::spawn(store.listen(subscription.token()));

    fake.emit(AuthEvent::SignedIn { user: identity("d1") });
    let state = wait_until(&store, |s| s.user.is_some()).await;
    assert!(state.doctor.is_some());

    subscription.unsubscribe();
    tokio::time::timeout(Duration::from_secs(2), listener).await.unwrap().unwrap();
}

#[tokio::test]
async fn listener_resets_on_signed_out_event() {
    let (store, fake) = store_with(FakeBackend::new().with_user("p1", Role::Patient));
    store.sign_in("p1@example.com", Some("secret")).await.unwrap();
    let subscription = Subscription::new();
    let _listener = tokio::spawn(store.listen(subscription.token()));

    fake.emit(AuthEvent::SignedOut);
    let state = wait_until(&store, |s| s.user.is_none()).await;
    assert_eq!(state, SessionState::signed_out());
}

#[tokio::test]
async fn listener_ignores_events_after_unsubscribe() {
    let (store, fake) = store_with(FakeBackend::new().with_user("d1", Role::Doctor));
    let subscription = Subscription::new();
    let listener = tokio::spawn(store.listen(subscription.token()));

    subscription.unsubscribe();
    fake.emit(AuthEvent::SignedIn { user: identity("d1") });
    settle().await;

    tokio::time::timeout(Duration::from_secs(2), listener).await.unwrap().unwrap();
    assert_eq!(store.snapshot(), SessionState::initializing());
    assert!(!fake.calls().contains(&"fetch_user".to_owned()));
}

#[tokio::test]
async fn listener_ignores_token_refresh() {
    let (store, fake) = store_with(FakeBackend::new());
    let subscription = Subscription::new();
    let _listener = tokio::spawn(store.listen(subscription.token()));

    fake.emit(AuthEvent::TokenRefreshed { user: identity("p1") });
    settle().await;
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn mount_initializes_and_listens() {
    let (store, fake) = store_with(FakeBackend::new().with_user("p1", Role::Patient));
    let subscription = store.mount();

    wait_until(&store, |s| !s.loading).await;
    assert!(store.snapshot().user.is_none());

    fake.emit(AuthEvent::SignedIn { user: identity("p1") });
    let state = wait_until(&store, |s| s.user.is_some()).await;
    assert!(state.patient.is_some());
    drop(subscription);
}
