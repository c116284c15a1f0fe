//! Reactive session context for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The app root creates one [`AuthContext`] and passes it as a required prop
//! to every guard and page. There is no ambient lookup: a component that
//! needs the session takes it as an argument, so a missing provider is a
//! compile error rather than a runtime failure.
//!
//! DESIGN
//! ======
//! The [`SessionStore`] stays the only writer. `mount` starts the store's
//! initialization and listener on the browser executor and mirrors every
//! committed snapshot into an `RwSignal`, which views read reactively.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;

use model::Role;
use session::{GateOutcome, RoleRequirement, SessionState, SessionStore, gate};

/// `Copy` handle over the session signal and its store.
#[derive(Clone, Copy)]
pub struct AuthContext {
    state: RwSignal<SessionState>,
    store: StoredValue<SessionStore>,
}

impl AuthContext {
    /// Wrap `store`, seeding the signal with its current snapshot.
    pub fn new(store: SessionStore) -> Self {
        Self { state: RwSignal::new(store.snapshot()), store: StoredValue::new(store) }
    }

    /// Start session resolution and keep the signal in sync with the store
    /// until the owning reactive scope is cleaned up.
    pub fn mount(&self) {
        #[cfg(feature = "csr")]
        {
            let store = self.store();
            let subscription = session::Subscription::new();
            let state = self.state;

            leptos::task::spawn_local(store.listen(subscription.token()));
            {
                let store = store.clone();
                let token = subscription.token();
                leptos::task::spawn_local(async move { store.initialize(&token).await });
            }
            {
                let mut changes = store.watch();
                let token = subscription.token();
                leptos::task::spawn_local(async move {
                    loop {
                        let snapshot = changes.borrow_and_update().clone();
                        if state.try_set(snapshot).is_some() {
                            break;
                        }
                        tokio::select! {
                            () = token.cancelled() => break,
                            changed = changes.changed() => {
                                if changed.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                });
            }

            on_cleanup(move || subscription.unsubscribe());
        }
    }

    /// Current snapshot, tracked.
    pub fn get(&self) -> SessionState {
        self.state.get()
    }

    /// Read the snapshot by reference, tracked.
    pub fn with<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        self.state.with(f)
    }

    pub fn store(&self) -> SessionStore {
        self.store.get_value()
    }

    /// Guard decision for `requirement`, tracked.
    pub fn gate(&self, requirement: &RoleRequirement) -> GateOutcome {
        self.with(|state| gate::evaluate(state, requirement))
    }

    pub fn role(&self) -> Option<Role> {
        self.with(SessionState::role)
    }

    /// Replace the mirrored snapshot directly.
    #[cfg(test)]
    pub(crate) fn set(&self, state: SessionState) {
        self.state.set(state);
    }
}
