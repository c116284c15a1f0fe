//! # session
//!
//! Client-held session state for Autamedica: who is signed in, their
//! role-specific profile row, and the loading/error flags the UI renders
//! from.
//!
//! DESIGN
//! ======
//! [`SessionStore`] is a cheap-to-clone handle around a `watch` channel of
//! [`SessionState`]. Actions (`sign_in`, `sign_out`, ...) call the backend
//! through the [`backend::Backend`] seam and commit results through a single
//! path that drops stale results: every action takes a sequence ticket and
//! only the newest ticket may write. Push-driven work (initialization and
//! the auth-event listener) additionally checks a [`Subscription`] before
//! each write, so nothing lands after teardown.
//!
//! Route gating is pure: [`gate::evaluate`] maps a state snapshot and a
//! [`gate::RoleRequirement`] to what a guarded view should show.

pub mod error;
pub mod gate;
pub mod state;
pub mod store;
pub mod subscription;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::SessionError;
pub use gate::{GateOutcome, RoleRequirement};
pub use state::{Phase, SessionState};
pub use store::SessionStore;
pub use subscription::{Subscription, SubscriptionToken};
