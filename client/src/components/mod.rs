//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render presentation primitives and session-gated wrappers.
//! Session-aware components take the [`crate::state::auth::AuthContext`] as
//! a prop instead of reading it from context.

pub mod card;
pub mod protected_route;
