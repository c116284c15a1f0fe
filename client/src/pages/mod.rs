//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (form state, spawning session
//! actions) and delegates rendering details to `components`.

pub mod account;
pub mod home;
pub mod signin;
pub mod unauthorized;
