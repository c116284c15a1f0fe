//! Reactive state shared across pages and guards.

pub mod auth;
