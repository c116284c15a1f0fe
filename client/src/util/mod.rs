//! Navigation and styling helpers for pages and components.
//!
//! `redirect` maps a role to its home route and turns gate outcomes into
//! browser navigations; `classes` joins the Card base classes with caller
//! overrides.

pub mod classes;
pub mod redirect;

#[cfg(test)]
pub(crate) mod test_support;
