//! # client
//!
//! Leptos + WASM frontend for the Autamedica session layer.
//!
//! This crate contains the reactive session context, route guards, card
//! primitives, and the sign-in / role home pages. All session logic lives in
//! the `session` crate; components here only mirror its state into signals
//! and render from [`session::gate`] decisions.

pub mod app;
pub mod components;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry point: build the backend from compile-time config and mount
/// the app, or mount a configuration error screen.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use app::{App, ConfigError};
    use leptos::prelude::*;

    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    match app::browser_store() {
        Ok(store) => leptos::mount::mount_to_body(move || view! { <App store=store.clone()/> }),
        Err(e) => {
            log::error!("autamedica client failed to start: {e}");
            let message = e.to_string();
            leptos::mount::mount_to_body(move || view! { <ConfigError message=message.clone()/> });
        }
    }
}
