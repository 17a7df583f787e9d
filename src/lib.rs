//! Luméra - live-class marketplace client core
//!
//! Typed REST clients for the Luméra backend, the persisted session record,
//! the session controller and the Leptos context that exposes it to views.

pub mod core;
pub mod ui;

/// Browser entry point: panic hook for readable wasm panics
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
}
