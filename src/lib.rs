#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Motion and interaction layer for a single-page portfolio site.
//!
//! `motion` holds the host-agnostic primitives (interpolation, frame and
//! timer scheduling, capability gating, reveal tracking), `effects` builds
//! the page's effects on top of them, and `contact` owns the contact form
//! flow. Browser bindings live in the wasm-only `wasm` module.

#[macro_use]
pub mod macros;

pub mod config;
pub mod contact;
pub mod effects;
pub mod error;
pub mod motion;

pub use config::SiteConfig;
pub use error::{SiteError, SiteResult};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use crate::config::SiteConfig;
    use crate::error::SiteError;

    pub mod canvas;
    pub mod contact;
    pub mod host;
    pub mod observe;
    pub mod page;
    pub mod render;

    thread_local! {
        static PAGE: RefCell<Option<page::Page>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let window = web_sys::window().ok_or(SiteError::NoWindow)?;
        let document = window.document().ok_or(SiteError::NoDocument)?;
        let config = SiteConfig::from_document(&document).unwrap_or_else(|err| {
            console_warn!("{}; using defaults", err);
            SiteConfig::default()
        });

        let page = page::Page::boot(&window, &document, &config)?;
        PAGE.with(|slot| *slot.borrow_mut() = Some(page));
        Ok(())
    }

    /// Unmount every effect, e.g. before the host page swaps content out.
    #[wasm_bindgen]
    pub fn shutdown() {
        PAGE.with(|slot| slot.borrow_mut().take());
    }
}

// When compiling for non-wasm targets (e.g., `cargo test` on host),
// provide an empty stub so the crate still builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn main() {}
