//! Dragon Companion core crate.
//!
//! Companion visual for a voice-assistant skill: an idle sprite animation on a
//! canvas, a roar effect (sound plus sprite sweep), and a messaging bridge to
//! the skill backend through the host's `Alexa` SDK. The page loads the SDK and
//! this module, then calls `start_companion()`.
//!
//! Modules without DOM access (`config`, `message`, `session`, the pure halves
//! of `idle`, `roar` and `sprite`) are exercised by native tests.

use wasm_bindgen::prelude::*;

pub mod alexa;
mod app;
pub mod config;
pub mod debug;
pub mod error;
pub mod idle;
mod input;
pub mod message;
pub mod roar;
pub mod session;
pub mod sprite;

pub use config::{CompanionConfig, IdleDriver, RoarStopPolicy};
pub use error::CompanionError;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);
}

// -----------------------------------------------------------------------------
// Page entrypoints
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_companion() -> Result<(), JsValue> {
    app::start(CompanionConfig::default()).map_err(JsValue::from)
}

/// Start with a partial JSON override of the page constants.
#[wasm_bindgen]
pub fn start_companion_with_config(config_json: &str) -> Result<(), JsValue> {
    let config = CompanionConfig::from_json(config_json)?;
    app::start(config).map_err(JsValue::from)
}

/// Fire the roar effect from page script. Returns false before start.
#[wasm_bindgen]
pub fn trigger_roar() -> bool {
    match app::current() {
        Some(companion) => {
            companion.roar.trigger();
            true
        }
        None => false,
    }
}

/// Send a JSON object to the skill backend through the active session.
#[wasm_bindgen]
pub fn send_skill_message(payload_json: &str) -> Result<(), JsValue> {
    let payload: message::OutboundMessage =
        serde_json::from_str(payload_json).map_err(CompanionError::from)?;
    let companion = app::current().ok_or_else(|| JsValue::from_str("companion not started"))?;
    companion.session.send_message(&payload);
    Ok(())
}

#[wasm_bindgen]
pub fn open_microphone() -> Result<(), JsValue> {
    let companion = app::current().ok_or_else(|| JsValue::from_str("companion not started"))?;
    companion.session.open_microphone();
    Ok(())
}
