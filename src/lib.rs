/// Tab Hibernate - browser extension that closes tabs and remembers them
/// Built with Rust + WASM + Yew

pub mod browser;
pub mod config;
pub mod error;
pub mod hibernate;
pub mod router;
pub mod storage;
pub mod store;
pub mod tab_record;
pub mod ui;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

use crate::config::HibernateConfig;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the background page: load settings and register listeners.
// `config` may be undefined.
#[wasm_bindgen]
pub fn start_background(config: JsValue) {
    let config = if config.is_null() || config.is_undefined() {
        HibernateConfig::default()
    } else {
        match serde_wasm_bindgen::from_value::<serde_json::Value>(config) {
            Ok(value) => HibernateConfig::from_json(value),
            Err(e) => {
                log::warn!("Unreadable config, using defaults: {:?}", e);
                HibernateConfig::default()
            }
        }
    };

    log::set_max_level(config.level_filter());
    browser::install(&config);
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
