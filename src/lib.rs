// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

mod browser;
pub mod config;
pub mod engine;
mod game;
pub mod parallax;
pub mod sprite;
pub mod world;

#[cfg(debug_assertions)]
const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Debug;
#[cfg(not(debug_assertions))]
const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook + console logger
/// - loads assets, then hands the game to the frame loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // better panic messages in the devtools console
    console_error_panic_hook::set_once();
    browser::init_logger(LOG_LEVEL).map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = engine::GameLoop::start(game::RuffiRun::new()).await {
            log::error!("Could not start Ruffi Run : {:#?}", err);
        }
    });

    Ok(())
}
