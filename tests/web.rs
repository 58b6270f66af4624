//! Browser-only checks, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use ruffi_run::engine;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn missing_texture_is_an_error() {
    let result = engine::load_image("textures/does-not-exist.png").await;
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn input_needs_the_canvas() {
    // the test page has no #canvas element
    assert!(engine::input::prepare_input().is_err());
}

#[wasm_bindgen_test]
fn sounds_are_created_lazily() {
    assert!(engine::load_sound("sound/does-not-exist.wav").is_ok());
}

#[wasm_bindgen_test]
fn rejected_playback_is_not_an_error() {
    // no user gesture and no file, the Promise rejects and is only logged
    let sound = engine::load_sound("sound/does-not-exist.wav").unwrap();
    assert_eq!(sound.source(), "sound/does-not-exist.wav");
    assert!(sound.play().is_ok());
    assert!(sound.play_looping().is_ok());
}
