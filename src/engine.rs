use crate::browser;
use anyhow::{anyhow, Error, Result};
// web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we control the closure creation and specify the expected type
    JsCast,
    JsValue,
};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlAudioElement, HtmlImageElement};

use self::input::KeyState;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// `delta` is the seconds elapsed since the previous frame
    fn update(&mut self, keystate: &KeyState, delta: f32);
    fn draw(&self, renderer: &Renderer);
}

/// Upper bound on a single frame's delta, in seconds. A tab coming back from
/// the background reports the whole time it was hidden.
pub const MAX_DELTA: f32 = 0.25;

/// Convert two requestAnimationFrame timestamps (ms) into a delta in seconds
pub fn frame_delta(last_frame: f64, now: f64) -> f32 {
    (((now - last_frame) / 1000.0) as f32).clamp(0.0, MAX_DELTA)
}

pub struct GameLoop {
    last_frame: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut keyevent_receiver = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let mut keystate = KeyState::new();

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut keystate, &mut keyevent_receiver);

            // variable timestep : one update per presented frame
            let delta = game_loop.tick(perf);
            game.update(&keystate, delta);
            game.draw(&renderer);
            keystate.end_frame();

            if let Some(closure) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(closure) {
                    log::error!("GameLoop stopped : {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }

    fn tick(&mut self, perf: f64) -> f32 {
        let delta = frame_delta(self.last_frame, perf);
        self.last_frame = perf;
        delta
    }
}

// ==================== Geometry ====================
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub const fn new_from_x_y(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    /// Shrink by `padding` on every side
    pub fn inset(&self, padding: f32) -> Rect {
        Rect::new_from_x_y(
            self.x() + padding,
            self.y() + padding,
            self.width() - 2.0 * padding,
            self.height() - 2.0 * padding,
        )
    }

    /// Strict overlap : rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x() < other.right()
            && self.right() > other.x()
            && self.y() < other.bottom()
            && self.bottom() > other.y()
    }
}

// ==================== Rendering ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
    }

    /// Copy the `frame` region of `image` onto the `destination` region
    pub fn draw_image(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x().into(),
                frame.y().into(),
                frame.width().into(),
                frame.height().into(),
                destination.x().into(),
                destination.y().into(),
                destination.width().into(),
                destination.height().into(),
            )
        {
            log::warn!("Could not draw image frame : {:#?}", err);
        }
    }

    /// Draw the whole image at `position`, stretched by `scale`
    pub fn draw_entire_image(&self, image: &HtmlImageElement, position: &Point, scale: f32) {
        let width = image.natural_width() as f32 * scale;
        let height = image.natural_height() as f32 * scale;
        if let Err(err) = self.context.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            position.x.into(),
            position.y.into(),
            width.into(),
            height.into(),
        ) {
            log::warn!("Could not draw image : {:#?}", err);
        }
    }

    pub fn draw_text(&self, text: &str, position: &Point, font_size: u32, color: &str) {
        self.context.set_font(&format!("{}px sans-serif", font_size));
        self.context.set_text_baseline("top");
        #[allow(deprecated)]
        self.context.set_fill_style(&JsValue::from_str(color));
        if let Err(err) = self
            .context
            .fill_text(text, position.x.into(), position.y.into())
        {
            log::warn!("Could not draw text '{}' : {:#?}", text, err);
        }
    }
}

#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        #[allow(deprecated)]
        renderer
            .context
            .set_stroke_style(&JsValue::from_str("#FF0000"));
        renderer.context.stroke_rect(
            self.x().into(),
            self.y().into(),
            self.width().into(),
            self.height().into(),
        );
    }
}

/// A loaded texture together with the spot it is drawn at
pub struct Image {
    element: HtmlImageElement,
    position: Point,
}

impl Image {
    pub fn new(element: HtmlImageElement, position: Point) -> Self {
        Image { element, position }
    }

    pub fn element(&self) -> &HtmlImageElement {
        &self.element
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.element.natural_width() as f32,
            height: self.element.natural_height() as f32,
        }
    }

    pub fn draw_scaled(&self, renderer: &Renderer, scale: f32) {
        renderer.draw_entire_image(&self.element, &self.position, scale);
    }

    pub fn draw_at(&self, renderer: &Renderer, position: Point, scale: f32) {
        renderer.draw_entire_image(&self.element, &position, scale);
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    // the sender is taken on the first call, later calls are no-ops
    let success_callback = browser::closure_wrap(Box::new(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    }) as Box<dyn FnMut()>);

    let error_callback = browser::closure_wrap(Box::new(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    }) as Box<dyn FnMut(JsValue)>);

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields channel result
    // - second ? yields image load result
    rx.await??;

    Ok(image)
}

// ==================== Audio ====================
/// Fire-and-forget sound effect. Every `play` starts a fresh copy of the
/// element so overlapping playback works.
pub struct Sound {
    element: HtmlAudioElement,
    source: String,
}

impl Sound {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn play(&self) -> Result<()> {
        let voice = self
            .element
            .clone_node()
            .map_err(|err| anyhow!("Could not clone audio element : {:#?}", err))?
            .dyn_into::<HtmlAudioElement>()
            .map_err(|node| anyhow!("Error converting {:#?} to HtmlAudioElement", node))?;
        self.start(&voice)
    }

    pub fn play_looping(&self) -> Result<()> {
        self.element.set_loop(true);
        self.start(&self.element)
    }

    /// `play()` hands back a Promise that rejects when the browser refuses
    /// playback (autoplay policy, undecodable file), report that on the console
    fn start(&self, element: &HtmlAudioElement) -> Result<()> {
        let promise = element
            .play()
            .map_err(|err| anyhow!("Could not play '{}' : {:#?}", self.source, err))?;
        let source = self.source.clone();
        browser::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                log::warn!("Playback of '{}' was rejected : {:#?}", source, err);
            }
        });
        Ok(())
    }
}

/// Create a sound for `source`. Decode errors surface later as a console
/// warning, the game keeps running without that sound.
pub fn load_sound(source: &str) -> Result<Sound> {
    let element = browser::new_audio(source)?;
    element.set_preload("auto");

    let path = source.to_string();
    let error_callback = browser::closure_wrap(Box::new(move |_: JsValue| {
        log::warn!("Could not load sound '{}'", path);
    }) as Box<dyn FnMut(JsValue)>);
    element.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    error_callback.forget();

    Ok(Sound {
        element,
        source: source.to_string(),
    })
}

// ==================== Input ====================
pub mod input {
    use crate::browser;
    use anyhow::Result;
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use std::collections::HashSet;
    use wasm_bindgen::JsCast;

    pub const SPACE: &str = "Space";

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum KeyPress {
        KeyDown(String),
        KeyUp(String),
    }

    /// Keyboard state for the current frame, keyed by `KeyboardEvent.code`
    /// - held    : key is down right now
    /// - pressed : key went down since the last `end_frame`
    #[derive(Debug, Default)]
    pub struct KeyState {
        held: HashSet<String>,
        pressed: HashSet<String>,
    }

    impl KeyState {
        pub fn new() -> Self {
            KeyState::default()
        }

        /// Edge triggered, true only on the frame the key went down
        pub fn was_pressed(&self, code: &str) -> bool {
            self.pressed.contains(code)
        }

        pub fn apply(&mut self, press: KeyPress) {
            match press {
                KeyPress::KeyDown(code) => {
                    // auto-repeat keydowns arrive while the key is held
                    if self.held.insert(code.clone()) {
                        self.pressed.insert(code);
                    }
                }
                KeyPress::KeyUp(code) => {
                    self.held.remove(&code);
                }
            }
        }

        pub fn end_frame(&mut self) {
            self.pressed.clear();
        }
    }

    /// Drain every key event queued since the previous frame
    pub fn process_input(state: &mut KeyState, receiver: &mut UnboundedReceiver<KeyPress>) {
        // Err : queue empty or channel closed
        while let Ok(press) = receiver.try_recv() {
            state.apply(press);
        }
    }

    pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
        let (keydown_sender, keyevent_receiver) = unbounded();
        let keyup_sender = keydown_sender.clone();

        let onkeydown = browser::closure_wrap(Box::new(move |event: web_sys::KeyboardEvent| {
            if event.code() == SPACE {
                // keep the page from scrolling
                event.prevent_default();
            }
            let _ = keydown_sender.unbounded_send(KeyPress::KeyDown(event.code()));
        }) as Box<dyn FnMut(web_sys::KeyboardEvent)>);

        let onkeyup = browser::closure_wrap(Box::new(move |event: web_sys::KeyboardEvent| {
            let _ = keyup_sender.unbounded_send(KeyPress::KeyUp(event.code()));
        }) as Box<dyn FnMut(web_sys::KeyboardEvent)>);

        let canvas = browser::canvas()?;
        canvas.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
        canvas.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
        // listeners live as long as the page
        onkeydown.forget();
        onkeyup.forget();

        Ok(keyevent_receiver)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn keydown_is_pressed_for_one_frame_only() {
            let mut keys = KeyState::new();
            keys.apply(KeyPress::KeyDown(SPACE.to_string()));

            assert!(keys.was_pressed(SPACE));

            keys.end_frame();
            assert!(!keys.was_pressed(SPACE));
        }

        #[test]
        fn auto_repeat_does_not_press_again() {
            let mut keys = KeyState::new();
            keys.apply(KeyPress::KeyDown(SPACE.to_string()));
            keys.end_frame();
            keys.apply(KeyPress::KeyDown(SPACE.to_string()));
            assert!(!keys.was_pressed(SPACE));

            keys.apply(KeyPress::KeyUp(SPACE.to_string()));
            keys.apply(KeyPress::KeyDown(SPACE.to_string()));
            assert!(keys.was_pressed(SPACE));
        }

        #[test]
        fn process_input_drains_queued_events() {
            let (sender, mut receiver) = unbounded();
            sender
                .unbounded_send(KeyPress::KeyDown("ArrowUp".to_string()))
                .unwrap();
            sender
                .unbounded_send(KeyPress::KeyDown(SPACE.to_string()))
                .unwrap();
            sender
                .unbounded_send(KeyPress::KeyUp("ArrowUp".to_string()))
                .unwrap();

            let mut keys = KeyState::new();
            process_input(&mut keys, &mut receiver);

            assert!(keys.was_pressed("ArrowUp"));
            assert!(keys.was_pressed(SPACE));

            // ArrowUp was released, Space is still held
            keys.end_frame();
            sender
                .unbounded_send(KeyPress::KeyDown("ArrowUp".to_string()))
                .unwrap();
            sender
                .unbounded_send(KeyPress::KeyDown(SPACE.to_string()))
                .unwrap();
            process_input(&mut keys, &mut receiver);
            assert!(keys.was_pressed("ArrowUp"));
            assert!(!keys.was_pressed(SPACE));
        }

        #[test]
        fn closed_channel_stops_draining() {
            let (sender, mut receiver) = unbounded();
            sender
                .unbounded_send(KeyPress::KeyDown(SPACE.to_string()))
                .unwrap();
            drop(sender);

            let mut keys = KeyState::new();
            process_input(&mut keys, &mut receiver);
            process_input(&mut keys, &mut receiver);
            assert!(keys.was_pressed(SPACE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_delta_converts_milliseconds_to_seconds() {
        assert_relative_eq!(frame_delta(1000.0, 1016.0), 0.016);
    }

    #[test]
    fn frame_delta_is_clamped() {
        assert_eq!(frame_delta(0.0, 10_000.0), MAX_DELTA);
        assert_eq!(frame_delta(500.0, 400.0), 0.0);
    }

    #[test]
    fn rects_sharing_an_edge_do_not_intersect() {
        let left = Rect::new_from_x_y(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new_from_x_y(10.0, 0.0, 10.0, 10.0);
        assert!(!left.intersects(&right));

        let overlapping = Rect::new_from_x_y(9.5, 9.5, 10.0, 10.0);
        assert!(left.intersects(&overlapping));
        assert!(overlapping.intersects(&left));
    }

    #[test]
    fn inset_shrinks_every_side() {
        let rect = Rect::new_from_x_y(100.0, 200.0, 160.0, 120.0).inset(50.0);
        assert_eq!(rect, Rect::new_from_x_y(150.0, 250.0, 60.0, 20.0));
    }
}
