// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                          sprite/ module layout                           │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ mod.rs            │ SheetGrid + AnimatedSprite, shared frame advancer    │
// │ state.rs          │ PlayerState<Grounded | Airborne> physics typestates  │
// │ ruffi.rs          │ Ruffi : state machine driven by per-frame events     │
// └───────────────────┴──────────────────────────────────────────────────────┘
// - obstacles are plain AnimatedSprites, only the player needs physics
pub mod ruffi;
pub mod state;

#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{Point, Rect, Renderer, Size};
use serde::{Deserialize, Serialize};
use web_sys::HtmlImageElement;

/// Grid layout of a sprite sheet texture, frames laid out left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetGrid {
    pub columns: u32,
    pub rows: u32,
}

impl SheetGrid {
    /// Size of a single cell, truncated to whole pixels
    pub fn frame_size(&self, texture: Size) -> Size {
        Size {
            width: (texture.width / self.columns.max(1) as f32).floor(),
            height: (texture.height / self.rows.max(1) as f32).floor(),
        }
    }
}

/// One sprite drawn from a sheet
/// - source   : cell of the sheet in texture space, x follows `frame`
/// - position : top left corner in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedSprite {
    pub source: Rect,
    pub position: Point,
    pub frame: u32,
    pub frame_duration: f32,
    pub elapsed: f32,
}

impl AnimatedSprite {
    pub fn new(frame_size: Size, position: Point, frame_duration: f32) -> Self {
        AnimatedSprite {
            source: Rect::new(Point::default(), frame_size),
            position,
            frame: 0,
            frame_duration,
            elapsed: 0.0,
        }
    }

    /// Accumulate `delta` and step to the next frame once a full frame
    /// duration has passed. Leftover time past the boundary is dropped.
    pub fn advance(mut self, delta: f32, frame_count: u32) -> Self {
        self.elapsed += delta;
        if self.elapsed >= self.frame_duration {
            self.elapsed = 0.0;
            self.frame = (self.frame + 1) % frame_count.max(1);
            self.source.position.x = self.frame as f32 * self.source.width();
        }
        self
    }

    /// Full sprite rectangle in world space
    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.position, self.source.size)
    }

    pub fn draw(&self, renderer: &Renderer, sheet: &HtmlImageElement) {
        renderer.draw_image(sheet, &self.source, &self.bounding_box());
    }

    #[cfg(debug_assertions)]
    pub fn draw_hitbox(&self, renderer: &Renderer, padding: f32) {
        self.bounding_box().inset(padding).draw_debug(renderer);
    }
}
