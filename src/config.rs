use crate::sprite::SheetGrid;
use serde::{Deserialize, Serialize};

// canvas
pub const DEFAULT_WINDOW_WIDTH: f32 = 512.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 380.0;

// physics, pixels and seconds, y grows downward
pub const DEFAULT_GRAVITY: f32 = 1_000.0;
pub const DEFAULT_JUMP_VELOCITY: f32 = -600.0;
pub const DEFAULT_OBSTACLE_VELOCITY: f32 = -200.0;

// level layout
pub const DEFAULT_OBSTACLE_COUNT: usize = 20;
pub const DEFAULT_FIRST_OBSTACLE_OFFSET: f32 = 300.0;
pub const DEFAULT_OBSTACLE_GAP_MIN: u32 = 250;
pub const DEFAULT_OBSTACLE_GAP_MAX: u32 = 450;
pub const DEFAULT_FINISH_LINE_OFFSET: f32 = 200.0;
pub const DEFAULT_HITBOX_PADDING: f32 = 50.0;

// animation
pub const DEFAULT_PLAYER_FRAME_DURATION: f32 = 1.0 / 12.0;
pub const DEFAULT_OBSTACLE_FRAME_DURATION: f32 = 1.0 / 16.0;
pub const DEFAULT_PLAYER_FRAME_COUNT: u32 = 7;
pub const DEFAULT_OBSTACLE_FRAME_COUNT: u32 = 7;
pub const DEFAULT_PLAYER_SHEET: SheetGrid = SheetGrid { columns: 8, rows: 1 };
pub const DEFAULT_OBSTACLE_SHEET: SheetGrid = SheetGrid { columns: 8, rows: 8 };

// background
pub const DEFAULT_BACKGROUND_SCALE: f32 = 2.0;
/// far, mid, near
pub const DEFAULT_PARALLAX_SPEEDS: [f32; 3] = [20.0, 40.0, 80.0];

/// Every tunable number of the run. Missing fields in `config.json` fall back
/// to the `DEFAULT_*` constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window_width: f32,
    pub window_height: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub obstacle_velocity: f32,
    pub obstacle_count: usize,
    /// distance past the right edge of the canvas of the first obstacle
    pub first_obstacle_offset: f32,
    pub obstacle_gap_min: u32,
    pub obstacle_gap_max: u32,
    pub finish_line_offset: f32,
    pub hitbox_padding: f32,
    pub player_frame_duration: f32,
    pub obstacle_frame_duration: f32,
    pub player_frame_count: u32,
    pub obstacle_frame_count: u32,
    pub player_sheet: SheetGrid,
    pub obstacle_sheet: SheetGrid,
    pub background_scale: f32,
    pub parallax_speeds: [f32; 3],
    /// stop gameplay updates once the run is won or lost
    pub freeze_on_outcome: bool,
    /// fixed seed for the obstacle layout, random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            gravity: DEFAULT_GRAVITY,
            jump_velocity: DEFAULT_JUMP_VELOCITY,
            obstacle_velocity: DEFAULT_OBSTACLE_VELOCITY,
            obstacle_count: DEFAULT_OBSTACLE_COUNT,
            first_obstacle_offset: DEFAULT_FIRST_OBSTACLE_OFFSET,
            obstacle_gap_min: DEFAULT_OBSTACLE_GAP_MIN,
            obstacle_gap_max: DEFAULT_OBSTACLE_GAP_MAX,
            finish_line_offset: DEFAULT_FINISH_LINE_OFFSET,
            hitbox_padding: DEFAULT_HITBOX_PADDING,
            player_frame_duration: DEFAULT_PLAYER_FRAME_DURATION,
            obstacle_frame_duration: DEFAULT_OBSTACLE_FRAME_DURATION,
            player_frame_count: DEFAULT_PLAYER_FRAME_COUNT,
            obstacle_frame_count: DEFAULT_OBSTACLE_FRAME_COUNT,
            player_sheet: DEFAULT_PLAYER_SHEET,
            obstacle_sheet: DEFAULT_OBSTACLE_SHEET,
            background_scale: DEFAULT_BACKGROUND_SCALE,
            parallax_speeds: DEFAULT_PARALLAX_SPEEDS,
            freeze_on_outcome: true,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Inclusive gap range, tolerant of min and max given in the wrong order
    pub fn obstacle_gap_range(&self) -> (u32, u32) {
        if self.obstacle_gap_min <= self.obstacle_gap_max {
            (self.obstacle_gap_min, self.obstacle_gap_max)
        } else {
            (self.obstacle_gap_max, self.obstacle_gap_min)
        }
    }
}
