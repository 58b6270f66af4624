use crate::config::GameConfig;
use crate::engine::{Point, Rect, Size};
use crate::parallax::ParallaxLayer;
use crate::sprite::ruffi::Ruffi;
use crate::sprite::state::Physics;
use crate::sprite::AnimatedSprite;
use rand::Rng;

/// ┌──────────────────────── Frame Update Order ─────────────────────────────┐
/// │  1. scroll parallax layers          (always, even after the run ends)   │
/// │  2. ground check / gravity          ─┐                                  │
/// │  3. jump input                       │                                  │
/// │  4. obstacles + finish line move     │ skipped once the run is over     │
/// │  5. player moves, animates          │ and `freeze_on_outcome` is set   │
/// │  6. obstacles animate                │                                  │
/// │  7. collision test                   │                                  │
/// │  8. outcome                         ─┘                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Lost,
    Won,
}

impl Outcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::Playing)
    }
}

/// A collision beats reaching the finish line on the same frame
pub fn resolve_outcome(collision: bool, player_x: f32, finish_line: f32) -> Outcome {
    if collision {
        Outcome::Lost
    } else if player_x >= finish_line {
        Outcome::Won
    } else {
        Outcome::Playing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    Jumped,
    Collided,
    OutcomeChanged(Outcome),
}

/// Sizes measured from the loaded textures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldLayout {
    pub player_frame: Size,
    pub obstacle_frame: Size,
    /// far, mid, near
    pub layer_tile_widths: [f32; 3],
}

pub struct World {
    ruffi: Ruffi,
    obstacles: Vec<AnimatedSprite>,
    finish_line: f32,
    layers: [ParallaxLayer; 3],
    collision: bool,
    outcome: Outcome,
    obstacle_velocity: f32,
    obstacle_frame_count: u32,
    hitbox_padding: f32,
    freeze_on_outcome: bool,
}

impl World {
    pub fn new(config: &GameConfig, layout: WorldLayout, rng: &mut impl Rng) -> Self {
        let player_frame = layout.player_frame;
        let physics = Physics {
            gravity: config.gravity,
            jump_velocity: config.jump_velocity,
            ground_level: config.window_height - player_frame.height,
        };
        let player_position = Point {
            x: (config.window_width - player_frame.width) / 4.0,
            y: physics.ground_level,
        };
        let ruffi = Ruffi::new(
            AnimatedSprite::new(player_frame, player_position, config.player_frame_duration),
            physics,
            config.player_frame_count,
        );

        let obstacles = lay_out_obstacles(config, layout.obstacle_frame, rng);
        let finish_line = obstacles
            .last()
            .map_or(config.window_width, |last| last.position.x)
            + config.finish_line_offset;

        let [far, mid, near] = config.parallax_speeds;
        let [far_width, mid_width, near_width] = layout.layer_tile_widths;

        World {
            ruffi,
            obstacles,
            finish_line,
            layers: [
                ParallaxLayer::new(far, far_width),
                ParallaxLayer::new(mid, mid_width),
                ParallaxLayer::new(near, near_width),
            ],
            collision: false,
            outcome: Outcome::Playing,
            obstacle_velocity: config.obstacle_velocity,
            obstacle_frame_count: config.obstacle_frame_count,
            hitbox_padding: config.hitbox_padding,
            freeze_on_outcome: config.freeze_on_outcome,
        }
    }

    /// Advance the run by `delta` seconds
    pub fn step(&mut self, delta: f32, jump_pressed: bool) -> Vec<WorldEvent> {
        let mut events = Vec::new();

        for layer in self.layers.iter_mut() {
            layer.scroll(delta);
        }

        if self.freeze_on_outcome && self.outcome.is_over() {
            return events;
        }

        self.ruffi.ground_check(delta);
        if jump_pressed && self.ruffi.jump() {
            events.push(WorldEvent::Jumped);
        }

        // rigid formation, the finish line included
        let shift = self.obstacle_velocity * delta;
        for obstacle in self.obstacles.iter_mut() {
            obstacle.position.x += shift;
        }
        self.finish_line += shift;

        self.ruffi.update(delta);

        let frame_count = self.obstacle_frame_count;
        for obstacle in self.obstacles.iter_mut() {
            *obstacle = obstacle.advance(delta, frame_count);
        }

        if !self.collision && self.detect_collision() {
            self.collision = true;
            events.push(WorldEvent::Collided);
        }

        let outcome = resolve_outcome(self.collision, self.ruffi.position().x, self.finish_line);
        if outcome != self.outcome {
            self.outcome = outcome;
            events.push(WorldEvent::OutcomeChanged(outcome));
        }

        events
    }

    fn detect_collision(&self) -> bool {
        let player = self.ruffi.bounding_box();
        self.obstacles
            .iter()
            .any(|obstacle| self.obstacle_hitbox(obstacle).intersects(&player))
    }

    /// Obstacle sprite rectangle shrunk by the hit-box padding
    pub fn obstacle_hitbox(&self, obstacle: &AnimatedSprite) -> Rect {
        obstacle.bounding_box().inset(self.hitbox_padding)
    }

    pub fn ruffi(&self) -> &Ruffi {
        &self.ruffi
    }

    pub fn obstacles(&self) -> &[AnimatedSprite] {
        &self.obstacles
    }

    pub fn finish_line(&self) -> f32 {
        self.finish_line
    }

    pub fn layers(&self) -> &[ParallaxLayer; 3] {
        &self.layers
    }

    pub fn collision(&self) -> bool {
        self.collision
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn hitbox_padding(&self) -> f32 {
        self.hitbox_padding
    }
}

/// Obstacles resting on the floor, the first one `first_obstacle_offset`
/// past the right edge and each next one a random gap further right
fn lay_out_obstacles(
    config: &GameConfig,
    frame: Size,
    rng: &mut impl Rng,
) -> Vec<AnimatedSprite> {
    let (gap_min, gap_max) = config.obstacle_gap_range();
    let y = config.window_height - frame.height;
    let mut x = config.window_width + config.first_obstacle_offset;

    let mut obstacles = Vec::with_capacity(config.obstacle_count);
    for index in 0..config.obstacle_count {
        if index > 0 {
            x += rng.gen_range(gap_min..=gap_max) as f32;
        }
        obstacles.push(AnimatedSprite::new(
            frame,
            Point { x, y },
            config.obstacle_frame_duration,
        ));
    }
    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PLAYER_FRAME: Size = Size {
        width: 258.0,
        height: 80.0,
    };
    const OBSTACLE_FRAME: Size = Size {
        width: 160.0,
        height: 160.0,
    };

    fn layout() -> WorldLayout {
        WorldLayout {
            player_frame: PLAYER_FRAME,
            obstacle_frame: OBSTACLE_FRAME,
            layer_tile_widths: [544.0, 544.0, 704.0],
        }
    }

    fn world(config: &GameConfig) -> World {
        World::new(config, layout(), &mut StdRng::seed_from_u64(42))
    }

    /// Step at 60 fps until `done` holds, returning the frames taken
    fn run_until(world: &mut World, done: impl Fn(&World) -> bool) -> u32 {
        let mut frames = 0;
        while !done(&*world) {
            world.step(1.0 / 60.0, false);
            frames += 1;
            assert!(frames < 60 * 600, "condition never reached");
        }
        frames
    }

    #[test]
    fn obstacles_start_in_increasing_order() {
        let config = GameConfig::default();
        let world = world(&config);
        let obstacles = world.obstacles();

        assert_eq!(obstacles.len(), 20);
        assert_eq!(obstacles[0].position.x, 812.0);
        for pair in obstacles.windows(2) {
            let gap = pair[1].position.x - pair[0].position.x;
            assert!((250.0..=450.0).contains(&gap), "gap {} out of range", gap);
        }
        for obstacle in obstacles {
            assert_eq!(obstacle.position.y, 380.0 - OBSTACLE_FRAME.height);
        }
        assert_eq!(
            world.finish_line(),
            obstacles[19].position.x + config.finish_line_offset
        );
    }

    #[test]
    fn same_seed_same_layout() {
        let config = GameConfig::default();
        let first = world(&config);
        let second = world(&config);
        assert_eq!(first.obstacles(), second.obstacles());
    }

    #[test]
    fn player_starts_grounded_left_of_center() {
        let world = world(&GameConfig::default());
        let position = world.ruffi().position();
        assert_eq!(position.x, (512.0 - PLAYER_FRAME.width) / 4.0);
        assert_eq!(position.y, 380.0 - PLAYER_FRAME.height);
        assert!(!world.ruffi().is_airborne());
    }

    #[test]
    fn obstacles_and_finish_line_move_together() {
        let config = GameConfig::default();
        let mut world = world(&config);
        let before: Vec<f32> = world.obstacles().iter().map(|o| o.position.x).collect();
        let finish = world.finish_line();

        world.step(0.5, false);

        for (obstacle, x) in world.obstacles().iter().zip(before) {
            assert_eq!(obstacle.position.x, x - 100.0);
        }
        assert_eq!(world.finish_line(), finish - 100.0);
    }

    #[test]
    fn collision_happens_exactly_when_hitbox_reaches_player() {
        let config = GameConfig {
            obstacle_count: 1,
            ..GameConfig::default()
        };
        let mut world = world(&config);
        let player = world.ruffi().bounding_box();
        assert_eq!(world.obstacles()[0].position.x, 812.0);

        let mut frames = 0;
        loop {
            let events = world.step(1.0 / 60.0, false);
            frames += 1;
            let hitbox = world.obstacle_hitbox(&world.obstacles()[0]);
            let overlapping = hitbox.x() < player.right();

            assert_eq!(world.collision(), overlapping, "frame {}", frames);
            if overlapping {
                assert!(events.contains(&WorldEvent::Collided));
                assert!(events.contains(&WorldEvent::OutcomeChanged(Outcome::Lost)));
                break;
            }
            assert!(frames < 600, "obstacle never arrived");
        }
        assert_eq!(world.outcome(), Outcome::Lost);
    }

    #[test]
    fn collision_stays_set_after_the_obstacle_passes() {
        let config = GameConfig {
            obstacle_count: 1,
            freeze_on_outcome: false,
            ..GameConfig::default()
        };
        let mut world = world(&config);
        run_until(&mut world, |world| world.collision());

        // keep simulating until the obstacle is fully behind the player
        let player_x = world.ruffi().position().x;
        run_until(&mut world, |world| {
            world.obstacle_hitbox(&world.obstacles()[0]).right() < player_x
        });
        for _ in 0..60 {
            world.step(1.0 / 60.0, false);
        }

        assert!(world.collision());
        assert_eq!(world.outcome(), Outcome::Lost);
    }

    #[test]
    fn jumping_clears_an_obstacle_and_wins() {
        let config = GameConfig {
            obstacle_count: 1,
            ..GameConfig::default()
        };
        // a narrow cat, the wide one can't clear a hit-box in one jump
        let layout = WorldLayout {
            player_frame: Size {
                width: 32.0,
                height: 80.0,
            },
            ..layout()
        };
        let mut world = World::new(&config, layout, &mut StdRng::seed_from_u64(42));
        let player_right = world.ruffi().bounding_box().right();

        // take off when the hit-box is 75px away
        run_until(&mut world, |world| {
            world.obstacle_hitbox(&world.obstacles()[0]).x() - player_right < 75.0
        });
        let events = world.step(1.0 / 60.0, true);
        assert!(events.contains(&WorldEvent::Jumped));

        run_until(&mut world, |world| world.outcome().is_over());
        assert!(!world.collision());
        assert_eq!(world.outcome(), Outcome::Won);
    }

    #[test]
    fn collision_overrides_a_reached_finish_line() {
        assert_eq!(resolve_outcome(true, 100.0, 50.0), Outcome::Lost);
        assert_eq!(resolve_outcome(false, 100.0, 50.0), Outcome::Won);
        assert_eq!(resolve_outcome(false, 50.0, 50.0), Outcome::Won);
        assert_eq!(resolve_outcome(false, 49.0, 50.0), Outcome::Playing);

        // finish line already behind the player, then an obstacle arrives
        let config = GameConfig {
            obstacle_count: 1,
            finish_line_offset: -2_000.0,
            freeze_on_outcome: false,
            ..GameConfig::default()
        };
        let mut world = world(&config);
        world.step(1.0 / 60.0, false);
        assert_eq!(world.outcome(), Outcome::Won);

        run_until(&mut world, |world| world.collision());
        assert_eq!(world.outcome(), Outcome::Lost);
    }

    #[test]
    fn finished_run_freezes_gameplay() {
        let config = GameConfig {
            obstacle_count: 1,
            ..GameConfig::default()
        };
        let mut world = world(&config);
        run_until(&mut world, |world| world.collision());

        let obstacle = world.obstacles()[0];
        let layer_offset = world.layers()[0].offset;
        let events = world.step(1.0 / 60.0, true);

        assert!(events.is_empty());
        assert_eq!(world.obstacles()[0], obstacle);
        assert!(!world.ruffi().is_airborne());
        assert_eq!(world.ruffi().velocity(), 0.0);
        // the background keeps scrolling behind the message
        assert!(world.layers()[0].offset < layer_offset);
    }
}
