/// Player physics as typestates. A transition is only reachable through the
/// methods below, so a jump can never start from the air :
/// - PUBLIC  : PlayerState, PlayerContext and the state markers
/// - PRIVATE : the context mutators
///
/// ┌──────────── Transition Flow ─────────────┐
/// │  Grounded  →  jump()      →  Launching   │ take-off frame, still animates
/// │  Launching →  fall(dt)    →  Airborne    │ next ground check
/// │  Airborne  →  fall(dt)    →  Airborne    │
/// │  Airborne  →  fall(dt)    →  Grounded    │ once y >= ground level
/// └──────────────────────────────────────────┘
use crate::sprite::AnimatedSprite;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Physics {
    /// pixels / s / s, positive is down
    pub gravity: f32,
    /// pixels / s, negative because top left is origin
    pub jump_velocity: f32,
    /// y of the sprite's top edge while standing
    pub ground_level: f32,
}

#[derive(Debug, Copy, Clone)]
pub struct Grounded;

/// Jump accepted this frame, the ground check hasn't seen it yet
#[derive(Debug, Copy, Clone)]
pub struct Launching;

#[derive(Debug, Copy, Clone)]
pub struct Airborne;

pub enum IsFalling {
    Landed(PlayerState<Grounded>),
    InProgress(PlayerState<Airborne>),
}

#[derive(Debug, Copy, Clone)]
/// Shared data for :
/// - physics : vertical velocity + constants
/// - display : sprite position + animation frame
pub struct PlayerContext {
    pub sprite: AnimatedSprite,
    pub velocity: f32,
    pub physics: Physics,
}

#[derive(Debug, Copy, Clone)]
pub struct PlayerState<S> {
    context: PlayerContext,
    // type-level tag only, never read
    _state: S,
}

impl<S> PlayerState<S> {
    pub fn context(&self) -> &PlayerContext {
        &self.context
    }
}

impl PlayerState<Grounded> {
    pub fn new(sprite: AnimatedSprite, physics: Physics) -> Self {
        PlayerState {
            context: PlayerContext {
                sprite,
                velocity: 0.0,
                physics,
            }
            .snap_to_ground(),
            _state: Grounded,
        }
    }

    pub fn jump(self) -> PlayerState<Launching> {
        let jump_velocity = self.context.physics.jump_velocity;
        PlayerState {
            context: self.context.set_vertical_velocity(jump_velocity),
            _state: Launching,
        }
    }

    pub fn animate(mut self, delta: f32, frame_count: u32) -> Self {
        self.context = self.context.animate(delta, frame_count);
        self
    }
}

impl PlayerState<Launching> {
    /// First ground check after the jump
    pub fn fall(self, delta: f32) -> IsFalling {
        PlayerState {
            context: self.context,
            _state: Airborne,
        }
        .fall(delta)
    }

    pub fn integrate(mut self, delta: f32) -> Self {
        self.context = self.context.move_vertically(delta);
        self
    }

    pub fn animate(mut self, delta: f32, frame_count: u32) -> Self {
        self.context = self.context.animate(delta, frame_count);
        self
    }
}

impl PlayerState<Airborne> {
    /// Ground check for this frame : land, or pick up gravity
    pub fn fall(self, delta: f32) -> IsFalling {
        if self.context.is_on_ground() {
            IsFalling::Landed(self.land())
        } else {
            IsFalling::InProgress(PlayerState {
                context: self.context.apply_gravity(delta),
                _state: Airborne,
            })
        }
    }

    pub fn integrate(mut self, delta: f32) -> Self {
        self.context = self.context.move_vertically(delta);
        self
    }

    pub fn land(self) -> PlayerState<Grounded> {
        PlayerState {
            context: self.context.snap_to_ground(),
            _state: Grounded,
        }
    }
}

impl PlayerContext {
    pub fn is_on_ground(&self) -> bool {
        self.sprite.position.y >= self.physics.ground_level
    }

    fn apply_gravity(mut self, delta: f32) -> Self {
        self.velocity += self.physics.gravity * delta;
        self
    }

    fn move_vertically(mut self, delta: f32) -> Self {
        self.sprite.position.y += self.velocity * delta;
        self
    }

    fn animate(mut self, delta: f32, frame_count: u32) -> Self {
        self.sprite = self.sprite.advance(delta, frame_count);
        self
    }

    fn snap_to_ground(mut self) -> Self {
        self.sprite.position.y = self.physics.ground_level;
        self.velocity = 0.0;
        self
    }

    fn set_vertical_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Point, Size};
    use approx::assert_relative_eq;

    const PHYSICS: Physics = Physics {
        gravity: 1_000.0,
        jump_velocity: -600.0,
        ground_level: 300.0,
    };

    fn grounded() -> PlayerState<Grounded> {
        let sprite = AnimatedSprite::new(
            Size {
                width: 32.0,
                height: 80.0,
            },
            Point { x: 60.0, y: 0.0 },
            1.0 / 12.0,
        );
        PlayerState::new(sprite, PHYSICS)
    }

    #[test]
    fn new_player_stands_on_the_ground() {
        let player = grounded();
        assert_eq!(player.context().sprite.position.y, PHYSICS.ground_level);
        assert_eq!(player.context().velocity, 0.0);
    }

    #[test]
    fn jump_sets_the_jump_velocity() {
        let player = grounded().jump();
        assert_eq!(player.context().velocity, PHYSICS.jump_velocity);
    }

    #[test]
    fn take_off_keeps_animating_until_the_ground_check() {
        let player = grounded().jump().integrate(0.1).animate(0.1, 7);
        assert_eq!(player.context().sprite.frame, 1);
        assert!(player.context().sprite.position.y < PHYSICS.ground_level);

        match player.fall(0.1) {
            IsFalling::InProgress(player) => {
                assert_relative_eq!(player.context().velocity, -500.0, epsilon = 1e-3);
            }
            IsFalling::Landed(_) => panic!("player should be in the air"),
        }
    }

    #[test]
    fn falling_below_ground_snaps_back() {
        let player = grounded().jump().integrate(0.0);
        let mut player = PlayerState {
            context: player.context,
            _state: Airborne,
        };
        player.context.sprite.position.y = PHYSICS.ground_level + 7.5;
        player.context.velocity = 420.0;

        match player.fall(0.016) {
            IsFalling::Landed(player) => {
                assert_eq!(player.context().sprite.position.y, PHYSICS.ground_level);
                assert_eq!(player.context().velocity, 0.0);
            }
            IsFalling::InProgress(_) => panic!("player should have landed"),
        }
    }

    #[test]
    fn gravity_pulls_while_above_ground() {
        let player = grounded().jump().integrate(0.01);
        let player = match player.fall(0.01) {
            IsFalling::InProgress(player) => player.integrate(0.01),
            IsFalling::Landed(_) => panic!("player should be in the air"),
        };
        match player.fall(0.01) {
            IsFalling::InProgress(player) => {
                assert_relative_eq!(player.context().velocity, -580.0, epsilon = 1e-3);
            }
            IsFalling::Landed(_) => panic!("player should still be in the air"),
        }
    }
}
