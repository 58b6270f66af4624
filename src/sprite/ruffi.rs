use crate::engine::{Point, Rect};
use crate::sprite::state::{Airborne, Grounded, IsFalling, Launching, Physics, PlayerState};
use crate::sprite::AnimatedSprite;

/// ┌──────────────── State Transition Flow ──────────────────┐
/// │  From State  →  Event        →  To State                │
/// ├─────────────────────────────────────────────────────────┤
/// │  Grounded    →  Jump         →  Launching               │
/// │  Launching   →  GroundCheck  →  Airborne                │
/// │  Airborne    →  GroundCheck  →  Grounded (when landed)  │
/// │  -------        ------                                  │
/// │  Grounded    →  Animate      →  Grounded (next frame)   │
/// │  Launching   →  Animate      →  Launching (next frame)  │
/// │  Launching   →  Move         →  Launching (integrated)  │
/// │  Airborne    →  Move         →  Airborne (integrated)   │
/// └─────────────────────────────────────────────────────────┘
#[derive(Debug, Copy, Clone)]
pub enum Event {
    GroundCheck(f32),
    Jump,
    Move(f32),
    Animate(f32),
}

#[derive(Debug, Copy, Clone)]
enum RuffiStateMachine {
    Grounded(PlayerState<Grounded>),
    Launching(PlayerState<Launching>),
    Airborne(PlayerState<Airborne>),
}

impl From<PlayerState<Grounded>> for RuffiStateMachine {
    fn from(state: PlayerState<Grounded>) -> Self {
        RuffiStateMachine::Grounded(state)
    }
}

impl From<PlayerState<Launching>> for RuffiStateMachine {
    fn from(state: PlayerState<Launching>) -> Self {
        RuffiStateMachine::Launching(state)
    }
}

impl From<PlayerState<Airborne>> for RuffiStateMachine {
    fn from(state: PlayerState<Airborne>) -> Self {
        RuffiStateMachine::Airborne(state)
    }
}

impl From<IsFalling> for RuffiStateMachine {
    fn from(is_falling: IsFalling) -> Self {
        match is_falling {
            IsFalling::Landed(grounded_state) => grounded_state.into(),
            IsFalling::InProgress(airborne_state) => airborne_state.into(),
        }
    }
}

impl RuffiStateMachine {
    // consumes the old state, it can't be touched after a transition
    fn transition(self, event: Event, frame_count: u32) -> Self {
        use RuffiStateMachine::*;
        match (self, event) {
            (Grounded(state), Event::Jump) => state.jump().into(),
            (Launching(state), Event::GroundCheck(delta)) => state.fall(delta).into(),
            (Airborne(state), Event::GroundCheck(delta)) => state.fall(delta).into(),
            (Launching(state), Event::Move(delta)) => state.integrate(delta).into(),
            (Airborne(state), Event::Move(delta)) => state.integrate(delta).into(),
            (Grounded(state), Event::Animate(delta)) => state.animate(delta, frame_count).into(),
            (Launching(state), Event::Animate(delta)) => state.animate(delta, frame_count).into(),
            // jumping mid-air is ignored, a grounded player has nothing to
            // integrate, and the run cycle pauses in the air
            _ => self,
        }
    }

    fn sprite(&self) -> &AnimatedSprite {
        use RuffiStateMachine::*;
        match self {
            Grounded(state) => &state.context().sprite,
            Launching(state) => &state.context().sprite,
            Airborne(state) => &state.context().sprite,
        }
    }

    fn velocity(&self) -> f32 {
        use RuffiStateMachine::*;
        match self {
            Grounded(state) => state.context().velocity,
            Launching(state) => state.context().velocity,
            Airborne(state) => state.context().velocity,
        }
    }
}

/// The player cat
/// - ground_check() -> land or apply gravity
/// - jump()         -> accepted only while grounded
/// - update()       -> move, then animate until the next ground check sees the jump
#[derive(Debug, Clone)]
pub struct Ruffi {
    state: RuffiStateMachine,
    frame_count: u32,
}

impl Ruffi {
    pub fn new(sprite: AnimatedSprite, physics: Physics, frame_count: u32) -> Self {
        Ruffi {
            state: PlayerState::new(sprite, physics).into(),
            frame_count,
        }
    }

    pub fn ground_check(&mut self, delta: f32) {
        self.transition(Event::GroundCheck(delta));
    }

    /// Returns whether the jump was taken
    pub fn jump(&mut self) -> bool {
        if !matches!(self.state, RuffiStateMachine::Grounded(_)) {
            return false;
        }
        self.transition(Event::Jump);
        true
    }

    pub fn update(&mut self, delta: f32) {
        self.transition(Event::Move(delta));
        self.transition(Event::Animate(delta));
    }

    fn transition(&mut self, event: Event) {
        self.state = self.state.transition(event, self.frame_count);
    }

    /// Still false on the take-off frame, the jump shows up on the next
    /// ground check
    pub fn is_airborne(&self) -> bool {
        matches!(self.state, RuffiStateMachine::Airborne(_))
    }

    pub fn sprite(&self) -> &AnimatedSprite {
        self.state.sprite()
    }

    pub fn position(&self) -> Point {
        self.sprite().position
    }

    pub fn velocity(&self) -> f32 {
        self.state.velocity()
    }

    pub fn bounding_box(&self) -> Rect {
        self.sprite().bounding_box()
    }
}
