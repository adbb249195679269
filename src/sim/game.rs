//! Shared game state machine surface
//!
//! Both games are a `Running`/`GameOver` machine advanced one tick at a time.
//! A tick reports what happened as `GameEvent`s; the session turns those into
//! sound cues and log lines so the games themselves stay free of side effects.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::input::SensorAxis;
use super::rng::RandomSource;
use crate::audio::SoundEffect;
use crate::platform::RectStyle;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    /// Frozen until a restart
    GameOver,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Ball bounced off the top, bottom or right wall
    WallBounce,
    /// Ball returned by the paddle
    PaddleHit { score: u32 },
    /// Ball got past the paddle
    BallLost { score: u32 },
    BirdSpawned { slot: usize },
    /// Bird left the bottom edge without hitting the plane
    BirdPassed { slot: usize, score: u32 },
    /// Plane hit the bird in `slot`
    Crashed { slot: usize, score: u32 },
    SpeedUp { scroll_speed: f32 },
}

impl GameEvent {
    pub fn sound(&self) -> Option<SoundEffect> {
        match self {
            GameEvent::WallBounce | GameEvent::PaddleHit { .. } => Some(SoundEffect::Hit),
            GameEvent::BallLost { .. } | GameEvent::Crashed { .. } => Some(SoundEffect::Miss),
            _ => None,
        }
    }

    pub fn ends_game(&self) -> bool {
        matches!(self, GameEvent::BallLost { .. } | GameEvent::Crashed { .. })
    }
}

/// Where the player wants to be, in [0, 1]
pub trait ControlSource {
    fn control(&mut self) -> f32;
}

/// A fixed target (tests, replays)
impl ControlSource for f32 {
    fn control(&mut self) -> f32 {
        self.clamp(0.0, 1.0)
    }
}

/// Widget to create for one actor slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSpec {
    pub style: RectStyle,
    pub initially_visible: bool,
}

/// Screen placement of one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorView {
    pub pos: IVec2,
    pub visible: bool,
}

/// What presentation needs from one tick. Reused between ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub score: u32,
    pub game_over: bool,
    /// One entry per `ActorSpec`, same order
    pub actors: Vec<ActorView>,
}

pub trait Game: Send + 'static {
    const NAME: &'static str;
    /// Accelerometer axis that steers the player
    const AXIS: SensorAxis;

    fn create(settings: &Settings, rng: &mut dyn RandomSource) -> Self
    where
        Self: Sized;

    /// Advance one fixed step. Does nothing while game over.
    fn tick(
        &mut self,
        control: &mut dyn ControlSource,
        rng: &mut dyn RandomSource,
        events: &mut Vec<GameEvent>,
    );

    /// Start a new round
    fn restart(&mut self, rng: &mut dyn RandomSource);

    fn phase(&self) -> GamePhase;

    fn score(&self) -> u32;

    fn is_game_over(&self) -> bool {
        self.phase() == GamePhase::GameOver
    }

    /// Widgets to create, in the order `snapshot_into` reports them
    fn actor_specs(&self) -> Vec<ActorSpec>;

    fn snapshot_into(&self, snapshot: &mut Snapshot);
}
