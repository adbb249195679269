//! Game simulation
//!
//! Everything here is plain state advanced by explicit ticks:
//! - No threads, clocks or device access
//! - Randomness only through `RandomSource`
//! - Player input only through `ControlSource`

pub mod collision;
pub mod dodger;
pub mod game;
pub mod input;
pub mod pong;
pub mod rng;

pub use collision::Rect;
pub use dodger::{Bird, Dodger, DodgerTuning, MAX_BIRDS};
pub use game::{ActorSpec, ActorView, ControlSource, Game, GameEvent, GamePhase, Snapshot};
pub use input::{AxisMapping, Ema, SensorAxis, SensorInputAdapter, SmoothingFilter};
pub use pong::{Ball, Pong, PongTuning};
pub use rng::{RandomSource, ScriptedRandom, SeededRandom};
