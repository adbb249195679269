//! Bird Dodger
//!
//! The plane sits near the bottom of the screen and is steered left/right by
//! rolling the wrist. Birds fall from the top; every bird that leaves the
//! bottom edge scores a point, touching one ends the round. Every 10 points
//! the birds fall a little faster.

use glam::{IVec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::game::{ActorSpec, ActorView, ControlSource, Game, GameEvent, GamePhase, Snapshot};
use super::input::SensorAxis;
use super::rng::RandomSource;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::platform::{Color, RectStyle};
use crate::settings::Settings;
use crate::{approach, to_pixels};

/// Bird pool size
pub const MAX_BIRDS: usize = 5;

/// Dodger balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgerTuning {
    pub plane_size: f32,
    /// Fixed y of the plane's top edge
    pub plane_y: f32,
    pub bird_size: f32,
    /// Bird fall speed at the start of a round (pixels per tick)
    pub initial_speed: f32,
    pub speed_increment: f32,
    pub max_speed: f32,
    /// Fraction of the distance to the tilt target covered per tick
    pub plane_blend: f32,
    /// Ticks between spawn attempts
    pub spawn_interval: u32,
    /// Points between speed-ups
    pub ramp_every: u32,
}

impl Default for DodgerTuning {
    fn default() -> Self {
        Self {
            plane_size: 8.0,
            plane_y: 100.0,
            bird_size: 6.0,
            initial_speed: 1.0,
            speed_increment: 0.1,
            max_speed: 3.0,
            plane_blend: 0.03,
            spawn_interval: 60,
            ramp_every: 10,
        }
    }
}

/// One pool slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bird {
    /// Top-left corner (pixels)
    pub pos: Vec2,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Dodger {
    pub tuning: DodgerTuning,
    /// Plane position along the bottom track (0 = left, 1 = right)
    pub plane_x: f32,
    pub birds: [Bird; MAX_BIRDS],
    pub score: u32,
    /// Score at which the last speed-up happened
    pub last_difficulty_score: u32,
    pub phase: GamePhase,
    pub scroll_speed: f32,
    pub frame_counter: u32,
}

impl Dodger {
    pub fn new(tuning: DodgerTuning) -> Self {
        let parked = Bird {
            pos: Vec2::new(0.0, -tuning.bird_size),
            active: false,
        };
        Self {
            plane_x: 0.5,
            birds: [parked; MAX_BIRDS],
            score: 0,
            last_difficulty_score: 0,
            phase: GamePhase::Running,
            scroll_speed: tuning.initial_speed,
            frame_counter: 0,
            tuning,
        }
    }

    pub fn plane_pixel_x(&self) -> f32 {
        to_pixels(self.plane_x, SCREEN_WIDTH, self.tuning.plane_size)
    }

    pub fn plane_rect(&self) -> Rect {
        Rect::square(
            Vec2::new(self.plane_pixel_x(), self.tuning.plane_y),
            self.tuning.plane_size,
        )
    }

    pub fn bird_rect(&self, bird: &Bird) -> Rect {
        Rect::square(bird.pos, self.tuning.bird_size)
    }

    pub fn active_birds(&self) -> usize {
        self.birds.iter().filter(|b| b.active).count()
    }

    /// Spawn at a random column. `None` when every slot is taken.
    pub fn spawn_bird(&mut self, rng: &mut dyn RandomSource) -> Option<usize> {
        let columns = (SCREEN_WIDTH - self.tuning.bird_size).max(1.0) as u32;
        let x = rng.next_below(columns) as f32;
        self.spawn_bird_at(x)
    }

    /// Put a bird just above the top edge at column `x`, in the first free slot
    pub fn spawn_bird_at(&mut self, x: f32) -> Option<usize> {
        let slot = self.birds.iter().position(|b| !b.active)?;
        self.birds[slot] = Bird {
            pos: Vec2::new(x, -self.tuning.bird_size),
            active: true,
        };
        Some(slot)
    }

    fn move_birds(&mut self, events: &mut Vec<GameEvent>) {
        for (slot, bird) in self.birds.iter_mut().enumerate() {
            if !bird.active {
                continue;
            }
            bird.pos.y += self.scroll_speed;
            if bird.pos.y > SCREEN_HEIGHT {
                bird.active = false;
                self.score += 1;
                events.push(GameEvent::BirdPassed {
                    slot,
                    score: self.score,
                });
            }
        }
    }

    /// First bird (by slot) touching the plane ends the round
    fn check_collisions(&mut self, events: &mut Vec<GameEvent>) -> Option<usize> {
        let plane = self.plane_rect();
        let hit = self
            .birds
            .iter()
            .position(|b| b.active && plane.overlaps(&self.bird_rect(b)))?;

        self.phase = GamePhase::GameOver;
        events.push(GameEvent::Crashed {
            slot: hit,
            score: self.score,
        });
        Some(hit)
    }

    fn steer(&mut self, control: &mut dyn ControlSource) {
        let target = control.control();
        self.plane_x = approach(self.plane_x, target, self.tuning.plane_blend);
    }

    fn ramp_difficulty(&mut self, events: &mut Vec<GameEvent>) {
        let every = self.tuning.ramp_every;
        if every == 0 || self.score == 0 || self.score % every != 0 {
            return;
        }
        if self.score == self.last_difficulty_score || self.scroll_speed >= self.tuning.max_speed {
            return;
        }
        self.scroll_speed = (self.scroll_speed + self.tuning.speed_increment).min(self.tuning.max_speed);
        self.last_difficulty_score = self.score;
        events.push(GameEvent::SpeedUp {
            scroll_speed: self.scroll_speed,
        });
    }
}

impl Game for Dodger {
    const NAME: &'static str = "BirdDodger";
    const AXIS: SensorAxis = SensorAxis::Lateral;

    fn create(settings: &Settings, _rng: &mut dyn RandomSource) -> Self {
        Self::new(settings.dodger.clone())
    }

    fn tick(
        &mut self,
        control: &mut dyn ControlSource,
        rng: &mut dyn RandomSource,
        events: &mut Vec<GameEvent>,
    ) {
        if self.phase == GamePhase::GameOver {
            return;
        }

        self.frame_counter = self.frame_counter.wrapping_add(1);
        let interval = self.tuning.spawn_interval;
        if interval > 0 && self.frame_counter % interval == 0 {
            match self.spawn_bird(rng) {
                Some(slot) => events.push(GameEvent::BirdSpawned { slot }),
                None => log::trace!("bird pool full, spawn skipped"),
            }
        }

        self.move_birds(events);
        self.check_collisions(events);
        self.steer(control);
        self.ramp_difficulty(events);
    }

    fn restart(&mut self, _rng: &mut dyn RandomSource) {
        self.score = 0;
        self.last_difficulty_score = 0;
        self.phase = GamePhase::Running;
        self.scroll_speed = self.tuning.initial_speed;
        self.frame_counter = 0;
        for bird in &mut self.birds {
            bird.active = false;
        }
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn actor_specs(&self) -> Vec<ActorSpec> {
        let plane = self.tuning.plane_size as u32;
        let bird = self.tuning.bird_size as u32;
        let mut specs = Vec::with_capacity(1 + MAX_BIRDS);
        specs.push(ActorSpec {
            style: RectStyle::filled(UVec2::splat(plane), Color::GREEN).with_radius(2),
            initially_visible: true,
        });
        specs.extend((0..MAX_BIRDS).map(|_| ActorSpec {
            style: RectStyle::filled(UVec2::splat(bird), Color::RED).with_radius((bird / 2) as u16),
            initially_visible: false,
        }));
        specs
    }

    fn snapshot_into(&self, snapshot: &mut Snapshot) {
        snapshot.score = self.score;
        snapshot.game_over = self.phase == GamePhase::GameOver;
        snapshot.actors.clear();
        snapshot.actors.push(ActorView {
            pos: IVec2::new(self.plane_pixel_x() as i32, self.tuning.plane_y as i32),
            visible: true,
        });
        snapshot.actors.extend(self.birds.iter().map(|b| ActorView {
            pos: IVec2::new(b.pos.x as i32, b.pos.y as i32),
            visible: b.active,
        }));
    }
}
