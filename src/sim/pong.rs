//! Single-player Pong
//!
//! The paddle rides the left edge and follows the wrist's pitch. The ball
//! bounces off the top, bottom and right walls; each paddle return scores a
//! point and adds spin depending on where the ball met the paddle. Missing the
//! ball ends the round.

use glam::{IVec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::game::{ActorSpec, ActorView, ControlSource, Game, GameEvent, GamePhase, Snapshot};
use super::input::SensorAxis;
use super::rng::RandomSource;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::platform::{Color, RectStyle};
use crate::settings::Settings;
use crate::{approach, to_pixels};

/// Pong balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongTuning {
    pub ball_size: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Ball speed on serve (pixels per tick)
    pub ball_speed: f32,
    /// Fraction of the distance to the tilt target covered per tick
    pub paddle_blend: f32,
    /// Vertical speed added per unit of off-centre paddle contact
    pub spin: f32,
    /// Serve direction is drawn from ±this many degrees around horizontal
    pub max_serve_angle_deg: u32,
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            ball_size: 4.0,
            paddle_width: 4.0,
            paddle_height: 24.0,
            ball_speed: 1.5,
            paddle_blend: 0.02,
            spin: 0.5,
            max_serve_angle_deg: 45,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ball {
    /// Top-left corner (pixels)
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
}

#[derive(Debug, Clone)]
pub struct Pong {
    pub tuning: PongTuning,
    pub ball: Ball,
    /// Paddle position along the left edge (0 = top, 1 = bottom)
    pub paddle_y: f32,
    pub score: u32,
    pub phase: GamePhase,
}

impl Pong {
    pub fn new(tuning: PongTuning, rng: &mut dyn RandomSource) -> Self {
        let mut pong = Self {
            tuning,
            ball: Ball::default(),
            paddle_y: 0.5,
            score: 0,
            phase: GamePhase::Running,
        };
        pong.reset_ball(rng);
        pong
    }

    /// Centre the ball and serve it rightward at a random angle
    pub fn reset_ball(&mut self, rng: &mut dyn RandomSource) {
        let max = self.tuning.max_serve_angle_deg.min(89);
        let degrees = rng.next_below(2 * max + 1) as f32 - max as f32;
        self.ball = Ball {
            pos: Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0),
            vel: Vec2::from_angle(degrees.to_radians()) * self.tuning.ball_speed,
        };
    }

    pub fn paddle_top(&self) -> f32 {
        to_pixels(self.paddle_y, SCREEN_HEIGHT, self.tuning.paddle_height)
    }

    /// Wall and paddle checks, in order: top/bottom, left (paddle), right.
    /// Each check sees the result of the previous one.
    fn check_collisions(&mut self, events: &mut Vec<GameEvent>) {
        let t = &self.tuning;
        let floor = SCREEN_HEIGHT - t.ball_size;
        let right = SCREEN_WIDTH - t.ball_size;
        let ball = &mut self.ball;

        // Top/bottom walls
        if (ball.pos.y <= 0.0 && ball.vel.y < 0.0) || (ball.pos.y >= floor && ball.vel.y > 0.0) {
            ball.vel.y = -ball.vel.y;
            ball.pos.y = ball.pos.y.clamp(0.0, floor);
            events.push(GameEvent::WallBounce);
        }

        // Left edge - paddle side
        if ball.pos.x <= t.paddle_width && ball.vel.x < 0.0 {
            let paddle_top = to_pixels(self.paddle_y, SCREEN_HEIGHT, t.paddle_height);
            let paddle_bottom = paddle_top + t.paddle_height;

            if (paddle_top..=paddle_bottom).contains(&ball.pos.y) {
                ball.vel.x = -ball.vel.x;
                ball.pos.x = t.paddle_width;

                let hit = (ball.pos.y - paddle_top) / t.paddle_height;
                ball.vel.y += (hit - 0.5) * t.spin;

                self.score += 1;
                events.push(GameEvent::PaddleHit { score: self.score });
            } else if ball.pos.x <= 0.0 {
                self.phase = GamePhase::GameOver;
                events.push(GameEvent::BallLost { score: self.score });
            }
        }

        // Right wall
        if ball.pos.x >= right && ball.vel.x > 0.0 {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = right;
            events.push(GameEvent::WallBounce);
        }
    }

    fn steer(&mut self, control: &mut dyn ControlSource) {
        let target = control.control();
        self.paddle_y = approach(self.paddle_y, target, self.tuning.paddle_blend);
    }
}

impl Game for Pong {
    const NAME: &'static str = "Pong";
    const AXIS: SensorAxis = SensorAxis::Vertical;

    fn create(settings: &Settings, rng: &mut dyn RandomSource) -> Self {
        Self::new(settings.pong.clone(), rng)
    }

    fn tick(
        &mut self,
        control: &mut dyn ControlSource,
        _rng: &mut dyn RandomSource,
        events: &mut Vec<GameEvent>,
    ) {
        if self.phase == GamePhase::GameOver {
            return;
        }

        self.ball.pos += self.ball.vel;
        self.check_collisions(events);
        self.steer(control);
    }

    fn restart(&mut self, rng: &mut dyn RandomSource) {
        self.score = 0;
        self.phase = GamePhase::Running;
        self.reset_ball(rng);
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn actor_specs(&self) -> Vec<ActorSpec> {
        let ball = self.tuning.ball_size as u32;
        let paddle = UVec2::new(self.tuning.paddle_width as u32, self.tuning.paddle_height as u32);
        vec![
            ActorSpec {
                style: RectStyle::filled(UVec2::splat(ball), Color::WHITE).with_radius((ball / 2) as u16),
                initially_visible: true,
            },
            ActorSpec {
                style: RectStyle::filled(paddle, Color::WHITE),
                initially_visible: true,
            },
        ]
    }

    fn snapshot_into(&self, snapshot: &mut Snapshot) {
        snapshot.score = self.score;
        snapshot.game_over = self.phase == GamePhase::GameOver;
        snapshot.actors.clear();
        snapshot.actors.push(ActorView {
            pos: IVec2::new(self.ball.pos.x as i32, self.ball.pos.y as i32),
            visible: true,
        });
        snapshot.actors.push(ActorView {
            pos: IVec2::new(0, self.paddle_top() as i32),
            visible: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{ScriptedRandom, SeededRandom};
    use proptest::prelude::*;

    fn pong() -> Pong {
        // 45 of 0..=90 -> 0 degrees
        Pong::new(PongTuning::default(), &mut ScriptedRandom::constant(45))
    }

    fn tick(game: &mut Pong, control: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut control = control;
        game.tick(&mut control, &mut ScriptedRandom::constant(0), &mut events);
        events
    }

    #[test]
    fn test_serve_from_centre() {
        let game = pong();
        assert_eq!(game.ball.pos, Vec2::new(64.0, 64.0));
        assert!((game.ball.vel.x - 1.5).abs() < 1e-6);
        assert!(game.ball.vel.y.abs() < 1e-6);
    }

    #[test]
    fn test_centred_paddle_return() {
        let mut game = pong();
        game.ball = Ball {
            pos: Vec2::new(2.0, 64.0),
            vel: Vec2::new(-1.5, 0.0),
        };
        assert_eq!(game.paddle_top(), 52.0);

        let events = tick(&mut game, 0.5);
        assert_eq!(events, vec![GameEvent::PaddleHit { score: 1 }]);
        assert_eq!(game.ball.vel.x, 1.5);
        assert_eq!(game.ball.vel.y, 0.0);
        assert_eq!(game.ball.pos.x, 4.0);
        assert_eq!(game.score, 1);
    }

    #[test]
    fn test_off_centre_return_adds_spin() {
        let mut game = pong();
        game.ball = Ball {
            pos: Vec2::new(2.0, 52.0),
            vel: Vec2::new(-1.5, 0.0),
        };
        tick(&mut game, 0.5);
        // Top edge of the paddle: (0 - 0.5) * 0.5
        assert!((game.ball.vel.y + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_miss_ends_game_only_past_left_edge() {
        let mut game = pong();
        game.ball = Ball {
            pos: Vec2::new(3.0, 10.0),
            vel: Vec2::new(-1.5, 0.0),
        };
        // At the paddle's depth but above it: keeps going
        let events = tick(&mut game, 0.5);
        assert!(events.is_empty());
        assert_eq!(game.phase, GamePhase::Running);

        let events = tick(&mut game, 0.5);
        assert_eq!(events, vec![GameEvent::BallLost { score: 0 }]);
        assert_eq!(game.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_top_wall_bounce() {
        let mut game = pong();
        game.ball = Ball {
            pos: Vec2::new(60.0, 1.0),
            vel: Vec2::new(1.0, -1.5),
        };
        let events = tick(&mut game, 0.5);
        assert_eq!(events, vec![GameEvent::WallBounce]);
        assert_eq!(game.ball.vel.y, 1.5);
        assert_eq!(game.ball.pos.y, 0.0);

        // Moving away now: no second flip
        let events = tick(&mut game, 0.5);
        assert!(events.is_empty());
        assert_eq!(game.ball.vel.y, 1.5);
    }

    #[test]
    fn test_right_wall_bounce_clamps() {
        let mut game = pong();
        game.ball = Ball {
            pos: Vec2::new(123.0, 60.0),
            vel: Vec2::new(1.5, 0.0),
        };
        let events = tick(&mut game, 0.5);
        assert_eq!(events, vec![GameEvent::WallBounce]);
        assert_eq!(game.ball.vel.x, -1.5);
        assert_eq!(game.ball.pos.x, 124.0);
    }

    #[test]
    fn test_game_over_freezes_ball_and_paddle() {
        let mut game = pong();
        game.phase = GamePhase::GameOver;
        let before = game.clone();
        for _ in 0..50 {
            assert!(tick(&mut game, 1.0).is_empty());
        }
        assert_eq!(game.ball, before.ball);
        assert_eq!(game.paddle_y, before.paddle_y);
    }

    #[test]
    fn test_restart_resets_score_and_ball() {
        let mut game = pong();
        game.score = 12;
        game.phase = GamePhase::GameOver;
        game.ball.pos = Vec2::new(-1.0, 30.0);

        game.restart(&mut ScriptedRandom::constant(0));
        assert_eq!(game.score, 0);
        assert_eq!(game.phase, GamePhase::Running);
        assert_eq!(game.ball.pos, Vec2::new(64.0, 64.0));
        // 0 of 0..=90 -> -45 degrees
        let angle = game.ball.vel.y.atan2(game.ball.vel.x).to_degrees();
        assert!((angle + 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_snapshot_positions() {
        let game = pong();
        let mut snapshot = Snapshot::default();
        game.snapshot_into(&mut snapshot);
        assert_eq!(snapshot.actors.len(), game.actor_specs().len());
        assert_eq!(snapshot.actors[0].pos, IVec2::new(64, 64));
        assert_eq!(snapshot.actors[1].pos, IVec2::new(0, 52));
        assert!(!snapshot.game_over);
    }

    proptest! {
        #[test]
        fn prop_restart_serves_within_arc(seed in any::<u64>()) {
            let mut rng = SeededRandom::new(seed);
            let mut game = Pong::new(PongTuning::default(), &mut rng);
            game.score = 5;
            game.phase = GamePhase::GameOver;
            game.restart(&mut rng);

            let angle = game.ball.vel.y.atan2(game.ball.vel.x).to_degrees();
            prop_assert!((-45.0 - 1e-3..=45.0 + 1e-3).contains(&angle));
            prop_assert!((game.ball.vel.length() - 1.5).abs() < 1e-4);
            prop_assert_eq!(game.score, 0);
            prop_assert_eq!(game.phase, GamePhase::Running);
        }

        #[test]
        fn prop_velocity_flips_only_on_contact(seed in any::<u64>(), targets in prop::collection::vec(0.0f32..=1.0, 1..16)) {
            let mut rng = SeededRandom::new(seed);
            let mut game = Pong::new(PongTuning::default(), &mut rng);
            let mut events = Vec::new();

            for step in 0..4000 {
                if game.is_game_over() {
                    game.restart(&mut rng);
                }
                let before = game.ball.vel;
                let mut target = targets[step % targets.len()];
                events.clear();
                game.tick(&mut target, &mut rng, &mut events);
                let after = game.ball.vel;

                let paddle = events.iter().any(|e| matches!(e, GameEvent::PaddleHit { .. }));
                let wall = events.contains(&GameEvent::WallBounce);
                let vx_flipped = before.x.signum() != after.x.signum();
                let vy_flipped = before.y != 0.0 && after.y != 0.0 && before.y.signum() != after.y.signum();

                if vx_flipped {
                    prop_assert!(paddle || (wall && game.ball.pos.x == SCREEN_WIDTH - 4.0));
                }
                if paddle {
                    prop_assert!(before.x < 0.0 && after.x > 0.0);
                }
                if vy_flipped {
                    prop_assert!(wall || paddle);
                }
            }
        }
    }
}
