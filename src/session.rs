//! Simulation session
//!
//! Everything the clock thread owns while a game screen is running: the game
//! itself, its input adapter and RNG, the presenter and the audio cues. The
//! screen talks to a running session only through `ControlFlags`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::AudioManager;
use crate::clock::TickWorker;
use crate::platform::Services;
use crate::presentation::Presenter;
use crate::settings::Settings;
use crate::sim::{
    AxisMapping, Ema, Game, GameEvent, RandomSource, SeededRandom, SensorInputAdapter,
};

/// Requests and status shared between the screen and the clock thread
#[derive(Debug, Default)]
pub struct ControlFlags {
    restart_requested: AtomicBool,
    exit_requested: AtomicBool,
    game_over: AtomicBool,
}

impl ControlFlags {
    /// Ask for a restart on the next tick
    pub fn request_restart(&self) {
        self.restart_requested.store(true, Ordering::Release);
    }

    /// Consume a pending restart request
    pub fn take_restart(&self) -> bool {
        self.restart_requested.swap(false, Ordering::AcqRel)
    }

    pub fn restart_pending(&self) -> bool {
        self.restart_requested.load(Ordering::Acquire)
    }

    /// Flag an exit request for the next tick to observe
    pub fn request_exit(&self) {
        self.exit_requested.store(true, Ordering::Release);
    }

    /// Consume a pending exit request
    pub fn take_exit(&self) -> bool {
        self.exit_requested.swap(false, Ordering::AcqRel)
    }

    pub fn exit_pending(&self) -> bool {
        self.exit_requested.load(Ordering::Acquire)
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.load(Ordering::Acquire)
    }

    fn publish_game_over(&self, game_over: bool) {
        self.game_over.store(game_over, Ordering::Release);
    }
}

pub struct Session<G: Game> {
    game: G,
    control: SensorInputAdapter,
    rng: Box<dyn RandomSource>,
    presenter: Presenter,
    audio: AudioManager,
    flags: Arc<ControlFlags>,
    events: Vec<GameEvent>,
}

impl<G: Game> Session<G> {
    /// Build a session wired to the device services. Creates the widget tree.
    pub fn build(services: &Services, settings: &Settings, flags: Arc<ControlFlags>) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        };
        log::debug!("{} session seed {}", G::NAME, rng.seed());

        let game = G::create(settings, &mut rng);
        let control = SensorInputAdapter::with_filter(
            services.imu.clone(),
            G::AXIS,
            Ema::new(settings.sensor.filter_strength),
            AxisMapping::symmetric(settings.sensor.range_g),
        );
        let presenter = Presenter::new(services.display.clone(), &game);
        let mut audio = AudioManager::new(services.audio.clone());
        audio.set_muted(!settings.sound_enabled);

        Self::new(game, control, Box::new(rng), presenter, audio, flags)
    }

    pub fn new(
        game: G,
        control: SensorInputAdapter,
        rng: Box<dyn RandomSource>,
        presenter: Presenter,
        audio: AudioManager,
        flags: Arc<ControlFlags>,
    ) -> Self {
        flags.publish_game_over(game.is_game_over());
        Self {
            game,
            control,
            rng,
            presenter,
            audio,
            flags,
            events: Vec::with_capacity(8),
        }
    }

    /// Prime the input filter from a fresh sensor reading
    pub fn seed_input(&mut self) {
        if let Err(e) = self.control.seed() {
            log::warn!("{}: sensor seed failed, starting level: {}", G::NAME, e);
        }
    }

    /// Apply a pending restart request. Only a finished game restarts.
    pub fn apply_pending_restart(&mut self) -> bool {
        if !self.flags.take_restart() || !self.game.is_game_over() {
            return false;
        }
        self.game.restart(&mut *self.rng);
        self.flags.publish_game_over(false);
        log::info!("{} restarted", G::NAME);
        true
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn control(&self) -> &SensorInputAdapter {
        &self.control
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Events from the most recent tick
    pub fn last_events(&self) -> &[GameEvent] {
        &self.events
    }

    fn report(&self, event: &GameEvent) {
        if let Some(effect) = event.sound() {
            self.audio.play(effect);
        }
        match event {
            GameEvent::Crashed { score, .. } | GameEvent::BallLost { score } => {
                log::info!("{} game over, score {}", G::NAME, score);
            }
            GameEvent::SpeedUp { scroll_speed } => {
                log::debug!("{} speed up to {:.1}", G::NAME, scroll_speed);
            }
            other => log::trace!("{}: {:?}", G::NAME, other),
        }
    }
}

impl<G: Game> TickWorker for Session<G> {
    fn advance_tick(&mut self) {
        self.apply_pending_restart();
        if self.flags.take_exit() {
            log::debug!("{} exit requested, score {}", G::NAME, self.game.score());
        }

        self.events.clear();
        self.game
            .tick(&mut self.control, &mut *self.rng, &mut self.events);
        for event in &self.events {
            self.report(event);
        }
        self.flags.publish_game_over(self.game.is_game_over());
    }

    fn sync_presentation(&mut self) {
        self.presenter.sync(&self.game);
    }
}
