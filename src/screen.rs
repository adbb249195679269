//! Game screen lifecycle
//!
//! `on_start` keeps the device awake, subscribes to button input and hands the
//! session to a fresh simulation clock. `run_loop` runs on the UI thread and
//! turns button presses into restart/exit requests. `on_stop` takes the
//! session back and undoes the start steps in reverse.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::SimulationClock;
use crate::error::{ConfigError, LifecycleError};
use crate::platform::{
    Action, Button, Event, EventQueue, Facility, Screen, ScreenTarget, Services,
};
use crate::session::{ControlFlags, Session};
use crate::settings::Settings;
use crate::sim::Game;

pub struct GameScreen<G: Game> {
    services: Services,
    settings: Settings,
    flags: Arc<ControlFlags>,
    queue: EventQueue,
    exit_to: ScreenTarget,
    /// Present while stopped
    session: Option<Session<G>>,
    /// Present while started
    clock: Option<SimulationClock<Session<G>>>,
}

impl<G: Game> GameScreen<G> {
    /// Create the screen and its widget tree. Nothing runs until `on_start`.
    pub fn new(
        services: Services,
        settings: Settings,
        exit_to: ScreenTarget,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let flags = Arc::new(ControlFlags::default());
        let session = Session::build(&services, &settings, flags.clone());
        let queue = EventQueue::new(settings.event_queue_capacity);
        Ok(Self {
            services,
            settings,
            flags,
            queue,
            exit_to,
            session: Some(session),
            clock: None,
        })
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_some()
    }

    pub fn flags(&self) -> &Arc<ControlFlags> {
        &self.flags
    }

    /// Ticks run by the current clock, 0 while stopped
    pub fn ticks(&self) -> u64 {
        self.clock.as_ref().map_or(0, |clock| clock.stats().ticks())
    }

    /// Session state, only reachable while stopped
    pub fn session(&self) -> Option<&Session<G>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session<G>> {
        self.session.as_mut()
    }

    fn is_game_over(&self) -> bool {
        match &self.session {
            Some(session) => session.game().is_game_over(),
            None => self.flags.is_game_over(),
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Input {
                button: Button::Alt,
                action: Action::Press,
            } => self.request_exit(),
            Event::Input {
                button: Button::Select,
                action: Action::Press,
            } if self.is_game_over() => self.request_restart(),
            _ => {}
        }
    }

    /// One lazy transition per press; the host decides when to run it
    fn request_exit(&mut self) {
        self.flags.request_exit();
        if self.clock.is_none() {
            self.flags.take_exit();
        }
        log::info!("{}: exit to menu", G::NAME);
        let target = self.exit_to.clone();
        self.services.navigator.transition(Box::new(move || target()));
    }

    fn request_restart(&mut self) {
        self.flags.request_restart();
        // No clock to pick the request up, apply it here
        if let Some(session) = self.session.as_mut() {
            session.apply_pending_restart();
        }
    }
}

impl<G: Game> Screen for GameScreen<G> {
    fn name(&self) -> &'static str {
        G::NAME
    }

    fn on_start(&mut self) -> Result<(), LifecycleError> {
        if self.clock.is_some() {
            return Err(LifecycleError::AlreadyStarted(G::NAME));
        }

        self.services.power.set_auto_sleep_enabled(false);
        self.services.events.listen(Facility::Input, &self.queue);
        self.flags.take_exit();

        let mut session = match self.session.take() {
            Some(session) => session,
            None => Session::build(&self.services, &self.settings, self.flags.clone()),
        };
        session.seed_input();

        match SimulationClock::start(G::NAME, self.settings.tick_period(), session) {
            Ok(clock) => {
                self.clock = Some(clock);
                log::info!("{} started", G::NAME);
                Ok(())
            }
            Err(e) => {
                log::error!("{}: failed to start simulation: {}", G::NAME, e);
                self.services.events.unlisten(&self.queue);
                self.services.power.set_auto_sleep_enabled(true);
                Err(e)
            }
        }
    }

    fn on_stop(&mut self) -> Result<(), LifecycleError> {
        let Some(clock) = self.clock.as_mut() else {
            return Ok(());
        };

        match clock.stop(self.settings.shutdown_timeout()) {
            Ok(session) => {
                log::debug!(
                    "{} ran {} ticks, {} overruns",
                    G::NAME,
                    clock.stats().ticks(),
                    clock.stats().overruns()
                );
                self.session = Some(session);
                self.clock = None;
            }
            Err(LifecycleError::WorkerPanicked) => {
                log::error!("{}: simulation thread panicked", G::NAME);
                self.clock = None;
                self.services.events.unlisten(&self.queue);
                self.services.power.set_auto_sleep_enabled(true);
                return Err(LifecycleError::WorkerPanicked);
            }
            Err(e) => {
                // Thread may still touch the display; leave everything as is
                log::error!("{}: {}", G::NAME, e);
                return Err(e);
            }
        }

        self.services.events.unlisten(&self.queue);
        self.services.power.set_auto_sleep_enabled(true);
        log::info!("{} stopped", G::NAME);
        Ok(())
    }

    fn run_loop(&mut self) {
        if let Some(event) = self.queue.get(Duration::ZERO) {
            self.handle_event(event);
        }
    }
}

/// Stops a running screen. If the simulation thread misses the shutdown
/// timeout it is detached: the input subscription and sleep inhibit are
/// released, and the widget tree goes away once the thread's last tick ends.
impl<G: Game> Drop for GameScreen<G> {
    fn drop(&mut self) {
        if self.clock.is_none() {
            return;
        }
        if let Err(e) = self.on_stop() {
            log::error!("{}: stop on drop failed, detaching simulation: {}", G::NAME, e);
            self.clock = None;
            self.services.events.unlisten(&self.queue);
            self.services.power.set_auto_sleep_enabled(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{
        MemoryDisplay, PendingNavigator, PowerFlag, RecordingAudio, ScriptedImu,
    };
    use crate::platform::InputEvents;
    use crate::sim::{Dodger, GamePhase, Pong};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Idle;

    impl Screen for Idle {
        fn name(&self) -> &'static str {
            "Idle"
        }
        fn on_start(&mut self) -> Result<(), LifecycleError> {
            Ok(())
        }
        fn on_stop(&mut self) -> Result<(), LifecycleError> {
            Ok(())
        }
        fn run_loop(&mut self) {}
    }

    fn services() -> (Services, Arc<InputEvents>, Arc<PendingNavigator>) {
        let events = Arc::new(InputEvents::new());
        let navigator = Arc::new(PendingNavigator::default());
        let services = Services {
            imu: Arc::new(ScriptedImu::tilted(0.0, 0.0)),
            audio: Arc::new(RecordingAudio::default()),
            events: events.clone(),
            power: Arc::new(PowerFlag::default()),
            navigator: navigator.clone(),
            display: Arc::new(MemoryDisplay::default()),
        };
        (services, events, navigator)
    }

    fn idle_target() -> ScreenTarget {
        Arc::new(|| Box::new(Idle) as Box<dyn Screen>)
    }

    #[test]
    fn test_name_follows_game() {
        let (services, ..) = services();
        let dodger = GameScreen::<Dodger>::new(services.clone(), Settings::default(), idle_target()).unwrap();
        let pong = GameScreen::<Pong>::new(services, Settings::default(), idle_target()).unwrap();
        assert_eq!(dodger.name(), "BirdDodger");
        assert_eq!(pong.name(), "Pong");
    }

    #[test]
    fn test_select_restarts_stopped_game_immediately() {
        let (services, events, _) = services();
        let mut screen = GameScreen::<Pong>::new(services.clone(), Settings::default(), idle_target()).unwrap();
        // Subscribe without starting the clock
        services.events.listen(Facility::Input, &screen.queue);

        events.publish(Event::press(Button::Select));
        screen.run_loop();
        assert_eq!(screen.session().unwrap().game().phase, GamePhase::Running);
        assert!(!screen.flags().restart_pending());

        screen.session_mut().unwrap().game_mut().phase = GamePhase::GameOver;
        screen.session_mut().unwrap().game_mut().score = 9;
        events.publish(Event::release(Button::Select));
        screen.run_loop();
        assert!(screen.session().unwrap().game().is_game_over());

        events.publish(Event::press(Button::Select));
        screen.run_loop();
        let game = screen.session().unwrap().game();
        assert_eq!(game.phase, GamePhase::Running);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_each_alt_press_requests_lazy_transition() {
        let (services, events, navigator) = services();
        let built = Arc::new(AtomicUsize::new(0));
        let target: ScreenTarget = {
            let built = built.clone();
            Arc::new(move || {
                built.fetch_add(1, Ordering::SeqCst);
                Box::new(Idle) as Box<dyn Screen>
            })
        };
        let mut screen = GameScreen::<Dodger>::new(services.clone(), Settings::default(), target).unwrap();
        services.events.listen(Facility::Input, &screen.queue);

        events.publish(Event::press(Button::Alt));
        events.publish(Event::release(Button::Alt));
        events.publish(Event::press(Button::Alt));
        for _ in 0..3 {
            screen.run_loop();
        }

        // Stopped screen: nothing left for a tick to pick up
        assert!(!screen.flags().exit_pending());
        let pending = navigator.take_pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(built.load(Ordering::SeqCst), 0);

        let next = pending.into_iter().next().unwrap()();
        assert_eq!(next.name(), "Idle");
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let (services, ..) = services();
        let settings = Settings {
            tick_period_ms: 0,
            ..Settings::default()
        };
        let screen = GameScreen::<Dodger>::new(services.clone(), settings, idle_target());
        assert!(matches!(
            screen.err(),
            Some(ConfigError::Invalid { field: "tick_period_ms", .. })
        ));

        let settings = Settings {
            shutdown_timeout_ms: 0,
            ..Settings::default()
        };
        let screen = GameScreen::<Pong>::new(services, settings, idle_target());
        assert!(matches!(
            screen.err(),
            Some(ConfigError::Invalid { field: "shutdown_timeout_ms", .. })
        ));
    }

    #[test]
    fn test_run_loop_handles_one_event_per_call() {
        let (services, events, navigator) = services();
        let mut screen = GameScreen::<Dodger>::new(services.clone(), Settings::default(), idle_target()).unwrap();
        services.events.listen(Facility::Input, &screen.queue);

        events.publish(Event::press(Button::Up));
        events.publish(Event::press(Button::Alt));
        screen.run_loop();
        assert_eq!(navigator.pending(), 0);
        screen.run_loop();
        assert_eq!(navigator.pending(), 1);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let (services, ..) = services();
        let mut screen = GameScreen::<Dodger>::new(services, Settings::default(), idle_target()).unwrap();
        screen.on_stop().unwrap();
        assert!(!screen.is_running());
        assert_eq!(screen.ticks(), 0);
    }
}
