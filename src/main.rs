//! Tilt Arcade headless demo
//!
//! Runs one of the games against the in-memory device services, with a slow
//! simulated wrist wobble on the accelerometer. Game overs are answered with
//! Select; when time runs out Alt leaves for the menu.
//!
//! Usage: tilt-arcade [dodger|pong] [seconds] [settings.json]

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::process;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use tilt_arcade::platform::headless::{
        MemoryDisplay, PendingNavigator, PowerFlag, RecordingAudio,
    };
    use tilt_arcade::platform::{
        Button, Event, Imu, ImuSample, InputEvents, Screen, ScreenTarget, Services,
    };
    use tilt_arcade::sim::{Dodger, Game, Pong};
    use tilt_arcade::{GameScreen, LifecycleError, SensorError, Settings};

    const MENU: &str = "Menu";
    const UI_POLL: Duration = Duration::from_millis(10);
    const RESTART_DELAY: Duration = Duration::from_millis(750);

    /// Wrist drifting back and forth, roughly +-0.25 g on both axes
    struct WobbleImu {
        started: Instant,
    }

    impl Imu for WobbleImu {
        fn sample(&self) -> Result<ImuSample, SensorError> {
            let t = self.started.elapsed().as_secs_f32();
            Ok(ImuSample {
                accel_x: 0.25 * (t * 1.3).sin(),
                accel_y: 0.25 * (t * 0.9).cos(),
                accel_z: 1.0,
            })
        }
    }

    struct Menu;

    impl Screen for Menu {
        fn name(&self) -> &'static str {
            MENU
        }

        fn on_start(&mut self) -> Result<(), LifecycleError> {
            log::info!("Back at the menu");
            Ok(())
        }

        fn on_stop(&mut self) -> Result<(), LifecycleError> {
            Ok(())
        }

        fn run_loop(&mut self) {}
    }

    fn usage() -> ! {
        eprintln!("usage: tilt-arcade [dodger|pong] [seconds] [settings.json]");
        process::exit(2);
    }

    pub fn main() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args: Vec<String> = std::env::args().skip(1).collect();
        let game = args.first().map(String::as_str).unwrap_or("dodger");
        let seconds = match args.get(1).map(|s| s.parse::<u64>()) {
            None => 10,
            Some(Ok(seconds)) => seconds,
            Some(Err(_)) => usage(),
        };
        let settings = match args.get(2) {
            None => Settings::default(),
            Some(path) => match Settings::load(path) {
                Ok(settings) => settings,
                Err(e) => {
                    log::error!("Bad settings file {}: {}", path, e);
                    process::exit(2);
                }
            },
        };

        let code = match game {
            "dodger" => run::<Dodger>(settings, Duration::from_secs(seconds)),
            "pong" => run::<Pong>(settings, Duration::from_secs(seconds)),
            _ => usage(),
        };
        process::exit(code);
    }

    fn run<G: Game>(settings: Settings, play_for: Duration) -> i32 {
        let events = Arc::new(InputEvents::new());
        let navigator = Arc::new(PendingNavigator::default());
        let display = Arc::new(MemoryDisplay::default());
        let audio = Arc::new(RecordingAudio::default());
        let services = Services {
            imu: Arc::new(WobbleImu {
                started: Instant::now(),
            }),
            audio: audio.clone(),
            events: events.clone(),
            power: Arc::new(PowerFlag::default()),
            navigator: navigator.clone(),
            display: display.clone(),
        };
        let menu: ScreenTarget = Arc::new(|| Box::new(Menu) as Box<dyn Screen>);

        let mut screen: Box<dyn Screen> = match GameScreen::<G>::new(services, settings, menu) {
            Ok(screen) => Box::new(screen),
            Err(e) => {
                log::error!("{}: {}", G::NAME, e);
                return 2;
            }
        };
        if let Err(e) = screen.on_start() {
            log::error!("{}: {}", screen.name(), e);
            return 1;
        }

        let deadline = Instant::now() + play_for;
        let mut exit_sent = false;
        let mut last_select: Option<Instant> = None;
        let mut rounds = 1;

        while screen.name() != MENU {
            screen.run_loop();

            for factory in navigator.take_pending() {
                if let Err(e) = screen.on_stop() {
                    log::error!("{}: {}", screen.name(), e);
                    return 1;
                }
                screen = factory();
                if let Err(e) = screen.on_start() {
                    log::error!("{}: {}", screen.name(), e);
                    return 1;
                }
            }

            if Instant::now() >= deadline {
                if !exit_sent {
                    events.publish(Event::press(Button::Alt));
                    exit_sent = true;
                }
            } else if display.label_texts().iter().any(|t| t.ends_with("Game Over!"))
                && last_select.is_none_or(|at| at.elapsed() >= RESTART_DELAY)
            {
                events.publish(Event::press(Button::Select));
                last_select = Some(Instant::now());
                rounds += 1;
            }

            thread::sleep(UI_POLL);
        }

        if let Err(e) = screen.on_stop() {
            log::error!("{}: {}", screen.name(), e);
            return 1;
        }
        log::info!(
            "{}: {} round(s), {} sound cue(s)",
            G::NAME,
            rounds,
            audio.played().len()
        );
        0
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    demo::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {}
