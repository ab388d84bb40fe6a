//! Sector Shooter entry point
//!
//! Native builds run a headless session and log a summary. The ship is flown
//! by the autopilot when the settings enable it. No peer link is attached. The
//! browser build is library-only; the page drives `Session` itself.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use sector_shooter::Session;
    use sector_shooter::Settings;
    use sector_shooter::audio::{AudioBus, LogSink};
    use sector_shooter::persistence::JsonFileStore;
    use sector_shooter::sim::TickOutcome;

    env_logger::init();
    log::info!("Sector Shooter (native) starting...");

    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sector_shooter_settings.json".to_string());
    let settings = Settings::load_from(std::path::Path::new(&settings_path));

    let store = JsonFileStore::new(settings.profile_path.clone());
    let mut audio = AudioBus::new(Box::new(LogSink));
    settings.apply_audio(&mut audio);
    let mut session = Session::from_settings(&settings, Box::new(store)).with_audio(audio);

    let input = settings.unattended_input();
    if !input.autopilot {
        log::info!("Autopilot disabled; the ship stays idle");
    }

    let mut frames = 0u64;
    while frames < settings.demo_frames {
        frames += 1;
        if session.step(&input) != TickOutcome::Advanced {
            break;
        }
    }

    let state = session.state();
    log::info!(
        "Run ended after {} frames: wave {}, score {}, kills {}, lives {}",
        frames,
        state.wave.wave,
        state.score,
        state.kills,
        state.player.lives
    );
    if !session.is_finished() {
        log::info!("Frame budget reached before game over; profile left unchanged");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser build is driven through the library
}
