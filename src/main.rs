//! City Runner headless driver
//!
//! Plays one autopilot run on the headless platform and prints its summary.
//!
//! Usage: `city-runner [seed] [max_ticks]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use city_runner::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use city_runner::persistence::JsonFileStore;
    use city_runner::platform::Headless;
    use city_runner::sim::{Autopilot, RunPhase, RunnerSimulator};
    use city_runner::{HighScores, Settings, Tuning};
    use glam::Vec2;

    env_logger::init();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(now);
    let max_ticks: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 60 * 5);

    let data_dir: PathBuf = std::env::temp_dir().join("city-runner");
    let settings = Settings::load(&JsonFileStore::<Settings>::new(data_dir.join("settings.json")));
    let tuning = Tuning::default();
    if let Err(e) = tuning.validate() {
        log::error!("Invalid tuning: {e}");
        std::process::exit(1);
    }

    log::info!("City Runner (native) starting, seed {seed}");
    let mut platform = Headless::new(&tuning);
    let mut sim = RunnerSimulator::with_seed(
        tuning,
        &settings,
        Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        seed,
    );
    let mut pilot = Autopilot::new();

    sim.start(&mut platform);
    while sim.time_ticks() < max_ticks {
        let input = pilot.next_input(&sim);
        if sim.tick(&input, &mut platform) == RunPhase::GameOver {
            break;
        }
    }

    let summary = sim.summary();
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode summary: {e}"),
    }
    println!("score: {}  lives: {}", platform.score, platform.lives);

    let mut store = JsonFileStore::<HighScores>::new(data_dir.join("highscores.json"));
    let mut board = HighScores::load(&store);
    if let Some(rank) = board.record(platform.score, &summary, now) {
        println!("leaderboard rank: {rank}");
        if let Err(e) = board.save(&mut store) {
            log::error!("Failed to save high scores: {e}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; nothing to run here
}
