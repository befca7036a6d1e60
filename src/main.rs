//! Endless Horde headless runner
//!
//! Plays sessions against the headless backend with the autopilot at the
//! controls. Useful for soak tests, balance checks and replaying a seed.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use serde::Serialize;

use endless_horde::highscores::format_age;
use endless_horde::platform::{HeadlessBackend, PresentationStats, autopilot};
use endless_horde::sim::{GameEvent, GamePhase, GameState, tick};
use endless_horde::{HighScores, Tuning, logging};

/// Run Endless Horde sessions without a renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session seed; defaults to the current time
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many frames even if the player is still alive
    #[arg(short, long, default_value_t = 36_000)]
    frames: u64,

    /// Frame length in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Tuning file (JSON); missing fields use the stock values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// High score table to update (JSON)
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Print the session summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// What a finished session looked like
#[derive(Debug, Serialize)]
struct SessionSummary {
    seed: u64,
    frames: u64,
    survived_secs: f32,
    score: u64,
    kills: u32,
    player_dead: bool,
    difficulty_steps: u32,
    max_enemies: usize,
    presentation: PresentationStats,
}

/// One headless session
struct Session {
    state: GameState,
    backend: HeadlessBackend,
}

impl Session {
    fn new(seed: u64, tuning: Tuning) -> Self {
        let mut backend = HeadlessBackend::default();
        let mut state = GameState::new(seed, tuning);
        state.start_game(&mut backend);
        Self { state, backend }
    }

    /// Step until game over or the frame limit
    fn run(&mut self, max_frames: u64, dt: f32) {
        while self.state.phase == GamePhase::Running && self.state.frame < max_frames {
            let input = autopilot(&self.state);
            tick(&mut self.state, &mut self.backend, &input, dt);
            self.backend.advance(dt);

            for event in &self.state.events {
                match event {
                    GameEvent::PlayerHurt { health } => {
                        log::debug!("Player hurt, {health:.2} health left");
                    }
                    GameEvent::DifficultyRaised { max_enemies, .. } => {
                        log::info!(
                            "Difficulty up at {:.0}s: {max_enemies} enemies",
                            self.state.elapsed
                        );
                    }
                    _ => {}
                }
            }
        }
    }

    fn summary(&self) -> SessionSummary {
        let state = &self.state;
        SessionSummary {
            seed: state.seed,
            frames: state.frame,
            survived_secs: state.elapsed,
            score: state.player.score,
            kills: state.kills,
            player_dead: state.phase == GamePhase::GameOver,
            difficulty_steps: state.difficulty.steps,
            max_enemies: state.difficulty.max_enemies,
            presentation: self.backend.stats.clone(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn record_score(path: &std::path::Path, summary: &SessionSummary) {
    let mut scores = HighScores::load_or_default(path);
    let now = unix_now();

    match scores.add_score(summary.score, summary.survived_secs, now) {
        Some(rank) => {
            log::info!("New high score: #{rank}");
            if let Err(e) = scores.save(path) {
                log::error!("Could not save high scores: {e}");
            }
        }
        None => log::info!("Score {} did not make the table", summary.score),
    }

    for (i, entry) in scores.entries.iter().enumerate() {
        log::info!(
            "{:>2}. {:>6}  {:>6.1}s  {}",
            i + 1,
            entry.score,
            entry.survived_secs,
            format_age(entry.timestamp, now)
        );
    }
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if !(args.dt > 0.0 && args.dt.is_finite()) {
        log::error!("--dt must be a positive number of seconds, got {}", args.dt);
        std::process::exit(2);
    }

    let tuning = match &args.config {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let seed = args.seed.unwrap_or_else(time_seed);
    log::info!("Endless Horde (headless) starting with seed: {seed}");

    let mut session = Session::new(seed, tuning);
    session.run(args.frames, args.dt);
    let summary = session.summary();

    log::info!(
        "Session over after {:.1}s: score {}, {} kills, {}",
        summary.survived_secs,
        summary.score,
        summary.kills,
        if summary.player_dead {
            "player died"
        } else {
            "frame limit reached"
        }
    );

    if let Some(path) = &args.scores {
        record_score(path, &summary);
    }

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{text}"),
            Err(e) => log::error!("Could not serialize summary: {e}"),
        }
    }
}
