//! City Runner - procedural endless runner core
//!
//! Core modules:
//! - `sim`: Level generation and per-frame runner simulation
//! - `platform`: Collaborator interfaces (view, scoring, visuals, background)
//! - `persistence`: Load/save port for settings and high scores
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default viewport
    pub const SCREEN_WIDTH: f32 = 1000.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Highest level with its own tuning row; later levels reuse the last tier
    pub const MAX_TIERED_LEVEL: u32 = 12;
}

/// Convert a duration in seconds to whole simulation ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    ((secs / consts::SIM_DT).round() as u64).max(1)
}
