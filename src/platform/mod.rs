//! Platform abstraction layer
//!
//! The simulator never touches rendering, audio or storage directly. It talks
//! to the host through these collaborator traits:
//! - Geometry/threshold lookup
//! - Actor view (state names, position, size)
//! - Score and life bookkeeping
//! - Visual creation/teardown for tiles, obstacles and gems
//! - Background parallax speed

use glam::Vec2;

use crate::sim::state::{Gem, GameOverReason, Obstacle, ObstacleTier, Tile};
use crate::tuning::Tuning;

/// Opaque handle to a host-side visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// Numeric constraints supplied by the asset layer
pub trait GeometryProvider {
    /// Fraction of actor width, from its left edge, used for gap detection
    fn fall_threshold(&self) -> f32;
    /// Scale applied to the actor box for obstacle and gem overlap
    fn collision_threshold(&self) -> f32;
    /// Visual (width, height) of an obstacle tier
    fn obstacle_size(&self, tier: ObstacleTier) -> Vec2;
}

/// The on-screen actor
pub trait ActorView {
    /// Switch animation; returns false if the view does not know the name
    fn set_state(&mut self, name: &str) -> bool;
    fn position(&self) -> Vec2;
    fn set_position(&mut self, pos: Vec2);
    fn size(&self) -> Vec2;
}

/// Score and life bookkeeping
pub trait ScoreSink {
    fn add_score(&mut self, amount: u64);
    /// Deduct lives. Returns false, without changing anything, when the
    /// deduction would leave zero or fewer lives.
    fn apply_life_cost(&mut self, amount: u32) -> bool;
    fn add_life(&mut self, _amount: u32) {}
    fn level_up(&mut self, _level: u32) {}
    fn game_over(&mut self, _reason: GameOverReason) {}
}

/// Creates and destroys host visuals for simulated entities
pub trait EntityVisualFactory {
    fn create_tile_visual(&mut self, tile: &Tile) -> VisualHandle;
    fn create_obstacle_visual(&mut self, obstacle: &Obstacle) -> VisualHandle;
    fn create_gem_visual(&mut self, gem: &Gem) -> VisualHandle;
    fn destroy(&mut self, handle: VisualHandle);
}

/// Parallax background
pub trait BackgroundScroller {
    fn set_scroll_speed(&mut self, speed: f32);
}

/// Everything the simulator needs from its host
pub trait Platform:
    GeometryProvider + ActorView + ScoreSink + EntityVisualFactory + BackgroundScroller
{
}

impl<T> Platform for T where
    T: GeometryProvider + ActorView + ScoreSink + EntityVisualFactory + BackgroundScroller
{
}

/// Actor animation names understood by [`Headless`]
pub const KNOWN_STATES: [&str; 6] = ["idle", "walk", "run", "jump", "double_jump", "fall"];

/// Platform without a screen: keeps lives and score, counts visuals, logs.
///
/// Used by the native driver and by tests.
#[derive(Debug, Clone)]
pub struct Headless {
    pub lives: u32,
    pub max_lives: u32,
    pub score: u64,
    pub level: u32,
    pub game_over: Option<GameOverReason>,
    /// Number of game-over signals received
    pub game_over_signals: u32,
    pub actor_state: String,
    pub actor_pos: Vec2,
    pub actor_size: Vec2,
    pub scroll_speed: f32,
    /// Handles created and not yet destroyed
    pub live_visuals: usize,
    /// Every handle passed to `destroy`, in order
    pub destroyed: Vec<VisualHandle>,
    fall_threshold: f32,
    collision_threshold: f32,
    obstacle_sizes: [(f32, f32); 3],
    next_handle: u64,
}

impl Headless {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            lives: tuning.start_lives,
            max_lives: tuning.max_lives,
            score: 0,
            level: 1,
            game_over: None,
            game_over_signals: 0,
            actor_state: "idle".to_string(),
            actor_pos: Vec2::ZERO,
            actor_size: Vec2::new(tuning.actor_size.0, tuning.actor_size.1),
            scroll_speed: 0.0,
            live_visuals: 0,
            destroyed: Vec::new(),
            fall_threshold: tuning.fall_threshold,
            collision_threshold: tuning.collision_threshold,
            obstacle_sizes: tuning.obstacle_sizes,
            next_handle: 1,
        }
    }

    /// Override the geometry answers (e.g. to emulate a different sprite set)
    pub fn with_thresholds(mut self, fall: f32, collision: f32) -> Self {
        self.fall_threshold = fall;
        self.collision_threshold = collision;
        self
    }

    fn allocate(&mut self) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.live_visuals += 1;
        handle
    }
}

impl GeometryProvider for Headless {
    fn fall_threshold(&self) -> f32 {
        self.fall_threshold
    }

    fn collision_threshold(&self) -> f32 {
        self.collision_threshold
    }

    fn obstacle_size(&self, tier: ObstacleTier) -> Vec2 {
        let (w, h) = self.obstacle_sizes[tier.index()];
        Vec2::new(w, h)
    }
}

impl ActorView for Headless {
    fn set_state(&mut self, name: &str) -> bool {
        if !KNOWN_STATES.contains(&name) {
            return false;
        }
        self.actor_state = name.to_string();
        true
    }

    fn position(&self) -> Vec2 {
        self.actor_pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.actor_pos = pos;
    }

    fn size(&self) -> Vec2 {
        self.actor_size
    }
}

impl ScoreSink for Headless {
    fn add_score(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }

    fn apply_life_cost(&mut self, amount: u32) -> bool {
        if self.lives <= amount {
            return false;
        }
        self.lives -= amount;
        log::debug!("Lost {} lives, {} left", amount, self.lives);
        true
    }

    fn add_life(&mut self, amount: u32) {
        self.lives = self.lives.saturating_add(amount).min(self.max_lives);
    }

    fn level_up(&mut self, level: u32) {
        self.level = level;
    }

    fn game_over(&mut self, reason: GameOverReason) {
        self.game_over_signals += 1;
        self.game_over = Some(reason);
    }
}

impl EntityVisualFactory for Headless {
    fn create_tile_visual(&mut self, _tile: &Tile) -> VisualHandle {
        self.allocate()
    }

    fn create_obstacle_visual(&mut self, _obstacle: &Obstacle) -> VisualHandle {
        self.allocate()
    }

    fn create_gem_visual(&mut self, _gem: &Gem) -> VisualHandle {
        self.allocate()
    }

    fn destroy(&mut self, handle: VisualHandle) {
        self.live_visuals = self.live_visuals.saturating_sub(1);
        self.destroyed.push(handle);
    }
}

impl BackgroundScroller for Headless {
    fn set_scroll_speed(&mut self, speed: f32) {
        self.scroll_speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_cost_refuses_to_empty() {
        let mut platform = Headless::new(&Tuning::default());
        platform.lives = 3;
        assert!(platform.apply_life_cost(2));
        assert_eq!(platform.lives, 1);
        // Would reach zero: refused, untouched
        assert!(!platform.apply_life_cost(1));
        assert_eq!(platform.lives, 1);
    }

    #[test]
    fn test_add_life_capped() {
        let mut platform = Headless::new(&Tuning::default());
        platform.add_life(3);
        assert_eq!(platform.lives, platform.max_lives);
    }

    #[test]
    fn test_unknown_state_rejected() {
        let mut platform = Headless::new(&Tuning::default());
        assert!(!platform.set_state("moonwalk"));
        assert_eq!(platform.actor_state, "idle");
        assert!(platform.set_state("run"));
        assert_eq!(platform.actor_state, "run");
    }

    #[test]
    fn test_visual_handles_unique() {
        let mut platform = Headless::new(&Tuning::default());
        let a = platform.allocate();
        let b = platform.allocate();
        assert_ne!(a, b);
        platform.destroy(a);
        assert_eq!(platform.live_visuals, 1);
        assert_eq!(platform.destroyed, vec![a]);
    }
}
