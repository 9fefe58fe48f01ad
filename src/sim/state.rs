//! Runner entities and actor state
//!
//! Tiles own their obstacles and gems; everything here is plain data that
//! the tick mutates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::platform::VisualHandle;

/// Obstacle severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleTier {
    Low,
    Mid,
    High,
}

impl ObstacleTier {
    pub const ALL: [ObstacleTier; 3] = [ObstacleTier::Low, ObstacleTier::Mid, ObstacleTier::High];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            ObstacleTier::Low => 0,
            ObstacleTier::Mid => 1,
            ObstacleTier::High => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObstacleTier::Low => "low",
            ObstacleTier::Mid => "mid",
            ObstacleTier::High => "high",
        }
    }
}

/// Obstacle counts for one tile, per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleCounts {
    pub low: u32,
    pub mid: u32,
    pub high: u32,
}

impl ObstacleCounts {
    pub fn new(low: u32, mid: u32, high: u32) -> Self {
        Self { low, mid, high }
    }

    pub fn get(&self, tier: ObstacleTier) -> u32 {
        match tier {
            ObstacleTier::Low => self.low,
            ObstacleTier::Mid => self.mid,
            ObstacleTier::High => self.high,
        }
    }

    pub fn add(&mut self, tier: ObstacleTier, n: u32) {
        match tier {
            ObstacleTier::Low => self.low += n,
            ObstacleTier::Mid => self.mid += n,
            ObstacleTier::High => self.high += n,
        }
    }

    pub fn total(&self) -> u32 {
        self.low + self.mid + self.high
    }

    /// Tiers in spawn order, one entry per obstacle
    pub fn expand(&self) -> Vec<ObstacleTier> {
        ObstacleTier::ALL
            .iter()
            .flat_map(|&tier| std::iter::repeat_n(tier, self.get(tier) as usize))
            .collect()
    }
}

/// Collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GemKind {
    /// Low value: score
    Diamond,
    /// High value: one life
    Heart,
}

/// A hazard standing on a tile
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub tier: ObstacleTier,
    /// Left edge (screen space)
    pub x: f32,
    /// Top edge (screen space, y grows downward)
    pub y: f32,
    pub size: Vec2,
    /// Left edge relative to the owning tile's leading edge
    pub offset: f32,
    pub is_moving: bool,
    /// Patrol direction for moving obstacles (+1 / -1)
    pub direction: f32,
    /// Cleared by a jump (scored once)
    pub jumped_over: bool,
    /// Charged against lives (once)
    pub struck: bool,
    pub visual: Option<VisualHandle>,
}

impl Obstacle {
    /// Vertical midpoint; clearing it means the actor's feet are above this
    #[inline]
    pub fn mid_y(&self) -> f32 {
        self.y + self.size.y / 2.0
    }
}

/// A collectible floating over a gap
#[derive(Debug, Clone)]
pub struct Gem {
    pub kind: GemKind,
    /// Left edge (screen space)
    pub x: f32,
    /// Top edge (screen space)
    pub y: f32,
    pub size: f32,
    pub visual: Option<VisualHandle>,
}

/// One road segment
#[derive(Debug, Clone)]
pub struct Tile {
    /// Monotonic, never reused
    pub id: u64,
    /// Leading (left) edge
    pub x: f32,
    pub width: f32,
    /// Distance to the next tile's leading edge
    pub gap_after: f32,
    pub obstacles: Vec<Obstacle>,
    pub gems: Vec<Gem>,
    pub visual: Option<VisualHandle>,
}

impl Tile {
    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x && x < self.trailing_edge()
    }

    /// Move the tile and everything on it by `dx`; moving obstacles also
    /// patrol by `patrol_speed`, staying inside the tile.
    pub fn shift(&mut self, dx: f32, patrol_speed: f32) {
        self.x += dx;
        for obstacle in &mut self.obstacles {
            if obstacle.is_moving {
                let max_offset = (self.width - obstacle.size.x).max(0.0);
                let mut offset = obstacle.offset + obstacle.direction * patrol_speed;
                if offset <= 0.0 {
                    offset = 0.0;
                    obstacle.direction = 1.0;
                } else if offset >= max_offset {
                    offset = max_offset;
                    obstacle.direction = -1.0;
                }
                obstacle.offset = offset;
            }
            obstacle.x = self.x + obstacle.offset;
        }
        for gem in &mut self.gems {
            gem.x += dx;
        }
    }
}

/// Vertical/jump state of the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpPhase {
    Grounded,
    SingleJump,
    DoubleJump,
    /// Dropping through a gap; terminal once below the viewport
    Falling,
}

impl JumpPhase {
    #[inline]
    pub fn is_airborne(self) -> bool {
        matches!(self, JumpPhase::SingleJump | JumpPhase::DoubleJump)
    }
}

/// Ground movement style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gait {
    Idle,
    Walk,
    Run,
}

/// Animation state shown by the actor view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    Idle,
    Walk,
    Run,
    Jump,
    DoubleJump,
    Fall,
}

impl ActorState {
    /// Transition table: the jump phase wins over the gait
    pub fn from_phase(phase: JumpPhase, gait: Gait) -> Self {
        match (phase, gait) {
            (JumpPhase::Falling, _) => ActorState::Fall,
            (JumpPhase::SingleJump, _) => ActorState::Jump,
            (JumpPhase::DoubleJump, _) => ActorState::DoubleJump,
            (JumpPhase::Grounded, Gait::Idle) => ActorState::Idle,
            (JumpPhase::Grounded, Gait::Walk) => ActorState::Walk,
            (JumpPhase::Grounded, Gait::Run) => ActorState::Run,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActorState::Idle => "idle",
            ActorState::Walk => "walk",
            ActorState::Run => "run",
            ActorState::Jump => "jump",
            ActorState::DoubleJump => "double_jump",
            ActorState::Fall => "fall",
        }
    }
}

/// Actor motion bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorKinematics {
    /// Current scroll speed (pixels per tick)
    pub speed: f32,
    pub target_speed: f32,
    pub velocity_factor: f32,
    pub jump_phase: JumpPhase,
    pub gait: Gait,
    /// Tick the current arc started
    pub jump_start_tick: u64,
    /// Current vertical offset from the road (negative is up)
    pub jump_offset: f32,
    /// Tick of the last move key press
    pub last_move_key_tick: Option<u64>,
    pub move_key_held: bool,
    pub distance_traveled: f32,
}

impl ActorKinematics {
    pub fn new(velocity_factor: f32) -> Self {
        Self {
            speed: 0.0,
            target_speed: 0.0,
            velocity_factor,
            jump_phase: JumpPhase::Grounded,
            gait: Gait::Idle,
            jump_start_tick: 0,
            jump_offset: 0.0,
            last_move_key_tick: None,
            move_key_held: false,
            distance_traveled: 0.0,
        }
    }

    /// Exponential approach of speed toward target speed
    pub fn smooth_speed(&mut self) {
        self.speed += (self.target_speed - self.speed) * self.velocity_factor;
        if (self.target_speed - self.speed).abs() < 1e-3 {
            self.speed = self.target_speed;
        }
    }

    pub fn state(&self) -> ActorState {
        ActorState::from_phase(self.jump_phase, self.gait)
    }
}

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Running,
    Paused,
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Dropped below the viewport through a gap
    Fell,
    /// Obstacle contact with no lives to spare
    OutOfLives,
}

/// End-of-run (or running) stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub level: u32,
    pub ticks: u64,
    pub distance: f32,
    pub tiles_passed: u64,
    pub obstacles_cleared: u32,
    pub obstacles_struck: u32,
    pub gems_collected: u32,
    pub game_over: Option<GameOverReason>,
}
