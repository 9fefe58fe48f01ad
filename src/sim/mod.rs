//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Tiles kept in spawn order
//! - Rendering, storage and audio only through `crate::platform`

pub mod arc;
pub mod autopilot;
pub mod collision;
pub mod generator;
pub mod state;
pub mod tick;
pub mod tier;

pub use arc::{JumpArc, arc_offset};
pub use autopilot::Autopilot;
pub use collision::{Aabb, ObstacleContact, classify_obstacle, find_gap};
pub use generator::{LevelGenerator, LevelState, TileDescriptor};
pub use state::{
    ActorKinematics, ActorState, Gait, GameOverReason, Gem, GemKind, JumpPhase, Obstacle,
    ObstacleCounts, ObstacleTier, RunPhase, RunSummary, Tile,
};
pub use tick::{KeyEdge, RunnerSimulator, TickInput};
pub use tier::{HeartSchedule, LevelTier};
