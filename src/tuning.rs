//! Data-driven game balance
//!
//! Every number the generator and simulator need that is not part of the
//! level tier tables lives here. Values load from JSON with per-field
//! defaults so older config files keep working.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::secs_to_ticks;
use crate::sim::state::ObstacleTier;

/// Tuning validation failure
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("{name} must be positive and finite (got {value})")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must lie in [0, 1] (got {value})")]
    NotFraction { name: &'static str, value: f32 },
    #[error("{low_name} ({low}) must be below {high_name} ({high})")]
    Inverted {
        low_name: &'static str,
        low: f32,
        high_name: &'static str,
        high: f32,
    },
    #[error("start_lives ({start}) must be between 1 and max_lives ({max})")]
    Lives { start: u32, max: u32 },
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_walk_speed() -> f32 {
    5.0
}
fn default_run_speed() -> f32 {
    9.0
}
fn default_velocity_factor() -> f32 {
    0.1
}
fn default_double_press_secs() -> f32 {
    0.3
}
fn default_jump_duration_secs() -> f32 {
    0.8
}
fn default_jump_peak_height() -> f32 {
    120.0
}
fn default_fall_speed() -> f32 {
    12.0
}
fn default_level_distance_screens() -> f32 {
    3.0
}
fn default_ground_height() -> f32 {
    120.0
}
fn default_actor_x_fraction() -> f32 {
    0.2
}
fn default_actor_size() -> (f32, f32) {
    (60.0, 90.0)
}
fn default_fall_threshold() -> f32 {
    0.5
}
fn default_collision_threshold() -> f32 {
    0.8
}
fn default_obstacle_sizes() -> [(f32, f32); 3] {
    [(40.0, 40.0), (50.0, 60.0), (60.0, 90.0)]
}
fn default_obstacle_patrol_speed() -> f32 {
    1.5
}
fn default_min_road_tile_screens() -> f32 {
    0.3
}
fn default_max_road_tile_screens() -> f32 {
    1.2
}
fn default_gap_min_fraction() -> f32 {
    0.35
}
fn default_gap_max_fraction() -> f32 {
    0.7
}
fn default_gem_float_height() -> f32 {
    60.0
}
fn default_gem_size() -> f32 {
    32.0
}
fn default_start_lives() -> u32 {
    5
}
fn default_max_lives() -> u32 {
    5
}
fn default_life_costs() -> [u32; 3] {
    [1, 2, 3]
}
fn default_jump_bonus() -> [u64; 3] {
    [10, 20, 40]
}
fn default_tile_score() -> u64 {
    10
}
fn default_diamond_score() -> u64 {
    50
}

/// Serializable balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Walking speed (pixels per tick)
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f32,
    /// Running speed (pixels per tick)
    #[serde(default = "default_run_speed")]
    pub run_speed: f32,
    /// Exponential smoothing factor toward target speed (0-1]
    #[serde(default = "default_velocity_factor")]
    pub velocity_factor: f32,
    /// Two move key presses within this window start a run
    #[serde(default = "default_double_press_secs")]
    pub double_press_secs: f32,
    /// Airtime of one jump arc
    #[serde(default = "default_jump_duration_secs")]
    pub jump_duration_secs: f32,
    /// Apex height of a single jump (doubled for a double jump)
    #[serde(default = "default_jump_peak_height")]
    pub jump_peak_height: f32,
    /// Vertical speed while falling through a gap (pixels per tick)
    #[serde(default = "default_fall_speed")]
    pub fall_speed: f32,
    /// Distance per level, in screen widths
    #[serde(default = "default_level_distance_screens")]
    pub level_distance_screens: f32,
    /// Height of the road surface above the viewport floor
    #[serde(default = "default_ground_height")]
    pub ground_height: f32,
    /// Actor's fixed left edge, as a fraction of screen width
    #[serde(default = "default_actor_x_fraction")]
    pub actor_x_fraction: f32,
    /// Fallback actor size when the view reports nothing usable
    #[serde(default = "default_actor_size")]
    pub actor_size: (f32, f32),
    /// Fallback fall threshold (fraction of actor width from its left edge)
    #[serde(default = "default_fall_threshold")]
    pub fall_threshold: f32,
    /// Fallback collision box scale
    #[serde(default = "default_collision_threshold")]
    pub collision_threshold: f32,
    /// Fallback obstacle (width, height) per tier: low, mid, high
    #[serde(default = "default_obstacle_sizes")]
    pub obstacle_sizes: [(f32, f32); 3],
    /// Horizontal speed of moving obstacles (pixels per tick)
    #[serde(default = "default_obstacle_patrol_speed")]
    pub obstacle_patrol_speed: f32,
    /// Smallest road tile, in screen widths (before batch rescale)
    #[serde(default = "default_min_road_tile_screens")]
    pub min_road_tile_screens: f32,
    /// Largest road tile, in screen widths (before batch rescale)
    #[serde(default = "default_max_road_tile_screens")]
    pub max_road_tile_screens: f32,
    /// Shortest gap as a fraction of the tier's jump distance
    #[serde(default = "default_gap_min_fraction")]
    pub gap_min_fraction: f32,
    /// Longest gap as a fraction of the tier's jump distance
    #[serde(default = "default_gap_max_fraction")]
    pub gap_max_fraction: f32,
    /// Height of a gem's top edge above the road
    #[serde(default = "default_gem_float_height")]
    pub gem_float_height: f32,
    /// Gem bounding square side
    #[serde(default = "default_gem_size")]
    pub gem_size: f32,
    #[serde(default = "default_start_lives")]
    pub start_lives: u32,
    #[serde(default = "default_max_lives")]
    pub max_lives: u32,
    /// Lives lost on contact, per obstacle tier
    #[serde(default = "default_life_costs")]
    pub life_costs: [u32; 3],
    /// Score for clearing an obstacle, per obstacle tier
    #[serde(default = "default_jump_bonus")]
    pub jump_bonus: [u64; 3],
    /// Score per tile id passed
    #[serde(default = "default_tile_score")]
    pub tile_score: u64,
    /// Score for a low-value gem
    #[serde(default = "default_diamond_score")]
    pub diamond_score: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            walk_speed: default_walk_speed(),
            run_speed: default_run_speed(),
            velocity_factor: default_velocity_factor(),
            double_press_secs: default_double_press_secs(),
            jump_duration_secs: default_jump_duration_secs(),
            jump_peak_height: default_jump_peak_height(),
            fall_speed: default_fall_speed(),
            level_distance_screens: default_level_distance_screens(),
            ground_height: default_ground_height(),
            actor_x_fraction: default_actor_x_fraction(),
            actor_size: default_actor_size(),
            fall_threshold: default_fall_threshold(),
            collision_threshold: default_collision_threshold(),
            obstacle_sizes: default_obstacle_sizes(),
            obstacle_patrol_speed: default_obstacle_patrol_speed(),
            min_road_tile_screens: default_min_road_tile_screens(),
            max_road_tile_screens: default_max_road_tile_screens(),
            gap_min_fraction: default_gap_min_fraction(),
            gap_max_fraction: default_gap_max_fraction(),
            gem_float_height: default_gem_float_height(),
            gem_size: default_gem_size(),
            start_lives: default_start_lives(),
            max_lives: default_max_lives(),
            life_costs: default_life_costs(),
            jump_bonus: default_jump_bonus(),
            tile_score: default_tile_score(),
            diamond_score: default_diamond_score(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning file body
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check ranges the generator and simulator rely on
    pub fn validate(&self) -> Result<(), TuningError> {
        let positives = [
            ("walk_speed", self.walk_speed),
            ("run_speed", self.run_speed),
            ("velocity_factor", self.velocity_factor),
            ("double_press_secs", self.double_press_secs),
            ("jump_duration_secs", self.jump_duration_secs),
            ("jump_peak_height", self.jump_peak_height),
            ("fall_speed", self.fall_speed),
            ("level_distance_screens", self.level_distance_screens),
            ("actor_width", self.actor_size.0),
            ("actor_height", self.actor_size.1),
            ("min_road_tile_screens", self.min_road_tile_screens),
            ("max_road_tile_screens", self.max_road_tile_screens),
            ("gap_min_fraction", self.gap_min_fraction),
            ("gem_size", self.gem_size),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NotPositive { name, value });
            }
        }
        for (i, &(w, h)) in self.obstacle_sizes.iter().enumerate() {
            let name = ObstacleTier::ALL[i].as_str();
            for value in [w, h] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(TuningError::NotPositive { name, value });
                }
            }
        }

        let fractions = [
            ("velocity_factor", self.velocity_factor),
            ("actor_x_fraction", self.actor_x_fraction),
            ("fall_threshold", self.fall_threshold),
            ("collision_threshold", self.collision_threshold),
            ("gap_max_fraction", self.gap_max_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::NotFraction { name, value });
            }
        }

        let ordered = [
            ("walk_speed", self.walk_speed, "run_speed", self.run_speed),
            (
                "min_road_tile_screens",
                self.min_road_tile_screens,
                "max_road_tile_screens",
                self.max_road_tile_screens,
            ),
            (
                "gap_min_fraction",
                self.gap_min_fraction,
                "gap_max_fraction",
                self.gap_max_fraction,
            ),
        ];
        for (low_name, low, high_name, high) in ordered {
            if low >= high {
                return Err(TuningError::Inverted {
                    low_name,
                    low,
                    high_name,
                    high,
                });
            }
        }

        if self.start_lives == 0 || self.start_lives > self.max_lives {
            return Err(TuningError::Lives {
                start: self.start_lives,
                max: self.max_lives,
            });
        }
        Ok(())
    }

    /// Airtime of one jump in ticks
    pub fn jump_ticks(&self) -> u64 {
        secs_to_ticks(self.jump_duration_secs)
    }

    /// Double-press window in ticks
    pub fn double_press_ticks(&self) -> u64 {
        secs_to_ticks(self.double_press_secs)
    }

    /// Horizontal distance covered by one jump at walking speed
    pub fn walk_jump_distance(&self) -> f32 {
        self.walk_speed * self.jump_ticks() as f32
    }

    /// Horizontal distance covered by one jump at running speed
    pub fn run_jump_distance(&self) -> f32 {
        self.run_speed * self.jump_ticks() as f32
    }

    /// Lives lost touching an obstacle of this tier
    pub fn life_cost(&self, tier: ObstacleTier) -> u32 {
        self.life_costs[tier.index()]
    }

    /// Score for clearing an obstacle of this tier
    pub fn jump_bonus(&self, tier: ObstacleTier) -> u64 {
        self.jump_bonus[tier.index()]
    }

    /// Fallback (width, height) of an obstacle tier
    pub fn obstacle_size(&self, tier: ObstacleTier) -> (f32, f32) {
        self.obstacle_sizes[tier.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "run_speed": 11.0 }"#).unwrap();
        assert_eq!(tuning.run_speed, 11.0);
        assert_eq!(tuning.walk_speed, default_walk_speed());
    }

    #[test]
    fn test_inverted_speeds_rejected() {
        let err = Tuning::from_json(r#"{ "walk_speed": 10.0, "run_speed": 4.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Inverted { low_name: "walk_speed", .. }));
    }

    #[test]
    fn test_gap_longer_than_jump_rejected() {
        let err = Tuning::from_json(r#"{ "gap_max_fraction": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::NotFraction {
                name: "gap_max_fraction",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_lives_rejected() {
        let tuning = Tuning {
            start_lives: 0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Lives { start: 0, max: 5 })
        ));
    }

    #[test]
    fn test_jump_distances() {
        let tuning = Tuning::default();
        assert_eq!(tuning.jump_ticks(), 48);
        assert!((tuning.walk_jump_distance() - 240.0).abs() < 1e-3);
        assert!(tuning.run_jump_distance() > tuning.walk_jump_distance());
    }

    #[test]
    fn test_life_cost_grows_with_tier() {
        let tuning = Tuning::default();
        assert!(tuning.life_cost(ObstacleTier::High) > tuning.life_cost(ObstacleTier::Mid));
        assert!(tuning.life_cost(ObstacleTier::Mid) > tuning.life_cost(ObstacleTier::Low));
    }
}
