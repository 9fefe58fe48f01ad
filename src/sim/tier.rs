//! Difficulty tiers
//!
//! Levels come in tiers of three (1-3, 4-6, 7-9, 10-12); level 13 and later
//! stay in the last tier.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_TIERED_LEVEL;
use crate::tuning::Tuning;

/// How much each group's lower bound drops per level inside a tier
pub const MIN_FRACTION_SHRINK: f32 = 0.05;

/// Weighted slice of the [min, max] road tile width interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileGroup {
    pub weight: f32,
    pub min_fraction: f32,
    pub max_fraction: f32,
}

impl PercentileGroup {
    const fn new(weight: f32, min_fraction: f32, max_fraction: f32) -> Self {
        Self {
            weight,
            min_fraction,
            max_fraction,
        }
    }

    /// Lower bound for a level `steps` levels into its tier
    pub fn min_fraction_at(&self, steps: u32) -> f32 {
        (self.min_fraction - MIN_FRACTION_SHRINK * steps as f32).clamp(0.0, self.max_fraction)
    }
}

const BEGINNER_GROUPS: [PercentileGroup; 2] = [
    PercentileGroup::new(0.7, 0.6, 1.0),
    PercentileGroup::new(0.3, 0.3, 0.6),
];

const INTERMEDIATE_GROUPS: [PercentileGroup; 3] = [
    PercentileGroup::new(0.5, 0.5, 1.0),
    PercentileGroup::new(0.3, 0.25, 0.5),
    PercentileGroup::new(0.2, 0.1, 0.25),
];

const ADVANCED_GROUPS: [PercentileGroup; 3] = [
    PercentileGroup::new(0.4, 0.4, 1.0),
    PercentileGroup::new(0.4, 0.2, 0.4),
    PercentileGroup::new(0.2, 0.05, 0.2),
];

const EXPERT_GROUPS: [PercentileGroup; 3] = [
    PercentileGroup::new(0.3, 0.5, 1.0),
    PercentileGroup::new(0.4, 0.2, 0.5),
    PercentileGroup::new(0.3, 0.0, 0.2),
];

/// Inclusive gap range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapBounds {
    pub min: f32,
    pub max: f32,
}

impl GapBounds {
    pub fn contains(&self, gap: f32) -> bool {
        gap >= self.min && gap <= self.max
    }
}

/// Level tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelTier {
    /// Levels 1-3
    Beginner,
    /// Levels 4-6
    Intermediate,
    /// Levels 7-9
    Advanced,
    /// Levels 10+
    Expert,
}

impl LevelTier {
    /// Tier of a level. Level 0 is a caller bug.
    pub fn for_level(level: u32) -> Self {
        assert!(level >= 1, "levels start at 1 (got {level})");
        match level {
            1..=3 => LevelTier::Beginner,
            4..=6 => LevelTier::Intermediate,
            7..=9 => LevelTier::Advanced,
            _ => LevelTier::Expert,
        }
    }

    pub fn first_level(self) -> u32 {
        match self {
            LevelTier::Beginner => 1,
            LevelTier::Intermediate => 4,
            LevelTier::Advanced => 7,
            LevelTier::Expert => 10,
        }
    }

    /// Levels into the tier (0-2), saturating past the last tiered level
    pub fn steps_into(self, level: u32) -> u32 {
        (level.min(MAX_TIERED_LEVEL) - self.first_level()).min(2)
    }

    /// Tiles per generated batch
    pub fn tile_count(self) -> usize {
        match self {
            LevelTier::Beginner => 8,
            LevelTier::Intermediate => 12,
            LevelTier::Advanced => 16,
            LevelTier::Expert => 20,
        }
    }

    pub fn percentile_groups(self) -> &'static [PercentileGroup] {
        match self {
            LevelTier::Beginner => &BEGINNER_GROUPS,
            LevelTier::Intermediate => &INTERMEDIATE_GROUPS,
            LevelTier::Advanced => &ADVANCED_GROUPS,
            LevelTier::Expert => &EXPERT_GROUPS,
        }
    }

    /// Gap range: walk jumps early, run jumps from level 7, a blend between
    pub fn gap_bounds(self, tuning: &Tuning) -> GapBounds {
        let walk = tuning.walk_jump_distance();
        let run = tuning.run_jump_distance();
        let (lo, hi) = (tuning.gap_min_fraction, tuning.gap_max_fraction);
        match self {
            LevelTier::Beginner => GapBounds {
                min: walk * lo,
                max: walk * hi,
            },
            LevelTier::Intermediate => GapBounds {
                min: walk * lo,
                max: (walk * hi + run * hi) / 2.0,
            },
            LevelTier::Advanced | LevelTier::Expert => GapBounds {
                min: run * lo,
                max: run * hi,
            },
        }
    }

    /// Hearts shared out across the tier's three levels
    fn heart_budget(self) -> u32 {
        match self {
            LevelTier::Beginner => 0,
            LevelTier::Intermediate => 2,
            LevelTier::Advanced => 3,
            LevelTier::Expert => 4,
        }
    }
}

/// Most hearts any single level gets
pub const MAX_HEARTS_PER_LEVEL: u32 = 2;

/// High-value gem count per level, drawn once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartSchedule {
    /// Indexed by level; slot 0 unused
    counts: Vec<u32>,
}

impl HeartSchedule {
    /// Share each tier's budget among its levels at random, at most
    /// [`MAX_HEARTS_PER_LEVEL`] per level
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut counts = vec![0; MAX_TIERED_LEVEL as usize + 1];
        for tier in [
            LevelTier::Intermediate,
            LevelTier::Advanced,
            LevelTier::Expert,
        ] {
            let first = tier.first_level() as usize;
            for _ in 0..tier.heart_budget() {
                let open: Vec<usize> = (first..first + 3)
                    .filter(|&level| counts[level] < MAX_HEARTS_PER_LEVEL)
                    .collect();
                if open.is_empty() {
                    break;
                }
                let level = open[rng.random_range(0..open.len())];
                counts[level] += 1;
            }
        }
        Self { counts }
    }

    pub fn hearts_for(&self, level: u32) -> u32 {
        let index = level.min(MAX_TIERED_LEVEL) as usize;
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Hearts summed over a tier's levels
    pub fn tier_total(&self, tier: LevelTier) -> u32 {
        let first = tier.first_level();
        (first..first + 3).map(|level| self.hearts_for(level)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_tiers() {
        assert_eq!(LevelTier::for_level(1), LevelTier::Beginner);
        assert_eq!(LevelTier::for_level(3), LevelTier::Beginner);
        assert_eq!(LevelTier::for_level(4), LevelTier::Intermediate);
        assert_eq!(LevelTier::for_level(9), LevelTier::Advanced);
        assert_eq!(LevelTier::for_level(12), LevelTier::Expert);
        assert_eq!(LevelTier::for_level(40), LevelTier::Expert);
        assert_eq!(LevelTier::for_level(40).tile_count(), 20);
    }

    #[test]
    #[should_panic(expected = "levels start at 1")]
    fn test_level_zero_fails_fast() {
        LevelTier::for_level(0);
    }

    #[test]
    fn test_min_fraction_shrinks_within_tier() {
        let group = BEGINNER_GROUPS[0];
        let tier = LevelTier::Beginner;
        let l1 = group.min_fraction_at(tier.steps_into(1));
        let l3 = group.min_fraction_at(tier.steps_into(3));
        assert!(l3 < l1);
        assert!((l1 - l3 - 2.0 * MIN_FRACTION_SHRINK).abs() < 1e-6);
        // Past level 12 the shrink stops
        assert_eq!(
            LevelTier::Expert.steps_into(12),
            LevelTier::Expert.steps_into(30)
        );
    }

    #[test]
    fn test_group_weights_positive() {
        for tier in [
            LevelTier::Beginner,
            LevelTier::Intermediate,
            LevelTier::Advanced,
            LevelTier::Expert,
        ] {
            let groups = tier.percentile_groups();
            assert!(!groups.is_empty() && groups.len() <= 3);
            for g in groups {
                assert!(g.weight > 0.0);
                assert!(g.min_fraction <= g.max_fraction);
                assert!(g.max_fraction <= 1.0);
            }
        }
    }

    #[test]
    fn test_gap_bounds_follow_speed_tier() {
        let tuning = Tuning::default();
        let beginner = LevelTier::Beginner.gap_bounds(&tuning);
        let blended = LevelTier::Intermediate.gap_bounds(&tuning);
        let advanced = LevelTier::Advanced.gap_bounds(&tuning);
        assert!(beginner.max < tuning.walk_jump_distance());
        assert!(advanced.max < tuning.run_jump_distance());
        assert!(blended.max > beginner.max && blended.max < advanced.max);
        assert_eq!(advanced, LevelTier::Expert.gap_bounds(&tuning));
    }

    #[test]
    fn test_heart_schedule_caps() {
        for seed in 0..50 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let schedule = HeartSchedule::generate(&mut rng);
            for level in 1..=MAX_TIERED_LEVEL {
                assert!(schedule.hearts_for(level) <= MAX_HEARTS_PER_LEVEL);
            }
            assert_eq!(schedule.tier_total(LevelTier::Beginner), 0);
            assert_eq!(schedule.tier_total(LevelTier::Intermediate), 2);
            assert_eq!(schedule.tier_total(LevelTier::Advanced), 3);
            assert_eq!(schedule.tier_total(LevelTier::Expert), 4);
            assert_eq!(schedule.hearts_for(25), schedule.hearts_for(12));
        }
    }
}
