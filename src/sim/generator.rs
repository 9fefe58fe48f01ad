//! Procedural level generation
//!
//! Each batch holds, for the current level:
//! - tile widths drawn from the tier's weighted percentile groups, then
//!   rescaled so the batch covers `screen_width * (6 + level)`
//! - obstacle counts per tile, keyed off the tile's width percentile
//! - one gem slot per gap (`tiles - 1`), shuffled
//!
//! [`LevelGenerator::next_tile`] walks the batch and regenerates it when the
//! cursor reaches the last traversable index, so the stream never ends.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{GemKind, ObstacleCounts, ObstacleTier};
use super::tier::{HeartSchedule, LevelTier};
use crate::consts::MAX_TIERED_LEVEL;
use crate::tuning::Tuning;

/// Tier 4-6 lays exactly this many low obstacles per batch
const INTERMEDIATE_LOW_OBSTACLES: u32 = 12;

/// What the simulator needs to lay down one tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    pub width: f32,
    pub obstacles: ObstacleCounts,
    /// Gem floating over the gap after this tile
    pub gem: Option<GemKind>,
    pub gap_to_next: f32,
    pub is_last_in_batch: bool,
    /// Level the tile's batch was generated for
    pub level: u32,
}

/// Generator state for the batch in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelState {
    pub current_level: u32,
    /// Level the current batch was generated for
    pub batch_level: u32,
    pub tile_widths: Vec<f32>,
    pub obstacle_placements: Vec<ObstacleCounts>,
    /// `tile_widths.len() - 1` entries
    pub gem_placements: Vec<Option<GemKind>>,
    pub sequence_pointer: usize,
}

/// Road tile width range before rescaling
pub fn road_tile_bounds(tuning: &Tuning, screen_width: f32) -> (f32, f32) {
    (
        tuning.min_road_tile_screens * screen_width,
        tuning.max_road_tile_screens * screen_width,
    )
}

/// Draw raw tile widths for a level (no rescale)
pub fn draw_tile_widths<R: Rng + ?Sized>(
    rng: &mut R,
    tuning: &Tuning,
    level: u32,
    screen_width: f32,
) -> Vec<f32> {
    let tier = LevelTier::for_level(level);
    let steps = tier.steps_into(level);
    let groups = tier.percentile_groups();
    let (min_width, max_width) = road_tile_bounds(tuning, screen_width);

    let mut widths = Vec::with_capacity(tier.tile_count());
    for _ in 0..tier.tile_count() {
        let group = groups
            .choose_weighted(rng, |g| g.weight)
            .unwrap_or(&groups[0]);
        let fraction = rng.random_range(group.min_fraction_at(steps)..=group.max_fraction);
        widths.push(min_width + fraction * (max_width - min_width));
    }
    widths
}

/// Target total width of one batch
#[inline]
pub fn batch_length(level: u32, screen_width: f32) -> f32 {
    screen_width * (6 + level) as f32
}

/// Tile widths for one batch, rescaled to [`batch_length`]
pub fn generate_tile_sequence<R: Rng + ?Sized>(
    rng: &mut R,
    tuning: &Tuning,
    level: u32,
    screen_width: f32,
) -> Vec<f32> {
    let widths = draw_tile_widths(rng, tuning, level, screen_width);
    let total: f32 = widths.iter().sum();
    let scale = batch_length(level, screen_width) / total;
    widths.into_iter().map(|w| w * scale).collect()
}

/// Rank of each tile's width within the batch, normalized to [0, 1]
pub fn width_percentiles(widths: &[f32]) -> Vec<f32> {
    let mut order: Vec<usize> = (0..widths.len()).collect();
    order.sort_by(|&a, &b| widths[a].total_cmp(&widths[b]));

    let denom = widths.len().saturating_sub(1).max(1) as f32;
    let mut percentiles = vec![0.0; widths.len()];
    for (rank, &index) in order.iter().enumerate() {
        percentiles[index] = rank as f32 / denom;
    }
    percentiles
}

#[inline]
fn chance(p: f32) -> f64 {
    p.clamp(0.0, 1.0) as f64
}

/// One low obstacle per tile until `total` runs out, the rest on random tiles
fn distribute_low<R: Rng + ?Sized>(rng: &mut R, counts: &mut [ObstacleCounts], total: u32) {
    if counts.is_empty() {
        return;
    }
    let guaranteed = (total as usize).min(counts.len());
    for c in counts.iter_mut().take(guaranteed) {
        c.low += 1;
    }
    for _ in guaranteed..total as usize {
        let index = rng.random_range(0..counts.len());
        counts[index].low += 1;
    }
}

/// Obstacle counts for each tile of a batch
pub fn generate_obstacle_placement<R: Rng + ?Sized>(
    rng: &mut R,
    level: u32,
    widths: &[f32],
) -> Vec<ObstacleCounts> {
    let tier = LevelTier::for_level(level);
    let level = level.min(MAX_TIERED_LEVEL);
    let percentiles = width_percentiles(widths);
    let mut counts = vec![ObstacleCounts::default(); widths.len()];

    match tier {
        LevelTier::Beginner => {
            for c in &mut counts {
                c.low = 1;
                if rng.random_bool(chance(0.1 * level as f32)) {
                    c.low += 1;
                }
            }
        }
        LevelTier::Intermediate => {
            distribute_low(rng, &mut counts, INTERMEDIATE_LOW_OBSTACLES);
            let p_mid = chance(0.2 * (level - 3) as f32);
            for c in &mut counts {
                if rng.random_bool(p_mid) {
                    c.mid += 1;
                }
            }
        }
        LevelTier::Advanced => {
            let extra = (level - 6) as f32;
            distribute_low(rng, &mut counts, 12 + (level - 6) * 2);
            for (c, &p) in counts.iter_mut().zip(&percentiles) {
                if p > 0.3 {
                    c.mid += 1;
                    if rng.random_bool(chance(0.2 * extra)) {
                        c.low += 1;
                    }
                }
                if p > 0.65 {
                    if rng.random_bool(0.5) {
                        c.mid += 1;
                    }
                    if rng.random_bool(chance(0.4 * extra)) {
                        c.high += 1;
                    }
                }
            }
        }
        LevelTier::Expert => {
            let many = 1 + (level - 9);
            for (c, &p) in counts.iter_mut().zip(&percentiles) {
                if p < 0.1 {
                    // Breather tile
                } else if p < 0.2 {
                    let pick = ObstacleTier::ALL[rng.random_range(0..ObstacleTier::ALL.len())];
                    c.add(pick, 1);
                } else if p < 0.7 {
                    *c = ObstacleCounts::new(1, 1, 1);
                } else {
                    *c = ObstacleCounts::new(many, many, many);
                }
            }
        }
    }
    counts
}

/// Gem for each gap of a batch (`tile_count - 1` entries)
pub fn generate_gem_placement<R: Rng + ?Sized>(
    rng: &mut R,
    hearts: &HeartSchedule,
    level: u32,
    tile_count: usize,
) -> Vec<Option<GemKind>> {
    let slots = tile_count.saturating_sub(1);
    let heart_count = (hearts.hearts_for(level) as usize).min(slots);
    let diamond_count = (level.saturating_sub(2) as usize).min(slots - heart_count);

    let mut gems = Vec::with_capacity(slots);
    gems.extend(std::iter::repeat_n(Some(GemKind::Heart), heart_count));
    gems.extend(std::iter::repeat_n(Some(GemKind::Diamond), diamond_count));
    gems.resize(slots, None);
    gems.shuffle(rng);
    gems
}

/// Random gap inside the level tier's jump bounds
pub fn tile_gap<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning, level: u32) -> f32 {
    let bounds = LevelTier::for_level(level).gap_bounds(tuning);
    rng.random_range(bounds.min..=bounds.max)
}

/// Endless tile stream
#[derive(Debug, Clone)]
pub struct LevelGenerator<R: Rng = Pcg32> {
    rng: R,
    tuning: Tuning,
    screen_width: f32,
    hearts: HeartSchedule,
    state: LevelState,
    batches: u64,
}

impl<R: Rng> LevelGenerator<R> {
    /// Panics on level 0, a non-positive screen width or invalid tuning
    pub fn new(tuning: Tuning, screen_width: f32, start_level: u32, mut rng: R) -> Self {
        if let Err(e) = tuning.validate() {
            panic!("invalid tuning: {e}");
        }
        assert!(
            screen_width.is_finite() && screen_width > 0.0,
            "screen width must be positive (got {screen_width})"
        );
        LevelTier::for_level(start_level);

        let hearts = HeartSchedule::generate(&mut rng);
        let mut generator = Self {
            rng,
            tuning,
            screen_width,
            hearts,
            state: LevelState {
                current_level: start_level,
                batch_level: start_level,
                tile_widths: Vec::new(),
                obstacle_placements: Vec::new(),
                gem_placements: Vec::new(),
                sequence_pointer: 0,
            },
            batches: 0,
        };
        generator.regenerate();
        generator
    }

    fn regenerate(&mut self) {
        let level = self.state.current_level;
        let widths = generate_tile_sequence(&mut self.rng, &self.tuning, level, self.screen_width);
        let obstacles = generate_obstacle_placement(&mut self.rng, level, &widths);
        let gems = generate_gem_placement(&mut self.rng, &self.hearts, level, widths.len());

        self.batches += 1;
        log::info!(
            "Level {} batch {}: {} tiles, {} obstacles, {} gems",
            level,
            self.batches,
            widths.len(),
            obstacles.iter().map(ObstacleCounts::total).sum::<u32>(),
            gems.iter().flatten().count()
        );

        self.state.batch_level = level;
        self.state.tile_widths = widths;
        self.state.obstacle_placements = obstacles;
        self.state.gem_placements = gems;
        self.state.sequence_pointer = 0;
    }

    /// Pull the next tile; starts a new batch when this one is used up
    pub fn next_tile(&mut self) -> TileDescriptor {
        let last = self.state.tile_widths.len().saturating_sub(1);
        if self.state.sequence_pointer >= last {
            log::warn!(
                "Sequence pointer {} out of range, regenerating",
                self.state.sequence_pointer
            );
            self.regenerate();
        }

        let i = self.state.sequence_pointer;
        let level = self.state.current_level;
        let mut tile = TileDescriptor {
            width: self.state.tile_widths[i],
            obstacles: self.state.obstacle_placements[i],
            gem: self.state.gem_placements[i],
            gap_to_next: tile_gap(&mut self.rng, &self.tuning, level),
            is_last_in_batch: false,
            level: self.state.batch_level,
        };

        self.state.sequence_pointer += 1;
        if self.state.sequence_pointer >= last {
            tile.is_last_in_batch = true;
            self.regenerate();
        }
        tile
    }

    /// Fresh gap for the current level, for tiles laid outside a batch
    pub fn gap(&mut self) -> f32 {
        tile_gap(&mut self.rng, &self.tuning, self.state.current_level)
    }

    /// Takes effect at the next batch
    pub fn level_up(&mut self) {
        self.state.current_level += 1;
        log::info!("Level up: {}", self.state.current_level);
    }

    pub fn level(&self) -> u32 {
        self.state.current_level
    }

    pub fn state(&self) -> &LevelState {
        &self.state
    }

    pub fn hearts(&self) -> &HeartSchedule {
        &self.hearts
    }

    pub fn screen_width(&self) -> f32 {
        self.screen_width
    }

    pub fn batches_generated(&self) -> u64 {
        self.batches
    }
}
