//! Per-frame runner simulation
//!
//! One [`RunnerSimulator::tick`] per display frame. Order inside a tick:
//! input intention, kinematics, scroll, fall/collision checks, scoring,
//! tile recycling/extension, downstream notifications.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::arc::JumpArc;
use super::collision::{Aabb, ObstacleContact, classify_obstacle, fall_threshold_x, find_gap};
use super::generator::{LevelGenerator, TileDescriptor};
use super::state::{
    ActorKinematics, ActorState, Gait, GameOverReason, Gem, GemKind, JumpPhase, Obstacle,
    ObstacleTier, RunPhase, RunSummary, Tile,
};
use super::tier::LevelTier;
use crate::platform::{GeometryProvider, Platform};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Tiles are kept spawned this many screen widths past the right edge
pub const SPAWN_LOOKAHEAD_SCREENS: f32 = 2.0;

/// Move key edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Pressed,
    Released,
}

/// Input intentions gathered since the last tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_key: Option<KeyEdge>,
    pub jump: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Whether obstacles of this tier patrol their tile at this level
pub fn obstacle_moves(level: u32, tier: ObstacleTier) -> bool {
    match LevelTier::for_level(level) {
        LevelTier::Beginner => false,
        LevelTier::Intermediate => tier == ObstacleTier::Low,
        LevelTier::Advanced | LevelTier::Expert => tier != ObstacleTier::High,
    }
}

/// Rolling tile window plus actor physics
#[derive(Debug)]
pub struct RunnerSimulator<R: Rng = Pcg32> {
    tuning: Tuning,
    /// Viewport (width, height)
    screen: Vec2,
    generator: LevelGenerator<R>,
    tiles: VecDeque<Tile>,
    /// Trailing edge of the last retired tile, scrolled with the window
    retired_edge: Option<f32>,
    next_tile_id: u64,
    /// Actor top-left corner
    actor_pos: Vec2,
    actor_size: Vec2,
    kin: ActorKinematics,
    /// Last state name pushed to the view
    shown_state: Option<ActorState>,
    phase: RunPhase,
    time_ticks: u64,
    next_level_at: f32,
    last_credited_tile: u64,
    summary: RunSummary,
    started: bool,
    geometry_warned: bool,
}

impl RunnerSimulator<Pcg32> {
    /// Simulator with a PCG generator seeded from `seed`
    pub fn with_seed(tuning: Tuning, settings: &Settings, screen: Vec2, seed: u64) -> Self {
        Self::new(tuning, settings, screen, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> RunnerSimulator<R> {
    /// Panics on a degenerate viewport
    pub fn new(tuning: Tuning, settings: &Settings, screen: Vec2, rng: R) -> Self {
        assert!(
            screen.y.is_finite() && screen.y > tuning.ground_height,
            "viewport height {} must exceed ground height {}",
            screen.y,
            tuning.ground_height
        );
        let start_level = settings.start_level();
        let generator = LevelGenerator::new(tuning.clone(), screen.x, start_level, rng);
        let actor_size = Vec2::new(tuning.actor_size.0, tuning.actor_size.1);
        let ground = screen.y - tuning.ground_height;

        Self {
            actor_pos: Vec2::new(screen.x * tuning.actor_x_fraction, ground - actor_size.y),
            actor_size,
            kin: ActorKinematics::new(tuning.velocity_factor),
            next_level_at: tuning.level_distance_screens * screen.x,
            summary: RunSummary {
                level: start_level,
                ..Default::default()
            },
            tuning,
            screen,
            generator,
            tiles: VecDeque::new(),
            retired_edge: None,
            next_tile_id: 0,
            shown_state: None,
            phase: RunPhase::Running,
            time_ticks: 0,
            last_credited_tile: 0,
            started: false,
            geometry_warned: false,
        }
    }

    /// Lay the runway and fill the window. Called by the first tick if the
    /// driver has not done so.
    pub fn start<P: Platform>(&mut self, platform: &mut P) {
        if self.started {
            return;
        }
        self.started = true;

        let size = platform.size();
        if size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0 {
            self.actor_size = size;
        } else {
            log::warn!("Actor view reported size {size:?}, using tuning size");
        }
        self.actor_pos.y = self.ground_y() - self.actor_size.y;

        // Runway: one obstacle-free screen so the run starts on solid ground
        let runway = TileDescriptor {
            width: self.screen.x,
            obstacles: Default::default(),
            gem: None,
            gap_to_next: self.generator.gap(),
            is_last_in_batch: false,
            level: self.generator.level(),
        };
        self.spawn_tile(runway, platform);
        self.extend_frontier(platform);

        platform.set_scroll_speed(0.0);
        self.sync_view(platform);
        log::info!(
            "Run started at level {} with {} tiles",
            self.generator.level(),
            self.tiles.len()
        );
    }

    /// Advance one frame
    pub fn tick<P: Platform>(&mut self, input: &TickInput, platform: &mut P) -> RunPhase {
        if !self.started {
            self.start(platform);
        }

        if input.pause {
            match self.phase {
                RunPhase::Running => {
                    self.phase = RunPhase::Paused;
                    platform.set_scroll_speed(0.0);
                    return self.phase;
                }
                RunPhase::Paused => self.phase = RunPhase::Running,
                RunPhase::GameOver => {}
            }
        }
        if self.phase != RunPhase::Running {
            return self.phase;
        }

        self.time_ticks += 1;
        self.summary.ticks = self.time_ticks;
        self.apply_input(input);

        self.advance_distance(platform);

        if self.kin.jump_phase == JumpPhase::Falling {
            self.actor_pos.y += self.tuning.fall_speed;
            if self.actor_pos.y > self.screen.y {
                self.end_run(GameOverReason::Fell, platform);
            }
            self.sync_view(platform);
            return self.phase;
        }

        self.kin.smooth_speed();
        self.update_jump();

        let speed = self.kin.speed;
        let patrol = self.tuning.obstacle_patrol_speed;
        for tile in &mut self.tiles {
            tile.shift(-speed, patrol);
        }
        if let Some(edge) = &mut self.retired_edge {
            *edge -= speed;
        }

        let airborne = self.kin.jump_phase.is_airborne();
        if !airborne {
            self.detect_fall(platform);
        }
        if self.kin.jump_phase != JumpPhase::Falling {
            self.resolve_obstacles(airborne, platform);
            self.collect_gems(platform);
        }
        if self.phase == RunPhase::GameOver {
            self.sync_view(platform);
            return self.phase;
        }

        self.credit_progress(platform);
        self.retire_tiles(platform);
        self.extend_frontier(platform);

        platform.set_scroll_speed(self.kin.speed);
        self.sync_view(platform);
        self.phase
    }

    fn apply_input(&mut self, input: &TickInput) {
        if self.kin.jump_phase == JumpPhase::Falling {
            return;
        }
        let now = self.time_ticks;

        match input.move_key {
            Some(KeyEdge::Pressed) if !self.kin.move_key_held => {
                let double_press = self
                    .kin
                    .last_move_key_tick
                    .is_some_and(|t| now - t <= self.tuning.double_press_ticks());
                if double_press {
                    self.kin.target_speed = self.tuning.run_speed;
                    self.kin.gait = Gait::Run;
                } else {
                    self.kin.target_speed = self.tuning.walk_speed;
                    self.kin.gait = Gait::Walk;
                }
                self.kin.last_move_key_tick = Some(now);
                self.kin.move_key_held = true;
            }
            Some(KeyEdge::Released) => {
                self.kin.move_key_held = false;
                self.kin.target_speed = 0.0;
                self.kin.gait = Gait::Idle;
            }
            _ => {}
        }

        if input.jump {
            match self.kin.jump_phase {
                JumpPhase::Grounded => {
                    self.kin.jump_phase = JumpPhase::SingleJump;
                    self.kin.jump_start_tick = now;
                }
                // Same clock, doubled peak
                JumpPhase::SingleJump => self.kin.jump_phase = JumpPhase::DoubleJump,
                JumpPhase::DoubleJump | JumpPhase::Falling => {}
            }
        }
    }

    fn advance_distance<P: Platform>(&mut self, platform: &mut P) {
        self.kin.distance_traveled += self.kin.speed;
        self.summary.distance = self.kin.distance_traveled;

        let per_level = self.tuning.level_distance_screens * self.screen.x;
        while self.kin.distance_traveled > self.next_level_at {
            self.generator.level_up();
            self.next_level_at += per_level;
            let level = self.generator.level();
            self.summary.level = level;
            platform.level_up(level);
        }
    }

    /// Arc for the current airborne phase
    pub fn current_arc(&self) -> Option<JumpArc> {
        let ticks = self.tuning.jump_ticks();
        let peak = self.tuning.jump_peak_height;
        match self.kin.jump_phase {
            JumpPhase::SingleJump => Some(JumpArc::single(peak, self.kin.jump_start_tick, ticks)),
            JumpPhase::DoubleJump => Some(JumpArc::double(peak, self.kin.jump_start_tick, ticks)),
            JumpPhase::Grounded | JumpPhase::Falling => None,
        }
    }

    fn update_jump(&mut self) {
        if let Some(arc) = self.current_arc() {
            self.kin.jump_offset = arc.offset(self.time_ticks);
            if arc.is_complete(self.time_ticks) {
                self.kin.jump_phase = JumpPhase::Grounded;
                self.kin.jump_offset = 0.0;
                self.kin.gait = self.gait_for_target();
            }
        }
        self.actor_pos.y = self.ground_y() - self.actor_size.y + self.kin.jump_offset;
    }

    fn gait_for_target(&self) -> Gait {
        if self.kin.target_speed <= 0.0 {
            Gait::Idle
        } else if self.kin.target_speed >= self.tuning.run_speed {
            Gait::Run
        } else {
            Gait::Walk
        }
    }

    fn detect_fall<P: Platform>(&mut self, platform: &P) {
        let threshold = self.fall_threshold(platform);
        let x = fall_threshold_x(self.actor_pos.x, self.actor_size.x, threshold);
        let Some(edge) = find_gap(&self.tiles, x, self.retired_edge) else {
            return;
        };

        log::info!("Fell into the gap at {edge:.0}");
        self.actor_pos.x = edge - self.actor_size.x / 2.0;
        self.kin.jump_phase = JumpPhase::Falling;
        self.kin.speed = 0.0;
        self.kin.target_speed = 0.0;
        self.kin.move_key_held = false;
    }

    fn resolve_obstacles<P: Platform>(&mut self, airborne: bool, platform: &mut P) {
        let actor_box = self.actor_box().scaled(self.collision_threshold(&*platform));

        let mut charges = Vec::new();
        for tile in &mut self.tiles {
            for obstacle in &mut tile.obstacles {
                match classify_obstacle(&actor_box, airborne, obstacle) {
                    ObstacleContact::Cleared => {
                        obstacle.jumped_over = true;
                        self.summary.obstacles_cleared += 1;
                        platform.add_score(self.tuning.jump_bonus(obstacle.tier));
                    }
                    ObstacleContact::Struck => {
                        obstacle.struck = true;
                        self.summary.obstacles_struck += 1;
                        charges.push(self.tuning.life_cost(obstacle.tier));
                    }
                    ObstacleContact::None => {}
                }
            }
        }

        for cost in charges {
            if !platform.apply_life_cost(cost) {
                self.end_run(GameOverReason::OutOfLives, platform);
                break;
            }
        }
    }

    fn collect_gems<P: Platform>(&mut self, platform: &mut P) {
        let actor_box = self.actor_box().scaled(self.collision_threshold(&*platform));

        for tile in &mut self.tiles {
            let mut i = 0;
            while i < tile.gems.len() {
                if !actor_box.overlaps(&Aabb::from(&tile.gems[i])) {
                    i += 1;
                    continue;
                }
                let gem = tile.gems.swap_remove(i);
                match gem.kind {
                    GemKind::Diamond => platform.add_score(self.tuning.diamond_score),
                    GemKind::Heart => platform.add_life(1),
                }
                if let Some(handle) = gem.visual {
                    platform.destroy(handle);
                }
                self.summary.gems_collected += 1;
            }
        }
    }

    fn credit_progress<P: Platform>(&mut self, platform: &mut P) {
        let x = self.actor_pos.x;
        let Some(tile) = self.tiles.iter().find(|t| t.contains_x(x)) else {
            return;
        };
        if tile.id > self.last_credited_tile {
            let skipped = tile.id - self.last_credited_tile;
            self.last_credited_tile = tile.id;
            self.summary.tiles_passed += skipped;
            platform.add_score(self.tuning.tile_score * skipped);
        }
    }

    fn retire_tiles<P: Platform>(&mut self, platform: &mut P) {
        while self.tiles.front().is_some_and(|t| t.trailing_edge() <= 0.0) {
            let Some(tile) = self.tiles.pop_front() else {
                break;
            };
            for handle in tile
                .obstacles
                .iter()
                .filter_map(|o| o.visual)
                .chain(tile.gems.iter().filter_map(|g| g.visual))
                .chain(tile.visual)
            {
                platform.destroy(handle);
            }
            self.retired_edge = Some(tile.trailing_edge());
            log::debug!("Retired tile {}", tile.id);
        }
    }

    fn extend_frontier<P: Platform>(&mut self, platform: &mut P) {
        let horizon = self.screen.x * (1.0 + SPAWN_LOOKAHEAD_SCREENS);
        while self.tiles.back().is_none_or(|t| t.trailing_edge() < horizon) {
            let descriptor = self.generator.next_tile();
            self.spawn_tile(descriptor, platform);
        }
    }

    fn spawn_tile<P: Platform>(&mut self, descriptor: TileDescriptor, platform: &mut P) {
        let x = self
            .tiles
            .back()
            .map_or(0.0, |t| t.trailing_edge() + t.gap_after);
        let ground = self.ground_y();
        let id = self.next_tile_id;
        self.next_tile_id += 1;

        let mut tile = Tile {
            id,
            x,
            width: descriptor.width,
            gap_after: descriptor.gap_to_next,
            obstacles: Vec::new(),
            gems: Vec::new(),
            visual: None,
        };

        let tiers = descriptor.obstacles.expand();
        let spacing = descriptor.width / (tiers.len() + 1) as f32;
        for (i, tier) in tiers.into_iter().enumerate() {
            let size = self.obstacle_size(&*platform, tier);
            let center = spacing * (i + 1) as f32;
            let offset = (center - size.x / 2.0).clamp(0.0, (descriptor.width - size.x).max(0.0));
            let mut obstacle = Obstacle {
                tier,
                x: x + offset,
                y: ground - size.y,
                size,
                offset,
                is_moving: obstacle_moves(descriptor.level, tier),
                direction: if i % 2 == 0 { 1.0 } else { -1.0 },
                jumped_over: false,
                struck: false,
                visual: None,
            };
            obstacle.visual = Some(platform.create_obstacle_visual(&obstacle));
            tile.obstacles.push(obstacle);
        }

        if let Some(kind) = descriptor.gem {
            let size = self.tuning.gem_size;
            let center = tile.trailing_edge() + descriptor.gap_to_next / 2.0;
            let mut gem = Gem {
                kind,
                x: center - size / 2.0,
                y: ground - self.tuning.gem_float_height,
                size,
                visual: None,
            };
            gem.visual = Some(platform.create_gem_visual(&gem));
            tile.gems.push(gem);
        }

        tile.visual = Some(platform.create_tile_visual(&tile));
        log::debug!(
            "Spawned tile {} at {:.0} (w={:.0}, obstacles={}, gem={:?})",
            id,
            x,
            descriptor.width,
            tile.obstacles.len(),
            descriptor.gem
        );
        self.tiles.push_back(tile);
    }

    fn end_run<P: Platform>(&mut self, reason: GameOverReason, platform: &mut P) {
        if self.phase == RunPhase::GameOver {
            return;
        }
        self.phase = RunPhase::GameOver;
        self.summary.game_over = Some(reason);
        platform.set_scroll_speed(0.0);
        platform.game_over(reason);
        log::info!(
            "Game over ({:?}) at level {}, {:.0}px",
            reason,
            self.generator.level(),
            self.kin.distance_traveled
        );
    }

    fn sync_view<P: Platform>(&mut self, platform: &mut P) {
        platform.set_position(self.actor_pos);
        let state = self.kin.state();
        if self.shown_state != Some(state) {
            if !platform.set_state(state.as_str()) {
                log::warn!("Actor view does not know state '{}'", state.as_str());
            }
            self.shown_state = Some(state);
        }
    }

    fn warn_geometry(&mut self, what: &str, value: f32) {
        if !self.geometry_warned {
            log::warn!("Geometry provider returned {what} = {value}, using tuning value");
            self.geometry_warned = true;
        }
    }

    fn fall_threshold(&mut self, geometry: &impl GeometryProvider) -> f32 {
        let value = geometry.fall_threshold();
        if (0.0..=1.0).contains(&value) {
            value
        } else {
            self.warn_geometry("fall threshold", value);
            self.tuning.fall_threshold
        }
    }

    fn collision_threshold(&mut self, geometry: &impl GeometryProvider) -> f32 {
        let value = geometry.collision_threshold();
        if value.is_finite() && value > 0.0 {
            value
        } else {
            self.warn_geometry("collision threshold", value);
            self.tuning.collision_threshold
        }
    }

    fn obstacle_size(&mut self, geometry: &impl GeometryProvider, tier: ObstacleTier) -> Vec2 {
        let size = geometry.obstacle_size(tier);
        if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
            size
        } else {
            self.warn_geometry("obstacle width", size.x);
            let (w, h) = self.tuning.obstacle_size(tier);
            Vec2::new(w, h)
        }
    }

    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.screen.y - self.tuning.ground_height
    }

    pub fn actor_box(&self) -> Aabb {
        Aabb::from_rect(self.actor_pos, self.actor_size)
    }

    /// Distance from the fall-threshold point to the edge of the tile under it
    pub fn distance_to_gap(&self) -> Option<f32> {
        let x = fall_threshold_x(self.actor_pos.x, self.actor_size.x, self.tuning.fall_threshold);
        self.tiles
            .iter()
            .find(|t| t.trailing_edge() >= x)
            .map(|t| t.trailing_edge() - x)
    }

    /// Distance from the actor's right edge to the nearest live obstacle ahead
    pub fn distance_to_obstacle(&self) -> Option<f32> {
        let front = self.actor_pos.x + self.actor_size.x;
        self.tiles
            .iter()
            .flat_map(|t| t.obstacles.iter())
            .filter(|o| !o.jumped_over && !o.struck && o.x + o.size.x > self.actor_pos.x)
            .map(|o| (o.x - front).max(0.0))
            .min_by(f32::total_cmp)
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.generator.level()
    }

    pub fn tiles(&self) -> &VecDeque<Tile> {
        &self.tiles
    }

    pub fn kinematics(&self) -> &ActorKinematics {
        &self.kin
    }

    pub fn actor_pos(&self) -> Vec2 {
        self.actor_pos
    }

    pub fn actor_size(&self) -> Vec2 {
        self.actor_size
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn generator(&self) -> &LevelGenerator<R> {
        &self.generator
    }

    pub fn summary(&self) -> RunSummary {
        self.summary.clone()
    }
}
