//! Collision and fall detection
//!
//! Screen space, y grows downward. Boxes are axis aligned.

use glam::Vec2;

use super::state::{Gem, Obstacle, Tile};

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// From top-left corner and size
    pub fn from_rect(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrink (or grow) about the center
    pub fn scaled(&self, factor: f32) -> Self {
        let center = self.center();
        let half = (self.max - self.min) * 0.5 * factor;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict horizontal overlap (touching edges do not count)
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x
    }

    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        self.min.y < other.max.y && other.min.y < self.max.y
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }
}

impl From<&Obstacle> for Aabb {
    fn from(obstacle: &Obstacle) -> Self {
        Aabb::from_rect(Vec2::new(obstacle.x, obstacle.y), obstacle.size)
    }
}

impl From<&Gem> for Aabb {
    fn from(gem: &Gem) -> Self {
        Aabb::from_rect(Vec2::new(gem.x, gem.y), Vec2::splat(gem.size))
    }
}

/// Point on the actor used for gap detection
#[inline]
pub fn fall_threshold_x(actor_x: f32, actor_width: f32, fall_threshold: f32) -> f32 {
    actor_x + actor_width * fall_threshold
}

/// Left edge of the gap containing `x`, if any.
///
/// `x` must lie strictly between one tile's trailing edge and the next
/// tile's leading edge. `retired_edge` is the trailing edge of the last tile
/// already dropped from the window, so the space in front of the first
/// remaining tile is a gap too. Tiles must be ordered left to right.
pub fn find_gap<'a, I>(tiles: I, x: f32, retired_edge: Option<f32>) -> Option<f32>
where
    I: IntoIterator<Item = &'a Tile>,
{
    let mut prev_trailing = retired_edge;
    for tile in tiles {
        if let Some(trailing) = prev_trailing {
            if x > trailing && x < tile.x {
                return Some(trailing);
            }
        }
        prev_trailing = Some(tile.trailing_edge());
    }
    None
}

/// Feet strictly above the obstacle's vertical midpoint
#[inline]
pub fn clears(actor_bottom: f32, obstacle: &Obstacle) -> bool {
    actor_bottom < obstacle.mid_y()
}

/// What an obstacle contact means this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleContact {
    None,
    /// Airborne, over the obstacle with clearance, not yet credited
    Cleared,
    /// Grounded overlap, not yet charged
    Struck,
}

/// Classify the actor against one obstacle.
///
/// `actor_box` is already scaled by the collision threshold. Obstacles are
/// never struck while airborne.
pub fn classify_obstacle(actor_box: &Aabb, airborne: bool, obstacle: &Obstacle) -> ObstacleContact {
    let obstacle_box = Aabb::from(obstacle);
    if airborne {
        if !obstacle.jumped_over
            && !obstacle.struck
            && actor_box.overlaps_x(&obstacle_box)
            && clears(actor_box.max.y, obstacle)
        {
            return ObstacleContact::Cleared;
        }
        return ObstacleContact::None;
    }
    if !obstacle.struck && actor_box.overlaps(&obstacle_box) {
        return ObstacleContact::Struck;
    }
    ObstacleContact::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObstacleTier;
    use proptest::prelude::*;

    fn tile(id: u64, x: f32, width: f32) -> Tile {
        Tile {
            id,
            x,
            width,
            gap_after: 0.0,
            obstacles: Vec::new(),
            gems: Vec::new(),
            visual: None,
        }
    }

    fn obstacle_at(x: f32, ground: f32, size: Vec2) -> Obstacle {
        Obstacle {
            tier: ObstacleTier::Mid,
            x,
            y: ground - size.y,
            size,
            offset: 0.0,
            is_moving: false,
            direction: 1.0,
            jumped_over: false,
            struck: false,
            visual: None,
        }
    }

    #[test]
    fn test_scaled_box() {
        let b = Aabb::from_rect(Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0)).scaled(0.5);
        assert_eq!(b.min, Vec2::new(25.0, 12.5));
        assert_eq!(b.max, Vec2::new(75.0, 37.5));
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let a = Aabb::from_rect(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_rect(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_find_gap() {
        let tiles = [tile(1, 0.0, 100.0), tile(2, 150.0, 100.0), tile(3, 250.0, 50.0)];
        assert_eq!(find_gap(&tiles, 120.0, None), Some(100.0));
        assert_eq!(find_gap(&tiles, 50.0, None), None);
        // Edges are solid
        assert_eq!(find_gap(&tiles, 100.0, None), None);
        assert_eq!(find_gap(&tiles, 150.0, None), None);
        // Touching tiles leave no gap
        assert_eq!(find_gap(&tiles, 250.0, None), None);
    }

    #[test]
    fn test_gap_before_first_tile() {
        let tiles = [tile(11, 251.0, 5000.0)];
        assert_eq!(find_gap(&tiles, 230.0, Some(-4.0)), Some(-4.0));
        assert_eq!(find_gap(&tiles, 260.0, Some(-4.0)), None);
        // Nothing retired yet: no gap can open on the left
        assert_eq!(find_gap(&tiles, 230.0, None), None);
    }

    #[test]
    fn test_grounded_overlap_strikes() {
        let o = obstacle_at(100.0, 480.0, Vec2::new(40.0, 40.0));
        let actor = Aabb::from_rect(Vec2::new(90.0, 390.0), Vec2::new(60.0, 90.0)).scaled(0.8);
        assert_eq!(classify_obstacle(&actor, false, &o), ObstacleContact::Struck);
    }

    #[test]
    fn test_struck_only_once() {
        let mut o = obstacle_at(100.0, 480.0, Vec2::new(40.0, 40.0));
        o.struck = true;
        let actor = Aabb::from_rect(Vec2::new(90.0, 390.0), Vec2::new(60.0, 90.0));
        assert_eq!(classify_obstacle(&actor, false, &o), ObstacleContact::None);
    }

    #[test]
    fn test_airborne_clear_credited_once() {
        let mut o = obstacle_at(100.0, 480.0, Vec2::new(40.0, 40.0));
        let actor = Aabb::from_rect(Vec2::new(90.0, 300.0), Vec2::new(60.0, 90.0));
        assert_eq!(classify_obstacle(&actor, true, &o), ObstacleContact::Cleared);
        o.jumped_over = true;
        assert_eq!(classify_obstacle(&actor, true, &o), ObstacleContact::None);
    }

    proptest! {
        #[test]
        fn airborne_never_struck(
            actor_x in 0.0f32..300.0,
            lift in 0.0f32..240.0,
            obstacle_x in 0.0f32..300.0,
            h in 10.0f32..120.0,
        ) {
            let ground = 480.0;
            let o = obstacle_at(obstacle_x, ground, Vec2::new(40.0, h));
            let actor = Aabb::from_rect(Vec2::new(actor_x, ground - 90.0 - lift), Vec2::new(60.0, 90.0));
            let contact = classify_obstacle(&actor, true, &o);
            prop_assert_ne!(contact, ObstacleContact::Struck);
            if contact == ObstacleContact::Cleared {
                prop_assert!(actor.max.y < o.mid_y());
            }
        }
    }
}
