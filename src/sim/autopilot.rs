//! Scripted input for headless runs
//!
//! Double-taps the move key to break into a run, then jumps whenever a gap
//! edge or an obstacle comes within reach.

use rand::Rng;

use super::state::JumpPhase;
use super::tick::{KeyEdge, RunnerSimulator, TickInput};

/// Ticks of travel before a gap edge at which to jump
const GAP_LEAD_TICKS: f32 = 3.0;
/// Fraction of the jump spent before reaching an obstacle
const OBSTACLE_LEAD_FRACTION: f32 = 0.3;

/// Simple scripted player
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Move key edges sent so far (press, release, press)
    edges_sent: u8,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input for the next tick given the simulator's current state
    pub fn next_input<R: Rng>(&mut self, sim: &RunnerSimulator<R>) -> TickInput {
        let mut input = TickInput::default();

        input.move_key = match self.edges_sent {
            0 | 2 => Some(KeyEdge::Pressed),
            1 => Some(KeyEdge::Released),
            _ => None,
        };
        self.edges_sent = self.edges_sent.saturating_add(1).min(3);

        let kin = sim.kinematics();
        if kin.jump_phase != JumpPhase::Grounded || kin.speed <= 0.0 {
            return input;
        }

        let gap_lead = kin.speed * GAP_LEAD_TICKS;
        let obstacle_lead = kin.speed * sim.tuning().jump_ticks() as f32 * OBSTACLE_LEAD_FRACTION;
        let gap_near = sim.distance_to_gap().is_some_and(|d| d <= gap_lead);
        let obstacle_near = sim.distance_to_obstacle().is_some_and(|d| d <= obstacle_lead);
        input.jump = gap_near || obstacle_near;
        input
    }
}
