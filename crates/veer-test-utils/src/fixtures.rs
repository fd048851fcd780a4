//! Canned scenario fixtures.
//!
//! Geometry follows the reference highway: a 250-unit road with spawns
//! 30 units in from the left end and destinations 50 units short of the
//! right end, one agent per 10-unit lane.

use crate::MockWorld;

/// Reference vehicle body length.
pub const VEHICLE_LENGTH: f32 = 4.48;

/// Reference vehicle body width.
pub const VEHICLE_WIDTH: f32 = 2.2;

/// Spawn x for the reference highway (`-250/2 + 30`).
pub const SPAWN_X: f32 = -95.0;

/// Destination x for the reference highway (`250/2 - 50`).
pub const DEST_X: f32 = 75.0;

/// Spawn positions: one agent per lane, `lane_gap` apart.
pub fn highway_spawns(nagents: usize, lane_gap: f32) -> Vec<[f32; 2]> {
    (0..nagents)
        .map(|i| [SPAWN_X, i as f32 * lane_gap])
        .collect()
}

/// Destinations straight ahead of each spawn.
pub fn highway_destinations(nagents: usize, lane_gap: f32) -> Vec<[f32; 2]> {
    (0..nagents)
        .map(|i| [DEST_X, i as f32 * lane_gap])
        .collect()
}

/// A mock highway world with `nagents` vehicles, one per lane.
pub fn highway_world(nagents: usize, lane_gap: f32) -> MockWorld {
    MockWorld::new(
        highway_spawns(nagents, lane_gap),
        highway_destinations(nagents, lane_gap),
    )
}

/// The two-agent scenario: lanes 10 units apart, no scripted
/// collisions.
pub fn two_agent_highway() -> MockWorld {
    highway_world(2, 10.0)
}

/// The single-agent scenario used by the staged spline tests.
pub fn single_agent_highway() -> MockWorld {
    highway_world(1, 10.0)
}
