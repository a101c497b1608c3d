#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Production policies: unit spawning and dropoff conversion.
//!
//! Both policies are pure predicates recomputed from scratch every turn, so
//! a decision skipped for lack of budget simply retries on the next turn
//! with no persisted intent.

/// Tunable production parameters.
#[derive(Clone, Copy, Debug)]
pub struct ProductionConfig {
    /// The fleet target grows by one unit every this many turns.
    pub spawn_divisor: u32,
    /// Spawning continues below this fleet size regardless of the target.
    pub fleet_floor: u32,
    /// Maps narrower than this use the small fleet cap.
    pub small_map_width: u32,
    /// Fleet ceiling on small maps.
    pub small_map_cap: u32,
    /// Fleet ceiling on large maps.
    pub large_map_cap: u32,
    /// Extra fleet headroom granted per existing dropoff.
    pub cap_per_dropoff: u32,
    /// Maps must be wider than this before any dropoff is allowed.
    pub dropoff_width_floor: u32,
    /// Number of dropoffs allowed once the width floor is cleared.
    pub max_dropoffs: u32,
    /// A dropoff site must be farther than this from existing structures.
    pub dropoff_min_distance: u32,
    /// A dropoff site must sit on at least this much resource.
    pub dropoff_min_resource: u16,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            spawn_divisor: 5,
            fleet_floor: 5,
            small_map_width: 35,
            small_map_cap: 26,
            large_map_cap: 28,
            cap_per_dropoff: 3,
            dropoff_width_floor: 38,
            max_dropoffs: 1,
            dropoff_min_distance: 10,
            dropoff_min_resource: 200,
        }
    }
}

/// Desired fleet size for the given turn, clamped to the map's ceiling.
#[must_use]
pub fn fleet_target(
    turn_number: u32,
    width: u32,
    dropoff_count: u32,
    config: &ProductionConfig,
) -> u32 {
    let cap = if width < config.small_map_width {
        config.small_map_cap
    } else {
        config.large_map_cap
    };
    let cap = cap + dropoff_count * config.cap_per_dropoff;
    (turn_number / config.spawn_divisor.max(1)).min(cap)
}

/// Whether a new unit should be produced this turn.
///
/// Production is refused while the shipyard cell is occupied or already
/// reserved as someone's destination, when the budget cannot cover the
/// unit cost, once the fleet meets its target (unless still under the
/// absolute floor), and unconditionally during the recall phase.
#[must_use]
pub fn should_spawn(
    turn_number: u32,
    width: u32,
    unit_count: u32,
    dropoff_count: u32,
    budget: u32,
    unit_cost: u32,
    shipyard_occupied: bool,
    shipyard_reserved: bool,
    recall: bool,
    config: &ProductionConfig,
) -> bool {
    if recall || shipyard_occupied || shipyard_reserved || budget < unit_cost {
        return false;
    }
    let target = fleet_target(turn_number, width, dropoff_count, config);
    unit_count < target || unit_count < config.fleet_floor
}

/// Number of dropoffs the map's width allows.
#[must_use]
pub const fn dropoff_allowance(width: u32, config: &ProductionConfig) -> u32 {
    if width > config.dropoff_width_floor {
        config.max_dropoffs
    } else {
        0
    }
}

/// Whether a full unit should convert into a dropoff on its current cell.
///
/// One-shot economic decision: when any condition fails the unit simply
/// continues returning and the check recurs next turn.
#[must_use]
pub fn should_convert(
    width: u32,
    dropoff_count: u32,
    distance_to_structure: u32,
    cell_resource: u16,
    budget: u32,
    dropoff_cost: u32,
    config: &ProductionConfig,
) -> bool {
    dropoff_count < dropoff_allowance(width, config)
        && distance_to_structure > config.dropoff_min_distance
        && cell_resource > config.dropoff_min_resource
        && budget >= dropoff_cost
}
