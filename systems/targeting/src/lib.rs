#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Harvest target selection: local neighbor scan plus global beacon search.
//!
//! Everything here is a pure function of the turn snapshot, the turn number
//! and the tuning configuration, so target choices can be tested without a
//! live match. Beacons are recomputed fresh every turn from a full-grid
//! scan; nothing is persisted between turns.

use forager_core::{match_length, Board, Direction, Position, ReservationSet, Torus};

/// Tunable thresholds and margins for target selection.
#[derive(Clone, Copy, Debug)]
pub struct TargetingConfig {
    /// Local scan only engages when the current cell is below this amount.
    pub local_floor: u16,
    /// A neighbor must exceed the running best by this factor to replace it.
    pub local_margin: f64,
    /// Base resource threshold scaled by the turn-adaptive coefficient.
    pub beacon_base: u32,
    /// Upper bound on the turn-adaptive coefficient.
    pub beacon_ceiling: f64,
    /// Beacons farther than this distance are ignored for a given unit.
    pub beacon_radius: u32,
    /// Number of nearest beacons retained per unit.
    pub beacon_keep: usize,
    /// The nearest beacon must beat the local best by this factor to win.
    pub beacon_margin: f64,
}

impl TargetingConfig {
    /// Creates a configuration with explicit field values.
    #[must_use]
    pub const fn new(
        local_floor: u16,
        local_margin: f64,
        beacon_base: u32,
        beacon_ceiling: f64,
        beacon_radius: u32,
        beacon_keep: usize,
        beacon_margin: f64,
    ) -> Self {
        Self {
            local_floor,
            local_margin,
            beacon_base,
            beacon_ceiling,
            beacon_radius,
            beacon_keep,
            beacon_margin,
        }
    }
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self::new(50, 2.0, 350, 1.2, 15, 3, 2.5)
    }
}

/// Turn-adaptive resource floor a cell must exceed to count as a beacon.
///
/// The coefficient `(match_length / 2) / turn` relaxes as the match
/// matures and is clamped to `beacon_ceiling` early on, so the floor is
/// non-increasing in the turn number.
#[must_use]
pub fn beacon_floor(width: u32, turn_number: u32, config: &TargetingConfig) -> u32 {
    let turn = turn_number.max(1);
    let half_match = f64::from(match_length(width)) / 2.0;
    let coefficient = (half_match / f64::from(turn)).min(config.beacon_ceiling);
    (f64::from(config.beacon_base) * coefficient) as u32
}

/// Scans the whole grid for beacon cells, in row-major scan order.
#[must_use]
pub fn beacons(board: &Board, turn_number: u32, config: &TargetingConfig) -> Vec<Position> {
    let floor = beacon_floor(board.width(), turn_number, config);
    board
        .positions()
        .filter(|position| u32::from(board.resource(*position)) > floor)
        .collect()
}

/// Keeps the nearest few beacons within reach of the origin.
///
/// Ties in distance are preserved in scan order via a stable sort.
#[must_use]
pub fn nearest_beacons(
    torus: Torus,
    origin: Position,
    beacons: &[Position],
    config: &TargetingConfig,
) -> Vec<Position> {
    let mut reachable: Vec<(u32, Position)> = beacons
        .iter()
        .map(|&beacon| (torus.distance(origin, beacon), beacon))
        .filter(|&(distance, _)| distance < config.beacon_radius)
        .collect();
    reachable.sort_by_key(|&(distance, _)| distance);
    reachable.truncate(config.beacon_keep);
    reachable.into_iter().map(|(_, beacon)| beacon).collect()
}

/// Picks the best harvest cell for a unit standing at `origin`.
///
/// When the current cell is still worth sitting on (at or above
/// `local_floor`) the origin is returned unchanged and the unit harvests in
/// place. Otherwise the four orthogonal neighbors are scanned in the fixed
/// N-S-E-W order; a neighbor replaces the running best only when it clears
/// the multiplicative margin and is unoccupied, unreserved and not a
/// structure cell. Finally the nearest reachable beacon overrides the local
/// choice if it beats it by `beacon_margin`.
#[must_use]
pub fn select_target(
    board: &Board,
    origin: Position,
    reservations: &ReservationSet,
    beacons: &[Position],
    config: &TargetingConfig,
) -> Position {
    let torus = board.torus();
    let mut best = origin;

    if board.resource(origin) >= config.local_floor {
        return best;
    }

    for direction in Direction::SCAN_ORDER {
        let candidate = torus.offset(origin, direction);
        let cell = board.cell(candidate);
        if cell.occupied || cell.structure || reservations.is_reserved(candidate) {
            continue;
        }
        if f64::from(cell.resource) > f64::from(board.resource(best)) * config.local_margin {
            best = candidate;
        }
    }

    let reachable = nearest_beacons(torus, origin, beacons, config);
    if let Some(&beacon) = reachable.first() {
        if f64::from(board.resource(beacon))
            > f64::from(board.resource(best)) * config.beacon_margin
        {
            best = beacon;
        }
    }

    best
}
