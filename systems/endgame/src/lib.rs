#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Endgame controller: deadline computation and nearest-structure recall.
//!
//! Once the deadline passes every unit marches straight home regardless of
//! role or cargo; the phase is terminal and never exited.

use forager_core::{match_length, Position, Torus};

/// Tunable endgame parameters.
#[derive(Clone, Copy, Debug)]
pub struct EndgameConfig {
    /// Turns before the end of the match at which the recall triggers.
    pub recall_margin: u32,
}

impl EndgameConfig {
    /// Creates a configuration with an explicit recall margin.
    #[must_use]
    pub const fn new(recall_margin: u32) -> Self {
        Self { recall_margin }
    }
}

impl Default for EndgameConfig {
    fn default() -> Self {
        Self::new(25)
    }
}

/// Last turn on which normal operation is still allowed.
#[must_use]
pub const fn deadline(width: u32, config: &EndgameConfig) -> u32 {
    match_length(width).saturating_sub(config.recall_margin)
}

/// Whether the match has entered the terminal recall phase.
#[must_use]
pub const fn recall_active(turn_number: u32, width: u32, config: &EndgameConfig) -> bool {
    turn_number > deadline(width, config)
}

/// Closest cargo-return structure by toroidal distance; shipyard wins ties.
#[must_use]
pub fn nearest_structure(
    torus: Torus,
    from: Position,
    shipyard: Position,
    dropoffs: &[Position],
) -> Position {
    let mut nearest = shipyard;
    let mut nearest_distance = torus.distance(from, shipyard);
    for &dropoff in dropoffs {
        let distance = torus.distance(from, dropoff);
        if distance < nearest_distance {
            nearest_distance = distance;
            nearest = dropoff;
        }
    }
    nearest
}

/// Distance from a unit to its closest cargo-return structure.
#[must_use]
pub fn distance_to_nearest_structure(
    torus: Torus,
    from: Position,
    shipyard: Position,
    dropoffs: &[Position],
) -> u32 {
    torus.distance(from, nearest_structure(torus, from, shipyard, dropoffs))
}
