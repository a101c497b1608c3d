#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-step navigation for the decision loop.
//!
//! Every planner here turns a desired destination into at most one cardinal
//! step for the current turn; `None` always means "hold position". The
//! caller owns the [`ReservationSet`] and registers each finalized
//! destination before the next unit is planned, which is what makes
//! earlier-processed units strictly higher priority for contested cells.
//! All randomness flows through an explicitly seeded ChaCha stream so runs
//! are reproducible.

use forager_core::{Board, Direction, Position, ReservationSet, Torus};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Flat resource penalty applied to perpendicular detour candidates so a
/// sideways step never looks cheaper than direct progress.
const PERPENDICULAR_PENALTY: u32 = 500;

/// Cells inspected ahead of a harvest heading before committing to it.
const PROBE_DEPTH: u32 = 3;

/// Depth of the reserved approach corridor above and below a destination.
const CORRIDOR_DEPTH: u32 = 2;

/// Stateful navigator carrying the seeded random stream for tie-breaking.
#[derive(Clone, Debug)]
pub struct Navigator {
    rng: ChaCha8Rng,
}

impl Navigator {
    /// Creates a navigator whose random draws derive from the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Plans one step toward a return destination.
    ///
    /// Axis-priority movement over the shorter toroidal wrap: the horizontal
    /// candidate is ranked against the vertical one by the resource amount
    /// of the cell it enters (moving across rich cells forgoes harvest).
    /// Candidates are inadmissible when occupied, already reserved, or
    /// inside the approach corridor of two cells directly above and below
    /// the destination; with both axes live, a one-step lookahead discards a
    /// candidate that would box the unit against that corridor. When only
    /// one axis remains and it is blocked, the two perpendicular cells are
    /// tried with a flat penalty before giving up.
    #[must_use]
    pub fn approach(
        &mut self,
        board: &Board,
        from: Position,
        destination: Position,
        reservations: &ReservationSet,
    ) -> Option<Direction> {
        let torus = board.torus();
        let corridor = approach_corridor(torus, destination);
        let (dx, dy) = torus.signed_delta(from, destination);
        let horizontal = horizontal_heading(dx);
        let vertical = vertical_heading(dy);

        match (horizontal, vertical) {
            (None, None) => None,
            (Some(only), None) | (None, Some(only)) => {
                let step = torus.offset(from, only);
                if admissible(board, reservations, &corridor, step) {
                    return Some(only);
                }
                self.perpendicular_detour(board, from, only, reservations, &corridor)
            }
            (Some(horizontal), Some(vertical)) => {
                let ranked = [horizontal, vertical].map(|direction| {
                    let step = torus.offset(from, direction);
                    if !admissible(board, reservations, &corridor, step)
                        || boxed_in(torus, step, destination, &corridor)
                    {
                        return (direction, None);
                    }
                    (direction, Some(u32::from(board.resource(step))))
                });
                choose_cheaper(ranked[0], ranked[1])
            }
        }
    }

    /// Endgame variant of [`Navigator::approach`].
    ///
    /// Structure cells are always admissible destinations here, regardless
    /// of occupancy or reservations, and no approach corridor applies: the
    /// whole point of the recall is to stack units onto the drop points.
    #[must_use]
    pub fn recall(
        &self,
        board: &Board,
        from: Position,
        destination: Position,
        reservations: &ReservationSet,
    ) -> Option<Direction> {
        let torus = board.torus();
        let (dx, dy) = torus.signed_delta(from, destination);

        let rank = |heading: Option<Direction>| -> (Option<Direction>, Option<u32>) {
            let Some(direction) = heading else {
                return (None, None);
            };
            let step = torus.offset(from, direction);
            let open = !board.is_occupied(step) && !reservations.is_reserved(step);
            if open || board.has_structure(step) {
                (Some(direction), Some(u32::from(board.resource(step))))
            } else {
                (Some(direction), None)
            }
        };

        let (horizontal, x_cost) = rank(horizontal_heading(dx));
        let (vertical, y_cost) = rank(vertical_heading(dy));
        match (x_cost, y_cost) {
            (Some(x), Some(y)) if x < y => horizontal,
            (Some(_), Some(_)) => vertical,
            (Some(_), None) => horizontal,
            (None, Some(_)) => vertical,
            (None, None) => None,
        }
    }

    /// Commits to a harvest heading after probing the space ahead.
    ///
    /// Looks [`PROBE_DEPTH`] cells down the heading; if any of them is
    /// occupied the unit detours to one of the two perpendicular cells,
    /// tried in random order, rather than queueing behind traffic.
    #[must_use]
    pub fn probe(
        &mut self,
        board: &Board,
        from: Position,
        heading: Direction,
        reservations: &ReservationSet,
    ) -> Option<Direction> {
        let torus = board.torus();
        let mut ahead = from;
        let mut traffic = false;
        let mut first_step = None;
        for _ in 0..PROBE_DEPTH {
            ahead = torus.offset(ahead, heading);
            if first_step.is_none() {
                first_step = Some(ahead);
            }
            if board.is_occupied(ahead) {
                traffic = true;
                break;
            }
        }

        if !traffic {
            let step = first_step?;
            if !board.is_occupied(step) && !reservations.is_reserved(step) {
                return Some(heading);
            }
            return None;
        }

        let mut escapes = heading.perpendicular();
        escapes.shuffle(&mut self.rng);
        for escape in escapes {
            let step = torus.offset(from, escape);
            if !board.is_occupied(step) && !reservations.is_reserved(step) {
                return Some(escape);
            }
        }
        None
    }

    /// Nudges a freshly unloaded unit off its structure cell.
    ///
    /// Picks north or south at random so departing units do not clog the
    /// drop point; holds when the chosen cell is taken.
    #[must_use]
    pub fn depart(
        &mut self,
        board: &Board,
        from: Position,
        reservations: &ReservationSet,
    ) -> Option<Direction> {
        let torus = board.torus();
        let choices = [Direction::North, Direction::South];
        let direction = *choices.choose(&mut self.rng)?;
        let step = torus.offset(from, direction);
        if !board.is_occupied(step) && !reservations.is_reserved(step) {
            Some(direction)
        } else {
            None
        }
    }

    /// Random-move fallback for a unit stranded on an empty cell.
    ///
    /// Shuffles the four directions and takes the first that lands on an
    /// unoccupied, unreserved, non-structure cell; `None` when all four are
    /// blocked.
    #[must_use]
    pub fn wander(
        &mut self,
        board: &Board,
        from: Position,
        reservations: &ReservationSet,
    ) -> Option<Direction> {
        let torus = board.torus();
        let mut options = Direction::SCAN_ORDER;
        options.shuffle(&mut self.rng);
        for direction in options {
            let step = torus.offset(from, direction);
            if !board.is_occupied(step)
                && !reservations.is_reserved(step)
                && !board.has_structure(step)
            {
                return Some(direction);
            }
        }
        None
    }

    fn perpendicular_detour(
        &mut self,
        board: &Board,
        from: Position,
        blocked: Direction,
        reservations: &ReservationSet,
        corridor: &[Position],
    ) -> Option<Direction> {
        let torus = board.torus();
        let ranked = blocked.perpendicular().map(|direction| {
            let step = torus.offset(from, direction);
            if admissible(board, reservations, corridor, step) {
                (
                    direction,
                    Some(u32::from(board.resource(step)) + PERPENDICULAR_PENALTY),
                )
            } else {
                (direction, None)
            }
        });
        choose_cheaper(ranked[0], ranked[1])
    }
}

/// Primary heading from `from` toward `to`, vertical axis first.
///
/// Uses the shorter toroidal wrap on each axis; `None` when already there.
#[must_use]
pub fn heading_toward(torus: Torus, from: Position, to: Position) -> Option<Direction> {
    let (dx, dy) = torus.signed_delta(from, to);
    vertical_heading(dy).or_else(|| horizontal_heading(dx))
}

const fn horizontal_heading(dx: i32) -> Option<Direction> {
    if dx > 0 {
        Some(Direction::East)
    } else if dx < 0 {
        Some(Direction::West)
    } else {
        None
    }
}

const fn vertical_heading(dy: i32) -> Option<Direction> {
    if dy > 0 {
        Some(Direction::South)
    } else if dy < 0 {
        Some(Direction::North)
    } else {
        None
    }
}

fn approach_corridor(torus: Torus, destination: Position) -> Vec<Position> {
    let mut corridor = Vec::with_capacity(2 * CORRIDOR_DEPTH as usize);
    let mut above = destination;
    let mut below = destination;
    for _ in 0..CORRIDOR_DEPTH {
        above = torus.offset(above, Direction::North);
        corridor.push(above);
    }
    for _ in 0..CORRIDOR_DEPTH {
        below = torus.offset(below, Direction::South);
        corridor.push(below);
    }
    corridor
}

fn admissible(
    board: &Board,
    reservations: &ReservationSet,
    corridor: &[Position],
    step: Position,
) -> bool {
    !board.is_occupied(step) && !reservations.is_reserved(step) && !corridor.contains(&step)
}

/// One step past `step`, would the unit be funneled into the corridor?
fn boxed_in(torus: Torus, step: Position, destination: Position, corridor: &[Position]) -> bool {
    let (dx, dy) = torus.signed_delta(step, destination);
    let remaining = match (horizontal_heading(dx), vertical_heading(dy)) {
        (Some(only), None) | (None, Some(only)) => only,
        _ => return false,
    };
    corridor.contains(&torus.offset(step, remaining))
}

fn choose_cheaper(
    first: (Direction, Option<u32>),
    second: (Direction, Option<u32>),
) -> Option<Direction> {
    match (first.1, second.1) {
        (Some(a), Some(b)) => {
            if a <= b {
                Some(first.0)
            } else {
                Some(second.0)
            }
        }
        (Some(_), None) => Some(first.0),
        (None, Some(_)) => Some(second.0),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_follow_signed_deltas() {
        let torus = Torus::new(16, 16);
        let origin = Position::new(8, 8);
        assert_eq!(
            heading_toward(torus, origin, Position::new(8, 11)),
            Some(Direction::South)
        );
        assert_eq!(
            heading_toward(torus, origin, Position::new(11, 8)),
            Some(Direction::East)
        );
        // Vertical axis takes priority when both differ.
        assert_eq!(
            heading_toward(torus, origin, Position::new(11, 5)),
            Some(Direction::North)
        );
        assert_eq!(heading_toward(torus, origin, origin), None);
    }

    #[test]
    fn heading_prefers_wraparound_path() {
        let torus = Torus::new(16, 16);
        assert_eq!(
            heading_toward(torus, Position::new(1, 8), Position::new(14, 8)),
            Some(Direction::West)
        );
    }

    #[test]
    fn corridor_covers_two_cells_each_way() {
        let torus = Torus::new(16, 16);
        let corridor = approach_corridor(torus, Position::new(8, 8));
        assert_eq!(
            corridor,
            vec![
                Position::new(8, 7),
                Position::new(8, 6),
                Position::new(8, 9),
                Position::new(8, 10),
            ]
        );
    }

    #[test]
    fn corridor_wraps_at_edges() {
        let torus = Torus::new(16, 16);
        let corridor = approach_corridor(torus, Position::new(0, 0));
        assert!(corridor.contains(&Position::new(0, 15)));
        assert!(corridor.contains(&Position::new(0, 14)));
    }
}
