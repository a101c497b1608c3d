#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Forager decision engine.
//!
//! This crate defines the message surface that connects the decision systems,
//! the bot that composes them, and the local world harness. The world exposes
//! immutable per-turn snapshots, the systems query those snapshots and
//! propose at most one [`Command`] per unit, and the harness answers with
//! [`Event`] values describing what actually happened. All coordinate
//! arithmetic wraps on the torus owned by [`Torus`]; no other code performs
//! wraparound math.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cardinal movement directions available to units.
///
/// Holding position is expressed as [`Command::Hold`] (or `None` from the
/// navigation planners), never as a fifth direction variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing y coordinates.
    North,
    /// Movement toward increasing y coordinates.
    South,
    /// Movement toward increasing x coordinates.
    East,
    /// Movement toward decreasing x coordinates.
    West,
}

impl Direction {
    /// Fixed scan order used wherever neighbor ties must break deterministically.
    pub const SCAN_ORDER: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Returns the direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// Returns the two directions perpendicular to this one.
    #[must_use]
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Self::North | Self::South => [Direction::East, Direction::West],
            Self::East | Self::West => [Direction::South, Direction::North],
        }
    }
}

/// Location of a single grid cell.
///
/// Coordinates are plain values; wrapping them into bounds is the job of
/// [`Torus::normalize`], applied at every lookup and offset site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new position from raw coordinates.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the position.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Vertical coordinate of the position.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Toroidal grid dimensions owning all wraparound arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torus {
    width: u32,
    height: u32,
}

impl Torus {
    /// Creates a new torus with the provided dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns on the torus.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows on the torus.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Wraps a position back into `[0, width) x [0, height)`.
    #[must_use]
    pub const fn normalize(&self, position: Position) -> Position {
        Position::new(position.x % self.width, position.y % self.height)
    }

    /// Returns the neighboring cell one step in the provided direction.
    #[must_use]
    pub const fn offset(&self, position: Position, direction: Direction) -> Position {
        let Position { x, y } = position;
        match direction {
            Direction::North => Position::new(x, (y + self.height - 1) % self.height),
            Direction::South => Position::new(x, (y + 1) % self.height),
            Direction::East => Position::new((x + 1) % self.width, y),
            Direction::West => Position::new((x + self.width - 1) % self.width, y),
        }
    }

    /// Toroidal Manhattan distance between two positions.
    #[must_use]
    pub const fn distance(&self, a: Position, b: Position) -> u32 {
        let dx = a.x.abs_diff(b.x);
        let dy = a.y.abs_diff(b.y);
        let dx = if dx > self.width - dx {
            self.width - dx
        } else {
            dx
        };
        let dy = if dy > self.height - dy {
            self.height - dy
        } else {
            dy
        };
        dx + dy
    }

    /// Signed per-axis delta from `from` to `to`, choosing the shorter
    /// wraparound path whenever the naive delta exceeds half the dimension.
    ///
    /// Positive x points east, positive y points south.
    #[must_use]
    pub fn signed_delta(&self, from: Position, to: Position) -> (i32, i32) {
        let wrap = |delta: i64, dimension: u32| -> i32 {
            let dimension = i64::from(dimension);
            let half = dimension / 2;
            let delta = if delta > half {
                delta - dimension
            } else if delta < -half {
                delta + dimension
            } else {
                delta
            };
            delta as i32
        };

        let dx = i64::from(to.x) - i64::from(from.x);
        let dy = i64::from(to.y) - i64::from(from.y);
        (wrap(dx, self.width), wrap(dy, self.height))
    }
}

/// Unique identifier assigned to a unit by the game state provider.
///
/// Ascending identifier order is the declared scheduling policy: units are
/// resolved in ascending id order and earlier units have strict reservation
/// priority for contested cells.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Per-unit behavioural role driven by cargo level and position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Collecting resource from the field. Initial role for every unit.
    Harvesting,
    /// Carrying a full cargo hold back to the nearest structure.
    Returning,
    /// Terminal endgame role forcing a march to the nearest structure.
    SelfDestruct,
}

/// Kinds of cargo-return structures a player owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// The single fixed home structure that also produces new units.
    Shipyard,
    /// Auxiliary return point built mid-match by converting a unit.
    Dropoff,
}

/// Read-only per-turn state of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Depletable resource amount remaining on the cell.
    pub resource: u16,
    /// Whether any unit currently occupies the cell.
    pub occupied: bool,
    /// Whether a shipyard or dropoff stands on the cell.
    pub structure: bool,
}

impl Cell {
    /// Creates a new cell snapshot with explicit field values.
    #[must_use]
    pub const fn new(resource: u16, occupied: bool, structure: bool) -> Self {
        Self {
            resource,
            occupied,
            structure,
        }
    }
}

/// Errors raised when assembling a [`Board`] from raw snapshot data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The provided cell buffer does not match the stated dimensions.
    #[error("expected {expected} cells for the stated dimensions, got {actual}")]
    CellCountMismatch {
        /// Cell count implied by width and height.
        expected: usize,
        /// Cell count actually provided.
        actual: usize,
    },
    /// A torus dimension of zero admits no positions.
    #[error("board dimensions must be non-zero")]
    ZeroDimension,
}

/// Dense row-major snapshot of the entire grid for one turn.
///
/// Cells are read-only; the decision engine never mutates grid state, only
/// its own [`ReservationSet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    torus: Torus,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board from row-major cells, validating the dimensions.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::ZeroDimension);
        }
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(BoardError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            torus: Torus::new(width, height),
            cells,
        })
    }

    /// Torus describing the board dimensions.
    #[must_use]
    pub const fn torus(&self) -> Torus {
        self.torus
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.torus.width()
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.torus.height()
    }

    /// Snapshot of the cell at the provided position, normalized first.
    #[must_use]
    pub fn cell(&self, position: Position) -> Cell {
        let position = self.torus.normalize(position);
        let index = position.y() as usize * self.width() as usize + position.x() as usize;
        self.cells[index]
    }

    /// Resource amount on the cell at the provided position.
    #[must_use]
    pub fn resource(&self, position: Position) -> u16 {
        self.cell(position).resource
    }

    /// Whether a unit occupies the cell at the provided position.
    #[must_use]
    pub fn is_occupied(&self, position: Position) -> bool {
        self.cell(position).occupied
    }

    /// Whether a structure stands on the cell at the provided position.
    #[must_use]
    pub fn has_structure(&self, position: Position) -> bool {
        self.cell(position).structure
    }

    /// Iterates all positions in row-major scan order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width();
        let height = self.height();
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Grid cell currently occupied by the unit.
    pub position: Position,
    /// Resource currently held in the unit's cargo hold.
    pub cargo: u16,
}

impl UnitSnapshot {
    /// Whether the cargo hold has reached the provided capacity.
    #[must_use]
    pub const fn is_full(&self, capacity: u16) -> bool {
        self.cargo >= capacity
    }
}

/// Read-only view of all owned units in ascending identifier order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Number of units captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the view contains no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Static engine constants consumed by the production and role policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConstants {
    /// Maximum resource a unit can carry.
    pub cargo_capacity: u16,
    /// Budget cost of producing a new unit at the shipyard.
    pub unit_cost: u32,
    /// Budget cost of converting a unit into a dropoff.
    pub dropoff_cost: u32,
}

impl GameConstants {
    /// Creates constants with explicit values.
    #[must_use]
    pub const fn new(cargo_capacity: u16, unit_cost: u32, dropoff_cost: u32) -> Self {
        Self {
            cargo_capacity,
            unit_cost,
            dropoff_cost,
        }
    }
}

impl Default for GameConstants {
    fn default() -> Self {
        Self::new(1000, 1000, 4000)
    }
}

/// Read-only snapshot of the controlling player's assets for one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Banked budget available for production and conversion.
    pub budget: u32,
    /// Position of the single fixed shipyard.
    pub shipyard: Position,
    /// Positions of every auxiliary dropoff built so far.
    pub dropoffs: Vec<Position>,
    /// Owned units in ascending identifier order.
    pub units: UnitView,
}

impl PlayerSnapshot {
    /// Iterates every valid cargo-return position, shipyard first.
    pub fn structures(&self) -> impl Iterator<Item = Position> + '_ {
        std::iter::once(self.shipyard).chain(self.dropoffs.iter().copied())
    }

    /// Whether the provided position holds one of the player's structures.
    #[must_use]
    pub fn is_structure(&self, position: Position) -> bool {
        self.structures().any(|structure| structure == position)
    }
}

/// Complete immutable game state handed to the decision engine each turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnSnapshot {
    /// Monotonically increasing turn number, starting at 1.
    pub turn_number: u32,
    /// Grid snapshot for this turn.
    pub board: Board,
    /// Controlling player's assets.
    pub player: PlayerSnapshot,
    /// Static engine constants.
    pub constants: GameConstants,
}

/// Turn-scoped set of destination cells claimed by already-decided units.
///
/// Membership is checked before any move is finalized, which is the entire
/// collision-avoidance mechanism: no two friendly units may claim the same
/// destination in the same turn. The set is append-only within a turn and
/// discarded at turn end.
#[derive(Clone, Debug, Default)]
pub struct ReservationSet {
    cells: HashSet<Position>,
}

impl ReservationSet {
    /// Creates an empty reservation set for a fresh turn.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a destination cell for the remainder of the turn.
    pub fn reserve(&mut self, position: Position) {
        let _ = self.cells.insert(position);
    }

    /// Whether an earlier-processed unit already claimed the cell.
    #[must_use]
    pub fn is_reserved(&self, position: Position) -> bool {
        self.cells.contains(&position)
    }

    /// Number of cells claimed so far this turn.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell has been claimed yet this turn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Commands the decision engine may emit, at most one per unit per turn.
///
/// Omitting a command for a unit is equivalent to [`Command::Hold`] by
/// engine convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Moves a unit one step in the provided direction, wrapping at edges.
    Move {
        /// Unit ordered to move.
        unit: UnitId,
        /// Direction of travel for the step.
        direction: Direction,
    },
    /// Keeps a unit on its current cell, harvesting if resource remains.
    Hold {
        /// Unit ordered to hold position.
        unit: UnitId,
    },
    /// Converts a unit into a dropoff structure on its current cell.
    ConvertToDropoff {
        /// Unit sacrificed for the conversion.
        unit: UnitId,
    },
    /// Produces a new unit on the shipyard cell.
    SpawnUnit,
}

impl Command {
    /// Unit the command addresses, if any.
    #[must_use]
    pub const fn unit(&self) -> Option<UnitId> {
        match self {
            Self::Move { unit, .. } | Self::Hold { unit } | Self::ConvertToDropoff { unit } => {
                Some(*unit)
            }
            Self::SpawnUnit => None,
        }
    }
}

/// Events broadcast by the local world harness after executing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new unit was produced on the shipyard.
    UnitSpawned {
        /// Identifier assigned to the new unit.
        unit: UnitId,
        /// Cell the unit occupies after spawning.
        position: Position,
    },
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: Position,
        /// Cell the unit occupies after the move.
        to: Position,
    },
    /// Reports resource harvested by a holding unit.
    ResourceMined {
        /// Identifier of the harvesting unit.
        unit: UnitId,
        /// Cell the resource was taken from.
        position: Position,
        /// Amount moved from the cell into the cargo hold.
        amount: u16,
    },
    /// Reports cargo banked after a unit reached a structure.
    CargoDeposited {
        /// Identifier of the depositing unit.
        unit: UnitId,
        /// Amount credited to the player's budget.
        amount: u16,
    },
    /// Confirms that a unit converted itself into a dropoff.
    DropoffBuilt {
        /// Identifier of the converted unit.
        unit: UnitId,
        /// Cell the new dropoff stands on.
        position: Position,
    },
}

/// Total match length in turns as a function of map width.
///
/// Wider maps play longer: a 32-wide map runs 401 turns, each additional
/// 8 columns adds 25 turns. Both the beacon floor and the endgame deadline
/// derive from this value.
#[must_use]
pub const fn match_length(width: u32) -> u32 {
    25 * width.saturating_sub(32) / 8 + 401
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    #[test]
    fn distance_to_self_is_zero() {
        let torus = Torus::new(8, 8);
        let position = Position::new(3, 5);
        assert_eq!(torus.distance(position, position), 0);
    }

    #[test]
    fn distance_uses_shorter_wraparound() {
        let torus = Torus::new(8, 6);
        assert_eq!(torus.distance(Position::new(0, 0), Position::new(7, 0)), 1);
        assert_eq!(torus.distance(Position::new(0, 0), Position::new(0, 5)), 1);
        assert_eq!(torus.distance(Position::new(1, 1), Position::new(4, 4)), 6);
    }

    #[test]
    fn offset_then_opposite_returns_home() {
        let torus = Torus::new(5, 7);
        for y in 0..7 {
            for x in 0..5 {
                let origin = Position::new(x, y);
                for direction in Direction::SCAN_ORDER {
                    let stepped = torus.offset(origin, direction);
                    assert!(stepped.x() < 5 && stepped.y() < 7);
                    assert_eq!(torus.offset(stepped, direction.opposite()), origin);
                }
            }
        }
    }

    #[test]
    fn signed_delta_wraps_past_half_dimension() {
        let torus = Torus::new(8, 8);
        let (dx, dy) = torus.signed_delta(Position::new(0, 0), Position::new(7, 6));
        assert_eq!((dx, dy), (-1, -2));
        let (dx, dy) = torus.signed_delta(Position::new(6, 6), Position::new(1, 1));
        assert_eq!((dx, dy), (3, 3));
    }

    #[test]
    fn match_length_scales_with_width() {
        assert_eq!(match_length(32), 401);
        assert_eq!(match_length(40), 426);
        assert_eq!(match_length(48), 451);
        assert_eq!(match_length(64), 501);
    }

    #[test]
    fn board_rejects_mismatched_cell_buffer() {
        let error = Board::from_cells(4, 4, vec![Cell::default(); 15]).unwrap_err();
        assert_eq!(
            error,
            BoardError::CellCountMismatch {
                expected: 16,
                actual: 15,
            }
        );
        assert_eq!(
            Board::from_cells(0, 4, Vec::new()).unwrap_err(),
            BoardError::ZeroDimension
        );
    }

    #[test]
    fn board_normalizes_lookups() {
        let mut cells = vec![Cell::default(); 16];
        cells[5] = Cell::new(120, false, false);
        let board = Board::from_cells(4, 4, cells).expect("valid board");
        assert_eq!(board.resource(Position::new(1, 1)), 120);
        assert_eq!(board.resource(Position::new(5, 5)), 120);
    }

    #[test]
    fn unit_view_sorts_by_ascending_id() {
        let view = UnitView::from_snapshots(vec![
            UnitSnapshot {
                id: UnitId::new(7),
                position: Position::new(0, 0),
                cargo: 0,
            },
            UnitSnapshot {
                id: UnitId::new(2),
                position: Position::new(1, 1),
                cargo: 10,
            },
        ]);
        let ids: Vec<u32> = view.iter().map(|unit| unit.id.get()).collect();
        assert_eq!(ids, vec![2, 7]);
    }

    #[test]
    fn reservation_set_tracks_claims() {
        let mut reservations = ReservationSet::new();
        let cell = Position::new(5, 5);
        assert!(!reservations.is_reserved(cell));
        reservations.reserve(cell);
        reservations.reserve(cell);
        assert!(reservations.is_reserved(cell));
        assert_eq!(reservations.len(), 1);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: serde::Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(13, 27));
    }

    #[test]
    fn command_round_trips_through_bincode() {
        assert_round_trip(&Command::Move {
            unit: UnitId::new(4),
            direction: Direction::West,
        });
        assert_round_trip(&Command::SpawnUnit);
    }

    #[test]
    fn role_round_trips_through_bincode() {
        assert_round_trip(&Role::SelfDestruct);
    }
}
