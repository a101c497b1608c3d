#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative local match world for Forager.
//!
//! This crate stands in for the external game engine so the decision engine
//! can be exercised end-to-end: it owns the resource field, the fleet and
//! the budget, executes [`Command`] values through the free [`apply`] entry
//! point, and broadcasts [`Event`] values describing what actually
//! happened. Inadmissible commands are logged and ignored; applying a
//! command never panics. Snapshots for the decision engine are produced by
//! the [`query`] module.

use forager_core::{Command, Direction, Event, GameConstants, Position, Torus, UnitId};
use tracing::debug;

const FIELD_GENERATION_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const FIELD_GENERATION_INCREMENT: u64 = 1;

/// Parameters for constructing a local match world.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Seed driving the deterministic resource field generation.
    pub seed: u64,
    /// Budget the player starts the match with.
    pub starting_budget: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            seed: 0x42f0_e1eb_d4a5_3c21,
            starting_budget: 5000,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Unit {
    id: UnitId,
    position: Position,
    cargo: u16,
}

/// Represents the authoritative state of a local match.
#[derive(Debug)]
pub struct World {
    torus: Torus,
    resources: Vec<u16>,
    units: Vec<Unit>,
    shipyard: Position,
    dropoffs: Vec<Position>,
    budget: u32,
    turn_number: u32,
    next_unit_id: u32,
    constants: GameConstants,
}

impl World {
    /// Creates a new match world with a deterministically generated field.
    ///
    /// # Panics
    ///
    /// Panics if either grid dimension is zero.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        assert!(
            config.width > 0 && config.height > 0,
            "grid dimensions must be non-zero"
        );
        let torus = Torus::new(config.width, config.height);
        let shipyard = Position::new(config.width / 2, config.height / 2);
        let mut state = config.seed;
        let mut advance = move || {
            state = state
                .wrapping_mul(FIELD_GENERATION_MULTIPLIER)
                .wrapping_add(FIELD_GENERATION_INCREMENT);
            state
        };

        let cell_count = (config.width * config.height) as usize;
        let mut resources = Vec::with_capacity(cell_count);
        for _ in 0..cell_count {
            let draw = advance();
            resources.push(((draw >> 33) % 1000) as u16);
        }
        let shipyard_index = index(torus, shipyard);
        resources[shipyard_index] = 0;

        Self {
            torus,
            resources,
            units: Vec::new(),
            shipyard,
            dropoffs: Vec::new(),
            budget: config.starting_budget,
            turn_number: 1,
            next_unit_id: 0,
            constants: GameConstants::default(),
        }
    }

    fn unit_index(&self, unit: UnitId) -> Option<usize> {
        self.units.iter().position(|candidate| candidate.id == unit)
    }

    fn is_structure(&self, position: Position) -> bool {
        position == self.shipyard || self.dropoffs.contains(&position)
    }

    fn occupied(&self, position: Position) -> bool {
        self.units.iter().any(|unit| unit.position == position)
    }

    fn deposit(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let unit = &mut self.units[index];
        if unit.cargo == 0 {
            return;
        }
        let amount = unit.cargo;
        unit.cargo = 0;
        self.budget += u32::from(amount);
        out_events.push(Event::CargoDeposited {
            unit: self.units[index].id,
            amount,
        });
    }

    fn execute_move(&mut self, unit: UnitId, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(unit_index) = self.unit_index(unit) else {
            debug!(unit = unit.get(), "move for unknown unit ignored");
            return;
        };
        let from = self.units[unit_index].position;
        let to = self.torus.offset(from, direction);
        self.units[unit_index].position = to;
        out_events.push(Event::UnitMoved { unit, from, to });
        if self.is_structure(to) {
            self.deposit(unit_index, out_events);
        }
    }

    fn execute_hold(&mut self, unit: UnitId, out_events: &mut Vec<Event>) {
        let Some(unit_index) = self.unit_index(unit) else {
            debug!(unit = unit.get(), "hold for unknown unit ignored");
            return;
        };
        let position = self.units[unit_index].position;
        if self.is_structure(position) {
            self.deposit(unit_index, out_events);
            return;
        }

        let cell_index = index(self.torus, position);
        let available = self.resources[cell_index];
        let capacity_left = self
            .constants
            .cargo_capacity
            .saturating_sub(self.units[unit_index].cargo);
        // A holding unit mines a quarter of the cell, rounded up.
        let amount = available.div_ceil(4).min(capacity_left);
        if amount == 0 {
            return;
        }
        self.resources[cell_index] = available - amount;
        self.units[unit_index].cargo += amount;
        out_events.push(Event::ResourceMined {
            unit,
            position,
            amount,
        });
    }

    fn execute_convert(&mut self, unit: UnitId, out_events: &mut Vec<Event>) {
        let Some(unit_index) = self.unit_index(unit) else {
            debug!(unit = unit.get(), "convert for unknown unit ignored");
            return;
        };
        if self.budget < self.constants.dropoff_cost {
            debug!(unit = unit.get(), "convert refused, insufficient budget");
            return;
        }
        let position = self.units[unit_index].position;
        if self.is_structure(position) {
            debug!(unit = unit.get(), "convert refused on a structure cell");
            return;
        }
        self.budget -= self.constants.dropoff_cost;
        let _ = self.units.remove(unit_index);
        self.dropoffs.push(position);
        out_events.push(Event::DropoffBuilt { unit, position });
    }

    fn execute_spawn(&mut self, out_events: &mut Vec<Event>) {
        if self.budget < self.constants.unit_cost {
            debug!("spawn refused, insufficient budget");
            return;
        }
        if self.occupied(self.shipyard) {
            debug!("spawn refused, shipyard occupied");
            return;
        }
        self.budget -= self.constants.unit_cost;
        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.push(Unit {
            id,
            position: self.shipyard,
            cargo: 0,
        });
        out_events.push(Event::UnitSpawned {
            unit: id,
            position: self.shipyard,
        });
    }
}

fn index(torus: Torus, position: Position) -> usize {
    let position = torus.normalize(position);
    (position.y() * torus.width() + position.x()) as usize
}

/// Executes a single command against the world, appending resulting events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Move { unit, direction } => world.execute_move(unit, direction, out_events),
        Command::Hold { unit } => world.execute_hold(unit, out_events),
        Command::ConvertToDropoff { unit } => world.execute_convert(unit, out_events),
        Command::SpawnUnit => world.execute_spawn(out_events),
    }
}

/// Advances the match to the next turn.
pub fn end_turn(world: &mut World) {
    world.turn_number += 1;
}

/// Read-only queries over the authoritative world state.
pub mod query {
    use forager_core::{
        Board, Cell, PlayerSnapshot, Position, TurnSnapshot, UnitSnapshot, UnitView,
    };

    use super::{index, World};

    /// Captures the immutable snapshot handed to the decision engine.
    #[must_use]
    pub fn snapshot(world: &World) -> TurnSnapshot {
        let mut cells: Vec<Cell> = world
            .resources
            .iter()
            .map(|&resource| Cell::new(resource, false, false))
            .collect();
        for unit in &world.units {
            cells[index(world.torus, unit.position)].occupied = true;
        }
        cells[index(world.torus, world.shipyard)].structure = true;
        for &dropoff in &world.dropoffs {
            cells[index(world.torus, dropoff)].structure = true;
        }

        let board = Board::from_cells(world.torus.width(), world.torus.height(), cells)
            .expect("world dimensions are validated at construction");
        let units = UnitView::from_snapshots(
            world
                .units
                .iter()
                .map(|unit| UnitSnapshot {
                    id: unit.id,
                    position: unit.position,
                    cargo: unit.cargo,
                })
                .collect(),
        );

        TurnSnapshot {
            turn_number: world.turn_number,
            board,
            player: PlayerSnapshot {
                budget: world.budget,
                shipyard: world.shipyard,
                dropoffs: world.dropoffs.clone(),
                units,
            },
            constants: world.constants,
        }
    }

    /// Current turn number of the match.
    #[must_use]
    pub fn turn_number(world: &World) -> u32 {
        world.turn_number
    }

    /// Budget currently banked by the player.
    #[must_use]
    pub fn budget(world: &World) -> u32 {
        world.budget
    }

    /// Number of units currently afloat.
    #[must_use]
    pub fn unit_count(world: &World) -> usize {
        world.units.len()
    }

    /// Total resource remaining on the field.
    #[must_use]
    pub fn field_total(world: &World) -> u64 {
        world.resources.iter().map(|&amount| u64::from(amount)).sum()
    }

    /// Position of the player's shipyard.
    #[must_use]
    pub fn shipyard(world: &World) -> Position {
        world.shipyard
    }
}
