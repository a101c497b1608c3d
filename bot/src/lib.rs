#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! The per-turn decision engine that composes every Forager system.
//!
//! One call to [`Bot::plan_turn`] consumes an immutable [`TurnSnapshot`] and
//! produces the complete ordered command list for the turn: exactly one
//! command per owned unit plus an optional spawn. Units are processed in
//! ascending identifier order and every finalized move destination is
//! claimed in the turn's [`ReservationSet`] before the next unit is planned,
//! so earlier units hold strict priority for contested cells. Every decision
//! path terminates in a valid command; the worst case is `Hold`.

use forager_core::{
    Command, Position, ReservationSet, Role, TurnSnapshot, UnitId, UnitSnapshot,
};
use forager_system_endgame::{self as endgame, EndgameConfig};
use forager_system_navigation::{heading_toward, Navigator};
use forager_system_production::{self as production, ProductionConfig};
use forager_system_roles::RoleLedger;
use forager_system_targeting::{self as targeting, TargetingConfig};
use tracing::{debug, info};

/// Complete tuning surface of the decision engine.
#[derive(Clone, Copy, Debug)]
pub struct BotConfig {
    /// Seed for every random draw the navigator makes.
    pub rng_seed: u64,
    /// Target-selection thresholds and margins.
    pub targeting: TargetingConfig,
    /// Spawn and dropoff policy parameters.
    pub production: ProductionConfig,
    /// Recall deadline parameters.
    pub endgame: EndgameConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0x5eed_0f04,
            targeting: TargetingConfig::default(),
            production: ProductionConfig::default(),
            endgame: EndgameConfig::default(),
        }
    }
}

/// Stateful decision engine spanning the whole match.
///
/// Owns the role ledger and the seeded navigator; everything else is
/// recomputed fresh from each turn's snapshot.
#[derive(Debug)]
pub struct Bot {
    roles: RoleLedger,
    navigator: Navigator,
    config: BotConfig,
}

impl Bot {
    /// Creates a bot with the provided tuning configuration.
    #[must_use]
    pub fn new(config: BotConfig) -> Self {
        Self {
            roles: RoleLedger::new(),
            navigator: Navigator::new(config.rng_seed),
            config,
        }
    }

    /// Role currently assigned to a unit, defaulting to harvesting.
    #[must_use]
    pub fn role_of(&self, unit: UnitId) -> Role {
        self.roles.role(unit)
    }

    /// Plans one full turn, emitting at most one command per unit plus an
    /// optional spawn, in unit-processing order.
    pub fn plan_turn(&mut self, snapshot: &TurnSnapshot) -> Vec<Command> {
        let board = &snapshot.board;
        let player = &snapshot.player;
        let width = board.width();

        let live: Vec<UnitId> = player.units.iter().map(|unit| unit.id).collect();
        self.roles.prune(&live);

        if endgame::recall_active(snapshot.turn_number, width, &self.config.endgame) {
            self.roles.enter_self_destruct();
        }

        let beacons = targeting::beacons(board, snapshot.turn_number, &self.config.targeting);
        let mut reservations = ReservationSet::new();
        let mut commands = Vec::with_capacity(player.units.len() + 1);
        let mut budget = player.budget;
        let mut dropoff_count = player.dropoffs.len() as u32;

        for unit in player.units.iter() {
            let role = self.roles.observe(unit.id);
            let command = match role {
                Role::SelfDestruct => self.plan_recall(unit, snapshot, &mut reservations),
                Role::Returning => self.plan_return(unit, snapshot, &mut reservations),
                Role::Harvesting if unit.is_full(snapshot.constants.cargo_capacity) => self
                    .plan_full(
                        unit,
                        snapshot,
                        &mut reservations,
                        &mut budget,
                        &mut dropoff_count,
                    ),
                Role::Harvesting => self.plan_harvest(unit, snapshot, &beacons, &mut reservations),
            };
            debug!(unit = unit.id.get(), ?role, ?command, "unit decided");
            commands.push(command);
        }

        if production::should_spawn(
            snapshot.turn_number,
            width,
            player.units.len() as u32,
            dropoff_count,
            budget,
            snapshot.constants.unit_cost,
            board.is_occupied(player.shipyard),
            reservations.is_reserved(player.shipyard),
            self.roles.in_self_destruct(),
            &self.config.production,
        ) {
            commands.push(Command::SpawnUnit);
        }

        info!(
            turn = snapshot.turn_number,
            units = player.units.len(),
            beacons = beacons.len(),
            reserved = reservations.len(),
            commands = commands.len(),
            "turn planned"
        );
        commands
    }

    fn plan_recall(
        &mut self,
        unit: &UnitSnapshot,
        snapshot: &TurnSnapshot,
        reservations: &mut ReservationSet,
    ) -> Command {
        let player = &snapshot.player;
        if player.is_structure(unit.position) {
            return Command::Hold { unit: unit.id };
        }
        let torus = snapshot.board.torus();
        let home = endgame::nearest_structure(
            torus,
            unit.position,
            player.shipyard,
            &player.dropoffs,
        );
        let direction = self
            .navigator
            .recall(&snapshot.board, unit.position, home, reservations);
        finalize(unit, direction, snapshot, reservations, true)
    }

    fn plan_return(
        &mut self,
        unit: &UnitSnapshot,
        snapshot: &TurnSnapshot,
        reservations: &mut ReservationSet,
    ) -> Command {
        let player = &snapshot.player;
        let torus = snapshot.board.torus();

        if player.is_structure(unit.position) {
            self.roles.arrive(unit.id);
            let direction = self
                .navigator
                .depart(&snapshot.board, unit.position, reservations);
            return finalize(unit, direction, snapshot, reservations, false);
        }

        let home = endgame::nearest_structure(
            torus,
            unit.position,
            player.shipyard,
            &player.dropoffs,
        );
        let direction = self
            .navigator
            .approach(&snapshot.board, unit.position, home, reservations);
        finalize(unit, direction, snapshot, reservations, false)
    }

    fn plan_full(
        &mut self,
        unit: &UnitSnapshot,
        snapshot: &TurnSnapshot,
        reservations: &mut ReservationSet,
        budget: &mut u32,
        dropoff_count: &mut u32,
    ) -> Command {
        let player = &snapshot.player;
        let torus = snapshot.board.torus();
        let distance = endgame::distance_to_nearest_structure(
            torus,
            unit.position,
            player.shipyard,
            &player.dropoffs,
        );

        if production::should_convert(
            snapshot.board.width(),
            *dropoff_count,
            distance,
            snapshot.board.resource(unit.position),
            *budget,
            snapshot.constants.dropoff_cost,
            &self.config.production,
        ) {
            *budget = budget.saturating_sub(snapshot.constants.dropoff_cost);
            *dropoff_count += 1;
            debug!(unit = unit.id.get(), "converting to dropoff");
            return Command::ConvertToDropoff { unit: unit.id };
        }

        self.roles.begin_return(unit.id);
        let home = endgame::nearest_structure(
            torus,
            unit.position,
            player.shipyard,
            &player.dropoffs,
        );
        let direction = self
            .navigator
            .approach(&snapshot.board, unit.position, home, reservations);
        finalize(unit, direction, snapshot, reservations, false)
    }

    fn plan_harvest(
        &mut self,
        unit: &UnitSnapshot,
        snapshot: &TurnSnapshot,
        beacons: &[Position],
        reservations: &mut ReservationSet,
    ) -> Command {
        let board = &snapshot.board;
        let target = targeting::select_target(
            board,
            unit.position,
            reservations,
            beacons,
            &self.config.targeting,
        );

        if target == unit.position {
            if board.resource(unit.position) == 0 {
                let direction = self.navigator.wander(board, unit.position, reservations);
                return finalize(unit, direction, snapshot, reservations, false);
            }
            // Idle harvest tick on a still-worthwhile cell.
            return Command::Hold { unit: unit.id };
        }

        let Some(heading) = heading_toward(board.torus(), unit.position, target) else {
            return Command::Hold { unit: unit.id };
        };
        let direction = self
            .navigator
            .probe(board, unit.position, heading, reservations);
        finalize(unit, direction, snapshot, reservations, false)
    }
}

/// Turns a planned step into a command, claiming the destination cell.
///
/// Structure destinations are claimed too unless `stack_structures` is set:
/// recall moves leave them unreserved so late units can pile onto the drop
/// points. A claimed shipyard cell blocks spawning for the turn.
fn finalize(
    unit: &UnitSnapshot,
    direction: Option<forager_core::Direction>,
    snapshot: &TurnSnapshot,
    reservations: &mut ReservationSet,
    stack_structures: bool,
) -> Command {
    match direction {
        Some(direction) => {
            let torus = snapshot.board.torus();
            let destination = torus.normalize(torus.offset(unit.position, direction));
            if !(stack_structures && snapshot.player.is_structure(destination)) {
                reservations.reserve(destination);
            }
            Command::Move {
                unit: unit.id,
                direction,
            }
        }
        None => Command::Hold { unit: unit.id },
    }
}
