use std::collections::HashSet;

use forager_bot::{Bot, BotConfig};
use forager_core::{
    Board, Cell, Command, Direction, GameConstants, PlayerSnapshot, Position, Role, TurnSnapshot,
    UnitId, UnitSnapshot, UnitView,
};

struct Scenario {
    width: u32,
    height: u32,
    turn_number: u32,
    budget: u32,
    shipyard: Position,
    units: Vec<UnitSnapshot>,
    resources: Vec<(Position, u16)>,
    blocked: Vec<Position>,
}

impl Scenario {
    fn new(width: u32, height: u32, shipyard: Position) -> Self {
        Self {
            width,
            height,
            turn_number: 1,
            budget: 0,
            shipyard,
            units: Vec::new(),
            resources: Vec::new(),
            blocked: Vec::new(),
        }
    }

    fn turn(mut self, turn_number: u32) -> Self {
        self.turn_number = turn_number;
        self
    }

    fn budget(mut self, budget: u32) -> Self {
        self.budget = budget;
        self
    }

    fn unit(mut self, id: u32, position: Position, cargo: u16) -> Self {
        self.units.push(UnitSnapshot {
            id: UnitId::new(id),
            position,
            cargo,
        });
        self
    }

    fn resource(mut self, position: Position, amount: u16) -> Self {
        self.resources.push((position, amount));
        self
    }

    fn blocked(mut self, position: Position) -> Self {
        self.blocked.push(position);
        self
    }

    fn build(self) -> TurnSnapshot {
        let mut cells = vec![Cell::default(); (self.width * self.height) as usize];
        let index = |position: Position| (position.y() * self.width + position.x()) as usize;
        for (position, amount) in &self.resources {
            cells[index(*position)].resource = *amount;
        }
        for unit in &self.units {
            cells[index(unit.position)].occupied = true;
        }
        for position in &self.blocked {
            cells[index(*position)].occupied = true;
        }
        cells[index(self.shipyard)].structure = true;
        TurnSnapshot {
            turn_number: self.turn_number,
            board: Board::from_cells(self.width, self.height, cells).expect("valid board"),
            player: PlayerSnapshot {
                budget: self.budget,
                shipyard: self.shipyard,
                dropoffs: Vec::new(),
                units: UnitView::from_snapshots(self.units),
            },
            constants: GameConstants::default(),
        }
    }
}

fn move_destination(snapshot: &TurnSnapshot, command: &Command) -> Option<Position> {
    let unit_id = command.unit()?;
    let unit = snapshot
        .player
        .units
        .iter()
        .find(|unit| unit.id == unit_id)
        .copied()?;
    match command {
        Command::Move { direction, .. } => {
            Some(snapshot.board.torus().offset(unit.position, *direction))
        }
        _ => None,
    }
}

#[test]
fn full_unit_turns_home_and_closes_the_distance() {
    // Scenario A: cargo at capacity, three steps east of the shipyard.
    let shipyard = Position::new(16, 16);
    let start = Position::new(19, 16);
    let snapshot = Scenario::new(32, 32, shipyard)
        .turn(50)
        .unit(1, start, 1000)
        .build();
    let mut bot = Bot::new(BotConfig::default());

    let commands = bot.plan_turn(&snapshot);

    assert_eq!(bot.role_of(UnitId::new(1)), Role::Returning);
    let command = commands[0];
    let destination = move_destination(&snapshot, &command).expect("expected a move");
    let torus = snapshot.board.torus();
    assert_eq!(
        torus.distance(destination, shipyard) + 1,
        torus.distance(start, shipyard)
    );
}

#[test]
fn earlier_unit_wins_the_contested_cell() {
    // Scenario B: both units covet the rich cell at (5, 5).
    let contested = Position::new(5, 5);
    let snapshot = Scenario::new(16, 16, Position::new(0, 0))
        .unit(1, Position::new(5, 4), 0)
        .unit(2, Position::new(4, 5), 0)
        .resource(contested, 300)
        .build();
    let mut bot = Bot::new(BotConfig::default());

    let commands = bot.plan_turn(&snapshot);
    assert_eq!(commands.len(), 2);

    let first = move_destination(&snapshot, &commands[0]).expect("unit 1 should move");
    assert_eq!(first, contested);

    let second = move_destination(&snapshot, &commands[1]);
    assert_ne!(second, Some(contested));
}

#[test]
fn recall_overrides_roles_near_the_deadline() {
    // Scenario C: ten turns before match end on a 32-wide map.
    let shipyard = Position::new(16, 16);
    let snapshot = Scenario::new(32, 32, shipyard)
        .turn(391)
        .budget(5000)
        .unit(1, Position::new(5, 16), 0)
        .build();
    let mut bot = Bot::new(BotConfig::default());

    let commands = bot.plan_turn(&snapshot);

    assert_eq!(bot.role_of(UnitId::new(1)), Role::SelfDestruct);
    let destination = move_destination(&snapshot, &commands[0]).expect("expected a recall move");
    let torus = snapshot.board.torus();
    assert!(torus.distance(destination, shipyard) < torus.distance(Position::new(5, 16), shipyard));
    assert!(
        !commands.contains(&Command::SpawnUnit),
        "no production during the recall phase"
    );
}

#[test]
fn stranded_unit_holds_still() {
    // Scenario D: empty cell, all four neighbors taken.
    let origin = Position::new(8, 8);
    let snapshot = Scenario::new(16, 16, Position::new(0, 0))
        .unit(1, origin, 0)
        .blocked(Position::new(8, 7))
        .blocked(Position::new(8, 9))
        .blocked(Position::new(9, 8))
        .blocked(Position::new(7, 8))
        .build();
    let mut bot = Bot::new(BotConfig::default());

    let commands = bot.plan_turn(&snapshot);
    assert_eq!(commands[0], Command::Hold { unit: UnitId::new(1) });
}

#[test]
fn one_command_per_unit_and_unique_destinations() {
    let shipyard = Position::new(0, 0);
    let mut scenario = Scenario::new(16, 16, shipyard).budget(900);
    let cluster = [
        Position::new(7, 7),
        Position::new(8, 7),
        Position::new(7, 8),
        Position::new(8, 8),
        Position::new(9, 8),
    ];
    for (offset, position) in cluster.into_iter().enumerate() {
        scenario = scenario.unit(offset as u32 + 1, position, 0);
    }
    let snapshot = scenario
        .resource(Position::new(6, 7), 120)
        .resource(Position::new(9, 7), 140)
        .build();
    let mut bot = Bot::new(BotConfig::default());

    let commands = bot.plan_turn(&snapshot);

    let mut addressed = HashSet::new();
    for command in &commands {
        if let Some(unit) = command.unit() {
            assert!(addressed.insert(unit), "unit {unit:?} commanded twice");
        }
    }
    assert_eq!(addressed.len(), 5, "every unit receives a command");

    let mut destinations = HashSet::new();
    for command in &commands {
        if let Some(destination) = move_destination(&snapshot, command) {
            if !snapshot.player.is_structure(destination) {
                assert!(
                    destinations.insert(destination),
                    "two moves resolve to {destination:?}"
                );
            }
        }
    }
}

#[test]
fn arrival_resumes_harvesting_and_clears_the_drop_point() {
    let shipyard = Position::new(16, 16);
    let start = Position::new(17, 16);
    let mut bot = Bot::new(BotConfig::default());

    // Turn one: the full unit commits to returning and steps onto the yard.
    let outbound = Scenario::new(32, 32, shipyard)
        .turn(60)
        .unit(1, start, 1000)
        .build();
    let commands = bot.plan_turn(&outbound);
    assert_eq!(
        commands[0],
        Command::Move {
            unit: UnitId::new(1),
            direction: Direction::West,
        }
    );

    // Turn two: cargo banked, standing on the shipyard.
    let arrived = Scenario::new(32, 32, shipyard)
        .turn(61)
        .unit(1, shipyard, 0)
        .build();
    let commands = bot.plan_turn(&arrived);
    assert_eq!(bot.role_of(UnitId::new(1)), Role::Harvesting);
    match commands[0] {
        Command::Move { direction, .. } => {
            assert!(matches!(direction, Direction::North | Direction::South));
        }
        Command::Hold { .. } => {}
        other => panic!("unexpected arrival command {other:?}"),
    }
}

#[test]
fn spawn_waits_for_an_inbound_unit_to_clear_the_shipyard() {
    // A full unit one step east will land on the yard this turn; producing
    // as well would put two units on the shipyard cell next turn.
    let shipyard = Position::new(16, 16);
    let snapshot = Scenario::new(32, 32, shipyard)
        .turn(50)
        .budget(1000)
        .unit(1, Position::new(17, 16), 1000)
        .build();
    let mut bot = Bot::new(BotConfig::default());

    let commands = bot.plan_turn(&snapshot);
    assert_eq!(
        commands[0],
        Command::Move {
            unit: UnitId::new(1),
            direction: Direction::West,
        }
    );
    assert!(!commands.contains(&Command::SpawnUnit));
}

#[test]
fn spawn_rebuilds_an_empty_fleet() {
    let snapshot = Scenario::new(32, 32, Position::new(16, 16))
        .turn(10)
        .budget(1000)
        .build();
    let mut bot = Bot::new(BotConfig::default());

    let commands = bot.plan_turn(&snapshot);
    assert_eq!(commands, vec![Command::SpawnUnit]);
}
