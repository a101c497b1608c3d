#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-unit role ledger implementing the harvesting state machine.
//!
//! The ledger owns all role state so the decision loop never touches a raw
//! map. Transitions are restricted to the three legal edges: a unit begins
//! returning when its hold fills, resumes harvesting when it reaches a
//! structure, and every unit is forced into the terminal self-destruct role
//! once the endgame deadline passes. Unknown identities default to
//! harvesting on first sight, and stale identities are pruned against the
//! unit list reported each turn.

use std::collections::HashMap;

use forager_core::{Role, UnitId};

/// Controller that owns every unit's role across turns.
#[derive(Clone, Debug, Default)]
pub struct RoleLedger {
    roles: HashMap<UnitId, Role>,
    self_destruct: bool,
}

impl RoleLedger {
    /// Creates an empty ledger with no known units.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unit's role, registering it as harvesting on first sight.
    pub fn observe(&mut self, unit: UnitId) -> Role {
        if self.self_destruct {
            return Role::SelfDestruct;
        }
        *self.roles.entry(unit).or_insert(Role::Harvesting)
    }

    /// Role currently stored for the unit, without registering it.
    #[must_use]
    pub fn role(&self, unit: UnitId) -> Role {
        if self.self_destruct {
            return Role::SelfDestruct;
        }
        self.roles.get(&unit).copied().unwrap_or(Role::Harvesting)
    }

    /// Marks a full unit as returning to the nearest structure.
    pub fn begin_return(&mut self, unit: UnitId) {
        if self.self_destruct {
            return;
        }
        let _ = self.roles.insert(unit, Role::Returning);
    }

    /// Marks a unit that reached a structure as harvesting again.
    pub fn arrive(&mut self, unit: UnitId) {
        if self.self_destruct {
            return;
        }
        let _ = self.roles.insert(unit, Role::Harvesting);
    }

    /// Forces every unit, present and future, into the terminal role.
    ///
    /// Irreversible for the remainder of the match.
    pub fn enter_self_destruct(&mut self) {
        self.self_destruct = true;
    }

    /// Whether the ledger has entered the terminal endgame phase.
    #[must_use]
    pub const fn in_self_destruct(&self) -> bool {
        self.self_destruct
    }

    /// Drops entries for identities no longer reported by the provider.
    pub fn prune(&mut self, live: &[UnitId]) {
        self.roles.retain(|unit, _| live.contains(unit));
    }

    /// Number of identities currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether no identity is tracked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
