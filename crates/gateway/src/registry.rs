// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot registry: the single source of truth for robot identity and status.
//!
//! Robots are keyed by name and kept in first-seen order. They are never
//! removed; an operator "disconnect" only flips the `connected` flag. All
//! state lives behind one `RwLock`, so every mutation is atomic with respect
//! to the name lookup and every [`Registry::snapshot`] is a consistent copy.

use std::collections::HashMap;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::{RegistrationPolicy, ShortIdCollision};
use crate::error::GatewayError;

/// Identity and status record for one robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    pub name: String,
    /// Most recent command applied, e.g. `forward`.
    pub last_operation: Option<String>,
    pub operation_count: u64,
    /// Operator-controlled enable flag, independent of network reachability.
    pub connected: bool,
    /// Whether the last forwarded call to this robot succeeded.
    pub reachable: bool,
}

impl Robot {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            last_operation: None,
            operation_count: 0,
            connected: true,
            reachable: false,
        }
    }

    fn record(&mut self, operation: &str) {
        self.last_operation = Some(operation.to_owned());
        self.operation_count += 1;
    }

    pub fn short_id(&self) -> String {
        short_id(&self.name)
    }

    pub fn is_disconnected(&self) -> bool {
        !self.connected
    }
}

/// Dashboard short identifier: the robot name with every `.` removed.
pub fn short_id(name: &str) -> String {
    name.replace('.', "")
}

#[derive(Default)]
struct RobotTable {
    robots: IndexMap<String, Robot>,
    /// Short id to positions in `robots`, oldest first. Append-only.
    short_ids: HashMap<String, Vec<usize>>,
}

impl RobotTable {
    /// Insert a new robot. Returns `true` if its short id was already taken.
    fn insert(&mut self, robot: Robot) -> bool {
        let short = robot.short_id();
        let (index, _) = self.robots.insert_full(robot.name.clone(), robot);
        let slots = self.short_ids.entry(short).or_default();
        slots.push(index);
        slots.len() > 1
    }

    fn resolve(&self, short_id: &str, collision: ShortIdCollision) -> Result<usize, GatewayError> {
        let slots = self.short_ids.get(short_id).map(Vec::as_slice).unwrap_or_default();
        match (slots, collision) {
            ([], _) => Err(GatewayError::UnknownRobot),
            ([index], _) => Ok(*index),
            ([first, ..], ShortIdCollision::FirstMatch) => Ok(*first),
            (_, ShortIdCollision::Reject) => Err(GatewayError::AmbiguousShortId),
        }
    }
}

/// Concurrent registry of every robot the gateway has seen.
pub struct Registry {
    policy: RegistrationPolicy,
    collision: ShortIdCollision,
    table: RwLock<RobotTable>,
}

impl Registry {
    pub fn new(policy: RegistrationPolicy, collision: ShortIdCollision) -> Self {
        Self { policy, collision, table: RwLock::new(RobotTable::default()) }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    pub fn collision(&self) -> ShortIdCollision {
        self.collision
    }

    /// Register a robot. Returns `true` if it was created, `false` if it
    /// already existed (nothing is changed in that case).
    pub fn register(&self, name: &str) -> bool {
        let collides = {
            let mut table = self.table.write();
            if table.robots.contains_key(name) {
                None
            } else {
                Some(table.insert(Robot::new(name)))
            }
        };

        match collides {
            None => {
                tracing::debug!(robot = %name, "robot already registered");
                false
            }
            Some(collides) => {
                tracing::info!(robot = %name, "robot registered");
                if collides {
                    warn_collision(name, self.collision);
                }
                true
            }
        }
    }

    /// Record a command applied to `name`: sets the last operation and bumps
    /// the counter. Returns whether the robot is currently disconnected.
    ///
    /// Unknown robots are created under [`RegistrationPolicy::Auto`] and
    /// rejected with [`GatewayError::UnknownRobot`] under
    /// [`RegistrationPolicy::Explicit`].
    pub fn record_operation(&self, name: &str, operation: &str) -> Result<bool, GatewayError> {
        let outcome = {
            let mut table = self.table.write();
            if let Some(robot) = table.robots.get_mut(name) {
                robot.record(operation);
                Recorded::Existing { disconnected: robot.is_disconnected() }
            } else if self.policy == RegistrationPolicy::Auto {
                let mut robot = Robot::new(name);
                robot.record(operation);
                let disconnected = robot.is_disconnected();
                let collides = table.insert(robot);
                Recorded::Created { disconnected, collides }
            } else {
                Recorded::Unknown
            }
        };

        match outcome {
            Recorded::Existing { disconnected } => {
                tracing::debug!(robot = %name, operation, disconnected, "operation recorded");
                Ok(disconnected)
            }
            Recorded::Created { disconnected, collides } => {
                tracing::info!(robot = %name, operation, "robot auto-registered");
                if collides {
                    warn_collision(name, self.collision);
                }
                Ok(disconnected)
            }
            Recorded::Unknown => {
                tracing::warn!(robot = %name, operation, "operation for unregistered robot");
                Err(GatewayError::UnknownRobot)
            }
        }
    }

    /// Record the outcome of the latest forwarding attempt. Unknown robots
    /// are ignored with a warning.
    pub fn set_reachable(&self, name: &str, ok: bool) {
        let found = {
            let mut table = self.table.write();
            match table.robots.get_mut(name) {
                Some(robot) => {
                    robot.reachable = ok;
                    true
                }
                None => false,
            }
        };
        if !found {
            tracing::warn!(robot = %name, reachable = ok, "reachability reported for unknown robot");
        }
    }

    /// Flip the `connected` flag of the robot matching `short_id`. Returns
    /// the new disconnected state.
    pub fn toggle_disconnect(&self, short_id: &str) -> Result<bool, GatewayError> {
        self.toggle_by_short_id(short_id).map(|robot| robot.is_disconnected())
    }

    /// Like [`Registry::toggle_disconnect`], but returns a copy of the robot
    /// taken under the same lock as the flip.
    pub fn toggle_by_short_id(&self, short_id: &str) -> Result<Robot, GatewayError> {
        let toggled = {
            let mut table = self.table.write();
            table.resolve(short_id, self.collision).and_then(|index| {
                let (_, robot) =
                    table.robots.get_index_mut(index).ok_or(GatewayError::Internal)?;
                robot.connected = !robot.connected;
                Ok(robot.clone())
            })
        };

        match toggled {
            Ok(robot) => {
                tracing::info!(
                    robot = %robot.name,
                    short_id,
                    disconnected = robot.is_disconnected(),
                    "robot connection toggled"
                );
                Ok(robot)
            }
            Err(e) => {
                tracing::warn!(short_id, err = %e, "cannot toggle robot connection");
                Err(e)
            }
        }
    }

    /// Read-only lookup by short id.
    pub fn find_by_short_id(&self, short_id: &str) -> Result<Robot, GatewayError> {
        let table = self.table.read();
        let index = table.resolve(short_id, self.collision)?;
        table.robots.get_index(index).map(|(_, robot)| robot.clone()).ok_or(GatewayError::Internal)
    }

    /// Read-only lookup by full name.
    pub fn get(&self, name: &str) -> Option<Robot> {
        self.table.read().robots.get(name).cloned()
    }

    /// Whether `name` is disconnected, without counting an operation.
    pub fn is_disconnected(&self, name: &str) -> Result<bool, GatewayError> {
        self.table
            .read()
            .robots
            .get(name)
            .map(Robot::is_disconnected)
            .ok_or(GatewayError::UnknownRobot)
    }

    /// Point-in-time copy of all robots in first-seen order.
    pub fn snapshot(&self) -> Vec<Robot> {
        self.table.read().robots.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.read().robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistrationPolicy::default(), ShortIdCollision::default())
    }
}

enum Recorded {
    Existing { disconnected: bool },
    Created { disconnected: bool, collides: bool },
    Unknown,
}

fn warn_collision(name: &str, collision: ShortIdCollision) {
    tracing::warn!(
        robot = %name,
        short_id = %short_id(name),
        policy = %collision,
        "short id collides with an existing robot"
    );
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
