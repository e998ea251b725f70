//! Mutable per-battle state for towers and enemies.

use crate::config::{ConfigId, EnemySlot, GameConfig, TowerSlot};
use crate::error::{BattleError, Result};
use crate::math::CellPos;

/// Identifier of a runtime object within one battle.
pub type ObjectId = u16;

/// Hands out battle-unique ids for dynamic objects.
///
/// Enemies and projectiles draw from the same counter, so an id never
/// names two different objects in one event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Create an allocator starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate the next id.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::IdSpaceExhausted`] once every `u16` has been
    /// handed out.
    pub fn allocate(&mut self) -> Result<ObjectId> {
        let id = ObjectId::try_from(self.next).map_err(|_| BattleError::IdSpaceExhausted)?;
        self.next += 1;
        Ok(id)
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub const fn allocated(&self) -> u32 {
        self.next
    }
}

/// A placed tower.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerState {
    /// Tower id, numbered in row-major placement order.
    pub id: ObjectId,
    /// Grid-aligned position.
    pub position: CellPos,
    /// Time the last shot was launched.
    pub last_fired_time: f32,
    /// Squared reach of a shot landing now, refreshed every tick.
    pub firing_radius_sq: f32,
    /// Definition of this tower.
    pub config: TowerSlot,
}

impl TowerState {
    /// Create a tower that may fire at game time zero.
    #[must_use]
    pub fn new(id: ObjectId, position: CellPos, slot: TowerSlot, config: &GameConfig) -> Self {
        let tower = config.tower(slot);
        let last_fired_time = if tower.can_fire() {
            -tower.cooldown_secs()
        } else {
            -1.0
        };
        Self {
            id,
            position,
            last_fired_time,
            firing_radius_sq: 0.0,
            config: slot,
        }
    }
}

/// A spawned enemy walking its path.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyState {
    /// Battle-unique object id.
    pub id: ObjectId,
    /// Config id reported in move events.
    pub config_id: ConfigId,
    /// Definition of this enemy.
    pub config: EnemySlot,
    /// Index into the request's path list.
    pub path: usize,
    /// Interpolated position as of the current tick.
    pub position: CellPos,
    /// Index of the path node the enemy is heading to.
    pub path_index: usize,
    /// Time the enemy left `path[path_index - 1]`.
    pub last_path_time: f32,
    /// Time the enemy reaches `path[path_index]`.
    pub next_path_time: f32,
    /// Remaining health; forced to exactly zero once the enemy is removed.
    pub health: f32,
    /// Length of the path segments completed so far.
    pub distance_traveled: f32,
}

impl EnemyState {
    /// Create an enemy standing on the first node of its path.
    ///
    /// `next_path_time` equals the spawn time, so the first movement pass
    /// immediately starts the first segment.
    #[must_use]
    pub fn new(
        id: ObjectId,
        config_id: ConfigId,
        slot: EnemySlot,
        path: usize,
        start: CellPos,
        spawn_time: f32,
        config: &GameConfig,
    ) -> Self {
        Self {
            id,
            config_id,
            config: slot,
            path,
            position: start,
            path_index: 0,
            last_path_time: spawn_time,
            next_path_time: spawn_time,
            health: config.enemy(slot).health,
            distance_traveled: 0.0,
        }
    }

    /// Whether towers may still shoot at this enemy.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.health > 0.0
    }
}
