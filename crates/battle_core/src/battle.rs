//! Fixed-tick battle scheduler.
//!
//! [`compute_battle`] runs a whole battle in one call. [`Battle`] exposes
//! the same loop one tick at a time for tools and tests.
//!
//! Each tick runs, in order:
//! 1. spawn gating and spawning
//! 2. enemy movement
//! 3. tower radius update and firing
//! 4. removal of deleted enemies
//! 5. clock advance

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigId, GameConfig};
use crate::error::{BattleError, Result};
use crate::events::{sort_chronologically, BattleEvent};
use crate::firing::{fire_towers, update_firing_radii};
use crate::math::CellPos;
use crate::movement::move_enemies;
use crate::result::{BattleResult, MonsterStats};
use crate::state::{EnemyState, IdAllocator, TowerState};

/// Tick length used when a request does not specify one.
pub const DEFAULT_TICK_SECS: f32 = 0.01;

/// Enemies closer than this (squared) to the entry cell block spawning.
const ENTRY_CLEARANCE_SQ: f32 = 1.0;

/// Tower config id per grid cell, row-major; `None` for empty cells.
pub type TowerPlacement = Vec<Vec<Option<ConfigId>>>;

fn default_tick_secs() -> f32 {
    DEFAULT_TICK_SECS
}

/// Everything needed to run one battle against a [`GameConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Towers on the playfield; must match its dimensions.
    pub tower_placement: TowerPlacement,
    /// Enemy config ids, in spawn order.
    pub wave: Vec<ConfigId>,
    /// One path per wave entry, in the same order.
    pub paths: Vec<Vec<CellPos>>,
    /// Simulated seconds per tick.
    #[serde(default = "default_tick_secs")]
    pub tick_duration_secs: f32,
    /// Abort after this many ticks.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl BattleRequest {
    /// Create a request with the default tick length and no tick limit.
    #[must_use]
    pub fn new(tower_placement: TowerPlacement, wave: Vec<ConfigId>, paths: Vec<Vec<CellPos>>) -> Self {
        Self {
            tower_placement,
            wave,
            paths,
            tick_duration_secs: DEFAULT_TICK_SECS,
            max_ticks: None,
        }
    }

    /// Set the tick length.
    #[must_use]
    pub fn with_tick_duration(mut self, secs: f32) -> Self {
        self.tick_duration_secs = secs;
        self
    }

    /// Set a tick limit.
    #[must_use]
    pub fn with_max_ticks(mut self, limit: u64) -> Self {
        self.max_ticks = Some(limit);
        self
    }

    /// Check the request's shape against `config`.
    ///
    /// Tower and enemy ids are not checked here; unknown ids abort the
    /// battle itself and are reported in the result.
    ///
    /// # Errors
    ///
    /// - [`BattleError::PlacementShapeMismatch`] if the placement grid does
    ///   not match the playfield
    /// - [`BattleError::WavePathMismatch`] if wave and paths differ in length
    /// - [`BattleError::EmptyPath`] if a path has no nodes
    /// - [`BattleError::InvalidTickDuration`] unless the tick is finite and
    ///   positive
    pub fn validate(&self, config: &GameConfig) -> Result<()> {
        let playfield = config.playfield();
        let rows = self.tower_placement.len();
        let bad_row = self
            .tower_placement
            .iter()
            .find(|row| row.len() != playfield.num_cols);
        if rows != playfield.num_rows || bad_row.is_some() {
            return Err(BattleError::PlacementShapeMismatch {
                expected_rows: playfield.num_rows,
                expected_cols: playfield.num_cols,
                rows,
                cols: bad_row
                    .or_else(|| self.tower_placement.first())
                    .map_or(0, Vec::len),
            });
        }

        if self.wave.len() != self.paths.len() {
            return Err(BattleError::WavePathMismatch {
                wave: self.wave.len(),
                paths: self.paths.len(),
            });
        }
        if let Some(index) = self.paths.iter().position(Vec::is_empty) {
            return Err(BattleError::EmptyPath { index });
        }

        if !self.tick_duration_secs.is_finite() || self.tick_duration_secs <= 0.0 {
            return Err(BattleError::InvalidTickDuration(self.tick_duration_secs));
        }

        Ok(())
    }
}

/// A battle in progress.
#[derive(Debug)]
pub struct Battle<'a> {
    config: &'a GameConfig,
    request: &'a BattleRequest,
    towers: Vec<TowerState>,
    enemies: Vec<EnemyState>,
    /// Wave in reverse so the next enemy pops off the end.
    unspawned: Vec<ConfigId>,
    spawned: usize,
    ids: IdAllocator,
    events: Vec<BattleEvent>,
    stats: BTreeMap<ConfigId, MonsterStats>,
    removed: Vec<usize>,
    tick: u64,
    game_time: f32,
    final_game_time: f32,
}

impl<'a> Battle<'a> {
    /// Validate the request and place the towers.
    ///
    /// Towers are numbered in row-major order of the placement grid.
    ///
    /// # Errors
    ///
    /// Any error from [`BattleRequest::validate`], or
    /// [`BattleError::UnknownTowerConfig`] for a placed tower the config
    /// does not define.
    pub fn new(config: &'a GameConfig, request: &'a BattleRequest) -> Result<Self> {
        request.validate(config)?;

        let mut towers = Vec::new();
        for (row, cells) in request.tower_placement.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let Some(tower_id) = *cell else {
                    continue;
                };
                let slot = config.tower_slot(tower_id)?;
                let id = u16::try_from(towers.len()).map_err(|_| BattleError::IdSpaceExhausted)?;
                towers.push(TowerState::new(id, CellPos::from_grid(row, col), slot, config));
            }
        }

        Ok(Self {
            config,
            request,
            towers,
            enemies: Vec::new(),
            unspawned: request.wave.iter().rev().copied().collect(),
            spawned: 0,
            ids: IdAllocator::new(),
            events: Vec::new(),
            stats: BTreeMap::new(),
            removed: Vec::new(),
            tick: 0,
            game_time: 0.0,
            final_game_time: 0.0,
        })
    }

    /// Whether every enemy has been spawned and removed again.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.unspawned.is_empty() && self.enemies.is_empty()
    }

    /// Ticks processed so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Game time of the next tick.
    #[must_use]
    pub const fn game_time(&self) -> f32 {
        self.game_time
    }

    /// Placed towers.
    #[must_use]
    pub fn towers(&self) -> &[TowerState] {
        &self.towers
    }

    /// Enemies currently on the playfield.
    #[must_use]
    pub fn enemies(&self) -> &[EnemyState] {
        &self.enemies
    }

    /// Events generated so far, unsorted.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Sent and defeated counts so far.
    #[must_use]
    pub const fn stats(&self) -> &BTreeMap<ConfigId, MonsterStats> {
        &self.stats
    }

    /// Run one tick. Does nothing once the battle is finished.
    ///
    /// # Errors
    ///
    /// - [`BattleError::TickLimitExceeded`] if the request's tick limit is
    ///   reached
    /// - [`BattleError::UnknownEnemyConfig`] when spawning an enemy the
    ///   config does not define
    /// - [`BattleError::IdSpaceExhausted`] when no object id is left
    ///
    /// The battle stays inspectable after an error, but must not be ticked
    /// further.
    pub fn tick(&mut self) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        if let Some(limit) = self.request.max_ticks {
            if self.tick >= limit {
                return Err(BattleError::TickLimitExceeded { limit });
            }
        }

        self.final_game_time = self.game_time;

        if self.entry_is_clear() {
            self.spawn_next()?;
        }

        move_enemies(
            self.game_time,
            &mut self.enemies,
            &self.request.paths,
            self.config,
            &mut self.events,
            &mut self.removed,
        );

        update_firing_radii(self.game_time, &mut self.towers, self.config);
        fire_towers(
            self.game_time,
            &mut self.towers,
            &mut self.enemies,
            self.config,
            &mut self.ids,
            &mut self.events,
            &mut self.removed,
            &mut self.stats,
        )?;

        self.remove_marked();

        self.tick += 1;
        self.game_time = self.tick as f32 * self.request.tick_duration_secs;
        Ok(())
    }

    /// Tick until the battle is finished.
    ///
    /// # Errors
    ///
    /// The first error returned by [`tick`](Self::tick).
    pub fn run(&mut self) -> Result<()> {
        while !self.is_finished() {
            self.tick()?;
        }
        Ok(())
    }

    /// Sort the events and assemble the result.
    ///
    /// With the `debug-validation` feature the sorted stream is checked and
    /// a failure is recorded as the result's error message.
    #[must_use]
    pub fn finish(self) -> BattleResult {
        let mut events = self.events;
        sort_chronologically(&mut events);

        #[cfg(feature = "debug-validation")]
        let error_message = match crate::validation::validate_events(&events) {
            Ok(()) => String::new(),
            Err(err) => {
                tracing::warn!(error = %err, "Battle produced an invalid event stream");
                err.to_string()
            }
        };
        #[cfg(not(feature = "debug-validation"))]
        let error_message = String::new();

        BattleResult {
            error_message,
            monster_stats: self.stats,
            events,
            final_game_time: self.final_game_time,
        }
    }

    /// Hash of the tick counter, clock, and every tower and enemy.
    ///
    /// Two battles with identical inputs have identical hashes after the
    /// same number of ticks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.game_time.to_bits().hash(&mut hasher);
        self.ids.allocated().hash(&mut hasher);

        self.towers.len().hash(&mut hasher);
        for tower in &self.towers {
            tower.id.hash(&mut hasher);
            tower.last_fired_time.to_bits().hash(&mut hasher);
            tower.firing_radius_sq.to_bits().hash(&mut hasher);
        }

        self.enemies.len().hash(&mut hasher);
        for enemy in &self.enemies {
            enemy.id.hash(&mut hasher);
            enemy.position.to_bits().hash(&mut hasher);
            enemy.path_index.hash(&mut hasher);
            enemy.next_path_time.to_bits().hash(&mut hasher);
            enemy.health.to_bits().hash(&mut hasher);
        }

        self.events.len().hash(&mut hasher);
        hasher.finish()
    }

    /// No spawned enemy is standing on the entry cell.
    fn entry_is_clear(&self) -> bool {
        let entry = self.config.playfield().enemy_enter_cell();
        self.enemies
            .iter()
            .all(|enemy| enemy.position.distance_squared(entry) >= ENTRY_CLEARANCE_SQ)
    }

    fn spawn_next(&mut self) -> Result<()> {
        let Some(&config_id) = self.unspawned.last() else {
            return Ok(());
        };
        let slot = self.config.enemy_slot(config_id)?;
        let id = self.ids.allocate()?;
        self.unspawned.pop();

        let path = self.spawned;
        self.spawned += 1;
        let start = self.request.paths[path][0];
        self.enemies.push(EnemyState::new(
            id,
            config_id,
            slot,
            path,
            start,
            self.game_time,
            self.config,
        ));
        self.stats.entry(config_id).or_default().num_sent += 1;

        tracing::debug!(enemy = id, config = config_id, time = self.game_time, "Enemy spawned");
        Ok(())
    }

    /// Swap-remove marked enemies, highest index first so lower indices
    /// stay valid.
    fn remove_marked(&mut self) {
        self.removed.sort_unstable_by(|a, b| b.cmp(a));
        self.removed.dedup();
        for index in self.removed.drain(..) {
            self.enemies.swap_remove(index);
        }
    }
}

/// Run a battle to completion.
///
/// Errors raised while the battle runs (unknown tower or enemy ids, id
/// exhaustion, the tick limit) abort it; the events and statistics
/// gathered so far are returned with the error's message.
///
/// # Errors
///
/// Only the precondition failures of [`BattleRequest::validate`] are
/// returned as `Err`.
pub fn compute_battle(config: &GameConfig, request: &BattleRequest) -> Result<BattleResult> {
    let mut battle = match Battle::new(config, request) {
        Ok(battle) => battle,
        Err(err) if err.is_recoverable() => {
            tracing::warn!(error = %err, "Battle aborted before the first tick");
            return Ok(BattleResult {
                error_message: err.to_string(),
                ..BattleResult::default()
            });
        }
        Err(err) => return Err(err),
    };

    tracing::info!(
        wave = request.wave.len(),
        towers = battle.towers.len(),
        tick_secs = request.tick_duration_secs,
        "Starting battle"
    );

    let outcome = battle.run();
    let ticks = battle.current_tick();
    let mut result = battle.finish();

    if let Err(err) = outcome {
        if !err.is_recoverable() {
            return Err(err);
        }
        tracing::warn!(error = %err, tick = ticks, "Battle aborted");
        result.error_message = err.to_string();
    }

    tracing::info!(
        ticks,
        events = result.events.len(),
        final_time = result.final_game_time,
        "Battle finished"
    );
    Ok(result)
}
