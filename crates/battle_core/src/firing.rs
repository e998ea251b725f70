//! Tower reach, target selection and damage.
//!
//! Shots are resolved backwards in time: a tower that fires at `t` is
//! recorded as having launched its projectile `distance / speed` seconds
//! earlier, so every shot lands exactly where the enemy is at `t`. The
//! reach of a tower therefore grows with the time elapsed since it could
//! last fire again, capped at its range.

use std::collections::BTreeMap;

use crate::config::{ConfigId, GameConfig};
use crate::error::Result;
use crate::events::{BattleEvent, DamageEvent, DeleteEvent, MoveEvent, ObjectType};
use crate::result::MonsterStats;
use crate::state::{EnemyState, IdAllocator, TowerState};

/// Refreshes every tower's squared firing radius for `game_time`.
///
/// ```text
/// available = max(0, game_time - (last_fired + 1 / firing_rate))
/// radius    = clamp(available * projectile_speed, 0, range)
/// ```
///
/// Towers with a non-positive firing rate are left untouched and never
/// fire.
pub fn update_firing_radii(game_time: f32, towers: &mut [TowerState], config: &GameConfig) {
    for tower in towers.iter_mut() {
        let tower_config = config.tower(tower.config);
        if !tower_config.can_fire() {
            continue;
        }

        let earliest_next_fire = tower.last_fired_time + tower_config.cooldown_secs();
        let available = (game_time - earliest_next_fire).max(0.0);
        let radius = (available * tower_config.projectile_speed)
            .min(tower_config.range)
            .max(0.0);
        tower.firing_radius_sq = radius * radius;
    }
}

/// Picks the enemy a tower shoots at.
///
/// Among targetable enemies inside the tower's current firing radius, the
/// one farthest from the tower wins, i.e. the one closest to escaping the
/// reachable zone. The first enemy in iteration order wins ties.
///
/// Returns the enemy's index and its squared distance.
#[must_use]
pub fn select_target(tower: &TowerState, enemies: &[EnemyState]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;

    for (index, enemy) in enemies.iter().enumerate() {
        if !enemy.is_targetable() {
            continue;
        }
        let dist_sq = tower.position.distance_squared(enemy.position);
        if dist_sq > tower.firing_radius_sq {
            continue;
        }
        if best.map_or(true, |(_, best_sq)| dist_sq > best_sq) {
            best = Some((index, dist_sq));
        }
    }

    best
}

/// Lets every tower with a non-zero firing radius shoot once.
///
/// For each shot a projectile move and delete event are emitted, followed
/// by a damage event for the target. A target whose health drops to zero
/// or below is deleted, pushed to `removed`, and counted as defeated in
/// `stats`.
///
/// # Errors
///
/// Returns [`crate::error::BattleError::IdSpaceExhausted`] if no id is left
/// for a projectile.
pub fn fire_towers(
    game_time: f32,
    towers: &mut [TowerState],
    enemies: &mut [EnemyState],
    config: &GameConfig,
    ids: &mut IdAllocator,
    events: &mut Vec<BattleEvent>,
    removed: &mut Vec<usize>,
    stats: &mut BTreeMap<ConfigId, MonsterStats>,
) -> Result<()> {
    for tower in towers.iter_mut() {
        if tower.firing_radius_sq <= 0.0 {
            continue;
        }

        let Some((target, dist_sq)) = select_target(tower, enemies) else {
            continue;
        };
        let tower_config = config.tower(tower.config);
        let enemy = &mut enemies[target];

        let shot_duration = dist_sq.sqrt() / tower_config.projectile_speed;
        tower.last_fired_time = (game_time - shot_duration).max(0.0);

        let projectile = ids.allocate()?;
        events.push(
            MoveEvent {
                object_type: ObjectType::Projectile,
                id: projectile,
                config_id: tower_config.projectile_type_id,
                start_pos: tower.position,
                dest_pos: enemy.position,
                start_time: tower.last_fired_time,
                end_time: game_time,
            }
            .into(),
        );
        events.push(
            DeleteEvent {
                object_type: ObjectType::Projectile,
                id: projectile,
                start_time: game_time,
            }
            .into(),
        );

        enemy.health -= tower_config.damage;
        events.push(
            DamageEvent {
                id: enemy.id,
                health: enemy.health,
                start_time: game_time,
            }
            .into(),
        );
        tracing::trace!(
            tower = tower.id,
            enemy = enemy.id,
            projectile,
            health = enemy.health,
            "Tower fired"
        );

        if enemy.health <= 0.0 {
            enemy.health = 0.0;
            events.push(
                DeleteEvent {
                    object_type: ObjectType::Enemy,
                    id: enemy.id,
                    start_time: game_time,
                }
                .into(),
            );
            removed.push(target);
            stats.entry(enemy.config_id).or_default().num_defeated += 1;
            tracing::debug!(enemy = enemy.id, time = game_time, "Enemy defeated");
        }
    }

    Ok(())
}
