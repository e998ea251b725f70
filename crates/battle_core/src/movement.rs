//! Enemy path traversal.
//!
//! Enemies walk their precomputed paths at constant speed. Each path
//! segment is announced once with a [`MoveEvent`] when the enemy starts
//! it; between announcements the enemy's position is interpolated so that
//! towers can aim at it.

use crate::config::GameConfig;
use crate::events::{BattleEvent, DeleteEvent, MoveEvent, ObjectType};
use crate::math::CellPos;
use crate::state::EnemyState;

/// Advances every spawned enemy to `game_time`.
///
/// When an enemy has reached the node it was heading to, it either starts
/// the next segment (emitting a move event) or, at the end of its path, is
/// deleted: a delete event is emitted, its index is pushed to `removed`
/// and its health is forced to zero so no tower shoots it this tick.
///
/// At most one segment transition happens per enemy per call. With fine
/// ticks this is indistinguishable from catching up over several short
/// segments, and the client expects exactly this timing.
///
/// # Arguments
/// * `game_time` - Current simulated time in seconds
/// * `enemies` - Spawned enemies, in spawn-slot order
/// * `paths` - Every path in the battle request; enemies index into it
/// * `config` - Game configuration the enemies' slots refer to
/// * `events` - Event log to append to
/// * `removed` - Indices into `enemies` that must be removed after the tick
pub fn move_enemies(
    game_time: f32,
    enemies: &mut [EnemyState],
    paths: &[Vec<CellPos>],
    config: &GameConfig,
    events: &mut Vec<BattleEvent>,
    removed: &mut Vec<usize>,
) {
    for (index, enemy) in enemies.iter_mut().enumerate() {
        let path = paths[enemy.path].as_slice();

        if enemy.next_path_time <= game_time {
            if let Some(prev) = enemy.path_index.checked_sub(1) {
                enemy.distance_traveled += path[prev].distance(path[enemy.path_index]);
            }

            if enemy.path_index + 1 >= path.len() {
                events.push(
                    DeleteEvent {
                        object_type: ObjectType::Enemy,
                        id: enemy.id,
                        start_time: enemy.next_path_time,
                    }
                    .into(),
                );
                removed.push(index);
                enemy.health = 0.0;
                tracing::debug!(
                    enemy = enemy.id,
                    time = enemy.next_path_time,
                    "Enemy reached the end of its path"
                );
                continue;
            }

            let from = path[enemy.path_index];
            let to = path[enemy.path_index + 1];
            let time_to_next = from.distance(to) / config.enemy(enemy.config).speed;
            events.push(
                MoveEvent {
                    object_type: ObjectType::Enemy,
                    id: enemy.id,
                    config_id: enemy.config_id,
                    start_pos: from,
                    dest_pos: to,
                    start_time: enemy.next_path_time,
                    end_time: enemy.next_path_time + time_to_next,
                }
                .into(),
            );

            enemy.path_index += 1;
            enemy.last_path_time = enemy.next_path_time;
            enemy.next_path_time += time_to_next;
        }

        enemy.position = interpolate(enemy, path, game_time);
    }
}

/// Position of `enemy` on its current segment at `game_time`.
fn interpolate(enemy: &EnemyState, path: &[CellPos], game_time: f32) -> CellPos {
    let Some(prev) = enemy.path_index.checked_sub(1) else {
        return path[0];
    };
    let from = path[prev];
    let to = path[enemy.path_index];

    // Zero-length segment
    let span = enemy.next_path_time - enemy.last_path_time;
    if span <= 0.0 {
        return to;
    }

    let fraction = (game_time - enemy.last_path_time) / span;
    from.lerp(to, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{config, enemy, row_path};

    fn spawn(config: &GameConfig, id: u16, path: usize, paths: &[Vec<CellPos>], t: f32) -> EnemyState {
        let slot = config.enemy_slot(1).unwrap();
        EnemyState::new(id, 1, slot, path, paths[path][0], t, config)
    }

    #[test]
    fn test_first_tick_starts_first_segment() {
        let config = config(3, 5, vec![], vec![enemy(1, 10.0, 2.0)]);
        let paths = vec![row_path(1, 3)];
        let mut enemies = vec![spawn(&config, 0, 0, &paths, 0.0)];
        let mut events = Vec::new();
        let mut removed = Vec::new();

        move_enemies(0.0, &mut enemies, &paths, &config, &mut events, &mut removed);

        assert!(removed.is_empty());
        assert_eq!(
            events,
            vec![BattleEvent::Move(MoveEvent {
                object_type: ObjectType::Enemy,
                id: 0,
                config_id: 1,
                start_pos: CellPos::new(1.0, 0.0),
                dest_pos: CellPos::new(1.0, 1.0),
                start_time: 0.0,
                end_time: 0.5,
            })]
        );
        assert_eq!(enemies[0].path_index, 1);
        assert_eq!(enemies[0].position, CellPos::new(1.0, 0.0));
    }

    #[test]
    fn test_position_interpolates_between_nodes() {
        let config = config(3, 5, vec![], vec![enemy(1, 10.0, 2.0)]);
        let paths = vec![row_path(1, 3)];
        let mut enemies = vec![spawn(&config, 0, 0, &paths, 0.0)];
        let mut events = Vec::new();
        let mut removed = Vec::new();

        move_enemies(0.0, &mut enemies, &paths, &config, &mut events, &mut removed);
        move_enemies(0.25, &mut enemies, &paths, &config, &mut events, &mut removed);

        assert_eq!(events.len(), 1);
        assert_eq!(enemies[0].position, CellPos::new(1.0, 0.5));
    }

    #[test]
    fn test_segment_transition_accumulates_distance() {
        let config = config(3, 5, vec![], vec![enemy(1, 10.0, 2.0)]);
        let paths = vec![row_path(1, 3)];
        let mut enemies = vec![spawn(&config, 0, 0, &paths, 0.0)];
        let mut events = Vec::new();
        let mut removed = Vec::new();

        move_enemies(0.0, &mut enemies, &paths, &config, &mut events, &mut removed);
        move_enemies(0.5, &mut enemies, &paths, &config, &mut events, &mut removed);

        assert_eq!(events.len(), 2);
        let BattleEvent::Move(second) = events[1] else {
            panic!("expected move event");
        };
        assert_eq!(second.start_time, 0.5);
        assert_eq!(second.end_time, 1.0);
        assert_eq!(second.start_pos, CellPos::new(1.0, 1.0));
        assert_eq!(enemies[0].distance_traveled, 1.0);
        assert_eq!(enemies[0].position, CellPos::new(1.0, 1.0));
    }

    #[test]
    fn test_end_of_path_deletes_enemy() {
        let config = config(3, 5, vec![], vec![enemy(1, 10.0, 1.0)]);
        let paths = vec![row_path(0, 2)];
        let mut enemies = vec![spawn(&config, 3, 0, &paths, 0.0)];
        let mut events = Vec::new();
        let mut removed = Vec::new();

        move_enemies(0.0, &mut enemies, &paths, &config, &mut events, &mut removed);
        move_enemies(0.5, &mut enemies, &paths, &config, &mut events, &mut removed);
        assert!(removed.is_empty());

        // Arrival is recorded at the scheduled time, not the tick time.
        move_enemies(1.25, &mut enemies, &paths, &config, &mut events, &mut removed);
        assert_eq!(removed, vec![0]);
        assert_eq!(enemies[0].health, 0.0);
        assert!(!enemies[0].is_targetable());
        assert_eq!(
            events.last(),
            Some(&BattleEvent::Delete(DeleteEvent {
                object_type: ObjectType::Enemy,
                id: 3,
                start_time: 1.0,
            }))
        );
    }

    #[test]
    fn test_single_node_path_deletes_on_spawn() {
        let config = config(3, 5, vec![], vec![enemy(1, 10.0, 1.0)]);
        let paths = vec![vec![CellPos::new(0.0, 0.0)]];
        let mut enemies = vec![spawn(&config, 0, 0, &paths, 0.2)];
        let mut events = Vec::new();
        let mut removed = Vec::new();

        move_enemies(0.2, &mut enemies, &paths, &config, &mut events, &mut removed);

        assert_eq!(removed, vec![0]);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], BattleEvent::Delete(_)));
    }

    #[test]
    fn test_zero_length_segment_does_not_divide_by_zero() {
        let config = config(3, 5, vec![], vec![enemy(1, 10.0, 1.0)]);
        let paths = vec![vec![
            CellPos::new(0.0, 0.0),
            CellPos::new(0.0, 0.0),
            CellPos::new(0.0, 1.0),
        ]];
        let mut enemies = vec![spawn(&config, 0, 0, &paths, 0.0)];
        let mut events = Vec::new();
        let mut removed = Vec::new();

        move_enemies(0.0, &mut enemies, &paths, &config, &mut events, &mut removed);

        let pos = enemies[0].position;
        assert!(pos.row.is_finite() && pos.col.is_finite());
        assert_eq!(pos, CellPos::new(0.0, 0.0));
    }
}
