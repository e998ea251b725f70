//! Property tests over randomly generated battles.

use std::collections::{BTreeMap, BTreeSet};

use battle_core::config::TowerConfig;
use battle_core::events::{BattleEvent, MoveEvent, ObjectType};
use battle_core::prelude::*;
use battle_core::validation::validate_events;
use battle_test_utils::determinism::{result_fingerprint, strategies::arb_scenario};
use battle_test_utils::fixtures::Scenario;
use proptest::prelude::*;

/// Slack for comparisons between independently rounded f32 times.
const EPSILON: f32 = 1e-3;

/// Every placed tower with its cell position, in row-major order.
fn placed_towers(scenario: &Scenario) -> Vec<(CellPos, &TowerConfig)> {
    scenario
        .request
        .tower_placement
        .iter()
        .enumerate()
        .flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|id| (row, col, id)))
        })
        .filter_map(|(row, col, id)| {
            scenario
                .config
                .tower_by_id(id)
                .map(|tower| (CellPos::from_grid(row, col), tower))
        })
        .collect()
}

/// Projectile moves grouped by the cell they were launched from.
fn shots_by_tower(events: &[BattleEvent]) -> BTreeMap<(u32, u32), Vec<MoveEvent>> {
    let mut shots: BTreeMap<(u32, u32), Vec<MoveEvent>> = BTreeMap::new();
    for event in events {
        if let BattleEvent::Move(m) = event {
            if m.object_type == ObjectType::Projectile {
                shots
                    .entry((m.start_pos.row.to_bits(), m.start_pos.col.to_bits()))
                    .or_default()
                    .push(*m);
            }
        }
    }
    shots
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_events_are_chronological(scenario in arb_scenario(6)) {
        let result = scenario.run().unwrap();
        prop_assert!(result.is_success());
        for pair in result.events.windows(2) {
            prop_assert!(pair[0].start_time() <= pair[1].start_time());
        }
        prop_assert!(validate_events(&result.events).is_ok());
    }

    #[test]
    fn prop_defeated_never_exceeds_sent(scenario in arb_scenario(6)) {
        let result = scenario.run().unwrap();
        let mut sent = 0;
        for stats in result.monster_stats.values() {
            prop_assert!(stats.num_defeated <= stats.num_sent);
            sent += stats.num_sent;
        }
        prop_assert_eq!(sent as usize, scenario.request.wave.len());
    }

    #[test]
    fn prop_every_shot_deals_damage(scenario in arb_scenario(6)) {
        let result = scenario.run().unwrap();
        let shots = result
            .events
            .iter()
            .filter(|e| matches!(e, BattleEvent::Move(m) if m.object_type == ObjectType::Projectile))
            .count();
        let hits = result
            .events
            .iter()
            .filter(|e| matches!(e, BattleEvent::Damage(_)))
            .count();
        prop_assert_eq!(shots, hits);
    }

    #[test]
    fn prop_idle_towers_never_fire(scenario in arb_scenario(6)) {
        let result = scenario.run().unwrap();
        let idle: Vec<CellPos> = placed_towers(&scenario)
            .into_iter()
            .filter(|(_, tower)| !tower.can_fire())
            .map(|(pos, _)| pos)
            .collect();

        for event in &result.events {
            if let BattleEvent::Move(m) = event {
                if m.object_type == ObjectType::Projectile {
                    prop_assert!(!idle.contains(&m.start_pos));
                }
            }
        }
    }

    #[test]
    fn prop_radius_stays_within_range(scenario in arb_scenario(4)) {
        let mut battle = scenario.battle().unwrap();
        while !battle.is_finished() {
            battle.tick().unwrap();
            for tower in battle.towers() {
                let range = scenario.config.tower(tower.config).range;
                prop_assert!(tower.firing_radius_sq >= 0.0);
                prop_assert!(tower.firing_radius_sq <= range * range);
            }
        }
    }

    #[test]
    fn prop_spawn_only_onto_clear_entry(scenario in arb_scenario(6)) {
        let entry = scenario.config.playfield().enemy_enter_cell();
        let mut battle = scenario.battle().unwrap();
        while !battle.is_finished() {
            let before: Vec<CellPos> = battle.enemies().iter().map(|e| e.position).collect();
            let sent_before: u32 = battle.stats().values().map(|s| s.num_sent).sum();
            battle.tick().unwrap();
            let sent_after: u32 = battle.stats().values().map(|s| s.num_sent).sum();

            prop_assert!(sent_after <= sent_before + 1);
            if sent_after > sent_before {
                for position in &before {
                    prop_assert!(position.distance_squared(entry) >= 1.0);
                }
            }
        }
    }

    #[test]
    fn prop_battles_are_reproducible(scenario in arb_scenario(5)) {
        let first = scenario.run().unwrap();
        let second = scenario.run().unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(result_fingerprint(&first), result_fingerprint(&second));
    }

    #[test]
    fn prop_shots_stay_within_range(scenario in arb_scenario(6)) {
        let result = scenario.run().unwrap();
        let towers = placed_towers(&scenario);
        for event in &result.events {
            if let BattleEvent::Move(m) = event {
                if m.object_type == ObjectType::Projectile {
                    let tower = towers.iter().find(|(pos, _)| *pos == m.start_pos);
                    prop_assert!(tower.is_some());
                    if let Some((_, tower)) = tower {
                        prop_assert!(m.start_pos.distance(m.dest_pos) <= tower.range + EPSILON);
                    }
                }
            }
        }
    }

    #[test]
    fn prop_towers_respect_cooldown(scenario in arb_scenario(6)) {
        let result = scenario.run().unwrap();
        let towers = placed_towers(&scenario);
        for shots in shots_by_tower(&result.events).values() {
            let Some((_, tower)) = towers.iter().find(|(pos, _)| *pos == shots[0].start_pos) else {
                continue;
            };
            for pair in shots.windows(2) {
                // One shot per tick: landings never coincide.
                prop_assert!(pair[1].end_time > pair[0].end_time);
                prop_assert!(
                    pair[1].start_time - pair[0].start_time >= tower.cooldown_secs() - EPSILON,
                    "launches at {} and {} closer than {}",
                    pair[0].start_time,
                    pair[1].start_time,
                    tower.cooldown_secs()
                );
            }
        }
    }

    #[test]
    fn prop_every_object_is_deleted(scenario in arb_scenario(6)) {
        let result = scenario.run().unwrap();
        let mut seen = BTreeSet::new();
        let mut deleted = BTreeSet::new();
        for event in &result.events {
            match event {
                BattleEvent::Delete(d) => {
                    deleted.insert((d.object_type == ObjectType::Enemy, d.id));
                }
                other => {
                    seen.insert((other.object_type() == ObjectType::Enemy, other.object_id()));
                }
            }
        }
        for object in &seen {
            prop_assert!(deleted.contains(object), "object {:?} never deleted", object);
        }
    }

    #[test]
    fn prop_enemies_enter_in_wave_order(scenario in arb_scenario(6)) {
        let result = scenario.run().unwrap();
        // Ids are handed out in spawn order.
        let mut entered: BTreeMap<u16, u16> = BTreeMap::new();
        for event in &result.events {
            if let BattleEvent::Move(m) = event {
                if m.object_type == ObjectType::Enemy {
                    entered.entry(m.id).or_insert(m.config_id);
                }
            }
        }
        let order: Vec<u16> = entered.into_values().collect();
        prop_assert_eq!(order, scenario.request.wave.clone());
    }
}
