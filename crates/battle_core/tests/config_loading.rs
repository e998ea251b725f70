//! Battles driven from serialized config and request documents.

use battle_core::prelude::*;
use battle_test_utils::init_tracing;

const CONFIG_JSON: &str = r#"{
    "playfield": {
        "numRows": 3,
        "numCols": 4,
        "monsterEnter": {"row": 0, "col": 0},
        "monsterExit": {"row": 2, "col": 3},
        "backgroundId": 0,
        "tileSize": 128
    },
    "tiles": [],
    "towers": [
        {"id": 0, "name": "Cheap Tower", "cost": 1, "firingRate": 0.5, "range": 2.0,
         "damage": 5.0, "projectileSpeed": 2.0, "projectileId": 10},
        {"id": 1, "name": "Expensive Tower", "cost": 101, "firingRate": 1.0, "range": 2.0,
         "damage": 15.0, "projectileSpeed": 2.0, "projectileId": 11},
        {"id": 2, "name": "Fence", "cost": 2, "firingRate": 0.0, "range": 10.0,
         "damage": 5.0, "projectileSpeed": 1.5, "projectileId": 12}
    ],
    "monsters": [
        {"id": 0, "name": "Test Enemy 0", "health": 10.0, "speed": 2.0, "bounty": 10.0, "size": 128},
        {"id": 1, "name": "Test Enemy 1", "health": 8.0, "speed": 3.0, "bounty": 20.0, "size": 128}
    ],
    "misc": {
        "sellMultiplier": 0.5,
        "startingGold": 100,
        "battleBonuses": [
            {"id": 0, "name": "Participation", "bonusType": "ADDITIVE", "bonusAmount": 1.0,
             "conditions": [{"percentDefeated": 0.0}]},
            {"id": 1, "name": "Perfection", "bonusType": "MULTIPLICATIVE", "bonusAmount": 2.0,
             "conditions": [{"percentDefeated": 100.0}]}
        ]
    }
}"#;

const REQUEST_JSON: &str = r#"{
    "towerPlacement": [
        [null, null, null, null],
        [1, 1, 2, null],
        [null, null, 0, null]
    ],
    "wave": [0, 1],
    "paths": [
        [{"row": 0, "col": 0}, {"row": 0, "col": 1}, {"row": 0, "col": 2}, {"row": 0, "col": 3},
         {"row": 1, "col": 3}, {"row": 2, "col": 3}],
        [{"row": 0, "col": 0}, {"row": 0, "col": 1}, {"row": 0, "col": 2}, {"row": 0, "col": 3},
         {"row": 1, "col": 3}, {"row": 2, "col": 3}]
    ]
}"#;

#[test]
fn test_json_documents_drive_a_battle() {
    init_tracing();
    let config = GameConfig::from_json_str(CONFIG_JSON).unwrap();
    let request: BattleRequest = serde_json::from_str(REQUEST_JSON).unwrap();
    assert_eq!(request.tick_duration_secs, 0.01);
    assert_eq!(request.max_ticks, None);

    let result = compute_battle(&config, &request).unwrap();
    assert!(result.is_success());
    assert_eq!(result.total_sent(), 2);
    assert!(result.total_defeated() <= 2);

    let rewards =
        BattleRewards::compute(&result.monster_stats, &config, result.final_game_time).unwrap();
    // Participation is earned by any battle that sent enemies.
    assert_eq!(rewards.bonuses.first(), Some(&0));
    assert!(rewards.reward >= 1.0);
}

#[test]
fn test_ron_config_matches_json() {
    let config = GameConfig::from_json_str(CONFIG_JSON).unwrap();
    let ron_text = ron::to_string(&config).unwrap();
    let reloaded = GameConfig::from_ron_str(&ron_text).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_result_json_shape() {
    let config = GameConfig::from_json_str(CONFIG_JSON).unwrap();
    let request: BattleRequest = serde_json::from_str(REQUEST_JSON).unwrap();
    let result = compute_battle(&config, &request).unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["errorMessage"], "");
    assert!(value["events"].is_array());
    assert!(value["monsterStats"]["0"]["numSent"].is_number());
}
