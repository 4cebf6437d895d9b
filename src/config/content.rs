//! # Default Content
//!
//! Built-in turret, castle, slot, tier and word tables.

use super::{
    CastleLevelConfig, EnemyTierConfig, HazardKindConfig, TurretArchetype, TurretLevelConfig,
    TurretSlotConfig,
};
use crate::game::HazardKind;
use std::collections::BTreeMap;

fn level(cost: f64, damage: f64, fire_rate: f64) -> TurretLevelConfig {
    TurretLevelConfig {
        cost,
        damage,
        fire_rate,
    }
}

/// Default turret archetypes: arrow, arcane, flame and the disabled crystal.
pub fn default_turrets() -> Vec<TurretArchetype> {
    vec![
        TurretArchetype {
            id: "arrow".to_string(),
            name: "Arrow Tower".to_string(),
            enabled: true,
            levels: vec![
                level(40.0, 10.0, 1.0),
                level(60.0, 16.0, 1.25),
                level(90.0, 24.0, 1.5),
            ],
            affinity_multipliers: BTreeMap::new(),
            shield_bonus: 0.0,
        },
        TurretArchetype {
            id: "arcane".to_string(),
            name: "Arcane Spire".to_string(),
            enabled: true,
            levels: vec![
                level(60.0, 8.0, 0.8),
                level(80.0, 13.0, 1.0),
                level(110.0, 19.0, 1.2),
            ],
            affinity_multipliers: BTreeMap::from([("witch".to_string(), 1.5)]),
            shield_bonus: 1.0,
        },
        TurretArchetype {
            id: "flame".to_string(),
            name: "Flame Brazier".to_string(),
            enabled: true,
            levels: vec![
                level(75.0, 6.0, 2.0),
                level(90.0, 9.0, 2.4),
                level(120.0, 13.0, 2.8),
            ],
            affinity_multipliers: BTreeMap::from([
                ("brute".to_string(), 1.5),
                ("runner".to_string(), 0.75),
            ]),
            shield_bonus: 0.0,
        },
        TurretArchetype {
            id: "crystal".to_string(),
            name: "Crystal Lance".to_string(),
            enabled: false,
            levels: vec![level(120.0, 30.0, 0.5), level(150.0, 45.0, 0.6)],
            affinity_multipliers: BTreeMap::new(),
            shield_bonus: 0.5,
        },
    ]
}

/// Default castle level table.
pub fn default_castle_levels() -> Vec<CastleLevelConfig> {
    vec![
        CastleLevelConfig {
            level: 1,
            max_health: 100.0,
            regen_per_second: 0.0,
            armor: 0.0,
            gold_bonus_percent: 0.0,
            upgrade_cost: Some(120.0),
        },
        CastleLevelConfig {
            level: 2,
            max_health: 140.0,
            regen_per_second: 0.5,
            armor: 1.0,
            gold_bonus_percent: 5.0,
            upgrade_cost: Some(200.0),
        },
        CastleLevelConfig {
            level: 3,
            max_health: 190.0,
            regen_per_second: 1.0,
            armor: 2.0,
            gold_bonus_percent: 10.0,
            upgrade_cost: None,
        },
    ]
}

/// Default slot layout: one slot per lane at level 1, flanking slots later.
pub fn default_turret_slots() -> Vec<TurretSlotConfig> {
    [
        ("s1", 0, 1),
        ("s2", 1, 1),
        ("s3", 2, 1),
        ("s4", 0, 2),
        ("s5", 2, 2),
        ("s6", 1, 3),
    ]
    .into_iter()
    .map(|(id, lane, unlock_level)| TurretSlotConfig {
        id: id.to_string(),
        lane,
        unlock_level,
    })
    .collect()
}

/// Default enemy tiers.
pub fn default_enemy_tiers() -> Vec<EnemyTierConfig> {
    vec![
        EnemyTierConfig {
            id: "grunt".to_string(),
            name: "Grunt".to_string(),
            health: 20.0,
            speed: 0.06,
            reward: 8.0,
            damage: 10.0,
            min_word_length: 3,
            max_word_length: 5,
            first_wave: 0,
            weight: 6.0,
            shieldable: false,
        },
        EnemyTierConfig {
            id: "runner".to_string(),
            name: "Runner".to_string(),
            health: 12.0,
            speed: 0.11,
            reward: 6.0,
            damage: 6.0,
            min_word_length: 3,
            max_word_length: 4,
            first_wave: 1,
            weight: 3.0,
            shieldable: false,
        },
        EnemyTierConfig {
            id: "brute".to_string(),
            name: "Brute".to_string(),
            health: 60.0,
            speed: 0.035,
            reward: 18.0,
            damage: 20.0,
            min_word_length: 6,
            max_word_length: 9,
            first_wave: 2,
            weight: 2.0,
            shieldable: true,
        },
        EnemyTierConfig {
            id: "witch".to_string(),
            name: "Witch".to_string(),
            health: 35.0,
            speed: 0.05,
            reward: 14.0,
            damage: 14.0,
            min_word_length: 5,
            max_word_length: 7,
            first_wave: 3,
            weight: 2.0,
            shieldable: true,
        },
    ]
}

/// Default hazard kinds and their fire-rate multipliers.
pub fn default_hazard_kinds() -> Vec<HazardKindConfig> {
    [HazardKind::Fog, HazardKind::Storm, HazardKind::Ash]
        .into_iter()
        .map(|kind| HazardKindConfig {
            kind,
            fire_rate_multiplier: kind.default_multiplier(),
            weight: 1.0,
        })
        .collect()
}

const WORD_BANK: &[&str] = &[
    // 3-4 letters
    "axe", "bow", "cog", "dew", "elm", "fig", "gem", "hut", "ink", "jar", "kit", "log", "mud",
    "nut", "oak", "pit", "quay", "rye", "sap", "tar", "urn", "vat", "wax", "yak", "zinc",
    "arch", "bolt", "coal", "dusk", "echo", "flint", "gate", "helm", "iron", "jade", "keep",
    "lamp", "moat", "nook", "oath", "pike", "quill", "rope", "sled", "tusk", "vale", "wick",
    // 5-7 letters
    "amber", "banner", "cinder", "dagger", "ember", "falcon", "garden", "harbor", "island",
    "jasper", "kettle", "lantern", "marble", "needle", "orchard", "pewter", "quarry", "raven",
    "saddle", "timber", "umber", "velvet", "willow", "yonder", "zephyr", "anvil", "bramble",
    "chisel", "drawer", "furnace", "goblet", "hamlet", "meadow", "thistle",
    // 8-9 letters
    "aqueduct", "blacksmith", "catapult", "drawbridge", "embattled", "fortress", "garrison",
    "halberd", "innkeeper", "jousting", "keystone", "labyrinth", "mangonel", "overlook",
    "palisade", "quartered", "rampart", "sentinel", "trebuchet", "uplander", "vanguard",
    "watchman", "yeomanry", "barbican", "portcullis",
    // 10-12 letters
    "battlements", "candlelight", "earthenware", "fletchering", "gatehouse", "hearthstone",
    "ironmonger", "lighthouse", "marketplace", "nightwatch", "outpostings", "quartermaster",
    "stonemasons", "thunderclap", "undercroft", "wheelwright",
];

/// Default word bank, lowercase ASCII.
pub fn default_words() -> Vec<String> {
    WORD_BANK.iter().map(|word| word.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_bank_is_lowercase_ascii() {
        for word in default_words() {
            assert!(
                word.chars().all(|c| c.is_ascii_lowercase()),
                "word {} must be lowercase ascii",
                word
            );
        }
    }

    #[test]
    fn test_every_tier_has_words() {
        let words = default_words();
        for tier in default_enemy_tiers() {
            let fitting = words
                .iter()
                .filter(|w| w.len() >= tier.min_word_length && w.len() <= tier.max_word_length)
                .count();
            assert!(fitting >= 5, "tier {} only has {} words", tier.id, fitting);
        }
    }

    #[test]
    fn test_evacuation_words_exist() {
        let words = default_words();
        let long = words.iter().filter(|w| w.len() >= 8 && w.len() <= 12).count();
        assert!(long >= 10);
    }

    #[test]
    fn test_slot_layout_covers_every_lane() {
        let slots = default_turret_slots();
        for lane in 0..3 {
            assert!(slots.iter().any(|s| s.lane == lane && s.unlock_level == 1));
        }
    }
}
