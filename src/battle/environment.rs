//! Battlefield catalog and fairness-first selection.

use serde::Serialize;

use super::attributes::{Attribute, PowerMetrics};

/// One battlefield from the fixed catalog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Environment {
    pub name: &'static str,
    pub effect: &'static str,
    pub favors: [Attribute; 2],
}

pub const CATALOG: [Environment; 10] = [
    Environment {
        name: "Shattered Cityscape",
        effect: "favors Agility & Tactical Thinking",
        favors: [Attribute::Speed, Attribute::Intelligence],
    },
    Environment {
        name: "Dimensional Rift",
        effect: "favors Special Abilities & Adaptability",
        favors: [Attribute::SpecialAbility, Attribute::Adaptability],
    },
    Environment {
        name: "Sky Arena",
        effect: "favors Flight/Speed & Ranged Attacks",
        favors: [Attribute::Speed, Attribute::Technique],
    },
    Environment {
        name: "Ancient Temple Ruins",
        effect: "favors Technique & Defense",
        favors: [Attribute::Technique, Attribute::Defense],
    },
    Environment {
        name: "Molten Battlefield",
        effect: "testing Endurance & Raw Power",
        favors: [Attribute::Endurance, Attribute::Strength],
    },
    Environment {
        name: "Mystic Forest",
        effect: "favors Adaptability & Special Abilities",
        favors: [Attribute::Adaptability, Attribute::SpecialAbility],
    },
    Environment {
        name: "Underwater Cavern",
        effect: "tests Endurance & Adaptability",
        favors: [Attribute::Endurance, Attribute::Adaptability],
    },
    Environment {
        name: "Astral Plane",
        effect: "amplifies Intelligence & Special Abilities",
        favors: [Attribute::Intelligence, Attribute::SpecialAbility],
    },
    Environment {
        name: "Colosseum Arena",
        effect: "rewards Technique & Experience",
        favors: [Attribute::Technique, Attribute::Experience],
    },
    Environment {
        name: "Frozen Tundra",
        effect: "challenges Endurance & Willpower",
        favors: [Attribute::Endurance, Attribute::Willpower],
    },
];

/// Sum of a combatant's favored attributes for one environment.
#[must_use]
pub fn favored_sum(environment: &Environment, metrics: &PowerMetrics) -> u32 {
    environment.favors.iter().map(|&a| metrics.get(a)).sum()
}

/// Picks the battlefield that least favors any single combatant: the one
/// minimizing the gap between the highest and lowest favored-attribute sums.
/// Ties keep the earlier catalog entry, so selection is deterministic.
#[must_use]
pub fn select(combatants: &[&PowerMetrics]) -> &'static Environment {
    let mut selected = &CATALOG[0];
    let mut lowest_gap = u32::MAX;

    for environment in &CATALOG {
        let sums = combatants.iter().map(|&m| favored_sum(environment, m));
        let max = sums.clone().max().unwrap_or(0);
        let min = sums.min().unwrap_or(0);
        let gap = max - min;

        if gap < lowest_gap {
            lowest_gap = gap;
            selected = environment;
        }
    }

    selected
}
