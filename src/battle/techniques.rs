//! Technique generation from attribute vectors and word-list seeds.

use serde::Serialize;

use super::abilities;
use super::attributes::{Attribute, PowerMetrics, Seeds};

const ADJECTIVES: [&str; 10] = [
    "Blazing", "Shadow", "Mystic", "Celestial", "Iron", "Swift", "Quantum", "Void", "Arctic",
    "Gale",
];
const NOUNS: [&str; 10] = [
    "Strike", "Guard", "Burst", "Aura", "Wave", "Step", "Illusion", "Edge", "Barrier", "Torrent",
];
const ULTIMATE_ADJECTIVES: [&str; 10] = [
    "Final", "Omega", "Limitless", "Divine", "Forbidden", "Zero", "Cosmic", "Infinite", "Apex",
    "Nexus",
];
const ULTIMATE_NOUNS: [&str; 10] = [
    "Judgment", "Impact", "Domain", "Requiem", "Unleashed", "Genesis", "Oblivion", "Blast",
    "Annihilation", "Ascension",
];

/// Extracted names must look like technique names, not sentences.
const CANONICAL_NAME_MIN: usize = 4;
const CANONICAL_NAME_MAX: usize = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TechniqueKind {
    Offensive,
    Defensive,
    Support,
    Ultimate,
}

impl TechniqueKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Offensive => "Offensive",
            Self::Defensive => "Defensive",
            Self::Support => "Utility/Support",
            Self::Ultimate => "Ultimate",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Technique {
    pub name: String,
    pub kind: TechniqueKind,
    pub power: u32,
    pub description: String,
    /// True when the name came from the character's biography rather than
    /// the generated word lists.
    pub canonical: bool,
}

/// Derives the four techniques for one combatant.
///
/// Powers are means of related attributes; names are combinatorial from the
/// seeds unless a plausible canonical ability name overrides them (abilities
/// 0 and 1 replace the offensive and defensive names, ability 2 replaces the
/// ultimate's).
#[must_use]
pub fn generate(seeds: Seeds, metrics: &PowerMetrics, extracted: &[String]) -> [Technique; 4] {
    let name_seed = seeds.name_seed as usize;
    let anime_seed = seeds.anime_seed as usize;

    let mut techniques = [
        Technique {
            name: format!("{} {}", ADJECTIVES[name_seed % 10], NOUNS[anime_seed % 10]),
            kind: TechniqueKind::Offensive,
            power: mean2(metrics.get(Attribute::Strength), metrics.get(Attribute::Technique)),
            description: String::new(),
            canonical: false,
        },
        Technique {
            name: format!(
                "{} {}",
                ADJECTIVES[(name_seed + 3) % 10],
                NOUNS[(anime_seed + 2) % 10]
            ),
            kind: TechniqueKind::Defensive,
            power: mean2(metrics.get(Attribute::Defense), metrics.get(Attribute::Endurance)),
            description: String::new(),
            canonical: false,
        },
        Technique {
            name: format!(
                "{} {}",
                ADJECTIVES[(name_seed + 5) % 10],
                NOUNS[(anime_seed + 4) % 10]
            ),
            kind: TechniqueKind::Support,
            power: mean2(
                metrics.get(Attribute::Intelligence),
                metrics.get(Attribute::Adaptability),
            ),
            description: String::new(),
            canonical: false,
        },
        Technique {
            name: format!(
                "{} {}",
                ULTIMATE_ADJECTIVES[name_seed % 10],
                ULTIMATE_NOUNS[anime_seed % 10]
            ),
            kind: TechniqueKind::Ultimate,
            power: ultimate_power(metrics),
            description: String::new(),
            canonical: false,
        },
    ];

    for (ability_index, technique_index) in [(0, 0), (1, 1), (2, 3)] {
        if let Some(ability) = extracted.get(ability_index) {
            let name = abilities::technique_name_from_ability(ability);
            if (CANONICAL_NAME_MIN..=CANONICAL_NAME_MAX).contains(&name.chars().count()) {
                techniques[technique_index].name = name;
                techniques[technique_index].canonical = true;
            }
        }
    }

    for technique in &mut techniques {
        technique.description = describe(technique);
    }

    techniques
}

fn mean2(a: u32, b: u32) -> u32 {
    ((a + b) / 2).min(95)
}

fn ultimate_power(metrics: &PowerMetrics) -> u32 {
    let sum = metrics.get(Attribute::SpecialAbility)
        + metrics.get(Attribute::Willpower)
        + metrics.get(Attribute::Technique);
    (sum / 3).min(98)
}

fn describe(technique: &Technique) -> String {
    let intensity = if technique.power > 90 {
        "devastatingly"
    } else if technique.power > 80 {
        "potent"
    } else {
        "standard"
    };
    let provenance = if technique.canonical {
        " from the series"
    } else {
        ""
    };

    format!(
        "A {} {} technique{}.",
        intensity,
        technique.kind.label().to_lowercase(),
        provenance
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::attributes::{synthesize, ApiSignals};

    fn metrics_for(name: &str, anime: &str) -> (Seeds, PowerMetrics) {
        let seeds = Seeds::derive(name, anime);
        (seeds, synthesize(seeds, &ApiSignals::default()))
    }

    #[test]
    fn four_techniques_one_of_each_kind() {
        let (seeds, metrics) = metrics_for("Ichigo Kurosaki", "Bleach");
        let techniques = generate(seeds, &metrics, &[]);

        assert_eq!(techniques[0].kind, TechniqueKind::Offensive);
        assert_eq!(techniques[1].kind, TechniqueKind::Defensive);
        assert_eq!(techniques[2].kind, TechniqueKind::Support);
        assert_eq!(techniques[3].kind, TechniqueKind::Ultimate);
    }

    #[test]
    fn generation_is_deterministic() {
        let (seeds, metrics) = metrics_for("Ichigo Kurosaki", "Bleach");
        let first = generate(seeds, &metrics, &[]);
        let second = generate(seeds, &metrics, &[]);

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.power, b.power);
        }
    }

    #[test]
    fn powers_are_attribute_means() {
        let (seeds, metrics) = metrics_for("Ichigo Kurosaki", "Bleach");
        let techniques = generate(seeds, &metrics, &[]);

        let expected = (metrics.get(Attribute::Strength) + metrics.get(Attribute::Technique)) / 2;
        assert_eq!(techniques[0].power, expected.min(95));
        assert!(techniques[3].power <= 98);
    }

    #[test]
    fn canonical_ability_overrides_generated_name() {
        let (seeds, metrics) = metrics_for("Kurapika", "Hunter x Hunter");
        let extracted = vec!["His signature skill: Chain Jail. It binds nen users.".to_string()];

        let techniques = generate(seeds, &metrics, &extracted);
        assert!(techniques[0].canonical);
        assert_eq!(techniques[0].name, "Chain Jail");
    }

    #[test]
    fn overlong_ability_keeps_generated_name() {
        let (seeds, metrics) = metrics_for("Kurapika", "Hunter x Hunter");
        let extracted = vec![
            "ability to materialize five chains that each serve an oath-bound purpose in battle."
                .to_string(),
        ];

        let techniques = generate(seeds, &metrics, &extracted);
        assert!(!techniques[0].canonical);
    }

    #[test]
    fn third_ability_lands_on_the_ultimate() {
        let (seeds, metrics) = metrics_for("Gon", "Hunter x Hunter");
        let extracted = vec![
            "power one.".to_string(),
            "power two.".to_string(),
            "skill: Jajanken.".to_string(),
        ];

        let techniques = generate(seeds, &metrics, &extracted);
        assert!(techniques[3].canonical);
        assert_eq!(techniques[3].name, "Jajanken");
    }
}
