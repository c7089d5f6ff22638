//! Best-effort ability extraction from biography text.
//!
//! Sentences mentioning domain keywords become candidate technique names and
//! grant small, bounded attribute boosts when they hint at a specific stat.

use std::sync::OnceLock;

use regex::Regex;

use super::attributes::{Attribute, PowerMetrics};

/// Keywords whose surrounding sentence is treated as an ability mention.
const ABILITY_KEYWORDS: &[&str] = &[
    "ability",
    "power",
    "skill",
    "technique",
    "quirk",
    "magic",
    "jutsu",
    "haki",
    "stand",
    "zanpakuto",
    "bankai",
    "sharingan",
    "devil fruit",
];

/// Keyword associations per attribute, used to place boosts.
const ATTRIBUTE_KEYWORDS: &[(Attribute, &[&str])] = &[
    (
        Attribute::Strength,
        &["strength", "power", "force", "might", "muscle", "physical", "giant", "titan", "hulk"],
    ),
    (
        Attribute::Speed,
        &["speed", "fast", "quick", "agile", "swift", "flash", "teleport", "instant"],
    ),
    (
        Attribute::Intelligence,
        &["smart", "genius", "intellect", "strategy", "tactical", "mind", "brain", "iq"],
    ),
    (
        Attribute::Technique,
        &["technique", "skill", "precision", "mastery", "expert", "proficient", "trained"],
    ),
    (
        Attribute::Endurance,
        &["endurance", "stamina", "durability", "resilient", "tough", "tank", "withstand"],
    ),
    (
        Attribute::SpecialAbility,
        &[
            "special",
            "unique",
            "power",
            "ability",
            "magic",
            "quirk",
            "jutsu",
            "haki",
            "stand",
            "zanpakuto",
            "bankai",
            "sharingan",
            "devil fruit",
        ],
    ),
    (
        Attribute::Defense,
        &["defense", "shield", "armor", "protect", "guard", "block", "barrier"],
    ),
    (
        Attribute::Experience,
        &["experience", "veteran", "battle-hardened", "seasoned", "master", "expert"],
    ),
    (
        Attribute::Adaptability,
        &["adapt", "flexible", "versatile", "adjust", "evolve", "transform"],
    ),
    (
        Attribute::Willpower,
        &["will", "determination", "resolve", "spirit", "courage", "brave", "fearless"],
    ),
];

fn extraction_regexes() -> &'static Vec<Regex> {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        ABILITY_KEYWORDS
            .iter()
            .map(|kw| {
                Regex::new(&format!("(?i)({}[^.!?]*[.!?])", regex::escape(kw)))
                    .expect("Invalid ability regex")
            })
            .collect()
    })
}

/// Pulls ability-looking sentences out of a biography, keyword by keyword.
/// Order is deterministic: keyword order first, match position second.
#[must_use]
pub fn extract_abilities(biography: &str) -> Vec<String> {
    let mut abilities = Vec::new();

    for regex in extraction_regexes() {
        for matched in regex.find_iter(biography) {
            abilities.push(matched.as_str().to_string());
        }
    }

    abilities
}

/// Applies +5 to every attribute an ability sentence hints at, capped at the
/// attribute ceiling.
pub fn apply_keyword_boosts(metrics: &mut PowerMetrics, abilities: &[String]) {
    for ability in abilities {
        let text = ability.to_lowercase();
        for (attribute, keywords) in ATTRIBUTE_KEYWORDS {
            if keywords.iter().any(|kw| text.contains(kw)) {
                metrics.boost(*attribute, 5);
            }
        }
    }
}

/// Cleans an extracted sentence into a usable technique name: drops any
/// leading "Label:" prefix and everything past the first period.
#[must_use]
pub fn technique_name_from_ability(ability: &str) -> String {
    let stripped = ability
        .split_once(':')
        .map_or(ability, |(_, rest)| rest)
        .trim();

    stripped
        .split('.')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::attributes::{ApiSignals, Seeds, synthesize, ATTRIBUTE_MAX};

    #[test]
    fn extracts_keyword_sentences() {
        let bio = "Luffy ate the Gomu Gomu no Mi, a Devil Fruit that turned his body to rubber. \
                   His haki allows him to sense opponents. He dreams of the One Piece.";

        let abilities = extract_abilities(bio);
        assert!(abilities.iter().any(|a| a.to_lowercase().contains("haki")));
        assert!(abilities.iter().any(|a| a.to_lowercase().contains("devil fruit")));
    }

    #[test]
    fn no_keywords_means_no_abilities() {
        assert!(extract_abilities("He enjoys long walks and ramen.").is_empty());
    }

    #[test]
    fn boosts_are_capped() {
        let mut metrics = synthesize(Seeds::derive("x", "y"), &ApiSignals::default());
        let abilities: Vec<String> = (0..30)
            .map(|_| "His special power and unique ability.".to_string())
            .collect();

        apply_keyword_boosts(&mut metrics, &abilities);
        for (_, value) in metrics.iter() {
            assert!(value <= ATTRIBUTE_MAX);
        }
    }

    #[test]
    fn technique_name_strips_prefix_and_trailing_sentence() {
        let name = technique_name_from_ability("Signature move: Rasengan. A spinning sphere.");
        assert_eq!(name, "Rasengan");
    }

    #[test]
    fn technique_name_without_prefix() {
        let name = technique_name_from_ability("Power of the Sharingan eye.");
        assert_eq!(name, "Power of the Sharingan eye");
    }
}
