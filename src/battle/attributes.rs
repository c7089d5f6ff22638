//! Deterministic combat-attribute synthesis.
//!
//! Attributes are derived from character-code seeds over the character and
//! series names, optionally nudged by upstream signals. There is no random
//! branch anywhere: the same name, anime, and upstream snapshot always
//! produce the same vector.

use serde::Serialize;

use crate::models::{CharacterRecord, SeriesRecord};

pub const ATTRIBUTE_MIN: u32 = 60;
pub const ATTRIBUTE_MAX: u32 = 95;

/// The ten combat attributes, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Strength,
    Speed,
    Intelligence,
    Technique,
    Endurance,
    SpecialAbility,
    Defense,
    Experience,
    Adaptability,
    Willpower,
}

impl Attribute {
    pub const ALL: [Self; 10] = [
        Self::Strength,
        Self::Speed,
        Self::Intelligence,
        Self::Technique,
        Self::Endurance,
        Self::SpecialAbility,
        Self::Defense,
        Self::Experience,
        Self::Adaptability,
        Self::Willpower,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Seed offset, 1-based in canonical order.
    #[must_use]
    pub const fn seed_offset(self) -> u64 {
        self as u64 + 1
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Speed => "Speed",
            Self::Intelligence => "Intelligence",
            Self::Technique => "Technique",
            Self::Endurance => "Endurance",
            Self::SpecialAbility => "Special Ability",
            Self::Defense => "Defense",
            Self::Experience => "Experience",
            Self::Adaptability => "Adaptability",
            Self::Willpower => "Willpower",
        }
    }

    /// Weight of this attribute in the overall power level.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Technique | Self::Experience => 1.1,
            Self::Endurance | Self::Defense => 0.9,
            Self::SpecialAbility => 1.2,
            Self::Adaptability => 0.8,
            Self::Strength | Self::Speed | Self::Intelligence | Self::Willpower => 1.0,
        }
    }

    /// The attribute that tactically neutralizes this one.
    #[must_use]
    pub const fn countered_by(self) -> Self {
        match self {
            Self::Strength => Self::Speed,
            Self::Speed => Self::Technique,
            Self::Intelligence => Self::Willpower,
            Self::Technique => Self::Strength,
            Self::Endurance => Self::Intelligence,
            Self::SpecialAbility => Self::Adaptability,
            Self::Defense => Self::SpecialAbility,
            Self::Experience => Self::Adaptability,
            Self::Adaptability => Self::Experience,
            Self::Willpower => Self::Defense,
        }
    }
}

/// A full attribute vector, indexed by [`Attribute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerMetrics([u32; 10]);

impl PowerMetrics {
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> u32 {
        self.0[attribute.index()]
    }

    pub const fn set(&mut self, attribute: Attribute, value: u32) {
        self.0[attribute.index()] = value;
    }

    /// Bounded boost used by ability-keyword matches.
    pub const fn boost(&mut self, attribute: Attribute, amount: u32) {
        let boosted = self.0[attribute.index()] + amount;
        self.0[attribute.index()] = if boosted > ATTRIBUTE_MAX {
            ATTRIBUTE_MAX
        } else {
            boosted
        };
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, u32)> + '_ {
        Attribute::ALL.iter().map(|&a| (a, self.get(a)))
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.0.iter().copied().min().unwrap_or(0)
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Attributes sorted by value descending; equal values keep canonical
    /// order, so the ranking is fully deterministic.
    #[must_use]
    pub fn ranked_desc(&self) -> Vec<(Attribute, u32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by_key(|&(_, v)| std::cmp::Reverse(v));
        ranked
    }

    /// Attributes sorted by value ascending, canonical order on ties.
    #[must_use]
    pub fn ranked_asc(&self) -> Vec<(Attribute, u32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by_key(|&(_, v)| v);
        ranked
    }

    /// Weighted mean of all attributes, floored.
    #[must_use]
    pub fn power_level(&self) -> u32 {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for (attribute, value) in self.iter() {
            weighted_sum += f64::from(value) * attribute.weight();
            total_weight += attribute.weight();
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (weighted_sum / total_weight).floor() as u32
        }
    }
}

/// Seeds derived from the character and series names.
#[derive(Debug, Clone, Copy)]
pub struct Seeds {
    pub name_seed: u64,
    pub anime_seed: u64,
    pub combined: u64,
}

impl Seeds {
    #[must_use]
    pub fn derive(name: &str, anime: &str) -> Self {
        let name_seed = char_code_sum(name);
        let anime_seed = char_code_sum(anime);
        Self {
            name_seed,
            anime_seed,
            combined: (name_seed * anime_seed) % 1000,
        }
    }
}

fn char_code_sum(s: &str) -> u64 {
    s.chars().map(|c| u64::from(u32::from(c))).sum()
}

/// Upstream signals that nudge synthesized attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiSignals {
    popularity_factor: u32,
    favorites_factor: u32,
    rating_factor: i64,
    series_popularity_factor: u32,
    role: RoleBonus,
    present: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct RoleBonus {
    strength: u32,
    intelligence: u32,
    technique: u32,
    special_ability: u32,
    willpower: u32,
}

impl ApiSignals {
    #[must_use]
    pub fn from_records(
        character: Option<&CharacterRecord>,
        series: Option<&SeriesRecord>,
    ) -> Self {
        let mut signals = Self {
            present: character.is_some() || series.is_some(),
            ..Self::default()
        };

        if let Some(character) = character {
            if character.popularity > 0 {
                signals.popularity_factor = (character.popularity / 100).min(20);
            }
            if let Some(favorites) = character.favorites.filter(|&f| f > 0) {
                signals.favorites_factor = (favorites / 50).min(15);
            }
            signals.role = RoleBonus::for_role(character.role.as_deref());
        }

        if let Some(series) = series {
            if let Some(score) = series.score.filter(|&s| s > 0) {
                // Score is carried on a 0-100 scale; the factor works on the
                // 0-10 rating it came from.
                signals.rating_factor = (i64::from(score) / 10 - 5) * 5;
            }
            if series.popularity > 0 {
                signals.series_popularity_factor = (series.popularity / 1000).min(10);
            }
        }

        signals
    }

    /// Base value for one attribute before the seeded jitter is applied.
    fn base_for(&self, attribute: Attribute) -> i64 {
        let bonus: i64 = match attribute {
            Attribute::Strength => i64::from(self.popularity_factor + self.role.strength),
            Attribute::Speed => i64::from(self.favorites_factor),
            Attribute::Intelligence => self.rating_factor + i64::from(self.role.intelligence),
            Attribute::Technique => i64::from(self.role.technique),
            Attribute::Endurance => i64::from(self.popularity_factor),
            Attribute::SpecialAbility => {
                i64::from(self.favorites_factor + self.role.special_ability) + self.rating_factor
            }
            Attribute::Defense => 0,
            Attribute::Experience => i64::from(self.series_popularity_factor),
            Attribute::Adaptability => self.rating_factor,
            Attribute::Willpower => i64::from(self.favorites_factor + self.role.willpower),
        };

        70 + bonus
    }
}

impl RoleBonus {
    fn for_role(role: Option<&str>) -> Self {
        match role {
            Some("Main") => Self {
                special_ability: 10,
                willpower: 8,
                ..Self::default()
            },
            Some("Supporting") => Self {
                technique: 5,
                intelligence: 5,
                ..Self::default()
            },
            Some("Antagonist") => Self {
                strength: 8,
                special_ability: 7,
                ..Self::default()
            },
            Some("Villain") => Self {
                strength: 10,
                special_ability: 8,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

/// Synthesizes the full attribute vector for one combatant.
///
/// Without any upstream signal each value is taken purely from the combined
/// seed: `(combined + offset) % 36 + 60`, landing in `[60, 95]`. With
/// signals the base value is nudged by the derived factors and a seeded
/// jitter in `[-5, 5]`, clamped to the same range.
#[must_use]
pub fn synthesize(seeds: Seeds, signals: &ApiSignals) -> PowerMetrics {
    let mut values = [0u32; 10];

    for attribute in Attribute::ALL {
        let offset = attribute.seed_offset();

        let value = if signals.present {
            let jitter = i64::try_from((seeds.combined + offset) % 11).unwrap_or(0) - 5;
            (signals.base_for(attribute) + jitter)
                .clamp(i64::from(ATTRIBUTE_MIN), i64::from(ATTRIBUTE_MAX))
        } else {
            i64::try_from((seeds.combined + offset) % 36).unwrap_or(0) + i64::from(ATTRIBUTE_MIN)
        };

        #[allow(clippy::cast_sign_loss)]
        {
            values[attribute.index()] = value as u32;
        }
    }

    PowerMetrics(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_deterministic() {
        let a = Seeds::derive("Guts", "Berserk");
        let b = Seeds::derive("Guts", "Berserk");
        assert_eq!(a.combined, b.combined);
        assert!(a.combined < 1000);
    }

    #[test]
    fn synthesis_without_signals_stays_in_bounds() {
        for (name, anime) in [
            ("Guts", "Berserk"),
            ("Sailor Moon", "Sailor Moon"),
            ("L", "Death Note"),
            ("Edward Elric", "Fullmetal Alchemist: Brotherhood"),
        ] {
            let metrics = synthesize(Seeds::derive(name, anime), &ApiSignals::default());
            for (_, value) in metrics.iter() {
                assert!((ATTRIBUTE_MIN..=ATTRIBUTE_MAX).contains(&value));
            }
        }
    }

    #[test]
    fn synthesis_is_reproducible() {
        let seeds = Seeds::derive("Saitama", "One Punch Man");
        let first = synthesize(seeds, &ApiSignals::default());
        let second = synthesize(seeds, &ApiSignals::default());
        assert_eq!(first, second);
    }

    #[test]
    fn signals_keep_values_clamped() {
        use crate::models::{CharacterRecord, DataSource, SourceIds};

        let record = CharacterRecord {
            id: 1,
            source_ids: SourceIds::default(),
            name: "Anos Voldigoad".to_string(),
            native_name: None,
            image_url: None,
            description: None,
            series: None,
            popularity: 1_000_000,
            favorites: Some(1_000_000),
            role: Some("Main".to_string()),
            base_attributes: Default::default(),
            data_source: DataSource::Unified,
        };

        let signals = ApiSignals::from_records(Some(&record), None);
        let metrics = synthesize(Seeds::derive("Anos Voldigoad", "Misfit"), &signals);
        for (_, value) in metrics.iter() {
            assert!((ATTRIBUTE_MIN..=ATTRIBUTE_MAX).contains(&value));
        }
    }

    #[test]
    fn boost_caps_at_max() {
        let mut metrics = synthesize(Seeds::derive("a", "b"), &ApiSignals::default());
        for _ in 0..20 {
            metrics.boost(Attribute::Strength, 5);
        }
        assert_eq!(metrics.get(Attribute::Strength), ATTRIBUTE_MAX);
    }

    #[test]
    fn power_level_is_weighted_mean() {
        let metrics = PowerMetrics([80; 10]);
        assert_eq!(metrics.power_level(), 80);
    }

    #[test]
    fn ranked_desc_breaks_ties_in_canonical_order() {
        let mut metrics = PowerMetrics([70; 10]);
        metrics.set(Attribute::Willpower, 90);
        let ranked = metrics.ranked_desc();
        assert_eq!(ranked[0].0, Attribute::Willpower);
        // All remaining values tie; canonical order must hold.
        assert_eq!(ranked[1].0, Attribute::Strength);
        assert_eq!(ranked[2].0, Attribute::Speed);
    }

    #[test]
    fn counter_table_round_trips() {
        // Spot checks against the fixed counter relationships.
        assert_eq!(Attribute::Strength.countered_by(), Attribute::Speed);
        assert_eq!(Attribute::Defense.countered_by(), Attribute::SpecialAbility);
        assert_eq!(Attribute::Adaptability.countered_by(), Attribute::Experience);
    }
}
