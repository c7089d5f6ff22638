//! Structured battle outcome handed to the rendering layer.

use serde::Serialize;

use super::attributes::PowerMetrics;
use super::environment::Environment;
use super::techniques::Technique;

/// Complete outcome of one simulated battle: the winner, the full ranking
/// with per-combatant breakdowns, and the narrative material.
#[derive(Debug, Clone, Serialize)]
pub struct BattleReport {
    pub winner: String,
    pub environment: Environment,
    /// Descending by battle score; index 0 is the winner.
    pub rankings: Vec<RankedCombatant>,
    pub phases: Vec<BattlePhase>,
    pub victory_factors: Vec<VictoryFactor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCombatant {
    pub name: String,
    pub anime: String,
    pub image_url: Option<String>,
    pub power_level: u32,
    pub metrics: PowerMetrics,
    pub techniques: Vec<Technique>,
    /// Up to three biography sentences the abilities were read from.
    pub extracted_abilities: Vec<String>,
    /// Whether upstream data influenced this combatant's attributes.
    pub data_enhanced: bool,
    pub battle_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Additive components of a battle score.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBreakdown {
    pub base_power: f64,
    pub environment_bonus: f64,
    pub technique_bonus: f64,
    pub balance_bonus: f64,
    pub matchup_bonus: f64,
}

impl ScoreBreakdown {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.base_power
            + self.environment_bonus
            + self.technique_bonus
            + self.balance_bonus
            + self.matchup_bonus
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BattlePhase {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VictoryFactorKind {
    PowerMargin,
    TopAttribute,
    SecondaryAttribute,
    EnvironmentSynergy,
    UltimateTechnique,
    FavorableMatchup,
    Balance,
}

#[derive(Debug, Clone, Serialize)]
pub struct VictoryFactor {
    pub kind: VictoryFactorKind,
    pub description: String,
}
