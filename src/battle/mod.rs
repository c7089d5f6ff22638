//! Deterministic battle scoring engine.
//!
//! Enriches combatants through the unification layer (best-effort),
//! synthesizes attribute vectors from name/series seeds, picks the fairest
//! battlefield, and derives an additive, explainable score per combatant.

pub mod abilities;
pub mod attributes;
pub mod environment;
pub mod report;
pub mod techniques;

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{CharacterRecord, SeriesRecord};
use crate::unified::UnifiedClient;
use attributes::{ApiSignals, PowerMetrics, Seeds};
use environment::Environment;
use report::{
    BattlePhase, BattleReport, RankedCombatant, ScoreBreakdown, VictoryFactor, VictoryFactorKind,
};
use techniques::{Technique, TechniqueKind};

/// Combatants with a direct attribute advantage beyond this margin earn a
/// matchup point per attribute.
const SIGNIFICANT_ADVANTAGE: u32 = 15;
const MATCHUP_CAP: f64 = 10.0;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("a battle needs at least two combatants")]
    NotEnoughCombatants,
}

/// One side of the comparison, as entered by the user.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub name: String,
    pub anime: String,
    pub image_url: Option<String>,
}

impl Combatant {
    #[must_use]
    pub fn new(name: impl Into<String>, anime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anime: anime.into(),
            image_url: None,
        }
    }
}

struct Fighter {
    name: String,
    anime: String,
    image_url: Option<String>,
    enhanced: bool,
    metrics: PowerMetrics,
    power_level: u32,
    abilities: Vec<String>,
    techniques: [Technique; 4],
}

pub struct BattleEngine {
    api: Arc<UnifiedClient>,
}

impl BattleEngine {
    #[must_use]
    pub const fn new(api: Arc<UnifiedClient>) -> Self {
        Self { api }
    }

    /// Runs the full simulation and returns the ranked outcome.
    ///
    /// Enrichment is best-effort: with both upstreams unreachable the result
    /// is still complete, derived purely from the seeded synthesis. The only
    /// failure mode is fewer than two combatants.
    pub async fn generate_result(
        &self,
        combatants: &[Combatant],
    ) -> Result<BattleReport, BattleError> {
        if combatants.len() < 2 {
            return Err(BattleError::NotEnoughCombatants);
        }

        info!(
            combatants = combatants.len(),
            "running battle simulation"
        );

        let enrichments = join_all(combatants.iter().map(|c| self.enrich(c))).await;

        let fighters: Vec<Fighter> = combatants
            .iter()
            .zip(enrichments)
            .map(|(combatant, (api_data, anime_data))| {
                build_fighter(combatant, api_data.as_ref(), anime_data.as_ref())
            })
            .collect();

        let metric_refs: Vec<&PowerMetrics> = fighters.iter().map(|f| &f.metrics).collect();
        let battlefield = environment::select(&metric_refs);
        debug!(environment = battlefield.name, "battlefield selected");

        let mut ranked: Vec<RankedCombatant> = fighters
            .iter()
            .enumerate()
            .map(|(i, fighter)| score_fighter(fighter, i, &fighters, battlefield))
            .collect();

        // Stable sort: ties keep input order, so there is no first-mover
        // bias beyond it.
        ranked.sort_by(|a, b| {
            b.battle_score
                .partial_cmp(&a.battle_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let winner = ranked[0].clone();
        let phases = build_phases(&ranked, battlefield);
        let victory_factors = build_victory_factors(&ranked, battlefield);

        Ok(BattleReport {
            winner: winner.name,
            environment: *battlefield,
            rankings: ranked,
            phases,
            victory_factors,
        })
    }

    /// Looks the combatant up through the unification layer. Returns the
    /// detail-enriched character and the best-matching series, either of
    /// which may be absent; failures never propagate.
    async fn enrich(
        &self,
        combatant: &Combatant,
    ) -> (Option<CharacterRecord>, Option<SeriesRecord>) {
        let results = self.api.search_characters(&combatant.name).await;
        if results.is_empty() {
            debug!(name = %combatant.name, "no upstream match, using seeded attributes");
            return (None, None);
        }

        let name_lower = combatant.name.to_lowercase();
        let anime_lower = combatant.anime.to_lowercase();

        let best = results
            .iter()
            .find(|r| {
                r.name.to_lowercase() == name_lower
                    && r.series_name()
                        .is_some_and(|s| s.to_lowercase() == anime_lower)
            })
            .unwrap_or(&results[0]);

        let details = self.api.get_character_details(best).await;

        let series_results = self.api.search_series(&combatant.anime).await;
        let series = series_results
            .iter()
            .find(|r| r.name.to_lowercase() == anime_lower)
            .or_else(|| series_results.first())
            .cloned();

        (Some(details), series)
    }
}

fn build_fighter(
    combatant: &Combatant,
    api_data: Option<&CharacterRecord>,
    anime_data: Option<&SeriesRecord>,
) -> Fighter {
    let seeds = Seeds::derive(&combatant.name, &combatant.anime);
    let signals = ApiSignals::from_records(api_data, anime_data);

    let mut metrics = attributes::synthesize(seeds, &signals);

    let abilities = api_data
        .and_then(|r| r.description.as_deref())
        .map(abilities::extract_abilities)
        .unwrap_or_default();

    abilities::apply_keyword_boosts(&mut metrics, &abilities);

    let power_level = metrics.power_level();
    let techniques = techniques::generate(seeds, &metrics, &abilities);

    Fighter {
        name: combatant.name.clone(),
        anime: combatant.anime.clone(),
        image_url: combatant.image_url.clone(),
        enhanced: api_data.is_some() || anime_data.is_some(),
        metrics,
        power_level,
        abilities,
        techniques,
    }
}

fn score_fighter(
    fighter: &Fighter,
    index: usize,
    all: &[Fighter],
    battlefield: &Environment,
) -> RankedCombatant {
    let base_power = f64::from(fighter.power_level) * 0.6;

    let mut environment_bonus = 0.0;
    for attribute in battlefield.favors {
        let value = fighter.metrics.get(attribute);
        if value > 80 {
            environment_bonus += f64::from(value - 80) * 0.5;
        }
    }

    let ultimate_power = fighter.techniques[3].power;
    let technique_bonus = f64::from(ultimate_power) * 0.1;

    let balance = 100 - (fighter.metrics.max() - fighter.metrics.min());
    let balance_bonus = f64::from(balance) * 0.1;

    let mut matchup = 0.0;
    for (other_index, opponent) in all.iter().enumerate() {
        if other_index == index {
            continue;
        }

        let my_best = fighter.metrics.ranked_desc();
        let their_worst = opponent.metrics.ranked_asc();

        for &(my_attr, my_value) in &my_best[..3] {
            for &(their_attr, their_value) in &their_worst[..3] {
                if my_attr == their_attr.countered_by() {
                    matchup += (f64::from(my_value) - f64::from(their_value)) / 10.0;
                }
            }
        }

        for (attribute, value) in fighter.metrics.iter() {
            if value > opponent.metrics.get(attribute) + SIGNIFICANT_ADVANTAGE {
                matchup += 1.0;
            }
        }
    }
    let matchup_bonus = matchup.min(MATCHUP_CAP);

    let breakdown = ScoreBreakdown {
        base_power,
        environment_bonus,
        technique_bonus,
        balance_bonus,
        matchup_bonus,
    };

    RankedCombatant {
        name: fighter.name.clone(),
        anime: fighter.anime.clone(),
        image_url: fighter.image_url.clone(),
        power_level: fighter.power_level,
        metrics: fighter.metrics.clone(),
        techniques: fighter.techniques.to_vec(),
        extracted_abilities: fighter.abilities.iter().take(3).cloned().collect(),
        data_enhanced: fighter.enhanced,
        battle_score: breakdown.total(),
        breakdown,
    }
}

fn ultimate(combatant: &RankedCombatant) -> &Technique {
    combatant
        .techniques
        .iter()
        .find(|t| t.kind == TechniqueKind::Ultimate)
        .unwrap_or(&combatant.techniques[3])
}

fn build_phases(ranked: &[RankedCombatant], battlefield: &Environment) -> Vec<BattlePhase> {
    let winner = &ranked[0];
    let mut phases = Vec::with_capacity(4);

    phases.push(BattlePhase {
        title: "Initial Engagement".to_string(),
        description: format!(
            "The battle begins in {}, testing each fighter's {} and {}.",
            battlefield.name,
            battlefield.favors[0].label().to_lowercase(),
            battlefield.favors[1].label().to_lowercase(),
        ),
    });

    if let Some(runner_up) = ranked.get(1) {
        let (top_attr, top_value) = runner_up.metrics.ranked_desc()[0];
        phases.push(BattlePhase {
            title: "Tactical Adjustments".to_string(),
            description: format!(
                "{} initially gains ground using {} ({top_value}).",
                runner_up.name,
                top_attr.label().to_lowercase(),
            ),
        });
    }

    let (winner_attr, winner_value) = winner.metrics.ranked_desc()[0];
    let mut shift = format!(
        "{} turns the tide through superior {} ({winner_value}).",
        winner.name,
        winner_attr.label().to_lowercase(),
    );
    if battlefield.favors.contains(&winner_attr) {
        shift.push_str(&format!(
            " The {} environment amplifies {}'s {} advantage.",
            battlefield.name,
            winner.name,
            winner_attr.label().to_lowercase(),
        ));
    }
    phases.push(BattlePhase {
        title: "Power Shift".to_string(),
        description: shift,
    });

    let ult = ultimate(winner);
    let delivery = if ult.canonical {
        "their canonical ability"
    } else {
        "their ultimate technique"
    };
    phases.push(BattlePhase {
        title: "Decisive Moment".to_string(),
        description: format!(
            "{} unleashes {delivery}: {} (power {}). This proves decisive, securing victory for {}!",
            winner.name, ult.name, ult.power, winner.name,
        ),
    });

    phases
}

#[allow(clippy::cast_precision_loss)]
fn build_victory_factors(
    ranked: &[RankedCombatant],
    battlefield: &Environment,
) -> Vec<VictoryFactor> {
    let winner = &ranked[0];
    let mut factors = Vec::new();

    let average_power =
        ranked.iter().map(|c| f64::from(c.power_level)).sum::<f64>() / ranked.len() as f64;
    if f64::from(winner.power_level) > average_power + 5.0 {
        factors.push(VictoryFactor {
            kind: VictoryFactorKind::PowerMargin,
            description: format!(
                "{}'s overall power ({}) exceeds the average ({}) by {} points.",
                winner.name,
                winner.power_level,
                average_power.floor(),
                (f64::from(winner.power_level) - average_power).floor(),
            ),
        });
    }

    let ranked_stats = winner.metrics.ranked_desc();
    let (top_attr, top_value) = ranked_stats[0];
    factors.push(VictoryFactor {
        kind: VictoryFactorKind::TopAttribute,
        description: format!(
            "At {top_value} points, {}'s {} is their greatest strength and gives them a significant edge.",
            winner.name,
            top_attr.label().to_lowercase(),
        ),
    });

    let (second_attr, second_value) = ranked_stats[1];
    if second_value > 85 {
        factors.push(VictoryFactor {
            kind: VictoryFactorKind::SecondaryAttribute,
            description: format!(
                "With {second_value} points in {}, {} maintains versatility in combat.",
                second_attr.label().to_lowercase(),
                winner.name,
            ),
        });
    }

    if let Some(synergy_attr) = battlefield
        .favors
        .iter()
        .find(|&&a| winner.metrics.get(a) > 85)
    {
        factors.push(VictoryFactor {
            kind: VictoryFactorKind::EnvironmentSynergy,
            description: format!(
                "The {} environment synergizes with {}'s {}, amplifying their effectiveness.",
                battlefield.name,
                winner.name,
                synergy_attr.label().to_lowercase(),
            ),
        });
    }

    let ult = ultimate(winner);
    if ult.power > 90 {
        let provenance = if ult.canonical {
            "canonical ability"
        } else {
            "ultimate technique"
        };
        factors.push(VictoryFactor {
            kind: VictoryFactorKind::UltimateTechnique,
            description: format!(
                "{}'s {provenance} \"{}\" (power {}) delivers exceptional damage.",
                winner.name, ult.name, ult.power,
            ),
        });
    }

    if ranked.len() == 2 {
        let opponent = &ranked[1];
        let my_best = winner.metrics.ranked_desc();
        let their_worst = opponent.metrics.ranked_asc();

        for &(my_attr, my_value) in &my_best[..2] {
            for &(their_attr, their_value) in &their_worst[..2] {
                if my_attr == their_attr.countered_by() {
                    factors.push(VictoryFactor {
                        kind: VictoryFactorKind::FavorableMatchup,
                        description: format!(
                            "{}'s {} ({my_value}) directly counters {}'s weakness in {} ({their_value}).",
                            winner.name,
                            my_attr.label().to_lowercase(),
                            opponent.name,
                            their_attr.label().to_lowercase(),
                        ),
                    });
                }
            }
        }
    }

    let balance = 100 - (winner.metrics.max() - winner.metrics.min());
    if balance > 70 {
        factors.push(VictoryFactor {
            kind: VictoryFactorKind::Balance,
            description: format!(
                "{}'s attributes are evenly distributed (balance score {balance}), making them adaptable to varied situations.",
                winner.name,
            ),
        });
    }

    factors
}
