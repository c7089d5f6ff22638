pub mod battle;
pub mod clients;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod unified;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use battle::{BattleEngine, Combatant};
pub use config::Config;
use unified::UnifiedClient;

/// Taisen - Anime Character Battle Simulator
/// Compares characters across AniList and MyAnimeList data
#[derive(Parser)]
#[command(name = "taisen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search characters across both sources
    #[command(alias = "s")]
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Search anime series across both sources
    Series {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Guess which anime a character belongs to
    Detect {
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Simulate a battle between two or more characters
    #[command(alias = "b")]
    Battle {
        /// Combatants as alternating NAME ANIME pairs
        #[arg(required = true, num_args = 4.., value_names = ["NAME", "ANIME"])]
        pairs: Vec<String>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let api = Arc::new(UnifiedClient::new(&config));

    match cli.command {
        Commands::Search { query } => cmd_search(&api, &query.join(" ")).await,
        Commands::Series { query } => cmd_series(&api, &query.join(" ")).await,
        Commands::Detect { name } => cmd_detect(&api, &name.join(" ")).await,
        Commands::Battle { pairs } => cmd_battle(api, &pairs).await,
    }
}

async fn cmd_search(api: &UnifiedClient, query: &str) -> anyhow::Result<()> {
    info!("Searching characters for '{}'", query);
    let results = api.search_characters(query).await;

    if results.is_empty() {
        println!("No characters found matching '{}'", query);
        return Ok(());
    }

    println!();
    println!("Search Results:");
    println!("{:-<60}", "");

    for record in &results {
        let series = record.series_name().unwrap_or("Series not identified");
        println!("• {} ({})", record.name, series);
        println!(
            "  Popularity: {} | Source: {:?}",
            record.popularity, record.data_source
        );
        println!();
    }

    Ok(())
}

async fn cmd_series(api: &UnifiedClient, query: &str) -> anyhow::Result<()> {
    info!("Searching series for '{}'", query);
    let results = api.search_series(query).await;

    if results.is_empty() {
        println!("No series found matching '{}'", query);
        return Ok(());
    }

    println!();
    println!("Search Results:");
    println!("{:-<60}", "");

    for record in &results {
        let year = record
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "?".to_string());
        let genres: Vec<&str> = record.genres.iter().take(3).map(String::as_str).collect();

        println!("• {} ({})", record.name, year);
        println!(
            "  Popularity: {} | Genres: {}",
            record.popularity,
            if genres.is_empty() {
                "-".to_string()
            } else {
                genres.join(", ")
            }
        );
        println!();
    }

    Ok(())
}

async fn cmd_detect(api: &UnifiedClient, name: &str) -> anyhow::Result<()> {
    match api.detect_anime_from_character(name).await {
        Some(detection) => {
            println!("Best match: {}", detection.character_name);
            match &detection.series {
                Some(series) => println!("  Series: {}", series.name),
                None => println!("  Series: not identified"),
            }
            println!("  Confidence: {:.0}%", detection.confidence * 100.0);
        }
        None => println!("Could not identify an anime for '{}'", name),
    }

    Ok(())
}

async fn cmd_battle(api: Arc<UnifiedClient>, pairs: &[String]) -> anyhow::Result<()> {
    anyhow::ensure!(
        pairs.len() % 2 == 0,
        "combatants must be NAME ANIME pairs; got an odd number of arguments"
    );

    let combatants: Vec<Combatant> = pairs
        .chunks(2)
        .map(|pair| Combatant::new(pair[0].clone(), pair[1].clone()))
        .collect();

    println!(
        "Simulating battle: {}...",
        combatants
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(" vs ")
    );

    let engine = BattleEngine::new(api);
    let report = engine.generate_result(&combatants).await?;

    println!();
    println!("Battlefield: {} ({})", report.environment.name, report.environment.effect);
    println!("{:-<60}", "");

    for (rank, combatant) in report.rankings.iter().enumerate() {
        let marker = if rank == 0 { " [WINNER]" } else { "" };
        println!(
            "{}. {} ({}){}",
            rank + 1,
            combatant.name,
            combatant.anime,
            marker
        );
        println!(
            "   Power Level: {} | Battle Score: {:.0}",
            combatant.power_level,
            combatant.battle_score.round()
        );
        println!(
            "   Base {:.0} | Environment +{:.0} | Technique +{:.0} | Balance +{:.0} | Matchup +{:.0}",
            combatant.breakdown.base_power,
            combatant.breakdown.environment_bonus,
            combatant.breakdown.technique_bonus,
            combatant.breakdown.balance_bonus,
            combatant.breakdown.matchup_bonus
        );

        let ult = &combatant.techniques[3];
        let canon = if ult.canonical { " [CANON]" } else { "" };
        println!("   Ultimate: {} (power {}){}", ult.name, ult.power, canon);
        println!();
    }

    println!("Battle Progression:");
    for phase in &report.phases {
        println!("  {}: {}", phase.title, phase.description);
    }

    println!();
    println!("Victory Analysis for {}:", report.winner);
    for factor in &report.victory_factors {
        println!("  • {}", factor.description);
    }

    Ok(())
}
