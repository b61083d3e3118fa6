//! Polymarket Odds Reporting Bot
//!
//! Serves probability charts and summary tables for configured Polymarket
//! events, over Telegram or as one-shot CLI reports.

use clap::{Parser, Subcommand};
use polyodds_bot::{
    client::PolymarketClient,
    config::{Config, PolicyKind},
    report::ReportGenerator,
    telegram::TelegramBot,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "polyodds-bot")]
#[command(about = "Polymarket odds reporting bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Run,
    /// Generate a single report to stdout and a PNG file
    Report {
        /// Configured command name, event URL, or event slug
        event: String,
        /// Selection policy override
        #[arg(long, value_enum)]
        policy: Option<PolicyKind>,
        /// Where to write the chart image
        #[arg(short, long, default_value = "report.png")]
        output: PathBuf,
    },
    /// List configured event commands
    Events,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run => run_bot(config).await,
        Commands::Report {
            event,
            policy,
            output,
        } => one_shot_report(config, &event, policy, &output).await,
        Commands::Events => list_events(config),
    }
}

async fn run_bot(config: Config) -> anyhow::Result<()> {
    tracing::info!("--- Polymarket Odds Bot Initialized ---");

    let client = PolymarketClient::new(&config.polymarket, config.report.lookback_hours)?;
    let generator = ReportGenerator::new(client, config.report.clone());

    let mut bot = TelegramBot::new(config, generator)?;
    bot.run().await;
    Ok(())
}

async fn one_shot_report(
    config: Config,
    event: &str,
    policy: Option<PolicyKind>,
    output: &PathBuf,
) -> anyhow::Result<()> {
    // Accept a configured command name as well as a raw URL/slug
    let event_ref = config.event_url(event).unwrap_or(event).to_string();

    let client = PolymarketClient::new(&config.polymarket, config.report.lookback_hours)?;
    let generator = ReportGenerator::new(client, config.report.clone());

    let policy = policy.unwrap_or(config.report.policy);
    let report = generator.generate_with_policy(&event_ref, policy).await?;

    println!("{}", report.text);
    match report.image {
        Some(png) => {
            std::fs::write(output, png)?;
            tracing::info!("Chart written to {}", output.display());
        }
        None => tracing::warn!("No chart produced"),
    }
    Ok(())
}

fn list_events(config: Config) -> anyhow::Result<()> {
    if config.events.is_empty() {
        println!("No events configured. Add an [events] table to the config file.");
        return Ok(());
    }

    for (command, url) in &config.events {
        println!("/{:<20} {}", command, url);
    }
    Ok(())
}
