use clap::Parser;

use quantbot::config::{AiConfig, EngineConfig};
use quantbot::decision::AiClient;
use quantbot::models::PriceWindow;
use quantbot::synthetic::{MarketScenario, SyntheticDataGenerator};
use quantbot::{Engine, Result};

/// Quantitative decision engine demo: replays synthetic market data through
/// the full evaluation pipeline, one independent task per instrument
#[derive(Debug, Parser)]
#[command(name = "quantbot", version)]
struct Cli {
    /// Comma-separated instrument symbols
    #[arg(long, default_value = "SOL,ETH")]
    symbols: String,

    /// Synthetic market scenario: random-walk, trending, mean-reverting,
    /// sideways, volatile, with-gaps
    #[arg(long, default_value = "random-walk")]
    scenario: String,

    /// Bars in the initial window
    #[arg(long, default_value_t = 240)]
    bars: usize,

    /// Evaluation cycles to run per symbol
    #[arg(long, default_value_t = 12)]
    cycles: usize,

    /// Minutes between bars
    #[arg(long, default_value_t = 60)]
    interval_minutes: i64,

    /// Seed for the synthetic generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let scenario: MarketScenario = cli.scenario.parse()?;

    // Configuration problems are fatal here, never mid-cycle
    let config = EngineConfig::default();
    config.validate()?;

    let ai_config = AiConfig::from_env();
    match &ai_config {
        Some(ai) => tracing::info!("🤖 External decision service: {} at {}", ai.model, ai.base_url),
        None => tracing::info!("⚠️  No LLM_API_KEY set - running on quant fallback only"),
    }

    let symbols: Vec<String> = cli
        .symbols
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.is_empty() {
        return Err("no symbols given".into());
    }

    tracing::info!(
        "🚀 QuantBot starting: {} symbols, {} scenario, {} cycles",
        symbols.len(),
        cli.scenario,
        cli.cycles
    );

    // One fully independent pipeline per instrument; no shared mutable state
    let mut tasks = Vec::with_capacity(symbols.len());
    for (index, symbol) in symbols.into_iter().enumerate() {
        let config = config.clone();
        let ai_config = ai_config.clone();
        let seed = cli.seed + index as u64;
        let (bars, cycles, interval) = (cli.bars, cli.cycles, cli.interval_minutes);

        tasks.push(tokio::spawn(async move {
            run_symbol(symbol, config, ai_config, scenario, seed, bars, cycles, interval).await
        }));
    }

    for task in tasks {
        task.await??;
    }

    tracing::info!("👋 QuantBot done");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_symbol(
    symbol: String,
    config: EngineConfig,
    ai_config: Option<AiConfig>,
    scenario: MarketScenario,
    seed: u64,
    bars: usize,
    cycles: usize,
    interval_minutes: i64,
) -> Result<()> {
    let ai = ai_config.map(AiClient::new);
    let engine = Engine::new(config, ai)?;

    let mut generator = SyntheticDataGenerator::new(seed);
    let history = generator.generate(scenario, bars + cycles, interval_minutes);

    for cycle in 0..cycles {
        // Each cycle sees one more bar, like a live feed would deliver
        let visible = history[..bars + cycle + 1].to_vec();
        let window = PriceWindow::new(symbol.as_str(), visible)?;

        let record = engine.evaluate(&window, None).await;

        tracing::info!(
            "  {} cycle {:>2}: {} {:.4} ({:?}, {} regime)",
            record.symbol,
            cycle + 1,
            record.decision.action,
            record.decision.size_fraction,
            record.decision.source,
            record.analysis.regime.regime,
        );
    }

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quantbot=info".into()),
        )
        .init();
}
