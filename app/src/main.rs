// In app/src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use app_config::{Settings, StrategySettings};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use core_types::{StrategyConfig, Timeframe, Trade};
use strategies::factory::{create_strategies_for_live_run, create_strategy};
use strategies::pipeline::analyze_pair;
use strategies::{DataFrame, DataProvider, MemoryDataProvider, SignalColumn, StoplossContext, Strategy};
use tracing_subscriber::prelude::*;

mod market_data;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Runs the breakout strategies over candle files.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the candles for one run come from.
#[derive(Args, Debug)]
struct Source {
    /// The strategy to run ("breakout" or "pair_breakout").
    #[arg(short, long)]
    strategy: String,

    /// The traded pair (e.g., "ETH/USDT").
    #[arg(short, long)]
    pair: String,

    /// CSV file with the pair's candles on the strategy timeframe.
    #[arg(short, long)]
    candles: PathBuf,

    /// CSV file with the reference asset's candles, for strategies that merge one.
    #[arg(long)]
    informative: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyzes the pair and prints the last rows of the frame and the latest signal.
    Analyze {
        #[command(flatten)]
        source: Source,

        /// How many trailing rows to print.
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },

    /// Analyzes the pair and evaluates the custom stoploss for a hypothetical trade.
    Stoploss {
        #[command(flatten)]
        source: Source,

        /// The current price.
        #[arg(long)]
        rate: f64,

        /// Entry price of the trade. Defaults to `--rate`.
        #[arg(long)]
        open_rate: Option<f64>,

        /// Evaluate a short position.
        #[arg(long)]
        short: bool,

        /// Evaluate right after the entry order filled.
        #[arg(long)]
        after_fill: bool,
    },

    /// Validates `config/live.toml` by building every strategy of each enabled pair.
    Check,
}

// --- Main Application Entry Point ---

fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings().context("Failed to load settings")?;

    let level = settings.app.log_level.parse().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(environment = %settings.app.environment, "Starting atlas-breakout");

    match cli.command {
        Commands::Analyze { source, rows } => handle_analyze(&settings, &source, rows)?,
        Commands::Stoploss {
            source,
            rate,
            open_rate,
            short,
            after_fill,
        } => handle_stoploss(&settings, &source, rate, open_rate.unwrap_or(rate), short, after_fill)?,
        Commands::Check => handle_check()?,
    }

    Ok(())
}

/// Builds the named strategy, using its block from the settings when present.
fn build_strategy(name: &str, settings: &StrategySettings) -> Result<Box<dyn Strategy + Send + Sync>> {
    let params = match name {
        "breakout" => settings.breakout.as_ref().map(toml::Value::try_from).transpose()?,
        "pair_breakout" => settings.pair_breakout.as_ref().map(toml::Value::try_from).transpose()?,
        _ => None,
    };
    let config = StrategyConfig {
        name: name.to_string(),
        params: params.unwrap_or_else(|| toml::Value::Table(Default::default())),
    };
    create_strategy(&config)
}

/// Loads the pair's candles plus every informative series the strategy declares.
fn load_provider(strategy: &dyn Strategy, source: &Source, stake_currency: &str) -> Result<MemoryDataProvider> {
    let mut dp = MemoryDataProvider::new();
    dp.insert_candles(
        source.pair.as_str(),
        strategy.profile().timeframe,
        market_data::load_klines(&source.candles)?,
    );

    for spec in strategy.informative_pairs() {
        let pair = spec.pair(stake_currency);
        let path = source.informative.as_ref().with_context(|| {
            format!("{} needs candles for {}; pass --informative", strategy.name(), pair)
        })?;
        dp.insert_candles(pair.0, spec.timeframe, market_data::load_klines(path)?);
    }
    Ok(dp)
}

fn analyzed<'a>(dp: &'a MemoryDataProvider, strategy: &dyn Strategy, pair: &str) -> Result<&'a DataFrame> {
    dp.analyzed_frame(pair, strategy.profile().timeframe)
        .with_context(|| format!("No analyzed frame stored for {pair}"))
}

// --- "Analyze" Subcommand Logic ---

fn handle_analyze(settings: &Settings, source: &Source, rows: usize) -> Result<()> {
    let strategy = build_strategy(&source.strategy, &settings.strategies)?;
    let stake = settings.exchange.stake_currency.as_str();
    let mut dp = load_provider(strategy.as_ref(), source, stake)?;

    let signal = analyze_pair(strategy.as_ref(), &mut dp, &source.pair, stake)?;
    let frame = analyzed(&dp, strategy.as_ref(), &source.pair)?;

    println!("\n--- {} on {} ---", strategy.name(), source.pair);
    println!("{}", serde_json::to_string_pretty(strategy.profile())?);
    print_frame_tail(frame, rows);
    println!("Latest signal: {signal:?}");
    Ok(())
}

/// Prints the last `rows` rows as tab-separated values. Undefined values print as `-`.
fn print_frame_tail(frame: &DataFrame, rows: usize) {
    let columns: Vec<&str> = frame.column_names().collect();

    let mut header = vec!["open_time"];
    header.extend(columns.iter().copied());
    header.extend(SignalColumn::ALL.iter().map(|c| c.name()));
    println!("{}", header.join("\t"));

    let open_time = frame.open_time();
    for row in frame.len().saturating_sub(rows)..frame.len() {
        let mut cells = vec![open_time[row].to_string()];
        for name in &columns {
            let value = frame.column(name).ok().and_then(|values| values[row]);
            cells.push(value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}")));
        }
        for column in SignalColumn::ALL {
            let flag = frame.signal(column).map(|values| values[row]).unwrap_or(false);
            cells.push(u8::from(flag).to_string());
        }
        println!("{}", cells.join("\t"));
    }
}

// --- "Stoploss" Subcommand Logic ---

fn handle_stoploss(
    settings: &Settings,
    source: &Source,
    rate: f64,
    open_rate: f64,
    short: bool,
    after_fill: bool,
) -> Result<()> {
    let strategy = build_strategy(&source.strategy, &settings.strategies)?;
    let stake = settings.exchange.stake_currency.as_str();
    let mut dp = load_provider(strategy.as_ref(), source, stake)?;
    analyze_pair(strategy.as_ref(), &mut dp, &source.pair, stake)?;

    let trade = Trade {
        pair: source.pair.clone(),
        is_short: short,
        open_rate,
        open_date: Utc::now(),
        amount: 1.0,
    };
    let current_profit = if short { 1.0 - rate / open_rate } else { rate / open_rate - 1.0 };
    let ctx = StoplossContext {
        pair: &source.pair,
        trade: &trade,
        current_time: Utc::now(),
        current_rate: rate,
        current_profit,
        after_fill,
    };

    let stop = strategy.custom_stoploss(&dp, &ctx)?;
    println!("\n--- {} stoploss on {} ---", strategy.name(), source.pair);
    println!("Side: {:?} | Rate: {rate} | Profit: {:.2}%", trade.side(), current_profit * 100.0);
    println!("Relative stop: {stop:.6} | Stop price: {:.4}", rate * (1.0 + stop));
    Ok(())
}

// --- "Check" Subcommand Logic ---

fn handle_check() -> Result<()> {
    let live = app_config::load_live_config().context("Failed to load live.toml")?;

    let mut checked = 0;
    for pair_config in live.enabled_pairs() {
        let interval: Timeframe = pair_config.interval.parse()?;
        let strategies = create_strategies_for_live_run(&pair_config.strategies)
            .with_context(|| format!("Invalid strategy list for {}", pair_config.symbol))?;

        for strategy in &strategies {
            let profile = strategy.profile();
            if profile.timeframe != interval {
                anyhow::bail!(
                    "{} runs on {} but {} is configured for {}",
                    strategy.name(),
                    profile.timeframe,
                    pair_config.symbol,
                    interval
                );
            }
            tracing::info!(
                pair = %pair_config.symbol,
                strategy = strategy.name(),
                startup_candles = profile.startup_candle_count,
                "Strategy configured."
            );
        }
        checked += strategies.len();
    }

    println!("{checked} strategies configured across the enabled pairs.");
    Ok(())
}
