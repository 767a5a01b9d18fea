//! Hot Stocks CLI
//!
//! Screens an index universe for RSI extremes, shows a single symbol's RSI
//! development, and exports the constituents table.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use hotstocks::config::ScreeningConfig;
use hotstocks::core::screening::ScreeningService;
use hotstocks::export;
use hotstocks::logging;
use hotstocks::models::{Classification, ScreeningResult};
use hotstocks::services::universe::SYMBOL_COLUMN;
use hotstocks::services::{
    load_universe, CsvDirectoryProvider, HistoryRange, PriceHistoryProvider, YahooChartProvider,
};
use hotstocks::signals::Thresholds;

#[derive(Parser)]
#[command(name = "hotstocks")]
#[command(about = "RSI hot stock screener", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UniverseArgs {
    /// Constituents table (CSV with a Symbol column)
    #[arg(short, long)]
    universe: PathBuf,

    /// Column holding the company name (`Security` for the S&P 500 listing)
    #[arg(long, default_value = "Name")]
    name_column: String,
}

#[derive(Args)]
struct RunArgs {
    /// Directory of <SYMBOL>.csv files (date,close); Yahoo is queried when omitted
    #[arg(short, long)]
    prices: Option<PathBuf>,

    /// History range (ytd, 1mo, 3mo, 6mo, 1y, 2y)
    #[arg(short, long, default_value = "ytd")]
    range: HistoryRange,

    /// RSI smoothing period
    #[arg(long)]
    period: Option<usize>,

    /// Readings below this are oversold
    #[arg(long)]
    oversold: Option<f64>,

    /// Readings above this are overbought
    #[arg(long)]
    overbought: Option<f64>,

    /// Write the result as CSV to this path
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the whole universe and list the hot stocks
    Screen {
        #[command(flatten)]
        universe: UniverseArgs,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Show the RSI development of a single symbol
    Rsi {
        #[command(flatten)]
        universe: UniverseArgs,
        #[command(flatten)]
        run: RunArgs,

        /// Ticker symbol, e.g. AAPL
        #[arg(short, long)]
        symbol: String,
    },

    /// Write the constituents table as CSV
    ExportUniverse {
        #[command(flatten)]
        universe: UniverseArgs,

        #[arg(short, long)]
        out: PathBuf,
    },
}

impl RunArgs {
    fn config(&self) -> Result<ScreeningConfig, Box<dyn std::error::Error>> {
        Ok(ScreeningConfig::from_env()?.with_overrides(
            self.period,
            self.oversold,
            self.overbought,
        ))
    }

    fn provider(&self) -> Result<Arc<dyn PriceHistoryProvider>, Box<dyn std::error::Error>> {
        let provider: Arc<dyn PriceHistoryProvider> = match &self.prices {
            Some(dir) => Arc::new(CsvDirectoryProvider::new(dir.clone())),
            None => Arc::new(YahooChartProvider::new()?),
        };
        Ok(provider)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Screen { universe, run } => {
            let universe = Arc::new(load_universe(
                &universe.universe,
                SYMBOL_COLUMN,
                &universe.name_column,
            )?);
            let service = ScreeningService::new(universe, run.provider()?);
            let result = service.run(run.config()?, run.range).await?;

            print_result(&result);
            if let Some(path) = &run.out {
                export::write_screening_csv(&result, File::create(path)?)?;
                println!("Wrote {}", path.display());
            }
        }
        Commands::Rsi {
            universe,
            run,
            symbol,
        } => {
            let universe = Arc::new(load_universe(
                &universe.universe,
                SYMBOL_COLUMN,
                &universe.name_column,
            )?);
            let service = ScreeningService::new(universe, run.provider()?);
            let report = service
                .symbol_report(&symbol, run.config()?, run.range)
                .await?;

            println!("{}", report.title());
            match (&report.outcome.oscillator, &report.outcome.failure) {
                (Some(series), _) => {
                    for point in &series.points {
                        match point.value {
                            Some(v) => println!("  {}  {:>7.2}", point.date, v),
                            None => println!("  {}        -", point.date),
                        }
                    }
                    println!(
                        "Latest: {} ({})",
                        report
                            .outcome
                            .latest_value
                            .map(|v| format!("{:.2}", v))
                            .unwrap_or_else(|| "n/a".to_string()),
                        report.outcome.classification
                    );
                    if let Some(path) = &run.out {
                        export::write_oscillator_csv(
                            series,
                            report.thresholds,
                            File::create(path)?,
                        )?;
                        println!("Wrote {}", path.display());
                    }
                }
                (None, Some(reason)) => println!("  undetermined: {}", reason),
                (None, None) => println!("  undetermined"),
            }
        }
        Commands::ExportUniverse { universe, out } => {
            let universe =
                load_universe(&universe.universe, SYMBOL_COLUMN, &universe.name_column)?;
            export::write_universe_csv(&universe, File::create(&out)?)?;
            println!("Wrote {} symbols to {}", universe.len(), out.display());
        }
    }

    Ok(())
}

fn print_result(result: &ScreeningResult) {
    let thresholds = Thresholds::from(&result.config);
    println!(
        "Screened {} symbols (RSI {}, oversold < {}, overbought > {})",
        result.len(),
        result.config.period,
        thresholds.oversold,
        thresholds.overbought
    );

    if result.has_hot_symbols() {
        println!("Hot stocks:");
        for outcome in result.hot_outcomes() {
            println!(
                "  {:<8} {:<40} {:>7.2}  {}",
                outcome.symbol,
                outcome.display_name,
                outcome.latest_value.unwrap_or_default(),
                outcome.classification
            );
        }
    } else {
        println!("No hot stocks: every classified symbol is within the thresholds.");
    }

    let undetermined = result.count(Classification::Undetermined);
    if undetermined > 0 {
        println!("Undetermined ({}):", undetermined);
        for outcome in result.with_classification(Classification::Undetermined) {
            let reason = outcome
                .failure
                .as_ref()
                .map(|f| f.to_string())
                .unwrap_or_default();
            println!("  {:<8} {}", outcome.symbol, reason);
        }
    }
}
