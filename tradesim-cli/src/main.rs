//! TradeSim CLI: backtest, optimize and synthetic-data commands.
//!
//! Commands:
//! - `run`: backtest the `[strategy]` parameters from a TOML config on a CSV
//! - `optimize`: random-search the parameter space and re-run the winner
//! - `generate`: write a seeded synthetic OHLCV series to CSV
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG` to change the
//! level (default `info`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradesim_runner::{
    generate_bars, load_inputs, run_backtest, run_optimization, save_backtest, save_bars,
    save_optimization, BacktestReport, Crash, OptimizationReport, SyntheticConfig,
};

#[derive(Parser)]
#[command(
    name = "tradesim",
    version,
    about = "TradeSim: bar-by-bar strategy backtester and parameter optimizer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the configured strategy on a CSV of bars.
    Run {
        /// CSV with timestamp,open,high,low,close[,volume].
        #[arg(long)]
        data: PathBuf,

        /// TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for report.json, equity.csv and trades.csv.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Random-search parameters and re-run the best set.
    Optimize {
        /// CSV with timestamp,open,high,low,close[,volume].
        #[arg(long)]
        data: PathBuf,

        /// TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of trials. Overrides `[optimizer] num_trials`.
        #[arg(long)]
        trials: Option<usize>,

        /// Master seed. Overrides `[optimizer] seed`.
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for optimization.json, trials.csv and the best run.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Write a synthetic hourly OHLCV series.
    Generate {
        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,

        /// Number of hourly bars.
        #[arg(long, default_value_t = 744)]
        bars: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Bar index from which prices drop by `--crash-amplitude`.
        #[arg(long)]
        crash_at: Option<usize>,

        /// Fractional drop applied at `--crash-at`.
        #[arg(long, default_value_t = 0.2)]
        crash_amplitude: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            config,
            output_dir,
        } => cmd_run(&data, config.as_deref(), &output_dir),
        Commands::Optimize {
            data,
            config,
            trials,
            seed,
            output_dir,
        } => cmd_optimize(&data, config.as_deref(), trials, seed, &output_dir),
        Commands::Generate {
            output,
            bars,
            seed,
            crash_at,
            crash_amplitude,
        } => cmd_generate(&output, bars, seed, crash_at, crash_amplitude),
    }
}

fn cmd_run(data: &Path, config: Option<&Path>, output_dir: &Path) -> Result<()> {
    let (config, bars) = load_inputs(config, data).context("failed to load inputs")?;
    let report = run_backtest(&config, &bars).context("backtest failed")?;
    let artifacts = save_backtest(&report, &bars, output_dir)?;

    print_backtest(&report);
    println!();
    println!("Report: {}", artifacts.report_json.display());
    println!("Equity: {}", artifacts.equity_csv.display());
    println!("Trades: {}", artifacts.trades_csv.display());
    Ok(())
}

fn cmd_optimize(
    data: &Path,
    config: Option<&Path>,
    trials: Option<usize>,
    seed: Option<u64>,
    output_dir: &Path,
) -> Result<()> {
    let (config, bars) = load_inputs(config, data).context("failed to load inputs")?;
    let report = run_optimization(&config, &bars, trials, seed).context("optimization failed")?;
    let artifacts = save_optimization(&report, &bars, output_dir)?;

    print_optimization(&report);
    println!();
    println!("Report: {}", artifacts.report_json.display());
    println!("Trials: {}", artifacts.trials_csv.display());
    println!("Best run: {}", artifacts.best_run.equity_csv.display());
    Ok(())
}

fn cmd_generate(
    output: &Path,
    bars: usize,
    seed: u64,
    crash_at: Option<usize>,
    crash_amplitude: f64,
) -> Result<()> {
    let config = SyntheticConfig {
        bars,
        seed,
        crash: crash_at.map(|at_bar| Crash {
            at_bar,
            amplitude: crash_amplitude,
        }),
        ..Default::default()
    };
    let series = generate_bars(&config).context("invalid synthetic data settings")?;
    save_bars(&series, output)?;
    info!(path = %output.display(), bars = series.len(), seed, "wrote synthetic bars");
    println!("Wrote {} bars to {}", series.len(), output.display());
    Ok(())
}

fn print_backtest(report: &BacktestReport) {
    let r = &report.output.result;
    let p = &report.params;
    let filters = if report.filters.is_empty() {
        "none".to_string()
    } else {
        report.filters.join(", ")
    };

    println!("=== Backtest: {} ({}) ===", report.instrument, report.signal);
    println!(
        "Params:        fast={} slow={} risk={:.4} stop={:.4} target={:.4} atr_mult={:.2} atr_stop={}",
        p.fast_window,
        p.slow_window,
        p.risk_per_trade,
        p.stop_loss_pct,
        p.take_profit_pct,
        p.atr_multiplier,
        p.use_atr_stop_loss
    );
    println!("Filters:       {filters}");
    println!("Initial:       ${:.2}", r.initial_capital);
    println!("Final equity:  ${:.2}", r.final_equity);
    println!("Total return:  {:.2}%", r.total_return * 100.0);
    println!("Sharpe (bar):  {:.4}", r.sharpe_approx);
    println!("Max drawdown:  {:.2}%", r.max_drawdown * 100.0);
    println!("Fills:         {}", r.trade_count);

    let s = &report.stats;
    if s.closed_trades > 0 {
        println!("Closed trades: {}", s.closed_trades);
        println!("Win rate:      {:.1}%", s.win_rate * 100.0);
        println!("Profit factor: {:.2}", s.profit_factor);
        println!("Avg bars held: {:.1}", s.avg_bars_held);
    }
}

fn print_optimization(report: &OptimizationReport) {
    let search = &report.search;
    println!(
        "=== Optimization: {} trials, seed {} ({} failed) ===",
        report.trial_count,
        report.seed,
        search.failed_count()
    );
    println!(
        "{:>4}  {:>5}  {:>4}  {:>4}  {:>9}  {:>8}",
        "rank", "trial", "fast", "slow", "return", "drawdown"
    );
    for (rank, trial) in search.top_n(5).into_iter().enumerate() {
        if let Some(r) = trial.result() {
            println!(
                "{:>4}  {:>5}  {:>4}  {:>4}  {:>8.2}%  {:>7.2}%",
                rank + 1,
                trial.index,
                trial.params.fast_window,
                trial.params.slow_window,
                r.total_return * 100.0,
                r.max_drawdown * 100.0
            );
        }
    }
    println!();
    print_backtest(&report.best_run);
}
