//! Random-search parameter optimizer.
//!
//! Each trial samples a [`ParameterSet`] from [`ParameterRanges`], runs the
//! full simulation on the shared history and is scored by total return.
//!
//! # Determinism
//! Trial `i` draws from its own RNG stream (`RngHierarchy::rng_for_trial(i)`),
//! so the sampled parameters do not depend on how trials are scheduled.
//! Results are collected in index order and the best trial is the highest
//! score with ties going to the lowest index. Parallel and sequential searches
//! therefore return identical results for the same seed.

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use tradesim_core::signal::{MacdFilterConfig, RsiFilterConfig};
use tradesim_core::{Bar, EngineConfig, ParameterSet, RngHierarchy, RunResult, SimulationEngine};

/// Errors that stop a search before or after it runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    #[error("trial count must be at least 1")]
    NoTrials,

    #[error("all {trials} trials failed; first failure: {first_reason}")]
    AllTrialsFailed { trials: usize, first_reason: String },

    #[error("invalid range for `{field}`: {reason}")]
    InvalidRanges { field: &'static str, reason: String },
}

/// How the ATR stop flag is chosen per trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtrModeChoice {
    Always,
    Never,
    /// Coin flip per trial.
    #[default]
    Random,
}

/// Half-open `[min, max)` sampling ranges for each tunable parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRanges {
    pub fast_window: (usize, usize),
    /// The lower bound is raised to `fast + 1` per trial.
    pub slow_window: (usize, usize),
    pub risk_per_trade: (f64, f64),
    pub stop_loss_pct: (f64, f64),
    pub take_profit_pct: (f64, f64),
    pub atr_multiplier: (f64, f64),
    pub use_atr_stop_loss: AtrModeChoice,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            fast_window: (5, 30),
            slow_window: (30, 60),
            risk_per_trade: (0.01, 0.03),
            stop_loss_pct: (0.01, 0.05),
            take_profit_pct: (0.02, 0.10),
            atr_multiplier: (1.0, 3.0),
            use_atr_stop_loss: AtrModeChoice::Random,
        }
    }
}

impl ParameterRanges {
    /// Reject empty or inverted ranges and ranges that can only produce
    /// invalid parameter sets.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        let (fast_min, fast_max) = self.fast_window;
        if fast_min == 0 {
            return Err(invalid("fast_window", "minimum must be >= 1"));
        }
        if fast_min >= fast_max {
            return Err(invalid(
                "fast_window",
                format!("empty range [{fast_min}, {fast_max})"),
            ));
        }
        let (slow_min, slow_max) = self.slow_window;
        if slow_min >= slow_max {
            return Err(invalid(
                "slow_window",
                format!("empty range [{slow_min}, {slow_max})"),
            ));
        }

        check_float_range("risk_per_trade", self.risk_per_trade)?;
        if self.risk_per_trade.0 <= 0.0 || self.risk_per_trade.1 > 1.0 {
            return Err(invalid(
                "risk_per_trade",
                format!("must lie within (0, 1], got {:?}", self.risk_per_trade),
            ));
        }
        check_float_range("stop_loss_pct", self.stop_loss_pct)?;
        check_float_range("take_profit_pct", self.take_profit_pct)?;
        check_float_range("atr_multiplier", self.atr_multiplier)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> OptimizeError {
    OptimizeError::InvalidRanges {
        field,
        reason: reason.into(),
    }
}

fn check_float_range(field: &'static str, (min, max): (f64, f64)) -> Result<(), OptimizeError> {
    if !(min.is_finite() && max.is_finite()) {
        return Err(invalid(field, format!("bounds must be finite, got [{min}, {max})")));
    }
    if min < 0.0 {
        return Err(invalid(field, format!("minimum must be >= 0, got {min}")));
    }
    if min >= max {
        return Err(invalid(field, format!("empty range [{min}, {max})")));
    }
    Ok(())
}

/// Draw one parameter set. Every field is sampled independently and
/// uniformly; `fast_window < slow_window` holds by construction.
///
/// `ranges` must have passed [`ParameterRanges::validate`].
pub fn sample_parameter_set<R: Rng>(ranges: &ParameterRanges, rng: &mut R) -> ParameterSet {
    let fast_window = rng.gen_range(ranges.fast_window.0..ranges.fast_window.1);

    let slow_min = ranges.slow_window.0.max(fast_window + 1);
    let slow_window = if slow_min < ranges.slow_window.1 {
        rng.gen_range(slow_min..ranges.slow_window.1)
    } else {
        fast_window + 1
    };

    let risk_per_trade = rng.gen_range(ranges.risk_per_trade.0..ranges.risk_per_trade.1);
    let stop_loss_pct = rng.gen_range(ranges.stop_loss_pct.0..ranges.stop_loss_pct.1);
    let take_profit_pct = rng.gen_range(ranges.take_profit_pct.0..ranges.take_profit_pct.1);
    let atr_multiplier = rng.gen_range(ranges.atr_multiplier.0..ranges.atr_multiplier.1);
    let use_atr_stop_loss = match ranges.use_atr_stop_loss {
        AtrModeChoice::Always => true,
        AtrModeChoice::Never => false,
        AtrModeChoice::Random => rng.gen_bool(0.5),
    };

    ParameterSet {
        fast_window,
        slow_window,
        risk_per_trade,
        stop_loss_pct,
        take_profit_pct,
        atr_multiplier,
        use_atr_stop_loss,
    }
}

/// How a single trial ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialOutcome {
    Completed { result: RunResult },
    /// The engine could not be built from the sampled parameters.
    Failed { reason: String },
}

/// One evaluated trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub index: usize,
    pub params: ParameterSet,
    pub outcome: TrialOutcome,
}

impl TrialRecord {
    /// Total return, or negative infinity for a failed trial.
    pub fn score(&self) -> f64 {
        match &self.outcome {
            TrialOutcome::Completed { result } if !result.total_return.is_nan() => {
                result.total_return
            }
            _ => f64::NEG_INFINITY,
        }
    }

    pub fn result(&self) -> Option<&RunResult> {
        match &self.outcome {
            TrialOutcome::Completed { result } => Some(result),
            TrialOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, TrialOutcome::Failed { .. })
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best: ParameterSet,
    pub best_result: RunResult,
    pub best_trial: usize,
    /// Every trial, in index order.
    pub trials: Vec<TrialRecord>,
}

impl OptimizationResult {
    /// Completed trials, best first. Ties keep index order.
    pub fn top_n(&self, n: usize) -> Vec<&TrialRecord> {
        let mut completed: Vec<&TrialRecord> =
            self.trials.iter().filter(|t| !t.is_failed()).collect();
        completed.sort_by(|a, b| b.score().total_cmp(&a.score()));
        completed.truncate(n);
        completed
    }

    pub fn failed_count(&self) -> usize {
        self.trials.iter().filter(|t| t.is_failed()).count()
    }
}

/// Random-search driver.
#[derive(Debug, Clone)]
pub struct Optimizer {
    pub ranges: ParameterRanges,
    /// Capital, sizing and engine behavior shared by every trial. Its
    /// parameter set is replaced per trial.
    pub base: EngineConfig,
    pub rsi: Option<RsiFilterConfig>,
    pub macd: Option<MacdFilterConfig>,
    pub seed: u64,
    pub parallel: bool,
}

impl Optimizer {
    pub fn new(ranges: ParameterRanges, base: EngineConfig, seed: u64) -> Self {
        Self {
            ranges,
            base,
            rsi: None,
            macd: None,
            seed,
            parallel: true,
        }
    }

    /// Enable or disable parallel trial execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Gate every trial's crossover with the given filters.
    pub fn with_filters(
        mut self,
        rsi: Option<RsiFilterConfig>,
        macd: Option<MacdFilterConfig>,
    ) -> Self {
        self.rsi = rsi;
        self.macd = macd;
        self
    }

    /// Run `trial_count` trials over `history` and pick the best.
    pub fn search(
        &self,
        history: &[Bar],
        trial_count: usize,
    ) -> Result<OptimizationResult, OptimizeError> {
        if trial_count == 0 {
            return Err(OptimizeError::NoTrials);
        }
        self.ranges.validate()?;

        info!(
            trials = trial_count,
            bars = history.len(),
            seed = self.seed,
            parallel = self.parallel,
            "starting parameter search"
        );

        let rng = RngHierarchy::new(self.seed);
        let trials: Vec<TrialRecord> = if self.parallel {
            (0..trial_count)
                .into_par_iter()
                .map(|i| self.run_trial(&rng, history, i))
                .collect()
        } else {
            (0..trial_count)
                .map(|i| self.run_trial(&rng, history, i))
                .collect()
        };

        let mut best: Option<(&TrialRecord, RunResult)> = None;
        for trial in &trials {
            if let TrialOutcome::Completed { result } = &trial.outcome {
                if best.map_or(true, |(b, _)| trial.score() > b.score()) {
                    best = Some((trial, *result));
                }
            }
        }

        let Some((best, best_result)) = best else {
            let first_reason = trials
                .iter()
                .find_map(|t| match &t.outcome {
                    TrialOutcome::Failed { reason } => Some(reason.clone()),
                    TrialOutcome::Completed { .. } => None,
                })
                .unwrap_or_default();
            return Err(OptimizeError::AllTrialsFailed {
                trials: trial_count,
                first_reason,
            });
        };
        let best_trial = best.index;
        let best_params = best.params.clone();

        info!(
            trial = best_trial,
            fast_window = best_params.fast_window,
            slow_window = best_params.slow_window,
            total_return = best_result.total_return,
            final_equity = best_result.final_equity,
            "best trial"
        );

        Ok(OptimizationResult {
            best: best_params,
            best_result,
            best_trial,
            trials,
        })
    }

    fn run_trial(&self, rng: &RngHierarchy, history: &[Bar], index: usize) -> TrialRecord {
        let params = sample_parameter_set(&self.ranges, &mut rng.rng_for_trial(index));
        let config = self.base.with_params(params.clone());

        let outcome = match SimulationEngine::with_filters(config, self.rsi.clone(), self.macd.clone())
        {
            Ok(engine) => {
                let result = engine.run(history).result;
                debug!(
                    trial = index,
                    fast_window = params.fast_window,
                    slow_window = params.slow_window,
                    risk_per_trade = params.risk_per_trade,
                    use_atr_stop_loss = params.use_atr_stop_loss,
                    total_return = result.total_return,
                    "trial complete"
                );
                TrialOutcome::Completed { result }
            }
            Err(e) => {
                warn!(trial = index, error = %e, "trial failed");
                TrialOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        TrialRecord {
            index,
            params,
            outcome,
        }
    }
}
