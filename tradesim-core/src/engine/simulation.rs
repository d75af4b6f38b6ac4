//! Bar-by-bar simulation loop.
//!
//! Per bar, in order:
//! 1. Exit check: stop-loss / take-profit against the close
//! 2. Signal: `on_candle(&bars[..=t])`
//! 3. Entry or contrary-signal handling
//! 4. Mark: equity = cash + signed size * last valid close

use tracing::{trace, warn};

use crate::domain::{Bar, ExitReason, Position, PositionSide, Signal};
use crate::error::ParamError;
use crate::indicators::{Atr, Indicator};
use crate::signal::{MaCrossover, MacdFilterConfig, RsiFilterConfig, SignalConfig, SignalGenerator};

use super::config::{ContrarySignalPolicy, EngineConfig, TradingMode};
use super::exits::ExitLevels;
use super::state::{EngineState, RunOutput};

/// Replays one strategy over a bar history.
///
/// Immutable once built; `run` can be called any number of times, from any
/// number of threads, and always produces the same output for the same input.
pub struct SimulationEngine {
    config: EngineConfig,
    signal: Box<dyn SignalGenerator>,
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("config", &self.config)
            .field("signal", &self.signal.name())
            .finish()
    }
}

impl SimulationEngine {
    pub fn new(config: EngineConfig, signal: Box<dyn SignalGenerator>) -> Result<Self, ParamError> {
        config.validate()?;
        Ok(Self { config, signal })
    }

    /// Engine driven by a plain SMA crossover on the configured windows.
    pub fn from_params(config: EngineConfig) -> Result<Self, ParamError> {
        Self::with_filters(config, None, None)
    }

    /// SMA crossover on the configured windows, gated by optional filters.
    pub fn with_filters(
        config: EngineConfig,
        rsi: Option<RsiFilterConfig>,
        macd: Option<MacdFilterConfig>,
    ) -> Result<Self, ParamError> {
        let signal_config = SignalConfig {
            rsi,
            macd,
            ..SignalConfig::from_params(&config.params)
        };
        let signal = MaCrossover::new(&signal_config)?;
        Self::new(config, Box::new(signal))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn signal_name(&self) -> &str {
        self.signal.name()
    }

    /// Run the simulation. Never fails: degenerate bars are skipped for
    /// trading and counted.
    pub fn run(&self, bars: &[Bar]) -> RunOutput {
        let config = &self.config;
        let params = &config.params;
        let instrument = config.instrument.as_str();
        let mut state = EngineState::new(config.initial_capital);

        // Equal to computing on each prefix: ATR never looks ahead.
        let atr = if params.use_atr_stop_loss {
            Atr::new(config.atr_period).compute(bars)
        } else {
            Vec::new()
        };

        for (t, bar) in bars.iter().enumerate() {
            let price = bar.close;
            let tradable = price.is_finite() && price > 0.0;
            if tradable {
                state.last_valid_close = Some(price);
            } else {
                state.degenerate_bars += 1;
            }
            let atr_t = atr.get(t).copied().unwrap_or(0.0);

            // 1. Exit check
            let exit = match state.positions.get_mut(instrument) {
                Some(pos) if tradable => {
                    let levels = ExitLevels::compute(pos.side, pos.entry_price, params, atr_t);
                    pos.stop_loss = levels.stop_loss;
                    pos.take_profit = levels.take_profit;
                    levels.check(pos.side, price)
                }
                _ => None,
            };
            if let Some(reason) = exit {
                state.close_position(instrument, price, t, bar.timestamp, reason);
            }

            // 2. Signal
            let signal = self.signal.on_candle(&bars[..=t]);
            let held = state.positions.get(instrument).map(|p| p.side);
            trace!(bar = t, %signal, price, held = ?held, "bar decision");

            // 3. Entry / contrary handling
            match (held, signal) {
                (_, Signal::Hold) => {}
                (None, Signal::Buy) => {
                    self.try_open(&mut state, PositionSide::Long, t, bar, atr_t);
                }
                (None, Signal::Sell) => {
                    if config.trading_mode == TradingMode::LongShort {
                        self.try_open(&mut state, PositionSide::Short, t, bar, atr_t);
                    }
                }
                (Some(side), signal) if is_contrary(side, signal) => {
                    if config.contrary_signal == ContrarySignalPolicy::Close && tradable {
                        state.close_position(
                            instrument,
                            price,
                            t,
                            bar.timestamp,
                            ExitReason::Signal,
                        );
                    }
                }
                (Some(_), _) => {}
            }

            // 4. Mark
            state.mark(t, bar.timestamp);
        }

        if state.degenerate_bars > 0 {
            warn!(
                instrument,
                skipped = state.degenerate_bars,
                bars = bars.len(),
                "bars with non-tradable close were skipped"
            );
        }

        state.into_output(config.initial_capital)
    }

    fn try_open(
        &self,
        state: &mut EngineState,
        side: PositionSide,
        bar_index: usize,
        bar: &Bar,
        atr: f64,
    ) {
        let params = &self.config.params;
        let price = bar.close;
        let size =
            self.config
                .sizer
                .position_size(state.cash, price, params.risk_per_trade, None);
        if size <= 0.0 {
            trace!(bar = bar_index, price, "sizer returned 0, no entry");
            return;
        }

        let levels = ExitLevels::compute(side, price, params, atr);
        let position = Position {
            side,
            entry_price: price,
            size,
            entry_bar: bar_index,
            entry_time: bar.timestamp,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
        };
        state.open_position(&self.config.instrument, position);
    }
}

fn is_contrary(side: PositionSide, signal: Signal) -> bool {
    matches!(
        (side, signal),
        (PositionSide::Long, Signal::Sell) | (PositionSide::Short, Signal::Buy)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::bars_from_closes;
    use crate::params::ParameterSet;
    use crate::signal::NullSignal;
    use crate::sizing::RiskSizer;

    fn params(fast: usize, slow: usize) -> ParameterSet {
        ParameterSet {
            fast_window: fast,
            slow_window: slow,
            risk_per_trade: 0.1,
            stop_loss_pct: 0.05,
            take_profit_pct: 0.10,
            ..Default::default()
        }
    }

    fn engine(config: EngineConfig) -> SimulationEngine {
        SimulationEngine::from_params(config).unwrap()
    }

    #[test]
    fn empty_history_keeps_capital() {
        let out = engine(EngineConfig::new(5_000.0, params(1, 2))).run(&[]);
        assert_eq!(out.result.final_equity, 5_000.0);
        assert!(out.equity_curve.is_empty());
        assert_eq!(out.result.trade_count, 0);
    }

    #[test]
    fn curve_has_one_point_per_bar() {
        let bars = bars_from_closes(&[100.0, 105.0, 95.0, 90.0, 120.0, 118.0]);
        let out = engine(EngineConfig::new(10_000.0, params(1, 2))).run(&bars);
        assert_eq!(out.equity_curve.len(), bars.len());
        for (i, point) in out.equity_curve.iter().enumerate() {
            assert_eq!(point.bar_index, i);
            assert_eq!(point.timestamp, bars[i].timestamp);
        }
    }

    #[test]
    fn null_signal_is_flat() {
        let bars = bars_from_closes(&[100.0, 120.0, 80.0, 110.0]);
        let eng = SimulationEngine::new(
            EngineConfig::new(1_000.0, params(1, 2)),
            Box::new(NullSignal),
        )
        .unwrap();
        let out = eng.run(&bars);
        assert!(out.equity_values().iter().all(|&e| e == 1_000.0));
        assert_eq!(out.result.trade_count, 0);
        assert_eq!(out.result.sharpe_approx, 0.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = SimulationEngine::from_params(EngineConfig::new(1_000.0, params(5, 5)))
            .unwrap_err();
        assert_eq!(err.parameter(), "fast_window");
    }

    #[test]
    fn stop_exit_then_reentry_on_same_bar() {
        // bar 1 Buy @105 (stop 99.75); bar 3 the stop fires @90 and a Buy on
        // the same bar re-enters at 90.
        let bars = bars_from_closes(&[100.0, 105.0, 104.0, 90.0]);
        let eng = SimulationEngine::new(
            EngineConfig::new(10_000.0, params(1, 3)),
            Box::new(BuyOn(vec![1, 3])),
        )
        .unwrap();
        let out = eng.run(&bars);
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].exit_reason, ExitReason::StopLoss);
        assert_eq!(out.fills.len(), 3);
        assert_eq!(out.fills[2].bar_index, 3);
        assert_eq!(out.fills[2].price, 90.0);
    }

    #[test]
    fn zero_price_never_opens() {
        let mut bars = bars_from_closes(&[100.0, 105.0]);
        bars[1].close = 0.0;
        let eng = SimulationEngine::new(
            EngineConfig::new(10_000.0, params(1, 2)).with_sizer(RiskSizer::new(0.001, None)),
            Box::new(BuyOn(vec![1])),
        )
        .unwrap();
        let out = eng.run(&bars);
        assert!(out.fills.is_empty());
        assert_eq!(out.result.final_equity, 10_000.0);
    }

    /// Buys on the listed bar indices, holds otherwise.
    struct BuyOn(Vec<usize>);

    impl SignalGenerator for BuyOn {
        fn name(&self) -> &str {
            "buy_on"
        }

        fn on_candle(&self, history: &[Bar]) -> Signal {
            if self.0.contains(&(history.len() - 1)) {
                Signal::Buy
            } else {
                Signal::Hold
            }
        }
    }
}
