//! The single source of truth for slippage, latency, commission, and
//! limit/stop triggering. Shared bit-for-bit by backtest and paper execution —
//! neither mode is allowed to special-case fill math.
//!
//! Determinism contract: a [`FillSimulator`] owns a seeded `ChaCha8Rng`.
//! Given the same seed and the same call sequence, slippage bps, latency ms,
//! and commission are bit-identical across runs.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;

use qtr_domain::{Fill, Market, Order, OrderSide, OrderType};

/// Per-market default cost constants. Overridable via [`FillSimConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarketCostDefaults {
    pub base_slippage_bps: Decimal,
    pub commission_bps: Decimal,
}

pub fn default_costs(market: Market) -> MarketCostDefaults {
    match market {
        Market::Crypto => MarketCostDefaults {
            base_slippage_bps: Decimal::new(10, 0),
            commission_bps: Decimal::new(10, 0),
        },
        Market::Kr => MarketCostDefaults {
            base_slippage_bps: Decimal::new(5, 0),
            commission_bps: Decimal::new(15, 1),
        },
        Market::Us => MarketCostDefaults {
            base_slippage_bps: Decimal::new(3, 0),
            commission_bps: Decimal::new(1, 0),
        },
    }
}

fn commission_asset(market: Market) -> &'static str {
    market.quote_asset()
}

#[derive(Clone, Debug, PartialEq)]
pub struct FillSimConfig {
    pub seed: u64,
    pub min_latency_ms: u32,
    pub base_slippage_bps_override: Option<Decimal>,
    pub commission_bps_override: Option<Decimal>,
}

impl FillSimConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            min_latency_ms: 5,
            base_slippage_bps_override: None,
            commission_bps_override: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FillSimError {
    MissingLimitPrice,
    MissingStopPrice,
}

impl std::fmt::Display for FillSimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillSimError::MissingLimitPrice => write!(f, "order requires a price to fill"),
            FillSimError::MissingStopPrice => write!(f, "order requires a stop_price to trigger"),
        }
    }
}

impl std::error::Error for FillSimError {}

/// Owns the deterministic PRNG. One instance per engine; never shared across
/// markets or cloned mid-run — doing so would desynchronize the draw sequence
/// and break the determinism contract.
pub struct FillSimulator {
    config: FillSimConfig,
    rng: ChaCha8Rng,
}

impl FillSimulator {
    pub fn new(config: FillSimConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    fn slippage_bps_for(&self, market: Market) -> Decimal {
        self.config
            .base_slippage_bps_override
            .unwrap_or_else(|| default_costs(market).base_slippage_bps)
    }

    fn commission_bps_for(&self, market: Market) -> Decimal {
        self.config
            .commission_bps_override
            .unwrap_or_else(|| default_costs(market).commission_bps)
    }

    /// Draw a slippage multiplier in [0.5, 1.5], apply adversely to the
    /// initiator: buys pay more, sells receive less.
    fn apply_slippage(&mut self, market: Market, side: OrderSide, base_price: Decimal) -> (Decimal, Decimal) {
        let base_bps = self.slippage_bps_for(market);
        let variation: f64 = self.rng.gen_range(0.5..1.5);
        let variation =
            Decimal::from_f64_retain(variation).unwrap_or(Decimal::ONE);
        let effective_bps = base_bps * variation;
        let factor = effective_bps / Decimal::new(10_000, 0);
        let adjusted = match side {
            OrderSide::Buy => base_price * (Decimal::ONE + factor),
            OrderSide::Sell => base_price * (Decimal::ONE - factor),
        };
        (adjusted, effective_bps)
    }

    /// `latency_ms = max(1, min_latency * (1 + U[0,1]))`. Never zero: a
    /// same-tick fill would let a strategy observe its own fill before the
    /// bar that caused it closes.
    fn draw_latency_ms(&mut self) -> u32 {
        let jitter: f64 = self.rng.gen_range(0.0..1.0);
        let latency = (self.config.min_latency_ms as f64) * (1.0 + jitter);
        (latency.round() as i64).max(1) as u32
    }

    fn commission_for(&self, market: Market, notional: Decimal) -> Decimal {
        let bps = self.commission_bps_for(market);
        (notional.abs() * bps / Decimal::new(10_000, 0)).max(Decimal::ZERO)
    }

    /// Resolve the base reference price for an order before slippage:
    /// MARKET uses `reference_price`; LIMIT buy uses `min(order.price,
    /// reference_price)`; LIMIT sell uses `max(order.price, reference_price)`.
    fn base_price(&self, order: &Order, reference_price: Decimal) -> Result<Decimal, FillSimError> {
        match order.order_type {
            OrderType::Market => Ok(reference_price),
            OrderType::Limit | OrderType::StopLimit => {
                let limit = order.price.ok_or(FillSimError::MissingLimitPrice)?;
                Ok(match order.side {
                    OrderSide::Buy => limit.min(reference_price),
                    OrderSide::Sell => limit.max(reference_price),
                })
            }
            OrderType::Stop => Ok(reference_price),
        }
    }

    /// Simulate filling `order` at `reference_price` as of `now`. Quantity
    /// filled is `order.remaining()` — callers wanting partial fills slice
    /// the order's quantity before calling.
    pub fn simulate_fill(
        &mut self,
        order: &Order,
        reference_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Fill, FillSimError> {
        let base = self.base_price(order, reference_price)?;
        let (price, slippage_bps) = self.apply_slippage(order.market, order.side, base);
        let latency_ms = self.draw_latency_ms();
        let quantity = order.remaining();
        let commission = self.commission_for(order.market, quantity * price);

        Ok(Fill::new(
            order.id,
            order.market,
            order.mode,
            order.symbol.clone(),
            order.side,
            quantity,
            price,
            commission,
            commission_asset(order.market),
            slippage_bps,
            latency_ms,
            now,
        ))
    }
}

/// `can_fill_limit`: buy iff `market_price <= order.price`; sell iff
/// `market_price >= order.price`.
pub fn can_fill_limit(order: &Order, market_price: Decimal) -> Result<bool, FillSimError> {
    let limit = order.price.ok_or(FillSimError::MissingLimitPrice)?;
    Ok(match order.side {
        OrderSide::Buy => market_price <= limit,
        OrderSide::Sell => market_price >= limit,
    })
}

/// `can_trigger_stop`: buy iff `market_price >= stop_price`; sell iff
/// `market_price <= stop_price`.
pub fn can_trigger_stop(order: &Order, market_price: Decimal) -> Result<bool, FillSimError> {
    let stop = order.stop_price.ok_or(FillSimError::MissingStopPrice)?;
    Ok(match order.side {
        OrderSide::Buy => market_price >= stop,
        OrderSide::Sell => market_price <= stop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qtr_domain::TradingMode;
    use rust_decimal_macros::dec;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn market_buy(market: Market, qty: Decimal) -> Order {
        Order::new(
            market,
            TradingMode::Backtest,
            "BTC-USDT",
            OrderSide::Buy,
            OrderType::Market,
            qty,
            None,
            None,
            ts(),
            "turtle_breakout",
        )
        .unwrap()
    }

    #[test]
    fn deterministic_fill_matches_spec_scenario() {
        let order = market_buy(Market::Crypto, dec!(0.1));
        let mut sim1 = FillSimulator::new(FillSimConfig::new(42));
        let fill1 = sim1.simulate_fill(&order, dec!(50000), ts()).unwrap();

        let mut sim2 = FillSimulator::new(FillSimConfig::new(42));
        let fill2 = sim2.simulate_fill(&order, dec!(50000), ts()).unwrap();

        assert_eq!(fill1.price, fill2.price);
        assert_eq!(fill1.slippage_bps, fill2.slippage_bps);
        assert_eq!(fill1.latency_ms, fill2.latency_ms);

        let lower = dec!(50000) * (Decimal::ONE + dec!(5) / dec!(10000));
        let upper = dec!(50000) * (Decimal::ONE + dec!(15) / dec!(10000));
        assert!(fill1.price >= lower && fill1.price <= upper);
    }

    #[test]
    fn buy_fills_always_at_or_above_reference() {
        let order = market_buy(Market::Us, dec!(10));
        let mut sim = FillSimulator::new(FillSimConfig::new(7));
        let fill = sim.simulate_fill(&order, dec!(100), ts()).unwrap();
        assert!(fill.price >= dec!(100));
    }

    #[test]
    fn sell_fills_always_at_or_below_reference() {
        let order = Order::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Sell,
            OrderType::Market,
            dec!(10),
            None,
            None,
            ts(),
            "turtle_breakout",
        )
        .unwrap();
        let mut sim = FillSimulator::new(FillSimConfig::new(7));
        let fill = sim.simulate_fill(&order, dec!(100), ts()).unwrap();
        assert!(fill.price <= dec!(100));
    }

    #[test]
    fn latency_never_zero() {
        let order = market_buy(Market::Us, dec!(1));
        let mut sim = FillSimulator::new(FillSimConfig::new(1));
        for _ in 0..50 {
            let fill = sim.simulate_fill(&order, dec!(100), ts()).unwrap();
            assert!(fill.latency_ms >= 1);
        }
    }

    #[test]
    fn can_fill_limit_buy_boundary() {
        let order = Order::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Buy,
            OrderType::Limit,
            dec!(10),
            Some(dec!(100)),
            None,
            ts(),
            "turtle_breakout",
        )
        .unwrap();
        assert!(can_fill_limit(&order, dec!(100)).unwrap());
        assert!(can_fill_limit(&order, dec!(99)).unwrap());
        assert!(!can_fill_limit(&order, dec!(101)).unwrap());
    }

    #[test]
    fn can_trigger_stop_sell_boundary() {
        let order = Order::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Sell,
            OrderType::Stop,
            dec!(10),
            None,
            Some(dec!(100)),
            ts(),
            "turtle_breakout",
        )
        .unwrap();
        assert!(can_trigger_stop(&order, dec!(100)).unwrap());
        assert!(can_trigger_stop(&order, dec!(99)).unwrap());
        assert!(!can_trigger_stop(&order, dec!(101)).unwrap());
    }

    #[test]
    fn commission_scales_with_notional_and_market_rate() {
        let order = market_buy(Market::Crypto, dec!(1));
        let mut sim = FillSimulator::new(FillSimConfig::new(42));
        let fill = sim.simulate_fill(&order, dec!(100), ts()).unwrap();
        assert!(fill.commission > Decimal::ZERO);
        assert_eq!(fill.commission_asset, "USDT");
    }
}
