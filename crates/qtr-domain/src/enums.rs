use serde::{Deserialize, Serialize};

/// Venue a symbol trades on. Determines default slippage/commission rates
/// used by the fill simulator and which broker adapter a live runtime wires up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    Crypto,
    Kr,
    Us,
}

impl Market {
    pub fn quote_asset(&self) -> &'static str {
        match self {
            Market::Crypto => "USDT",
            Market::Kr => "KRW",
            Market::Us => "USD",
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::Crypto => write!(f, "crypto"),
            Market::Kr => write!(f, "kr"),
            Market::Us => write!(f, "us"),
        }
    }
}

/// Runtime mode. The bar engine, strategy, and fill simulator are mode-agnostic;
/// only the data source, execution adapter, and clock differ across modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingMode {
    Backtest,
    Paper,
    Live,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl OrderType {
    pub fn requires_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }

    pub fn requires_stop_price(&self) -> bool {
        matches!(self, OrderType::Stop | OrderType::StopLimit)
    }
}

/// Order lifecycle. Terminal statuses are monotonic: once an order reaches
/// `Filled`, `Cancelled`, or `Rejected` it must never transition again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Submitted,
    Partial,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    EnterLong,
    ExitLong,
    EnterShort,
    ExitShort,
}

/// Side of an open position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1 for long, -1 for short. Used by P&L sign conventions throughout.
    pub fn sign(&self) -> i32 {
        match self {
            PositionSide::Long => 1,
            PositionSide::Short => -1,
        }
    }
}
