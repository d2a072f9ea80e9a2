use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::Market;

/// Immutable OHLCV candle.
///
/// Invariants: `low <= open, close <= high`, `low <= high`, `volume >= 0`.
/// Only bars with `is_closed = true` are persisted and fed to the bar engine —
/// this is the anti-lookahead boundary at the data layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub market: Market,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub quote_volume: Option<Decimal>,
    pub trade_count: Option<u64>,
    pub interval: String,
    pub is_closed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BarValidationError {
    LowAboveOpen,
    LowAboveClose,
    LowAboveHigh,
    NegativeVolume,
}

impl std::fmt::Display for BarValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BarValidationError::LowAboveOpen => write!(f, "bar.low must be <= bar.open"),
            BarValidationError::LowAboveClose => write!(f, "bar.low must be <= bar.close"),
            BarValidationError::LowAboveHigh => write!(f, "bar.low must be <= bar.high"),
            BarValidationError::NegativeVolume => write!(f, "bar.volume must be >= 0"),
        }
    }
}

impl std::error::Error for BarValidationError {}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market: Market,
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        interval: impl Into<String>,
    ) -> Result<Self, BarValidationError> {
        let bar = Self {
            market,
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            quote_volume: None,
            trade_count: None,
            interval: interval.into(),
            is_closed: true,
        };
        bar.validate()?;
        Ok(bar)
    }

    pub fn validate(&self) -> Result<(), BarValidationError> {
        if self.low > self.open {
            return Err(BarValidationError::LowAboveOpen);
        }
        if self.low > self.close {
            return Err(BarValidationError::LowAboveClose);
        }
        if self.low > self.high {
            return Err(BarValidationError::LowAboveHigh);
        }
        if self.volume < Decimal::ZERO {
            return Err(BarValidationError::NegativeVolume);
        }
        Ok(())
    }
}
