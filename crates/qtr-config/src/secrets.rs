//! Broker credential resolution. Config stores only the env var NAMEs; the
//! actual values are read from the environment once at startup and never
//! logged. `Debug` redacts both fields so a stray `tracing::debug!(?secrets)`
//! can't leak a key.

use anyhow::{bail, Result};

use qtr_domain::TradingMode;

#[derive(Clone)]
pub struct ResolvedSecrets {
    pub broker_api_key: Option<String>,
    pub broker_api_secret: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("broker_api_key", &self.broker_api_key.as_ref().map(|_| "<REDACTED>"))
            .field("broker_api_secret", &self.broker_api_secret.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve broker credentials for `mode`. `Backtest` requires nothing; `Paper`
/// and `Live` both require an api key and secret, read from
/// `QTR_BROKER_API_KEY` / `QTR_BROKER_API_SECRET`.
pub fn resolve_secrets_for_mode(mode: TradingMode) -> Result<ResolvedSecrets> {
    let broker_api_key = resolve_env("QTR_BROKER_API_KEY");
    let broker_api_secret = resolve_env("QTR_BROKER_API_SECRET");

    match mode {
        TradingMode::Backtest => {}
        TradingMode::Paper | TradingMode::Live => {
            if broker_api_key.is_none() {
                bail!("SECRETS_MISSING mode={mode:?}: required env var 'QTR_BROKER_API_KEY' is not set or empty");
            }
            if broker_api_secret.is_none() {
                bail!("SECRETS_MISSING mode={mode:?}: required env var 'QTR_BROKER_API_SECRET' is not set or empty");
            }
        }
    }

    Ok(ResolvedSecrets {
        broker_api_key,
        broker_api_secret,
    })
}
