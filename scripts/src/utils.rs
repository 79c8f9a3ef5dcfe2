//! Utilities for the deploy scripts.

use std::{
    fs,
    future::Future,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy_primitives::{Address, U256};
use eyre::Result;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    constants::{DEFAULT_RETRY_BACKOFF_MS, DEPLOYMENTS_KEY, TOKEN_DECIMALS},
    errors::ScriptError,
};

/// How often a failed read-only external call is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The number of retries after the first attempt
    pub max_retries: u32,
    /// The delay between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Create a policy retrying up to `max_retries` times
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Run `call` until it succeeds or the retries are exhausted,
    /// returning the last error in the latter case
    pub async fn run<T, F, Fut>(&self, what: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(res) => return Ok(res),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "{what} failed ({e}), retrying ({attempt}/{})",
                        self.max_retries
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// A flag through which the operator aborts a run.
///
/// The flag is only observed between external calls, so an in-flight call
/// always settles before the run stops.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    /// Request that the run stops before its next external call
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether an abort has been requested
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Parse a decimal token amount, in whole tokens, into its base unit value.
///
/// Negative amounts are rejected.
pub fn parse_amount(amount: &str) -> Result<U256, String> {
    match parse_units(amount, TOKEN_DECIMALS).map_err(|e| e.to_string())? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => Err(format!("amount must be non-negative, got `{amount}`")),
    }
}

/// Record the address of a deployed contract in the deployments file,
/// replacing any earlier record for the same contract
pub fn write_deployed_address(
    file_path: &Path,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut parsed_json: Value = if file_path.exists() {
        let contents = fs::read_to_string(file_path)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?
    } else {
        Value::Object(Map::new())
    };

    let root = parsed_json.as_object_mut().ok_or_else(|| {
        ScriptError::WriteDeployments("deployments file is not a JSON object".to_string())
    })?;
    let deployments = root
        .entry(DEPLOYMENTS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            ScriptError::WriteDeployments(format!("`{DEPLOYMENTS_KEY}` is not a JSON object"))
        })?;
    deployments.insert(
        contract_key.to_string(),
        Value::String(format!("{address:#x}")),
    );

    let contents = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}
