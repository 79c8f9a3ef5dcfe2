//! The explicit context passed to every stage of a run

use alloy_primitives::Address;

use crate::{
    errors::ScriptError,
    network::NetworkConfig,
    utils::{AbortSignal, RetryPolicy},
};

/// The context of a single deployment run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// The network selected for the run
    pub network: NetworkConfig,
    /// The sender of every state-mutating call
    pub sender: Address,
    /// The retry policy of read-only external calls
    pub retry: RetryPolicy,
    /// The operator's abort flag
    pub abort: AbortSignal,
}

impl RunContext {
    /// Create a new run context
    pub fn new(
        network: NetworkConfig,
        sender: Address,
        retry: RetryPolicy,
        abort: AbortSignal,
    ) -> Self {
        Self {
            network,
            sender,
            retry,
            abort,
        }
    }

    /// Fail if the operator aborted the run; checked before every external call
    pub fn ensure_not_aborted(&self) -> Result<(), ScriptError> {
        if self.abort.is_aborted() {
            return Err(ScriptError::Aborted);
        }
        Ok(())
    }
}
