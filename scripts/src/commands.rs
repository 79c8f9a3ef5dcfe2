//! Implementations of the deploy scripts

use tracing::{error, info};

use crate::{
    artifacts::Artifacts,
    chain::{rpc::RpcChain, Ledger},
    cli::RunOptions,
    context::RunContext,
    errors::ScriptError,
    network::{self, NetworkConfig},
    pipeline::{DeploymentPlan, Pipeline, PipelineFailure, RunReport, RunState, Stage},
    utils::AbortSignal,
};

/// Select the network of the run, failing if no resolver is known for it
fn network_config(opts: &RunOptions) -> Result<NetworkConfig, ScriptError> {
    let network = network::resolve_config(&opts.network, &opts.sdk_version, opts.resolver)?;
    if network.resolver.is_none() {
        return Err(ScriptError::InvalidArgument(format!(
            "no framework resolver is known for `{}`, pass one with `--resolver`",
            network.name()
        )));
    }

    Ok(network)
}

/// Run a deployment plan against the network selected by `opts`
pub async fn run_deployment(
    opts: &RunOptions,
    plan: &DeploymentPlan,
    abort: AbortSignal,
) -> Result<RunReport, PipelineFailure> {
    let init_err = |e: ScriptError| {
        error!("{} -> {}: {e}", RunState::Init, RunState::Failed);
        PipelineFailure::before_effects(Stage::Initialization, e)
    };

    let network = network_config(opts).map_err(init_err)?;
    info!(
        "selected {} (chain {}) with framework {}",
        network.name(),
        network.chain_id,
        network.sdk_version
    );

    let artifacts = Artifacts::load(&opts.artifacts, plan.contract_names()).map_err(init_err)?;
    let chain = RpcChain::connect(&opts.rpc_url, &opts.priv_key, &network)
        .await
        .map_err(init_err)?;
    info!("deploying from {:#x}", chain.sender());

    let ctx = RunContext::new(network, chain.sender(), opts.retry_policy(), abort);
    Pipeline::new(&ctx, &chain, &artifacts)
        .with_deployments_file(Some(opts.deployments_path()))
        .run(plan)
        .await
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use alloy_primitives::Address;
    use tracing::Level;

    use super::{network_config, run_deployment};
    use crate::{
        cli::RunOptions,
        errors::ScriptError,
        pipeline::{DeploymentPlan, Stage},
        utils::AbortSignal,
    };

    /// Options for `network` with every other option at its default
    fn opts(network: &str) -> RunOptions {
        RunOptions {
            network: network.to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            priv_key: "0x01".to_string(),
            sdk_version: "preview-20200928".to_string(),
            resolver: None,
            artifacts: PathBuf::from("build/contracts"),
            deployments: None,
            read_retries: 0,
            retry_backoff_ms: 0,
            log_level: Level::INFO,
        }
    }

    #[test]
    fn test_mainnet_needs_a_resolver() {
        assert!(matches!(
            network_config(&opts("live")),
            Err(ScriptError::InvalidArgument(_))
        ));

        let mut opts = opts("live");
        opts.resolver = Some(Address::repeat_byte(1));
        assert_eq!(network_config(&opts).map(|n| n.chain_id), Ok(1));
    }

    #[tokio::test]
    async fn test_unknown_network_fails_before_any_effect() {
        let plan = DeploymentPlan::default();
        let failure = run_deployment(&opts("ropsten"), &plan, AbortSignal::default())
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Initialization);
        assert_eq!(
            failure.error,
            ScriptError::UnknownNetwork("ropsten".to_string())
        );
        assert!(!failure.has_partial_effects());
    }
}
