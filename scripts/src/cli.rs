//! Definitions of CLI arguments and commands for deploy scripts

use std::{path::PathBuf, time::Duration};

use alloy_primitives::{Address, U256};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use crate::{
    commands::run_deployment,
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_BASE_TOKEN_SYMBOL, DEFAULT_CASHFLOW_NAME,
        DEFAULT_CASHFLOW_SYMBOL, DEFAULT_MINT_AMOUNT, DEFAULT_OWNER, DEFAULT_RETRY_BACKOFF_MS,
        DEFAULT_SDK_VERSION, DEFAULT_WRAP_AMOUNT,
    },
    pipeline::{DeploymentPlan, PipelineFailure, RunReport},
    plans::{deploy_all_plan, redirect_all_plan, tradeable_cashflow_plan, CashflowParams},
    utils::{parse_amount, AbortSignal, RetryPolicy},
};

/// Deploy the streamable cashflow contracts against a Superfluid deployment
#[derive(Parser)]
#[command(version)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub opts: RunOptions,

    /// The deployment to run
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Args, Clone)]
pub struct RunOptions {
    /// Name of the network to deploy to, `live` or `goerli`
    #[arg(short, long, env = "NETWORK", default_value = "goerli")]
    pub network: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = "http://localhost:8545")]
    pub rpc_url: String,

    /// Private key of the deployer
    #[arg(short, long, env = "PKEY", hide_env_values = true)]
    pub priv_key: String,

    /// Version tag of the Superfluid framework to resolve
    #[arg(long, default_value = DEFAULT_SDK_VERSION)]
    pub sdk_version: String,

    /// Address of the framework resolver, overriding the network's default
    #[arg(long)]
    pub resolver: Option<Address>,

    /// Directory holding the compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Path of the file deployed addresses are recorded in,
    /// `deployments.<network>.json` by default
    #[arg(short, long)]
    pub deployments: Option<PathBuf>,

    /// Number of times a failed read-only call is retried
    #[arg(long, default_value_t = 0)]
    pub read_retries: u32,

    /// Delay between retries of a read-only call, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,

    /// Maximum level of the emitted logs
    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl RunOptions {
    /// The retry policy of read-only calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.read_retries,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }

    /// The path of the deployments file
    pub fn deployments_path(&self) -> PathBuf {
        self.deployments
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("deployments.{}.json", self.network)))
    }
}

/// The deployments the scripts can run
#[derive(Subcommand)]
pub enum Command {
    /// Deploy `TradeableCashflow`
    DeployTradeableCashflow(TradeableCashflowArgs),
    /// Deploy `RedirectAll`
    DeployRedirectAll(RedirectAllArgs),
    /// Deploy `TradeableCashflow` then `RedirectAll`
    DeployAll(TradeableCashflowArgs),
}

impl Command {
    /// The plan of the command
    pub fn plan(&self) -> DeploymentPlan {
        match self {
            Command::DeployTradeableCashflow(args) => tradeable_cashflow_plan(&args.params()),
            Command::DeployRedirectAll(args) => {
                redirect_all_plan(args.token.owner, &args.token.token)
            }
            Command::DeployAll(args) => deploy_all_plan(&args.params()),
        }
    }

    /// Run the command to completion, or to the first failure
    pub async fn run(
        self,
        opts: &RunOptions,
        abort: AbortSignal,
    ) -> Result<RunReport, PipelineFailure> {
        run_deployment(opts, &self.plan(), abort).await
    }
}

/// Arguments shared by the application contract deployments
#[derive(Args)]
pub struct TokenArgs {
    /// Address of the owner of the deployed contracts
    #[arg(short, long, default_value_t = DEFAULT_OWNER)]
    pub owner: Address,

    /// Symbol of the registered base token; its wrapper is the streamed token
    #[arg(short, long, default_value = DEFAULT_BASE_TOKEN_SYMBOL)]
    pub token: String,
}

/// Deploy the `TradeableCashflow` NFT
#[derive(Args)]
pub struct TradeableCashflowArgs {
    /// Owner and base token
    #[command(flatten)]
    pub token: TokenArgs,

    /// Name of the NFT
    #[arg(long, default_value = DEFAULT_CASHFLOW_NAME)]
    pub name: String,

    /// Symbol of the NFT
    #[arg(long, default_value = DEFAULT_CASHFLOW_SYMBOL)]
    pub symbol: String,

    /// Fund the deployed contract with wrapped tokens after deployment
    #[arg(long)]
    pub setup: bool,

    /// Amount of base token minted during setup, in whole tokens
    #[arg(long, default_value = DEFAULT_MINT_AMOUNT, value_parser = parse_amount)]
    pub mint_amount: U256,

    /// Amount of base token wrapped and transferred during setup, in whole tokens
    #[arg(long, default_value = DEFAULT_WRAP_AMOUNT, value_parser = parse_amount)]
    pub wrap_amount: U256,
}

impl TradeableCashflowArgs {
    /// The parameters of the deployment
    fn params(&self) -> CashflowParams {
        CashflowParams {
            owner: self.token.owner,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            base_symbol: self.token.token.clone(),
            setup: self.setup,
            mint_amount: self.mint_amount,
            wrap_amount: self.wrap_amount,
        }
    }
}

/// Deploy the `RedirectAll` stream redirector
#[derive(Args)]
pub struct RedirectAllArgs {
    /// Owner and base token
    #[command(flatten)]
    pub token: TokenArgs,
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use clap::Parser;

    use super::{Cli, Command};
    use crate::{constants::DEFAULT_OWNER, setup::SetupStep};

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from([
            "cashflow-deploy",
            "--priv-key",
            "0x01",
            "deploy-tradeable-cashflow",
        ])
        .unwrap();

        assert_eq!(cli.opts.network, "goerli");
        assert_eq!(cli.opts.retry_policy().max_retries, 0);
        assert_eq!(
            cli.opts.deployments_path().to_str(),
            Some("deployments.goerli.json")
        );

        let Command::DeployTradeableCashflow(args) = &cli.command else {
            panic!("unexpected command");
        };
        assert_eq!(args.token.owner, DEFAULT_OWNER);
        assert_eq!(args.token.token, "fDAI");
        assert_eq!(
            args.mint_amount,
            U256::from(100) * U256::from(10).pow(U256::from(18))
        );
        assert!(cli.command.plan().setup.is_empty());
    }

    #[test]
    fn test_setup_flag() {
        let cli = Cli::try_parse_from([
            "cashflow-deploy",
            "--priv-key",
            "0x01",
            "deploy-all",
            "--setup",
            "--wrap-amount",
            "1.5",
        ])
        .unwrap();

        let plan = cli.command.plan();
        assert_eq!(plan.deployments.len(), 2);
        assert_eq!(plan.setup.len(), 4);
        assert!(matches!(
            plan.setup[2],
            SetupStep::Upgrade { amount, .. }
                if amount == U256::from(15) * U256::from(10).pow(U256::from(17))
        ));
    }

    #[test]
    fn test_invalid_owner_is_rejected() {
        let res = Cli::try_parse_from([
            "cashflow-deploy",
            "--priv-key",
            "0x01",
            "deploy-redirect-all",
            "--owner",
            "0x1234",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let res = Cli::try_parse_from([
            "cashflow-deploy",
            "--priv-key",
            "0x01",
            "deploy-tradeable-cashflow",
            "--setup",
            "--wrap-amount=-70",
        ]);
        assert!(res.is_err());
    }
}
