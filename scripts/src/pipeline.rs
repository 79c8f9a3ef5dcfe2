//! The deployment pipeline: address resolution, ordered deployment and
//! post-deployment setup, run strictly one stage after the other.
//!
//! A run moves through
//! `INIT -> NETWORK_RESOLVED -> ADDRESSES_RESOLVED -> DEPLOYED -> SETUP_COMPLETE`,
//! and into `FAILED` from any non-terminal state. Nothing is rolled back on
//! failure; the failure lists the on-chain effects committed so far instead.

use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
};

use alloy_primitives::TxHash;
use itertools::Itertools;
use tracing::{error, info};

use crate::{
    artifacts::Artifacts,
    chain::Chain,
    constants::HOST_KEY,
    context::RunContext,
    errors::ScriptError,
    registry, sequencer,
    setup::{self, SetupStep},
    types::{AddressBook, DeployedContract, DeploymentSpec, ResolvedAddress},
    utils::write_deployed_address,
    wrapper,
};

// ---------
// | State |
// ---------

/// The state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has happened yet
    Init,
    /// The network is selected and the chain is reachable
    NetworkResolved,
    /// Every address the deployments reference is resolved
    AddressesResolved,
    /// Every contract is deployed
    Deployed,
    /// Every setup step is executed
    SetupComplete,
    /// The run stopped on an error
    Failed,
}

impl RunState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::SetupComplete | RunState::Failed)
    }

    /// The stage that moves the run out of this state
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            RunState::Init => Some(Stage::Initialization),
            RunState::NetworkResolved => Some(Stage::AddressResolution),
            RunState::AddressesResolved => Some(Stage::Deployment),
            RunState::Deployed => Some(Stage::Setup),
            RunState::SetupComplete | RunState::Failed => None,
        }
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Init => "INIT",
            RunState::NetworkResolved => "NETWORK_RESOLVED",
            RunState::AddressesResolved => "ADDRESSES_RESOLVED",
            RunState::Deployed => "DEPLOYED",
            RunState::SetupComplete => "SETUP_COMPLETE",
            RunState::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// A stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Network selection, client connection and artifact loading
    Initialization,
    /// Registry lookups and wrapper resolution
    AddressResolution,
    /// Contract deployments
    Deployment,
    /// Post-deployment setup calls
    Setup,
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Initialization => "initialization",
            Stage::AddressResolution => "address resolution",
            Stage::Deployment => "deployment",
            Stage::Setup => "setup",
        };
        write!(f, "{s}")
    }
}

// ---------
// | Plans |
// ---------

/// A wrapper to resolve for a base token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperRequest {
    /// The logical name of the resolved base token
    pub base: String,
    /// The logical name to record the wrapper under
    pub alias: String,
}

/// Everything a run resolves, deploys and sets up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentPlan {
    /// Names to resolve through the registry, in order
    pub lookups: Vec<String>,
    /// Wrappers to resolve once the lookups are done
    pub wrappers: Vec<WrapperRequest>,
    /// Contracts to deploy, in order
    pub deployments: Vec<DeploymentSpec>,
    /// Setup steps to execute after the deployments, in order
    pub setup: Vec<SetupStep>,
}

impl DeploymentPlan {
    /// The names of the contracts the plan deploys
    pub fn contract_names(&self) -> impl Iterator<Item = &str> {
        self.deployments
            .iter()
            .map(|spec| spec.contract_name.as_str())
            .unique()
    }
}

// -----------
// | Reports |
// -----------

/// An irreversible effect committed on-chain during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnChainEffect {
    /// A contract was deployed
    Deployed(DeployedContract),
    /// A setup step was executed
    SetupStep {
        /// The index of the step
        index: usize,
        /// A description of the step
        description: String,
        /// The hash of the step's transaction
        tx_hash: TxHash,
    },
}

impl Display for OnChainEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnChainEffect::Deployed(contract) => write!(
                f,
                "deployed `{}` at {:#x}",
                contract.contract_name, contract.address
            ),
            OnChainEffect::SetupStep {
                index,
                description,
                tx_hash,
            } => write!(f, "setup step {index} ({description}) in tx {tx_hash:#x}"),
        }
    }
}

/// The outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The final state of the run
    pub state: RunState,
    /// The name of the network the run targeted
    pub network: String,
    /// The addresses resolved during the run
    pub resolved: Vec<ResolvedAddress>,
    /// The contracts deployed during the run
    pub deployed: Vec<DeployedContract>,
    /// The on-chain effects of the run, in commit order
    pub effects: Vec<OnChainEffect>,
}

impl Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run on {} reached {}", self.network, self.state)?;
        for r in &self.resolved {
            writeln!(f, "  {} = {:#x}", r.logical_name, r.address)?;
        }
        for effect in &self.effects {
            writeln!(f, "  {effect}")?;
        }
        Ok(())
    }
}

/// The outcome of a failed run
#[derive(Debug, Clone)]
pub struct PipelineFailure {
    /// The stage that failed
    pub stage: Stage,
    /// The error the stage failed with
    pub error: ScriptError,
    /// The on-chain effects committed before the failure, in commit order
    pub effects: Vec<OnChainEffect>,
}

impl PipelineFailure {
    /// A failure that happened before anything was committed on-chain
    pub fn before_effects(stage: Stage, error: ScriptError) -> Self {
        Self {
            stage,
            error,
            effects: vec![],
        }
    }

    /// Whether some effects were committed and need manual reconciliation
    pub fn has_partial_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

impl Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run failed during {}: {}", self.stage, self.error)?;
        if !self.has_partial_effects() {
            return write!(f, "no on-chain effects were committed");
        }

        writeln!(
            f,
            "{} on-chain effect(s) were committed before the failure and must be reconciled manually:",
            self.effects.len()
        )?;
        write!(
            f,
            "{}",
            self.effects.iter().map(|e| format!("  - {e}")).join("\n")
        )
    }
}

impl Error for PipelineFailure {}

// ------------
// | Pipeline |
// ------------

/// A single run of a deployment plan against a chain
pub struct Pipeline<'a, C> {
    /// The context of the run
    ctx: &'a RunContext,
    /// The chain the run executes against
    chain: &'a C,
    /// The bytecode of the contracts to deploy
    artifacts: &'a Artifacts,
    /// Where to record deployed addresses, if anywhere
    deployments_path: Option<PathBuf>,
    /// The current state of the run
    state: RunState,
    /// The addresses accumulated so far
    book: AddressBook,
    /// The on-chain effects committed so far
    effects: Vec<OnChainEffect>,
}

impl<'a, C: Chain> Pipeline<'a, C> {
    /// Create a pipeline for a context whose network is already resolved.
    ///
    /// The pipeline starts in `INIT` and enters `NETWORK_RESOLVED` when run.
    pub fn new(ctx: &'a RunContext, chain: &'a C, artifacts: &'a Artifacts) -> Self {
        Self {
            ctx,
            chain,
            artifacts,
            deployments_path: None,
            state: RunState::Init,
            book: AddressBook::new(ctx.sender),
            effects: vec![],
        }
    }

    /// Record every deployed address in the deployments file at `path`
    pub fn with_deployments_file(mut self, path: Option<PathBuf>) -> Self {
        self.deployments_path = path;
        self
    }

    /// The current state of the run
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the plan to completion, or to the first failure
    pub async fn run(mut self, plan: &DeploymentPlan) -> Result<RunReport, PipelineFailure> {
        info!("starting run on {}", self.ctx.network.name());
        match self.execute(plan).await {
            Ok(()) => Ok(RunReport {
                state: self.state,
                network: self.ctx.network.name().to_string(),
                resolved: self.book.resolved_addresses().to_vec(),
                deployed: self.book.deployed_contracts().to_vec(),
                effects: self.effects,
            }),
            Err(err) => {
                let stage = self.state.next_stage().unwrap_or(Stage::Setup);
                error!("{stage} failed: {err}");
                self.transition(RunState::Failed);
                Err(PipelineFailure {
                    stage,
                    error: err,
                    effects: self.effects,
                })
            }
        }
    }

    /// Run every stage in order
    async fn execute(&mut self, plan: &DeploymentPlan) -> Result<(), ScriptError> {
        self.transition(RunState::NetworkResolved);

        self.resolve_addresses(plan).await?;
        self.transition(RunState::AddressesResolved);

        sequencer::validate_order(&plan.deployments, &self.book)?;
        setup::validate_steps(&plan.setup, &plan.deployments, &self.book)?;
        self.deploy(&plan.deployments).await?;
        self.transition(RunState::Deployed);

        self.setup(&plan.setup).await?;
        self.transition(RunState::SetupComplete);
        Ok(())
    }

    /// Move the run into `next`
    fn transition(&mut self, next: RunState) {
        info!("{} -> {}", self.state, next);
        self.state = next;
    }

    /// Resolve the framework, the registry lookups and the wrappers of the plan
    async fn resolve_addresses(&mut self, plan: &DeploymentPlan) -> Result<(), ScriptError> {
        for resolved in registry::lookup_framework(self.ctx, self.chain).await? {
            self.book.insert_resolved(resolved.logical_name, resolved.address);
        }

        for name in &plan.lookups {
            let resolved = registry::lookup(self.ctx, self.chain, name).await?;
            self.book.insert_resolved(resolved.logical_name, resolved.address);
        }

        let host = self.book.resolved(HOST_KEY).ok_or_else(|| ScriptError::RegistryLookup {
            name: HOST_KEY.to_string(),
            cause: "framework host is not resolved".to_string(),
        })?;
        for req in &plan.wrappers {
            let token = self.book.resolved(&req.base).ok_or_else(|| {
                ScriptError::WrapperResolution {
                    token: req.base.clone(),
                    cause: "base token is not resolved".to_string(),
                }
            })?;
            let resolved =
                wrapper::locate_wrapper(self.ctx, self.chain, host, &req.base, token, &req.alias)
                    .await?;
            self.book.insert_resolved(resolved.logical_name, resolved.address);
        }

        Ok(())
    }

    /// Deploy the contracts in order, recording each one as it is confirmed
    async fn deploy(&mut self, specs: &[DeploymentSpec]) -> Result<(), ScriptError> {
        for spec in specs {
            let deployed =
                sequencer::deploy(self.ctx, self.chain, self.artifacts, &self.book, spec).await?;
            self.book.insert_deployed(deployed.clone());
            self.effects.push(OnChainEffect::Deployed(deployed.clone()));

            if let Some(path) = &self.deployments_path {
                write_deployed_address(path, &deployed.contract_name, deployed.address)?;
            }
        }

        Ok(())
    }

    /// Execute the setup steps in order
    async fn setup(&mut self, steps: &[SetupStep]) -> Result<(), ScriptError> {
        for (index, step) in steps.iter().enumerate() {
            let tx_hash = setup::execute_step(self.ctx, self.chain, &self.book, index, step).await?;
            self.effects.push(OnChainEffect::SetupStep {
                index,
                description: step.to_string(),
                tx_hash,
            });
        }

        Ok(())
    }
}
