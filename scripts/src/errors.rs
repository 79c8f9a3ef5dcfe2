//! Definitions of errors that can occur during the execution of the deployment scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deployment scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The requested network is not one of the supported networks
    UnknownNetwork(String),
    /// A name could not be resolved through the registry
    RegistryLookup {
        /// The logical name that was looked up
        name: String,
        /// The underlying failure
        cause: String,
    },
    /// The wrapper of a base token could not be resolved
    WrapperResolution {
        /// The logical name of the base token
        token: String,
        /// The underlying failure
        cause: String,
    },
    /// A contract deployment failed
    Deployment {
        /// The name of the contract being deployed
        contract: String,
        /// The underlying failure
        cause: String,
    },
    /// A post-deployment setup step failed
    SetupStep {
        /// The zero-based index of the failed step
        index: usize,
        /// The underlying failure
        cause: String,
    },
    /// A deployment references an address that is not available at its position
    /// in the sequence
    DeploymentOrder {
        /// The contract whose arguments could not be satisfied
        contract: String,
        /// The unsatisfied reference
        reference: String,
    },
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// The RPC endpoint serves a different chain than the selected network
    ChainMismatch {
        /// The chain ID of the selected network
        expected: u64,
        /// The chain ID reported by the RPC endpoint
        actual: u64,
    },
    /// Error parsing a compilation artifact
    ArtifactParsing(String),
    /// The run configuration is incomplete or inconsistent
    InvalidArgument(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// The run was aborted by the operator
    Aborted,
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownNetwork(name) => write!(f, "unknown network: {}", name),
            ScriptError::RegistryLookup { name, cause } => {
                write!(f, "error resolving `{}` from registry: {}", name, cause)
            }
            ScriptError::WrapperResolution { token, cause } => {
                write!(f, "error resolving wrapper of `{}`: {}", token, cause)
            }
            ScriptError::Deployment { contract, cause } => {
                write!(f, "error deploying `{}`: {}", contract, cause)
            }
            ScriptError::SetupStep { index, cause } => {
                write!(f, "error executing setup step {}: {}", index, cause)
            }
            ScriptError::DeploymentOrder {
                contract,
                reference,
            } => write!(
                f,
                "`{}` references `{}`, which is not available before it is deployed",
                contract, reference
            ),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ChainMismatch { expected, actual } => write!(
                f,
                "RPC endpoint serves chain {} but the selected network is chain {}",
                actual, expected
            ),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::InvalidArgument(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::Aborted => write!(f, "run aborted by operator"),
        }
    }
}

impl Error for ScriptError {}
