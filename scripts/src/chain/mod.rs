//! Interfaces to the external services the deployment runs against.
//!
//! The pipeline is generic over these traits; [`rpc::RpcChain`] implements them
//! against a JSON-RPC endpoint.
#![allow(async_fn_in_trait)]

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use eyre::Result;

use crate::types::ConstructorValue;

pub mod rpc;

#[cfg(test)]
pub(crate) mod mock;

/// The name-to-address registry of the framework
pub trait Registry {
    /// Look up the address registered under `name`.
    ///
    /// Returns the zero address if nothing is registered under `name`.
    async fn resolve_name(&self, name: &str) -> Result<Address>;

    /// Look up the agreement class registered with the framework host
    async fn agreement_class(&self, host: Address, agreement_type: B256) -> Result<Address>;
}

/// The wrapper of a base token, as reported by the framework host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperInfo {
    /// The address of the wrapper
    pub address: Address,
    /// Whether the wrapper contract is already created
    pub created: bool,
}

/// The wrapper-resolution routine of the framework
pub trait WrapperSource {
    /// Read the ERC20 symbol of a token
    async fn token_symbol(&self, token: Address) -> Result<String>;

    /// Look up the wrapper of `token` with the given wrapper symbol
    async fn erc20_wrapper(&self, host: Address, token: Address, symbol: &str)
        -> Result<WrapperInfo>;
}

/// A contract creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// The name of the contract being deployed
    pub contract_name: String,
    /// The creation bytecode of the contract
    pub bytecode: Bytes,
    /// The resolved constructor arguments
    pub args: Vec<ConstructorValue>,
}

impl DeployRequest {
    /// The creation bytecode followed by the ABI-encoded constructor arguments
    pub fn init_code(&self) -> Bytes {
        let args = DynSolValue::Tuple(self.args.iter().map(DynSolValue::from).collect());
        let mut code = self.bytecode.to_vec();
        code.extend(args.abi_encode_params());
        code.into()
    }
}

/// The transaction submission interface, signing as [`Ledger::sender`]
pub trait Ledger {
    /// The address every transaction is sent from
    fn sender(&self) -> Address;

    /// Deploy a contract, returning its address once the creation is confirmed
    async fn deploy(&self, request: &DeployRequest) -> Result<Address>;

    /// Mint test tokens to `recipient`
    async fn mint(&self, token: Address, recipient: Address, amount: U256) -> Result<TxHash>;

    /// Approve `spender` to move `amount` of the sender's tokens
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash>;

    /// Upgrade `amount` of the underlying token into the wrapper
    async fn upgrade(&self, wrapper: Address, amount: U256) -> Result<TxHash>;

    /// Transfer `amount` of the sender's tokens to `recipient`
    async fn transfer(&self, token: Address, recipient: Address, amount: U256) -> Result<TxHash>;
}

/// Everything a deployment run needs from the chain
pub trait Chain: Registry + WrapperSource + Ledger {}

impl<T: Registry + WrapperSource + Ledger> Chain for T {}
