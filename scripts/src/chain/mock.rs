//! An in-memory chain used to test the pipeline

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
};

use alloy_primitives::{address, keccak256, Address, Bytes, TxHash, B256, U256};
use eyre::{eyre, Result};

use super::{DeployRequest, Ledger, Registry, WrapperInfo, WrapperSource};
use crate::{
    artifacts::Artifacts,
    constants::{
        CFA_AGREEMENT_TYPE, DEFAULT_SDK_VERSION, HOST_REGISTRY_PREFIX, REDIRECT_ALL_CONTRACT,
        TRADEABLE_CASHFLOW_CONTRACT,
    },
    context::RunContext,
    network,
    utils::{AbortSignal, RetryPolicy},
};

/// The sender of the mock chain's transactions
pub const MOCK_SENDER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
/// The framework host of the mock chain
pub const MOCK_HOST: Address = address!("1111111111111111111111111111111111111111");
/// The constant flow agreement of the mock chain
pub const MOCK_CFA: Address = address!("2222222222222222222222222222222222222222");
/// The `fDAI` test token of the mock chain
pub const MOCK_DAI: Address = address!("3333333333333333333333333333333333333333");
/// The `fDAIx` wrapper of the mock chain
pub const MOCK_DAIX: Address = address!("4444444444444444444444444444444444444444");

/// A call made against the mock chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// A registry lookup
    ResolveName(String),
    /// An agreement class lookup
    AgreementClass(Address, B256),
    /// A token symbol read
    TokenSymbol(Address),
    /// A wrapper lookup
    Erc20Wrapper(Address, Address, String),
    /// A contract deployment
    Deploy(DeployRequest),
    /// A test token mint
    Mint(Address, Address, U256),
    /// An allowance approval
    Approve(Address, Address, U256),
    /// An upgrade into a wrapper
    Upgrade(Address, U256),
    /// A token transfer
    Transfer(Address, Address, U256),
}

impl MockCall {
    /// Whether the call commits an on-chain effect
    pub fn is_transaction(&self) -> bool {
        !matches!(
            self,
            MockCall::ResolveName(_)
                | MockCall::AgreementClass(..)
                | MockCall::TokenSymbol(_)
                | MockCall::Erc20Wrapper(..)
        )
    }
}

/// An in-memory chain with a pre-deployed framework
#[derive(Default)]
pub struct MockChain {
    /// The registry entries
    registry: HashMap<String, Address>,
    /// The agreement classes by agreement type
    agreements: HashMap<B256, Address>,
    /// The token symbols
    symbols: HashMap<Address, String>,
    /// The wrappers by base token
    wrappers: HashMap<Address, WrapperInfo>,
    /// The number of registry lookups that fail before lookups succeed
    registry_outages: Cell<u32>,
    /// Contracts whose deployment reverts
    failing_deployments: HashSet<String>,
    /// The index of the first transaction after deployment that reverts
    failing_setup_call: Option<usize>,
    /// A signal raised once the first deployment settles
    abort_on_deploy: Option<AbortSignal>,
    /// The calls made so far
    calls: RefCell<Vec<MockCall>>,
    /// The number of contracts created so far
    nonce: Cell<u64>,
}

impl MockChain {
    /// A chain with the framework and the `fDAI` token registered
    pub fn goerli() -> Self {
        let mut chain = Self::default();
        chain.registry.insert(
            format!("{HOST_REGISTRY_PREFIX}{DEFAULT_SDK_VERSION}"),
            MOCK_HOST,
        );
        chain.registry.insert("tokens.fDAI".to_string(), MOCK_DAI);
        chain
            .agreements
            .insert(keccak256(CFA_AGREEMENT_TYPE), MOCK_CFA);
        chain.symbols.insert(MOCK_DAI, "fDAI".to_string());
        chain.wrappers.insert(
            MOCK_DAI,
            WrapperInfo {
                address: MOCK_DAIX,
                created: true,
            },
        );
        chain
    }

    /// Remove a name from the registry
    pub fn without_registry_entry(mut self, name: &str) -> Self {
        self.registry.remove(name);
        self
    }

    /// Fail the first `n` registry lookups
    pub fn with_registry_outages(self, n: u32) -> Self {
        self.registry_outages.set(n);
        self
    }

    /// Revert every deployment of `contract`
    pub fn with_failing_deployment(mut self, contract: &str) -> Self {
        self.failing_deployments.insert(contract.to_string());
        self
    }

    /// Revert the `index`-th setup transaction
    pub fn with_failing_setup_call(mut self, index: usize) -> Self {
        self.failing_setup_call = Some(index);
        self
    }

    /// Raise `signal` while the first deployment is in flight
    pub fn with_abort_on_deploy(mut self, signal: AbortSignal) -> Self {
        self.abort_on_deploy = Some(signal);
        self
    }

    /// The calls made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    /// The deployments submitted so far
    pub fn deploy_requests(&self) -> Vec<DeployRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                MockCall::Deploy(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    /// The transactions sent after the deployments, in order
    pub fn setup_calls(&self) -> Vec<MockCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.is_transaction() && !matches!(call, MockCall::Deploy(_)))
            .cloned()
            .collect()
    }

    /// Log a call
    fn record(&self, call: MockCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Log a setup transaction, reverting it if configured to
    fn record_setup(&self, call: MockCall) -> Result<TxHash> {
        let index = self.setup_calls().len();
        self.record(call);
        if self.failing_setup_call == Some(index) {
            return Err(eyre!("execution reverted"));
        }
        Ok(keccak256(index.to_be_bytes()))
    }
}

impl Registry for MockChain {
    async fn resolve_name(&self, name: &str) -> Result<Address> {
        self.record(MockCall::ResolveName(name.to_string()));
        let outages = self.registry_outages.get();
        if outages > 0 {
            self.registry_outages.set(outages - 1);
            return Err(eyre!("connection refused"));
        }
        Ok(self.registry.get(name).copied().unwrap_or(Address::ZERO))
    }

    async fn agreement_class(&self, host: Address, agreement_type: B256) -> Result<Address> {
        self.record(MockCall::AgreementClass(host, agreement_type));
        Ok(self
            .agreements
            .get(&agreement_type)
            .copied()
            .unwrap_or(Address::ZERO))
    }
}

impl WrapperSource for MockChain {
    async fn token_symbol(&self, token: Address) -> Result<String> {
        self.record(MockCall::TokenSymbol(token));
        self.symbols
            .get(&token)
            .cloned()
            .ok_or_else(|| eyre!("execution reverted"))
    }

    async fn erc20_wrapper(
        &self,
        host: Address,
        token: Address,
        symbol: &str,
    ) -> Result<WrapperInfo> {
        self.record(MockCall::Erc20Wrapper(host, token, symbol.to_string()));
        self.wrappers
            .get(&token)
            .copied()
            .ok_or_else(|| eyre!("execution reverted"))
    }
}

impl Ledger for MockChain {
    fn sender(&self) -> Address {
        MOCK_SENDER
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<Address> {
        self.record(MockCall::Deploy(request.clone()));
        if let Some(signal) = &self.abort_on_deploy {
            signal.abort();
        }
        if self.failing_deployments.contains(&request.contract_name) {
            return Err(eyre!("execution reverted: constructor failed"));
        }

        let nonce = self.nonce.get();
        self.nonce.set(nonce + 1);
        Ok(MOCK_SENDER.create(nonce))
    }

    async fn mint(&self, token: Address, recipient: Address, amount: U256) -> Result<TxHash> {
        self.record_setup(MockCall::Mint(token, recipient, amount))
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        self.record_setup(MockCall::Approve(token, spender, amount))
    }

    async fn upgrade(&self, wrapper: Address, amount: U256) -> Result<TxHash> {
        self.record_setup(MockCall::Upgrade(wrapper, amount))
    }

    async fn transfer(&self, token: Address, recipient: Address, amount: U256) -> Result<TxHash> {
        self.record_setup(MockCall::Transfer(token, recipient, amount))
    }
}

/// Artifacts of the application contracts with placeholder bytecode
pub fn mock_artifacts() -> Artifacts {
    Artifacts::from_bytecodes([
        (
            TRADEABLE_CASHFLOW_CONTRACT.to_string(),
            Bytes::from_static(&[0x60, 0x80, 0x01]),
        ),
        (
            REDIRECT_ALL_CONTRACT.to_string(),
            Bytes::from_static(&[0x60, 0x80, 0x02]),
        ),
    ])
}

/// A goerli run context for the mock chain
pub fn mock_context() -> RunContext {
    let network = network::resolve_config("goerli", DEFAULT_SDK_VERSION, None)
        .expect("goerli is a known network");
    RunContext::new(network, MOCK_SENDER, RetryPolicy::default(), AbortSignal::default())
}
