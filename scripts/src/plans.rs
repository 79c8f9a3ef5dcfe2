//! The deployment plans of the application contracts

use alloy_primitives::{Address, U256};

use crate::{
    constants::{
        CFA_KEY, HOST_KEY, REDIRECT_ALL_CONTRACT, TOKEN_REGISTRY_PREFIX,
        TRADEABLE_CASHFLOW_CONTRACT, WRAPPER_SYMBOL_SUFFIX,
    },
    pipeline::{DeploymentPlan, WrapperRequest},
    setup::SetupStep,
    types::{AddressRef, ConstructorArg, DeploymentSpec},
};

/// The registry name of a test token
pub fn token_registry_name(symbol: &str) -> String {
    format!("{TOKEN_REGISTRY_PREFIX}{symbol}")
}

/// The logical name the wrapper of a base token is recorded under
pub fn wrapper_alias(symbol: &str) -> String {
    format!("{symbol}{WRAPPER_SYMBOL_SUFFIX}")
}

/// The `TradeableCashflow(owner, name, symbol, host, cfa, wrapper)` deployment
pub fn tradeable_cashflow_spec(
    owner: Address,
    name: &str,
    symbol: &str,
    base_symbol: &str,
) -> DeploymentSpec {
    DeploymentSpec::new(
        TRADEABLE_CASHFLOW_CONTRACT,
        vec![
            ConstructorArg::Address(AddressRef::Literal(owner)),
            ConstructorArg::string(name),
            ConstructorArg::string(symbol),
            ConstructorArg::Address(AddressRef::resolved(HOST_KEY)),
            ConstructorArg::Address(AddressRef::resolved(CFA_KEY)),
            ConstructorArg::Address(AddressRef::resolved(wrapper_alias(base_symbol))),
        ],
    )
}

/// The `RedirectAll(host, cfa, wrapper, owner)` deployment
pub fn redirect_all_spec(owner: Address, base_symbol: &str) -> DeploymentSpec {
    DeploymentSpec::new(
        REDIRECT_ALL_CONTRACT,
        vec![
            ConstructorArg::Address(AddressRef::resolved(HOST_KEY)),
            ConstructorArg::Address(AddressRef::resolved(CFA_KEY)),
            ConstructorArg::Address(AddressRef::resolved(wrapper_alias(base_symbol))),
            ConstructorArg::Address(AddressRef::Literal(owner)),
        ],
    )
}

/// Fund the deployed `TradeableCashflow` with wrapped tokens: mint base tokens
/// to the sender, approve the wrapper, upgrade, then transfer the wrapped tokens
pub fn funding_steps(base_symbol: &str, mint_amount: U256, wrap_amount: U256) -> Vec<SetupStep> {
    let base = AddressRef::resolved(token_registry_name(base_symbol));
    let wrapper = AddressRef::resolved(wrapper_alias(base_symbol));

    vec![
        SetupStep::Mint {
            token: base.clone(),
            recipient: AddressRef::Sender,
            amount: mint_amount,
        },
        SetupStep::Approve {
            token: base,
            spender: wrapper.clone(),
            amount: U256::MAX,
        },
        SetupStep::Upgrade {
            wrapper: wrapper.clone(),
            amount: wrap_amount,
        },
        SetupStep::Transfer {
            token: wrapper,
            recipient: AddressRef::deployed(TRADEABLE_CASHFLOW_CONTRACT),
            amount: wrap_amount,
        },
    ]
}

/// A plan resolving the base token and its wrapper for `deployments`
fn plan_for(base_symbol: &str, deployments: Vec<DeploymentSpec>) -> DeploymentPlan {
    let base = token_registry_name(base_symbol);
    DeploymentPlan {
        lookups: vec![base.clone()],
        wrappers: vec![WrapperRequest {
            base,
            alias: wrapper_alias(base_symbol),
        }],
        deployments,
        setup: vec![],
    }
}

/// The parameters of the `TradeableCashflow` deployment and its funding
#[derive(Debug, Clone)]
pub struct CashflowParams {
    /// The owner of the NFT
    pub owner: Address,
    /// The name of the NFT
    pub name: String,
    /// The symbol of the NFT
    pub symbol: String,
    /// The symbol of the base token
    pub base_symbol: String,
    /// Whether to fund the deployed contract
    pub setup: bool,
    /// The amount of base token minted during setup
    pub mint_amount: U256,
    /// The amount of base token wrapped and transferred during setup
    pub wrap_amount: U256,
}

impl CashflowParams {
    /// The setup steps of the deployment, if enabled
    fn setup_steps(&self) -> Vec<SetupStep> {
        if !self.setup {
            return vec![];
        }
        funding_steps(&self.base_symbol, self.mint_amount, self.wrap_amount)
    }
}

/// Deploy `TradeableCashflow`, optionally funding it
pub fn tradeable_cashflow_plan(params: &CashflowParams) -> DeploymentPlan {
    let spec = tradeable_cashflow_spec(
        params.owner,
        &params.name,
        &params.symbol,
        &params.base_symbol,
    );
    DeploymentPlan {
        setup: params.setup_steps(),
        ..plan_for(&params.base_symbol, vec![spec])
    }
}

/// Deploy `RedirectAll`
pub fn redirect_all_plan(owner: Address, base_symbol: &str) -> DeploymentPlan {
    plan_for(base_symbol, vec![redirect_all_spec(owner, base_symbol)])
}

/// Deploy `TradeableCashflow` then `RedirectAll`, optionally funding the former
pub fn deploy_all_plan(params: &CashflowParams) -> DeploymentPlan {
    let specs = vec![
        tradeable_cashflow_spec(
            params.owner,
            &params.name,
            &params.symbol,
            &params.base_symbol,
        ),
        redirect_all_spec(params.owner, &params.base_symbol),
    ];
    DeploymentPlan {
        setup: params.setup_steps(),
        ..plan_for(&params.base_symbol, specs)
    }
}
