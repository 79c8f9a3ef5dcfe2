//! Post-deployment setup calls against the resolved and deployed contracts

use std::fmt::{self, Display};

use alloy_primitives::{Address, TxHash, U256};
use tracing::info;

use crate::{
    chain::Ledger,
    context::RunContext,
    errors::ScriptError,
    types::{AddressBook, AddressRef, DeploymentSpec},
};

/// A state-mutating call made once the contracts are deployed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStep {
    /// Mint test tokens to a recipient
    Mint {
        /// The test token
        token: AddressRef,
        /// The recipient of the minted tokens
        recipient: AddressRef,
        /// The amount to mint
        amount: U256,
    },
    /// Approve a spender to move the sender's tokens
    Approve {
        /// The token
        token: AddressRef,
        /// The approved spender
        spender: AddressRef,
        /// The approved allowance
        amount: U256,
    },
    /// Upgrade the sender's base tokens into their wrapper
    Upgrade {
        /// The wrapper
        wrapper: AddressRef,
        /// The amount to upgrade
        amount: U256,
    },
    /// Transfer the sender's tokens to a recipient
    Transfer {
        /// The token
        token: AddressRef,
        /// The recipient
        recipient: AddressRef,
        /// The amount to transfer
        amount: U256,
    },
}

impl SetupStep {
    /// The address references of the step
    fn address_refs(&self) -> Vec<&AddressRef> {
        match self {
            SetupStep::Mint {
                token, recipient, ..
            } => vec![token, recipient],
            SetupStep::Approve { token, spender, .. } => vec![token, spender],
            SetupStep::Upgrade { wrapper, .. } => vec![wrapper],
            SetupStep::Transfer {
                token, recipient, ..
            } => vec![token, recipient],
        }
    }
}

impl Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStep::Mint {
                token,
                recipient,
                amount,
            } => write!(f, "mint {amount} {token} to {recipient}"),
            SetupStep::Approve {
                token,
                spender,
                amount,
            } => write!(f, "approve {spender} for {amount} {token}"),
            SetupStep::Upgrade { wrapper, amount } => write!(f, "upgrade {amount} into {wrapper}"),
            SetupStep::Transfer {
                token,
                recipient,
                amount,
            } => write!(f, "transfer {amount} {token} to {recipient}"),
        }
    }
}

/// Check that every step only references resolved addresses or contracts
/// deployed by `specs`
pub fn validate_steps(
    steps: &[SetupStep],
    specs: &[DeploymentSpec],
    book: &AddressBook,
) -> Result<(), ScriptError> {
    for (index, step) in steps.iter().enumerate() {
        for addr in step.address_refs() {
            let available = match addr {
                AddressRef::Sender | AddressRef::Literal(_) => true,
                AddressRef::Resolved(name) => book.resolved(name).is_some(),
                AddressRef::Deployed(name) => specs.iter().any(|s| &s.contract_name == name),
            };
            if !available {
                return Err(ScriptError::SetupStep {
                    index,
                    cause: format!("`{addr}` is never resolved or deployed"),
                });
            }
        }
    }

    Ok(())
}

/// Execute a single setup step, returning the hash of its transaction
pub async fn execute_step<L: Ledger>(
    ctx: &RunContext,
    ledger: &L,
    book: &AddressBook,
    index: usize,
    step: &SetupStep,
) -> Result<TxHash, ScriptError> {
    let get = |addr: &AddressRef| -> Result<Address, ScriptError> {
        book.get(addr).ok_or_else(|| ScriptError::SetupStep {
            index,
            cause: format!("`{addr}` is not available"),
        })
    };

    ctx.ensure_not_aborted()?;
    info!("setup step {index}: {step}");
    let res = match step {
        SetupStep::Mint {
            token,
            recipient,
            amount,
        } => ledger.mint(get(token)?, get(recipient)?, *amount).await,
        SetupStep::Approve {
            token,
            spender,
            amount,
        } => ledger.approve(get(token)?, get(spender)?, *amount).await,
        SetupStep::Upgrade { wrapper, amount } => ledger.upgrade(get(wrapper)?, *amount).await,
        SetupStep::Transfer {
            token,
            recipient,
            amount,
        } => ledger.transfer(get(token)?, get(recipient)?, *amount).await,
    };

    res.map_err(|e| ScriptError::SetupStep {
        index,
        cause: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use eyre::Result;

    use super::{execute_step, validate_steps, SetupStep};
    use crate::{
        chain::mock::{mock_context, MockCall, MockChain, MOCK_DAI, MOCK_SENDER},
        errors::ScriptError,
        types::{AddressBook, AddressRef, DeploymentSpec},
    };

    /// A mint of the resolved `fDAI` token to the sender
    fn mint() -> SetupStep {
        SetupStep::Mint {
            token: AddressRef::resolved("tokens.fDAI"),
            recipient: AddressRef::Sender,
            amount: U256::from(100),
        }
    }

    #[tokio::test]
    async fn test_execute_mint() -> Result<()> {
        let chain = MockChain::goerli();
        let mut book = AddressBook::new(MOCK_SENDER);
        book.insert_resolved("tokens.fDAI", MOCK_DAI);

        execute_step(&mock_context(), &chain, &book, 0, &mint()).await?;
        assert_eq!(
            chain.setup_calls(),
            vec![MockCall::Mint(MOCK_DAI, MOCK_SENDER, U256::from(100))]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_carries_index() {
        let chain = MockChain::goerli().with_failing_setup_call(0);
        let mut book = AddressBook::new(MOCK_SENDER);
        book.insert_resolved("tokens.fDAI", MOCK_DAI);

        let res = execute_step(&mock_context(), &chain, &book, 3, &mint()).await;
        assert!(matches!(res, Err(ScriptError::SetupStep { index: 3, .. })));
    }

    #[test]
    fn test_validate_steps() {
        let mut book = AddressBook::new(MOCK_SENDER);
        book.insert_resolved("tokens.fDAI", MOCK_DAI);
        let transfer = SetupStep::Transfer {
            token: AddressRef::resolved("tokens.fDAI"),
            recipient: AddressRef::deployed("TradeableCashflow"),
            amount: U256::from(70),
        };
        let steps = [mint(), transfer];

        assert!(matches!(
            validate_steps(&steps, &[], &book),
            Err(ScriptError::SetupStep { index: 1, .. })
        ));

        let specs = [DeploymentSpec::new("TradeableCashflow", vec![])];
        assert_eq!(validate_steps(&steps, &specs, &book), Ok(()));
    }
}
