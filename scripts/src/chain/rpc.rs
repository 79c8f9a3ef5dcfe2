//! A JSON-RPC backed implementation of the chain interfaces

use std::str::FromStr;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, TxHash, B256, U256};
use eyre::{eyre, Result};
use tracing::debug;

use super::{DeployRequest, Ledger, Registry, WrapperInfo, WrapperSource};
use crate::{
    errors::ScriptError,
    network::NetworkConfig,
    solidity::{IResolver, ISuperToken, ISuperfluid, ITestToken},
};

/// A client of the selected network, signing with a local private key
#[derive(Clone)]
pub struct RpcChain {
    /// The signing provider
    provider: DynProvider,
    /// The address of the signer
    sender: Address,
    /// The framework resolver of the network
    resolver: Option<Address>,
}

impl RpcChain {
    /// Connect to the RPC endpoint, checking that it serves the selected network
    pub async fn connect(
        rpc_url: &str,
        priv_key: &str,
        network: &NetworkConfig,
    ) -> Result<Self, ScriptError> {
        let signer = PrivateKeySigner::from_str(priv_key)
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        let sender = signer.address();
        let url =
            Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .on_http(url);
        let provider = DynProvider::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        check_chain_id(network.chain_id, chain_id)?;

        Ok(Self {
            provider,
            sender,
            resolver: network.resolver,
        })
    }
}

/// Check that the RPC endpoint serves the chain of the selected network
fn check_chain_id(expected: u64, actual: u64) -> Result<(), ScriptError> {
    if actual != expected {
        return Err(ScriptError::ChainMismatch { expected, actual });
    }
    Ok(())
}

/// Check that a transaction did not revert, returning its hash
fn ensure_success(receipt: &TransactionReceipt) -> Result<TxHash> {
    let tx_hash = receipt.transaction_hash;
    if !receipt.status() {
        return Err(eyre!("transaction {tx_hash:#x} reverted"));
    }

    debug!("transaction {tx_hash:#x} confirmed");
    Ok(tx_hash)
}

impl Registry for RpcChain {
    async fn resolve_name(&self, name: &str) -> Result<Address> {
        let resolver = self
            .resolver
            .ok_or_else(|| eyre!("no resolver configured for the selected network"))?;
        let resolver = IResolver::new(resolver, self.provider.clone());
        let res = resolver.get(name.to_string()).call().await?;
        Ok(res._0)
    }

    async fn agreement_class(&self, host: Address, agreement_type: B256) -> Result<Address> {
        let host = ISuperfluid::new(host, self.provider.clone());
        let res = host.getAgreementClass(agreement_type).call().await?;
        Ok(res.agreementClass)
    }
}

impl WrapperSource for RpcChain {
    async fn token_symbol(&self, token: Address) -> Result<String> {
        let token = ITestToken::new(token, self.provider.clone());
        let res = token.symbol().call().await?;
        Ok(res._0)
    }

    async fn erc20_wrapper(
        &self,
        host: Address,
        token: Address,
        symbol: &str,
    ) -> Result<WrapperInfo> {
        let host = ISuperfluid::new(host, self.provider.clone());
        let res = host
            .getERC20Wrapper(token, symbol.to_string())
            .call()
            .await?;
        Ok(WrapperInfo {
            address: res.wrapperAddress,
            created: res.created,
        })
    }
}

impl Ledger for RpcChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<Address> {
        let tx = TransactionRequest::default().with_deploy_code(request.init_code());
        let receipt = self
            .provider
            .send_transaction(tx)
            .await?
            .get_receipt()
            .await?;
        ensure_success(&receipt)?;

        receipt
            .contract_address
            .ok_or_else(|| eyre!("creation receipt carries no contract address"))
    }

    async fn mint(&self, token: Address, recipient: Address, amount: U256) -> Result<TxHash> {
        let token = ITestToken::new(token, self.provider.clone());
        let receipt = token
            .mint(recipient, amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure_success(&receipt)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let token = ITestToken::new(token, self.provider.clone());
        let receipt = token
            .approve(spender, amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure_success(&receipt)
    }

    async fn upgrade(&self, wrapper: Address, amount: U256) -> Result<TxHash> {
        let wrapper = ISuperToken::new(wrapper, self.provider.clone());
        let receipt = wrapper.upgrade(amount).send().await?.get_receipt().await?;
        ensure_success(&receipt)
    }

    async fn transfer(&self, token: Address, recipient: Address, amount: U256) -> Result<TxHash> {
        let token = ISuperToken::new(token, self.provider.clone());
        let receipt = token
            .transfer(recipient, amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure_success(&receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::check_chain_id;
    use crate::{errors::ScriptError, network};

    #[test]
    fn test_matching_chain_id() {
        let goerli = network::resolve_config("goerli", "preview-20200928", None).unwrap();
        assert_eq!(check_chain_id(goerli.chain_id, 5), Ok(()));
    }

    #[test]
    fn test_mismatched_chain_id() {
        let goerli = network::resolve_config("goerli", "preview-20200928", None).unwrap();
        let err = check_chain_id(goerli.chain_id, 1).unwrap_err();

        assert_eq!(
            err,
            ScriptError::ChainMismatch {
                expected: 5,
                actual: 1,
            }
        );
        assert_eq!(
            err.to_string(),
            "RPC endpoint serves chain 1 but the selected network is chain 5"
        );
    }
}
