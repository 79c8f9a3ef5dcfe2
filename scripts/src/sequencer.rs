//! Ordered deployment of the application contracts

use std::collections::HashSet;

use tracing::info;

use crate::{
    artifacts::Artifacts,
    chain::{DeployRequest, Ledger},
    context::RunContext,
    errors::ScriptError,
    types::{
        AddressBook, AddressRef, ConstructorArg, ConstructorValue, DeployedContract,
        DeploymentSpec,
    },
};

/// Check that every spec only references addresses available at its position
/// in the sequence: resolved addresses, or contracts deployed by an earlier spec
pub fn validate_order(specs: &[DeploymentSpec], book: &AddressBook) -> Result<(), ScriptError> {
    let mut deployed_before: HashSet<&str> = HashSet::new();
    for spec in specs {
        for addr in spec.address_refs() {
            let available = match addr {
                AddressRef::Sender | AddressRef::Literal(_) => true,
                AddressRef::Resolved(name) => book.resolved(name).is_some(),
                AddressRef::Deployed(name) => deployed_before.contains(name.as_str()),
            };
            if !available {
                return Err(ScriptError::DeploymentOrder {
                    contract: spec.contract_name.clone(),
                    reference: addr.to_string(),
                });
            }
        }
        deployed_before.insert(&spec.contract_name);
    }

    Ok(())
}

/// Resolve the constructor arguments of a spec against the address book
fn resolve_args(
    spec: &DeploymentSpec,
    book: &AddressBook,
) -> Result<Vec<ConstructorValue>, ScriptError> {
    spec.constructor_args
        .iter()
        .map(|arg| match arg {
            ConstructorArg::Address(addr) => book
                .get(addr)
                .map(ConstructorValue::Address)
                .ok_or_else(|| ScriptError::DeploymentOrder {
                    contract: spec.contract_name.clone(),
                    reference: addr.to_string(),
                }),
            ConstructorArg::String(s) => Ok(ConstructorValue::String(s.clone())),
            ConstructorArg::Uint(v) => Ok(ConstructorValue::Uint(*v)),
        })
        .collect()
}

/// Deploy a single contract, waiting for its creation to be confirmed
pub async fn deploy<L: Ledger>(
    ctx: &RunContext,
    ledger: &L,
    artifacts: &Artifacts,
    book: &AddressBook,
    spec: &DeploymentSpec,
) -> Result<DeployedContract, ScriptError> {
    let args = resolve_args(spec, book)?;
    let bytecode = artifacts
        .bytecode(&spec.contract_name)
        .cloned()
        .ok_or_else(|| ScriptError::Deployment {
            contract: spec.contract_name.clone(),
            cause: "no artifact loaded".to_string(),
        })?;

    ctx.ensure_not_aborted()?;
    info!("deploying `{}`", spec.contract_name);
    let request = DeployRequest {
        contract_name: spec.contract_name.clone(),
        bytecode,
        args,
    };
    let address = ledger
        .deploy(&request)
        .await
        .map_err(|e| ScriptError::Deployment {
            contract: spec.contract_name.clone(),
            cause: e.to_string(),
        })?;

    info!("`{}` deployed at {address:#x}", spec.contract_name);
    Ok(DeployedContract {
        contract_name: spec.contract_name.clone(),
        address,
    })
}
