//! Resolution of well-known addresses through the framework registry

use alloy_primitives::keccak256;
use tracing::info;

use crate::{
    chain::Registry,
    constants::{CFA_AGREEMENT_TYPE, CFA_KEY, HOST_KEY, HOST_REGISTRY_PREFIX},
    context::RunContext,
    errors::ScriptError,
    types::ResolvedAddress,
};

/// Look up the address registered under `logical_name`.
///
/// An unregistered name is an error; nothing downstream may run without it.
pub async fn lookup<R: Registry>(
    ctx: &RunContext,
    registry: &R,
    logical_name: &str,
) -> Result<ResolvedAddress, ScriptError> {
    ctx.ensure_not_aborted()?;

    let address = ctx
        .retry
        .run(&format!("registry lookup of `{logical_name}`"), move || {
            registry.resolve_name(logical_name)
        })
        .await
        .map_err(|e| ScriptError::RegistryLookup {
            name: logical_name.to_string(),
            cause: e.to_string(),
        })?;

    if address.is_zero() {
        return Err(ScriptError::RegistryLookup {
            name: logical_name.to_string(),
            cause: "no entry in registry".to_string(),
        });
    }

    info!("resolved `{logical_name}` to {address:#x}");
    Ok(ResolvedAddress {
        logical_name: logical_name.to_string(),
        address,
    })
}

/// Resolve the framework host of the configured version and its
/// constant flow agreement
pub async fn lookup_framework<R: Registry>(
    ctx: &RunContext,
    registry: &R,
) -> Result<[ResolvedAddress; 2], ScriptError> {
    let host_name = format!("{HOST_REGISTRY_PREFIX}{}", ctx.network.sdk_version);
    let host = lookup(ctx, registry, &host_name).await?.address;

    ctx.ensure_not_aborted()?;
    let agreement_type = keccak256(CFA_AGREEMENT_TYPE);
    let cfa = ctx
        .retry
        .run("constant flow agreement lookup", move || {
            registry.agreement_class(host, agreement_type)
        })
        .await
        .map_err(|e| ScriptError::RegistryLookup {
            name: CFA_AGREEMENT_TYPE.to_string(),
            cause: e.to_string(),
        })?;
    if cfa.is_zero() {
        return Err(ScriptError::RegistryLookup {
            name: CFA_AGREEMENT_TYPE.to_string(),
            cause: "agreement is not registered with the host".to_string(),
        });
    }

    info!("framework host at {host:#x}, constant flow agreement at {cfa:#x}");
    Ok([
        ResolvedAddress {
            logical_name: HOST_KEY.to_string(),
            address: host,
        },
        ResolvedAddress {
            logical_name: CFA_KEY.to_string(),
            address: cfa,
        },
    ])
}
