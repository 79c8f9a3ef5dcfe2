//! Location of the wrapper of a base token

use alloy_primitives::Address;
use tracing::{info, warn};

use crate::{
    chain::WrapperSource, constants::WRAPPER_SYMBOL_SUFFIX, context::RunContext,
    errors::ScriptError, types::ResolvedAddress,
};

/// Find the wrapper of the base token `token`, recording it as `alias`.
///
/// The wrapper symbol is the base token's symbol with a suffix; the wrapper
/// address is used whether or not the wrapper has been created yet.
pub async fn locate_wrapper<W: WrapperSource>(
    ctx: &RunContext,
    source: &W,
    host: Address,
    token_name: &str,
    token: Address,
    alias: &str,
) -> Result<ResolvedAddress, ScriptError> {
    let to_err = |e: eyre::Report| ScriptError::WrapperResolution {
        token: token_name.to_string(),
        cause: e.to_string(),
    };

    ctx.ensure_not_aborted()?;
    let symbol = ctx
        .retry
        .run(&format!("symbol of `{token_name}`"), move || {
            source.token_symbol(token)
        })
        .await
        .map_err(to_err)?;
    let wrapper_symbol = format!("{symbol}{WRAPPER_SYMBOL_SUFFIX}");

    ctx.ensure_not_aborted()?;
    let wrapper = ctx
        .retry
        .run(&format!("wrapper of `{token_name}`"), || {
            source.erc20_wrapper(host, token, &wrapper_symbol)
        })
        .await
        .map_err(to_err)?;

    if wrapper.address.is_zero() {
        return Err(ScriptError::WrapperResolution {
            token: token_name.to_string(),
            cause: "host returned the zero address".to_string(),
        });
    }
    if !wrapper.created {
        warn!("wrapper {wrapper_symbol} of `{token_name}` is not created yet");
    }

    info!("resolved {wrapper_symbol} to {:#x}", wrapper.address);
    Ok(ResolvedAddress {
        logical_name: alias.to_string(),
        address: wrapper.address,
    })
}
