//! Scripts for deploying and setting up the streamable cashflow contracts
//! against a Superfluid framework deployment.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod chain;
pub mod cli;
mod commands;
pub mod constants;
pub mod context;
pub mod errors;
pub mod network;
pub mod pipeline;
pub mod plans;
pub mod registry;
pub mod sequencer;
pub mod setup;
mod solidity;
pub mod types;
pub mod utils;
pub mod wrapper;
