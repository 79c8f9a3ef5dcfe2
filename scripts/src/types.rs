//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

/// A reference to an address that is known by the time it is used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressRef {
    /// The sender of the run's transactions
    Sender,
    /// A literal address from static configuration
    Literal(Address),
    /// An address resolved from the registry or the wrapper locator,
    /// by logical name
    Resolved(String),
    /// The address of a contract deployed earlier in the run, by contract name
    Deployed(String),
}

impl AddressRef {
    /// Shorthand for a resolved address reference
    pub fn resolved(name: impl Into<String>) -> Self {
        AddressRef::Resolved(name.into())
    }

    /// Shorthand for a deployed contract reference
    pub fn deployed(name: impl Into<String>) -> Self {
        AddressRef::Deployed(name.into())
    }
}

impl Display for AddressRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressRef::Sender => write!(f, "sender"),
            AddressRef::Literal(addr) => write!(f, "{addr:#x}"),
            AddressRef::Resolved(name) => write!(f, "{name}"),
            AddressRef::Deployed(name) => write!(f, "{name}"),
        }
    }
}

/// A constructor argument before its address references are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    /// An address, resolved at deployment time
    Address(AddressRef),
    /// A string literal
    String(String),
    /// An unsigned integer literal
    Uint(U256),
}

impl ConstructorArg {
    /// Shorthand for a string argument
    pub fn string(s: impl Into<String>) -> Self {
        ConstructorArg::String(s.into())
    }
}

/// A fully resolved constructor argument, ready to be ABI encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorValue {
    /// An address
    Address(Address),
    /// A string
    String(String),
    /// An unsigned 256-bit integer
    Uint(U256),
}

impl From<&ConstructorValue> for DynSolValue {
    fn from(value: &ConstructorValue) -> Self {
        match value {
            ConstructorValue::Address(addr) => DynSolValue::Address(*addr),
            ConstructorValue::String(s) => DynSolValue::String(s.clone()),
            ConstructorValue::Uint(v) => DynSolValue::Uint(*v, 256),
        }
    }
}

/// A single contract deployment: the contract and its constructor arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSpec {
    /// The name of the contract, which is also the name of its artifact
    pub contract_name: String,
    /// The ordered constructor arguments
    pub constructor_args: Vec<ConstructorArg>,
}

impl DeploymentSpec {
    /// Create a new deployment spec
    pub fn new(contract_name: impl Into<String>, constructor_args: Vec<ConstructorArg>) -> Self {
        Self {
            contract_name: contract_name.into(),
            constructor_args,
        }
    }

    /// Iterate over the address references in the constructor arguments
    pub fn address_refs(&self) -> impl Iterator<Item = &AddressRef> {
        self.constructor_args.iter().filter_map(|arg| match arg {
            ConstructorArg::Address(addr) => Some(addr),
            _ => None,
        })
    }
}

/// An address resolved during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    /// The logical name the address is known by
    pub logical_name: String,
    /// The address
    pub address: Address,
}

/// A contract deployed during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    /// The name of the deployed contract
    pub contract_name: String,
    /// The address the contract was deployed to
    pub address: Address,
}

/// The addresses accumulated during a run.
///
/// Entries are only appended; a redeployed contract shadows its earlier record.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    /// The sender of the run's transactions
    sender: Address,
    /// The resolved addresses, in resolution order
    resolved: Vec<ResolvedAddress>,
    /// The deployed contracts, in deployment order
    deployed: Vec<DeployedContract>,
}

impl AddressBook {
    /// Create an empty address book for the given sender
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            ..Default::default()
        }
    }

    /// Record a resolved address
    pub fn insert_resolved(&mut self, logical_name: impl Into<String>, address: Address) {
        self.resolved.push(ResolvedAddress {
            logical_name: logical_name.into(),
            address,
        });
    }

    /// Record a deployed contract
    pub fn insert_deployed(&mut self, contract: DeployedContract) {
        self.deployed.push(contract);
    }

    /// Get a resolved address by logical name
    pub fn resolved(&self, logical_name: &str) -> Option<Address> {
        self.resolved
            .iter()
            .rev()
            .find(|r| r.logical_name == logical_name)
            .map(|r| r.address)
    }

    /// Get the latest deployment of a contract by name
    pub fn deployed(&self, contract_name: &str) -> Option<Address> {
        self.deployed
            .iter()
            .rev()
            .find(|d| d.contract_name == contract_name)
            .map(|d| d.address)
    }

    /// Get the address a reference points to, if it is known
    pub fn get(&self, addr: &AddressRef) -> Option<Address> {
        match addr {
            AddressRef::Sender => Some(self.sender),
            AddressRef::Literal(addr) => Some(*addr),
            AddressRef::Resolved(name) => self.resolved(name),
            AddressRef::Deployed(name) => self.deployed(name),
        }
    }

    /// All resolved addresses, in resolution order
    pub fn resolved_addresses(&self) -> &[ResolvedAddress] {
        &self.resolved
    }

    /// All deployed contracts, in deployment order
    pub fn deployed_contracts(&self) -> &[DeployedContract] {
        &self.deployed
    }
}
