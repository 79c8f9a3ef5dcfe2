//! Supported networks and the static configuration selected for each of them

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use alloy_primitives::Address;

use crate::{constants::GOERLI_RESOLVER_ADDRESS, errors::ScriptError};

/// The networks the scripts can deploy to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Ethereum mainnet, named `live`
    Mainnet,
    /// A public test network
    Testnet(Testnet),
}

/// The supported test networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Testnet {
    /// The Goerli test network
    Goerli,
}

/// A row of the static network table
struct NetworkEntry {
    /// The network described by this row
    network: Network,
    /// The name the network is selected by
    name: &'static str,
    /// The chain ID of the network
    chain_id: u64,
    /// The framework resolver deployed on the network, if known
    resolver: Option<Address>,
}

/// The static network table
static NETWORKS: [NetworkEntry; 2] = [
    NetworkEntry {
        network: Network::Mainnet,
        name: "live",
        chain_id: 1,
        resolver: None,
    },
    NetworkEntry {
        network: Network::Testnet(Testnet::Goerli),
        name: "goerli",
        chain_id: 5,
        resolver: Some(GOERLI_RESOLVER_ADDRESS),
    },
];

impl Network {
    /// Get the static table row of the network
    fn entry(&self) -> &'static NetworkEntry {
        let idx = match self {
            Network::Mainnet => 0,
            Network::Testnet(Testnet::Goerli) => 1,
        };
        &NETWORKS[idx]
    }

    /// The name the network is selected by
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    /// The chain ID of the network
    pub fn chain_id(&self) -> u64 {
        self.entry().chain_id
    }

    /// The framework resolver deployed on the network, if known
    pub fn default_resolver(&self) -> Option<Address> {
        self.entry().resolver
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Network {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NETWORKS
            .iter()
            .find(|entry| entry.name == s)
            .map(|entry| entry.network)
            .ok_or_else(|| ScriptError::UnknownNetwork(s.to_string()))
    }
}

/// The configuration of the network selected for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// The selected network
    pub network: Network,
    /// The chain ID of the selected network
    pub chain_id: u64,
    /// The framework version tag
    pub sdk_version: String,
    /// The framework resolver to query
    pub resolver: Option<Address>,
}

impl NetworkConfig {
    /// The name of the selected network
    pub fn name(&self) -> &'static str {
        self.network.name()
    }
}

/// Resolve a network name into its chain ID
pub fn resolve(name: &str) -> Result<u64, ScriptError> {
    Network::from_str(name).map(|network| network.chain_id())
}

/// Resolve a network name into the configuration used for a run,
/// optionally overriding the resolver address of the network
pub fn resolve_config(
    name: &str,
    sdk_version: &str,
    resolver_override: Option<Address>,
) -> Result<NetworkConfig, ScriptError> {
    let network = Network::from_str(name)?;
    Ok(NetworkConfig {
        network,
        chain_id: network.chain_id(),
        sdk_version: sdk_version.to_string(),
        resolver: resolver_override.or(network.default_resolver()),
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::{resolve, resolve_config, Network, Testnet};
    use crate::{
        constants::{DEFAULT_SDK_VERSION, GOERLI_RESOLVER_ADDRESS},
        errors::ScriptError,
    };

    #[test]
    fn test_known_networks() {
        assert_eq!(resolve("goerli"), Ok(5));
        assert_eq!(resolve("live"), Ok(1));
    }

    #[test]
    fn test_unknown_networks() {
        for name in ["mainnet", "Goerli", "", "ropsten"] {
            assert_eq!(
                resolve(name),
                Err(ScriptError::UnknownNetwork(name.to_string()))
            );
        }
    }

    #[test]
    fn test_names_round_trip() {
        for network in [Network::Mainnet, Network::Testnet(Testnet::Goerli)] {
            assert_eq!(network.to_string().parse::<Network>(), Ok(network));
        }
    }

    #[test]
    fn test_resolver_override() {
        let config = resolve_config("goerli", DEFAULT_SDK_VERSION, None).unwrap();
        assert_eq!(config.resolver, Some(GOERLI_RESOLVER_ADDRESS));
        assert_eq!(config.sdk_version, DEFAULT_SDK_VERSION);

        let custom = Address::repeat_byte(0x11);
        let config = resolve_config("live", DEFAULT_SDK_VERSION, Some(custom)).unwrap();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.resolver, Some(custom));

        let config = resolve_config("live", DEFAULT_SDK_VERSION, None).unwrap();
        assert_eq!(config.resolver, None);
    }
}
