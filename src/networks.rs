//! Networks Frame can be asked to switch to.

use std::fmt;

/// Ethereum Sepolia
pub const SEPOLIA: u64 = 11_155_111;

/// Chains whose early blocks carry proof-of-authority extra data in their headers.
///
/// Any chain that *began* as PoA needs the extra-data handling for its pre-merge blocks.
pub const POA_CHAIN_IDS: [u64; 5] = [SEPOLIA, 10, 11_155_420, 137, 80_002];

/// Returns `true` if blocks of this chain need [`crate::middleware::ExtraDataToPoa`]
pub fn is_poa_chain(chain_id: u64) -> bool {
    POA_CHAIN_IDS.contains(&chain_id)
}

/// A network the Frame provider serves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Network {
    /// The ecosystem the network belongs to, e.g. `ethereum`
    pub ecosystem: &'static str,
    /// The network name within its ecosystem, e.g. `sepolia`
    pub name: &'static str,
    /// The EIP-155 chain id
    pub chain_id: u64,
}

const NETWORKS: &[Network] = &[
    Network { ecosystem: "ethereum", name: "mainnet", chain_id: 1 },
    Network { ecosystem: "ethereum", name: "sepolia", chain_id: SEPOLIA },
    Network { ecosystem: "arbitrum", name: "mainnet", chain_id: 42_161 },
    Network { ecosystem: "arbitrum", name: "sepolia", chain_id: 421_614 },
    Network { ecosystem: "base", name: "mainnet", chain_id: 8_453 },
    Network { ecosystem: "base", name: "sepolia", chain_id: 84_532 },
    Network { ecosystem: "optimism", name: "mainnet", chain_id: 10 },
    Network { ecosystem: "optimism", name: "sepolia", chain_id: 11_155_420 },
    Network { ecosystem: "polygon", name: "mainnet", chain_id: 137 },
    Network { ecosystem: "polygon", name: "amoy", chain_id: 80_002 },
];

/// All networks the Frame provider is registered for
pub fn networks() -> impl Iterator<Item = &'static Network> {
    NETWORKS.iter()
}

impl Network {
    /// Looks up a network by ecosystem and name
    pub fn lookup(ecosystem: &str, name: &str) -> Option<Network> {
        networks().find(|n| n.ecosystem == ecosystem && n.name == name).copied()
    }

    /// Looks up a network by chain id
    pub fn from_chain_id(chain_id: u64) -> Option<Network> {
        networks().find(|n| n.chain_id == chain_id).copied()
    }

    /// Ethereum mainnet
    pub fn mainnet() -> Network {
        NETWORKS[0]
    }

    /// Ethereum Sepolia
    pub fn sepolia() -> Network {
        NETWORKS[1]
    }

    /// Returns `true` if this network needs proof-of-authority header handling
    pub fn is_poa(&self) -> bool {
        is_poa_chain(self.chain_id)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ecosystem, self.name)
    }
}
