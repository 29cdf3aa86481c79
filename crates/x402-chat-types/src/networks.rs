//! Well-known EVM networks of the x402 version 1 protocol.
//!
//! Version 1 challenges name their network with a short string ("base-sepolia")
//! instead of a CAIP-2 identifier. Signing an ERC-3009 authorization needs the
//! numeric EIP-155 chain id for the EIP-712 domain, so a challenge on a network
//! missing from [`KNOWN_NETWORKS`] cannot be paid by this client.
//!
//! ```
//! use x402_chat_types::networks::eip155_chain_id;
//!
//! assert_eq!(eip155_chain_id("base"), Some(8453));
//! assert_eq!(eip155_chain_id("solana"), None);
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

/// A known network: its v1 name and EIP-155 chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub name: &'static str,
    pub chain_id: u64,
}

pub static KNOWN_NETWORKS: &[NetworkInfo] = &[
    // Base
    NetworkInfo {
        name: "base",
        chain_id: 8453,
    },
    NetworkInfo {
        name: "base-sepolia",
        chain_id: 84532,
    },
    // Polygon
    NetworkInfo {
        name: "polygon",
        chain_id: 137,
    },
    NetworkInfo {
        name: "polygon-amoy",
        chain_id: 80002,
    },
    // Avalanche
    NetworkInfo {
        name: "avalanche",
        chain_id: 43114,
    },
    NetworkInfo {
        name: "avalanche-fuji",
        chain_id: 43113,
    },
    // Sei
    NetworkInfo {
        name: "sei",
        chain_id: 1329,
    },
    NetworkInfo {
        name: "sei-testnet",
        chain_id: 1328,
    },
    NetworkInfo {
        name: "xdc",
        chain_id: 50,
    },
    NetworkInfo {
        name: "xrpl-evm",
        chain_id: 1440000,
    },
    NetworkInfo {
        name: "peaq",
        chain_id: 3338,
    },
    NetworkInfo {
        name: "iotex",
        chain_id: 4689,
    },
    // Celo
    NetworkInfo {
        name: "celo",
        chain_id: 42220,
    },
    NetworkInfo {
        name: "celo-sepolia",
        chain_id: 11142220,
    },
];

static NAME_TO_CHAIN_ID: LazyLock<HashMap<&'static str, u64>> = LazyLock::new(|| {
    KNOWN_NETWORKS
        .iter()
        .map(|n| (n.name, n.chain_id))
        .collect()
});

/// Looks up the EIP-155 chain id for a v1 network name.
pub fn eip155_chain_id(network_name: &str) -> Option<u64> {
    NAME_TO_CHAIN_ID.get(network_name).copied()
}
