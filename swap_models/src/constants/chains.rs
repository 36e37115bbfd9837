use alloy_primitives::{Address, address};
use error_stack::{Report, report};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::error::{Error, ModelResult};

pub const NATIVE_TOKEN_EVM_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

pub const NATIVE_TOKEN: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

pub fn is_native_token(address: &Address) -> bool {
    *address == NATIVE_TOKEN
}

/// Parses an EVM address the way wallets validate user input.
///
/// All-lowercase or all-uppercase hex is accepted as is, mixed case must match
/// the EIP-55 checksum.
pub fn parse_evm_address(address: &str) -> ModelResult<Address> {
    let hex = address
        .strip_prefix("0x")
        .ok_or_else(|| report!(Error::InvalidAddress(address.to_string())))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(report!(Error::InvalidAddress(address.to_string()))
            .attach_printable("Expected 0x followed by 40 hex characters"));
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(address, None).map_err(|e| {
            report!(Error::InvalidAddress(address.to_string()))
                .attach_printable(format!("Checksum mismatch: {e}"))
        })
    } else {
        Address::from_str(address).map_err(|e| {
            report!(Error::InvalidAddress(address.to_string()))
                .attach_printable(format!("Failed to parse address: {e}"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, EnumIter, Hash)]
#[repr(u32)]
pub enum ChainId {
    Ethereum = 1,
    Optimism = 10,
    Base = 8453,
    ArbitrumOne = 42161,
    Zircuit = 48900,

    Sepolia = 11155111,
    BaseSepolia = 84532,
    OptimismSepolia = 11155420,
    ArbitrumSepolia = 421614,
}

/// Chain the simplified swap flow runs on
pub const DEFAULT_CHAIN: ChainId = ChainId::Base;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub chain_id: ChainId,
    pub name: &'static str,
    /// Public RPC endpoint used when no override is configured
    pub rpc_url: &'static str,
}

impl ChainId {
    pub fn supported_chains() -> Vec<ChainId> {
        ChainId::iter().collect()
    }

    pub fn network(self) -> NetworkDescriptor {
        let (name, rpc_url) = match self {
            ChainId::Ethereum => ("Ethereum", "https://eth.merkle.io"),
            ChainId::Optimism => ("OP Mainnet", "https://mainnet.optimism.io"),
            ChainId::Base => ("Base", "https://mainnet.base.org"),
            ChainId::ArbitrumOne => ("Arbitrum One", "https://arb1.arbitrum.io/rpc"),
            ChainId::Zircuit => ("Zircuit", "https://zircuit1-mainnet.p2pify.com"),
            ChainId::Sepolia => ("Sepolia", "https://sepolia.drpc.org"),
            ChainId::BaseSepolia => ("Base Sepolia", "https://sepolia.base.org"),
            ChainId::OptimismSepolia => ("OP Sepolia", "https://sepolia.optimism.io"),
            ChainId::ArbitrumSepolia => {
                ("Arbitrum Sepolia", "https://sepolia-rollup.arbitrum.io/rpc")
            }
        };

        NetworkDescriptor {
            chain_id: self,
            name,
            rpc_url,
        }
    }
}

/// Looks up the network for a numeric chain id
pub fn resolve(chain_id: u32) -> ModelResult<NetworkDescriptor> {
    ChainId::try_from(chain_id).map(ChainId::network)
}

impl TryFrom<u32> for ChainId {
    type Error = Report<Error>;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ChainId::iter()
            .find(|chain| *chain as u32 == value)
            .ok_or_else(|| report!(Error::UnsupportedChain(value.to_string())))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.network().name)
    }
}

impl TryFrom<&str> for ChainId {
    type Error = Report<Error>;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Ethereum" | "Mainnet" => Ok(Self::Ethereum),
            "Optimism" | "OP Mainnet" => Ok(Self::Optimism),
            "Base" => Ok(Self::Base),
            "ArbitrumOne" | "Arbitrum One" | "Arbitrum" => Ok(Self::ArbitrumOne),
            "Zircuit" => Ok(Self::Zircuit),
            "Sepolia" => Ok(Self::Sepolia),
            "BaseSepolia" | "Base Sepolia" => Ok(Self::BaseSepolia),
            "OptimismSepolia" | "OP Sepolia" => Ok(Self::OptimismSepolia),
            "ArbitrumSepolia" | "Arbitrum Sepolia" => Ok(Self::ArbitrumSepolia),
            _ => match value.parse::<u32>() {
                Ok(id) => Self::try_from(id),
                Err(_) => Err(report!(Error::UnsupportedChain(value.to_string()))),
            },
        }
    }
}
