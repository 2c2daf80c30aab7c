use std::fmt;
use std::str::FromStr;

use cosmwasm_std::{Decimal, Uint128};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

pub const ACCOUNT_PREFIX: &str = "secret";
pub const DENOM: &str = "uscrt";
/// SLIP-44 coin type registered for SCRT.
pub const COIN_TYPE: u32 = 529;

pub const STORE_CODE_GAS_LIMIT: u64 = 5_000_000;
pub const INSTANTIATE_GAS_LIMIT: u64 = 1_000_000;
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;
/// 0.1 uscrt per unit of gas.
pub const GAS_PRICE: Decimal = Decimal::raw(100_000_000_000_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Local,
    Testnet,
    Mainnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Local => "local",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Network::Local),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(ClientError::ConfigError(format!(
                "Unknown network `{}`, expected one of: local, testnet, mainnet",
                other
            ))),
        }
    }
}

/// Endpoints and fee parameters of a single network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub network: Network,
    pub chain_id: String,
    pub chain_name: String,
    pub grpc_url: Option<String>,
    pub rpc_url: Option<String>,
    pub rest_url: Option<String>,
    pub account_prefix: String,
    pub denom: String,
    pub gas_price: Decimal,
}

/// Chain description handed to wallet frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferredChainInfo {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc: Option<String>,
    pub rest: Option<String>,
}

impl ChainConfig {
    /// Built-in endpoints. The public gRPC endpoints of testnet and mainnet only
    /// speak gRPC-web, so those profiles carry no gRPC url and need `CHAIN_GRPC`
    /// pointed at a native gRPC node.
    pub fn for_network(network: Network) -> Self {
        let (chain_id, chain_name, grpc, rpc, rest) = match network {
            Network::Local => (
                "secretdev-1",
                "Secret Local",
                Some("http://localhost:9090"),
                Some("http://localhost:26657"),
                Some("http://localhost:1317"),
            ),
            Network::Testnet => (
                "pulsar-2",
                "Secret Testnet",
                None,
                Some("https://testnet-rpc.roninventures.io"),
                Some("https://testnet-api.roninventures.io"),
            ),
            Network::Mainnet => ("secret-4", "Secret Network", None, None, None),
        };

        Self {
            network,
            chain_id: chain_id.to_string(),
            chain_name: chain_name.to_string(),
            grpc_url: grpc.map(str::to_string),
            rpc_url: rpc.map(str::to_string),
            rest_url: rest.map(str::to_string),
            account_prefix: ACCOUNT_PREFIX.to_string(),
            denom: DENOM.to_string(),
            gas_price: GAS_PRICE,
        }
    }

    pub fn preferred_chain_info(&self) -> PreferredChainInfo {
        PreferredChainInfo {
            chain_id: self.chain_id.clone(),
            chain_name: self.chain_name.clone(),
            rpc: self.rpc_url.clone(),
            rest: self.rest_url.clone(),
        }
    }

    pub fn grpc_url(&self) -> Result<&str> {
        self.grpc_url.as_deref().ok_or_else(|| {
            ClientError::ConfigError(format!(
                "No gRPC endpoint configured for {}, set CHAIN_GRPC",
                self.chain_id
            ))
        })
    }

    pub fn rpc_url(&self) -> Result<&str> {
        self.rpc_url.as_deref().ok_or_else(|| {
            ClientError::ConfigError(format!("No RPC endpoint configured for {}", self.chain_id))
        })
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::for_network(Network::Local)
    }
}

/// Fee amount in the fee denom for a given gas limit, rounded up.
pub fn fee_for_gas(gas_limit: u64, gas_price: Decimal) -> u128 {
    Uint128::from(gas_limit).mul_ceil(gas_price).u128()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_network_names() {
        assert_eq!("local".parse::<Network>().unwrap(), Network::Local);
        assert_eq!(" TestNet ".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn network_table_matches_known_chains() {
        let local = ChainConfig::for_network(Network::Local);
        assert_eq!(local.chain_id, "secretdev-1");
        assert_eq!(local.rpc_url.as_deref(), Some("http://localhost:26657"));

        assert_eq!(local.grpc_url().unwrap(), "http://localhost:9090");

        let testnet = ChainConfig::for_network(Network::Testnet);
        assert_eq!(testnet.chain_id, "pulsar-2");
        assert!(testnet.rpc_url().is_ok());

        let mainnet = ChainConfig::for_network(Network::Mainnet);
        assert_eq!(mainnet.chain_id, "secret-4");
        assert!(mainnet.rpc_url.is_none());
        assert!(mainnet.rpc_url().is_err());
    }

    #[test]
    fn remote_profiles_need_a_native_grpc_endpoint() {
        for network in [Network::Testnet, Network::Mainnet] {
            let config = ChainConfig::for_network(network);
            let err = config.grpc_url().unwrap_err();
            assert!(err.to_string().contains("CHAIN_GRPC"));
        }
    }

    #[test]
    fn preferred_chain_info_serializes_camel_case() {
        let info = ChainConfig::for_network(Network::Local).preferred_chain_info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["chainId"], "secretdev-1");
        assert_eq!(json["chainName"], "Secret Local");
        assert_eq!(json["rest"], "http://localhost:1317");
    }

    #[test]
    fn fee_rounds_up() {
        assert_eq!(fee_for_gas(STORE_CODE_GAS_LIMIT, GAS_PRICE), 500_000);
        assert_eq!(fee_for_gas(INSTANTIATE_GAS_LIMIT, Decimal::percent(25)), 250_000);
        assert_eq!(fee_for_gas(3, GAS_PRICE), 1);
        assert_eq!(fee_for_gas(0, GAS_PRICE), 0);
    }

    #[test]
    fn fee_rounds_up_tiny_fractions() {
        let half_micro: Decimal = "0.0000005".parse().unwrap();
        assert_eq!(fee_for_gas(1, half_micro), 1);

        let price: Decimal = "0.10000005".parse().unwrap();
        assert_eq!(fee_for_gas(10, price), 2);
        assert_eq!(fee_for_gas(DEFAULT_GAS_LIMIT, price), 20_001);
    }
}
