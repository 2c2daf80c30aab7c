use std::collections::HashMap;
use std::env;

use crate::chain::{ChainConfig, Network};
use crate::error::{ClientError, Result};

/// LocalSecret test account "b", see https://docs.scrt.network/dev/LocalSecret.html#accounts
pub const LOCAL_TEST_MNEMONIC: &str = "jelly shadow frog dirt dragon use armed praise universe win jungle close inmate rain oil canvas beauty pioneer chef soccer icon dizzy thunder meadow";

pub const DEFAULT_CONTRACT_NAME: &str = "snipix";
pub const SNIPIX_SOURCE_URL: &str =
    "https://github.com/atomiklabs/scrt-network-dev-setup-example/tree/use-snip-20/contracts/snipix";

/// Everything a deployment step needs, resolved from a network profile plus environment.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub env_name: String,
    pub mnemonic: Option<String>,
    pub chain: ChainConfig,
    pub contract_name: Option<String>,
    pub code_id: Option<u64>,
    pub code_hash: Option<String>,
    pub source_url: Option<String>,
}

impl DeployConfig {
    /// Built-in profile without any overrides.
    pub fn for_network(network: Network) -> Self {
        let mnemonic = match network {
            Network::Local => Some(LOCAL_TEST_MNEMONIC.to_string()),
            _ => None,
        };

        Self {
            env_name: network.to_string(),
            mnemonic,
            chain: ChainConfig::for_network(network),
            contract_name: Some(DEFAULT_CONTRACT_NAME.to_string()),
            code_id: None,
            code_hash: None,
            source_url: Some(SNIPIX_SOURCE_URL.to_string()),
        }
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env(network: Option<Network>) -> Result<Self> {
        dotenv::dotenv().ok();
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(network, &vars)
    }

    /// Resolves the profile named by `network` (or `ENV_NAME`, defaulting to local)
    /// and applies the overrides found in `vars`. Empty values count as unset.
    pub fn from_vars(network: Option<Network>, vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let network = match network {
            Some(network) => network,
            None => get("ENV_NAME")
                .map(|name| name.parse())
                .transpose()?
                .unwrap_or(Network::Local),
        };

        let mut config = Self::for_network(network);

        if let Some(env_name) = get("ENV_NAME") {
            config.env_name = env_name;
        }
        if let Some(mnemonic) = get("MNEMONIC") {
            config.mnemonic = Some(mnemonic);
        }
        if let Some(chain_id) = get("CHAIN_ID") {
            config.chain.chain_id = chain_id;
        }
        if let Some(chain_name) = get("CHAIN_NAME") {
            config.chain.chain_name = chain_name;
        }
        if let Some(grpc) = get("CHAIN_GRPC") {
            config.chain.grpc_url = Some(check_url("CHAIN_GRPC", grpc)?);
        }
        if let Some(rpc) = get("CHAIN_RPC") {
            config.chain.rpc_url = Some(check_url("CHAIN_RPC", rpc)?);
        }
        if let Some(rest) = get("CHAIN_REST") {
            config.chain.rest_url = Some(check_url("CHAIN_REST", rest)?);
        }
        if let Some(contract_name) = get("CONTRACT_NAME") {
            config.contract_name = Some(contract_name);
        }
        if let Some(code_id) = get("CODE_ID") {
            let code_id = code_id
                .parse()
                .map_err(|e| ClientError::ConfigError(format!("Invalid CODE_ID: {}", e)))?;
            config.code_id = Some(code_id);
        }
        if let Some(code_hash) = get("CODE_HASH") {
            config.code_hash = Some(code_hash);
        }
        if let Some(source_url) = get("SNIPIX_SOURCODE_URL") {
            config.source_url = Some(source_url);
        }

        Ok(config)
    }

    /// Fails unless `MNEMONIC`, `CHAIN_ID`, `CHAIN_GRPC` and `CONTRACT_NAME` are all set.
    pub fn validate(&self) -> Result<()> {
        let present = |value: Option<&str>| value.map(|v| !v.is_empty()).unwrap_or(false);

        let all_present = present(self.mnemonic.as_deref())
            && present(Some(self.chain.chain_id.as_str()))
            && present(self.chain.grpc_url.as_deref())
            && present(self.contract_name.as_deref());

        if !all_present {
            return Err(ClientError::ConfigError(
                "Missing env vars. Ensure providing all: `ENV_NAME`, `MNEMONIC`, `CHAIN_ID`, `CHAIN_GRPC`, and `CONTRACT_NAME`"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn contract_name(&self) -> Result<&str> {
        self.contract_name
            .as_deref()
            .ok_or_else(|| ClientError::ConfigError("Missing `CONTRACT_NAME`".to_string()))
    }

    /// Manifest key: `<contract>.<env>`.
    pub fn manifest_name(&self) -> Result<String> {
        Ok(format!("{}.{}", self.contract_name()?, self.env_name))
    }
}

fn check_url(key: &str, value: String) -> Result<String> {
    url::Url::parse(&value)
        .map_err(|e| ClientError::ConfigError(format!("Invalid {} `{}`: {}", key, value, e)))?;
    Ok(value)
}
