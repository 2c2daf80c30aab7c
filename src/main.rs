use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use secret_client_rs::{
    chain::Network,
    config::DeployConfig,
    snip20::{self, InitMsg, MarketingInfo},
    ClientBuilder, ContractManifest, ManifestStore, SecretClient, Wallet,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Deploy and poke Secret Network contracts
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Network profile; defaults to `ENV_NAME` or local
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// Directory holding `<contract>.wasm` artifacts and deployment manifests
    #[arg(long, global = true, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    artifacts: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print chain info and the signer address
    Info,

    /// Upload contract byte code and record code id and hash
    Upload {
        /// Path to the wasm file, defaults to `<artifacts>/<CONTRACT_NAME>.wasm`
        #[arg(long)]
        wasm: Option<PathBuf>,
    },

    /// Instantiate a SNIPIX token from the uploaded code
    Instantiate {
        #[arg(long, default_value = "Test token")]
        name: String,
        #[arg(long, default_value = "TTX")]
        symbol: String,
        #[arg(long, default_value_t = 6)]
        decimals: u8,
        #[arg(long, default_value = "Snip-20 from Atomiklabs.io")]
        label: String,
    },

    /// Bank balance of an address
    Balance {
        address: Option<String>,
        #[arg(long)]
        denom: Option<String>,
    },

    /// Send native tokens
    Send {
        to: String,
        amount: u128,
        #[arg(long)]
        denom: Option<String>,
    },

    /// Run a raw JSON query against the deployed contract
    Query {
        query: String,
        /// Defaults to the address in the manifest
        #[arg(long)]
        contract: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = DeployConfig::from_env(args.network)?;
    let manifests = ManifestStore::new(&args.artifacts);

    match args.command {
        Command::Info => {
            let wallet = signer(&config)?;
            let result = ClientBuilder::new(config.chain.clone())
                .wallet(wallet)
                .build()
                .await?;

            println!("{}", serde_json::to_string_pretty(&result.chain_info)?);
            println!("address: {}", result.client.address());
        }
        Command::Upload { wasm } => {
            config.validate()?;
            let client = connect(&config).await?;
            let contract_name = config.contract_name()?;

            let wasm = wasm.unwrap_or_else(|| args.artifacts.join(format!("{}.wasm", contract_name)));
            let byte_code = tokio::fs::read(&wasm)
                .await
                .with_context(|| format!("Failed to read {}", wasm.display()))?;

            let stored = client
                .store_code(byte_code, config.source_url.as_deref(), None)
                .await?;

            let manifest = manifests.update(&config.manifest_name()?, stored)?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Command::Instantiate {
            name,
            symbol,
            decimals,
            label,
        } => {
            config.validate()?;
            let manifest_name = config.manifest_name()?;
            let manifest = manifests.read(&manifest_name)?;

            let code_id = config
                .code_id
                .or(manifest.code_id)
                .ok_or_else(|| anyhow!("Missing `codeId`"))?;
            let code_hash = config
                .code_hash
                .clone()
                .or(manifest.code_hash)
                .ok_or_else(|| anyhow!("Missing `codeHash`"))?;

            let client = connect(&config).await?;

            let mut init_msg = InitMsg::new(&name, &symbol, decimals);
            init_msg.marketing_info = Some(MarketingInfo {
                project: Some(format!("Atomik Labs: Token #{}", snip20::random_uuid())),
                ..Default::default()
            });

            let instantiated = client
                .instantiate_contract(code_id, &code_hash, &init_msg, &label)
                .await?;

            let manifest = manifests.update(&manifest_name, instantiated)?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Command::Balance { address, denom } => {
            let client = connect(&config).await?;
            let address = address.unwrap_or_else(|| client.address());
            let denom = denom.unwrap_or_else(|| config.chain.denom.clone());

            let amount = client.balance(&address, &denom).await?;
            println!("{}{}", amount, denom);
        }
        Command::Send { to, amount, denom } => {
            let client = connect(&config).await?;
            let denom = denom.unwrap_or_else(|| config.chain.denom.clone());

            let result = client.bank_send(&to, amount, &denom).await?;
            println!("{}", result.tx_hash);
        }
        Command::Query { query, contract } => {
            let query: serde_json::Value =
                serde_json::from_str(&query).context("Query must be valid JSON")?;
            let manifest = manifests.read(&config.manifest_name()?)?;
            let (contract, known_hash) = query_target(contract, &config, manifest)?;

            let client = connect(&config).await?;
            let code_hash = match known_hash {
                Some(code_hash) => code_hash,
                None => client.code_hash_by_contract_address(&contract).await?,
            };

            let answer: serde_json::Value = client.query_contract(&contract, &code_hash, &query).await?;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
    }

    Ok(())
}

/// Contract to query and its code hash when already known. A hash from the
/// environment or manifest only belongs to the manifest's contract.
fn query_target(
    contract: Option<String>,
    config: &DeployConfig,
    manifest: ContractManifest,
) -> anyhow::Result<(String, Option<String>)> {
    match contract {
        Some(contract) => Ok((contract, None)),
        None => {
            let contract = manifest
                .contract_address
                .ok_or_else(|| anyhow!("Missing `contractAddress`"))?;
            Ok((contract, config.code_hash.clone().or(manifest.code_hash)))
        }
    }
}

fn signer(config: &DeployConfig) -> anyhow::Result<Wallet> {
    match config.mnemonic.as_deref() {
        Some(mnemonic) => Ok(Wallet::from_mnemonic(mnemonic)?),
        None => {
            let (wallet, _) = Wallet::random()?;
            Ok(wallet)
        }
    }
}

async fn connect(config: &DeployConfig) -> anyhow::Result<SecretClient> {
    let result = ClientBuilder::new(config.chain.clone())
        .wallet(signer(config)?)
        .tx_timeout(Duration::from_secs(90))
        .build()
        .await
        .with_context(|| format!("Failed to create client for {}", config.chain.chain_id))?;

    tracing::info!(
        "Connected to {} as {}",
        result.chain_info.chain_id,
        result.client.address()
    );

    Ok(result.client)
}
