use std::sync::Arc;
use std::time::{Duration, Instant};

use prost::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tendermint_rpc::{Client, HttpClient};
use tokio::sync::OnceCell;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use cosmos_sdk_proto::cosmos::{
    auth::v1beta1::{query_client::QueryClient, BaseAccount, QueryAccountRequest},
    bank::v1beta1::{query_client::QueryClient as BankQueryClient, QueryBalanceRequest},
    tx::v1beta1::{
        service_client::ServiceClient, BroadcastMode, BroadcastTxRequest, BroadcastTxResponse,
        GetTxRequest, GetTxResponse,
    },
};

use crate::{
    chain::{ChainConfig, PreferredChainInfo},
    encryption::{self, EncryptionUtils, EnigmaUtils},
    error::{ClientError, Result},
    proto,
    wallet::Wallet,
};

const TX_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(60);

/// Signing client for a Secret Network chain.
#[derive(Clone)]
pub struct SecretClient {
    pub config: ChainConfig,
    pub wallet: Wallet,
    pub tx_timeout: Duration,
    encryption: Arc<OnceCell<Arc<dyn EncryptionUtils>>>,
    encryption_seed: Option<[u8; 32]>,
    rpc_client: Option<HttpClient>,
}

/// Result of [`ClientBuilder::build`]: the client plus the chain description for frontends.
pub struct CreateClientResult {
    pub client: SecretClient,
    pub chain_info: PreferredChainInfo,
}

pub struct ClientBuilder {
    config: ChainConfig,
    wallet: Option<Wallet>,
    encryption: Option<Arc<dyn EncryptionUtils>>,
    encryption_seed: Option<[u8; 32]>,
    tx_timeout: Duration,
}

impl ClientBuilder {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            wallet: None,
            encryption: None,
            encryption_seed: None,
            tx_timeout: DEFAULT_TX_TIMEOUT,
        }
    }

    pub fn wallet(mut self, wallet: Wallet) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn encryption_utils(mut self, utils: Arc<dyn EncryptionUtils>) -> Self {
        self.encryption = Some(utils);
        self
    }

    /// Seed of the x25519 key used when the client sets up its own [`EnigmaUtils`].
    pub fn encryption_seed(mut self, seed: [u8; 32]) -> Self {
        self.encryption_seed = Some(seed);
        self
    }

    pub fn tx_timeout(mut self, timeout: Duration) -> Self {
        self.tx_timeout = timeout;
        self
    }

    /// Without a wallet a random one is generated, which is enough for queries.
    /// Encryption keys are fetched from the chain on first use unless supplied.
    pub async fn build(self) -> Result<CreateClientResult> {
        self.config.grpc_url()?;

        let wallet = match self.wallet {
            Some(wallet) => wallet,
            None => {
                let (wallet, _) = Wallet::random()?;
                tracing::warn!(
                    "No wallet supplied, using generated address {}",
                    wallet.address()
                );
                wallet
            }
        };

        if wallet.account_id.prefix() != self.config.account_prefix {
            return Err(ClientError::ConfigError(format!(
                "Wallet address {} does not use the `{}` prefix of {}",
                wallet.address(),
                self.config.account_prefix,
                self.config.chain_id
            )));
        }

        let rpc_client = match self.config.rpc_url.as_deref() {
            Some(url) => Some(HttpClient::new(url).map_err(|e| {
                ClientError::RpcError(format!("Failed to create RPC client: {}", e))
            })?),
            None => None,
        };

        let encryption = Arc::new(OnceCell::new());
        if let Some(utils) = self.encryption {
            encryption
                .set(utils)
                .map_err(|_| ClientError::Other("Encryption utils already set".to_string()))?;
        }

        let chain_info = self.config.preferred_chain_info();
        let client = SecretClient {
            config: self.config,
            wallet,
            tx_timeout: self.tx_timeout,
            encryption,
            encryption_seed: self.encryption_seed,
            rpc_client,
        };

        Ok(CreateClientResult { client, chain_info })
    }
}

impl SecretClient {
    pub async fn new(config: ChainConfig, wallet: Wallet) -> Result<Self> {
        Ok(ClientBuilder::new(config).wallet(wallet).build().await?.client)
    }

    pub fn address(&self) -> String {
        self.wallet.address()
    }

    pub(crate) async fn channel(&self) -> Result<Channel> {
        let url = self.config.grpc_url()?;

        let mut endpoint = Endpoint::from_shared(url.to_string())
            .map_err(|e| ClientError::ConfigError(format!("Invalid gRPC url {}: {}", url, e)))?;

        if url.starts_with("https://") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_enabled_roots())
                .map_err(|e| ClientError::GrpcError(format!("Failed to configure TLS: {}", e)))?;
        }

        endpoint
            .connect()
            .await
            .map_err(|e| ClientError::GrpcError(format!("Failed to connect: {}", e)))
    }

    /// Unary call for services that have no generated client.
    async fn unary<Req, Resp>(
        &self,
        path: &'static str,
        request: Req,
    ) -> Result<std::result::Result<Resp, tonic::Status>>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel().await?);
        grpc.ready()
            .await
            .map_err(|e| ClientError::GrpcError(format!("Service was not ready: {}", e)))?;

        let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
        let path = http::uri::PathAndQuery::from_static(path);

        Ok(grpc
            .unary(tonic::Request::new(request), path, codec)
            .await
            .map(tonic::Response::into_inner))
    }

    /// Encryption utils, set up from the chain's tx key on first use.
    pub async fn encryption(&self) -> Result<Arc<dyn EncryptionUtils>> {
        let utils = self
            .encryption
            .get_or_try_init(|| async {
                let tx_key = self.tx_key().await?;
                let utils = EnigmaUtils::from_tx_key(&tx_key, self.encryption_seed)?;
                Ok::<_, ClientError>(Arc::new(utils) as Arc<dyn EncryptionUtils>)
            })
            .await?;

        Ok(utils.clone())
    }

    /// Consensus IO public key from the registration module.
    pub async fn tx_key(&self) -> Result<Vec<u8>> {
        let key: proto::Key = self
            .unary(proto::QUERY_TX_KEY_PATH, ())
            .await?
            .map_err(|e| ClientError::GrpcError(format!("Failed to get tx key: {}", e)))?;
        Ok(key.key)
    }

    pub async fn broadcast_tx(&self, tx_bytes: Vec<u8>) -> Result<BroadcastTxResponse> {
        let mut client = ServiceClient::new(self.channel().await?);

        let request = tonic::Request::new(BroadcastTxRequest {
            tx_bytes,
            mode: BroadcastMode::Sync as i32,
        });

        let response = client.broadcast_tx(request).await.map_err(|e| {
            ClientError::GrpcError(format!("Failed to broadcast transaction: {}", e))
        })?;

        Ok(response.into_inner())
    }

    pub async fn get_account_info(&self, address: String) -> Result<BaseAccount> {
        let mut client = QueryClient::new(self.channel().await?);

        let response = client
            .account(QueryAccountRequest { address })
            .await
            .map_err(|e| ClientError::GrpcError(format!("Failed to get account: {}", e)))?;

        let account = response
            .into_inner()
            .account
            .ok_or_else(|| ClientError::ParseError("No account data found".to_string()))?;

        BaseAccount::decode(account.value.as_slice())
            .map_err(|e| ClientError::ParseError(format!("Failed to decode account: {}", e)))
    }

    /// Bank balance of `address` in `denom`; an account without funds has zero.
    pub async fn balance(&self, address: &str, denom: &str) -> Result<u128> {
        let mut client = BankQueryClient::new(self.channel().await?);

        let response = client
            .balance(QueryBalanceRequest {
                address: address.to_string(),
                denom: denom.to_string(),
            })
            .await
            .map_err(|e| ClientError::GrpcError(format!("Failed to get balance: {}", e)))?
            .into_inner();

        match response.balance {
            Some(coin) => coin
                .amount
                .parse()
                .map_err(|e| ClientError::ParseError(format!("Invalid balance amount: {}", e))),
            None => Ok(0),
        }
    }

    pub async fn get_tx(&self, hash: &str) -> Result<GetTxResponse> {
        let mut client = ServiceClient::new(self.channel().await?);

        let response = client
            .get_tx(GetTxRequest {
                hash: hash.to_string(),
            })
            .await
            .map_err(|e| ClientError::GrpcError(format!("Failed to get transaction: {}", e)))?
            .into_inner();

        Ok(response)
    }

    /// Polls until the transaction is included in a block.
    pub async fn wait_for_tx(&self, hash: &str, timeout: Duration) -> Result<GetTxResponse> {
        let started = Instant::now();

        loop {
            match self.get_tx(hash).await {
                Ok(response) if response.tx_response.is_some() => return Ok(response),
                Ok(_) => {}
                Err(e) => tracing::debug!("Transaction {} not found yet: {}", hash, e),
            }

            if started.elapsed() >= timeout {
                return Err(ClientError::TimeoutError(format!(
                    "Transaction {} was not included within {:?}",
                    hash, timeout
                )));
            }

            tokio::time::sleep(TX_POLL_INTERVAL).await;
        }
    }

    pub async fn code_hash_by_code_id(&self, code_id: u64) -> Result<String> {
        let response: proto::QueryCodeHashResponse = self
            .unary(
                proto::QUERY_CODE_HASH_BY_CODE_ID_PATH,
                proto::QueryByCodeIdRequest { code_id },
            )
            .await?
            .map_err(|e| ClientError::GrpcError(format!("Failed to get code hash: {}", e)))?;

        Ok(normalize_code_hash(&response.code_hash))
    }

    pub async fn code_hash_by_contract_address(&self, contract_address: &str) -> Result<String> {
        let response: proto::QueryCodeHashResponse = self
            .unary(
                proto::QUERY_CODE_HASH_BY_CONTRACT_ADDRESS_PATH,
                proto::QueryByContractAddressRequest {
                    contract_address: contract_address.to_string(),
                },
            )
            .await?
            .map_err(|e| ClientError::GrpcError(format!("Failed to get code hash: {}", e)))?;

        Ok(normalize_code_hash(&response.code_hash))
    }

    /// Sends an encrypted query and decodes the decrypted JSON answer.
    pub async fn query_contract<Q, R>(
        &self,
        contract_address: &str,
        code_hash: &str,
        query: &Q,
    ) -> Result<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let utils = self.encryption().await?;
        let query = serde_json::to_value(query)?;
        let sealed = utils.encrypt(&normalize_code_hash(code_hash), &query).await?;
        let nonce = encryption::nonce_of(&sealed)?;

        let result: std::result::Result<proto::QuerySecretContractResponse, tonic::Status> = self
            .unary(
                proto::QUERY_SECRET_CONTRACT_PATH,
                proto::QuerySecretContractRequest {
                    contract_address: contract_address.to_string(),
                    query: sealed,
                },
            )
            .await?;

        let response = match result {
            Ok(response) => response,
            Err(status) => {
                let message = match encryption::decrypt_error_message(
                    utils.as_ref(),
                    status.message(),
                    &nonce,
                )
                .await
                {
                    Some(decrypted) => decrypted,
                    None => status.message().to_string(),
                };
                return Err(ClientError::GrpcError(format!(
                    "Query on {} failed: {}",
                    contract_address, message
                )));
            }
        };

        let decrypted = utils.decrypt(&response.data, &nonce).await?;
        let json = decode_base64_payload(&decrypted)?;
        serde_json::from_slice(&json).map_err(|e| {
            ClientError::ParseError(format!("Unexpected query response: {}", e))
        })
    }

    pub async fn latest_block_height(&self) -> Result<u64> {
        let rpc = self
            .rpc_client
            .as_ref()
            .ok_or_else(|| ClientError::ConfigError("No RPC endpoint configured".to_string()))?;

        let status = rpc
            .status()
            .await
            .map_err(|e| ClientError::RpcError(format!("Failed to get node status: {}", e)))?;

        Ok(status.sync_info.latest_block_height.value())
    }

    /// Blocks until the node reports at least one committed block.
    pub async fn wait_for_chain(&self, timeout: Duration) -> Result<u64> {
        let started = Instant::now();

        loop {
            match self.latest_block_height().await {
                Ok(height) if height > 0 => {
                    tracing::info!("Chain {} is at height {}", self.config.chain_id, height);
                    return Ok(height);
                }
                Ok(_) => tracing::debug!("Chain {} has no blocks yet", self.config.chain_id),
                Err(e) => tracing::debug!("Chain {} not reachable: {}", self.config.chain_id, e),
            }

            if started.elapsed() >= timeout {
                return Err(ClientError::TimeoutError(format!(
                    "Chain {} produced no blocks within {:?}",
                    self.config.chain_id, timeout
                )));
            }

            tokio::time::sleep(TX_POLL_INTERVAL).await;
        }
    }
}

/// Code hashes are compared and sealed as lowercase hex without prefix.
pub fn normalize_code_hash(code_hash: &str) -> String {
    code_hash.trim().trim_start_matches("0x").to_ascii_lowercase()
}

/// Contract answers are base64 text wrapped in the encryption layer.
pub(crate) fn decode_base64_payload(decrypted: &[u8]) -> Result<Vec<u8>> {
    use base64::Engine;

    let text = std::str::from_utf8(decrypted)
        .map_err(|e| ClientError::ParseError(format!("Response is not UTF-8: {}", e)))?;

    base64::engine::general_purpose::STANDARD
        .decode(text.trim())
        .map_err(|e| ClientError::ParseError(format!("Response is not base64: {}", e)))
}
