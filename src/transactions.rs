use std::str::FromStr;

use cosmos_sdk_proto::cosmos::base::abci::v1beta1::TxResponse;
use cosmos_sdk_proto::traits::Message;
use cosmrs::bank::MsgSend;
use cosmrs::tx::{BodyBuilder, Fee, Msg, Raw, SignDoc, SignerInfo};
use cosmrs::{AccountId, Any, Coin, Denom};
use serde::{Deserialize, Serialize};

use crate::chain::{fee_for_gas, DEFAULT_GAS_LIMIT, INSTANTIATE_GAS_LIMIT, STORE_CODE_GAS_LIMIT};
use crate::client::{decode_base64_payload, normalize_code_hash, SecretClient};
use crate::encryption::{self, EncryptionUtils, NONCE_LEN};
use crate::error::{ClientError, Result};
use crate::proto;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCodeResult {
    pub code_id: u64,
    pub code_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantiateResult {
    pub contract_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Vec<TxAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAttribute {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLog {
    #[serde(default)]
    pub msg_index: u32,
    #[serde(default)]
    pub events: Vec<TxEvent>,
}

/// Outcome of an included transaction.
#[derive(Debug, Clone, Default)]
pub struct TxResult {
    pub tx_hash: String,
    pub height: i64,
    pub code: u32,
    pub raw_log: String,
    pub gas_wanted: i64,
    pub gas_used: i64,
    pub logs: Vec<TxLog>,
    /// Decrypted contract response per message, empty for non-contract messages.
    pub data: Vec<Vec<u8>>,
}

impl TxResult {
    pub fn from_response(response: TxResponse) -> Self {
        let mut logs: Vec<TxLog> = response
            .logs
            .iter()
            .map(|log| TxLog {
                msg_index: log.msg_index,
                events: log
                    .events
                    .iter()
                    .map(|event| TxEvent {
                        kind: event.r#type.clone(),
                        attributes: event
                            .attributes
                            .iter()
                            .map(|attr| TxAttribute {
                                key: attr.key.clone(),
                                value: attr.value.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        // older nodes only return the JSON log
        if logs.is_empty() && response.code == 0 {
            logs = serde_json::from_str(&response.raw_log).unwrap_or_default();
        }

        // SDK 0.50 nodes drop per-message logs and only report flat events
        if logs.is_empty() && !response.events.is_empty() {
            logs = vec![TxLog {
                msg_index: 0,
                events: response
                    .events
                    .iter()
                    .map(|event| TxEvent {
                        kind: event.r#type.clone(),
                        attributes: event
                            .attributes
                            .iter()
                            .map(|attr| TxAttribute {
                                key: attr.key.clone(),
                                value: attr.value.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            }];
        }

        Self {
            tx_hash: response.txhash,
            height: response.height,
            code: response.code,
            raw_log: response.raw_log,
            gas_wanted: response.gas_wanted,
            gas_used: response.gas_used,
            logs,
            data: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// First value of `key` in any event of type `kind`.
    pub fn find_attribute(&self, kind: &str, key: &str) -> Option<&str> {
        self.logs
            .iter()
            .flat_map(|log| log.events.iter())
            .filter(|event| event.kind == kind)
            .flat_map(|event| event.attributes.iter())
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    /// First value of `key` regardless of event type.
    pub fn find_any_attribute(&self, key: &str) -> Option<&str> {
        self.logs
            .iter()
            .flat_map(|log| log.events.iter())
            .flat_map(|event| event.attributes.iter())
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

/// Per-message `(type, response bytes)` from the hex `data` field of a tx response.
pub(crate) fn msg_responses(data_hex: &str) -> Result<Vec<(String, Vec<u8>)>> {
    if data_hex.is_empty() {
        return Ok(Vec::new());
    }

    let bytes = hex::decode(data_hex)
        .map_err(|e| ClientError::ParseError(format!("Invalid tx data hex: {}", e)))?;
    let tx_data = proto::TxMsgData::decode(bytes.as_slice())
        .map_err(|e| ClientError::ParseError(format!("Failed to decode tx data: {}", e)))?;

    let responses = if tx_data.msg_responses.is_empty() {
        tx_data
            .data
            .into_iter()
            .map(|d| (d.msg_type, d.data))
            .collect()
    } else {
        tx_data
            .msg_responses
            .into_iter()
            .map(|any| (any.type_url, any.value))
            .collect()
    };

    Ok(responses)
}

fn secret_any<M: Message>(type_url: &str, msg: &M) -> Any {
    Any {
        type_url: type_url.to_string(),
        value: msg.encode_to_vec(),
    }
}

impl SecretClient {
    /// Uploads WASM byte code and returns its code id and hash.
    pub async fn store_code(
        &self,
        wasm_byte_code: Vec<u8>,
        source: Option<&str>,
        builder: Option<&str>,
    ) -> Result<StoreCodeResult> {
        tracing::info!("Uploading contract ({} bytes)", wasm_byte_code.len());

        let msg = proto::MsgStoreCode {
            sender: self.wallet.account_id.to_bytes(),
            wasm_byte_code,
            source: source.unwrap_or_default().to_string(),
            builder: builder.unwrap_or_default().to_string(),
        };

        let result = self
            .build_and_broadcast_tx(
                vec![secret_any(proto::MSG_STORE_CODE_TYPE_URL, &msg)],
                STORE_CODE_GAS_LIMIT,
                &[],
            )
            .await?;

        let code_id = result
            .find_any_attribute("code_id")
            .ok_or_else(|| {
                tracing::error!("Failed to get code id: {}", result.raw_log);
                ClientError::TransactionError("Failed to upload contract".to_string())
            })?
            .parse::<u64>()
            .map_err(|e| ClientError::ParseError(format!("Invalid code id: {}", e)))?;

        let code_hash = self.code_hash_by_code_id(code_id).await?;
        tracing::info!("Stored code id {} with hash {}", code_id, code_hash);

        Ok(StoreCodeResult { code_id, code_hash })
    }

    pub async fn instantiate_contract<T: Serialize + ?Sized>(
        &self,
        code_id: u64,
        code_hash: &str,
        init_msg: &T,
        label: &str,
    ) -> Result<InstantiateResult> {
        let code_hash = normalize_code_hash(code_hash);
        let sealed = self
            .encryption()
            .await?
            .encrypt(&code_hash, &serde_json::to_value(init_msg)?)
            .await?;
        let nonce = encryption::nonce_of(&sealed)?;

        let msg = proto::MsgInstantiateContract {
            sender: self.wallet.account_id.to_bytes(),
            callback_code_hash: String::new(),
            code_id,
            label: label.to_string(),
            init_msg: sealed,
            init_funds: vec![],
            callback_sig: vec![],
            admin: String::new(),
        };

        let result = self
            .build_and_broadcast_tx(
                vec![secret_any(proto::MSG_INSTANTIATE_CONTRACT_TYPE_URL, &msg)],
                INSTANTIATE_GAS_LIMIT,
                &[Some(nonce)],
            )
            .await?;

        let contract_address = result
            .find_attribute("message", "contract_address")
            .ok_or_else(|| {
                ClientError::TransactionError(format!(
                    "No contract address in instantiate result: {}",
                    result.raw_log
                ))
            })?
            .to_string();

        tracing::info!("Contract address: {}", contract_address);

        Ok(InstantiateResult { contract_address })
    }

    /// Runs an encrypted execute message; `TxResult::data[0]` holds the contract's answer.
    pub async fn execute_contract<T: Serialize + ?Sized>(
        &self,
        contract_address: &str,
        code_hash: &str,
        msg: &T,
    ) -> Result<TxResult> {
        let contract = AccountId::from_str(contract_address).map_err(|e| {
            ClientError::ParseError(format!("Invalid contract address {}: {}", contract_address, e))
        })?;

        let code_hash = normalize_code_hash(code_hash);
        let sealed = self
            .encryption()
            .await?
            .encrypt(&code_hash, &serde_json::to_value(msg)?)
            .await?;
        let nonce = encryption::nonce_of(&sealed)?;

        let execute_msg = proto::MsgExecuteContract {
            sender: self.wallet.account_id.to_bytes(),
            contract: contract.to_bytes(),
            msg: sealed,
            callback_code_hash: String::new(),
            sent_funds: vec![],
            callback_sig: vec![],
        };

        self.build_and_broadcast_tx(
            vec![secret_any(proto::MSG_EXECUTE_CONTRACT_TYPE_URL, &execute_msg)],
            DEFAULT_GAS_LIMIT,
            &[Some(nonce)],
        )
        .await
    }

    pub async fn bank_send(&self, to_address: &str, amount: u128, denom: &str) -> Result<TxResult> {
        let to_address = AccountId::from_str(to_address).map_err(|e| {
            ClientError::ParseError(format!("Invalid recipient address {}: {}", to_address, e))
        })?;

        let msg = MsgSend {
            from_address: self.wallet.account_id.clone(),
            to_address,
            amount: vec![Coin {
                amount,
                denom: parse_denom(denom)?,
            }],
        };

        let any = msg
            .to_any()
            .map_err(|e| ClientError::EncodingError(format!("Failed to convert message to Any: {}", e)))?;

        self.build_and_broadcast_tx(vec![any], DEFAULT_GAS_LIMIT, &[]).await
    }

    /// Signs, broadcasts and waits for the transaction. `nonces[i]` is the
    /// encryption nonce of message `i`, used to open its response.
    async fn build_and_broadcast_tx(
        &self,
        msgs: Vec<Any>,
        gas_limit: u64,
        nonces: &[Option<[u8; NONCE_LEN]>],
    ) -> Result<TxResult> {
        let tx_raw = self.build_tx(msgs, gas_limit).await?;

        let tx_bytes = tx_raw.to_bytes().map_err(|e| {
            ClientError::EncodingError(format!("Failed to serialize transaction: {}", e))
        })?;

        let response = self.broadcast_tx(tx_bytes).await?;
        let tx_response = response
            .tx_response
            .ok_or_else(|| ClientError::TransactionError("Transaction response is empty".to_string()))?;

        if tx_response.code != 0 {
            return Err(self.tx_failure(&tx_response.raw_log, nonces).await);
        }

        tracing::debug!("Broadcast transaction {}", tx_response.txhash);

        let included = self
            .wait_for_tx(&tx_response.txhash, self.tx_timeout)
            .await?
            .tx_response
            .ok_or_else(|| ClientError::TransactionError("Transaction response is empty".to_string()))?;

        if included.code != 0 {
            return Err(self.tx_failure(&included.raw_log, nonces).await);
        }

        let responses = msg_responses(&included.data)?;
        let mut result = TxResult::from_response(included);

        if nonces.iter().any(Option::is_some) {
            let utils = self.encryption().await?;
            match decrypt_msg_responses(utils.as_ref(), responses, nonces).await {
                Ok(data) => result.data = data,
                Err(e) => {
                    tracing::error!("Transaction {} response could not be opened", result.tx_hash);
                    return Err(e);
                }
            }
        } else {
            result.data = vec![Vec::new(); responses.len()];
        }

        tracing::info!(
            "Transaction {} included at height {} (gas used {})",
            result.tx_hash,
            result.height,
            result.gas_used
        );

        Ok(result)
    }

    async fn tx_failure(&self, raw_log: &str, nonces: &[Option<[u8; NONCE_LEN]>]) -> ClientError {
        if let (Some(nonce), Ok(utils)) = (
            nonces.iter().flatten().next(),
            self.encryption().await,
        ) {
            if let Some(decrypted) =
                encryption::decrypt_error_message(utils.as_ref(), raw_log, nonce).await
            {
                return ClientError::TransactionError(format!("Transaction failed: {}", decrypted));
            }
        }

        ClientError::TransactionError(format!("Transaction failed: {}", raw_log))
    }

    /// Builds and signs a transaction with the given messages
    pub async fn build_tx(&self, msgs: Vec<Any>, gas_limit: u64) -> Result<Raw> {
        let account = self
            .get_account_info(self.wallet.account_id.to_string())
            .await?;
        let account_number = account.account_number;
        let sequence = account.sequence;

        let chain_id: tendermint::chain::Id = self
            .config
            .chain_id
            .parse()
            .map_err(|e| ClientError::ConfigError(format!("Invalid chain ID: {}", e)))?;

        let fee = Coin {
            amount: fee_for_gas(gas_limit, self.config.gas_price),
            denom: parse_denom(&self.config.denom)?,
        };
        let fee = Fee::from_amount_and_gas(fee, gas_limit);

        let tx_body = BodyBuilder::new().msgs(msgs).finish();

        let auth_info = SignerInfo::single_direct(Some(self.wallet.public_key.clone()), sequence)
            .auth_info(fee);

        let sign_doc = SignDoc::new(&tx_body, &auth_info, &chain_id, account_number)
            .map_err(|e| ClientError::SigningError(format!("Failed to create sign doc: {}", e)))?;

        self.wallet.sign(sign_doc)
    }
}

/// Opens the contract answer of every message sent with a nonce. Messages
/// without a nonce, and contracts that answered nothing, yield an empty payload.
async fn decrypt_msg_responses(
    utils: &dyn EncryptionUtils,
    responses: Vec<(String, Vec<u8>)>,
    nonces: &[Option<[u8; NONCE_LEN]>],
) -> Result<Vec<Vec<u8>>> {
    let mut data = Vec::with_capacity(responses.len());

    for (index, (msg_type, response)) in responses.into_iter().enumerate() {
        let Some(nonce) = nonces.get(index).copied().flatten() else {
            data.push(Vec::new());
            continue;
        };

        let ciphertext = if msg_type.contains("MsgInstantiateContract") {
            proto::MsgInstantiateContractResponse::decode(response.as_slice()).map(|r| r.data)
        } else {
            proto::MsgExecuteContractResponse::decode(response.as_slice()).map(|r| r.data)
        }
        .map_err(|e| {
            ClientError::ParseError(format!("Failed to decode response of message {}: {}", index, e))
        })?;

        let plaintext = utils.decrypt(&ciphertext, &nonce).await.map_err(|e| {
            ClientError::EncryptionError(format!("Failed to decrypt response of message {}: {}", index, e))
        })?;

        if plaintext.is_empty() {
            data.push(Vec::new());
        } else {
            data.push(decode_base64_payload(&plaintext)?);
        }
    }

    Ok(data)
}

fn parse_denom(denom: &str) -> Result<Denom> {
    Denom::from_str(denom).map_err(|e| ClientError::ConfigError(format!("Invalid denom: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmos_sdk_proto::cosmos::base::abci::v1beta1::{AbciMessageLog, Attribute, StringEvent};
    use cosmos_sdk_proto::tendermint::abci::{Event, EventAttribute};

    /// Treats ciphertexts as plaintext and rejects anything starting with 0xff.
    struct Transparent;

    #[async_trait::async_trait]
    impl EncryptionUtils for Transparent {
        async fn pubkey(&self) -> Result<[u8; 32]> {
            Ok([0u8; 32])
        }

        async fn encrypt(&self, code_hash: &str, msg: &serde_json::Value) -> Result<Vec<u8>> {
            let mut sealed = code_hash.as_bytes().to_vec();
            sealed.extend(serde_json::to_vec(msg)?);
            Ok(sealed)
        }

        async fn decrypt(&self, ciphertext: &[u8], _nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>> {
            match ciphertext.first() {
                Some(0xff) => Err(ClientError::EncryptionError("authentication failed".to_string())),
                _ => Ok(ciphertext.to_vec()),
            }
        }
    }

    fn execute_response(data: &[u8]) -> (String, Vec<u8>) {
        (
            "/secret.compute.v1beta1.MsgExecuteContractResponse".to_string(),
            proto::MsgExecuteContractResponse { data: data.to_vec() }.encode_to_vec(),
        )
    }

    fn store_code_response() -> TxResponse {
        TxResponse {
            txhash: "ABC".to_string(),
            height: 12,
            logs: vec![AbciMessageLog {
                msg_index: 0,
                log: String::new(),
                events: vec![
                    StringEvent {
                        r#type: "message".to_string(),
                        attributes: vec![
                            Attribute {
                                key: "action".to_string(),
                                value: "/secret.compute.v1beta1.MsgStoreCode".to_string(),
                            },
                            Attribute {
                                key: "code_id".to_string(),
                                value: "17".to_string(),
                            },
                        ],
                    },
                ],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn finds_attributes_in_logs() {
        let result = TxResult::from_response(store_code_response());
        assert!(result.is_success());
        assert_eq!(result.height, 12);
        assert_eq!(result.find_any_attribute("code_id"), Some("17"));
        assert_eq!(result.find_attribute("message", "code_id"), Some("17"));
        assert_eq!(result.find_attribute("wasm", "code_id"), None);
    }

    #[test]
    fn falls_back_to_json_raw_log() {
        let response = TxResponse {
            raw_log: r#"[{"msg_index":0,"events":[{"type":"message","attributes":[{"key":"contract_address","value":"secret1xyz"}]}]}]"#.to_string(),
            ..Default::default()
        };

        let result = TxResult::from_response(response);
        assert_eq!(
            result.find_attribute("message", "contract_address"),
            Some("secret1xyz")
        );
    }

    #[test]
    fn failed_tx_keeps_plain_raw_log() {
        let response = TxResponse {
            code: 5,
            raw_log: "insufficient funds".to_string(),
            ..Default::default()
        };

        let result = TxResult::from_response(response);
        assert!(!result.is_success());
        assert!(result.logs.is_empty());
    }

    #[test]
    fn extracts_msg_responses_from_legacy_and_new_layouts() {
        let legacy = proto::TxMsgData {
            data: vec![proto::MsgData {
                msg_type: "/secret.compute.v1beta1.MsgExecuteContract".to_string(),
                data: vec![1, 2, 3],
            }],
            msg_responses: vec![],
        };
        let responses = msg_responses(&hex::encode(legacy.encode_to_vec())).unwrap();
        assert_eq!(
            responses,
            vec![(
                "/secret.compute.v1beta1.MsgExecuteContract".to_string(),
                vec![1, 2, 3]
            )]
        );

        let current = proto::TxMsgData {
            data: vec![],
            msg_responses: vec![prost_types::Any {
                type_url: "/secret.compute.v1beta1.MsgExecuteContractResponse".to_string(),
                value: vec![4, 5],
            }],
        };
        let responses = msg_responses(&hex::encode_upper(current.encode_to_vec())).unwrap();
        assert_eq!(responses[0].1, vec![4, 5]);

        assert!(msg_responses("").unwrap().is_empty());
        assert!(msg_responses("zz").is_err());
    }

    #[test]
    fn falls_back_to_tx_events() {
        let response = TxResponse {
            events: vec![Event {
                r#type: "message".to_string(),
                attributes: vec![EventAttribute {
                    key: "code_id".to_string(),
                    value: "42".to_string(),
                    index: true,
                }],
            }],
            ..Default::default()
        };

        let result = TxResult::from_response(response);
        assert_eq!(result.find_attribute("message", "code_id"), Some("42"));
    }

    #[tokio::test]
    async fn opens_contract_answers() {
        let responses = vec![
            execute_response(b"eyJvayI6MX0="),
            execute_response(b""),
            execute_response(b"eyJvayI6MX0="),
        ];
        let nonces = [Some([1u8; NONCE_LEN]), Some([2u8; NONCE_LEN]), None];

        let data = decrypt_msg_responses(&Transparent, responses, &nonces)
            .await
            .unwrap();
        assert_eq!(data, vec![br#"{"ok":1}"#.to_vec(), vec![], vec![]]);
    }

    #[tokio::test]
    async fn reports_undecryptable_answers() {
        let nonces = [Some([1u8; NONCE_LEN])];

        let err = decrypt_msg_responses(&Transparent, vec![execute_response(&[0xff, 1, 2])], &nonces)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::EncryptionError(_)));

        let garbled = (
            "/secret.compute.v1beta1.MsgExecuteContractResponse".to_string(),
            vec![0x0a, 0x05, 0x01],
        );
        let err = decrypt_msg_responses(&Transparent, vec![garbled], &nonces)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));

        let not_base64 = execute_response(b"%%%");
        assert!(decrypt_msg_responses(&Transparent, vec![not_base64], &nonces)
            .await
            .is_err());
    }
}
