use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, Uint128};
use rand::Rng;
use uuid::Uuid;

use crate::client::SecretClient;
use crate::error::{ClientError, Result};

#[cw_serde]
#[derive(Default)]
pub struct InitConfig {
    pub public_total_supply: Option<bool>,
    pub enable_deposit: Option<bool>,
    pub enable_redeem: Option<bool>,
    pub enable_mint: Option<bool>,
    pub enable_burn: Option<bool>,
}

#[cw_serde]
pub struct InitialBalance {
    pub address: String,
    pub amount: Uint128,
}

/// A reference to an externally hosted logo, or logo content stored on chain
#[cw_serde]
pub enum Logo {
    Url(String),
    Embedded(EmbeddedLogo),
}

#[cw_serde]
pub enum EmbeddedLogo {
    Svg(Binary),
    Png(Binary),
}

#[cw_serde]
#[derive(Default)]
pub struct MarketingInfo {
    pub project: Option<String>,
    pub description: Option<String>,
    pub marketing: Option<String>,
    pub logo: Option<Logo>,
}

/// SNIP-20 init message plus the SNIPIX marketing extension.
#[cw_serde]
pub struct InitMsg {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub prng_seed: Binary,
    pub admin: Option<String>,
    pub initial_balances: Option<Vec<InitialBalance>>,
    pub config: Option<InitConfig>,
    pub marketing_info: Option<MarketingInfo>,
}

impl InitMsg {
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            prng_seed: new_prng_seed(),
            admin: None,
            initial_balances: None,
            config: None,
            marketing_info: None,
        }
    }
}

impl Default for InitMsg {
    fn default() -> Self {
        Self::new("Test token", "TTX", 6)
    }
}

#[cw_serde]
pub enum ExecuteMsg {
    CreateViewingKey {
        entropy: String,
    },
    Transfer {
        recipient: String,
        amount: Uint128,
        memo: Option<String>,
    },
    SetMarketingInfo {
        marketing_info: Option<MarketingInfo>,
    },
}

#[cw_serde]
pub enum QueryMsg {
    TokenInfo {},
    Balance { address: String, key: String },
    MarketingInfo {},
}

#[cw_serde]
pub enum ExecuteAnswer {
    CreateViewingKey { key: String },
}

#[cw_serde]
pub struct BalanceResponse {
    pub balance: Balance,
}

#[cw_serde]
pub struct Balance {
    pub amount: Uint128,
}

#[cw_serde]
pub struct TokenInfoResponse {
    pub token_info: TokenInfo,
}

#[cw_serde]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Option<Uint128>,
}

#[cw_serde]
pub struct MarketingInfoResponse {
    pub marketing_info: MarketingInfoAnswer,
}

#[cw_serde]
pub struct MarketingInfoAnswer {
    pub marketing_info: Option<MarketingInfo>,
}

/// Random UUID text as seed bytes; serialized as base64.
pub fn new_prng_seed() -> Binary {
    Binary::from(random_uuid().into_bytes())
}

/// Label made unique with a random suffix; labels must not repeat on chain.
pub fn generate_label(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1..=10_000);
    format!("{}#{}", prefix, suffix)
}

/// Random version 4 UUID, hyphenated.
pub fn random_uuid() -> String {
    Uuid::new_v4().to_string()
}

impl SecretClient {
    /// Instantiates a token from already uploaded code.
    pub async fn instantiate_snip20(
        &self,
        code_id: u64,
        code_hash: &str,
        init_msg: &InitMsg,
    ) -> Result<String> {
        let label = generate_label(&format!("Token {}", init_msg.symbol));
        let result = self
            .instantiate_contract(code_id, code_hash, init_msg, &label)
            .await?;
        Ok(result.contract_address)
    }

    /// Creates a viewing key for the sender and returns it.
    pub async fn create_viewing_key(
        &self,
        contract_address: &str,
        code_hash: &str,
        entropy: &str,
    ) -> Result<String> {
        let msg = ExecuteMsg::CreateViewingKey {
            entropy: entropy.to_string(),
        };
        let result = self
            .execute_contract(contract_address, code_hash, &msg)
            .await?;

        let data = result.data.first().filter(|d| !d.is_empty()).ok_or_else(|| {
            ClientError::TransactionError(format!(
                "No response data from create_viewing_key in tx {}",
                result.tx_hash
            ))
        })?;

        match serde_json::from_slice::<ExecuteAnswer>(data)? {
            ExecuteAnswer::CreateViewingKey { key } => Ok(key),
        }
    }

    /// Moves `amount` of the token from the sender to `recipient`.
    pub async fn snip20_transfer(
        &self,
        contract_address: &str,
        code_hash: &str,
        recipient: &str,
        amount: u128,
        memo: Option<String>,
    ) -> Result<()> {
        let msg = ExecuteMsg::Transfer {
            recipient: recipient.to_string(),
            amount: Uint128::new(amount),
            memo,
        };
        self.execute_contract(contract_address, code_hash, &msg)
            .await?;
        Ok(())
    }

    pub async fn snip20_balance(
        &self,
        contract_address: &str,
        code_hash: &str,
        address: &str,
        key: &str,
    ) -> Result<u128> {
        let query = QueryMsg::Balance {
            address: address.to_string(),
            key: key.to_string(),
        };
        let response: BalanceResponse = self
            .query_contract(contract_address, code_hash, &query)
            .await?;
        Ok(response.balance.amount.u128())
    }

    pub async fn token_info(&self, contract_address: &str, code_hash: &str) -> Result<TokenInfo> {
        let response: TokenInfoResponse = self
            .query_contract(contract_address, code_hash, &QueryMsg::TokenInfo {})
            .await?;
        Ok(response.token_info)
    }

    pub async fn marketing_info(
        &self,
        contract_address: &str,
        code_hash: &str,
    ) -> Result<Option<MarketingInfo>> {
        let response: MarketingInfoResponse = self
            .query_contract(contract_address, code_hash, &QueryMsg::MarketingInfo {})
            .await?;
        Ok(response.marketing_info.marketing_info)
    }

    pub async fn set_marketing_info(
        &self,
        contract_address: &str,
        code_hash: &str,
        marketing_info: Option<MarketingInfo>,
    ) -> Result<()> {
        self.execute_contract(
            contract_address,
            code_hash,
            &ExecuteMsg::SetMarketingInfo { marketing_info },
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn init_msg_serializes_like_the_contract_expects() {
        let mut msg = InitMsg::new("Test token", "TTX", 6);
        msg.prng_seed = Binary::from(b"seed".to_vec());
        msg.marketing_info = Some(MarketingInfo {
            logo: Some(Logo::Url("https://example.com/logo.png".to_string())),
            ..Default::default()
        });

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["name"], "Test token");
        assert_eq!(value["decimals"], 6);
        assert_eq!(value["prng_seed"], "c2VlZA==");
        assert_eq!(
            value["marketing_info"]["logo"],
            json!({"url": "https://example.com/logo.png"})
        );
    }

    #[test]
    fn messages_use_snake_case_variants() {
        let execute = serde_json::to_value(ExecuteMsg::CreateViewingKey {
            entropy: "badabing".to_string(),
        })
        .unwrap();
        assert_eq!(execute, json!({"create_viewing_key": {"entropy": "badabing"}}));

        let transfer = serde_json::to_value(ExecuteMsg::Transfer {
            recipient: "secret1abc".to_string(),
            amount: Uint128::new(5),
            memo: None,
        })
        .unwrap();
        assert_eq!(
            transfer,
            json!({"transfer": {"recipient": "secret1abc", "amount": "5", "memo": null}})
        );

        let clear = serde_json::to_value(ExecuteMsg::SetMarketingInfo {
            marketing_info: None,
        })
        .unwrap();
        assert_eq!(clear, json!({"set_marketing_info": {"marketing_info": null}}));

        let query = serde_json::to_value(QueryMsg::MarketingInfo {}).unwrap();
        assert_eq!(query, json!({"marketing_info": {}}));
    }

    #[test]
    fn parses_contract_answers() {
        let answer: ExecuteAnswer =
            serde_json::from_str(r#"{"create_viewing_key":{"key":"api_key_abc"}}"#).unwrap();
        assert_eq!(
            answer,
            ExecuteAnswer::CreateViewingKey {
                key: "api_key_abc".to_string()
            }
        );

        let balance: BalanceResponse =
            serde_json::from_str(r#"{"balance":{"amount":"987654321"}}"#).unwrap();
        assert_eq!(balance.balance.amount.u128(), 987_654_321);

        let cleared: MarketingInfoResponse =
            serde_json::from_str(r#"{"marketing_info":{"marketing_info":null}}"#).unwrap();
        assert!(cleared.marketing_info.marketing_info.is_none());
    }

    #[test]
    fn seeds_and_labels_are_random() {
        let seed = new_prng_seed();
        let text = String::from_utf8(seed.to_vec()).unwrap();
        let uuid = Uuid::parse_str(&text).unwrap();
        assert_eq!(uuid.get_version_num(), 4);
        assert_eq!(text.len(), 36);
        assert_ne!(new_prng_seed(), seed);

        let label = generate_label("Token TTX");
        assert!(label.starts_with("Token TTX#"));
    }
}
