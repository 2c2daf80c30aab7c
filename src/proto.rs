//! Protobuf types of the `secret.compute.v1beta1` and `secret.registration.v1beta1`
//! packages. These are not part of `cosmos-sdk-proto`, so they are declared here by hand.

use cosmos_sdk_proto::cosmos::base::v1beta1::Coin;

pub const MSG_STORE_CODE_TYPE_URL: &str = "/secret.compute.v1beta1.MsgStoreCode";
pub const MSG_INSTANTIATE_CONTRACT_TYPE_URL: &str = "/secret.compute.v1beta1.MsgInstantiateContract";
pub const MSG_EXECUTE_CONTRACT_TYPE_URL: &str = "/secret.compute.v1beta1.MsgExecuteContract";

pub const QUERY_SECRET_CONTRACT_PATH: &str = "/secret.compute.v1beta1.Query/QuerySecretContract";
pub const QUERY_CODE_HASH_BY_CODE_ID_PATH: &str = "/secret.compute.v1beta1.Query/CodeHashByCodeId";
pub const QUERY_CODE_HASH_BY_CONTRACT_ADDRESS_PATH: &str =
    "/secret.compute.v1beta1.Query/CodeHashByContractAddress";
pub const QUERY_TX_KEY_PATH: &str = "/secret.registration.v1beta1.Query/TxKey";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgStoreCode {
    /// canonical (20 byte) address
    #[prost(bytes = "vec", tag = "1")]
    pub sender: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub wasm_byte_code: Vec<u8>,
    #[prost(string, tag = "3")]
    pub source: String,
    #[prost(string, tag = "4")]
    pub builder: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgInstantiateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub sender: Vec<u8>,
    #[prost(string, tag = "2")]
    pub callback_code_hash: String,
    #[prost(uint64, tag = "3")]
    pub code_id: u64,
    #[prost(string, tag = "4")]
    pub label: String,
    /// encrypted
    #[prost(bytes = "vec", tag = "5")]
    pub init_msg: Vec<u8>,
    #[prost(message, repeated, tag = "6")]
    pub init_funds: Vec<Coin>,
    #[prost(bytes = "vec", tag = "7")]
    pub callback_sig: Vec<u8>,
    #[prost(string, tag = "8")]
    pub admin: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgExecuteContract {
    #[prost(bytes = "vec", tag = "1")]
    pub sender: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract: Vec<u8>,
    /// encrypted
    #[prost(bytes = "vec", tag = "3")]
    pub msg: Vec<u8>,
    #[prost(string, tag = "4")]
    pub callback_code_hash: String,
    #[prost(message, repeated, tag = "5")]
    pub sent_funds: Vec<Coin>,
    #[prost(bytes = "vec", tag = "6")]
    pub callback_sig: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QuerySecretContractRequest {
    #[prost(string, tag = "1")]
    pub contract_address: String,
    /// encrypted
    #[prost(bytes = "vec", tag = "2")]
    pub query: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QuerySecretContractResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryByCodeIdRequest {
    #[prost(uint64, tag = "1")]
    pub code_id: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryByContractAddressRequest {
    #[prost(string, tag = "1")]
    pub contract_address: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryCodeHashResponse {
    #[prost(string, tag = "1")]
    pub code_hash: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Key {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
}

/// `cosmos.base.abci.v1beta1.TxMsgData`, as found hex encoded in `TxResponse.data`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxMsgData {
    #[prost(message, repeated, tag = "1")]
    pub data: Vec<MsgData>,
    #[prost(message, repeated, tag = "2")]
    pub msg_responses: Vec<::prost_types::Any>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgData {
    #[prost(string, tag = "1")]
    pub msg_type: String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgInstantiateContractResponse {
    #[prost(string, tag = "1")]
    pub address: String,
    /// encrypted
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgExecuteContractResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}
