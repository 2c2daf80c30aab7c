pub mod chain;
pub mod client;
pub mod config;
pub mod encryption;
pub mod error;
pub mod manifest;
pub(crate) mod proto;
pub mod snip20;
pub mod transactions;
pub mod wallet;
pub use client::{ClientBuilder, CreateClientResult, SecretClient};
pub use error::{ClientError, Result};
pub use manifest::{ContractManifest, ManifestStore};
pub use wallet::Wallet;
