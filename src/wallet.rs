use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use cosmrs::{
    crypto::{secp256k1::SigningKey, PublicKey},
    tx::{Raw, SignDoc},
    AccountId,
};
use rand::{rngs::OsRng, RngCore};

use crate::chain::{ACCOUNT_PREFIX, COIN_TYPE};
use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct Wallet {
    pub private_key: Vec<u8>,
    pub public_key: PublicKey,
    pub account_id: AccountId,
}

impl Wallet {
    /// Raw secp256k1 key, hex encoded.
    pub fn from_private_key_hex(private_key: &str) -> Result<Self> {
        let private_key = hex::decode(private_key.trim_start_matches("0x")).map_err(|e| {
            ClientError::SigningError(format!("Invalid private key hex format: {}", e))
        })?;

        Self::from_private_key(private_key)
    }

    /// Derives the first account (`m/44'/529'/0'/0/0`) of a 12 to 24 word BIP-39 phrase.
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        Self::from_seed(&mnemonic_seed(phrase)?)
    }

    /// Fresh wallet backed by a random 24-word mnemonic. Returns the phrase alongside.
    pub fn random() -> Result<(Self, String)> {
        let mut entropy = [0u8; 32];
        OsRng.fill_bytes(&mut entropy);

        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
            .map_err(|e| ClientError::SigningError(format!("Failed to generate mnemonic: {}", e)))?;
        let wallet = Self::from_seed(&mnemonic.to_seed_normalized(""))?;
        Ok((wallet, mnemonic.to_string()))
    }

    fn from_seed(seed: &[u8]) -> Result<Self> {
        let path: DerivationPath = format!("m/44'/{}'/0'/0/0", COIN_TYPE)
            .parse()
            .map_err(|e| ClientError::SigningError(format!("Invalid derivation path: {}", e)))?;

        let xprv = XPrv::derive_from_path(seed, &path)
            .map_err(|e| ClientError::SigningError(format!("Failed to derive key: {}", e)))?;

        Self::from_private_key(xprv.to_bytes().to_vec())
    }

    fn from_private_key(private_key: Vec<u8>) -> Result<Self> {
        let signing_key = SigningKey::from_slice(&private_key)
            .map_err(|e| ClientError::SigningError(format!("Failed to parse signing key: {}", e)))?;

        let public_key = signing_key.public_key();
        let account_id = public_key.account_id(ACCOUNT_PREFIX).map_err(|e| {
            ClientError::SigningError(format!("Failed to generate account ID: {}", e))
        })?;

        Ok(Self {
            private_key,
            public_key,
            account_id,
        })
    }

    pub fn address(&self) -> String {
        self.account_id.to_string()
    }

    pub fn sign(&self, sign_doc: SignDoc) -> Result<Raw> {
        let signing_key = SigningKey::from_slice(&self.private_key)
            .map_err(|e| ClientError::SigningError(format!("Failed to parse signing key: {}", e)))?;

        sign_doc
            .sign(&signing_key)
            .map_err(|e| ClientError::SigningError(format!("Failed to sign transaction: {}", e)))
    }
}

/// BIP-39 seed of an English phrase, without passphrase.
fn mnemonic_seed(phrase: &str) -> Result<[u8; 64]> {
    let words = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, &words)
        .map_err(|e| ClientError::SigningError(format!("Invalid mnemonic: {}", e)))?;

    Ok(mnemonic.to_seed_normalized(""))
}
