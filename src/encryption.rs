//! Contract message encryption for Secret Network.
//!
//! Every init, execute and query message sent to a contract is sealed with a key
//! shared between the sender and the chain's enclave:
//!
//! * x25519 agreement between the sender's key pair and the consensus IO public key,
//! * HKDF-SHA256 over `shared_secret || nonce` with a fixed network salt,
//! * AES-128-SIV (256-bit key) with one empty associated-data item.
//!
//! On the wire a message is `nonce (32) || sender pubkey (32) || ciphertext`, where the
//! plaintext is the hex code hash of the target contract followed by the JSON message.

use aes_siv::{siv::Aes128Siv, KeyInit};
use async_trait::async_trait;
use hkdf::Hkdf;
use rand::RngCore;
use serde::Serialize;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{ClientError, Result};

pub const NONCE_LEN: usize = 32;
pub const PUBKEY_LEN: usize = 32;

const HKDF_SALT: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x4b, 0xea, 0xd8, 0xdf, 0x69, 0x99,
    0x08, 0x52, 0xc2, 0x02, 0xdb, 0x0e, 0x00, 0x97, 0xc1, 0xa1, 0x2e, 0xa6, 0x37, 0xd7, 0xe9, 0x6d,
];

#[async_trait]
pub trait EncryptionUtils: Send + Sync {
    async fn pubkey(&self) -> Result<[u8; PUBKEY_LEN]>;

    /// Seals `msg` for the contract with the given code hash.
    async fn encrypt(&self, code_hash: &str, msg: &serde_json::Value) -> Result<Vec<u8>>;

    /// Opens a ciphertext returned by the chain for a message sent with `nonce`.
    async fn decrypt(&self, ciphertext: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>>;
}

/// Local implementation of the enclave key exchange.
#[derive(Clone)]
pub struct EnigmaUtils {
    secret: StaticSecret,
    pubkey: PublicKey,
    consensus_io_pubkey: PublicKey,
}

impl EnigmaUtils {
    /// Uses a random seed unless one is given. A fixed seed lets a caller decrypt
    /// transactions it sent in an earlier session.
    pub fn new(consensus_io_pubkey: [u8; PUBKEY_LEN], seed: Option<[u8; 32]>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed);
            seed
        });

        let secret = StaticSecret::from(seed);
        let pubkey = PublicKey::from(&secret);

        Self {
            secret,
            pubkey,
            consensus_io_pubkey: PublicKey::from(consensus_io_pubkey),
        }
    }

    /// Accepts the raw bytes returned by the registration `TxKey` query.
    pub fn from_tx_key(tx_key: &[u8], seed: Option<[u8; 32]>) -> Result<Self> {
        let key: [u8; PUBKEY_LEN] = tx_key.try_into().map_err(|_| {
            ClientError::EncryptionError(format!(
                "Consensus IO public key must be {} bytes, got {}",
                PUBKEY_LEN,
                tx_key.len()
            ))
        })?;
        Ok(Self::new(key, seed))
    }

    pub fn public_key(&self) -> [u8; PUBKEY_LEN] {
        self.pubkey.to_bytes()
    }

    fn tx_encryption_key(&self, nonce: &[u8; NONCE_LEN]) -> Result<[u8; 32]> {
        let shared = self.secret.diffie_hellman(&self.consensus_io_pubkey);

        let mut ikm = Vec::with_capacity(32 + NONCE_LEN);
        ikm.extend_from_slice(shared.as_bytes());
        ikm.extend_from_slice(nonce);

        let mut key = [0u8; 32];
        Hkdf::<Sha256>::new(Some(&HKDF_SALT[..]), &ikm)
            .expand(&[], &mut key)
            .map_err(|e| ClientError::EncryptionError(format!("Key derivation failed: {}", e)))?;
        Ok(key)
    }

    fn cipher(&self, nonce: &[u8; NONCE_LEN]) -> Result<Aes128Siv> {
        let key = self.tx_encryption_key(nonce)?;
        Aes128Siv::new_from_slice(&key)
            .map_err(|e| ClientError::EncryptionError(format!("Invalid SIV key: {}", e)))
    }

    /// Same as [`EncryptionUtils::encrypt`] with a caller-chosen nonce.
    pub fn encrypt_with_nonce<T: Serialize + ?Sized>(
        &self,
        code_hash: &str,
        msg: &T,
        nonce: [u8; NONCE_LEN],
    ) -> Result<Vec<u8>> {
        let mut plaintext = code_hash.as_bytes().to_vec();
        plaintext.extend(serde_json::to_vec(msg)?);

        let ciphertext = self
            .cipher(&nonce)?
            .encrypt([&[] as &[u8]], &plaintext)
            .map_err(|e| ClientError::EncryptionError(format!("Encryption failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + PUBKEY_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(self.pubkey.as_bytes());
        sealed.extend(ciphertext);
        Ok(sealed)
    }

    pub fn decrypt_with_nonce(&self, ciphertext: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() {
            return Ok(Vec::new());
        }

        self.cipher(nonce)?
            .decrypt([&[] as &[u8]], ciphertext)
            .map_err(|e| ClientError::EncryptionError(format!("Decryption failed: {}", e)))
    }
}

#[async_trait]
impl EncryptionUtils for EnigmaUtils {
    async fn pubkey(&self) -> Result<[u8; PUBKEY_LEN]> {
        Ok(self.public_key())
    }

    async fn encrypt(&self, code_hash: &str, msg: &serde_json::Value) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce);
        self.encrypt_with_nonce(code_hash, msg, nonce)
    }

    async fn decrypt(&self, ciphertext: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>> {
        self.decrypt_with_nonce(ciphertext, nonce)
    }
}

/// Nonce prefix of a sealed message.
pub fn nonce_of(sealed: &[u8]) -> Result<[u8; NONCE_LEN]> {
    sealed
        .get(..NONCE_LEN)
        .and_then(|nonce| nonce.try_into().ok())
        .ok_or_else(|| ClientError::EncryptionError("Sealed message is too short".to_string()))
}

/// Contract errors come back as `... encrypted: <base64>: ...`. Returns the
/// decrypted text, or `None` when the message holds no encrypted part.
pub async fn decrypt_error_message(
    utils: &dyn EncryptionUtils,
    message: &str,
    nonce: &[u8; NONCE_LEN],
) -> Option<String> {
    use base64::Engine;

    let start = message.find("encrypted: ")? + "encrypted: ".len();
    let encoded = message[start..]
        .split(|c: char| c == ':' || c.is_whitespace())
        .next()?;
    let ciphertext = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let plaintext = utils.decrypt(&ciphertext, nonce).await.ok()?;
    String::from_utf8(plaintext).ok()
}
