use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Argon2id parameters for key derivation.
/// Stored alongside each sealed secret so they can be raised later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65536 = 64 MB)
    pub memory_cost: u32,
    /// Number of iterations (default: 3)
    pub time_cost: u32,
    /// Degree of parallelism (default: 4)
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// A credential encrypted at rest (e.g., a store API key kept in user settings).
///
/// Serializable so the settings layer can persist it as JSON; the plaintext
/// only ever lives in a [`SecretCache`](super::secret_cache::SecretCache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    /// Ciphertext with the 16-byte GCM tag appended
    pub ciphertext: Vec<u8>,
}

impl SealedSecret {
    /// Encrypt `plaintext` under a key derived from `password`, with a fresh salt and nonce.
    pub fn seal(plaintext: &str, password: &str, kdf_params: KdfParams) -> Result<Self, CoreError> {
        let salt = generate_salt()?;
        let nonce = generate_nonce()?;
        let key = derive_key(password, &salt, &kdf_params)?;
        let ciphertext = encrypt(plaintext.as_bytes(), &key, &nonce)?;
        Ok(Self {
            kdf_params,
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt back to the plaintext string.
    /// Returns `CoreError::Decryption` for a wrong password or tampered data.
    pub fn open(&self, password: &str) -> Result<String, CoreError> {
        let key = derive_key(password, &self.salt, &self.kdf_params)?;
        let plaintext = decrypt(&self.ciphertext, &key, &self.nonce)?;
        String::from_utf8(plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Secret is not valid UTF-8: {e}")))
    }
}

/// Derive a 256-bit encryption key from a password using Argon2id.
pub fn derive_key(password: &str, salt: &[u8; 16], params: &KdfParams) -> Result<[u8; 32], CoreError> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32), // output length = 256 bits
    )
    .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;

    Ok(key)
}

/// Encrypt plaintext using AES-256-GCM; the authentication tag is appended.
pub fn encrypt(plaintext: &[u8], key: &[u8; 32], nonce: &[u8; 12]) -> Result<Vec<u8>, CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
    let nonce = Nonce::from_slice(nonce);

    cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))
}

/// Decrypt AES-256-GCM ciphertext, verifying the tag.
pub fn decrypt(ciphertext: &[u8], key: &[u8; 32], nonce: &[u8; 12]) -> Result<Vec<u8>, CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
    let nonce = Nonce::from_slice(nonce);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CoreError::Decryption)
}

fn generate_salt() -> Result<[u8; 16], CoreError> {
    let mut salt = [0u8; 16];
    getrandom::getrandom(&mut salt)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random salt: {e}")))?;
    Ok(salt)
}

fn generate_nonce() -> Result<[u8; 12], CoreError> {
    let mut nonce = [0u8; 12];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random nonce: {e}")))?;
    Ok(nonce)
}
