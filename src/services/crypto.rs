use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use ring::{aead, pbkdf2, rand::{SecureRandom, SystemRandom}};
use std::num::NonZeroU32;

const KEYCHAIN_SERVICE: &str = "stockroom";
const KEYCHAIN_PREFIX: &str = "keychain:";
const SEALED_PREFIX: &str = "enc:";
const APP_SECRET: &[u8] = b"stockroom-session-v1";
const PBKDF2_ITERATIONS: u32 = 100_000;
const NONCE_LEN: usize = 12;
const SALT_LEN: usize = 16;

pub struct CryptoService;

impl CryptoService {
    /// Returns the value to persist: a keychain reference, or an `enc:` payload.
    pub fn seal(secret: &str, account: &str, use_keychain: bool) -> Result<String> {
        if use_keychain {
            match Self::store_in_keychain(secret, account) {
                Ok(reference) => return Ok(reference),
                Err(err) => tracing::warn!("keychain unavailable, sealing locally: {}", err),
            }
        }
        Self::encrypt_symmetric(secret)
    }

    pub fn unseal(stored: &str) -> Result<String> {
        if let Some(account) = keychain_account(stored) {
            return Self::retrieve_from_keychain(account);
        }
        if stored.starts_with(SEALED_PREFIX) {
            return Self::decrypt_symmetric(stored);
        }
        Err(anyhow!("Unknown sealed format"))
    }

    pub fn forget(stored: &str) -> Result<()> {
        let Some(account) = keychain_account(stored) else {
            return Ok(());
        };
        keyring::Entry::new(KEYCHAIN_SERVICE, account)
            .map_err(|e| anyhow!("Keychain error: {}", e))?
            .delete_password()
            .map_err(|e| anyhow!("Keychain delete error: {}", e))
    }

    fn store_in_keychain(secret: &str, account: &str) -> Result<String> {
        keyring::Entry::new(KEYCHAIN_SERVICE, account)
            .map_err(|e| anyhow!("Keychain error: {}", e))?
            .set_password(secret)
            .map_err(|e| anyhow!("Keychain store error: {}", e))?;
        Ok(format!("{}{}:{}", KEYCHAIN_PREFIX, KEYCHAIN_SERVICE, account))
    }

    fn retrieve_from_keychain(account: &str) -> Result<String> {
        keyring::Entry::new(KEYCHAIN_SERVICE, account)
            .map_err(|e| anyhow!("Keychain error: {}", e))?
            .get_password()
            .map_err(|e| anyhow!("Keychain fetch error: {}", e))
    }

    fn encrypt_symmetric(plaintext: &str) -> Result<String> {
        let rng = SystemRandom::new();
        let mut salt = [0u8; SALT_LEN];
        rng.fill(&mut salt)
            .map_err(|_| anyhow!("Failed to generate salt"))?;

        let key = derive_key(&salt)?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill(&mut nonce_bytes)
            .map_err(|_| anyhow!("Failed to generate nonce"))?;

        let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);
        let mut in_out = plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(nonce, aead::Aad::empty(), &mut in_out)
            .map_err(|_| anyhow!("Encryption failed"))?;

        Ok(format!(
            "{}{}:{}:{}",
            SEALED_PREFIX,
            general_purpose::STANDARD.encode(salt),
            general_purpose::STANDARD.encode(nonce_bytes),
            general_purpose::STANDARD.encode(in_out)
        ))
    }

    fn decrypt_symmetric(sealed: &str) -> Result<String> {
        let parts: Vec<&str> = sealed.split(':').collect();
        if parts.len() != 4 {
            return Err(anyhow!("Invalid sealed payload"));
        }
        let salt = general_purpose::STANDARD
            .decode(parts[1])
            .map_err(|e| anyhow!("Decode salt: {}", e))?;
        let nonce_bytes = general_purpose::STANDARD
            .decode(parts[2])
            .map_err(|e| anyhow!("Decode nonce: {}", e))?;
        let mut data = general_purpose::STANDARD
            .decode(parts[3])
            .map_err(|e| anyhow!("Decode ciphertext: {}", e))?;

        let key = derive_key(&salt)?;
        let nonce = aead::Nonce::assume_unique_for_key(
            nonce_bytes
                .as_slice()
                .try_into()
                .map_err(|_| anyhow!("Invalid nonce length"))?,
        );

        let decrypted = key
            .open_in_place(nonce, aead::Aad::empty(), &mut data)
            .map_err(|_| anyhow!("Decryption failed"))?;
        Ok(String::from_utf8(decrypted.to_vec())?)
    }
}

fn keychain_account(stored: &str) -> Option<&str> {
    stored
        .strip_prefix(KEYCHAIN_PREFIX)?
        .strip_prefix(KEYCHAIN_SERVICE)?
        .strip_prefix(':')
        .filter(|account| !account.is_empty())
}

fn derive_key(salt: &[u8]) -> Result<aead::LessSafeKey> {
    let mut key_bytes = [0u8; 32];
    let iterations = NonZeroU32::new(PBKDF2_ITERATIONS).ok_or_else(|| anyhow!("Invalid iterations"))?;
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        APP_SECRET,
        &mut key_bytes,
    );
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, &key_bytes)
        .map_err(|_| anyhow!("Invalid key material"))?;
    Ok(aead::LessSafeKey::new(unbound))
}
