//! Signing identities.
//!
//! A [`LocalSigner`] is derived from a configured secp256k1 private key and
//! bound to the session's [`Provider`]. Without a key, signing is delegated
//! to the node's own account ([`Signer::Node`]).

use k256::ecdsa::{SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use std::fmt;

use super::provider::Provider;
use crate::domain::SessionError;

/// 20-byte Ethereum address.
pub type Address = [u8; 20];

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive Ethereum address from public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);

    // Keccak256 of the uncompressed key without its 0x04 prefix
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// `0x`-prefixed lowercase hex form of an address.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Key-holding signer bound to a provider.
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
    provider: Provider,
}

impl LocalSigner {
    /// Parse a hex private key (with or without `0x`).
    ///
    /// # Errors
    /// - `InvalidPrivateKey` if the text is not 32 bytes of hex or not a
    ///   valid secp256k1 scalar
    pub fn from_hex(private_key: &str, provider: Provider) -> Result<Self, SessionError> {
        let trimmed = private_key.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let bytes = hex::decode(digits)
            .map_err(|e| SessionError::InvalidPrivateKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(SessionError::InvalidPrivateKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| SessionError::InvalidPrivateKey("not a valid secp256k1 scalar".into()))?;
        let address = address_from_pubkey(key.verifying_key());

        Ok(Self {
            key,
            address,
            provider,
        })
    }

    /// Raw address.
    pub fn address_bytes(&self) -> Address {
        self.address
    }

    /// `0x`-prefixed address.
    pub fn address(&self) -> String {
        format_address(&self.address)
    }

    /// Provider this signer sends through.
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Sign `message` with the personal-message prefix
    /// (`"\x19Ethereum Signed Message:\n" + len`). Returns `r || s || v`
    /// with `v` in `{27, 28}`.
    pub fn sign_message(&self, message: &[u8]) -> Result<[u8; 65], SessionError> {
        let digest = personal_message_hash(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| SessionError::InvalidPrivateKey(e.to_string()))?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(out)
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Hash of a message under the personal-message prefix.
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut prefixed = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    prefixed.extend_from_slice(message);
    keccak256(&prefixed)
}

/// Who signs for the session.
#[derive(Clone, Debug)]
pub enum Signer {
    /// A configured private key.
    Local(std::sync::Arc<LocalSigner>),
    /// The node, on behalf of its default account.
    Node {
        /// Account the node signs for.
        account: String,
        /// Provider the requests go through.
        provider: Provider,
    },
}

impl Signer {
    /// Address this signer acts for.
    pub fn address(&self) -> String {
        match self {
            Signer::Local(local) => local.address(),
            Signer::Node { account, .. } => account.clone(),
        }
    }
}
