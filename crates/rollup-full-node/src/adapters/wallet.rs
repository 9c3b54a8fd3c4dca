//! Node wallet: the key that signs every inner transaction.

use secp256k1::{All, Message, Secp256k1, SecretKey};

use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::transaction::{
    public_key_address, InnerTransaction, SignedTransaction, Signature,
};
use crate::domain::types::{Address, Hash};
use crate::ports::TransactionSigner;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("private key is not valid hex")]
    InvalidHex,
    #[error("invalid private key: {0}")]
    InvalidKey(String),
}

/// In-process secp256k1 key producing EIP-155 legacy signatures.
#[derive(Clone)]
pub struct LocalWallet {
    secp: Secp256k1<All>,
    secret: SecretKey,
    address: Address,
}

impl LocalWallet {
    pub fn from_secret(secret: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let address = public_key_address(&secret.public_key(&secp));
        Self {
            secp,
            secret,
            address,
        }
    }

    /// Parse a `0x`-optional hex private key.
    pub fn from_hex(key: &str) -> Result<Self, WalletError> {
        let key = key.trim();
        let bytes = hex::decode(key.strip_prefix("0x").unwrap_or(key))
            .map_err(|_| WalletError::InvalidHex)?;
        let secret =
            SecretKey::from_slice(&bytes).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self::from_secret(secret))
    }

    /// Deterministic (RFC 6979), low-s signature over `hash`.
    fn sign_hash(&self, hash: &Hash, chain_id: u64) -> GatewayResult<Signature> {
        let message = Message::from_digest(hash.to_fixed_bytes());
        let (rec_id, compact) = self
            .secp
            .sign_ecdsa_recoverable(&message, &self.secret)
            .serialize_compact();

        let v = chain_id
            .checked_mul(2)
            .and_then(|c| c.checked_add(35 + rec_id.to_i32() as u64))
            .ok_or_else(|| GatewayError::Signer(format!("chain id {} too large", chain_id)))?;

        Ok(Signature {
            v,
            r: Hash::from_slice(&compact[..32]),
            s: Hash::from_slice(&compact[32..]),
        })
    }
}

impl TransactionSigner for LocalWallet {
    fn address(&self) -> Address {
        self.address
    }

    fn sign(&self, tx: &InnerTransaction) -> GatewayResult<SignedTransaction> {
        let hash = tx.tx.signing_hash(Some(tx.chain_id));
        let signature = self.sign_hash(&hash, tx.chain_id)?;
        Ok(SignedTransaction::new(tx.tx.encode_signed(&signature)))
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
