//! Outer and inner transaction models.
//!
//! Outer transactions arrive as raw signed legacy RLP from clients. Inner
//! transactions are legacy transactions addressed to the execution manager and
//! signed by the node wallet. Both hashes are Keccak-256 over the exact raw bytes.

use rlp::{DecoderError, Rlp, RlpStream};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1};
use sha3::{Digest, Keccak256};

use super::error::TranslationError;
use super::types::{Address, Hash, U256};

/// Maximum accepted raw transaction size (128 KB)
pub const MAX_TX_SIZE: usize = 128 * 1024;

/// secp256k1 half curve order, upper bound for `s` (EIP-2).
const HALF_N: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

pub fn keccak256(data: impl AsRef<[u8]>) -> Hash {
    Hash::from_slice(&Keccak256::digest(data.as_ref()))
}

/// Address of a public key: last 20 bytes of Keccak-256 over the uncompressed point.
pub fn public_key_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Unsigned body of a legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: U256,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
}

impl LegacyTransaction {
    fn append_body(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price.into_inner());
        stream.append(&self.gas_limit.into_inner());
        match &self.to {
            Some(to) => stream.append(to),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value.into_inner());
        stream.append(&self.data);
    }

    /// Hash that gets signed; EIP-155 when a chain id is given.
    pub fn signing_hash(&self, chain_id: Option<u64>) -> Hash {
        let mut stream = RlpStream::new_list(if chain_id.is_some() { 9 } else { 6 });
        self.append_body(&mut stream);
        if let Some(chain_id) = chain_id {
            stream.append(&chain_id);
            stream.append(&0u8);
            stream.append(&0u8);
        }
        keccak256(stream.as_raw())
    }

    /// Raw signed encoding: `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])`.
    pub fn encode_signed(&self, signature: &Signature) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&signature.v);
        stream.append(&primitive_types::U256::from_big_endian(
            signature.r.as_bytes(),
        ));
        stream.append(&primitive_types::U256::from_big_endian(
            signature.s.as_bytes(),
        ));
        stream.out().to_vec()
    }
}

/// ECDSA signature in legacy transaction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub v: u64,
    pub r: Hash,
    pub s: Hash,
}

impl Signature {
    /// Chain id encoded in `v`, if the signature is EIP-155.
    pub fn chain_id(&self) -> Option<u64> {
        if self.v >= 35 {
            Some((self.v - 35) / 2)
        } else {
            None
        }
    }

    fn recovery_id(&self) -> Result<i32, TranslationError> {
        match self.v {
            27 | 28 => Ok((self.v - 27) as i32),
            v if v >= 35 => Ok(((v - 35) % 2) as i32),
            v => Err(TranslationError::InvalidSignature(format!(
                "invalid v value {}",
                v
            ))),
        }
    }

    /// Recover the signer of `hash`.
    pub fn recover(&self, hash: &Hash) -> Result<Address, TranslationError> {
        if self.s.as_bytes() > &HALF_N[..] {
            return Err(TranslationError::InvalidSignature(
                "s value too high".to_string(),
            ));
        }

        let rec_id = RecoveryId::from_i32(self.recovery_id()?)
            .map_err(|e| TranslationError::InvalidSignature(e.to_string()))?;

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(self.r.as_bytes());
        compact[32..].copy_from_slice(self.s.as_bytes());
        let signature = RecoverableSignature::from_compact(&compact, rec_id)
            .map_err(|e| TranslationError::InvalidSignature(e.to_string()))?;

        let message = Message::from_digest(hash.to_fixed_bytes());
        let public_key = Secp256k1::verification_only()
            .recover_ecdsa(&message, &signature)
            .map_err(|e| TranslationError::InvalidSignature(e.to_string()))?;

        Ok(public_key_address(&public_key))
    }
}

/// A client-signed transaction as received on `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OuterTransaction {
    pub tx: LegacyTransaction,
    pub signature: Signature,
    pub sender: Address,
    hash: Hash,
    raw: Vec<u8>,
}

impl OuterTransaction {
    /// Decode and authenticate a raw signed legacy transaction.
    pub fn decode(raw: &[u8]) -> Result<Self, TranslationError> {
        let first = *raw.first().ok_or(TranslationError::Empty)?;
        if raw.len() > MAX_TX_SIZE {
            return Err(TranslationError::TooLarge {
                size: raw.len(),
                max: MAX_TX_SIZE,
            });
        }
        // EIP-2718 envelopes start below the RLP list prefix
        if first < 0xc0 {
            return Err(TranslationError::UnsupportedType(first));
        }

        let rlp = Rlp::new(raw);
        if !rlp.is_list() {
            return Err(TranslationError::InvalidRlp("expected a list".to_string()));
        }
        let encoded_len = rlp.payload_info().map_err(rlp_error)?.total();
        if encoded_len != raw.len() {
            return Err(TranslationError::InvalidRlp(format!(
                "encoded length {} does not match input length {}",
                encoded_len,
                raw.len()
            )));
        }
        match rlp.item_count().map_err(rlp_error)? {
            9 => {}
            6 => return Err(TranslationError::Unsigned),
            n => {
                return Err(TranslationError::InvalidRlp(format!(
                    "legacy transaction must have 9 fields, got {}",
                    n
                )))
            }
        }

        let tx = LegacyTransaction {
            nonce: rlp.val_at(0).map_err(rlp_error)?,
            gas_price: decode_u256(&rlp, 1)?,
            gas_limit: decode_u256(&rlp, 2)?,
            to: decode_optional_address(&rlp, 3)?,
            value: decode_u256(&rlp, 4)?,
            data: rlp.val_at(5).map_err(rlp_error)?,
        };
        let signature = Signature {
            v: rlp.val_at(6).map_err(rlp_error)?,
            r: decode_bytes32(&rlp, 7)?,
            s: decode_bytes32(&rlp, 8)?,
        };

        if signature.v == 0 || (signature.r.is_zero() && signature.s.is_zero()) {
            return Err(TranslationError::Unsigned);
        }
        if signature.r.is_zero() || signature.s.is_zero() {
            return Err(TranslationError::InvalidSignature(
                "r or s is zero".to_string(),
            ));
        }

        let sender = signature.recover(&tx.signing_hash(signature.chain_id()))?;

        Ok(Self {
            tx,
            signature,
            sender,
            hash: keccak256(raw),
            raw: raw.to_vec(),
        })
    }

    /// Keccak-256 of the raw bytes as received.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// Transaction the node wallet submits to the execution manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerTransaction {
    pub tx: LegacyTransaction,
    pub chain_id: u64,
}

/// Signed raw bytes together with their hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub hash: Hash,
}

impl SignedTransaction {
    pub fn new(raw: Vec<u8>) -> Self {
        let hash = keccak256(&raw);
        Self { raw, hash }
    }

    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}

fn decode_u256(rlp: &Rlp, index: usize) -> Result<U256, TranslationError> {
    let bytes: Vec<u8> = rlp.val_at(index).map_err(rlp_error)?;
    if bytes.len() > 32 {
        return Err(TranslationError::InvalidRlp(format!(
            "integer field {} too large: {} bytes",
            index,
            bytes.len()
        )));
    }
    Ok(U256(primitive_types::U256::from_big_endian(&bytes)))
}

fn decode_bytes32(rlp: &Rlp, index: usize) -> Result<Hash, TranslationError> {
    let bytes: Vec<u8> = rlp.val_at(index).map_err(rlp_error)?;
    if bytes.len() > 32 {
        return Err(TranslationError::InvalidRlp(format!(
            "bytes32 field {} too large: {} bytes",
            index,
            bytes.len()
        )));
    }
    let mut arr = [0u8; 32];
    arr[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(Hash::from(arr))
}

fn decode_optional_address(rlp: &Rlp, index: usize) -> Result<Option<Address>, TranslationError> {
    let bytes: Vec<u8> = rlp.val_at(index).map_err(rlp_error)?;
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(&bytes))),
        n => Err(TranslationError::InvalidRlp(format!(
            "invalid address length: {} bytes",
            n
        ))),
    }
}

fn rlp_error(e: DecoderError) -> TranslationError {
    TranslationError::InvalidRlp(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h256(s: &str) -> Hash {
        Hash::from_slice(&hex::decode(s).unwrap())
    }

    // EIP-155 reference transaction
    const EIP155_RAW: &str = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

    fn eip155_raw() -> Vec<u8> {
        hex::decode(EIP155_RAW).unwrap()
    }

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            keccak256(b""),
            h256("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn test_decode_eip155_reference() {
        let raw = eip155_raw();
        let outer = OuterTransaction::decode(&raw).unwrap();

        assert_eq!(outer.tx.nonce, 9);
        assert_eq!(outer.tx.gas_price, U256::from(20_000_000_000u64));
        assert_eq!(outer.tx.gas_limit, U256::from(21_000u64));
        assert_eq!(outer.tx.to, Some(Address::repeat_byte(0x35)));
        assert_eq!(outer.tx.value, U256::from(1_000_000_000_000_000_000u64));
        assert!(outer.tx.data.is_empty());
        assert_eq!(outer.signature.v, 37);
        assert_eq!(outer.signature.chain_id(), Some(1));
        assert_eq!(
            outer.tx.signing_hash(Some(1)),
            h256("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53")
        );
        assert_eq!(
            outer.sender,
            Address::from_slice(&hex::decode("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f").unwrap())
        );
        assert_eq!(outer.hash(), keccak256(&raw));
        assert_eq!(outer.raw(), &raw[..]);
    }

    #[test]
    fn test_signed_encoding_is_byte_exact() {
        let raw = eip155_raw();
        let outer = OuterTransaction::decode(&raw).unwrap();
        assert_eq!(outer.tx.encode_signed(&outer.signature), raw);
    }

    #[test]
    fn test_unsigned_forms_rejected() {
        let tx = LegacyTransaction {
            nonce: 0,
            gas_price: U256::ZERO,
            gas_limit: U256::from(21_000u64),
            to: Some(Address::repeat_byte(0x11)),
            value: U256::ZERO,
            data: vec![],
        };

        let mut stream = RlpStream::new_list(6);
        tx.append_body(&mut stream);
        assert_eq!(
            OuterTransaction::decode(&stream.out()),
            Err(TranslationError::Unsigned)
        );

        let zero_v = tx.encode_signed(&Signature {
            v: 0,
            r: Hash::repeat_byte(1),
            s: Hash::repeat_byte(1),
        });
        assert_eq!(
            OuterTransaction::decode(&zero_v),
            Err(TranslationError::Unsigned)
        );

        let eip155_unsigned = tx.encode_signed(&Signature {
            v: 108,
            r: Hash::zero(),
            s: Hash::zero(),
        });
        assert_eq!(
            OuterTransaction::decode(&eip155_unsigned),
            Err(TranslationError::Unsigned)
        );
    }

    #[test]
    fn test_typed_envelope_rejected() {
        assert_eq!(
            OuterTransaction::decode(&[0x02, 0xf8, 0x65]),
            Err(TranslationError::UnsupportedType(0x02))
        );
    }

    #[test]
    fn test_size_limits() {
        assert_eq!(OuterTransaction::decode(&[]), Err(TranslationError::Empty));
        let large = vec![0xf8; MAX_TX_SIZE + 1];
        assert!(matches!(
            OuterTransaction::decode(&large),
            Err(TranslationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_garbage_is_invalid_rlp() {
        assert!(matches!(
            OuterTransaction::decode(&[0xc3, 0x01, 0x02]),
            Err(TranslationError::InvalidRlp(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut raw = eip155_raw();
        raw.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(
            OuterTransaction::decode(&raw),
            Err(TranslationError::InvalidRlp(_))
        ));

        let mut truncated = eip155_raw();
        truncated.pop();
        assert!(matches!(
            OuterTransaction::decode(&truncated),
            Err(TranslationError::InvalidRlp(_))
        ));
    }

    #[test]
    fn test_high_s_rejected() {
        let raw = eip155_raw();
        let outer = OuterTransaction::decode(&raw).unwrap();
        let mut signature = outer.signature;
        signature.s = Hash::repeat_byte(0xff);
        assert!(matches!(
            signature.recover(&outer.tx.signing_hash(Some(1))),
            Err(TranslationError::InvalidSignature(_))
        ));
    }
}
