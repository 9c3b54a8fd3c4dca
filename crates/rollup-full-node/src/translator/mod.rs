//! Outer → inner transaction translation.
//!
//! Every client interaction becomes a call into the execution manager. Reads
//! are wrapped in `executeUnsignedEOACall`; signed transactions are wrapped in
//! `executeEOACall`, carrying the client's signature so the execution manager
//! can recover the sender itself.

pub mod interface;

use alloy_primitives::U256 as SolU256;
use alloy_sol_types::SolCall;

use crate::domain::error::TranslationError;
use crate::domain::transaction::{InnerTransaction, LegacyTransaction, OuterTransaction, Signature};
use crate::domain::types::{Address, U256 as Quantity};
use interface::{to_sol_address, to_word, IExecutionManager};

/// Timestamp passed for client-originated calls.
pub const CLIENT_TIMESTAMP: u64 = 0;
/// Queue origin of client-originated calls.
pub const CLIENT_QUEUE_ORIGIN: u64 = 0;

/// Builds execution-manager call data and inner transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionTranslator {
    execution_manager: Address,
    chain_id: u64,
}

impl TransactionTranslator {
    pub fn new(execution_manager: Address, chain_id: u64) -> Self {
        Self {
            execution_manager,
            chain_id,
        }
    }

    pub fn execution_manager(&self) -> Address {
        self.execution_manager
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Call data for a read-only call. A missing entrypoint becomes the zero
    /// address, which the execution manager treats as contract creation.
    pub fn encode_unsigned_call(
        &self,
        timestamp: u64,
        queue_origin: u64,
        entrypoint: Option<Address>,
        data: &[u8],
        from: Address,
    ) -> Vec<u8> {
        IExecutionManager::executeUnsignedEOACallCall {
            timestamp: SolU256::from(timestamp),
            queueOrigin: SolU256::from(queue_origin),
            ovmEntrypoint: to_sol_address(entrypoint.unwrap_or_else(Address::zero)),
            callBytes: data.to_vec().into(),
            fromAddress: to_sol_address(from),
        }
        .abi_encode()
    }

    /// Call data for a state-changing invocation carrying the outer signature.
    pub fn encode_signed_call(
        &self,
        timestamp: u64,
        queue_origin: u64,
        nonce: u64,
        entrypoint: Option<Address>,
        data: &[u8],
        signature: &Signature,
    ) -> Result<Vec<u8>, TranslationError> {
        let v = u8::try_from(signature.v).map_err(|_| TranslationError::OutOfRange { field: "v" })?;
        Ok(IExecutionManager::executeEOACallCall {
            timestamp: SolU256::from(timestamp),
            queueOrigin: SolU256::from(queue_origin),
            nonce: SolU256::from(nonce),
            ovmEntrypoint: to_sol_address(entrypoint.unwrap_or_else(Address::zero)),
            callBytes: data.to_vec().into(),
            v,
            r: to_word(signature.r),
            s: to_word(signature.s),
        }
        .abi_encode())
    }

    /// Decode a raw client transaction.
    ///
    /// The zero address is only ever produced by normalizing a missing
    /// destination, so an explicit zero destination is refused.
    pub fn decode_outer_transaction(&self, raw: &[u8]) -> Result<OuterTransaction, TranslationError> {
        let outer = OuterTransaction::decode(raw)?;
        if outer.tx.to == Some(Address::zero()) {
            return Err(TranslationError::ZeroAddressDestination);
        }
        Ok(outer)
    }

    /// Wrap an outer transaction for submission by the node wallet.
    ///
    /// `signer_count` is the wallet's current transaction count; the inner
    /// nonce skips one slot for the hash-mapping write that precedes it.
    pub fn build_inner_transaction(
        &self,
        outer: &OuterTransaction,
        signer_count: u64,
    ) -> Result<InnerTransaction, TranslationError> {
        if outer.tx.to == Some(Address::zero()) {
            return Err(TranslationError::ZeroAddressDestination);
        }
        let nonce = signer_count
            .checked_add(1)
            .ok_or(TranslationError::OutOfRange { field: "nonce" })?;

        let data = self.encode_signed_call(
            CLIENT_TIMESTAMP,
            CLIENT_QUEUE_ORIGIN,
            outer.tx.nonce,
            outer.tx.to,
            &outer.tx.data,
            &outer.signature,
        )?;

        Ok(InnerTransaction {
            tx: LegacyTransaction {
                nonce,
                gas_price: Quantity::ZERO,
                gas_limit: outer.tx.gas_limit,
                to: Some(self.execution_manager),
                value: Quantity::ZERO,
                data,
            },
            chain_id: self.chain_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::interface::{from_sol_address, from_word};
    use super::*;
    use IExecutionManager::{executeEOACallCall, executeUnsignedEOACallCall};
    use crate::domain::transaction::keccak256;
    use secp256k1::{Message, Secp256k1, SecretKey};

    const EM: [u8; 20] = [0xe1; 20];

    fn translator() -> TransactionTranslator {
        TransactionTranslator::new(Address::from(EM), 108)
    }

    fn sign(tx: &LegacyTransaction, chain_id: u64) -> Vec<u8> {
        let secp = Secp256k1::new();
        let key = SecretKey::from_slice(&[0x60; 32]).unwrap();
        let hash = tx.signing_hash(Some(chain_id));
        let (rec_id, compact) = secp
            .sign_ecdsa_recoverable(&Message::from_digest(hash.to_fixed_bytes()), &key)
            .serialize_compact();
        let signature = Signature {
            v: rec_id.to_i32() as u64 + chain_id * 2 + 35,
            r: crate::domain::types::Hash::from_slice(&compact[..32]),
            s: crate::domain::types::Hash::from_slice(&compact[32..]),
        };
        tx.encode_signed(&signature)
    }

    fn outer_tx(to: Option<Address>) -> LegacyTransaction {
        LegacyTransaction {
            nonce: 3,
            gas_price: Quantity::ZERO,
            gas_limit: Quantity::from(500_000u64),
            to,
            value: Quantity::ZERO,
            data: vec![0xde, 0xad],
        }
    }

    #[test]
    fn test_unsigned_call_normalizes_missing_entrypoint() {
        let from = Address::repeat_byte(0x0f);
        let data = translator().encode_unsigned_call(0, 0, None, &[1, 2, 3], from);
        let call = executeUnsignedEOACallCall::abi_decode(&data).unwrap();
        assert_eq!(call.timestamp, SolU256::ZERO);
        assert_eq!(from_sol_address(call.ovmEntrypoint), Address::zero());
        assert_eq!(&call.callBytes[..], &[1u8, 2, 3][..]);
        assert_eq!(from_sol_address(call.fromAddress), from);
    }

    #[test]
    fn test_unsigned_call_is_deterministic() {
        let t = translator();
        let to = Some(Address::repeat_byte(0x42));
        assert_eq!(
            t.encode_unsigned_call(0, 0, to, b"abc", Address::zero()),
            t.encode_unsigned_call(0, 0, to, b"abc", Address::zero())
        );
    }

    #[test]
    fn test_signed_call_rejects_wide_v() {
        let signature = Signature {
            v: 256,
            r: Default::default(),
            s: Default::default(),
        };
        assert_eq!(
            translator().encode_signed_call(0, 0, 0, None, &[], &signature),
            Err(TranslationError::OutOfRange { field: "v" })
        );
    }

    #[test]
    fn test_build_inner_transaction() {
        let t = translator();
        let entrypoint = Address::repeat_byte(0x42);
        let raw = sign(&outer_tx(Some(entrypoint)), 108);
        let outer = t.decode_outer_transaction(&raw).unwrap();
        assert_eq!(outer.hash(), keccak256(&raw));

        let inner = t.build_inner_transaction(&outer, 7).unwrap();
        assert_eq!(inner.tx.nonce, 8);
        assert_eq!(inner.tx.gas_price, Quantity::ZERO);
        assert_eq!(inner.tx.value, Quantity::ZERO);
        assert_eq!(inner.tx.gas_limit, Quantity::from(500_000u64));
        assert_eq!(inner.tx.to, Some(Address::from(EM)));
        assert_eq!(inner.chain_id, 108);

        let call = executeEOACallCall::abi_decode(&inner.tx.data).unwrap();
        assert_eq!(call.timestamp, SolU256::ZERO);
        assert_eq!(call.queueOrigin, SolU256::ZERO);
        assert_eq!(call.nonce, SolU256::from(3u64));
        assert_eq!(from_sol_address(call.ovmEntrypoint), entrypoint);
        assert_eq!(&call.callBytes[..], &[0xdeu8, 0xad][..]);
        assert_eq!(u64::from(call.v), outer.signature.v);
        assert_eq!(from_word(call.r), outer.signature.r);
        assert_eq!(from_word(call.s), outer.signature.s);

        // same input, same output
        assert_eq!(t.build_inner_transaction(&outer, 7).unwrap(), inner);
    }

    #[test]
    fn test_contract_creation_uses_zero_entrypoint() {
        let t = translator();
        let outer = t.decode_outer_transaction(&sign(&outer_tx(None), 108)).unwrap();
        let inner = t.build_inner_transaction(&outer, 0).unwrap();
        let call = executeEOACallCall::abi_decode(&inner.tx.data).unwrap();
        assert_eq!(from_sol_address(call.ovmEntrypoint), Address::zero());
    }

    #[test]
    fn test_explicit_zero_destination_rejected() {
        let raw = sign(&outer_tx(Some(Address::zero())), 108);
        assert_eq!(
            translator().decode_outer_transaction(&raw),
            Err(TranslationError::ZeroAddressDestination)
        );
    }
}
