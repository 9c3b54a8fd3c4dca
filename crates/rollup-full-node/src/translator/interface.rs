//! The execution manager's contract interface.
//!
//! Calls and events are generated by `sol!`; the helpers convert between the
//! node's wire types and the ABI's.

use alloy_primitives::{Address as SolAddress, B256, U256 as SolU256};
use alloy_sol_types::sol;

use crate::domain::types::{Address, Hash, U256};

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IExecutionManager {
        function executeUnsignedEOACall(
            uint256 timestamp,
            uint256 queueOrigin,
            address ovmEntrypoint,
            bytes callBytes,
            address fromAddress
        ) external;

        function executeEOACall(
            uint256 timestamp,
            uint256 queueOrigin,
            uint256 nonce,
            address ovmEntrypoint,
            bytes callBytes,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external;

        function getCodeContractAddress(address ovmContractAddress) external view returns (address);
        function getOvmContractNonce(address ovmContractAddress) external view returns (uint256);
        function mapOvmTransactionHashToInternalTransactionHash(bytes32 ovmTxHash, bytes32 internalTxHash) external;
        function getInternalTransactionHash(bytes32 ovmTxHash) external view returns (bytes32);
        function incrementNonce(address eoa) external;

        event ActiveContract(address activeContract);
        event CreatedContract(address ovmContractAddress, address codeContractAddress, bytes32 codeContractHash);
        event EOACallRevert(bytes revertMessage);
    }
}

pub fn to_sol_address(address: Address) -> SolAddress {
    SolAddress::from(address.0)
}

pub fn from_sol_address(address: SolAddress) -> Address {
    Address::from(address.into_array())
}

pub fn to_word(hash: Hash) -> B256 {
    B256::from(hash.0)
}

pub fn from_word(word: B256) -> Hash {
    Hash::from(word.0)
}

pub fn from_sol_uint(value: SolU256) -> U256 {
    U256(primitive_types::U256::from_big_endian(
        &value.to_be_bytes::<32>(),
    ))
}
