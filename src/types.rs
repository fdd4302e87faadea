/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines common data structures to be used inside this library, or from outside application.
//!
//! Everything here is plain data: the transaction and block envelopes, and the per-block
//! context that is threaded through execution. The ledger entities themselves live in
//! [crate::world]. Timestamps are microseconds since the Unix epoch and only ever come from
//! a block header.

use std::collections::BTreeSet;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::script::Script;
use crate::value::Value;

/// Address is an opaque 32-byte identifier for accounts, assets and contracts. Equality and
/// ordering are byte-lexicographic.
pub type Address = [u8; 32];

/// 64-byte Ed25519 signature in its (R, S) wire encoding.
pub type SigBytes = [u8; 64];

/// Microseconds since the Unix epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    BorshSerialize, BorshDeserialize,
)]
pub struct Timestamp(pub i64);

/// A signed span of time in microseconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    BorshSerialize, BorshDeserialize,
)]
pub struct Timedelta(pub i64);

/// Transaction header. Exactly one of the three operation families.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum TxHeader {
    Account(TxAccount),
    Asset(TxAsset),
    Contract(TxContract),
}

/// Account operations.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum TxAccount {
    /// Register a new account. Self-signed: the signature verifies against the embedded
    /// public key, and the account address is derived from it.
    CreateAccount {
        public_key: Vec<u8>,
        timezone: String,
        metadata: Vec<(String, String)>,
    },
    /// Remove an existing account, unless it is a validator of the current block.
    RevokeAccount { address: Address },
}

/// Asset operations.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum TxAsset {
    /// Register a new asset at `address`, issued by the transaction origin. The full supply
    /// is initially held by the issuer.
    CreateAsset {
        address: Option<Address>,
        name: String,
        supply: i64,
        reference: Option<String>,
        asset_type: AssetType,
    },
    /// Move `amount` units of `asset` from the transaction origin to `to`.
    Transfer {
        asset: Address,
        to: Address,
        amount: i64,
    },
    /// Off-chain bind negotiation marker. Rejected by this core until its on-chain
    /// semantics are specified.
    Bind { asset: Address },
}

/// Contract operations.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum TxContract {
    /// Deploy a contract at `address`. The script arrives already parsed and typechecked.
    CreateContract { address: Address, script: Script },
    /// Invoke `method` on the contract at `address` with typechecked argument values.
    Call {
        address: Address,
        method: String,
        args: Vec<Value>,
    },
    /// Local-storage synchronisation marker. Rejected by this core until its semantics
    /// are specified.
    SyncLocal { address: Address },
}

/// Classification of an asset's units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AssetType {
    /// Indivisible integral units.
    Discrete,
    /// Units subdivided at a fixed decimal precision.
    Fractional(crate::value::FixedPrec),
    /// All-or-nothing holdings.
    Binary,
}

/// A signed ledger transaction.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    pub header: TxHeader,
    pub origin: Address,
    pub signature: SigBytes,
    pub timestamp: Timestamp,
}

/// Block header fields that are part of the block digest.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockHeader {
    pub index: u64,
    pub origin: Address,
    pub timestamp: Timestamp,
    pub prev_hash: [u8; 32],
}

/// A block: header, ordered transactions, and the authority signatures over the block digest.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub signatures: Vec<(SigBytes, Address)>,
}

impl Block {
    /// The validator set of this block: the accounts that signed it.
    pub fn validator_set(&self) -> BTreeSet<Address> {
        self.signatures.iter().map(|(_, signer)| *signer).collect()
    }
}

/// BlockData consists of the block-derived fields threaded through transaction execution.
/// It is the execution view of a [Block]: everything a transaction or a contract method may
/// observe about the block it is included in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockData {
    /// Height of the block
    pub number: u64,
    /// Address of the block proposer
    pub origin: Address,
    /// Block timestamp, the sole time source of the core
    pub timestamp: Timestamp,
    /// Digest of the previous block
    pub prev_hash: [u8; 32],
    /// Accounts that signed this block
    pub validator_set: BTreeSet<Address>,
}

impl From<&Block> for BlockData {
    fn from(block: &Block) -> Self {
        Self {
            number: block.header.index,
            origin: block.header.origin,
            timestamp: block.header.timestamp,
            prev_hash: block.header.prev_hash,
            validator_set: block.validator_set(),
        }
    }
}

impl BlockData {
    pub fn is_validator(&self, address: &Address) -> bool {
        self.validator_set.contains(address)
    }
}
