/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! error defines sets of error definitions in entire life time of state transitions.
//!
//! The taxonomy is a closed set: block-level failures ([InvalidBlock]) from the verify phase,
//! per-transaction failures ([InvalidTransaction]) collected during the validate phase, and
//! evaluator failures ([EvalFail]) that abort a single method call. [WorldError] feeds the
//! header-level causes through `From` conversions; nothing in here is stringly typed.

use thiserror::Error;

use crate::types::{Address, TxHeader};

/// Failures of the pure [World](crate::world::World) transitions. A failed transition never
/// partially mutates the world.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The address already names an account, asset or contract.
    #[error("address {} already names an entity", hex::encode(.0))]
    AddressCollision(Address),

    /// No account is registered at the address.
    #[error("no account at {}", hex::encode(.0))]
    AccountNotFound(Address),

    /// No asset is registered at the address.
    #[error("no asset at {}", hex::encode(.0))]
    AssetNotFound(Address),

    /// No contract is registered at the address.
    #[error("no contract at {}", hex::encode(.0))]
    ContractNotFound(Address),

    /// Transfer amount is negative.
    #[error("negative transfer of {amount} on asset {}", hex::encode(.asset))]
    NegativeTransferAmount { asset: Address, amount: i64 },

    /// The source holder does not hold enough units.
    #[error(
        "holder {} of asset {} has {balance} units, transfer needs {amount}",
        hex::encode(.holder), hex::encode(.asset)
    )]
    InsufficientHoldings {
        asset: Address,
        holder: Address,
        balance: i64,
        amount: i64,
    },

    /// The destination holding would overflow.
    #[error("holdings overflow for {} on asset {}", hex::encode(.holder), hex::encode(.asset))]
    HoldingsOverflow { asset: Address, holder: Address },
}

/// Failure of an FCL method evaluation. Aborts the current call; no further deltas are
/// emitted by that call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalFail {
    /// The contract graph is terminal; no method may run.
    #[error("contract is in terminal state")]
    TerminalState,

    /// The method's graph precondition does not match the current graph state.
    #[error("method `{method}` requires graph state `{expected}`, contract is at `{current}`")]
    InvalidState {
        method: String,
        expected: String,
        current: String,
    },

    /// Wrong number of arguments supplied to a method.
    #[error("method `{method}` takes {expected} argument(s), {got} supplied")]
    MethodArityError {
        method: String,
        expected: usize,
        got: usize,
    },

    /// The side graph holds an unexpired lock and the method is not subgraph-tagged.
    #[error("side graph is locked")]
    SubgraphLock,

    /// A local variable has no value under the evaluating counterparty.
    #[error("local variable `{0}` not found")]
    LocalVarNotFound(String),

    /// The contract has no method of this name.
    #[error("no such method `{0}`")]
    NoSuchMethod(String),

    /// Division by zero.
    #[error("division by zero")]
    DivideByZero,

    /// Arithmetic overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic underflow.
    #[error("arithmetic underflow")]
    Underflow,

    /// An integer value exceeds the SafeInteger bound.
    #[error("integer exceeds safe bounds")]
    HugeInteger,

    /// A message value exceeds the message length bound.
    #[error("message exceeds length bounds")]
    HugeString,

    /// A homomorphic operation is undefined for its operands.
    #[error("homomorphic operation failed")]
    HomomorphicFail,

    /// An account referenced during evaluation is missing.
    #[error("account integrity violation at {}", hex::encode(.0))]
    AccountIntegrity(Address),

    /// An asset operation failed against the world.
    #[error("asset integrity violation at {}", hex::encode(.0))]
    AssetIntegrity(Address),

    /// A contract lookup or contract-storage read failed.
    #[error("contract integrity violation at {}", hex::encode(.0))]
    ContractIntegrity(Address),

    /// The value variant cannot be canonically hashed.
    #[error("value cannot be hashed")]
    CannotHash,

    /// A typechecker invariant was violated. Reaching this is a bug in the compiler
    /// front-end, not in the submitted transaction.
    #[error("typechecker invariant violated: {0}")]
    Impossible(&'static str),
}

/// Causes of an invalid account operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidTxAccount {
    /// The embedded public key bytes do not decode to a valid key.
    #[error("public key byte string is invalid")]
    InvalidPubKeyByteString,

    /// The account is a validator of the current block and cannot be revoked.
    #[error("cannot revoke validator account {}", hex::encode(.0))]
    RevokeValidatorError(Address),

    /// The underlying world transition failed.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Causes of an invalid asset operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidTxAsset {
    /// CreateAsset carried no asset address.
    #[error("asset creation requires an asset address")]
    MissingAssetAddress,

    /// Bind semantics are unspecified; the operation is rejected.
    #[error("asset bind is not supported")]
    BindNotSupported,

    /// The underlying world transition failed.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Causes of an invalid contract operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidTxContract {
    /// Method evaluation aborted.
    #[error("evaluation failed: {0}")]
    EvalFail(#[from] EvalFail),

    /// SyncLocal semantics are unspecified; the operation is rejected.
    #[error("local storage sync is not supported")]
    SyncLocalNotSupported,

    /// The underlying world transition failed.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Header-level cause of an invalid transaction, per operation family.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidTxHeader {
    #[error(transparent)]
    Account(#[from] InvalidTxAccount),
    #[error(transparent)]
    Asset(#[from] InvalidTxAsset),
    #[error(transparent)]
    Contract(#[from] InvalidTxContract),
}

/// Envelope-level cause of an invalid transaction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidTxField {
    /// The transaction signature does not verify against the origin account's key.
    #[error("transaction signature is invalid")]
    InvalidTxSignature,

    /// The origin account's stored public key does not decode.
    #[error("origin public key is invalid")]
    InvalidPubKey,
}

/// Why a transaction was not applied.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TxCause {
    /// The origin account does not exist in the world.
    #[error("no such origin account {}", hex::encode(.0))]
    NoSuchOriginAccount(Address),

    /// The header operation failed.
    #[error(transparent)]
    InvalidTxHeader(#[from] InvalidTxHeader),

    /// The transaction envelope failed.
    #[error(transparent)]
    InvalidTxField(#[from] InvalidTxField),
}

/// A transaction that was not applied, together with its cause. The world is left exactly as
/// it was before the transaction.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("invalid transaction: {cause}")]
pub struct InvalidTransaction {
    pub header: TxHeader,
    pub cause: TxCause,
}

/// Descriptive error definitions of a block transition.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InvalidBlock {
    /// The block origin account does not exist.
    #[error("invalid block origin {}", hex::encode(.0))]
    InvalidBlockOrigin(Address),

    /// A block signer account does not exist.
    #[error("invalid block signer {}", hex::encode(.0))]
    InvalidBlockSigner(Address),

    /// A signature over the block digest does not verify.
    #[error("invalid block signature by {}", hex::encode(.0))]
    InvalidBlockSignature(Address),

    /// A transaction in the block was invalid. Carries the first invalid transaction; the
    /// full invalid set is reported on the transition result.
    #[error(transparent)]
    InvalidBlockTx(#[from] InvalidTransaction),
}

impl From<InvalidTxAccount> for TxCause {
    fn from(cause: InvalidTxAccount) -> Self {
        TxCause::InvalidTxHeader(InvalidTxHeader::Account(cause))
    }
}

impl From<InvalidTxAsset> for TxCause {
    fn from(cause: InvalidTxAsset) -> Self {
        TxCause::InvalidTxHeader(InvalidTxHeader::Asset(cause))
    }
}

impl From<InvalidTxContract> for TxCause {
    fn from(cause: InvalidTxContract) -> Self {
        TxCause::InvalidTxHeader(InvalidTxHeader::Contract(cause))
    }
}

impl From<EvalFail> for TxCause {
    fn from(fail: EvalFail) -> Self {
        TxCause::InvalidTxHeader(InvalidTxHeader::Contract(InvalidTxContract::EvalFail(fail)))
    }
}
