/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Canonical serialization and digests.
//!
//! Every byte that feeds a hash or a signature goes through this module. Mismatched
//! encodings between validators are fork-level divergence, so the canonical forms are
//! pinned here and nowhere else:
//!
//! - Chain envelopes (transactions, block headers) serialize with Borsh: fixed-endian
//!   integers, length-prefixed collections.
//! - Runtime values hash their canonical byte form: ASCII decimal for integers, fixed-point
//!   and time values; 8-byte big-endian IEEE-754 bits for floats; `true`/`false` for bools;
//!   raw 32 bytes for addresses; the payload for messages; the label bytes for states;
//!   empty for void. Signatures and undefined values cannot be hashed.

use borsh::BorshSerialize;
use sha2::{Digest, Sha256};

use crate::error::EvalFail;
use crate::types::{Block, Transaction};
use crate::value::{format_fixed, Value};

/// Infallible Borsh serialization for chain types. Chain types contain no map keys or
/// floats that Borsh can reject, so failure here is unreachable by construction.
pub(crate) fn serialize<T: BorshSerialize>(value: &T) -> Vec<u8> {
    borsh::to_vec(value).expect("borsh serialization of chain types cannot fail")
}

/// The canonical byte form of a value, the preimage of `Sha256` hashing. `Sig` and
/// `Undefined` fail with `CannotHash`.
pub fn canonical_value(value: &Value) -> Result<Vec<u8>, EvalFail> {
    let bytes = match value {
        Value::Int(i) => i.to_string().into_bytes(),
        Value::Float(f) => f.to_bits().to_be_bytes().to_vec(),
        Value::Fixed(p, n) => format_fixed(*p, *n).into_bytes(),
        Value::Bool(b) => if *b { "true" } else { "false" }.as_bytes().to_vec(),
        Value::Msg(payload) => payload.clone(),
        Value::Account(a) | Value::Asset(a) | Value::Contract(a) | Value::Address(a) => {
            a.to_vec()
        }
        Value::Datetime(t) => t.0.to_string().into_bytes(),
        Value::Timedelta(d) => d.0.to_string().into_bytes(),
        Value::State(g) => g.label().as_bytes().to_vec(),
        Value::Crypto(c) => c.value().to_string().into_bytes(),
        Value::Void => Vec::new(),
        Value::Sig(_) | Value::Undefined => return Err(EvalFail::CannotHash),
    };
    Ok(bytes)
}

/// SHA-256 over the canonical byte form of a value.
pub fn value_digest(value: &Value) -> Result<[u8; 32], EvalFail> {
    Ok(Sha256::digest(canonical_value(value)?).into())
}

/// The byte payload a transaction origin signs: header, origin and timestamp. The
/// signature itself is excluded.
pub fn tx_signing_payload(tx: &Transaction) -> Vec<u8> {
    serialize(&(&tx.header, tx.origin, tx.timestamp))
}

/// Digest identifying a transaction, signature included. This is what the `TxHash`
/// primitive exposes to contracts.
pub fn tx_digest(tx: &Transaction) -> [u8; 32] {
    Sha256::digest(serialize(tx)).into()
}

/// The block digest that authority signatures cover: header and transactions, with the
/// signature list excluded.
pub fn block_digest(block: &Block) -> [u8; 32] {
    Sha256::digest(serialize(&(&block.header, &block.transactions))).into()
}
