/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Append-only record of observable mutations emitted by the evaluator.
//!
//! Deltas are part of the consensus-observable output of a method call: their order is
//! significant and is never rewritten. Counterparty nodes replay `ModifyLocal` deltas
//! against their private local storage, which is why local updates are recorded
//! symbolically rather than by value.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::script::{BinOp, GraphState};
use crate::types::Address;
use crate::value::Value;

/// A single observable mutation.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum Delta {
    /// A global variable was set to a new value.
    ModifyGlobal { name: String, value: Value },
    /// A local variable was updated; the operation is symbolic so each counterparty can
    /// apply it to its own private value.
    ModifyLocal { name: String, op: LocalOp },
    /// Asset holdings moved.
    ModifyAsset(AssetOp),
    /// The contract moved to a new graph state.
    ModifyState(GraphState),
    /// The contract terminated with a message.
    Terminate(Vec<u8>),
}

/// Symbolic update to a local variable.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum LocalOp {
    /// Replace with the counterparty's value of another local variable.
    Replace(String),
    /// Apply a binary operation with the given resolved operand to the current value.
    Op(BinOp, Value),
}

/// An asset movement performed by a method call.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AssetOp {
    /// Issuer-to-contract transfer: `amount` units from the transaction issuer to the
    /// contract address.
    TransferTo { asset: Address, amount: i64 },
    /// Contract-to-holder transfer: `amount` units from the contract address to `to`.
    TransferFrom {
        asset: Address,
        to: Address,
        amount: i64,
    },
    /// Arbitrary holder-to-holder transfer.
    TransferHoldings {
        asset: Address,
        from: Address,
        to: Address,
        amount: i64,
    },
}
