/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! FCL Runtime is the **block and transaction validation core** of the FCL contract
//! platform: a deterministic state transition function over accounts, assets and
//! contracts, with a native evaluator for FCL method calls.
//!
//! ```text
//! f(W, B) -> (W', I, D)
//!
//! W = World state: accounts, assets and contracts indexed by address
//! B = Block: header, ordered transactions, authority signatures
//! I = Invalid set: transactions that were rejected, with their causes
//! D = Delta logs: observable contract mutations, grouped by contract
//! ```
//!
//! ### Example
//!
//! ```rust,ignore
//! // prepare a world (w), a block (b) and the node signing key,
//! // and run the transition.
//! let result = fcl_runtime::Runtime::new(node_key).transition(w, &b);
//! ```
//!
//! Every validator computes bit-identical outputs from identical inputs: block application
//! is single-threaded, all time comes from the block header, signing is deterministic
//! Ed25519, and every hash preimage goes through the canonical [codec]. Contract calls run
//! in the [eval] interpreter against the three storage scopes and append to the
//! [delta] log; the transaction applier and the [transition] entry point arrange the
//! verify and validate phases around it.

pub mod calendar;

pub mod codec;

pub mod crypto;

pub mod delta;

pub mod error;
pub use error::{EvalFail, InvalidBlock, InvalidTransaction, WorldError};

pub mod eval;
pub use eval::{EvalCtx, EvalState, Evaluator};

pub(crate) mod execution;

pub mod script;

pub mod storage;

pub mod transition;
pub use transition::{verify_block, Runtime, TransitionResult};

pub mod types;
pub use types::{Address, Block, BlockData, BlockHeader, Timedelta, Timestamp, Transaction};

pub mod value;
pub use value::Value;

pub mod world;
pub use world::{Account, Asset, Contract, World};
