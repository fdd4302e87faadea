/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines a struct as Execution State which is being updated during execution.
//!
//! This is the state of the block-application model, not of any single transaction: the
//! world in transit, the invalid set collected so far, and the per-contract delta logs.
//! Individual transactions stage their changes on a working copy and only a fully
//! successful application reaches these fields.

use std::collections::BTreeMap;

use ed25519_dalek::SigningKey;

use crate::delta::Delta;
use crate::error::InvalidTransaction;
use crate::types::{Address, BlockData};
use crate::world::World;

/// ExecutionState is a collection of all information required to transit the world through
/// a block's transactions in order.
pub(crate) struct ExecutionState<'a> {
    /// Block-derived context, immutable across the block
    pub bd: &'a BlockData,
    /// The validating node's signing key, threaded into contract evaluation
    pub node_key: &'a SigningKey,
    /// The world in transit
    pub world: World,
    /// Transactions rejected so far, in block order
    pub invalid: Vec<InvalidTransaction>,
    /// Deltas emitted by contract calls, grouped by contract address in emission order
    pub deltas: BTreeMap<Address, Vec<Delta>>,
}

impl<'a> ExecutionState<'a> {
    pub fn new(bd: &'a BlockData, node_key: &'a SigningKey, world: World) -> Self {
        Self {
            bd,
            node_key,
            world,
            invalid: Vec::new(),
            deltas: BTreeMap::new(),
        }
    }
}
