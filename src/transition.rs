/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implementation of the block state transition function.
//!
//! The struct [Runtime] is the entry point. It intakes a [Block] with the current
//! [World](crate::world::World) and processes it in two phases:
//!
//! - **Verify** (pure): the block origin must exist, every authority signature must check
//!   out against the block digest, and every reachable transaction signature is checked.
//!   A verify failure rejects the block outright; the world is returned unchanged.
//! - **Validate** (stateful): transactions are fed to the applier in strict order. Invalid
//!   transactions are collected, valid ones advance the world and accumulate contract
//!   deltas. The first invalid transaction, if any, is surfaced as the block error.
//!
//! The result of the transition includes the new world state, the full invalid set, the
//! per-contract delta logs and the optional block error. Identical inputs produce
//! bit-identical results on every validator; nothing in this path consults a clock or an
//! entropy source.

use std::collections::BTreeMap;

use ed25519_dalek::SigningKey;

use crate::codec;
use crate::crypto;
use crate::delta::Delta;
use crate::error::{InvalidBlock, InvalidTransaction};
use crate::execution::{self, state::ExecutionState};
use crate::types::{Address, Block, BlockData, Transaction, TxAccount, TxHeader};
use crate::world::World;

/// A Runtime for block transitions. Instances share the same execution logic and differ
/// only in node-local configuration: the signing key contract methods use through the
/// `Sign` primitive.
pub struct Runtime {
    node_key: SigningKey,
}

impl Runtime {
    pub fn new(node_key: SigningKey) -> Self {
        Self { node_key }
    }

    /// State transition of the world from a block: verify, then validate.
    pub fn transition(&self, world: World, block: &Block) -> TransitionResult {
        tracing::debug!(block = block.header.index, "verifying block");
        if let Err(error) = verify_block(&world, block) {
            return TransitionResult {
                new_world: world,
                invalid: Vec::new(),
                deltas: BTreeMap::new(),
                error: Some(error),
            };
        }

        let bd = BlockData::from(block);
        let mut state = ExecutionState::new(&bd, &self.node_key, world);
        for tx in &block.transactions {
            execution::execute_transaction(&mut state, tx);
        }
        tracing::debug!(
            block = block.header.index,
            invalid = state.invalid.len(),
            "block validated"
        );

        let error = state
            .invalid
            .first()
            .cloned()
            .map(InvalidBlock::InvalidBlockTx);
        TransitionResult {
            new_world: state.world,
            invalid: state.invalid,
            deltas: state.deltas,
            error,
        }
    }
}

/// Result of a block transition.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionResult {
    /// New world state after the transition. Equals the input world when the block was
    /// rejected in the verify phase.
    pub new_world: World,
    /// Every transaction that was not applied, in block order.
    pub invalid: Vec<InvalidTransaction>,
    /// Deltas emitted by contract calls, grouped by contract, in emission order.
    pub deltas: BTreeMap<Address, Vec<Delta>>,
    /// The block-level error: a verify failure, or the first invalid transaction.
    pub error: Option<InvalidBlock>,
}

/// The pure verify phase. No world mutation.
pub fn verify_block(world: &World, block: &Block) -> Result<(), InvalidBlock> {
    if !world.has_account(&block.header.origin) {
        return Err(InvalidBlock::InvalidBlockOrigin(block.header.origin));
    }

    let digest = codec::block_digest(block);
    for (signature, signer) in &block.signatures {
        let account = world
            .account(signer)
            .map_err(|_| InvalidBlock::InvalidBlockSigner(*signer))?;
        if !crypto::verify(&account.public_key, signature, &digest) {
            return Err(InvalidBlock::InvalidBlockSignature(*signer));
        }
    }

    for tx in &block.transactions {
        verify_transaction(world, tx)?;
    }
    Ok(())
}

/// Check one transaction signature against the current world. A `CreateAccount` verifies
/// against its embedded key. A transaction whose origin is not in the world yet is left to
/// the applier, which re-verifies after origin resolution; the account may be created by
/// an earlier transaction of the same block.
fn verify_transaction(world: &World, tx: &Transaction) -> Result<(), InvalidBlock> {
    let payload = codec::tx_signing_payload(tx);
    match &tx.header {
        TxHeader::Account(TxAccount::CreateAccount { public_key, .. }) => {
            match crypto::try_decode_pub(public_key) {
                Some(key) => {
                    if !crypto::verify_key(&key, &tx.signature, &payload) {
                        return Err(InvalidBlock::InvalidBlockSignature(tx.origin));
                    }
                }
                // undecodable keys are reported by the applier as InvalidPubKeyByteString
                None => {}
            }
        }
        _ => {
            if let Ok(account) = world.account(&tx.origin) {
                // a stored key that fails to decode is reported per-transaction by the
                // applier as InvalidPubKey
                if let Some(key) = crypto::try_decode_pub(&account.public_key) {
                    if !crypto::verify_key(&key, &tx.signature, &payload) {
                        return Err(InvalidBlock::InvalidBlockSignature(tx.origin));
                    }
                }
            }
        }
    }
    Ok(())
}
