/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implements execution of contract operations: deployment and method calls.
//!
//! A call stages the contract's storages and a world snapshot into an [EvalState], runs
//! the evaluator, and commits everything back only on success. An evaluator failure
//! discards the staged state wholesale, so a failed call cannot leak partial storage
//! writes, graph moves or asset transfers.

use crate::codec;
use crate::crypto::CipherKey;
use crate::delta::Delta;
use crate::error::{EvalFail, InvalidTxContract};
use crate::eval::{EvalCtx, EvalState, Evaluator};
use crate::script::Script;
use crate::types::{Address, BlockData, Timestamp, Transaction};
use crate::value::Value;
use crate::world::{Contract, World};

/// CreateContract
///
/// Initialize a contract from its typechecked script and register it. The deployer is the
/// transaction origin.
pub(crate) fn create_contract(
    world: &mut World,
    origin: Address,
    timestamp: Timestamp,
    address: Address,
    script: Script,
) -> Result<(), InvalidTxContract> {
    let contract = Contract::new(address, origin, timestamp, script);
    world.add_contract(contract)?;
    Ok(())
}

/// Call
///
/// Invoke a method on a deployed contract. On success the world is advanced and the
/// call's deltas are appended to the contract's log.
#[allow(clippy::too_many_arguments)]
pub(crate) fn call(
    world: &mut World,
    deltas: &mut Vec<(Address, Vec<Delta>)>,
    bd: &BlockData,
    node_key: &ed25519_dalek::SigningKey,
    tx: &Transaction,
    address: Address,
    method_name: &str,
    args: &[Value],
) -> Result<(), InvalidTxContract> {
    let contract = world.contract(&address)?.clone();
    let method = contract
        .script
        .method(method_name)
        .ok_or_else(|| EvalFail::NoSuchMethod(method_name.to_string()))?
        .clone();

    let ctx = EvalCtx {
        block_number: bd.number,
        validator: bd.origin,
        tx_hash: codec::tx_digest(tx),
        timestamp: bd.timestamp,
        created: contract.timestamp,
        deployer: contract.owner,
        issuer: tx.origin,
        address,
        node_key,
        storage_key: CipherKey::for_contract(&address),
    };
    let mut state = EvalState::stage(&contract, world.clone());

    if let Err(fail) = Evaluator::new(&ctx, &mut state).eval_method(&method, args) {
        if let EvalFail::Impossible(detail) = &fail {
            tracing::error!(
                contract = %hex::encode(address),
                method = method_name,
                detail,
                "typechecker invariant violated during evaluation"
            );
        }
        return Err(InvalidTxContract::EvalFail(fail));
    }

    // Commit: persisted storages, both graph halves and the mutated world. Temp storage
    // dies here with the staged state.
    let mut updated = contract;
    updated.global_storage = state.global_storage;
    updated.local_storage = state.local_storage;
    updated.graph_state = state.graph_state;
    updated.side_state = state.side_state;
    updated.side_lock = state.side_lock;

    let mut new_world = state.world;
    new_world.update_contract(&address, updated)?;
    *world = new_world;
    deltas.push((address, state.deltas));
    Ok(())
}

/// SyncLocal
///
/// Local-storage synchronisation has no specified on-chain semantics; the operation is
/// rejected rather than silently accepted.
pub(crate) fn sync_local() -> Result<(), InvalidTxContract> {
    Err(InvalidTxContract::SyncLocalNotSupported)
}
