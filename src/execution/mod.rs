/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implementation of the transaction applier: the validate half of block processing.
//!
//! Transactions are applied in strict block order. Each one stages its effects on a
//! working copy of the world; only a fully successful application is committed, so an
//! invalid transaction leaves the world bit-identical to before it. Failures are
//! collected into the invalid set and never stop the transactions behind them.
//!
//! Per transaction the applier:
//! 1. resolves the origin account (except for `CreateAccount`, which introduces it);
//! 2. verifies the envelope signature, against the embedded key for `CreateAccount` and
//!    the origin account's key otherwise; this covers origins created earlier in the
//!    same block, which the pure verify phase cannot check;
//! 3. dispatches the header to the account, asset or contract executor.

pub(crate) mod account;
pub(crate) mod asset;
pub(crate) mod contract;
pub(crate) mod state;

use crate::codec;
use crate::crypto;
use crate::delta::Delta;
use crate::error::{InvalidTransaction, InvalidTxField, TxCause};
use crate::types::{Address, Transaction, TxAccount, TxAsset, TxContract, TxHeader};

use state::ExecutionState;

/// Apply one transaction to the execution state. An invalid transaction is recorded and
/// the world is left untouched.
pub(crate) fn execute_transaction(state: &mut ExecutionState, tx: &Transaction) {
    let mut world = state.world.clone();
    let mut deltas: Vec<(Address, Vec<Delta>)> = Vec::new();

    match apply(state, &mut world, &mut deltas, tx) {
        Ok(()) => {
            state.world = world;
            for (address, log) in deltas {
                state.deltas.entry(address).or_default().extend(log);
            }
        }
        Err(cause) => {
            tracing::debug!(%cause, "transaction rejected");
            state.invalid.push(InvalidTransaction {
                header: tx.header.clone(),
                cause,
            });
        }
    }
}

fn apply(
    state: &ExecutionState,
    world: &mut crate::world::World,
    deltas: &mut Vec<(Address, Vec<Delta>)>,
    tx: &Transaction,
) -> Result<(), TxCause> {
    // Origin validation and envelope signature. CreateAccount is self-signed; an
    // undecodable embedded key falls through to the header dispatch, which reports it.
    let payload = codec::tx_signing_payload(tx);
    match &tx.header {
        TxHeader::Account(TxAccount::CreateAccount { public_key, .. }) => {
            if let Some(key) = crypto::try_decode_pub(public_key) {
                if !crypto::verify_key(&key, &tx.signature, &payload) {
                    return Err(InvalidTxField::InvalidTxSignature.into());
                }
            }
        }
        _ => {
            let origin = world
                .account(&tx.origin)
                .map_err(|_| TxCause::NoSuchOriginAccount(tx.origin))?;
            // a stored key that no longer decodes and a signature that does not match
            // are distinct causes
            let key = crypto::try_decode_pub(&origin.public_key)
                .ok_or(InvalidTxField::InvalidPubKey)?;
            if !crypto::verify_key(&key, &tx.signature, &payload) {
                return Err(InvalidTxField::InvalidTxSignature.into());
            }
        }
    }

    match &tx.header {
        TxHeader::Account(header) => match header {
            TxAccount::CreateAccount {
                public_key,
                timezone,
                metadata,
            } => account::create_account(world, public_key, timezone, metadata)?,
            TxAccount::RevokeAccount { address } => {
                account::revoke_account(world, state.bd, address)?
            }
        },
        TxHeader::Asset(header) => match header {
            TxAsset::CreateAsset {
                address,
                name,
                supply,
                reference,
                asset_type,
            } => asset::create_asset(
                world,
                tx.origin,
                tx.timestamp,
                *address,
                name,
                *supply,
                reference.as_deref(),
                *asset_type,
            )?,
            TxAsset::Transfer { asset: address, to, amount } => {
                asset::transfer(world, tx.origin, address, *to, *amount)?
            }
            TxAsset::Bind { .. } => asset::bind()?,
        },
        TxHeader::Contract(header) => match header {
            TxContract::CreateContract { address, script } => contract::create_contract(
                world,
                tx.origin,
                tx.timestamp,
                *address,
                script.clone(),
            )?,
            TxContract::Call {
                address,
                method,
                args,
            } => contract::call(
                world,
                deltas,
                state.bd,
                state.node_key,
                tx,
                *address,
                method,
                args,
            )?,
            TxContract::SyncLocal { .. } => contract::sync_local()?,
        },
    }
    Ok(())
}
