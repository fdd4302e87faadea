/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The FCL primitive set.
//!
//! Primitives are the only way a method reaches the outside of its expression language:
//! graph and side-graph transitions, asset movement, block introspection, deterministic
//! cryptography, cross-contract reads and calendar queries. Argument values arrive
//! typechecked; shape mismatches are `Impossible`.

use crate::calendar::{self, Calendar};
use crate::codec;
use crate::crypto;
use crate::delta::{AssetOp, Delta};
use crate::error::EvalFail;
use crate::script::{Expr, GraphState, Prim, SideLock, SideState};
use crate::types::{Address, Timedelta, Timestamp};
use crate::value::{fixed_to_float, float_to_fixed, Value};

use super::Evaluator;

pub(crate) fn call(
    ev: &mut Evaluator,
    prim: Prim,
    args: &[Expr],
) -> Result<Value, EvalFail> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(ev.eval(arg)?);
    }
    dispatch(ev, prim, values)
}

fn dispatch(ev: &mut Evaluator, prim: Prim, args: Vec<Value>) -> Result<Value, EvalFail> {
    match prim {
        // ----- state & lifecycle -----
        Prim::Terminate => {
            let [message] = take(args)?;
            let message = expect_msg(message)?;
            ev.state.deltas.push(Delta::ModifyState(GraphState::Terminal));
            ev.state.deltas.push(Delta::Terminate(message));
            ev.state.graph_state = GraphState::Terminal;
            Ok(Value::Void)
        }
        Prim::Transition => {
            let [target] = take(args)?;
            let target = expect_state(target)?;
            ev.state.deltas.push(Delta::ModifyState(target.clone()));
            ev.state.graph_state = target;
            Ok(Value::Void)
        }
        Prim::CurrentState => {
            let [] = take(args)?;
            Ok(Value::State(ev.state.graph_state.clone()))
        }
        Prim::NovationInit => {
            let [timeout] = take(args)?;
            let timeout = expect_timedelta(timeout)?;
            ev.state.side_state = SideState::Init;
            ev.state.side_lock = Some(SideLock {
                start: ev.ctx.timestamp,
                duration: timeout,
            });
            Ok(Value::Void)
        }
        Prim::NovationStop => {
            let [] = take(args)?;
            ev.state.side_state = SideState::Stop;
            Ok(Value::Void)
        }

        // ----- asset movement -----
        Prim::TransferTo => {
            let [asset, amount] = take(args)?;
            let asset = expect_asset(asset)?;
            let amount = expect_int(amount)?;
            let (from, to) = (ev.ctx.issuer, ev.ctx.address);
            transfer(ev, asset, from, to, amount)?;
            ev.state
                .deltas
                .push(Delta::ModifyAsset(AssetOp::TransferTo { asset, amount }));
            Ok(Value::Void)
        }
        Prim::TransferFrom => {
            let [asset, amount, to] = take(args)?;
            let asset = expect_asset(asset)?;
            let amount = expect_int(amount)?;
            let to = expect_address_like(to)?;
            let from = ev.ctx.address;
            transfer(ev, asset, from, to, amount)?;
            ev.state
                .deltas
                .push(Delta::ModifyAsset(AssetOp::TransferFrom { asset, to, amount }));
            Ok(Value::Void)
        }
        Prim::TransferHoldings => {
            let [from, asset, amount, to] = take(args)?;
            let from = expect_address_like(from)?;
            let asset = expect_asset(asset)?;
            let amount = expect_int(amount)?;
            let to = expect_address_like(to)?;
            transfer(ev, asset, from, to, amount)?;
            ev.state.deltas.push(Delta::ModifyAsset(AssetOp::TransferHoldings {
                asset,
                from,
                to,
                amount,
            }));
            Ok(Value::Void)
        }

        // ----- introspection -----
        Prim::Now => {
            let [] = take(args)?;
            Ok(Value::Datetime(ev.ctx.timestamp))
        }
        Prim::Block => {
            let [] = take(args)?;
            Ok(Value::Int(ev.ctx.block_number as i64))
        }
        Prim::Deployer => {
            let [] = take(args)?;
            Ok(Value::Account(ev.ctx.deployer))
        }
        Prim::Sender => {
            let [] = take(args)?;
            Ok(Value::Account(ev.ctx.issuer))
        }
        Prim::Created => {
            let [] = take(args)?;
            Ok(Value::Datetime(ev.ctx.created))
        }
        Prim::Address => {
            let [] = take(args)?;
            Ok(Value::Contract(ev.ctx.address))
        }
        Prim::Validator => {
            let [] = take(args)?;
            Ok(Value::Account(ev.ctx.validator))
        }

        // ----- cryptography -----
        Prim::Sign => {
            let [message] = take(args)?;
            let message = expect_msg(message)?;
            Ok(Value::Sig(crypto::sign(ev.ctx.node_key, &message)))
        }
        Prim::Verify => {
            let [account, signature, message] = take(args)?;
            let account = expect_address_like(account)?;
            let signature = expect_sig(signature)?;
            let message = expect_msg(message)?;
            let account = ev
                .state
                .world
                .account(&account)
                .map_err(|_| EvalFail::AccountIntegrity(account))?;
            Ok(Value::Bool(crypto::verify(
                &account.public_key,
                &signature,
                &message,
            )))
        }
        Prim::Sha256 => {
            let [value] = take(args)?;
            Ok(Value::Msg(codec::value_digest(&value)?.to_vec()))
        }
        Prim::TxHash => {
            let [] = take(args)?;
            Ok(Value::Msg(ev.ctx.tx_hash.to_vec()))
        }

        // ----- existence & lookup -----
        Prim::AccountExists => {
            let [address] = take(args)?;
            let address = expect_address_like(address)?;
            Ok(Value::Bool(ev.state.world.has_account(&address)))
        }
        Prim::AssetExists => {
            let [address] = take(args)?;
            let address = expect_address_like(address)?;
            Ok(Value::Bool(ev.state.world.has_asset(&address)))
        }
        Prim::ContractExists => {
            let [address] = take(args)?;
            let address = expect_address_like(address)?;
            Ok(Value::Bool(ev.state.world.has_contract(&address)))
        }
        Prim::ContractValue => {
            let [contract, name] = take(args)?;
            contract_value(ev, contract, name)
        }
        Prim::ContractValueExists => {
            let [contract, name] = take(args)?;
            Ok(Value::Bool(contract_value(ev, contract, name).is_ok()))
        }
        Prim::ContractState => {
            let [contract] = take(args)?;
            let address = expect_contract(contract)?;
            let contract = ev
                .state
                .world
                .contract(&address)
                .map_err(|_| EvalFail::ContractIntegrity(address))?;
            Ok(Value::State(contract.graph_state.clone()))
        }

        // ----- datetime -----
        Prim::IsBusinessDayUk => business_day(args, Calendar::Uk),
        Prim::NextBusinessDayUk => next_business_day(args, Calendar::Uk),
        Prim::IsBusinessDayNyse => business_day(args, Calendar::Nyse),
        Prim::NextBusinessDayNyse => next_business_day(args, Calendar::Nyse),
        Prim::Between => {
            let [start, end] = take(args)?;
            let start = expect_datetime(start)?;
            let end = expect_datetime(end)?;
            Ok(Value::Bool(calendar::between(ev.ctx.timestamp, start, end)))
        }

        // ----- fixed/float conversion -----
        Prim::FixedToFloat(prec) => {
            let [value] = take(args)?;
            match value {
                Value::Fixed(p, n) if p == prec => Ok(Value::Float(fixed_to_float(p, n))),
                _ => Err(EvalFail::Impossible("fixed conversion precision mismatch")),
            }
        }
        Prim::FloatToFixed(prec) => {
            let [value] = take(args)?;
            let value = expect_float(value)?;
            Ok(Value::Fixed(prec, float_to_fixed(prec, value)?))
        }
    }
}

/// Asset movement through the world snapshot. A failed transfer aborts the call with
/// `AssetIntegrity` before any delta is recorded.
fn transfer(
    ev: &mut Evaluator,
    asset: Address,
    from: Address,
    to: Address,
    amount: i64,
) -> Result<(), EvalFail> {
    ev.state
        .world
        .transfer_asset(&asset, from, to, amount)
        .map_err(|_| EvalFail::AssetIntegrity(asset))
}

fn contract_value(ev: &Evaluator, contract: Value, name: Value) -> Result<Value, EvalFail> {
    let address = expect_contract(contract)?;
    let name = expect_msg(name)?;
    let name = String::from_utf8(name).map_err(|_| EvalFail::ContractIntegrity(address))?;
    let contract = ev
        .state
        .world
        .contract(&address)
        .map_err(|_| EvalFail::ContractIntegrity(address))?;
    contract
        .global_storage
        .get(&name)
        .cloned()
        .ok_or(EvalFail::ContractIntegrity(address))
}

fn business_day(args: Vec<Value>, cal: Calendar) -> Result<Value, EvalFail> {
    let [instant] = take(args)?;
    let instant = expect_datetime(instant)?;
    Ok(Value::Bool(calendar::is_business_day(cal, instant)?))
}

fn next_business_day(args: Vec<Value>, cal: Calendar) -> Result<Value, EvalFail> {
    let [instant] = take(args)?;
    let instant = expect_datetime(instant)?;
    Ok(Value::Datetime(calendar::next_business_day(cal, instant)?))
}

/// Destructure a primitive's argument vector into a fixed arity.
fn take<const N: usize>(args: Vec<Value>) -> Result<[Value; N], EvalFail> {
    args.try_into()
        .map_err(|_| EvalFail::Impossible("primitive arity mismatch"))
}

fn expect_int(value: Value) -> Result<i64, EvalFail> {
    match value {
        Value::Int(i) => Ok(i),
        _ => Err(EvalFail::Impossible("expected an int")),
    }
}

fn expect_float(value: Value) -> Result<f64, EvalFail> {
    match value {
        Value::Float(f) => Ok(f),
        _ => Err(EvalFail::Impossible("expected a float")),
    }
}

fn expect_msg(value: Value) -> Result<Vec<u8>, EvalFail> {
    match value {
        Value::Msg(payload) => Ok(payload),
        _ => Err(EvalFail::Impossible("expected a msg")),
    }
}

fn expect_sig(value: Value) -> Result<crate::types::SigBytes, EvalFail> {
    match value {
        Value::Sig(sig) => Ok(sig),
        _ => Err(EvalFail::Impossible("expected a signature")),
    }
}

fn expect_state(value: Value) -> Result<GraphState, EvalFail> {
    match value {
        Value::State(state) => Ok(state),
        _ => Err(EvalFail::Impossible("expected a state label")),
    }
}

fn expect_datetime(value: Value) -> Result<Timestamp, EvalFail> {
    match value {
        Value::Datetime(t) => Ok(t),
        _ => Err(EvalFail::Impossible("expected a datetime")),
    }
}

fn expect_timedelta(value: Value) -> Result<Timedelta, EvalFail> {
    match value {
        Value::Timedelta(d) => Ok(d),
        _ => Err(EvalFail::Impossible("expected a timedelta")),
    }
}

fn expect_asset(value: Value) -> Result<Address, EvalFail> {
    match value {
        Value::Asset(a) => Ok(a),
        _ => Err(EvalFail::Impossible("expected an asset reference")),
    }
}

fn expect_contract(value: Value) -> Result<Address, EvalFail> {
    match value {
        Value::Contract(a) => Ok(a),
        _ => Err(EvalFail::Impossible("expected a contract reference")),
    }
}

fn expect_address_like(value: Value) -> Result<Address, EvalFail> {
    value
        .as_address()
        .ok_or(EvalFail::Impossible("expected an address-like value"))
}
