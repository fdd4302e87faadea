/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The FCL method evaluator.
//!
//! A method call runs against an immutable [EvalCtx] (everything the block and transaction
//! determine) and a mutable [EvalState] (the three storage scopes, the two-level graph
//! position, the world snapshot and the delta log). Every expression form returns
//! `Result<Value, EvalFail>`; a failure aborts the call and the caller discards the whole
//! state, so partially evaluated calls never reach the ledger.
//!
//! Method preconditions run in a fixed order: arity, then the side-graph lock, then the
//! main graph position. The side-graph check may release an expired lock before the main
//! check runs.

pub(crate) mod ops;
pub(crate) mod primitives;

use std::collections::{BTreeMap, BTreeSet};

use ed25519_dalek::SigningKey;

use crate::crypto::CipherKey;
use crate::delta::{Delta, LocalOp};
use crate::error::EvalFail;
use crate::script::{Expr, GraphState, Method, MethodTag, SideLock, SideState};
use crate::storage::Storage;
use crate::types::{Address, Timestamp};
use crate::value::Value;
use crate::world::{Contract, World};

/// Immutable call context, fixed for the duration of one method invocation.
pub struct EvalCtx<'a> {
    /// Height of the enclosing block
    pub block_number: u64,
    /// Proposer of the enclosing block
    pub validator: Address,
    /// Digest of the enclosing transaction
    pub tx_hash: [u8; 32],
    /// Block timestamp, the evaluator's only notion of "now"
    pub timestamp: Timestamp,
    /// When the contract was deployed
    pub created: Timestamp,
    /// Who deployed the contract
    pub deployer: Address,
    /// Origin of the enclosing transaction
    pub issuer: Address,
    /// Address of the contract under evaluation
    pub address: Address,
    /// The validating node's signing key, used by the `Sign` primitive
    pub node_key: &'a SigningKey,
    /// The contract-owned homomorphic key
    pub storage_key: CipherKey,
}

/// Mutable evaluation state for one method call.
pub struct EvalState {
    /// Method-scoped scratch storage, discarded on return
    pub temp_storage: Storage,
    /// The contract's persisted global storage
    pub global_storage: Storage,
    /// Names declared local in the script
    pub local_storage_vars: BTreeSet<String>,
    /// Per-counterparty private storage, as observed by this node
    pub local_storage: BTreeMap<Address, Storage>,
    /// Main graph position
    pub graph_state: GraphState,
    /// Side graph position
    pub side_state: SideState,
    pub side_lock: Option<SideLock>,
    /// World snapshot the call mutates through asset primitives
    pub world: World,
    /// Append-only log of observable mutations, in emission order
    pub deltas: Vec<Delta>,
}

impl EvalState {
    /// Stage a call on `contract` against a world snapshot. The contract's storages are
    /// cloned in; the caller commits them back only if the call succeeds.
    pub fn stage(contract: &Contract, world: World) -> EvalState {
        EvalState {
            temp_storage: Storage::new(),
            global_storage: contract.global_storage.clone(),
            local_storage_vars: contract.local_storage_vars.clone(),
            local_storage: contract.local_storage.clone(),
            graph_state: contract.graph_state.clone(),
            side_state: contract.side_state,
            side_lock: contract.side_lock,
            world,
            deltas: Vec::new(),
        }
    }
}

/// One method invocation in flight.
pub struct Evaluator<'a, 'k> {
    pub(crate) ctx: &'a EvalCtx<'k>,
    pub(crate) state: &'a mut EvalState,
}

impl<'a, 'k> Evaluator<'a, 'k> {
    pub fn new(ctx: &'a EvalCtx<'k>, state: &'a mut EvalState) -> Self {
        Self { ctx, state }
    }

    /// Run a method against the supplied argument values. The arguments have been
    /// typechecked upstream; only their count is re-checked here.
    pub fn eval_method(&mut self, method: &Method, args: &[Value]) -> Result<Value, EvalFail> {
        if method.args.len() != args.len() {
            return Err(EvalFail::MethodArityError {
                method: method.name.clone(),
                expected: method.args.len(),
                got: args.len(),
            });
        }
        self.check_side_graph(method)?;
        self.check_graph(method)?;
        for (name, value) in method.args.iter().zip(args) {
            self.state.temp_storage.put(name, value.clone());
        }
        self.eval(&method.body)
    }

    /// Side-graph precondition. An expired lock is released here, before the main graph
    /// check; an unexpired lock admits only subgraph-tagged methods.
    fn check_side_graph(&mut self, method: &Method) -> Result<(), EvalFail> {
        if let Some(lock) = self.state.side_lock {
            if lock.expired(self.ctx.timestamp) {
                self.state.side_lock = None;
                self.state.side_state = SideState::Inactive;
            } else if !matches!(method.tag, MethodTag::Subgraph(_)) {
                return Err(EvalFail::SubgraphLock);
            }
        }
        Ok(())
    }

    /// Main graph precondition. Terminal is absorbing; otherwise the method's tag label
    /// must name the current position. Subgraph methods are gated by the lock instead.
    fn check_graph(&self, method: &Method) -> Result<(), EvalFail> {
        if self.state.graph_state == GraphState::Terminal {
            return Err(EvalFail::TerminalState);
        }
        match &method.tag {
            MethodTag::Main(label) => {
                let expected = GraphState::from_label(label);
                if self.state.graph_state != expected {
                    return Err(EvalFail::InvalidState {
                        method: method.name.clone(),
                        expected: label.clone(),
                        current: self.state.graph_state.label().to_string(),
                    });
                }
                Ok(())
            }
            MethodTag::Subgraph(label) => {
                if self.state.side_lock.is_none() {
                    return Err(EvalFail::InvalidState {
                        method: method.name.clone(),
                        expected: label.clone(),
                        current: self.state.graph_state.label().to_string(),
                    });
                }
                Ok(())
            }
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<Value, EvalFail> {
        match expr {
            Expr::Seq(first, second) => {
                self.eval(first)?;
                self.eval(second)
            }
            Expr::Ret(inner) => self.eval(inner),
            Expr::NoOp => Ok(Value::Void),
            Expr::Lit(lit) => Ok(Value::from_literal(lit)),
            Expr::Var(name) => self.read_var(name),
            Expr::Assign(name, rhs) => {
                self.assign(name, rhs)?;
                Ok(Value::Void)
            }
            Expr::UnOp(op, operand) => {
                let value = self.eval(operand)?;
                ops::apply_unop(*op, value)
            }
            Expr::BinOp(op, lhs, rhs) => {
                let a = self.eval(lhs)?;
                let b = self.eval(rhs)?;
                ops::apply_binop(&self.ctx.storage_key, *op, a, b)
            }
            Expr::Call(prim, args) => primitives::call(self, *prim, args),
            Expr::If(cond, then_branch, else_branch) => match self.eval(cond)? {
                Value::Bool(true) => self.eval(then_branch),
                Value::Bool(false) => self.eval(else_branch),
                _ => Err(EvalFail::Impossible("if condition is not a bool")),
            },
            Expr::Before(instant, body) => {
                let instant = self.datetime(instant)?;
                if self.ctx.timestamp <= instant {
                    self.eval(body)
                } else {
                    Ok(Value::Void)
                }
            }
            Expr::After(instant, body) => {
                let instant = self.datetime(instant)?;
                if self.ctx.timestamp >= instant {
                    self.eval(body)
                } else {
                    Ok(Value::Void)
                }
            }
            Expr::Between(start, end, body) => {
                let start = self.datetime(start)?;
                let end = self.datetime(end)?;
                if crate::calendar::between(self.ctx.timestamp, start, end) {
                    self.eval(body)
                } else {
                    Ok(Value::Void)
                }
            }
        }
    }

    fn datetime(&mut self, expr: &Expr) -> Result<Timestamp, EvalFail> {
        match self.eval(expr)? {
            Value::Datetime(t) => Ok(t),
            _ => Err(EvalFail::Impossible("temporal guard is not a datetime")),
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.state.local_storage_vars.contains(name)
    }

    /// Resolve a variable: global storage first, then temp. Declared locals are not on
    /// this chain; they are only reachable through the local-delta machinery.
    fn read_var(&self, name: &str) -> Result<Value, EvalFail> {
        if let Some(value) = self.state.global_storage.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.state.temp_storage.get(name) {
            return Ok(value.clone());
        }
        if self.is_local(name) {
            return Err(EvalFail::LocalVarNotFound(name.to_string()));
        }
        Err(EvalFail::Impossible("unbound variable"))
    }

    /// The current counterparty's value of a local variable.
    fn local_value(&self, name: &str) -> Result<Value, EvalFail> {
        self.state
            .local_storage
            .get(&self.ctx.issuer)
            .and_then(|storage| storage.get(name))
            .cloned()
            .ok_or_else(|| EvalFail::LocalVarNotFound(name.to_string()))
    }

    fn write_local(&mut self, name: &str, value: Value) {
        self.state
            .local_storage
            .entry(self.ctx.issuer)
            .or_default()
            .put(name, value);
    }

    fn assign(&mut self, name: &str, rhs: &Expr) -> Result<(), EvalFail> {
        if self.state.global_storage.contains(name) {
            let value = self.eval(rhs)?;
            self.state.global_storage.put(name, value.clone());
            self.state.deltas.push(Delta::ModifyGlobal {
                name: name.to_string(),
                value,
            });
            Ok(())
        } else if self.is_local(name) {
            self.assign_local(name, rhs)
        } else {
            let value = self.eval(rhs)?;
            self.state.temp_storage.put(name, value);
            Ok(())
        }
    }

    /// Local-variable writes are replayed by counterparties from their deltas, so the
    /// right-hand side must have one of two shapes fixed by the compiler: a copy of
    /// another local, or a binary operation with the assigned variable on one side.
    fn assign_local(&mut self, name: &str, rhs: &Expr) -> Result<(), EvalFail> {
        match rhs {
            Expr::Var(other) if self.is_local(other) => {
                let value = self.local_value(other)?;
                self.write_local(name, value);
                self.state.deltas.push(Delta::ModifyLocal {
                    name: name.to_string(),
                    op: LocalOp::Replace(other.clone()),
                });
                Ok(())
            }
            Expr::BinOp(op, lhs, rhs2) => {
                let operand = match (&**lhs, &**rhs2) {
                    (Expr::Var(var), other) if var == name => other,
                    (other, Expr::Var(var)) if var == name => other,
                    _ => {
                        return Err(EvalFail::Impossible(
                            "local assignment is not a self-referencing operation",
                        ))
                    }
                };
                let operand = self.eval(operand)?;
                let current = self.local_value(name)?;
                let updated =
                    ops::apply_binop(&self.ctx.storage_key, *op, current, operand.clone())?;
                self.write_local(name, updated);
                self.state.deltas.push(Delta::ModifyLocal {
                    name: name.to_string(),
                    op: LocalOp::Op(*op, operand),
                });
                Ok(())
            }
            _ => Err(EvalFail::Impossible(
                "local assignment right-hand side has an unreplayable shape",
            )),
        }
    }
}
