/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Typed FCL abstract syntax, as produced by the external parser and typechecker.
//!
//! The evaluator trusts this representation: argument types, operand pairings and the
//! syntactic shape of local-variable assignments have all been validated upstream. Shapes
//! that the typechecker rules out are reported as [EvalFail::Impossible](crate::error::EvalFail)
//! if they are ever reached.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::{Address, Timedelta, Timestamp};
use crate::value::FixedPrec;

/// A contract's position in its control-flow automaton. `Terminal` is absorbing.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum GraphState {
    Initial,
    Terminal,
    Label(String),
}

impl GraphState {
    /// Parse a method-tag label into the graph state it names.
    pub fn from_label(label: &str) -> GraphState {
        match label {
            "initial" => GraphState::Initial,
            "terminal" => GraphState::Terminal,
            other => GraphState::Label(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GraphState::Initial => "initial",
            GraphState::Terminal => "terminal",
            GraphState::Label(name) => name,
        }
    }
}

/// Whether a contract's side graph has been entered, and how it ended. Persists on the
/// contract between calls, alongside the lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum SideState {
    Inactive,
    Init,
    Stop,
}

/// The timed side-graph lock. Expires when the block timestamp passes `start + duration`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SideLock {
    pub start: Timestamp,
    pub duration: Timedelta,
}

impl SideLock {
    pub fn expired(&self, now: Timestamp) -> bool {
        now.0 > self.start.0.saturating_add(self.duration.0)
    }
}

/// A parsed, typechecked contract script.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Script {
    /// Top-level variable definitions, evaluated once at deployment.
    pub definitions: Vec<Def>,
    /// The labels of the contract's control-flow graph.
    pub graph: Vec<String>,
    /// Callable methods.
    pub methods: Vec<Method>,
}

impl Script {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A top-level variable definition.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum Def {
    /// A global variable with its initial value; persisted on the contract.
    Global { name: String, init: Literal },
    /// A local (per-counterparty) variable. Values live in each counterparty's private
    /// storage; only the name set is part of consensus state.
    Local { name: String },
}

/// A callable contract method.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Method {
    pub name: String,
    pub tag: MethodTag,
    /// Declared parameter names; values are bound into temp storage at call time.
    pub args: Vec<String>,
    pub body: Expr,
}

/// Which half of the two-level state machine gates the method.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum MethodTag {
    /// Callable when the main graph is at the named position.
    Main(String),
    /// Callable while the side graph holds the lock.
    Subgraph(String),
}

/// FCL expression forms.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum Expr {
    /// Evaluate the first expression for effect, then the second for value.
    Seq(Box<Expr>, Box<Expr>),
    /// Tail return. The typechecker guarantees tail position, so this is value-transparent.
    Ret(Box<Expr>),
    NoOp,
    Lit(Literal),
    Var(String),
    Assign(String, Box<Expr>),
    UnOp(UnOp, Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    /// Primitive invocation.
    Call(Prim, Vec<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Run the body only at or before the given instant.
    Before(Box<Expr>, Box<Expr>),
    /// Run the body only at or after the given instant.
    After(Box<Expr>, Box<Expr>),
    /// Run the body only within the half-open interval `[start, end)`.
    Between(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// Literal forms. Signatures and undefined are not constructible from source.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum Literal {
    LInt(i64),
    LFloat(f64),
    LFixed(FixedPrec, i64),
    LBool(bool),
    LMsg(String),
    LAccount(Address),
    LAsset(Address),
    LContract(Address),
    LAddress(Address),
    LDatetime(Timestamp),
    LTimedelta(Timedelta),
    LState(String),
    LVoid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum UnOp {
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

/// The FCL primitive set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Prim {
    // state & lifecycle
    Terminate,
    Transition,
    CurrentState,
    NovationInit,
    NovationStop,

    // asset movement
    TransferTo,
    TransferFrom,
    TransferHoldings,

    // introspection
    Now,
    Block,
    Deployer,
    Sender,
    Created,
    Address,
    Validator,

    // cryptography
    Sign,
    Verify,
    Sha256,
    TxHash,

    // existence & lookup
    AccountExists,
    AssetExists,
    ContractExists,
    ContractValue,
    ContractValueExists,
    ContractState,

    // datetime
    IsBusinessDayUk,
    NextBusinessDayUk,
    IsBusinessDayNyse,
    NextBusinessDayNyse,
    Between,

    // fixed/float conversion
    FixedToFloat(FixedPrec),
    FloatToFixed(FixedPrec),
}
