//! Shared fixtures for the integration tests: seeded keys, worlds, canned scripts and
//! signed envelopes.

#![allow(dead_code)]

use std::collections::BTreeMap;

use ed25519_dalek::SigningKey;
use rand::{rngs::StdRng, RngCore, SeedableRng};

use fcl_runtime::codec;
use fcl_runtime::crypto;
use fcl_runtime::script::{BinOp, Def, Expr, Literal, Method, MethodTag, Prim, Script};
use fcl_runtime::types::{TxHeader, SigBytes};
use fcl_runtime::{Account, Address, Block, BlockHeader, Timestamp, Transaction, World};

/// A block timestamp inside the bundled calendar range: 2026-06-01 00:00:00 UTC, in
/// microseconds.
pub const BASE_TIME: i64 = 1_780_272_000_000_000;

pub fn signing_key(seed: u64) -> SigningKey {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut secret = [0u8; 32];
    rng.fill_bytes(&mut secret);
    SigningKey::from_bytes(&secret)
}

pub fn address_of(key: &SigningKey) -> Address {
    crypto::account_address(&key.verifying_key())
}

pub fn account_of(key: &SigningKey) -> Account {
    Account {
        address: address_of(key),
        public_key: key.verifying_key().as_bytes().to_vec(),
        timezone: "UTC".to_string(),
        metadata: BTreeMap::new(),
    }
}

/// A world containing the accounts of the given keys.
pub fn world_with(keys: &[&SigningKey]) -> World {
    let mut world = World::new();
    for key in keys {
        world.add_account(account_of(key)).unwrap();
    }
    world
}

/// Sign a transaction envelope with the origin's key.
pub fn signed_tx(
    key: &SigningKey,
    origin: Address,
    timestamp: i64,
    header: TxHeader,
) -> Transaction {
    let mut tx = Transaction {
        header,
        origin,
        signature: [0u8; 64],
        timestamp: Timestamp(timestamp),
    };
    tx.signature = crypto::sign(key, &codec::tx_signing_payload(&tx));
    tx
}

/// A transaction carrying a signature that verifies under no key.
pub fn forged_tx(origin: Address, timestamp: i64, header: TxHeader) -> Transaction {
    let forged: SigBytes = [1u8; 64];
    Transaction {
        header,
        origin,
        signature: forged,
        timestamp: Timestamp(timestamp),
    }
}

/// Build a block proposed and signed by `proposer`. The proposer is the whole validator
/// set of the block.
pub fn block(
    index: u64,
    proposer: &SigningKey,
    timestamp: i64,
    transactions: Vec<Transaction>,
) -> Block {
    let origin = address_of(proposer);
    let mut block = Block {
        header: BlockHeader {
            index,
            origin,
            timestamp: Timestamp(timestamp),
            prev_hash: [0u8; 32],
        },
        transactions,
        signatures: Vec::new(),
    };
    let digest = codec::block_digest(&block);
    block.signatures.push((crypto::sign(proposer, &digest), origin));
    block
}

fn var(name: &str) -> Expr {
    Expr::Var(name.to_string())
}

fn int(value: i64) -> Expr {
    Expr::Lit(Literal::LInt(value))
}

/// A counter contract: one global `x` starting at 7 and an `increment` method that
/// adds one to it.
pub fn counter_script() -> Script {
    Script {
        definitions: vec![Def::Global {
            name: "x".to_string(),
            init: Literal::LInt(7),
        }],
        graph: vec![],
        methods: vec![Method {
            name: "increment".to_string(),
            tag: MethodTag::Main("initial".to_string()),
            args: vec![],
            body: Expr::Assign(
                "x".to_string(),
                Box::new(Expr::BinOp(
                    BinOp::Add,
                    Box::new(var("x")),
                    Box::new(int(1)),
                )),
            ),
        }],
    }
}

/// A contract exercising lifecycle and arithmetic edges: `finish` terminates with a
/// message, `crash` divides by zero, `scratch` writes only to temp storage.
pub fn lifecycle_script() -> Script {
    Script {
        definitions: vec![Def::Global {
            name: "x".to_string(),
            init: Literal::LInt(7),
        }],
        graph: vec![],
        methods: vec![
            Method {
                name: "finish".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::Call(
                    Prim::Terminate,
                    vec![Expr::Lit(Literal::LMsg("done".to_string()))],
                ),
            },
            Method {
                name: "crash".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::BinOp(BinOp::Div, Box::new(int(10)), Box::new(int(0))),
            },
            Method {
                name: "scratch".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::Assign("note".to_string(), Box::new(int(42))),
            },
            Method {
                name: "advance".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::Call(
                    Prim::Transition,
                    vec![Expr::Lit(Literal::LState("settled".to_string()))],
                ),
            },
            Method {
                name: "settle_only".to_string(),
                tag: MethodTag::Main("settled".to_string()),
                args: vec![],
                body: Expr::NoOp,
            },
        ],
    }
}

/// A contract with two locals: `bump` applies `y = y + 3`, `copy` applies `y = z`.
pub fn locals_script() -> Script {
    Script {
        definitions: vec![
            Def::Local {
                name: "y".to_string(),
            },
            Def::Local {
                name: "z".to_string(),
            },
        ],
        graph: vec![],
        methods: vec![
            Method {
                name: "bump".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::Assign(
                    "y".to_string(),
                    Box::new(Expr::BinOp(
                        BinOp::Add,
                        Box::new(var("y")),
                        Box::new(int(3)),
                    )),
                ),
            },
            Method {
                name: "copy".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::Assign("y".to_string(), Box::new(var("z"))),
            },
        ],
    }
}

/// A contract entering and serving its side graph: `open` takes the timed lock, `haggle`
/// runs under it, `increment` is an ordinary main-graph method.
pub fn novation_script(timeout_micros: i64) -> Script {
    Script {
        definitions: vec![Def::Global {
            name: "x".to_string(),
            init: Literal::LInt(0),
        }],
        graph: vec![],
        methods: vec![
            Method {
                name: "open".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::Call(
                    Prim::NovationInit,
                    vec![Expr::Lit(Literal::LTimedelta(fcl_runtime::Timedelta(
                        timeout_micros,
                    )))],
                ),
            },
            Method {
                name: "haggle".to_string(),
                tag: MethodTag::Subgraph("novation".to_string()),
                args: vec![],
                body: Expr::NoOp,
            },
            Method {
                name: "increment".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::Assign(
                    "x".to_string(),
                    Box::new(Expr::BinOp(
                        BinOp::Add,
                        Box::new(var("x")),
                        Box::new(int(1)),
                    )),
                ),
            },
        ],
    }
}

/// A contract recording its caller: `note_sender` stores the transaction issuer in a
/// global, `peek(c)` copies another contract's global `x`.
pub fn introspection_script() -> Script {
    Script {
        definitions: vec![
            Def::Global {
                name: "who".to_string(),
                init: Literal::LAccount([0u8; 32]),
            },
            Def::Global {
                name: "seen".to_string(),
                init: Literal::LInt(0),
            },
        ],
        graph: vec![],
        methods: vec![
            Method {
                name: "note_sender".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec![],
                body: Expr::Assign(
                    "who".to_string(),
                    Box::new(Expr::Call(Prim::Sender, vec![])),
                ),
            },
            Method {
                name: "peek".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec!["c".to_string()],
                body: Expr::Assign(
                    "seen".to_string(),
                    Box::new(Expr::Call(
                        Prim::ContractValue,
                        vec![var("c"), Expr::Lit(Literal::LMsg("x".to_string()))],
                    )),
                ),
            },
        ],
    }
}

/// A contract whose `bump` only runs at or before the given deadline.
pub fn deadline_script(deadline_micros: i64) -> Script {
    Script {
        definitions: vec![Def::Global {
            name: "x".to_string(),
            init: Literal::LInt(0),
        }],
        graph: vec![],
        methods: vec![Method {
            name: "bump".to_string(),
            tag: MethodTag::Main("initial".to_string()),
            args: vec![],
            body: Expr::Before(
                Box::new(Expr::Lit(Literal::LDatetime(fcl_runtime::Timestamp(
                    deadline_micros,
                )))),
                Box::new(Expr::Assign(
                    "x".to_string(),
                    Box::new(Expr::BinOp(
                        BinOp::Add,
                        Box::new(var("x")),
                        Box::new(int(1)),
                    )),
                )),
            ),
        }],
    }
}

/// A contract moving assets: `collect(asset, n)` pulls from the sender, `payout(asset,
/// n, to)` pays out of the contract's own holdings.
pub fn escrow_script() -> Script {
    Script {
        definitions: vec![],
        graph: vec![],
        methods: vec![
            Method {
                name: "collect".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec!["asset".to_string(), "n".to_string()],
                body: Expr::Call(Prim::TransferTo, vec![var("asset"), var("n")]),
            },
            Method {
                name: "payout".to_string(),
                tag: MethodTag::Main("initial".to_string()),
                args: vec!["asset".to_string(), "n".to_string(), "to".to_string()],
                body: Expr::Call(
                    Prim::TransferFrom,
                    vec![var("asset"), var("n"), var("to")],
                ),
            },
        ],
    }
}
