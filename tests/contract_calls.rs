//! Call-level integration: storage scopes, delta emission, graph and side-graph
//! lifecycle, and asset movement through contract methods.

mod common;

use common::*;

use fcl_runtime::delta::{AssetOp, Delta, LocalOp};
use fcl_runtime::error::{EvalFail, InvalidTxContract, InvalidTxHeader, TxCause};
use fcl_runtime::script::{BinOp, GraphState};
use fcl_runtime::storage::Storage;
use fcl_runtime::types::{AssetType, TxContract, TxHeader};
use fcl_runtime::{Contract, Runtime, Timestamp, Value, World};

const CONTRACT: fcl_runtime::Address = [0xCCu8; 32];
const USD: fcl_runtime::Address = [0xAAu8; 32];

fn call_header(method: &str, args: Vec<Value>) -> TxHeader {
    TxHeader::Contract(TxContract::Call {
        address: CONTRACT,
        method: method.to_string(),
        args,
    })
}

fn eval_cause(fail: EvalFail) -> TxCause {
    TxCause::InvalidTxHeader(InvalidTxHeader::Contract(InvalidTxContract::EvalFail(fail)))
}

/// One block with the given calls, proposed and signed by `caller`.
fn run_calls(
    world: World,
    caller: &ed25519_dalek::SigningKey,
    index: u64,
    timestamp: i64,
    headers: Vec<TxHeader>,
) -> fcl_runtime::TransitionResult {
    let origin = address_of(caller);
    let txs = headers
        .into_iter()
        .enumerate()
        .map(|(i, header)| signed_tx(caller, origin, timestamp + i as i64, header))
        .collect();
    let block = block(index, caller, timestamp, txs);
    Runtime::new(signing_key(99)).transition(world, &block)
}

fn world_with_contract(
    caller: &ed25519_dalek::SigningKey,
    script: fcl_runtime::script::Script,
) -> World {
    let mut world = world_with(&[caller]);
    let contract = Contract::new(CONTRACT, address_of(caller), Timestamp(BASE_TIME), script);
    world.add_contract(contract).unwrap();
    world
}

/// Seed scenario: incrementing a global starting at 7 leaves 8 in storage and a single
/// ModifyGlobal delta.
#[test]
fn test_increment_global() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, counter_script());

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("increment", vec![])],
    );
    assert_eq!(result.error, None);

    let contract = result.new_world.contract(&CONTRACT).unwrap();
    assert_eq!(contract.global_storage.get("x"), Some(&Value::Int(8)));
    assert_eq!(
        result.deltas.get(&CONTRACT).unwrap().as_slice(),
        &[Delta::ModifyGlobal {
            name: "x".to_string(),
            value: Value::Int(8),
        }]
    );
}

/// Seed scenario: Terminate emits its two deltas and makes the contract absorbing.
#[test]
fn test_terminate_is_absorbing() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, lifecycle_script());

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![
            call_header("finish", vec![]),
            call_header("crash", vec![]),
        ],
    );

    // first call terminated the contract with its two deltas
    assert_eq!(
        result.deltas.get(&CONTRACT).unwrap().as_slice(),
        &[
            Delta::ModifyState(GraphState::Terminal),
            Delta::Terminate(b"done".to_vec()),
        ]
    );
    assert_eq!(
        result.new_world.contract(&CONTRACT).unwrap().graph_state,
        GraphState::Terminal
    );

    // second call bounced off the terminal state, not off its own division by zero
    assert_eq!(result.invalid.len(), 1);
    assert_eq!(result.invalid[0].cause, eval_cause(EvalFail::TerminalState));
}

/// Seed scenario: division by zero aborts the call with no deltas.
#[test]
fn test_divide_by_zero_emits_no_deltas() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, lifecycle_script());

    let result = run_calls(
        world.clone(),
        &caller,
        1,
        BASE_TIME,
        vec![call_header("crash", vec![])],
    );
    assert_eq!(result.invalid[0].cause, eval_cause(EvalFail::DivideByZero));
    assert!(result.deltas.is_empty());
    assert_eq!(result.new_world, world);
}

/// Temp-storage writes die with the call: no delta, no storage change.
#[test]
fn test_temp_storage_is_method_scoped() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, lifecycle_script());

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("scratch", vec![])],
    );
    assert_eq!(result.error, None);
    assert!(result.deltas.is_empty());

    let contract = result.new_world.contract(&CONTRACT).unwrap();
    assert_eq!(contract.global_storage.get("x"), Some(&Value::Int(7)));
    assert!(contract.global_storage.get("note").is_none());
}

/// A method whose graph precondition does not match the current state is rejected; after
/// a Transition it becomes callable.
#[test]
fn test_graph_preconditions() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, lifecycle_script());

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("settle_only", vec![])],
    );
    assert!(matches!(
        &result.invalid[0].cause,
        TxCause::InvalidTxHeader(InvalidTxHeader::Contract(InvalidTxContract::EvalFail(
            EvalFail::InvalidState { .. }
        )))
    ));

    let result = run_calls(
        result.new_world,
        &caller,
        2,
        BASE_TIME + 1_000_000,
        vec![
            call_header("advance", vec![]),
            call_header("settle_only", vec![]),
        ],
    );
    assert_eq!(result.error, None);
    assert_eq!(
        result.deltas.get(&CONTRACT).unwrap().as_slice(),
        &[Delta::ModifyState(GraphState::Label("settled".to_string()))]
    );
    assert_eq!(
        result.new_world.contract(&CONTRACT).unwrap().graph_state,
        GraphState::Label("settled".to_string())
    );
}

/// Calling a method the contract does not have.
#[test]
fn test_no_such_method() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, counter_script());

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("missing", vec![])],
    );
    assert_eq!(
        result.invalid[0].cause,
        eval_cause(EvalFail::NoSuchMethod("missing".to_string()))
    );
}

/// Wrong argument count.
#[test]
fn test_method_arity() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, counter_script());

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("increment", vec![Value::Int(1)])],
    );
    assert_eq!(
        result.invalid[0].cause,
        eval_cause(EvalFail::MethodArityError {
            method: "increment".to_string(),
            expected: 0,
            got: 1,
        })
    );
}

/// Local writes update the counterparty's storage and always travel with a ModifyLocal
/// delta in its symbolic form.
#[test]
fn test_local_delta_machinery() {
    let caller = signing_key(1);
    let issuer = address_of(&caller);

    let mut world = world_with(&[&caller]);
    let mut contract = Contract::new(CONTRACT, issuer, Timestamp(BASE_TIME), locals_script());
    let mut locals = Storage::new();
    locals.put("y", Value::Int(5));
    locals.put("z", Value::Int(2));
    contract.local_storage.insert(issuer, locals);
    world.add_contract(contract).unwrap();

    // y = y + 3
    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("bump", vec![])],
    );
    assert_eq!(result.error, None);
    assert_eq!(
        result.deltas.get(&CONTRACT).unwrap().as_slice(),
        &[Delta::ModifyLocal {
            name: "y".to_string(),
            op: LocalOp::Op(BinOp::Add, Value::Int(3)),
        }]
    );
    let contract = result.new_world.contract(&CONTRACT).unwrap();
    assert_eq!(
        contract.local_storage.get(&issuer).unwrap().get("y"),
        Some(&Value::Int(8))
    );

    // y = z
    let result = run_calls(
        result.new_world,
        &caller,
        2,
        BASE_TIME + 1_000_000,
        vec![call_header("copy", vec![])],
    );
    assert_eq!(result.error, None);
    assert_eq!(
        result.deltas.get(&CONTRACT).unwrap().as_slice(),
        &[Delta::ModifyLocal {
            name: "y".to_string(),
            op: LocalOp::Replace("z".to_string()),
        }]
    );
    let contract = result.new_world.contract(&CONTRACT).unwrap();
    assert_eq!(
        contract.local_storage.get(&issuer).unwrap().get("y"),
        Some(&Value::Int(2))
    );
}

/// A counterparty with no observed local value cannot apply a local update.
#[test]
fn test_local_var_not_found() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, locals_script());

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("bump", vec![])],
    );
    assert_eq!(
        result.invalid[0].cause,
        eval_cause(EvalFail::LocalVarNotFound("y".to_string()))
    );
}

/// The side-graph lock admits only subgraph methods until it expires.
#[test]
fn test_novation_lock_and_timeout() {
    let caller = signing_key(1);
    let timeout = 3_600_000_000; // one hour
    let world = world_with_contract(&caller, novation_script(timeout));

    // enter the side graph
    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("open", vec![])],
    );
    assert_eq!(result.error, None);

    // under the lock: main methods bounce, subgraph methods run
    let result = run_calls(
        result.new_world,
        &caller,
        2,
        BASE_TIME + 60_000_000,
        vec![
            call_header("increment", vec![]),
            call_header("haggle", vec![]),
        ],
    );
    assert_eq!(result.invalid.len(), 1);
    assert_eq!(result.invalid[0].cause, eval_cause(EvalFail::SubgraphLock));

    // past the expiry the lock releases implicitly and main methods run again
    let result = run_calls(
        result.new_world,
        &caller,
        3,
        BASE_TIME + timeout + 1_000_000,
        vec![call_header("increment", vec![])],
    );
    assert_eq!(result.error, None);
    let contract = result.new_world.contract(&CONTRACT).unwrap();
    assert_eq!(contract.global_storage.get("x"), Some(&Value::Int(1)));
}

/// A subgraph method without an active lock is out of place.
#[test]
fn test_subgraph_method_requires_lock() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, novation_script(3_600_000_000));

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("haggle", vec![])],
    );
    assert!(matches!(
        &result.invalid[0].cause,
        TxCause::InvalidTxHeader(InvalidTxHeader::Contract(InvalidTxContract::EvalFail(
            EvalFail::InvalidState { .. }
        )))
    ));
}

/// Asset movement through contract methods: holdings move, supply is conserved, deltas
/// record the movement.
#[test]
fn test_asset_primitives_conserve_supply() {
    let caller = signing_key(1);
    let origin = address_of(&caller);
    let mut world = world_with_contract(&caller, escrow_script());
    world
        .add_asset(fcl_runtime::Asset::new(
            USD,
            "USD".to_string(),
            origin,
            1000,
            None,
            AssetType::Discrete,
            Timestamp(BASE_TIME),
        ))
        .unwrap();

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![
            call_header("collect", vec![Value::Asset(USD), Value::Int(10)]),
            call_header(
                "payout",
                vec![Value::Asset(USD), Value::Int(4), Value::Account(origin)],
            ),
        ],
    );
    assert_eq!(result.error, None);

    let asset = result.new_world.asset(&USD).unwrap();
    assert_eq!(asset.holding(&CONTRACT), 6);
    assert_eq!(asset.holding(&origin), 994);
    assert_eq!(asset.total_holdings(), asset.supply);

    assert_eq!(
        result.deltas.get(&CONTRACT).unwrap().as_slice(),
        &[
            Delta::ModifyAsset(AssetOp::TransferTo {
                asset: USD,
                amount: 10,
            }),
            Delta::ModifyAsset(AssetOp::TransferFrom {
                asset: USD,
                to: origin,
                amount: 4,
            }),
        ]
    );
}

/// An over-draining transfer fails the call with AssetIntegrity and leaves both the
/// asset and the delta log untouched.
#[test]
fn test_failed_transfer_aborts_call() {
    let caller = signing_key(1);
    let origin = address_of(&caller);
    let mut world = world_with_contract(&caller, escrow_script());
    world
        .add_asset(fcl_runtime::Asset::new(
            USD,
            "USD".to_string(),
            origin,
            100,
            None,
            AssetType::Discrete,
            Timestamp(BASE_TIME),
        ))
        .unwrap();

    let result = run_calls(
        world.clone(),
        &caller,
        1,
        BASE_TIME,
        vec![call_header("collect", vec![Value::Asset(USD), Value::Int(101)])],
    );
    assert_eq!(
        result.invalid[0].cause,
        eval_cause(EvalFail::AssetIntegrity(USD))
    );
    assert!(result.deltas.is_empty());
    assert_eq!(result.new_world, world);
}

/// Introspection primitives read the call context; ContractValue reads another
/// contract's global storage.
#[test]
fn test_introspection_and_cross_contract_read() {
    let caller = signing_key(1);
    let origin = address_of(&caller);
    const OTHER: fcl_runtime::Address = [0xDDu8; 32];

    let mut world = world_with_contract(&caller, introspection_script());
    world
        .add_contract(Contract::new(
            OTHER,
            origin,
            Timestamp(BASE_TIME),
            counter_script(),
        ))
        .unwrap();

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![
            call_header("note_sender", vec![]),
            call_header("peek", vec![Value::Contract(OTHER)]),
        ],
    );
    assert_eq!(result.error, None);

    let contract = result.new_world.contract(&CONTRACT).unwrap();
    assert_eq!(
        contract.global_storage.get("who"),
        Some(&Value::Account(origin))
    );
    assert_eq!(contract.global_storage.get("seen"), Some(&Value::Int(7)));
}

/// Reading a global that does not exist on the target contract is a contract-integrity
/// failure.
#[test]
fn test_contract_value_missing_variable() {
    let caller = signing_key(1);
    let mut world = world_with_contract(&caller, introspection_script());

    // the escrow contract declares no globals at all
    const EMPTY: fcl_runtime::Address = [0xEEu8; 32];
    world
        .add_contract(Contract::new(
            EMPTY,
            address_of(&caller),
            Timestamp(BASE_TIME),
            escrow_script(),
        ))
        .unwrap();

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("peek", vec![Value::Contract(EMPTY)])],
    );
    assert_eq!(
        result.invalid[0].cause,
        eval_cause(EvalFail::ContractIntegrity(EMPTY))
    );
}

/// A Before guard runs its body up to the deadline and degrades to a no-op after it.
#[test]
fn test_before_guard_follows_block_time() {
    let caller = signing_key(1);
    let deadline = BASE_TIME + 3_600_000_000;
    let world = world_with_contract(&caller, deadline_script(deadline));

    // inside the window the body runs
    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![call_header("bump", vec![])],
    );
    assert_eq!(result.error, None);
    assert_eq!(
        result.new_world.contract(&CONTRACT).unwrap().global_storage.get("x"),
        Some(&Value::Int(1))
    );

    // past the deadline the call still succeeds but changes nothing
    let result = run_calls(
        result.new_world,
        &caller,
        2,
        deadline + 1,
        vec![call_header("bump", vec![])],
    );
    assert_eq!(result.error, None);
    assert!(result.deltas.is_empty());
    assert_eq!(
        result.new_world.contract(&CONTRACT).unwrap().global_storage.get("x"),
        Some(&Value::Int(1))
    );
}

/// Applying the same block to the same world twice yields identical results.
#[test]
fn test_transition_is_deterministic() {
    let caller = signing_key(1);
    let world = world_with_contract(&caller, counter_script());

    let origin = address_of(&caller);
    let txs = vec![signed_tx(
        &caller,
        origin,
        BASE_TIME,
        call_header("increment", vec![]),
    )];
    let b = block(1, &caller, BASE_TIME, txs);

    let runtime = Runtime::new(signing_key(99));
    let first = runtime.transition(world.clone(), &b);
    let second = runtime.transition(world, &b);
    assert_eq!(first, second);
}

/// Deploying a contract through a transaction initializes its globals from the script.
#[test]
fn test_create_contract_and_call_in_one_block() {
    let caller = signing_key(1);
    let world = world_with(&[&caller]);
    let origin = address_of(&caller);

    let result = run_calls(
        world,
        &caller,
        1,
        BASE_TIME,
        vec![
            TxHeader::Contract(TxContract::CreateContract {
                address: CONTRACT,
                script: counter_script(),
            }),
            call_header("increment", vec![]),
        ],
    );
    assert_eq!(result.error, None);

    let contract = result.new_world.contract(&CONTRACT).unwrap();
    assert_eq!(contract.owner, origin);
    assert_eq!(contract.global_storage.get("x"), Some(&Value::Int(8)));
}
