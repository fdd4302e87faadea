/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Tagged runtime values of the FCL evaluator.
//!
//! Every value a method can compute, store or hash is one of the [Value] variants. The
//! fixed-point variants carry their precision in the tag; arithmetic on mismatched
//! precisions is a typechecker invariant, not a runtime case.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::crypto::SafeInteger;
use crate::error::EvalFail;
use crate::script::{GraphState, Literal};
use crate::types::{Address, SigBytes, Timedelta, Timestamp};

/// Upper bound on `Msg` payloads, in bytes. Concatenation past this fails `HugeString`.
pub const MAX_MSG_LEN: usize = 1 << 20;

/// Fixed-point decimal scale, 1 to 6 fractional digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum FixedPrec {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
}

impl FixedPrec {
    pub fn digits(self) -> u32 {
        match self {
            FixedPrec::F1 => 1,
            FixedPrec::F2 => 2,
            FixedPrec::F3 => 3,
            FixedPrec::F4 => 4,
            FixedPrec::F5 => 5,
            FixedPrec::F6 => 6,
        }
    }

    /// `10^digits`, the denominator of the representation.
    pub fn unit(self) -> i64 {
        10_i64.pow(self.digits())
    }
}

/// A tagged runtime value.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    /// Scaled integer: `Fixed(p, n)` denotes `n / 10^p`.
    Fixed(FixedPrec, i64),
    Bool(bool),
    Msg(Vec<u8>),
    Account(Address),
    Asset(Address),
    Contract(Address),
    Address(Address),
    Sig(SigBytes),
    Datetime(Timestamp),
    Timedelta(Timedelta),
    State(GraphState),
    Crypto(SafeInteger),
    Void,
    Undefined,
}

impl Value {
    /// Lift a literal into a value.
    pub fn from_literal(lit: &Literal) -> Value {
        match lit {
            Literal::LInt(i) => Value::Int(*i),
            Literal::LFloat(f) => Value::Float(*f),
            Literal::LFixed(p, n) => Value::Fixed(*p, *n),
            Literal::LBool(b) => Value::Bool(*b),
            Literal::LMsg(s) => Value::Msg(s.as_bytes().to_vec()),
            Literal::LAccount(a) => Value::Account(*a),
            Literal::LAsset(a) => Value::Asset(*a),
            Literal::LContract(a) => Value::Contract(*a),
            Literal::LAddress(a) => Value::Address(*a),
            Literal::LDatetime(t) => Value::Datetime(*t),
            Literal::LTimedelta(d) => Value::Timedelta(*d),
            Literal::LState(label) => Value::State(GraphState::from_label(label)),
            Literal::LVoid => Value::Void,
        }
    }

    /// The address carried by an address-like value, if any.
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Account(a)
            | Value::Asset(a)
            | Value::Contract(a)
            | Value::Address(a) => Some(*a),
            _ => None,
        }
    }
}

/// Render a fixed-point value with exactly `prec` fractional digits, e.g. `-1.250` for
/// `n = -1250` at precision 3. This rendering is canonical: it feeds value hashing.
pub fn format_fixed(prec: FixedPrec, n: i64) -> String {
    let unit = prec.unit();
    let sign = if n < 0 { "-" } else { "" };
    // i64::MIN-safe via i128 widening
    let mag = (n as i128).unsigned_abs();
    let whole = mag / unit as u128;
    let frac = mag % unit as u128;
    format!(
        "{sign}{whole}.{frac:0width$}",
        width = prec.digits() as usize
    )
}

/// Narrow a widened arithmetic result back to `i64`, reporting which bound was crossed.
pub(crate) fn narrow_i64(wide: i128) -> Result<i64, EvalFail> {
    if wide > i64::MAX as i128 {
        return Err(EvalFail::Overflow);
    }
    if wide < i64::MIN as i128 {
        return Err(EvalFail::Underflow);
    }
    Ok(wide as i64)
}

/// Round `num / den` to the nearest integer, ties to even. `den` must be positive.
pub(crate) fn div_round_half_even(num: i128, den: i128) -> i128 {
    debug_assert!(den > 0);
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    let twice = r * 2;
    if twice > den || (twice == den && q % 2 != 0) {
        q + 1
    } else {
        q
    }
}

/// Fixed-point multiply at precision `p`: compute at double scale in i128, then round
/// half-to-even back to scale `p`.
pub fn fixed_mul(p: FixedPrec, a: i64, b: i64) -> Result<i64, EvalFail> {
    let wide = (a as i128) * (b as i128);
    let scaled = div_round_half_even(wide, p.unit() as i128);
    narrow_i64(scaled)
}

/// Fixed-point divide at precision `p`, rounding half-to-even.
pub fn fixed_div(p: FixedPrec, a: i64, b: i64) -> Result<i64, EvalFail> {
    if b == 0 {
        return Err(EvalFail::DivideByZero);
    }
    let num = (a as i128) * (p.unit() as i128);
    let den = b as i128;
    // normalise the divisor sign so the rounding helper sees a positive denominator
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let scaled = div_round_half_even(num, den);
    narrow_i64(scaled)
}

/// Convert a fixed-point value to its float reading.
pub fn fixed_to_float(p: FixedPrec, n: i64) -> f64 {
    n as f64 / p.unit() as f64
}

/// Convert a float to fixed-point at precision `p`: scale by `10^p` and round to nearest,
/// ties to even. Non-finite inputs and results outside the `i64` range fail `Overflow`.
pub fn float_to_fixed(p: FixedPrec, x: f64) -> Result<i64, EvalFail> {
    if !x.is_finite() {
        return Err(EvalFail::Overflow);
    }
    let scaled = (x * p.unit() as f64).round_ties_even();
    if scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
        return Err(EvalFail::Overflow);
    }
    Ok(scaled as i64)
}
