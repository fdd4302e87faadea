/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Operator dispatch over tagged operand pairs.
//!
//! The typechecker has already ruled out ill-typed pairings, so any combination outside
//! the table below is `Impossible`. The one deliberate exception is homomorphic values:
//! an unsupported operation on ciphertexts is a runtime condition and maps to
//! `HomomorphicFail`.

use crate::crypto::CipherKey;
use crate::error::EvalFail;
use crate::script::{BinOp, UnOp};
use crate::types::{Timedelta, Timestamp};
use crate::value::{fixed_div, fixed_mul, narrow_i64, Value, MAX_MSG_LEN};

pub(crate) fn apply_unop(op: UnOp, value: Value) -> Result<Value, EvalFail> {
    match (op, value) {
        (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        _ => Err(EvalFail::Impossible("negation of a non-bool")),
    }
}

pub(crate) fn apply_binop(
    key: &CipherKey,
    op: BinOp,
    a: Value,
    b: Value,
) -> Result<Value, EvalFail> {
    use Value::*;
    match (a, b) {
        (Int(x), Int(y)) => int_op(op, x, y),
        (Float(x), Float(y)) => float_op(op, x, y),
        (Fixed(p, x), Fixed(q, y)) => {
            if p != q {
                return Err(EvalFail::Impossible("fixed-point precision mismatch"));
            }
            fixed_op(op, p, x, y)
        }
        (Bool(x), Bool(y)) => match op {
            BinOp::And => Ok(Bool(x && y)),
            BinOp::Or => Ok(Bool(x || y)),
            BinOp::Eq => Ok(Bool(x == y)),
            BinOp::Neq => Ok(Bool(x != y)),
            _ => Err(EvalFail::Impossible("arithmetic on bools")),
        },
        (Crypto(x), Crypto(y)) => match op {
            BinOp::Add => key.cipher_add(x, y).map(Crypto),
            BinOp::Sub => key.cipher_sub(x, y).map(Crypto),
            _ => Err(EvalFail::HomomorphicFail),
        },
        (Crypto(x), Int(s)) | (Int(s), Crypto(x)) => match op {
            BinOp::Mul => key.cipher_mul(x, s).map(Crypto),
            _ => Err(EvalFail::HomomorphicFail),
        },
        (Datetime(t), Timedelta(d)) => datetime_op(op, t, d),
        (Timedelta(x), Timedelta(y)) => timedelta_op(op, x, y),
        (Timedelta(x), Int(s)) => timedelta_scale(op, x, s),
        (Datetime(x), Datetime(y)) => comparison(op, x, y)
            .ok_or(EvalFail::Impossible("unsupported datetime operation")),
        (Account(x), Account(y)) | (Asset(x), Asset(y)) | (Contract(x), Contract(y)) => match op {
            BinOp::Eq => Ok(Bool(x == y)),
            BinOp::Neq => Ok(Bool(x != y)),
            _ => Err(EvalFail::Impossible("only equality is defined on references")),
        },
        (Msg(x), Msg(y)) => msg_op(op, x, y),
        _ => Err(EvalFail::Impossible("ill-typed operand pair")),
    }
}

fn int_op(op: BinOp, x: i64, y: i64) -> Result<Value, EvalFail> {
    // widen to i128 so a failed operation reports the bound it actually crossed
    let (xw, yw) = (x as i128, y as i128);
    let value = match op {
        BinOp::Add => Value::Int(narrow_i64(xw + yw)?),
        BinOp::Sub => Value::Int(narrow_i64(xw - yw)?),
        BinOp::Mul => Value::Int(narrow_i64(xw * yw)?),
        BinOp::Div => {
            if y == 0 {
                return Err(EvalFail::DivideByZero);
            }
            Value::Int(narrow_i64(xw / yw)?)
        }
        _ => {
            return comparison(op, x, y)
                .ok_or(EvalFail::Impossible("logical operation on integers"))
        }
    };
    Ok(value)
}

fn datetime_op(op: BinOp, t: Timestamp, d: Timedelta) -> Result<Value, EvalFail> {
    match op {
        BinOp::Add => Ok(Value::Datetime(Timestamp(narrow_i64(
            t.0 as i128 + d.0 as i128,
        )?))),
        BinOp::Sub => Ok(Value::Datetime(Timestamp(narrow_i64(
            t.0 as i128 - d.0 as i128,
        )?))),
        _ => Err(EvalFail::Impossible("unsupported datetime operation")),
    }
}

fn timedelta_op(op: BinOp, x: Timedelta, y: Timedelta) -> Result<Value, EvalFail> {
    match op {
        BinOp::Add => Ok(Value::Timedelta(Timedelta(narrow_i64(
            x.0 as i128 + y.0 as i128,
        )?))),
        BinOp::Sub => Ok(Value::Timedelta(Timedelta(narrow_i64(
            x.0 as i128 - y.0 as i128,
        )?))),
        _ => Err(EvalFail::Impossible("unsupported timedelta operation")),
    }
}

fn timedelta_scale(op: BinOp, x: Timedelta, s: i64) -> Result<Value, EvalFail> {
    match op {
        BinOp::Mul => Ok(Value::Timedelta(Timedelta(narrow_i64(
            x.0 as i128 * s as i128,
        )?))),
        _ => Err(EvalFail::Impossible("unsupported timedelta operation")),
    }
}

fn float_op(op: BinOp, x: f64, y: f64) -> Result<Value, EvalFail> {
    let result = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            if y == 0.0 {
                return Err(EvalFail::DivideByZero);
            }
            x / y
        }
        _ => {
            return comparison(op, x, y)
                .ok_or(EvalFail::Impossible("logical operation on floats"))
        }
    };
    // keep NaN and infinity out of storage and hashing
    if !result.is_finite() {
        return Err(EvalFail::Overflow);
    }
    Ok(Value::Float(result))
}

fn fixed_op(
    op: BinOp,
    p: crate::value::FixedPrec,
    x: i64,
    y: i64,
) -> Result<Value, EvalFail> {
    let value = match op {
        BinOp::Add => Value::Fixed(p, narrow_i64(x as i128 + y as i128)?),
        BinOp::Sub => Value::Fixed(p, narrow_i64(x as i128 - y as i128)?),
        BinOp::Mul => Value::Fixed(p, fixed_mul(p, x, y)?),
        BinOp::Div => Value::Fixed(p, fixed_div(p, x, y)?),
        _ => {
            return comparison(op, x, y)
                .ok_or(EvalFail::Impossible("logical operation on fixed-point values"))
        }
    };
    Ok(value)
}

fn msg_op(op: BinOp, x: Vec<u8>, y: Vec<u8>) -> Result<Value, EvalFail> {
    match op {
        BinOp::Add => {
            if x.len() + y.len() > MAX_MSG_LEN {
                return Err(EvalFail::HugeString);
            }
            let mut joined = x;
            joined.extend_from_slice(&y);
            Ok(Value::Msg(joined))
        }
        _ => comparison(op, x, y).ok_or(EvalFail::Impossible("arithmetic on messages")),
    }
}

/// Ordering operators over any `PartialOrd` payload; `None` for non-comparison operators.
fn comparison<T: PartialOrd>(op: BinOp, x: T, y: T) -> Option<Value> {
    let result = match op {
        BinOp::Eq => x == y,
        BinOp::Neq => x != y,
        BinOp::Lt => x < y,
        BinOp::Leq => x <= y,
        BinOp::Gt => x > y,
        BinOp::Geq => x >= y,
        _ => return None,
    };
    Some(Value::Bool(result))
}
