/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Deterministic key operations and homomorphic ciphertext arithmetic.
//!
//! Signing is Ed25519 (RFC 8032), which is deterministic by construction: the same key and
//! message always produce the same signature, so validators agree on `Sign` primitive
//! output without a nonce protocol. Ciphertexts are residues in the multiplicative group
//! mod `n²` under a contract-owned key; the core only combines ciphertexts, it never
//! encrypts or decrypts.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::EvalFail;
use crate::types::{Address, SigBytes};

/// Decode 32 public-key bytes into a verifying key. Fails on wrong length or a byte string
/// that is not a valid curve point.
pub fn try_decode_pub(bytes: &[u8]) -> Option<VerifyingKey> {
    let arr: [u8; 32] = bytes.try_into().ok()?;
    VerifyingKey::from_bytes(&arr).ok()
}

/// Sign a message with the node key.
pub fn sign(key: &SigningKey, message: &[u8]) -> SigBytes {
    key.sign(message).to_bytes()
}

/// Verify a signature over a message with a decoded key.
pub fn verify_key(public_key: &VerifyingKey, signature: &SigBytes, message: &[u8]) -> bool {
    let signature = ed25519_dalek::Signature::from_bytes(signature);
    public_key.verify(message, &signature).is_ok()
}

/// Verify a signature over a message against raw key bytes. Undecodable keys verify as
/// false; callers that must report a decode failure distinctly decode with
/// [try_decode_pub] first and use [verify_key].
pub fn verify(public_key: &[u8], signature: &SigBytes, message: &[u8]) -> bool {
    match try_decode_pub(public_key) {
        Some(public_key) => verify_key(&public_key, signature, message),
        None => false,
    }
}

/// Derive an account address from its public key.
pub fn account_address(public_key: &VerifyingKey) -> Address {
    let digest = Sha256::digest(public_key.as_bytes());
    digest.into()
}

/// Magnitude bound of [SafeInteger].
pub const SAFE_INTEGER_BOUND: i64 = 1 << 62;

/// Bounded-range integer used to carry ciphertext residues without exceeding
/// serialization limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, BorshSerialize, BorshDeserialize)]
pub struct SafeInteger(i64);

impl SafeInteger {
    /// Admit an integer into the safe range, failing `HugeInteger` past ±2^62.
    pub fn new(value: i64) -> Result<SafeInteger, EvalFail> {
        if value.abs() >= SAFE_INTEGER_BOUND {
            return Err(EvalFail::HugeInteger);
        }
        Ok(SafeInteger(value))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

/// Public parameters of the contract-owned homomorphic key: the modulus `n` and its
/// square, the ciphertext-group modulus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CipherKey {
    n: u64,
    n_squared: u64,
}

impl CipherKey {
    /// Derive the stable key for a contract. The modulus is forced into `[2^30, 2^31)` and
    /// odd, so every residue mod `n²` stays inside the [SafeInteger] bound.
    pub fn for_contract(address: &Address) -> CipherKey {
        let digest = Sha256::digest(address);
        let seed = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        let n = ((seed & 0x3FFF_FFFF) | 0x4000_0000 | 1) as u64;
        CipherKey {
            n,
            n_squared: n * n,
        }
    }

    /// Admit a ciphertext operand: a non-negative residue below `n²`.
    fn residue(&self, c: SafeInteger) -> Result<u64, EvalFail> {
        let c = c.value();
        if c < 0 || c as u64 >= self.n_squared {
            return Err(EvalFail::HomomorphicFail);
        }
        Ok(c as u64)
    }

    /// Homomorphic addition: the product of the ciphertext residues.
    pub fn cipher_add(&self, a: SafeInteger, b: SafeInteger) -> Result<SafeInteger, EvalFail> {
        let r = mul_mod(self.residue(a)?, self.residue(b)?, self.n_squared);
        SafeInteger::new(r as i64)
    }

    /// Homomorphic subtraction: multiply by the modular inverse of the subtrahend.
    pub fn cipher_sub(&self, a: SafeInteger, b: SafeInteger) -> Result<SafeInteger, EvalFail> {
        let inv = inv_mod(self.residue(b)?, self.n_squared).ok_or(EvalFail::HomomorphicFail)?;
        let r = mul_mod(self.residue(a)?, inv, self.n_squared);
        SafeInteger::new(r as i64)
    }

    /// Homomorphic scalar multiplication: raise the ciphertext to the scalar. Negative
    /// scalars go through the modular inverse.
    pub fn cipher_mul(&self, c: SafeInteger, scalar: i64) -> Result<SafeInteger, EvalFail> {
        let mut base = self.residue(c)?;
        let exp = if scalar < 0 {
            base = inv_mod(base, self.n_squared).ok_or(EvalFail::HomomorphicFail)?;
            scalar.unsigned_abs()
        } else {
            scalar as u64
        };
        let r = pow_mod(base, exp, self.n_squared);
        SafeInteger::new(r as i64)
    }
}

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut acc: u64 = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    acc
}

/// Modular inverse by the extended Euclidean algorithm; `None` when `gcd(a, m) != 1`.
fn inv_mod(a: u64, m: u64) -> Option<u64> {
    let (mut old_r, mut r) = (a as i128, m as i128);
    let (mut old_s, mut s) = (1_i128, 0_i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(m as i128) as u64)
}
