/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implements execution of account operations.

use crate::crypto;
use crate::error::InvalidTxAccount;
use crate::types::{Address, BlockData};
use crate::world::{Account, World};

/// CreateAccount
///
/// Decode the embedded public key, derive the account address from it and register the
/// account. Fails if the key bytes are invalid or the address collides with any entity.
pub(crate) fn create_account(
    world: &mut World,
    public_key: &[u8],
    timezone: &str,
    metadata: &[(String, String)],
) -> Result<(), InvalidTxAccount> {
    let key = crypto::try_decode_pub(public_key)
        .ok_or(InvalidTxAccount::InvalidPubKeyByteString)?;
    let account = Account {
        address: crypto::account_address(&key),
        public_key: key.as_bytes().to_vec(),
        timezone: timezone.to_string(),
        metadata: metadata.iter().cloned().collect(),
    };
    world.add_account(account)?;
    Ok(())
}

/// RevokeAccount
///
/// Remove an account, unless it is a validator of the current block.
pub(crate) fn revoke_account(
    world: &mut World,
    bd: &BlockData,
    address: &Address,
) -> Result<(), InvalidTxAccount> {
    world.account(address)?;
    if bd.is_validator(address) {
        return Err(InvalidTxAccount::RevokeValidatorError(*address));
    }
    world.remove_account(address)?;
    Ok(())
}
