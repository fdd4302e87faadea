/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implements execution of asset operations.

use crate::error::InvalidTxAsset;
use crate::types::{Address, AssetType, Timestamp};
use crate::world::{Asset, World};

/// CreateAsset
///
/// Register an asset at the supplied address, issued by the transaction origin with the
/// transaction timestamp. The issuer initially holds the full supply.
#[allow(clippy::too_many_arguments)]
pub(crate) fn create_asset(
    world: &mut World,
    origin: Address,
    timestamp: Timestamp,
    address: Option<Address>,
    name: &str,
    supply: i64,
    reference: Option<&str>,
    asset_type: AssetType,
) -> Result<(), InvalidTxAsset> {
    let address = address.ok_or(InvalidTxAsset::MissingAssetAddress)?;
    let asset = Asset::new(
        address,
        name.to_string(),
        origin,
        supply,
        reference.map(str::to_string),
        asset_type,
        timestamp,
    );
    world.add_asset(asset)?;
    Ok(())
}

/// Transfer
///
/// Move units from the transaction origin to the recipient.
pub(crate) fn transfer(
    world: &mut World,
    origin: Address,
    asset: &Address,
    to: Address,
    amount: i64,
) -> Result<(), InvalidTxAsset> {
    world.transfer_asset(asset, origin, to, amount)?;
    Ok(())
}

/// Bind
///
/// Binds are negotiated off-chain and their on-chain semantics are unspecified; the
/// operation is rejected rather than silently accepted.
pub(crate) fn bind() -> Result<(), InvalidTxAsset> {
    Err(InvalidTxAsset::BindNotSupported)
}
