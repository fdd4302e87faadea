/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The ledger world state: accounts, assets and contracts indexed by address.
//!
//! Transitions validate everything before writing anything, so a failed transition leaves
//! the world untouched. An address names at most one entity across all three maps; the
//! collision check at registration is what upholds that invariant.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::WorldError;
use crate::script::{Def, GraphState, Script, SideLock, SideState};
use crate::storage::Storage;
use crate::types::{Address, AssetType, Timestamp};
use crate::value::Value;

/// A registered account. The public key is kept in its raw byte form and decoded at the
/// point of use; a key that no longer decodes is reported there, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub public_key: Vec<u8>,
    pub timezone: String,
    pub metadata: BTreeMap<String, String>,
}

/// A registered asset and its holdings ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub address: Address,
    pub name: String,
    pub issuer: Address,
    pub supply: i64,
    pub reference: Option<String>,
    pub asset_type: AssetType,
    pub timestamp: Timestamp,
    pub holdings: BTreeMap<Address, i64>,
}

impl Asset {
    /// A fresh asset with the full supply held by the issuer.
    pub fn new(
        address: Address,
        name: String,
        issuer: Address,
        supply: i64,
        reference: Option<String>,
        asset_type: AssetType,
        timestamp: Timestamp,
    ) -> Asset {
        let mut holdings = BTreeMap::new();
        holdings.insert(issuer, supply);
        Asset {
            address,
            name,
            issuer,
            supply,
            reference,
            asset_type,
            timestamp,
            holdings,
        }
    }

    /// Units held by an address; absent holders read as zero.
    pub fn holding(&self, holder: &Address) -> i64 {
        self.holdings.get(holder).copied().unwrap_or(0)
    }

    /// Sum of all holdings. Equals `supply` at all times.
    pub fn total_holdings(&self) -> i64 {
        self.holdings.values().sum()
    }
}

/// A deployed contract.
#[derive(Clone, Debug, PartialEq)]
pub struct Contract {
    pub address: Address,
    pub owner: Address,
    pub timestamp: Timestamp,
    pub script: Script,
    pub global_storage: Storage,
    pub local_storage: BTreeMap<Address, Storage>,
    pub local_storage_vars: BTreeSet<String>,
    pub graph_state: GraphState,
    pub side_state: SideState,
    pub side_lock: Option<SideLock>,
}

impl Contract {
    /// Initialize a contract from its typechecked script: globals take their declared
    /// initial values, local declarations contribute names only, and the graph starts at
    /// `Initial`. Contracts are never deleted.
    pub fn new(address: Address, owner: Address, timestamp: Timestamp, script: Script) -> Contract {
        let mut global_storage = Storage::new();
        let mut local_storage_vars = BTreeSet::new();
        for def in &script.definitions {
            match def {
                Def::Global { name, init } => {
                    global_storage.put(name, Value::from_literal(init));
                }
                Def::Local { name } => {
                    local_storage_vars.insert(name.clone());
                }
            }
        }
        Contract {
            address,
            owner,
            timestamp,
            script,
            global_storage,
            local_storage: BTreeMap::new(),
            local_storage_vars,
            graph_state: GraphState::Initial,
            side_state: SideState::Inactive,
            side_lock: None,
        }
    }
}

/// The world state. All transitions either fully apply or leave the maps unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct World {
    accounts: BTreeMap<Address, Account>,
    assets: BTreeMap<Address, Asset>,
    contracts: BTreeMap<Address, Contract>,
}

impl World {
    pub fn new() -> World {
        World::default()
    }

    fn collides(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
            || self.assets.contains_key(address)
            || self.contracts.contains_key(address)
    }

    pub fn account(&self, address: &Address) -> Result<&Account, WorldError> {
        self.accounts
            .get(address)
            .ok_or(WorldError::AccountNotFound(*address))
    }

    pub fn asset(&self, address: &Address) -> Result<&Asset, WorldError> {
        self.assets
            .get(address)
            .ok_or(WorldError::AssetNotFound(*address))
    }

    pub fn contract(&self, address: &Address) -> Result<&Contract, WorldError> {
        self.contracts
            .get(address)
            .ok_or(WorldError::ContractNotFound(*address))
    }

    pub fn has_account(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    pub fn has_asset(&self, address: &Address) -> bool {
        self.assets.contains_key(address)
    }

    pub fn has_contract(&self, address: &Address) -> bool {
        self.contracts.contains_key(address)
    }

    pub fn add_account(&mut self, account: Account) -> Result<(), WorldError> {
        if self.collides(&account.address) {
            return Err(WorldError::AddressCollision(account.address));
        }
        self.accounts.insert(account.address, account);
        Ok(())
    }

    pub fn remove_account(&mut self, address: &Address) -> Result<(), WorldError> {
        self.accounts
            .remove(address)
            .map(|_| ())
            .ok_or(WorldError::AccountNotFound(*address))
    }

    pub fn add_asset(&mut self, asset: Asset) -> Result<(), WorldError> {
        if self.collides(&asset.address) {
            return Err(WorldError::AddressCollision(asset.address));
        }
        self.assets.insert(asset.address, asset);
        Ok(())
    }

    /// Move `amount` units of `asset` from `from` to `to`. Atomic: both sides are
    /// validated before either is written.
    pub fn transfer_asset(
        &mut self,
        asset: &Address,
        from: Address,
        to: Address,
        amount: i64,
    ) -> Result<(), WorldError> {
        if amount < 0 {
            return Err(WorldError::NegativeTransferAmount {
                asset: *asset,
                amount,
            });
        }
        let entry = self
            .assets
            .get_mut(asset)
            .ok_or(WorldError::AssetNotFound(*asset))?;
        let from_balance = entry.holding(&from);
        if from_balance < amount {
            return Err(WorldError::InsufficientHoldings {
                asset: *asset,
                holder: from,
                balance: from_balance,
                amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = entry.holding(&to);
        let to_new = to_balance
            .checked_add(amount)
            .ok_or(WorldError::HoldingsOverflow {
                asset: *asset,
                holder: to,
            })?;
        entry.holdings.insert(from, from_balance - amount);
        entry.holdings.insert(to, to_new);
        Ok(())
    }

    pub fn add_contract(&mut self, contract: Contract) -> Result<(), WorldError> {
        if self.collides(&contract.address) {
            return Err(WorldError::AddressCollision(contract.address));
        }
        self.contracts.insert(contract.address, contract);
        Ok(())
    }

    /// Replace the contents of a deployed contract; the address never changes.
    pub fn update_contract(
        &mut self,
        address: &Address,
        contract: Contract,
    ) -> Result<(), WorldError> {
        match self.contracts.get_mut(address) {
            Some(slot) => {
                *slot = Contract {
                    address: *address,
                    ..contract
                };
                Ok(())
            }
            None => Err(WorldError::ContractNotFound(*address)),
        }
    }
}
