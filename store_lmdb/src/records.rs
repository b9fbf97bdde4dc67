//! LMDB implementation of UserStore and CheckStore.
//!
//! Layout:
//! - `users`: lowercase address bytes -> bincode `User`
//! - `checks`: check id bytes -> bincode `Check`
//! - `user_checks`: lowercase address bytes -> check id bytes
//!
//! Compare-and-create inserts run their read and write inside one write
//! transaction. LMDB admits a single writer at a time, so two inserts for
//! the same key are serialized.

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};
use serde::de::DeserializeOwned;

use kyc_store::{CheckStore, Inserted, StoreError, Swapped, UserStore};
use kyc_types::{Address, Check, CheckId, User};

use crate::LmdbError;

pub struct LmdbRecordStore {
    pub(crate) env: Env,
    pub(crate) users_db: Database<Bytes, Bytes>,
    pub(crate) checks_db: Database<Bytes, Bytes>,
    pub(crate) user_checks_db: Database<Bytes, Bytes>,
}

fn address_key(address: &Address) -> Vec<u8> {
    address.to_hex().into_bytes()
}

fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(raw)?)
}

impl LmdbRecordStore {
    fn read_check(&self, rtxn: &RoTxn, check_id: &[u8]) -> Result<Option<Check>, LmdbError> {
        match self.checks_db.get(rtxn, check_id)? {
            Some(raw) => Ok(Some(decode(raw)?)),
            None => Ok(None),
        }
    }
}

impl UserStore for LmdbRecordStore {
    fn get_user(&self, address: &Address) -> Result<User, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let raw = self
            .users_db
            .get(&rtxn, &address_key(address))
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(address.to_hex()))?;
        Ok(decode(raw)?)
    }

    fn user_exists(&self, address: &Address) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .users_db
            .get(&rtxn, &address_key(address))
            .map_err(LmdbError::from)?;
        Ok(found.is_some())
    }

    fn insert_user_if_absent(&self, user: &User) -> Result<Inserted<User>, StoreError> {
        let key = address_key(&user.address);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        if let Some(raw) = self.users_db.get(&wtxn, &key).map_err(LmdbError::from)? {
            let existing: User = decode(raw)?;
            return Ok(Inserted::Existing(existing));
        }

        let value = bincode::serialize(user).map_err(LmdbError::from)?;
        self.users_db
            .put(&mut wtxn, &key, &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(Inserted::Created(user.clone()))
    }

    fn user_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.users_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

impl CheckStore for LmdbRecordStore {
    fn get_check(&self, check_id: &CheckId) -> Result<Check, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.read_check(&rtxn, check_id.as_str().as_bytes())?
            .ok_or_else(|| StoreError::NotFound(check_id.to_string()))
    }

    fn check_for_user(&self, user: &Address) -> Result<Option<Check>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(check_id) = self
            .user_checks_db
            .get(&rtxn, &address_key(user))
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        match self.read_check(&rtxn, check_id)? {
            Some(check) => Ok(Some(check)),
            None => Err(StoreError::Corruption(format!(
                "user {user} points at missing check {}",
                String::from_utf8_lossy(check_id)
            ))),
        }
    }

    fn insert_check_if_absent(&self, check: &Check) -> Result<Inserted<Check>, StoreError> {
        let user_key = address_key(&check.user);
        let check_key = check.check_id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        if let Some(existing_id) = self
            .user_checks_db
            .get(&wtxn, &user_key)
            .map_err(LmdbError::from)?
        {
            let existing = self.read_check(&wtxn, existing_id)?.ok_or_else(|| {
                StoreError::Corruption(format!("user {} points at missing check", check.user))
            })?;
            return Ok(Inserted::Existing(existing));
        }

        if self
            .checks_db
            .get(&wtxn, check_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(check.check_id.to_string()));
        }

        let value = bincode::serialize(check).map_err(LmdbError::from)?;
        self.checks_db
            .put(&mut wtxn, check_key, &value)
            .map_err(LmdbError::from)?;
        self.user_checks_db
            .put(&mut wtxn, &user_key, check_key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(Inserted::Created(check.clone()))
    }

    fn compare_and_swap_check(
        &self,
        expected: &Check,
        new: &Check,
    ) -> Result<Swapped<Check>, StoreError> {
        let key = expected.check_id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current = self
            .read_check(&wtxn, key)?
            .ok_or_else(|| StoreError::NotFound(expected.check_id.to_string()))?;
        if &current != expected {
            return Ok(Swapped::Stale(current));
        }
        let value = bincode::serialize(new).map_err(LmdbError::from)?;
        self.checks_db
            .put(&mut wtxn, key, &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(Swapped::Updated(new.clone()))
    }
}
