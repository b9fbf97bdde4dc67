//! Nullable store: thread-safe in-memory records for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use kyc_store::{CheckStore, Inserted, StoreError, Swapped, UserStore};
use kyc_types::{Address, Check, CheckId, User};

#[derive(Default)]
struct Records {
    users: HashMap<Address, User>,
    checks: HashMap<CheckId, Check>,
    user_checks: HashMap<Address, CheckId>,
}

/// An in-memory user + check store.
///
/// All maps sit behind one mutex so compare-and-create inserts are atomic,
/// matching the LMDB backend's single-writer semantics.
#[derive(Default)]
pub struct NullStore {
    records: Mutex<Records>,
    unavailable: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn check_count(&self) -> usize {
        self.records
            .lock()
            .map(|r| r.checks.len())
            .unwrap_or_default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Records>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store is unavailable".into()));
        }
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }
}

impl UserStore for NullStore {
    fn get_user(&self, address: &Address) -> Result<User, StoreError> {
        self.records()?
            .users
            .get(address)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(address.to_hex()))
    }

    fn user_exists(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self.records()?.users.contains_key(address))
    }

    fn insert_user_if_absent(&self, user: &User) -> Result<Inserted<User>, StoreError> {
        let mut records = self.records()?;
        if let Some(existing) = records.users.get(&user.address) {
            return Ok(Inserted::Existing(existing.clone()));
        }
        records.users.insert(user.address, user.clone());
        Ok(Inserted::Created(user.clone()))
    }

    fn user_count(&self) -> Result<u64, StoreError> {
        Ok(self.records()?.users.len() as u64)
    }
}

impl CheckStore for NullStore {
    fn get_check(&self, check_id: &CheckId) -> Result<Check, StoreError> {
        self.records()?
            .checks
            .get(check_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(check_id.to_string()))
    }

    fn check_for_user(&self, user: &Address) -> Result<Option<Check>, StoreError> {
        let records = self.records()?;
        let Some(check_id) = records.user_checks.get(user) else {
            return Ok(None);
        };
        records
            .checks
            .get(check_id)
            .cloned()
            .map(Some)
            .ok_or_else(|| StoreError::Corruption(format!("user {user} points at missing check")))
    }

    fn insert_check_if_absent(&self, check: &Check) -> Result<Inserted<Check>, StoreError> {
        let mut records = self.records()?;
        if let Some(existing_id) = records.user_checks.get(&check.user) {
            let existing = records.checks.get(existing_id).cloned().ok_or_else(|| {
                StoreError::Corruption(format!("user {} points at missing check", check.user))
            })?;
            return Ok(Inserted::Existing(existing));
        }
        if records.checks.contains_key(&check.check_id) {
            return Err(StoreError::Duplicate(check.check_id.to_string()));
        }
        records.checks.insert(check.check_id.clone(), check.clone());
        records
            .user_checks
            .insert(check.user, check.check_id.clone());
        Ok(Inserted::Created(check.clone()))
    }

    fn compare_and_swap_check(
        &self,
        expected: &Check,
        new: &Check,
    ) -> Result<Swapped<Check>, StoreError> {
        let mut records = self.records()?;
        let Some(slot) = records.checks.get_mut(&expected.check_id) else {
            return Err(StoreError::NotFound(expected.check_id.to_string()));
        };
        if slot != expected {
            return Ok(Swapped::Stale(slot.clone()));
        }
        *slot = new.clone();
        Ok(Swapped::Updated(new.clone()))
    }
}
