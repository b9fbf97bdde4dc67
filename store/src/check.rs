//! Check record storage trait.

use crate::user::Inserted;
use crate::StoreError;
use kyc_types::{Address, Check, CheckId};

/// Checks keyed by provider check id, with a one-to-one index by owning user.
pub trait CheckStore {
    /// Fetch a check; [`StoreError::NotFound`] if the id is unknown.
    fn get_check(&self, check_id: &CheckId) -> Result<Check, StoreError>;

    /// The check owned by `user`, if any.
    fn check_for_user(&self, user: &Address) -> Result<Option<Check>, StoreError>;

    /// Store `check` unless its owning user already has one.
    ///
    /// Serializable per owning user: two concurrent calls for the same user
    /// yield exactly one `Created`.
    fn insert_check_if_absent(&self, check: &Check) -> Result<Inserted<Check>, StoreError>;

    /// Replace the stored check with `new` only if it still equals `expected`.
    ///
    /// The comparison and the write are one atomic step. A mismatch leaves
    /// the record untouched and returns it as [`Swapped::Stale`].
    /// [`StoreError::NotFound`] if the check was never inserted.
    fn compare_and_swap_check(
        &self,
        expected: &Check,
        new: &Check,
    ) -> Result<Swapped<Check>, StoreError>;
}

/// Outcome of a compare-and-swap update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Swapped<T> {
    /// The stored record matched and was replaced; carries the new record.
    Updated(T),
    /// The stored record had changed; carries its current value.
    Stale(T),
}

/// A backend holding both record kinds.
pub trait RecordStore: super::UserStore + CheckStore + Send + Sync {}

impl<T> RecordStore for T where T: super::UserStore + CheckStore + Send + Sync {}
