//! User record storage trait.

use crate::StoreError;
use kyc_types::{Address, User};

/// Outcome of a compare-and-create insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inserted<T> {
    /// No record existed; the given one was stored.
    Created(T),
    /// A record already existed and was left untouched.
    Existing(T),
}

impl<T> Inserted<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Created(v) | Self::Existing(v) => v,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Users keyed by lowercase address.
pub trait UserStore {
    /// Fetch a user; [`StoreError::NotFound`] if the address is unknown.
    fn get_user(&self, address: &Address) -> Result<User, StoreError>;

    fn user_exists(&self, address: &Address) -> Result<bool, StoreError>;

    /// Store `user` unless a user with the same address exists.
    ///
    /// The read and the write must be atomic with respect to other inserts
    /// for the same address.
    fn insert_user_if_absent(&self, user: &User) -> Result<Inserted<User>, StoreError>;

    fn user_count(&self) -> Result<u64, StoreError>;
}
