//! Verification-check lifecycle.
//!
//! ```text
//! PENDING_DOCUMENT_UPLOAD --create--> WAITING_FOR_APPROVAL --complete--> ACCEPTED | DENIED
//!           any state ----------------force_accept-----------------------> ACCEPTED
//! ```
//!
//! Status is never stored; it is derived from the check record. The store's
//! compare-and-create insert upholds "at most one check per user".

use tracing::{info, warn};

use kyc_store::{CheckStore, Inserted, Swapped};
use kyc_types::{Address, Check, CheckId, User, VerificationStatus};

use crate::error::VerificationError;

/// Prefix of check ids minted by a manual override on a user with no check.
pub const MANUAL_CHECK_PREFIX: &str = "manual-";

pub struct CheckStateMachine;

impl CheckStateMachine {
    /// Record a vendor check for `user`.
    ///
    /// If the user already has a check it is returned unchanged as
    /// `Inserted::Existing` and `check_id` is discarded.
    pub fn create<S: CheckStore + ?Sized>(
        &self,
        store: &S,
        user: &User,
        check_id: CheckId,
    ) -> Result<Inserted<Check>, VerificationError> {
        let inserted = store.insert_check_if_absent(&Check::pending(check_id, user.address))?;
        match &inserted {
            Inserted::Created(check) => {
                info!(address = %user.address, check_id = %check.check_id, "check created");
            }
            Inserted::Existing(check) => {
                info!(address = %user.address, check_id = %check.check_id, "check already exists");
            }
        }
        Ok(inserted)
    }

    /// Apply the vendor's final result to a waiting check.
    ///
    /// Repeating a completion with the same result is a no-op; a different
    /// result for an already completed check is a `StateConflict`. The write
    /// is a compare-and-swap against the record the decision was made on, so
    /// a concurrent completion or override is re-evaluated, never overwritten.
    pub fn complete<S: CheckStore + ?Sized>(
        &self,
        store: &S,
        check_id: &CheckId,
        clear: bool,
    ) -> Result<Check, VerificationError> {
        let requested = if clear {
            VerificationStatus::Accepted
        } else {
            VerificationStatus::Denied
        };

        let mut current = store.get_check(check_id)?;
        loop {
            if current.is_verified {
                if current.is_clear == clear {
                    return Ok(current);
                }
                let status = VerificationStatus::derive(Some(&current));
                warn!(%check_id, current = %status, %requested, "conflicting completion ignored");
                return Err(VerificationError::StateConflict {
                    check_id: check_id.to_string(),
                    current: status,
                    requested,
                });
            }

            let completed = Check {
                is_verified: true,
                is_clear: clear,
                ..current.clone()
            };
            match store.compare_and_swap_check(&current, &completed)? {
                Swapped::Updated(check) => {
                    info!(%check_id, address = %check.user, status = %requested, "check completed");
                    return Ok(check);
                }
                Swapped::Stale(latest) => current = latest,
            }
        }
    }

    /// Operator override: force the user's check to ACCEPTED.
    ///
    /// A user without a check gets a synthetic `manual-<address>` check.
    pub fn force_accept<S: CheckStore + ?Sized>(
        &self,
        store: &S,
        user: &Address,
    ) -> Result<Check, VerificationError> {
        let mut current = match store.check_for_user(user)? {
            Some(check) => check,
            None => {
                let synthetic = Check {
                    is_verified: true,
                    is_clear: true,
                    ..Check::pending(CheckId::new(format!("{MANUAL_CHECK_PREFIX}{user}")), *user)
                };
                match store.insert_check_if_absent(&synthetic)? {
                    Inserted::Created(check) => {
                        info!(address = %user, check_id = %check.check_id, "manual check accepted");
                        return Ok(check);
                    }
                    // Lost a race with a vendor check; override that one.
                    Inserted::Existing(check) => check,
                }
            }
        };

        loop {
            if current.is_verified && current.is_clear {
                return Ok(current);
            }
            let accepted = Check {
                is_verified: true,
                is_clear: true,
                ..current.clone()
            };
            match store.compare_and_swap_check(&current, &accepted)? {
                Swapped::Updated(check) => {
                    info!(address = %user, check_id = %check.check_id, "check force-accepted");
                    return Ok(check);
                }
                Swapped::Stale(latest) => current = latest,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use kyc_nullables::NullStore;
    use kyc_store::{StoreError, UserStore};
    use kyc_types::TermsHash;

    fn user(seed: u8) -> User {
        User {
            address: Address::from_bytes([seed; 20]),
            applicant_id: "applicant-1".into(),
            terms_hash: TermsHash::new([0; 32]),
            terms_signature: String::new(),
        }
    }

    fn status(store: &NullStore, address: &Address) -> VerificationStatus {
        VerificationStatus::derive(store.check_for_user(address).unwrap().as_ref())
    }

    #[test]
    fn create_moves_to_waiting() {
        let store = NullStore::new();
        let u = user(1);
        assert_eq!(status(&store, &u.address), VerificationStatus::PendingDocumentUpload);

        let created = CheckStateMachine.create(&store, &u, "chk-1".into()).unwrap();
        assert!(created.was_created());
        assert_eq!(status(&store, &u.address), VerificationStatus::WaitingForApproval);
    }

    #[test]
    fn create_twice_keeps_one_check() {
        let store = NullStore::new();
        let u = user(1);
        CheckStateMachine.create(&store, &u, "chk-1".into()).unwrap();
        let again = CheckStateMachine.create(&store, &u, "chk-2".into()).unwrap();
        assert!(!again.was_created());
        assert_eq!(again.into_inner().check_id.as_str(), "chk-1");
        assert_eq!(store.check_count(), 1);
    }

    #[test]
    fn complete_clear_accepts() {
        let store = NullStore::new();
        let u = user(1);
        CheckStateMachine.create(&store, &u, "chk".into()).unwrap();
        let check = CheckStateMachine.complete(&store, &"chk".into(), true).unwrap();
        assert!(check.is_verified && check.is_clear);
        assert_eq!(status(&store, &u.address), VerificationStatus::Accepted);
    }

    #[test]
    fn complete_not_clear_denies() {
        let store = NullStore::new();
        let u = user(1);
        CheckStateMachine.create(&store, &u, "chk".into()).unwrap();
        CheckStateMachine.complete(&store, &"chk".into(), false).unwrap();
        assert_eq!(status(&store, &u.address), VerificationStatus::Denied);
    }

    #[test]
    fn complete_unknown_check_is_not_found_and_changes_nothing() {
        let store = NullStore::new();
        let u = user(1);
        store.insert_user_if_absent(&u).unwrap();
        CheckStateMachine.create(&store, &u, "chk".into()).unwrap();

        let err = CheckStateMachine
            .complete(&store, &"nope".into(), true)
            .unwrap_err();
        assert!(matches!(err, VerificationError::NotFound(_)));
        assert_eq!(status(&store, &u.address), VerificationStatus::WaitingForApproval);
        assert_eq!(store.check_count(), 1);
    }

    #[test]
    fn repeated_completion_is_idempotent() {
        let store = NullStore::new();
        let u = user(1);
        CheckStateMachine.create(&store, &u, "chk".into()).unwrap();
        let first = CheckStateMachine.complete(&store, &"chk".into(), false).unwrap();
        let second = CheckStateMachine.complete(&store, &"chk".into(), false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn conflicting_completion_is_rejected() {
        let store = NullStore::new();
        let u = user(1);
        CheckStateMachine.create(&store, &u, "chk".into()).unwrap();
        CheckStateMachine.complete(&store, &"chk".into(), false).unwrap();

        let err = CheckStateMachine
            .complete(&store, &"chk".into(), true)
            .unwrap_err();
        assert!(matches!(
            err,
            VerificationError::StateConflict {
                current: VerificationStatus::Denied,
                requested: VerificationStatus::Accepted,
                ..
            }
        ));
        assert_eq!(status(&store, &u.address), VerificationStatus::Denied);
    }

    #[test]
    fn force_accept_overrides_denied() {
        let store = NullStore::new();
        let u = user(1);
        CheckStateMachine.create(&store, &u, "chk".into()).unwrap();
        CheckStateMachine.complete(&store, &"chk".into(), false).unwrap();

        let check = CheckStateMachine.force_accept(&store, &u.address).unwrap();
        assert_eq!(check.check_id.as_str(), "chk");
        assert_eq!(status(&store, &u.address), VerificationStatus::Accepted);
    }

    #[test]
    fn force_accept_without_check_creates_manual_check() {
        let store = NullStore::new();
        let u = user(2);
        let check = CheckStateMachine.force_accept(&store, &u.address).unwrap();
        assert_eq!(
            check.check_id.as_str(),
            format!("manual-{}", u.address.to_hex())
        );
        assert_eq!(status(&store, &u.address), VerificationStatus::Accepted);
    }

    #[test]
    fn store_outage_surfaces_as_store_error() {
        let store = NullStore::new();
        store.set_unavailable(true);
        let err = CheckStateMachine
            .complete(&store, &"chk".into(), true)
            .unwrap_err();
        assert!(matches!(err, VerificationError::Store(_)));
    }

    /// Runs `interleave` against the inner store right before the first
    /// compare-and-swap, the way a competing request would.
    struct Interleaved<F: Fn(&NullStore)> {
        inner: NullStore,
        interleave: F,
        fired: AtomicBool,
    }

    impl<F: Fn(&NullStore)> Interleaved<F> {
        fn new(inner: NullStore, interleave: F) -> Self {
            Self {
                inner,
                interleave,
                fired: AtomicBool::new(false),
            }
        }
    }

    impl<F: Fn(&NullStore)> CheckStore for Interleaved<F> {
        fn get_check(&self, check_id: &CheckId) -> Result<Check, StoreError> {
            self.inner.get_check(check_id)
        }

        fn check_for_user(&self, user: &Address) -> Result<Option<Check>, StoreError> {
            self.inner.check_for_user(user)
        }

        fn insert_check_if_absent(&self, check: &Check) -> Result<Inserted<Check>, StoreError> {
            self.inner.insert_check_if_absent(check)
        }

        fn compare_and_swap_check(
            &self,
            expected: &Check,
            new: &Check,
        ) -> Result<Swapped<Check>, StoreError> {
            if !self.fired.swap(true, Ordering::SeqCst) {
                (self.interleave)(&self.inner);
            }
            self.inner.compare_and_swap_check(expected, new)
        }
    }

    fn store_with_check(u: &User) -> NullStore {
        let store = NullStore::new();
        CheckStateMachine.create(&store, u, "chk".into()).unwrap();
        store
    }

    #[test]
    fn override_landing_mid_completion_is_kept() {
        let u = user(1);
        let owner = u.address;
        let store = Interleaved::new(store_with_check(&u), move |inner| {
            CheckStateMachine.force_accept(inner, &owner).unwrap();
        });

        let err = CheckStateMachine
            .complete(&store, &"chk".into(), false)
            .unwrap_err();
        assert!(matches!(
            err,
            VerificationError::StateConflict {
                current: VerificationStatus::Accepted,
                requested: VerificationStatus::Denied,
                ..
            }
        ));
        assert_eq!(status(&store.inner, &owner), VerificationStatus::Accepted);
    }

    #[test]
    fn matching_completion_landing_mid_completion_is_idempotent() {
        let u = user(1);
        let store = Interleaved::new(store_with_check(&u), |inner| {
            CheckStateMachine.complete(inner, &"chk".into(), true).unwrap();
        });

        let check = CheckStateMachine
            .complete(&store, &"chk".into(), true)
            .unwrap();
        assert!(check.is_verified && check.is_clear);
        assert_eq!(status(&store.inner, &u.address), VerificationStatus::Accepted);
    }

    #[test]
    fn completion_landing_mid_override_is_overridden() {
        let u = user(1);
        let store = Interleaved::new(store_with_check(&u), |inner| {
            CheckStateMachine.complete(inner, &"chk".into(), false).unwrap();
        });

        let check = CheckStateMachine.force_accept(&store, &u.address).unwrap();
        assert!(check.is_verified && check.is_clear);
        assert_eq!(status(&store.inner, &u.address), VerificationStatus::Accepted);
    }
}
