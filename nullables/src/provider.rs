//! Nullable identity provider: sequential ids, scripted check results.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use kyc_provider::{IdentityProvider, NewApplicant, ProviderError};
use kyc_types::{ApplicantId, CheckId};

/// An identity provider that hands out `applicant-N` / `check-N` ids.
///
/// Check results default to not clear until set with [`set_result`].
///
/// [`set_result`]: NullIdentityProvider::set_result
#[derive(Default)]
pub struct NullIdentityProvider {
    next_id: AtomicU64,
    applicants: Mutex<Vec<NewApplicant>>,
    checks: Mutex<Vec<(ApplicantId, CheckId)>>,
    results: Mutex<HashMap<CheckId, bool>>,
    unavailable: AtomicBool,
}

impl NullIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_result(&self, check_id: &CheckId, clear: bool) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(check_id.clone(), clear);
    }

    /// Simulate a vendor outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn applicants(&self) -> Vec<NewApplicant> {
        self.applicants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn checks_created(&self) -> Vec<(ApplicantId, CheckId)> {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn ensure_available(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unreachable("null provider is unavailable".into()));
        }
        Ok(())
    }

    fn next(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl IdentityProvider for NullIdentityProvider {
    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<ApplicantId, ProviderError> {
        self.ensure_available()?;
        self.applicants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(applicant.clone());
        Ok(ApplicantId::new(format!("applicant-{}", self.next())))
    }

    async fn create_check(&self, applicant_id: &ApplicantId) -> Result<CheckId, ProviderError> {
        self.ensure_available()?;
        let check_id = CheckId::new(format!("check-{}", self.next()));
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((applicant_id.clone(), check_id.clone()));
        Ok(check_id)
    }

    async fn get_check_result(
        &self,
        _applicant_id: &ApplicantId,
        check_id: &CheckId,
    ) -> Result<bool, ProviderError> {
        self.ensure_available()?;
        Ok(self
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(check_id)
            .copied()
            .unwrap_or(false))
    }

    async fn sdk_token(
        &self,
        applicant_id: &ApplicantId,
        _referrer: &str,
    ) -> Result<String, ProviderError> {
        self.ensure_available()?;
        Ok(format!("sdk-{applicant_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_sequential() {
        let provider = NullIdentityProvider::new();
        let applicant = provider
            .create_applicant(&NewApplicant {
                first_name: "a".into(),
                last_name: "b".into(),
                email: "a@b.c".into(),
            })
            .await
            .unwrap();
        assert_eq!(applicant.as_str(), "applicant-1");
        let check = provider.create_check(&applicant).await.unwrap();
        assert_eq!(check.as_str(), "check-2");
        assert!(!provider.get_check_result(&applicant, &check).await.unwrap());
        provider.set_result(&check, true);
        assert!(provider.get_check_result(&applicant, &check).await.unwrap());
    }
}
