//! Verification that a calling UID really owns the package it claims.

use std::collections::HashSet;

use dashmap::DashMap;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity registry unavailable: {0}")]
    Unavailable(String),
    #[error("identity lookup failed: {0}")]
    Lookup(String),
}

/// Host capability answering "does `uid` own `package`?".
///
/// `Ok(false)` is a mismatch; `Err` means the question could not be answered.
/// The policy treats both as a denial.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, uid: i32, package: &str) -> Result<bool, IdentityError>;
}

impl<F> IdentityVerifier for F
where
    F: Fn(i32, &str) -> Result<bool, IdentityError> + Send + Sync,
{
    fn verify(&self, uid: i32, package: &str) -> Result<bool, IdentityError> {
        self(uid, package)
    }
}

/// Concurrent uid → packages table, the shape of a package manager's
/// shared-uid bookkeeping.
#[derive(Debug, Default)]
pub struct UidRegistry {
    packages: DashMap<i32, HashSet<String>>,
}

impl UidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, uid: i32, package: impl Into<String>) {
        self.packages.entry(uid).or_default().insert(package.into());
    }

    pub fn unregister(&self, uid: i32, package: &str) -> bool {
        let removed = self
            .packages
            .get_mut(&uid)
            .map(|mut set| set.remove(package))
            .unwrap_or(false);
        self.packages.remove_if(&uid, |_, set| set.is_empty());
        removed
    }

    pub fn packages_for(&self, uid: i32) -> Vec<String> {
        let mut packages: Vec<String> = self
            .packages
            .get(&uid)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        packages.sort();
        packages
    }
}

impl IdentityVerifier for UidRegistry {
    fn verify(&self, uid: i32, package: &str) -> Result<bool, IdentityError> {
        Ok(self
            .packages
            .get(&uid)
            .map(|set| set.contains(package))
            .unwrap_or(false))
    }
}
