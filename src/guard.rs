use std::sync::Arc;

use clipboard_access_policy::{AccessPolicy, ClipboardGate, IdentityVerifier};
use clipboard_whitelist_store::{FileSource, ReloadOutcome, WhitelistSource, WhitelistStore};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::config::GuardConfig;
use crate::errors::GuardError;
use crate::LOG_TARGET;

static GLOBAL: OnceCell<ClipboardGuard> = OnceCell::new();

/// Host-facing handle over one [`AccessPolicy`] and its whitelist store.
#[derive(Clone)]
pub struct ClipboardGuard {
    policy: Arc<AccessPolicy>,
}

impl ClipboardGuard {
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Builds a guard over the configured preferences file.
    pub fn from_config(
        config: &GuardConfig,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Result<Self, GuardError> {
        let path = config.whitelist_path()?;
        info!(target: LOG_TARGET, path = %path.display(), "using whitelist file");
        Ok(Self::from_source(
            Arc::new(FileSource::new(path)),
            verifier,
            config.audit.channel_capacity,
        ))
    }

    pub fn from_source(
        source: Arc<dyn WhitelistSource>,
        verifier: Arc<dyn IdentityVerifier>,
        audit_capacity: usize,
    ) -> Self {
        let store = Arc::new(WhitelistStore::new(source));
        Self::new(AccessPolicy::with_audit_capacity(
            store,
            verifier,
            audit_capacity,
        ))
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<WhitelistStore> {
        self.policy.store()
    }

    /// First load of the whitelist. Later loads happen on every decision.
    pub fn initialize(&self) -> ReloadOutcome {
        let outcome = self.store().reload();
        match &outcome {
            ReloadOutcome::Retained { error, .. } => warn!(
                target: LOG_TARGET,
                %error,
                "initial whitelist load failed; denying until the source is readable"
            ),
            _ => info!(
                target: LOG_TARGET,
                rev = outcome.rev(),
                enabled = self.store().snapshot().enabled_packages().len(),
                "whitelist loaded"
            ),
        }
        outcome
    }
}

impl ClipboardGate for ClipboardGuard {
    fn access_allowed(&self, op_code: i32, package: Option<&str>, calling_uid: i32) -> bool {
        self.policy.access_allowed(op_code, package, calling_uid)
    }

    fn suppress_notification(&self, package: Option<&str>) -> bool {
        self.policy.suppress_notification(package)
    }
}

/// Initializes `guard` and makes it the process-wide instance.
pub fn install(guard: ClipboardGuard) -> Result<&'static ClipboardGuard, GuardError> {
    if GLOBAL.get().is_some() {
        return Err(GuardError::AlreadyInstalled);
    }
    guard.initialize();
    GLOBAL
        .try_insert(guard)
        .map_err(|_| GuardError::AlreadyInstalled)
}

pub fn global() -> Option<&'static ClipboardGuard> {
    GLOBAL.get()
}

/// Host hook for the access-allowed check. Denies while no guard is installed.
pub fn clipboard_access_allowed(op_code: i32, package: Option<&str>, calling_uid: i32) -> bool {
    match global() {
        Some(guard) => guard.access_allowed(op_code, package, calling_uid),
        None => {
            warn!(target: LOG_TARGET, "clipboard guard not installed; leaving access to host");
            false
        }
    }
}

/// Host hook for the access notification. Never suppresses while no guard is
/// installed.
pub fn should_suppress_notification(package: Option<&str>) -> bool {
    match global() {
        Some(guard) => guard.suppress_notification(package),
        None => {
            warn!(target: LOG_TARGET, "clipboard guard not installed; showing notification");
            false
        }
    }
}
