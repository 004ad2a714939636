use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::SystemTime;

use clipboard_whitelist_store::WhitelistStore;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::identity::IdentityVerifier;
use crate::model::{
    AccessDecision, AccessRequest, AuditEvent, DecisionReason, EntryPoint, Evaluation,
};
use crate::LOG_TARGET;

pub const DEFAULT_AUDIT_CAPACITY: usize = 128;

/// Decides clipboard access and notification suppression from the whitelist.
///
/// Every evaluation reloads the store first, so edits made by the settings
/// surface apply to the very next request. Any failure along the way resolves
/// to [`AccessDecision::Deny`].
pub struct AccessPolicy {
    store: Arc<WhitelistStore>,
    verifier: Arc<dyn IdentityVerifier>,
    events: broadcast::Sender<AuditEvent>,
}

impl AccessPolicy {
    pub fn new(store: Arc<WhitelistStore>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self::with_audit_capacity(store, verifier, DEFAULT_AUDIT_CAPACITY)
    }

    pub fn with_audit_capacity(
        store: Arc<WhitelistStore>,
        verifier: Arc<dyn IdentityVerifier>,
        capacity: usize,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            store,
            verifier,
            events: tx,
        }
    }

    pub fn store(&self) -> &Arc<WhitelistStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.events.subscribe()
    }

    /// Access-allowed check: identity first, then the whitelist.
    pub fn check_access(&self, request: &AccessRequest) -> AccessDecision {
        self.evaluate_access(request).decision
    }

    pub fn evaluate_access(&self, request: &AccessRequest) -> Evaluation {
        let evaluation = self.decide_access(request);
        match evaluation.decision {
            AccessDecision::Allow => debug!(
                target: LOG_TARGET,
                package = %request.package_name,
                uid = request.calling_uid,
                op = request.op_code,
                "clipboard access allowed"
            ),
            _ => debug!(
                target: LOG_TARGET,
                package = %request.package_name,
                uid = request.calling_uid,
                op = request.op_code,
                reason = ?evaluation.reason,
                "clipboard access left to host"
            ),
        }
        self.publish(
            EntryPoint::AccessCheck,
            Some(request.op_code),
            Some(request.calling_uid),
            &request.package_name,
            &evaluation,
        );
        evaluation
    }

    fn decide_access(&self, request: &AccessRequest) -> Evaluation {
        let Some(package) = request.package() else {
            return Evaluation::deny(DecisionReason::MissingPackage, None);
        };

        if let Err(reason) = self.verify_identity(request.calling_uid, package) {
            return Evaluation::deny(reason, None);
        }

        self.store.reload();
        let snapshot = self.store.snapshot();
        if snapshot.is_enabled(package) {
            Evaluation {
                decision: AccessDecision::Allow,
                reason: DecisionReason::Whitelisted,
                snapshot_rev: Some(snapshot.rev),
            }
        } else {
            Evaluation::deny(DecisionReason::NotWhitelisted, Some(snapshot.rev))
        }
    }

    /// Notification check: [`AccessDecision::Suppressed`] for whitelisted
    /// packages, otherwise [`AccessDecision::Deny`] so the host shows its
    /// notification as usual. Performs no identity verification and never
    /// returns [`AccessDecision::Allow`].
    pub fn check_notification(&self, package: &str) -> AccessDecision {
        self.evaluate_notification(package).decision
    }

    pub fn evaluate_notification(&self, package: &str) -> Evaluation {
        let evaluation = self.decide_notification(package);
        if evaluation.decision.is_suppressed() {
            debug!(target: LOG_TARGET, %package, "suppressing clipboard access notification");
        }
        self.publish(EntryPoint::NotificationCheck, None, None, package, &evaluation);
        evaluation
    }

    fn decide_notification(&self, package: &str) -> Evaluation {
        if package.trim().is_empty() {
            return Evaluation::deny(DecisionReason::MissingPackage, None);
        }

        self.store.reload();
        let snapshot = self.store.snapshot();
        if snapshot.is_enabled(package) {
            Evaluation {
                decision: AccessDecision::Suppressed,
                reason: DecisionReason::Whitelisted,
                snapshot_rev: Some(snapshot.rev),
            }
        } else {
            Evaluation::deny(DecisionReason::NotWhitelisted, Some(snapshot.rev))
        }
    }

    fn verify_identity(&self, uid: i32, package: &str) -> Result<(), DecisionReason> {
        let verifier = &self.verifier;
        let result = panic::catch_unwind(AssertUnwindSafe(|| verifier.verify(uid, package)));
        match result {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => {
                debug!(target: LOG_TARGET, %package, uid, "uid does not own package");
                Err(DecisionReason::IdentityMismatch)
            }
            Ok(Err(error)) => {
                warn!(target: LOG_TARGET, %package, uid, %error, "identity verification failed");
                Err(DecisionReason::IdentityError)
            }
            Err(_) => {
                warn!(target: LOG_TARGET, %package, uid, "identity verifier panicked");
                Err(DecisionReason::IdentityError)
            }
        }
    }

    fn publish(
        &self,
        entry_point: EntryPoint,
        op_code: Option<i32>,
        calling_uid: Option<i32>,
        package: &str,
        evaluation: &Evaluation,
    ) {
        if self.events.receiver_count() == 0 {
            return;
        }
        let event = AuditEvent {
            entry_point,
            op_code,
            calling_uid,
            package: package.to_string(),
            decision: evaluation.decision,
            reason: evaluation.reason,
            snapshot_rev: evaluation.snapshot_rev,
            timestamp: SystemTime::now(),
        };
        let _ = self.events.send(event);
    }
}
