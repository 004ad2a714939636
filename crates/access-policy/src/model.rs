use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// One clipboard access attempt reported by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub op_code: i32,
    pub calling_uid: i32,
    pub package_name: String,
}

impl AccessRequest {
    pub fn new(op_code: i32, calling_uid: i32, package_name: impl Into<String>) -> Self {
        Self {
            op_code,
            calling_uid,
            package_name: package_name.into(),
        }
    }

    /// The package name, or `None` when it is blank.
    pub fn package(&self) -> Option<&str> {
        if self.package_name.trim().is_empty() {
            None
        } else {
            Some(self.package_name.as_str())
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessDecision {
    /// Skip the host's confirmation and grant access.
    Allow,
    /// Fall through to default host behaviour.
    Deny,
    /// Skip the access notification. Never an access grant.
    Suppressed,
}

impl AccessDecision {
    pub fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_suppressed(self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionReason {
    Whitelisted,
    NotWhitelisted,
    MissingPackage,
    IdentityMismatch,
    IdentityError,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryPoint {
    AccessCheck,
    NotificationCheck,
}

/// Decision together with what produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub decision: AccessDecision,
    pub reason: DecisionReason,
    /// Revision of the snapshot consulted, if the whitelist was consulted at all.
    pub snapshot_rev: Option<u64>,
}

impl Evaluation {
    pub(crate) fn deny(reason: DecisionReason, snapshot_rev: Option<u64>) -> Self {
        Self {
            decision: AccessDecision::Deny,
            reason,
            snapshot_rev,
        }
    }
}

/// Emitted for every decision the policy makes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub entry_point: EntryPoint,
    pub op_code: Option<i32>,
    pub calling_uid: Option<i32>,
    pub package: String,
    pub decision: AccessDecision,
    pub reason: DecisionReason,
    pub snapshot_rev: Option<u64>,
    pub timestamp: SystemTime,
}
