use crate::model::AccessRequest;
use crate::policy::AccessPolicy;

/// Boolean surface handed to the host's interception layer.
///
/// A missing package name is treated like an empty one and is always denied.
pub trait ClipboardGate: Send + Sync {
    /// `true` only when the host should skip its own access check.
    fn access_allowed(&self, op_code: i32, package: Option<&str>, calling_uid: i32) -> bool;

    /// `true` only when the host should skip showing its access notification.
    fn suppress_notification(&self, package: Option<&str>) -> bool;
}

impl ClipboardGate for AccessPolicy {
    fn access_allowed(&self, op_code: i32, package: Option<&str>, calling_uid: i32) -> bool {
        let request = AccessRequest::new(op_code, calling_uid, package.unwrap_or_default());
        self.check_access(&request).is_allow()
    }

    fn suppress_notification(&self, package: Option<&str>) -> bool {
        self.check_notification(package.unwrap_or_default())
            .is_suppressed()
    }
}
