mod gate;
pub mod identity;
pub mod model;
mod policy;

pub use gate::ClipboardGate;
pub use identity::{IdentityError, IdentityVerifier, UidRegistry};
pub use model::{AccessDecision, AccessRequest, AuditEvent, DecisionReason, EntryPoint, Evaluation};
pub use policy::{AccessPolicy, DEFAULT_AUDIT_CAPACITY};

pub use clipboard_whitelist_store::LOG_TARGET;
