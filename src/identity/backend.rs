//! Identity backend trait
//!
//! Abstracts the parts of the user store the resolver depends on.

use crate::config::{IdentityBackendKind, IdentityConfig};

/// Identity store collaborator
///
/// Implementations decide whether names are compared case-sensitively and
/// how raw user and group names are cleaned before matching.
pub trait IdentityBackend: Send + Sync {
    /// Whether user and group names are case-sensitive
    fn is_case_sensitive(&self) -> bool;

    /// Clean a raw user name
    fn clean_user(&self, user: &str) -> String {
        user.trim().to_string()
    }

    /// Clean a raw group name (without its `@` prefix)
    fn clean_group(&self, group: &str) -> String {
        group.trim().to_string()
    }
}

/// Backend with default cleaning and a configurable case policy
#[derive(Debug, Clone, Copy)]
pub struct PlainIdentity {
    case_sensitive: bool,
}

impl PlainIdentity {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }
}

impl IdentityBackend for PlainIdentity {
    fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}

/// Create the identity backend described by configuration
///
/// Returns `None` when no backend is configured, which makes every
/// resolution deny access.
pub fn create_identity_backend(config: &IdentityConfig) -> Option<Box<dyn IdentityBackend>> {
    match config.backend {
        IdentityBackendKind::Plain => Some(Box::new(PlainIdentity::new(config.case_sensitive))),
        IdentityBackendKind::None => None,
    }
}
