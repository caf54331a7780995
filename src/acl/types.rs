//! ACL types
//!
//! Core types used by the rule compiler and the permission resolver.

use crate::identity::{IdentityBackend, name_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The group every principal belongs to. Never case-folded.
pub const ALL_GROUP: &str = "@ALL";

/// Permission level granted on a page or namespace
///
/// Levels are ordered numerically. Rule files may carry any non-negative
/// integer; the named constants are the wiki's well-known levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(u32);

impl Permission {
    pub const NONE: Permission = Permission(0);
    pub const READ: Permission = Permission(1);
    pub const EDIT: Permission = Permission(2);
    pub const CREATE: Permission = Permission(4);
    pub const UPLOAD: Permission = Permission(8);
    pub const DELETE: Permission = Permission(16);
    /// Only ever granted by admin detection, never by a rule
    pub const ADMIN: Permission = Permission(255);

    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    pub const fn level(&self) -> u32 {
        self.0
    }

    /// Clamp to the highest level a rule is allowed to grant
    pub fn capped(self) -> Self {
        self.min(Self::DELETE)
    }

    /// Name of the level, if it is one of the well-known constants
    pub const fn name(&self) -> Option<&'static str> {
        match self.0 {
            0 => Some("none"),
            1 => Some("read"),
            2 => Some("edit"),
            4 => Some("create"),
            8 => Some("upload"),
            16 => Some("delete"),
            255 => Some("admin"),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.level(), name),
            None => write!(f, "{}", self.level()),
        }
    }
}

/// Everything the resolver needs to know about a single request
///
/// Identities stored here are already normalized: case-folded when the
/// identity store is case-insensitive, cleaned, name-encoded, and groups
/// carry their `@` prefix.
#[derive(Debug, Clone)]
pub struct AclContext {
    /// Colon-separated page id
    pub resource_id: String,
    /// Normalized user name, may be empty for anonymous requests
    pub principal: String,
    /// Normalized, `@`-prefixed group names
    pub groups: Vec<String>,
    pub case_sensitive: bool,
    pub is_admin: bool,
    pub acl_enabled: bool,
    pub auth_available: bool,
}

impl AclContext {
    /// Build a context from raw identity data
    ///
    /// Passing `None` for the backend means no authentication backend is
    /// loaded; the resolver then denies everything.
    pub fn new<G: AsRef<str>>(
        resource_id: impl Into<String>,
        user: &str,
        groups: &[G],
        backend: Option<&dyn IdentityBackend>,
        is_admin: bool,
    ) -> Self {
        let resource_id = resource_id.into();
        let Some(backend) = backend else {
            return Self {
                resource_id,
                principal: String::new(),
                groups: Vec::new(),
                case_sensitive: true,
                is_admin,
                acl_enabled: true,
                auth_available: false,
            };
        };

        let case_sensitive = backend.is_case_sensitive();
        let fold = |s: &str| {
            if case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };

        let principal = name_encode(&backend.clean_user(&fold(user)));
        let groups = groups
            .iter()
            .map(|g| backend.clean_group(&fold(g.as_ref())))
            .map(|g| format!("@{}", name_encode(&g)))
            .collect();

        Self {
            resource_id,
            principal,
            groups,
            case_sensitive,
            is_admin,
            acl_enabled: true,
            auth_available: true,
        }
    }

    /// Mark ACL enforcement as switched off
    pub fn with_acl_enabled(mut self, enabled: bool) -> Self {
        self.acl_enabled = enabled;
        self
    }

    /// Check whether a resolved rule subject names this principal
    ///
    /// Candidates are the principal's groups, `@ALL`, and the user name
    /// itself when it is not empty.
    pub fn has_identity(&self, subject: &str) -> bool {
        subject == ALL_GROUP
            || self.groups.iter().any(|g| g == subject)
            || (!self.principal.is_empty() && self.principal == subject)
    }
}
