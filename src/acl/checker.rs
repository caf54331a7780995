//! ACL checker
//!
//! Ties configuration, the identity backend, superuser detection and the
//! rule cache together for callers that start from raw request data.

use crate::acl::cache::RuleCache;
use crate::acl::resolver::{Resolution, resolve};
use crate::acl::types::AclContext;
use crate::config::AppConfig;
use crate::identity::{IdentityBackend, SuperuserList, create_identity_backend};

/// Request-level entry point for ACL checks
pub struct AclChecker {
    acl_enabled: bool,
    superusers: SuperuserList,
    backend: Option<Box<dyn IdentityBackend>>,
    cache: RuleCache,
}

impl AclChecker {
    /// Create a checker from configuration
    pub fn new(config: &AppConfig) -> Self {
        Self {
            acl_enabled: config.acl.enabled,
            superusers: SuperuserList::new(&config.acl.superuser),
            backend: create_identity_backend(&config.identity),
            cache: RuleCache::new(),
        }
    }

    /// Create a checker with an explicit identity backend
    pub fn with_backend(config: &AppConfig, backend: Option<Box<dyn IdentityBackend>>) -> Self {
        Self {
            backend,
            ..Self::new(config)
        }
    }

    /// Build the normalized context for a request
    pub fn context<G: AsRef<str>>(&self, id: &str, user: &str, groups: &[G]) -> AclContext {
        let backend = self.backend.as_deref();
        let is_admin = backend.is_some_and(|b| self.superusers.contains(user, groups, b));

        AclContext::new(id, user, groups, backend, is_admin).with_acl_enabled(self.acl_enabled)
    }

    /// Resolve the permission of a user on a page under the given rule lines
    pub fn check<S: AsRef<str>, G: AsRef<str>>(
        &self,
        lines: &[S],
        id: &str,
        user: &str,
        groups: &[G],
    ) -> Resolution {
        let rules = self.cache.get_or_compile(lines);
        resolve(rules.rules(), &self.context(id, user, groups))
    }

    pub fn cache(&self) -> &RuleCache {
        &self.cache
    }
}
