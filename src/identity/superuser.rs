//! Superuser detection
//!
//! Admin status is decided outside the rule set. The wiki's `superuser`
//! setting lists users and `@groups` that always get admin rights.

use crate::identity::IdentityBackend;

/// Parsed list of superuser entries
#[derive(Debug, Clone, Default)]
pub struct SuperuserList {
    users: Vec<String>,
    groups: Vec<String>,
}

impl SuperuserList {
    /// Build from configured entries; `@name` denotes a group
    ///
    /// Each entry may itself be the wiki's comma-separated form, e.g.
    /// `alice,@admin`.
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut list = Self::default();
        for entry in entries.iter().flat_map(|e| e.as_ref().split(',')) {
            let entry = entry.trim();
            if let Some(group) = entry.strip_prefix('@') {
                if !group.is_empty() {
                    list.groups.push(group.to_string());
                }
            } else if !entry.is_empty() {
                list.users.push(entry.to_string());
            }
        }
        list
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }

    /// Check whether a user, or one of their groups, is a superuser
    pub fn contains<G: AsRef<str>>(
        &self,
        user: &str,
        groups: &[G],
        backend: &dyn IdentityBackend,
    ) -> bool {
        let fold = |s: &str| {
            if backend.is_case_sensitive() {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };

        if !user.is_empty() {
            let user = backend.clean_user(&fold(user));
            if self
                .users
                .iter()
                .any(|u| backend.clean_user(&fold(u.as_str())) == user)
            {
                return true;
            }
        }

        let groups: Vec<String> = groups
            .iter()
            .map(|g| backend.clean_group(&fold(g.as_ref())))
            .collect();
        self.groups
            .iter()
            .map(|g| backend.clean_group(&fold(g.as_str())))
            .any(|g| groups.contains(&g))
    }
}
