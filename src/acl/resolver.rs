//! Permission resolver
//!
//! Resolution proceeds in this order:
//! 1. ACL disabled → upload
//! 2. No identity backend → none
//! 3. No rules → none
//! 4. Admin → admin, rules are not consulted
//! 5. Rules whose object matches the page id; the highest grant wins
//! 6. Otherwise rules matching `<ns>:*` for each enclosing namespace,
//!    innermost first, ending with the root `*`
//!
//! Only the first scope that yields a grant counts: a direct match hides
//! every namespace rule, an inner namespace hides the outer ones.

use crate::acl::rules::CompiledRule;
use crate::acl::subject::resolve_subject;
use crate::acl::types::{AclContext, Permission};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Path tried for the root namespace
pub const ROOT_SCOPE: &str = "*";

/// Why a resolution ended with its permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// ACL enforcement is switched off
    AclDisabled,
    /// No authentication backend is available
    NoAuth,
    /// The rule set is empty
    NoRules,
    /// The principal is an administrator
    Admin,
    /// Rules matched the page id itself
    Direct { lines: Vec<usize> },
    /// Rules matched an enclosing namespace
    Namespace { scope: String, lines: Vec<usize> },
    /// No rule granted anything at any scope
    NoMatch,
}

/// Final permission plus the reason for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub permission: Permission,
    pub outcome: Outcome,
}

impl Resolution {
    fn new(permission: Permission, outcome: Outcome) -> Self {
        Self {
            permission,
            outcome,
        }
    }

    /// True when the request ended without any applicable rule
    pub fn is_unconfigured(&self) -> bool {
        matches!(self.outcome, Outcome::NoRules | Outcome::NoMatch)
    }
}

/// Namespace of a page id, `None` for pages in the root namespace
fn namespace_of(id: &str) -> Option<&str> {
    id.rfind(':').map(|i| &id[..i]).filter(|ns| !ns.is_empty())
}

/// Namespace wildcard paths enclosing a page id, innermost first
///
/// For `a:b:c` this yields `a:b:*`, `a:*`, `*`. The root `*` is always the
/// last item, so the walk ends after at most one step per namespace level.
#[derive(Debug, Clone)]
pub struct AncestorScopes<'a> {
    next: Option<Option<&'a str>>,
}

impl<'a> AncestorScopes<'a> {
    pub fn new(id: &'a str) -> Self {
        Self {
            next: Some(namespace_of(id)),
        }
    }
}

impl Iterator for AncestorScopes<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.next.take()? {
            Some(ns) => {
                self.next = Some(namespace_of(ns));
                Some(format!("{ns}:*"))
            }
            None => Some(ROOT_SCOPE.to_string()),
        }
    }
}

/// Best grant from rules whose object matches `target`
///
/// Returns the highest permission and the lines of the rules granting it,
/// or `None` when no matching rule applies to the principal.
fn best_grant(
    rules: &[CompiledRule],
    target: &str,
    ctx: &AclContext,
) -> Option<(Permission, Vec<usize>)> {
    let mut best: Option<(Permission, Vec<usize>)> = None;

    for rule in rules {
        let Some(captures) = rule.pattern.captures(target) else {
            continue;
        };

        let subject = match resolve_subject(&rule.subject, &captures, ctx.case_sensitive) {
            Ok(subject) => subject,
            Err(e) => {
                trace!(line = rule.line, error = %e, "Skipping rule with unresolvable subject");
                continue;
            }
        };

        if !ctx.has_identity(&subject) {
            trace!(line = rule.line, subject = %subject, "Matched rule does not apply to principal");
            continue;
        }

        let granted = rule.permission.capped();
        trace!(line = rule.line, path = target, permission = %granted, "Matched rule");

        match best.as_mut() {
            Some((level, lines)) if *level == granted => lines.push(rule.line),
            Some((level, _)) if *level > granted => {}
            _ => best = Some((granted, vec![rule.line])),
        }
    }

    best
}

/// Resolve the permission a context has under a set of compiled rules
pub fn resolve(rules: &[CompiledRule], ctx: &AclContext) -> Resolution {
    debug!(
        id = %ctx.resource_id,
        user = %ctx.principal,
        groups = ?ctx.groups,
        "Resolving ACL"
    );

    if !ctx.acl_enabled {
        return Resolution::new(Permission::UPLOAD, Outcome::AclDisabled);
    }

    if !ctx.auth_available {
        return Resolution::new(Permission::NONE, Outcome::NoAuth);
    }

    if rules.is_empty() {
        warn!("No ACL setup yet! Denying access to everyone.");
        return Resolution::new(Permission::NONE, Outcome::NoRules);
    }

    if ctx.is_admin {
        return Resolution::new(Permission::ADMIN, Outcome::Admin);
    }

    if let Some((permission, lines)) = best_grant(rules, &ctx.resource_id, ctx) {
        debug!(permission = %permission, "Resolved from direct match");
        return Resolution::new(permission, Outcome::Direct { lines });
    }

    for scope in AncestorScopes::new(&ctx.resource_id) {
        trace!(scope = %scope, "Trying namespace");
        if let Some((permission, lines)) = best_grant(rules, &scope, ctx) {
            debug!(permission = %permission, scope = %scope, "Resolved from namespace match");
            return Resolution::new(permission, Outcome::Namespace { scope, lines });
        }
    }

    warn!(
        id = %ctx.resource_id,
        "No ACL setup yet! Denying access to everyone."
    );
    Resolution::new(Permission::NONE, Outcome::NoMatch)
}
