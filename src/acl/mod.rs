//! ACL module
//!
//! Evaluates wiki-style access rules whose objects may contain regular
//! expressions.
//!
//! ## Rule Format
//!
//! ```text
//! # object                subject     permission
//! *                       @ALL        1
//! wiki:*                  @editors    8
//! /^(ns1|ns2):(.*)$/      %2%         16
//! ```
//!
//! Text between pairs of `/` in the object is a regular expression; the
//! rest is matched literally and the whole object must match the page id.
//! Subjects may reference capture groups with `%N%`.
//!
//! ## Resolution
//!
//! Rules matching the page id are considered first and the highest grant
//! wins. Only if none applies are the enclosing namespaces tried, from the
//! innermost `<ns>:*` up to the root `*`. Rules can grant at most `delete`;
//! `admin` comes only from superuser detection.

pub mod cache;
pub mod checker;
pub mod resolver;
pub mod rules;
pub mod source;
pub mod subject;
pub mod types;

pub use cache::RuleCache;
pub use checker::AclChecker;
pub use resolver::{AncestorScopes, Outcome, Resolution, resolve};
pub use rules::{CompiledRule, RuleDiagnostic, RuleLine, RuleSet, compile};
pub use source::load_rules;
pub use types::{ALL_GROUP, AclContext, Permission};
