//! Regex-capable ACL evaluation
//!
//! Resolves the permission a user has on a page of a wiki-style namespace
//! tree, given a list of ACL rules whose objects may mix literal page ids
//! with regular expressions.
//!
//! ## Features
//!
//! - **Regex objects** - text between `/.../` pairs is a regular expression
//! - **Placeholder subjects** - `%N%` in a subject is replaced by capture group N
//! - **Namespace fallback** - `<ns>:*` rules apply when no rule matches the page
//! - **Capped grants** - rules grant at most `delete`; `admin` is reserved
//!
//! ## Example
//!
//! ```
//! use aclregex::acl::{AclContext, Permission, compile, resolve};
//! use aclregex::identity::PlainIdentity;
//!
//! let rules = compile(&["*  @ALL  1", "/^user:([^:]+)/:*  %1%  16"]);
//! let backend = PlainIdentity::new(true);
//! let ctx = AclContext::new("user:alice:notes", "alice", &["users"], Some(&backend), false);
//!
//! assert_eq!(resolve(rules.rules(), &ctx).permission, Permission::DELETE);
//! ```

pub mod acl;
pub mod config;
pub mod error;
pub mod identity;

// Re-export main types
pub use acl::{AclChecker, AclContext, Permission, Resolution};
pub use config::{AppConfig, load_config};
pub use error::AppError;
