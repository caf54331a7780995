//! Identity module
//!
//! The resolver never authenticates anyone. It relies on an identity
//! backend for the store's case-sensitivity policy and for cleaning user
//! and group names, and on [`name_encode`] to escape characters that
//! would otherwise clash with rule syntax.

pub mod backend;
pub mod superuser;

pub use backend::{IdentityBackend, PlainIdentity, create_identity_backend};
pub use superuser::SuperuserList;

use std::fmt::Write;

/// Escape a user or group name the way rule files store subjects
///
/// ASCII punctuation, whitespace and control characters become `%` plus
/// their lowercase hex code (no zero padding). Letters, digits and
/// non-ASCII characters are kept as they are.
pub fn name_encode(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for c in name.chars() {
        if needs_encoding(c) {
            // Writing to a String cannot fail
            let _ = write!(encoded, "%{:x}", c as u32);
        } else {
            encoded.push(c);
        }
    }
    encoded
}

fn needs_encoding(c: char) -> bool {
    matches!(c as u32, 0x00..=0x2f | 0x3a..=0x40 | 0x5b..=0x60 | 0x7b..=0x7f)
}
