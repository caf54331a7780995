//! Subject resolution
//!
//! A rule subject may refer to capture groups of the object pattern with
//! `%N%`. Rule files store subjects name-encoded, so the same placeholder
//! usually appears as `%25N%25`; both spellings are accepted.

use crate::acl::types::ALL_GROUP;
use crate::error::PlaceholderError;
use regex::Captures;

/// `%` as it appears in a name-encoded subject
const ENCODED_PERCENT: &str = "%25";

fn leading_digits(s: &str) -> &str {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    &s[..end]
}

/// Recognize a placeholder at the start of `s`
///
/// Returns the token length and the group index digits. The encoded
/// `%25N%25` form is tried first. A bare `%N%` whose closing `%` is followed
/// by a hex digit is not a placeholder: it is the start of another encoded
/// character, as in `dev%20%28ops%29`.
fn placeholder_at(s: &str) -> Option<(usize, &str)> {
    if let Some(after) = s.strip_prefix(ENCODED_PERCENT) {
        let digits = leading_digits(after);
        if !digits.is_empty() && after[digits.len()..].starts_with(ENCODED_PERCENT) {
            return Some((2 * ENCODED_PERCENT.len() + digits.len(), digits));
        }
    }

    let after = s.strip_prefix('%')?;
    let digits = leading_digits(after);
    let tail = after[digits.len()..].strip_prefix('%')?;
    if digits.is_empty() || tail.starts_with(|c: char| c.is_ascii_hexdigit()) {
        return None;
    }
    Some((digits.len() + 2, digits))
}

/// Produce the concrete subject for a rule whose object matched
///
/// The subject is case-folded first unless names are case-sensitive or it
/// is the `@ALL` group. Placeholders are then replaced with the text of
/// the referenced capture group; group 0 is the whole match.
pub fn resolve_subject(
    subject: &str,
    captures: &Captures<'_>,
    case_sensitive: bool,
) -> Result<String, PlaceholderError> {
    let subject = if case_sensitive || subject == ALL_GROUP {
        subject.to_string()
    } else {
        subject.to_lowercase()
    };

    let mut resolved = String::with_capacity(subject.len());
    let mut rest = subject.as_str();

    while let Some(pos) = rest.find('%') {
        let (before, candidate) = rest.split_at(pos);
        resolved.push_str(before);

        let Some((len, digits)) = placeholder_at(candidate) else {
            resolved.push('%');
            rest = &candidate[1..];
            continue;
        };

        let token = &candidate[..len];
        let index: usize = digits
            .parse()
            .map_err(|_| PlaceholderError::InvalidIndex {
                token: token.to_string(),
            })?;
        let group = captures
            .get(index)
            .ok_or_else(|| PlaceholderError::UnknownGroup {
                token: token.to_string(),
                index,
            })?;

        resolved.push_str(group.as_str());
        rest = &candidate[len..];
    }

    resolved.push_str(rest);
    Ok(resolved)
}
