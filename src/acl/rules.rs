//! Rule compiler
//!
//! Turns raw rule lines into [`CompiledRule`]s. A line has the shape
//!
//! ```text
//! <object>  <subject>  <permission>  [rest]   # comment
//! ```
//!
//! The object is a page id in which text between pairs of `/` is taken as
//! regular expression syntax and everything else is matched literally:
//!
//! ```text
//! wiki:start            literal page id
//! /^(ns1|ns2)/:*        regex prefix, literal `:*` suffix
//! ```
//!
//! Compilation never fails as a whole. Lines that cannot be compiled are
//! reported as [`RuleDiagnostic`]s and the remaining lines still compile.

use crate::acl::types::Permission;
use crate::error::RuleError;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static FIELD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("field separator regex is valid"));

/// Fields of one rule line, borrowed from the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleLine<'a> {
    pub object: &'a str,
    pub subject: &'a str,
    pub permission: &'a str,
    pub rest: Option<&'a str>,
}

impl<'a> RuleLine<'a> {
    /// Tokenize a line
    ///
    /// Returns `Ok(None)` for lines that carry no rule (blank or comment
    /// only) and an error for lines missing a required field.
    pub fn parse(line: &'a str) -> Result<Option<Self>, RuleError> {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut fields = FIELD_SEPARATOR.splitn(line, 4);
        // A trimmed, non-empty line always yields a non-empty first field
        let object = fields.next().unwrap_or_default();
        let subject = fields.next().ok_or(RuleError::missing("subject"))?;
        let permission = fields.next().ok_or(RuleError::missing("permission"))?;
        let rest = fields.next();

        Ok(Some(Self {
            object,
            subject,
            permission,
            rest,
        }))
    }
}

/// Remove everything from the first unescaped `#`
fn strip_comment(line: &str) -> &str {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            '#' if !escaped => return &line[..i],
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    line
}

/// Whether the segment being read lies outside or inside a `/.../` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentMode {
    Literal,
    Pattern,
}

impl SegmentMode {
    fn toggle(self) -> Self {
        match self {
            SegmentMode::Literal => SegmentMode::Pattern,
            SegmentMode::Pattern => SegmentMode::Literal,
        }
    }
}

/// Translate a rule object into an anchored regular expression
///
/// The `/` delimiters are consumed. Literal segments are escaped, pattern
/// segments are copied verbatim. A trailing unmatched `/` leaves the rest
/// of the object in pattern mode.
pub fn object_to_pattern(object: &str) -> String {
    let mut mode = SegmentMode::Literal;
    let mut body = String::with_capacity(object.len() + 8);

    for segment in object.split('/') {
        match mode {
            SegmentMode::Literal => body.push_str(&regex::escape(segment)),
            SegmentMode::Pattern => body.push_str(segment),
        }
        mode = mode.toggle();
    }

    format!("^(?:{body})$")
}

/// A rule ready to be matched against page ids
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// 1-based line number in the source rule set
    pub line: usize,
    /// The object as written in the rule
    pub object: String,
    pub pattern: Regex,
    /// Raw subject, possibly containing `%N%` placeholders
    pub subject: String,
    pub permission: Permission,
}

impl CompiledRule {
    /// Compile a single line
    pub fn from_line(line_no: usize, line: &str) -> Result<Option<Self>, RuleError> {
        let Some(fields) = RuleLine::parse(line)? else {
            return Ok(None);
        };

        let permission = fields
            .permission
            .parse::<u32>()
            .map(Permission::new)
            .map_err(|_| RuleError::invalid_permission(fields.permission))?;

        let pattern =
            Regex::new(&object_to_pattern(fields.object)).map_err(|e| RuleError::InvalidPattern {
                object: fields.object.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Some(Self {
            line: line_no,
            object: fields.object.to_string(),
            pattern,
            subject: fields.subject.to_string(),
            permission,
        }))
    }
}

/// A line that could not be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDiagnostic {
    pub line: usize,
    pub text: String,
    pub error: RuleError,
}

/// Result of compiling a list of rule lines
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    diagnostics: Vec<RuleDiagnostic>,
}

impl RuleSet {
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn diagnostics(&self) -> &[RuleDiagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// Compile rule lines, keeping source order
pub fn compile<S: AsRef<str>>(lines: &[S]) -> RuleSet {
    let mut set = RuleSet::default();

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        match CompiledRule::from_line(idx + 1, line) {
            Ok(Some(rule)) => set.rules.push(rule),
            Ok(None) => {}
            Err(error) => {
                warn!(line = idx + 1, text = line, error = %error, "Skipping malformed ACL line");
                set.diagnostics.push(RuleDiagnostic {
                    line: idx + 1,
                    text: line.to_string(),
                    error,
                });
            }
        }
    }

    debug!(
        rules = set.rules.len(),
        malformed = set.diagnostics.len(),
        "Compiled ACL rules"
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let line = RuleLine::parse("wiki:*\t@user   8 extra stuff").unwrap().unwrap();
        assert_eq!(line.object, "wiki:*");
        assert_eq!(line.subject, "@user");
        assert_eq!(line.permission, "8");
        assert_eq!(line.rest, Some("extra stuff"));
    }

    #[test]
    fn test_parse_strips_comment() {
        let line = RuleLine::parse("wiki:* @ALL 1 # everyone reads")
            .unwrap()
            .unwrap();
        assert_eq!(line.permission, "1");
        assert_eq!(line.rest, None);
    }

    #[test]
    fn test_parse_blank_and_comment_lines() {
        assert_eq!(RuleLine::parse("").unwrap(), None);
        assert_eq!(RuleLine::parse("   \t ").unwrap(), None);
        assert_eq!(RuleLine::parse("# acl.auth.php").unwrap(), None);
        assert_eq!(RuleLine::parse("# <?php exit()?>").unwrap(), None);
    }

    #[test]
    fn test_parse_missing_fields() {
        assert_eq!(
            RuleLine::parse("wiki:start"),
            Err(RuleError::missing("subject"))
        );
        assert_eq!(
            RuleLine::parse("wiki:start @ALL # no level"),
            Err(RuleError::missing("permission"))
        );
    }

    #[test]
    fn test_escaped_hash_is_not_a_comment() {
        assert_eq!(strip_comment(r"/a\#b/ x 1 # c"), r"/a\#b/ x 1 ");
        assert_eq!(strip_comment(r"a\\# c"), r"a\\");
    }

    #[test]
    fn test_object_literal_only() {
        assert_eq!(object_to_pattern("wiki:start"), "^(?:wiki:start)$");
        assert_eq!(object_to_pattern("ns:*"), r"^(?:ns:\*)$");
        assert_eq!(object_to_pattern("a.b"), r"^(?:a\.b)$");
    }

    #[test]
    fn test_object_full_regex() {
        assert_eq!(object_to_pattern("/^foo.*$/"), "^(?:^foo.*$)$");
    }

    #[test]
    fn test_object_mixed_segments() {
        assert_eq!(object_to_pattern("/^start/:rest"), "^(?:^start:rest)$");
        assert_eq!(object_to_pattern("a.b/c+/d.e"), r"^(?:a\.bc+d\.e)$");
    }

    #[test]
    fn test_object_unterminated_regex() {
        assert_eq!(object_to_pattern("wiki:/.*"), "^(?:wiki:.*)$");
    }

    #[test]
    fn test_object_empty_pattern_segment() {
        assert_eq!(object_to_pattern("a//b"), "^(?:ab)$");
    }

    #[test]
    fn test_compile_keeps_order_and_line_numbers() {
        let set = compile(&["# header", "* @ALL 1", "", "wiki:* @user 8"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.rules()[0].line, 2);
        assert_eq!(set.rules()[1].line, 4);
        assert_eq!(set.rules()[1].permission, Permission::UPLOAD);
        assert!(set.diagnostics().is_empty());
    }

    #[test]
    fn test_compile_reports_malformed_lines() {
        let set = compile(&[
            "wiki:start",
            "wiki:* @user many",
            "wiki:* @user -1",
            "/(unclosed/ @user 1",
            "* @ALL 1",
        ]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.rules()[0].line, 5);

        let errors: Vec<_> = set.diagnostics().iter().map(|d| &d.error).collect();
        assert!(matches!(errors[0], RuleError::MissingField { .. }));
        assert!(matches!(errors[1], RuleError::InvalidPermission { .. }));
        assert!(matches!(errors[2], RuleError::InvalidPermission { .. }));
        assert!(matches!(errors[3], RuleError::InvalidPattern { .. }));
        assert_eq!(set.diagnostics()[3].line, 4);
    }

    #[test]
    fn test_compiled_literal_matches_exactly() {
        let rule = CompiledRule::from_line(1, "foo:bar @ALL 1").unwrap().unwrap();
        assert!(rule.pattern.is_match("foo:bar"));
        assert!(!rule.pattern.is_match("foo:barX"));
        assert!(!rule.pattern.is_match("fooXbar"));
        assert!(!rule.pattern.is_match("xfoo:bar"));
    }

    #[test]
    fn test_compiled_alternation_is_anchored() {
        let rule = CompiledRule::from_line(1, "/a|b/ @ALL 1").unwrap().unwrap();
        assert!(rule.pattern.is_match("a"));
        assert!(rule.pattern.is_match("b"));
        assert!(!rule.pattern.is_match("ab"));
        assert!(!rule.pattern.is_match("xb"));
    }
}
