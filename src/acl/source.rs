//! Rule file loading
//!
//! Rule files follow the wiki's `acl.auth.php` layout: one rule per line,
//! `#` comments, and a `# <?php exit()?>` guard that is just a comment.

use crate::error::ConfigError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a rule file into lines
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<String>, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();

    debug!(path = %path.display(), lines = lines.len(), "Loaded ACL rule file");
    Ok(lines)
}
