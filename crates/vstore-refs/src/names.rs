//! Reference name validation following git-style conventions.
//!
//! Branch and tag names share one rule set:
//! - non-empty
//! - no whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - no `..` and no `@{`
//! - no leading or trailing `.` or `/`, no `.lock` suffix
//! - every `/`-separated component non-empty and not starting with `.`
//!
//! Names end up as file paths in disk repositories, so these rules also keep
//! a reference from escaping the `refs/` directory.

use crate::error::{RefError, Result};

const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

const FORBIDDEN_SEQUENCES: &[&str] = &["..", "@{"];

fn reject(name: &str, reason: impl Into<String>) -> Result<()> {
    Err(RefError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    })
}

/// Validate a branch or tag name, returning `Ok(())` if it is usable.
///
/// ```
/// use vstore_refs::validate_ref_name;
///
/// assert!(validate_ref_name("main").is_ok());
/// assert!(validate_ref_name("release/2024.1").is_ok());
/// assert!(validate_ref_name("").is_err());
/// assert!(validate_ref_name("../escape").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return reject(name, "name must not be empty");
    }

    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return reject(name, format!("contains forbidden character {ch:?}"));
    }

    if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|s| name.contains(*s)) {
        return reject(name, format!("must not contain {seq:?}"));
    }

    for boundary in ['.', '/'] {
        if name.starts_with(boundary) || name.ends_with(boundary) {
            return reject(name, format!("must not start or end with {boundary:?}"));
        }
    }

    if name.ends_with(".lock") {
        return reject(name, "must not end with \".lock\"");
    }

    for component in name.split('/') {
        if component.is_empty() {
            return reject(name, "path components must not be empty");
        }
        if component.starts_with('.') {
            return reject(name, format!("component {component:?} starts with '.'"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_common_names() {
        for name in ["main", "develop", "my-branch", "v1.0", "feature/auth", "user/a/fix-1"] {
            assert!(validate_ref_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_ref_name("").is_err());
    }

    #[test]
    fn rejects_forbidden_characters() {
        for name in ["has space", "a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b", "tab\there"] {
            assert!(validate_ref_name(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn rejects_traversal_and_reflog_syntax() {
        assert!(validate_ref_name("a..b").is_err());
        assert!(validate_ref_name("../../etc/passwd").is_err());
        assert!(validate_ref_name("main@{1}").is_err());
    }

    #[test]
    fn rejects_boundaries() {
        assert!(validate_ref_name(".hidden").is_err());
        assert!(validate_ref_name("trailing.").is_err());
        assert!(validate_ref_name("/leading").is_err());
        assert!(validate_ref_name("trailing/").is_err());
        assert!(validate_ref_name("main.lock").is_err());
    }

    #[test]
    fn rejects_bad_components() {
        assert!(validate_ref_name("a//b").is_err());
        assert!(validate_ref_name("feature/.hidden").is_err());
    }

    #[test]
    fn error_names_the_reference() {
        let err = validate_ref_name("bad name").unwrap_err();
        assert!(err.to_string().contains("bad name"));
    }

    proptest! {
        #[test]
        fn alphanumeric_names_are_valid(name in "[a-zA-Z0-9][a-zA-Z0-9_-]{0,30}") {
            prop_assert!(validate_ref_name(&name).is_ok());
        }

        #[test]
        fn names_with_double_dot_are_invalid(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            let name = format!("{a}..{b}");
            prop_assert!(validate_ref_name(&name).is_err());
        }
    }
}
