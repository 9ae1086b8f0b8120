// ── Field validation shared by every model ──

use crate::error::CoreError;

pub const NAME_MAX_LEN: usize = 63;
pub const DESCRIPTION_MAX_LEN: usize = 1023;
pub const TAG_MAX_LEN: usize = 127;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ')
}

/// Tag names additionally allow `[ ] & ( )`.
fn is_tag_name_char(c: char) -> bool {
    is_name_char(c) || matches!(c, '[' | ']' | '&' | '(' | ')')
}

/// Names: 1..=`max` characters from `[A-Za-z0-9-_. ]`.
pub(crate) fn validate_name(name: &str, max: usize) -> Result<(), CoreError> {
    check_name(name, max, is_name_char)
}

/// Tag object names: 1..=`max` characters from `[A-Za-z0-9-_. []&()]`.
pub(crate) fn validate_tag_name(name: &str, max: usize) -> Result<(), CoreError> {
    check_name(name, max, is_tag_name_char)
}

fn check_name(name: &str, max: usize, allowed: fn(char) -> bool) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::validation("name cannot be empty"));
    }
    if name.chars().count() > max {
        return Err(CoreError::validation(format!(
            "name '{name}' exceeds {max} characters"
        )));
    }
    if let Some(bad) = name.chars().find(|&c| !allowed(c)) {
        return Err(CoreError::validation(format!(
            "name '{name}' contains invalid character '{bad}'"
        )));
    }
    Ok(())
}

pub(crate) fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_LEN => Err(CoreError::validation(
            format!("description exceeds {DESCRIPTION_MAX_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

/// Tags: each non-empty, ≤127 characters, no duplicates.
pub(crate) fn validate_tags(tags: &[String]) -> Result<(), CoreError> {
    for (i, tag) in tags.iter().enumerate() {
        if tag.is_empty() || tag.chars().count() > TAG_MAX_LEN {
            return Err(CoreError::validation(format!(
                "tag '{tag}' must be 1-{TAG_MAX_LEN} characters"
            )));
        }
        if tags[..i].contains(tag) {
            return Err(CoreError::validation(format!("duplicate tag '{tag}'")));
        }
    }
    Ok(())
}

/// Member lists: non-empty, no blank or duplicate entries.
pub(crate) fn validate_members(field: &str, members: &[String]) -> Result<(), CoreError> {
    if members.is_empty() {
        return Err(CoreError::validation(format!("{field} cannot be empty")));
    }
    for (i, m) in members.iter().enumerate() {
        if m.trim().is_empty() {
            return Err(CoreError::validation(format!(
                "{field} cannot contain blank entries"
            )));
        }
        if members[..i].contains(m) {
            return Err(CoreError::validation(format!(
                "duplicate entry '{m}' in {field}"
            )));
        }
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::validation(format!("{field} cannot be empty")))
    } else {
        Ok(())
    }
}
