use std::fmt::Display;
use std::ops::RangeInclusive;

use crate::error::{KnotError, Result};

pub const MAX_LABEL_LENGTH: usize = 50;

/// Identifiers and spot numbers start at 1.
pub(crate) fn id(name: &'static str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(KnotError::validation(name, "must be at least 1"));
    }
    Ok(value)
}

pub(crate) fn in_range<T>(name: &'static str, value: T, range: RangeInclusive<T>) -> Result<T>
where
    T: PartialOrd + Display + Copy,
{
    if !range.contains(&value) {
        return Err(KnotError::validation(
            name,
            format!(
                "{value} is outside {}..={}",
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(value)
}

/// Labels are counted in characters, not bytes.
pub(crate) fn label(value: &str) -> Result<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(KnotError::validation("label", "must not be empty"));
    }
    let length = trimmed.chars().count();
    if length > MAX_LABEL_LENGTH {
        return Err(KnotError::validation(
            "label",
            format!("{length} characters exceeds the {MAX_LABEL_LENGTH} character limit"),
        ));
    }
    Ok(trimmed)
}

/// `/{version}/{id}/{action}`
pub(crate) fn resource_path(version: &str, id: u64, action: &str) -> String {
    format!("/{version}/{id}/{action}")
}

/// `/{version}/{action}`
pub(crate) fn collection_path(version: &str, action: &str) -> String {
    format!("/{version}/{action}")
}
