//! Identifier checks run before any request is built.
//!
//! # Design
//! Ids are opaque strings everywhere else in the crate. They are checked here,
//! once, against the hyphenated UUID shape so a malformed id fails with
//! `ApiError::InvalidId` and never reaches a URL path. The `me` sentinel is
//! handled by the caller, not by this check.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ApiError;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[0-9][a-fA-F0-9]{3}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$")
        .expect("UUID pattern is valid")
});

/// Check that `id` has the canonical hyphenated UUID shape.
pub fn check_uuid_format(id: &str) -> Result<(), ApiError> {
    if UUID_RE.is_match(id) {
        Ok(())
    } else {
        Err(ApiError::InvalidId(format!("'{id}' is not a valid UUID")))
    }
}
