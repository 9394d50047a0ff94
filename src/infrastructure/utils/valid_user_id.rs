use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;

static USER_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("user id pattern is valid")
});

/// Validates that a user id is safe to use as a single blob path segment
pub fn valid_user_id(id: &str) -> Result<&str, AppError> {
    if USER_ID_PATTERN.is_match(id) {
        Ok(id)
    } else {
        Err(AppError::InvalidInput("Invalid user ID format".to_string()))
    }
}
