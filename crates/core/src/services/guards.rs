//! Argument checks shared by the services.

use tobaeki_common::{AppError, AppResult};

/// Reject identifiers that can never name a stored row.
pub fn ensure_valid_id(id: i64, what: &str) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::InvalidArgument(format!(
            "{what} must be a positive ID, got {id}"
        )));
    }
    Ok(())
}

/// Reject an operation a user would perform on themselves.
pub fn ensure_distinct(user_a: i64, user_b: i64, message: &str) -> AppResult<()> {
    if user_a == user_b {
        return Err(AppError::InvalidArgument(message.to_string()));
    }
    Ok(())
}

/// Unwrap a lookup, turning a miss into `NotFound`.
pub fn require<T>(found: Option<T>, what: &str) -> AppResult<T> {
    found.ok_or_else(|| AppError::NotFound(format!("{what} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_ids_are_invalid() {
        assert!(ensure_valid_id(1, "userId").is_ok());
        assert!(matches!(
            ensure_valid_id(0, "userId"),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            ensure_valid_id(-4, "postId"),
            Err(AppError::InvalidArgument(ref msg)) if msg.contains("postId")
        ));
    }

    #[test]
    fn test_require_maps_miss_to_not_found() {
        assert_eq!(require(Some(3), "Friendship").ok(), Some(3));
        assert!(matches!(
            require::<i64>(None, "Friend request"),
            Err(AppError::NotFound(ref msg)) if msg == "Friend request not found"
        ));
    }
}
