use warden_core::AppError;

/// Maps a sqlx failure to the storage-unavailable category so callers at the
/// decision boundary fail closed.
pub(crate) fn storage_error(context: &str, error: sqlx::Error) -> AppError {
    AppError::StorageUnavailable(format!("{context}: {error}"))
}

/// Returns whether a sqlx failure is a unique-constraint violation.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(database_error) = error {
        return database_error.code().as_deref() == Some("23505");
    }

    false
}

/// Returns whether a sqlx failure is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(database_error) = error {
        return database_error.code().as_deref() == Some("23503");
    }

    false
}
