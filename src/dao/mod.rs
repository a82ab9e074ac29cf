use std::borrow::Cow;

use crate::model::apperror::{ApplicationError, ErrorType};

pub mod regions;
pub mod sales;

/**
 * Handles database errors and maps them to application errors.
 *
 * # Arguments
 * `error`: The database error to handle.
 *
 * # Returns
 * An `ApplicationError` corresponding to the database error.
 */
pub fn handle_database_error(error: &sqlx::Error) -> ApplicationError {
    if let Some(db_error) = error.as_database_error() {
        tracing::debug!("Database error: {}", db_error);
        tracing::info!("Add/Update error: {:?}", db_error.code());
        if db_error.code() == Some(Cow::Borrowed("23505")) {
            // Unique violation
            return ApplicationError::new(ErrorType::Validation, "Already exists".to_string());
        } else if db_error.code() == Some(Cow::Borrowed("23503")) {
            // Foreign key violation
            return ApplicationError::new(ErrorType::Validation, "Missing parent value".to_string());
        } else if db_error.code() == Some(Cow::Borrowed("22001")) {
            // Value too long
            return ApplicationError::new(ErrorType::Validation, "Value too long".to_string());
        } else if db_error.code() == Some(Cow::Borrowed("22003")) {
            // Numeric value out of range
            return ApplicationError::new(ErrorType::Validation, "Value out of range".to_string());
        }
        tracing::error!("Unhandled database error: {}", db_error);
        return ApplicationError::new(ErrorType::DatabaseError, "Unhandled database error".to_string());
    }
    tracing::error!("Failed to execute database operation: {}", error);
    ApplicationError::new(ErrorType::DatabaseError, "Failed to execute database operation".to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_non_database_error_is_hidden() {
        let error = handle_database_error(&sqlx::Error::RowNotFound);
        assert_eq!(error.error_type, ErrorType::DatabaseError);
        assert_eq!(error.message, "Failed to execute database operation");
    }

    #[test]
    fn test_pool_timeout_is_database_error() {
        let error = handle_database_error(&sqlx::Error::PoolTimedOut);
        assert_eq!(error.error_type, ErrorType::DatabaseError);
        assert!(!error.message.contains("timed out"));
    }
}
