use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Caller-supplied or stored data that cannot be scored as given.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored data that contradicts the league rule set.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    /// Reports a unique violation as `ConstraintViolation`, other errors pass through.
    pub fn on_unique_violation(self, msg: impl Into<String>) -> Self {
        if self.is_unique_violation() {
            Self::ConstraintViolation(msg.into())
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_a_constraint_violation() {
        let err = StorageError::NotFound;
        assert!(!err.is_unique_violation());
        assert!(matches!(
            err.on_unique_violation("placement already stored"),
            StorageError::NotFound
        ));
    }

    #[test]
    fn test_messages_carry_detail() {
        let err = StorageError::invalid_input("placements must have 4 different contestants");
        assert_eq!(
            err.to_string(),
            "Invalid input: placements must have 4 different contestants"
        );

        let err = StorageError::data_integrity("unknown multiplier 3.0");
        assert_eq!(err.to_string(), "Data integrity error: unknown multiplier 3.0");
    }
}
