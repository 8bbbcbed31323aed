//! Error types for the feature store.

/// Errors reported by store operations.
///
/// Every public operation either completes fully or returns exactly one of
/// these; a failed single-record mutation leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Unknown id, empty required string, bad resolution range, id collision,
    /// empty geometry or invalid configuration.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not allowed in the current state (bulk nesting, disposed store).
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// The store lock could not be acquired.
    #[error("Lock failure: {0}")]
    LockFailure(String),

    /// A filter the query engine cannot evaluate.
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),
}

impl StoreError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        StoreError::InvalidArgument(msg.into())
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        StoreError::IllegalState(msg.into())
    }

    pub(crate) fn lock(msg: impl Into<String>) -> Self {
        StoreError::LockFailure(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::invalid("no feature 7").to_string(),
            "Invalid argument: no feature 7"
        );
        assert_eq!(
            StoreError::UnsupportedFilter("a%b".into()).to_string(),
            "Unsupported filter: a%b"
        );
    }
}
