/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    /// A single-record lookup matched nothing, or a targeted update/delete
    /// affected zero rows.
    NotFound(String),
    /// Connection, constraint or driver failure reported by the record store.
    Database(Box<dyn std::error::Error + Send + Sync>),
    /// Malformed request parameters (limits, unknown columns, identifiers).
    Validation(String),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by store implementations (e.g. `strata-data-sqlx`) to wrap
    /// driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    /// `NotFound` for a record of `table` selected by a filter.
    pub fn no_match(table: &str) -> Self {
        DataError::NotFound(format!("no {table} record matched the filter"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound(_))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Validation(msg) => write!(f, "Validation error: {msg}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<crate::sql::QueryError> for DataError {
    fn from(err: crate::sql::QueryError) -> Self {
        DataError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Other(err.to_string())
    }
}
