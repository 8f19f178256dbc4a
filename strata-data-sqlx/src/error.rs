use strata_data::DataError;

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for DataError`
/// in this crate. Instead, use `.into_data_error()`.
///
/// A missing row is `NotFound`; rows that do not fit the entity are `Other`;
/// everything else (connection, constraint, driver) is `Database` with the
/// driver error kept as the source.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match self {
            sqlx::Error::RowNotFound => DataError::NotFound("no row returned".into()),
            sqlx::Error::ColumnNotFound(column) => {
                DataError::Other(format!("column {column} missing from result"))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DataError::Other(format!("cannot decode column {index}: {source}"))
            }
            other => DataError::database(other),
        }
    }
}
