//! Per-driver glue the generic store cannot express through `sqlx::Database`.

use sqlx::error::BoxDynError;
use sqlx::Database;
use strata_data::{Dialect, Value};

/// A database driver [`SqlxStore`](crate::SqlxStore) can run against.
///
/// Supplies the SQL dialect, typed binding of [`Value`]s and the affected-row
/// count of a statement result.
pub trait Backend: Database {
    const DIALECT: Dialect;

    fn rows_affected(result: &Self::QueryResult) -> u64;

    /// Append `value` to `args` as the next bind parameter.
    ///
    /// `NULL` is bound as a nullable text.
    fn bind<'q>(args: &mut Self::Arguments<'q>, value: &Value) -> Result<(), BoxDynError>;
}

#[cfg(feature = "sqlite")]
impl Backend for sqlx::Sqlite {
    const DIALECT: Dialect = Dialect::Sqlite;

    fn rows_affected(result: &Self::QueryResult) -> u64 {
        result.rows_affected()
    }

    fn bind<'q>(args: &mut Self::Arguments<'q>, value: &Value) -> Result<(), BoxDynError> {
        use sqlx::Arguments;
        match value {
            Value::Null => args.add(Option::<String>::None),
            Value::Bool(b) => args.add(*b),
            Value::Int(i) => args.add(*i),
            Value::Float(f) => args.add(*f),
            Value::Text(s) => args.add(s.clone()),
        }
    }
}

#[cfg(feature = "postgres")]
impl Backend for sqlx::Postgres {
    const DIALECT: Dialect = Dialect::Postgres;

    fn rows_affected(result: &Self::QueryResult) -> u64 {
        result.rows_affected()
    }

    fn bind<'q>(args: &mut Self::Arguments<'q>, value: &Value) -> Result<(), BoxDynError> {
        use sqlx::Arguments;
        match value {
            Value::Null => args.add(Option::<String>::None),
            Value::Bool(b) => args.add(*b),
            Value::Int(i) => args.add(*i),
            Value::Float(f) => args.add(*f),
            Value::Text(s) => args.add(s.clone()),
        }
    }
}

/// Build the argument list for `params`, in placeholder order.
pub(crate) fn arguments<'q, DB: Backend>(
    params: &[Value],
) -> Result<DB::Arguments<'q>, strata_data::DataError> {
    let mut args: DB::Arguments<'q> = Default::default();
    for value in params {
        DB::bind(&mut args, value).map_err(strata_data::DataError::Database)?;
    }
    Ok(args)
}
