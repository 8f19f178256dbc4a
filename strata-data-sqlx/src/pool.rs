use crate::backend::Backend;
use crate::error::SqlxErrorExt;
use sqlx::pool::PoolOptions;
use sqlx::Pool;
use strata_data::{DataError, DatabaseConfig};

/// Open a pool for `config.url`.
///
/// An in-memory SQLite database exists per connection, so such URLs get a
/// single connection that is never recycled.
pub async fn connect<DB: Backend>(config: &DatabaseConfig) -> Result<Pool<DB>, DataError> {
    let mut options = PoolOptions::<DB>::new().max_connections(config.max_connections);
    if is_in_memory(&config.url) {
        tracing::debug!(url = %config.url, "in-memory database, pinning one connection");
        options = options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = options
        .connect(&config.url)
        .await
        .map_err(SqlxErrorExt::into_data_error)?;
    tracing::info!(max_connections = pool.options().get_max_connections(), "database pool ready");
    Ok(pool)
}

fn is_in_memory(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}

#[cfg(test)]
mod tests {
    use super::is_in_memory;

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:demo?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://todos.db"));
        assert!(!is_in_memory("postgres://localhost/memory"));
    }
}
