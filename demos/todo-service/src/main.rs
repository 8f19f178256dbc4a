use axum::Router;
use sqlx::Sqlite;
use strata::prelude::*;

mod models;

use models::Todo;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config = StrataConfig::load("dev")?;
    let pool = connect::<Sqlite>(&config.database).await?;
    sqlx::query(models::SCHEMA).execute(&pool).await?;
    tracing::info!("todos table ready");

    let todos = RestService::<Todo, _>::new(
        SqlxStore::<Todo, Sqlite>::new(pool),
        config.pagination.clone(),
    );
    let app = Router::new()
        .merge(todos.router("todos"))
        .layer(default_trace());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!(addr = %listener.local_addr()?, "todo service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
