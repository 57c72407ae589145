use anyhow::Context;
use authors_service::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config)?;

    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            run(config, InMemoryAuthorStore::new()).await
        }
        StorageBackend::Postgres => run_postgres(config).await,
    }
}

async fn run<S: AuthorStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let state = AppState::new(config.clone(), store);
    Server::new(config).serve(router(state)).await?;
    Ok(())
}

#[cfg(feature = "database")]
async fn run_postgres(config: Config) -> anyhow::Result<()> {
    use authors_service::database::{create_pool, ensure_schema};

    let db = config
        .database
        .clone()
        .context("storage.backend = \"postgres\" requires a [database] section")?;

    let pool = create_pool(&db).await?;
    if db.bootstrap_schema {
        ensure_schema(&pool).await?;
    }

    run(config, PgAuthorStore::new(pool)).await
}

#[cfg(not(feature = "database"))]
async fn run_postgres(_config: Config) -> anyhow::Result<()> {
    Err(Error::Storage("built without the `database` feature".to_string()).into())
}
