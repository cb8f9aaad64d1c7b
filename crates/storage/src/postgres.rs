//! Postgres-backed `Storage`: a typed row struct per table, plain SQL (no
//! ORM), `sqlx`'s runtime-checked `query_as` so this crate doesn't require
//! a live `DATABASE_URL` at documentation-build time.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use model::{Component, State, StepEntry};

use crate::error::StorageError;
use crate::traits::Storage;

#[derive(Debug, sqlx::FromRow)]
struct StateRow {
    name: String,
    run_id: i64,
    steps: sqlx::types::Json<Vec<StepEntry>>,
    cache: sqlx::types::Json<HashMap<String, Value>>,
    status: String,
}

impl TryFrom<StateRow> for State {
    type Error = StorageError;

    fn try_from(row: StateRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(StorageError::Corrupt)?;
        Ok(State {
            name: row.name,
            run_id: row.run_id,
            steps: row.steps.0,
            cache: row.cache.0,
            status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResourceRow {
    url: String,
}

/// `Storage` implementation backed by a single Postgres connection pool.
///
/// DDL lives in `storage/migrations/` — one `workflow_state` table keyed
/// `(name, run_id)` with `steps`/`cache` as `JSONB`, one `resources` table
/// keyed `(component, name)`.
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        info!(max_connections, "connecting to storage backend");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        info!("running storage migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn read(&self, name: &str, run_id: i64) -> Result<Option<State>, StorageError> {
        let row: Option<StateRow> = sqlx::query_as(
            r#"SELECT name, run_id, steps, cache, status
               FROM workflow_state
               WHERE name = $1 AND run_id = $2"#,
        )
        .bind(name)
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(State::try_from).transpose()
    }

    async fn write(&self, state: &State) -> Result<(), StorageError> {
        let steps = sqlx::types::Json(&state.steps);
        let cache = sqlx::types::Json(&state.cache);
        let status = state.status.to_string();

        sqlx::query(
            r#"INSERT INTO workflow_state (name, run_id, steps, cache, status)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (name, run_id)
               DO UPDATE SET steps = EXCLUDED.steps, cache = EXCLUDED.cache, status = EXCLUDED.status"#,
        )
        .bind(&state.name)
        .bind(state.run_id)
        .bind(steps)
        .bind(cache)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn increment_id(&self, name: &str) -> Result<i64, StorageError> {
        // No native per-workflow counter table; compute max(run_id)+1.
        // Races between concurrent new-run allocations are acceptable here —
        // run creation is rare and uniqueness is enforced by the authoring
        // layer's one-workflow-instance-per-process guarantee.
        let next: (i64,) = sqlx::query_as(
            r#"SELECT COALESCE(MAX(run_id), 0) + 1 FROM workflow_state WHERE name = $1"#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(next.0)
    }

    async fn get_endpoint(&self, name: &str, component: Component) -> Result<String, StorageError> {
        let component_str = match component {
            Component::InvocationQueue => "InvocationQueue",
            Component::ExecutorQueue => "ExecutorQueue",
        };

        let row: Option<ResourceRow> = sqlx::query_as(
            r#"SELECT url FROM resources WHERE component = $1 AND name = $2"#,
        )
        .bind(component_str)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.url).ok_or_else(|| StorageError::EndpointNotFound {
            component,
            name: name.to_string(),
        })
    }
}
