use hangar_core::error::CoreError;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl DbConfig {
    /// Load database settings from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `DATABASE_URL`             | **yes**  | --      |
    /// | `DATABASE_MAX_CONNECTIONS` | no       | `20`    |
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            database_url: parse_database_url(std::env::var("DATABASE_URL").ok())?,
            max_connections: parse_max_connections(
                std::env::var("DATABASE_MAX_CONNECTIONS").ok().as_deref(),
            )?,
        })
    }
}

fn parse_database_url(raw: Option<String>) -> Result<String, CoreError> {
    raw.filter(|url| !url.trim().is_empty())
        .ok_or_else(|| CoreError::Validation("DATABASE_URL must be set".into()))
}

fn parse_max_connections(raw: Option<&str>) -> Result<u32, CoreError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MAX_CONNECTIONS);
    };
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CoreError::Validation(
            "DATABASE_MAX_CONNECTIONS must be a positive integer".into(),
        )),
    }
}

/// Create a connection pool from the given settings.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    tracing::debug!(
        max_connections = config.max_connections,
        "Connecting database pool"
    );
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
}

/// Run a trivial query to verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn database_url_is_required() {
        assert_matches!(parse_database_url(None), Err(CoreError::Validation(_)));
        assert_matches!(
            parse_database_url(Some("  ".into())),
            Err(CoreError::Validation(_))
        );
        assert_eq!(
            parse_database_url(Some("postgres://localhost/hangar".into())).unwrap(),
            "postgres://localhost/hangar"
        );
    }

    #[test]
    fn max_connections_defaults_when_unset() {
        assert_eq!(parse_max_connections(None).unwrap(), DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn max_connections_parses_padded_value() {
        assert_eq!(parse_max_connections(Some(" 5 ")).unwrap(), 5);
    }

    #[test]
    fn max_connections_rejects_zero_and_garbage() {
        assert_matches!(parse_max_connections(Some("0")), Err(CoreError::Validation(_)));
        assert_matches!(parse_max_connections(Some("-1")), Err(CoreError::Validation(_)));
        assert_matches!(parse_max_connections(Some("many")), Err(CoreError::Validation(_)));
    }
}
