//! Repository for monitored services and their check history.

use std::time::Duration;

use chrono::{DateTime, Utc};
use healthtrack_core::model::{CheckOutcome, CheckRecord, NewService, Service};
use healthtrack_events::CheckStatus;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{DataError, Result};

const INSERT_SERVICE: &str = r"
    INSERT INTO services (id, name, url, interval_seconds, timeout_seconds)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, name, url, interval_seconds, timeout_seconds, created_at
";

const SELECT_SERVICE: &str = r"
    SELECT id, name, url, interval_seconds, timeout_seconds, created_at
    FROM services
    WHERE id = $1
";

const SELECT_SERVICES: &str = r"
    SELECT id, name, url, interval_seconds, timeout_seconds, created_at
    FROM services
    ORDER BY created_at, id
";

const DELETE_SERVICE: &str = r"DELETE FROM services WHERE id = $1";

const INSERT_CHECK: &str = r"
    INSERT INTO checks (id, service_id, status, response_time_ms, error)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, service_id, checked_at, status, response_time_ms, error
";

const SELECT_RECENT_CHECKS: &str = r"
    SELECT id, service_id, checked_at, status, response_time_ms, error
    FROM checks
    WHERE service_id = $1
    ORDER BY checked_at DESC
    LIMIT $2
";

const SELECT_CHECKS_SINCE: &str = r"
    SELECT id, service_id, checked_at, status, response_time_ms, error
    FROM checks
    WHERE service_id = $1 AND checked_at >= $2
    ORDER BY checked_at
";

/// Database-backed repository for the monitoring catalog.
#[derive(Clone)]
pub struct MonitorStore {
    pool: PgPool,
}

impl MonitorStore {
    /// Initialise the store, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail or the database is unreachable.
    pub async fn new(pool: PgPool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|source| DataError::Migration { source })?;
        Ok(Self { pool })
    }

    /// Establish a connection pool and initialise the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or
    /// migrations fail.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(DataError::database("store.connect"))?;
        Self::new(pool).await
    }

    /// Access the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Verify database reachability with a trivial round trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DataError::database("store.ping"))?;
        Ok(())
    }

    /// Register a new service, assigning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DuplicateName`] when the name is already taken,
    /// or a database error otherwise.
    pub async fn insert_service(&self, new: &NewService) -> Result<Service> {
        let row = sqlx::query_as::<_, ServiceRow>(INSERT_SERVICE)
            .bind(Uuid::new_v4())
            .bind(&new.name)
            .bind(&new.url)
            .bind(clamp_i32(new.interval_seconds))
            .bind(clamp_i32(new.timeout_seconds))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db) if db.is_unique_violation() => DataError::DuplicateName {
                    name: new.name.clone(),
                },
                _ => DataError::Database {
                    operation: "store.insert_service",
                    source: err,
                },
            })?;
        Ok(row.into())
    }

    /// Load one service by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn fetch_service(&self, id: Uuid) -> Result<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>(SELECT_SERVICE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DataError::database("store.fetch_service"))?;
        Ok(row.map(Service::from))
    }

    /// Load all registered services, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_services(&self) -> Result<Vec<Service>> {
        let rows = sqlx::query_as::<_, ServiceRow>(SELECT_SERVICES)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::database("store.list_services"))?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    /// Delete a service and (via cascade) its check history.
    ///
    /// Returns whether a row was actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    pub async fn delete_service(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(DELETE_SERVICE)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DataError::database("store.delete_service"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist one probe outcome for a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record_check(&self, service_id: Uuid, outcome: &CheckOutcome) -> Result<CheckRecord> {
        let row = sqlx::query_as::<_, CheckRow>(INSERT_CHECK)
            .bind(Uuid::new_v4())
            .bind(service_id)
            .bind(outcome.status.as_str())
            .bind(outcome.response_time_ms)
            .bind(outcome.error.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::database("store.record_check"))?;
        Ok(row.into())
    }

    /// Load the newest checks for a service, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn recent_checks(&self, service_id: Uuid, limit: i64) -> Result<Vec<CheckRecord>> {
        let rows = sqlx::query_as::<_, CheckRow>(SELECT_RECENT_CHECKS)
            .bind(service_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::database("store.recent_checks"))?;
        Ok(rows.into_iter().map(CheckRecord::from).collect())
    }

    /// Load all checks for a service since the given instant, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn checks_since(
        &self,
        service_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<CheckRecord>> {
        let rows = sqlx::query_as::<_, CheckRow>(SELECT_CHECKS_SINCE)
            .bind(service_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::database("store.checks_since"))?;
        Ok(rows.into_iter().map(CheckRecord::from).collect())
    }
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn parse_status(label: &str) -> CheckStatus {
    CheckStatus::parse(label).unwrap_or_else(|| {
        tracing::warn!(status = %label, "unknown check status encountered in store");
        CheckStatus::Error
    })
}

#[derive(Debug, Clone, FromRow)]
struct ServiceRow {
    id: Uuid,
    name: String,
    url: String,
    interval_seconds: i32,
    timeout_seconds: i32,
    created_at: DateTime<Utc>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            url: row.url,
            interval_seconds: u32::try_from(row.interval_seconds).unwrap_or_default(),
            timeout_seconds: u32::try_from(row.timeout_seconds).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct CheckRow {
    id: Uuid,
    service_id: Uuid,
    checked_at: DateTime<Utc>,
    status: String,
    response_time_ms: Option<f64>,
    error: Option<String>,
}

impl From<CheckRow> for CheckRecord {
    fn from(row: CheckRow) -> Self {
        Self {
            id: row.id,
            service_id: row.service_id,
            timestamp: row.checked_at,
            status: parse_status(&row.status),
            response_time_ms: row.response_time_ms,
            error: row.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_large_values() {
        assert_eq!(clamp_i32(42), 42);
        assert_eq!(clamp_i32(i32::MAX as u32), i32::MAX);
        assert_eq!(clamp_i32(u32::MAX), i32::MAX);
    }

    #[test]
    fn status_labels_round_trip_through_rows() {
        for status in [
            CheckStatus::Ok,
            CheckStatus::Warn,
            CheckStatus::Error,
            CheckStatus::Down,
        ] {
            assert_eq!(parse_status(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_label_degrades_to_error() {
        assert_eq!(parse_status("wedged"), CheckStatus::Error);
    }
}
