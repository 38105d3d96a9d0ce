//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! [`FloorStore`] implementation the services run against in production.
//!
//! Constraint violations are reported by the database and translated here:
//! unique violations become `AlreadyExists`, foreign-key violations on
//! `agent_id` become a missing agent.

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use salesfloor_core::{
    Agent, Break, BreakSchedule, BreakType, Disposition, EntityId, EntityKind, FloorError,
    FloorResult, GlobalScript, Message, MessageAuthor, PassUp, Rebuttals, StorageError,
    Timestamp,
};
use salesfloor_storage::{AgentUpdate, FloorStore, PassUpFilter, PassUpPatch};
use std::fmt;
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::Json;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

/// Schema applied by [`DbClient::ensure_schema`].
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full connection string; takes precedence over the discrete fields
    pub url: Option<String>,
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Pool wait/create timeout, also applied as the statement timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            dbname: "salesfloor".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(10),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            host: std::env::var("SALESFLOOR_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SALESFLOOR_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("SALESFLOOR_DB_NAME")
                .unwrap_or_else(|_| "salesfloor".to_string()),
            user: std::env::var("SALESFLOOR_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("SALESFLOOR_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("SALESFLOOR_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("SALESFLOOR_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        match &self.url {
            Some(url) => cfg.url = Some(url.clone()),
            None => {
                cfg.host = Some(self.host.clone());
                cfg.port = Some(self.port);
                cfg.dbname = Some(self.dbname.clone());
                cfg.user = Some(self.user.clone());
                cfg.password = Some(self.password.clone());
            }
        }
        cfg.options = Some(format!(
            "-c statement_timeout={}",
            self.timeout.as_millis()
        ));

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// PostgreSQL-backed floor store.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        let status = self.pool.status();
        status.size
    }

    /// Create the tables and indexes if they are missing.
    pub async fn ensure_schema(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA_SQL).await?;
        tracing::info!("Database schema ready");
        Ok(())
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> FloorResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            tracing::error!("Connection pool error: {:?}", e);
            StorageError::backend(format!("connection pool: {}", e)).into()
        })
    }
}

// ============================================================================
// ERROR AND ROW MAPPING
// ============================================================================

fn backend(err: impl fmt::Display) -> FloorError {
    StorageError::backend(err.to_string()).into()
}

/// Translate a write failure, recognising constraint violations.
fn write_error(
    err: tokio_postgres::Error,
    entity: EntityKind,
    key: impl ToString,
    agent_id: Option<EntityId>,
) -> FloorError {
    if let Some(db_error) = err.as_db_error() {
        if db_error.code() == &SqlState::UNIQUE_VIOLATION {
            return StorageError::already_exists(entity, key).into();
        }
        if db_error.code() == &SqlState::FOREIGN_KEY_VIOLATION {
            if let Some(agent_id) = agent_id {
                return StorageError::not_found(EntityKind::Agent, agent_id).into();
            }
        }
    }
    tracing::error!("Database error: {:?}", err);
    backend(err)
}

const AGENT_COLUMNS: &str = "id, name, custom_script, created_at, updated_at";
const BREAK_COLUMNS: &str = "id, agent_id, break_type, start_time, end_time, missed";
const SCHEDULE_COLUMNS: &str = "id, agent_id, first_break, second_break, lunch_time, \
     end_of_shift, alarm_enabled, alarm_volume, updated_at";
const PASS_UP_COLUMNS: &str = "id, agent_id, ticker, ticker_price, lead_name, interested_in, \
     agreed_to_sms, disposition, rebuttals, notes, date, created_at, updated_at";
const SCRIPT_COLUMNS: &str = "id, content, version, updated_at";
const MESSAGE_SELECT: &str = "SELECT m.id, m.agent_id, m.content, m.created_at, a.name \
     FROM messages m JOIN agents a ON a.id = m.agent_id";

fn agent_from_row(row: &Row) -> FloorResult<Agent> {
    Ok(Agent {
        id: row.try_get("id").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        custom_script: row.try_get("custom_script").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn break_from_row(row: &Row) -> FloorResult<Break> {
    let break_type: String = row.try_get("break_type").map_err(backend)?;
    Ok(Break {
        id: row.try_get("id").map_err(backend)?,
        agent_id: row.try_get("agent_id").map_err(backend)?,
        break_type: break_type.parse::<BreakType>().map_err(backend)?,
        start_time: row.try_get("start_time").map_err(backend)?,
        end_time: row.try_get("end_time").map_err(backend)?,
        missed: row.try_get("missed").map_err(backend)?,
    })
}

fn schedule_from_row(row: &Row) -> FloorResult<BreakSchedule> {
    Ok(BreakSchedule {
        id: row.try_get("id").map_err(backend)?,
        agent_id: row.try_get("agent_id").map_err(backend)?,
        first_break: row.try_get("first_break").map_err(backend)?,
        second_break: row.try_get("second_break").map_err(backend)?,
        lunch_time: row.try_get("lunch_time").map_err(backend)?,
        end_of_shift: row.try_get("end_of_shift").map_err(backend)?,
        alarm_enabled: row.try_get("alarm_enabled").map_err(backend)?,
        alarm_volume: row.try_get("alarm_volume").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn pass_up_from_row(row: &Row) -> FloorResult<PassUp> {
    let disposition: String = row.try_get("disposition").map_err(backend)?;
    let Json(rebuttals): Json<Rebuttals> = row.try_get("rebuttals").map_err(backend)?;
    Ok(PassUp {
        id: row.try_get("id").map_err(backend)?,
        agent_id: row.try_get("agent_id").map_err(backend)?,
        ticker: row.try_get("ticker").map_err(backend)?,
        ticker_price: row.try_get("ticker_price").map_err(backend)?,
        lead_name: row.try_get("lead_name").map_err(backend)?,
        interested_in: row.try_get("interested_in").map_err(backend)?,
        agreed_to_sms: row.try_get("agreed_to_sms").map_err(backend)?,
        disposition: disposition.parse::<Disposition>().map_err(backend)?,
        rebuttals,
        notes: row.try_get("notes").map_err(backend)?,
        date: row.try_get("date").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn message_from_row(row: &Row) -> FloorResult<Message> {
    let agent_id: Uuid = row.try_get("agent_id").map_err(backend)?;
    Ok(Message {
        id: row.try_get("id").map_err(backend)?,
        agent_id,
        content: row.try_get("content").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        agent: MessageAuthor {
            id: agent_id,
            name: row.try_get("name").map_err(backend)?,
        },
    })
}

fn script_from_row(row: &Row) -> FloorResult<GlobalScript> {
    Ok(GlobalScript {
        id: row.try_get("id").map_err(backend)?,
        content: row.try_get("content").map_err(backend)?,
        version: row.try_get("version").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn collect<T>(rows: &[Row], map: fn(&Row) -> FloorResult<T>) -> FloorResult<Vec<T>> {
    rows.iter().map(map).collect()
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// ============================================================================
// FLOOR STORE IMPLEMENTATION
// ============================================================================

#[async_trait]
impl FloorStore for DbClient {
    // ========================================================================
    // AGENT OPERATIONS
    // ========================================================================

    async fn agent_upsert_by_name(&self, candidate: &Agent) -> FloorResult<Agent> {
        let conn = self.get_conn().await?;
        let inserted = conn
            .query_opt(
                &format!(
                    "INSERT INTO agents ({AGENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
                     ON CONFLICT (name) DO NOTHING RETURNING {AGENT_COLUMNS}"
                ),
                &[
                    &candidate.id,
                    &candidate.name,
                    &candidate.custom_script,
                    &candidate.created_at,
                    &candidate.updated_at,
                ],
            )
            .await
            .map_err(|e| write_error(e, EntityKind::Agent, &candidate.name, None))?;

        if let Some(row) = inserted {
            return agent_from_row(&row);
        }

        let row = conn
            .query_one(
                &format!("SELECT {AGENT_COLUMNS} FROM agents WHERE name = $1"),
                &[&candidate.name],
            )
            .await
            .map_err(backend)?;
        agent_from_row(&row)
    }

    async fn agent_get(&self, id: EntityId) -> FloorResult<Option<Agent>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1"),
                &[&id],
            )
            .await
            .map_err(backend)?;
        row.as_ref().map(agent_from_row).transpose()
    }

    async fn agent_update(
        &self,
        id: EntityId,
        update: AgentUpdate,
        now: Timestamp,
    ) -> FloorResult<Agent> {
        let conn = self.get_conn().await?;
        let (set_script, script) = match update.custom_script {
            Some(script) => (true, script),
            None => (false, None),
        };
        let conflict_key = update.name.clone().unwrap_or_default();

        let row = conn
            .query_opt(
                &format!(
                    "UPDATE agents SET \
                       name = COALESCE($2::text, name), \
                       custom_script = CASE WHEN $3::boolean THEN $4::text ELSE custom_script END, \
                       updated_at = $5 \
                     WHERE id = $1 RETURNING {AGENT_COLUMNS}"
                ),
                &[&id, &update.name, &set_script, &script, &now],
            )
            .await
            .map_err(|e| write_error(e, EntityKind::Agent, conflict_key, None))?;

        match row {
            Some(row) => agent_from_row(&row),
            None => Err(FloorError::not_found(EntityKind::Agent, id)),
        }
    }

    async fn agent_list(&self) -> FloorResult<Vec<Agent>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!("SELECT {AGENT_COLUMNS} FROM agents ORDER BY name, id"),
                &[],
            )
            .await
            .map_err(backend)?;
        collect(&rows, agent_from_row)
    }

    // ========================================================================
    // BREAK OPERATIONS
    // ========================================================================

    async fn break_insert(&self, b: &Break) -> FloorResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            &format!("INSERT INTO breaks ({BREAK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"),
            &[
                &b.id,
                &b.agent_id,
                &b.break_type.as_str(),
                &b.start_time,
                &b.end_time,
                &b.missed,
            ],
        )
        .await
        .map_err(|e| write_error(e, EntityKind::Break, b.id, Some(b.agent_id)))?;
        Ok(())
    }

    async fn break_get(&self, id: EntityId) -> FloorResult<Option<Break>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {BREAK_COLUMNS} FROM breaks WHERE id = $1"),
                &[&id],
            )
            .await
            .map_err(backend)?;
        row.as_ref().map(break_from_row).transpose()
    }

    async fn break_close(
        &self,
        id: EntityId,
        end_time: Timestamp,
        missed: Option<bool>,
        only_open: bool,
    ) -> FloorResult<Break> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE breaks SET end_time = $2, missed = COALESCE($3::boolean, missed) \
                     WHERE id = $1 AND (NOT $4 OR end_time IS NULL) RETURNING {BREAK_COLUMNS}"
                ),
                &[&id, &end_time, &missed, &only_open],
            )
            .await
            .map_err(backend)?;
        match row {
            Some(row) => break_from_row(&row),
            None if only_open => Err(FloorError::StateConflict(format!(
                "Break {} already ended",
                id
            ))),
            None => Err(FloorError::not_found(EntityKind::Break, id)),
        }
    }

    async fn break_list_since(
        &self,
        agent_id: EntityId,
        since: Timestamp,
    ) -> FloorResult<Vec<Break>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {BREAK_COLUMNS} FROM breaks \
                     WHERE agent_id = $1 AND start_time >= $2 \
                     ORDER BY start_time DESC, id DESC"
                ),
                &[&agent_id, &since],
            )
            .await
            .map_err(backend)?;
        collect(&rows, break_from_row)
    }

    async fn break_find_open(&self, agent_id: EntityId) -> FloorResult<Option<Break>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "SELECT {BREAK_COLUMNS} FROM breaks \
                     WHERE agent_id = $1 AND end_time IS NULL \
                     ORDER BY start_time DESC, id DESC LIMIT 1"
                ),
                &[&agent_id],
            )
            .await
            .map_err(backend)?;
        row.as_ref().map(break_from_row).transpose()
    }

    // ========================================================================
    // BREAK SCHEDULE OPERATIONS
    // ========================================================================

    async fn schedule_get(&self, agent_id: EntityId) -> FloorResult<Option<BreakSchedule>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {SCHEDULE_COLUMNS} FROM break_schedules WHERE agent_id = $1"),
                &[&agent_id],
            )
            .await
            .map_err(backend)?;
        row.as_ref().map(schedule_from_row).transpose()
    }

    async fn schedule_insert(&self, s: &BreakSchedule) -> FloorResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            &format!(
                "INSERT INTO break_schedules ({SCHEDULE_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
            ),
            &[
                &s.id,
                &s.agent_id,
                &s.first_break,
                &s.second_break,
                &s.lunch_time,
                &s.end_of_shift,
                &s.alarm_enabled,
                &s.alarm_volume,
                &s.updated_at,
            ],
        )
        .await
        .map_err(|e| write_error(e, EntityKind::BreakSchedule, s.agent_id, Some(s.agent_id)))?;
        Ok(())
    }

    async fn schedule_upsert(&self, s: &BreakSchedule) -> FloorResult<BreakSchedule> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO break_schedules ({SCHEDULE_COLUMNS}) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                     ON CONFLICT (agent_id) DO UPDATE SET \
                       first_break = EXCLUDED.first_break, \
                       second_break = EXCLUDED.second_break, \
                       lunch_time = EXCLUDED.lunch_time, \
                       end_of_shift = EXCLUDED.end_of_shift, \
                       alarm_enabled = EXCLUDED.alarm_enabled, \
                       alarm_volume = EXCLUDED.alarm_volume, \
                       updated_at = EXCLUDED.updated_at \
                     RETURNING {SCHEDULE_COLUMNS}"
                ),
                &[
                    &s.id,
                    &s.agent_id,
                    &s.first_break,
                    &s.second_break,
                    &s.lunch_time,
                    &s.end_of_shift,
                    &s.alarm_enabled,
                    &s.alarm_volume,
                    &s.updated_at,
                ],
            )
            .await
            .map_err(|e| write_error(e, EntityKind::BreakSchedule, s.agent_id, Some(s.agent_id)))?;
        schedule_from_row(&row)
    }

    // ========================================================================
    // PASS-UP OPERATIONS
    // ========================================================================

    async fn pass_up_insert(&self, p: &PassUp) -> FloorResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            &format!(
                "INSERT INTO pass_ups ({PASS_UP_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
            ),
            &[
                &p.id,
                &p.agent_id,
                &p.ticker,
                &p.ticker_price,
                &p.lead_name,
                &p.interested_in,
                &p.agreed_to_sms,
                &p.disposition.as_str(),
                &Json(&p.rebuttals),
                &p.notes,
                &p.date,
                &p.created_at,
                &p.updated_at,
            ],
        )
        .await
        .map_err(|e| write_error(e, EntityKind::PassUp, p.id, Some(p.agent_id)))?;
        Ok(())
    }

    async fn pass_up_get(&self, id: EntityId) -> FloorResult<Option<PassUp>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {PASS_UP_COLUMNS} FROM pass_ups WHERE id = $1"),
                &[&id],
            )
            .await
            .map_err(backend)?;
        row.as_ref().map(pass_up_from_row).transpose()
    }

    async fn pass_up_update(
        &self,
        id: EntityId,
        patch: PassUpPatch,
        now: Timestamp,
    ) -> FloorResult<PassUp> {
        let conn = self.get_conn().await?;
        let (set_price, price) = match patch.ticker_price {
            Some(price) => (true, price),
            None => (false, None),
        };
        let (set_notes, notes) = match patch.notes {
            Some(notes) => (true, notes),
            None => (false, None),
        };
        let disposition = patch.disposition.map(|d| d.as_str());
        let rebuttals = patch.rebuttals.as_ref().map(Json);

        let row = conn
            .query_opt(
                &format!(
                    "UPDATE pass_ups SET \
                       ticker = COALESCE($2::text, ticker), \
                       ticker_price = CASE WHEN $3::boolean THEN $4::text ELSE ticker_price END, \
                       lead_name = COALESCE($5::text, lead_name), \
                       interested_in = COALESCE($6::text, interested_in), \
                       agreed_to_sms = COALESCE($7::boolean, agreed_to_sms), \
                       disposition = COALESCE($8::text, disposition), \
                       rebuttals = COALESCE($9::jsonb, rebuttals), \
                       notes = CASE WHEN $10::boolean THEN $11::text ELSE notes END, \
                       date = COALESCE($12::timestamptz, date), \
                       updated_at = $13 \
                     WHERE id = $1 RETURNING {PASS_UP_COLUMNS}"
                ),
                &[
                    &id,
                    &patch.ticker,
                    &set_price,
                    &price,
                    &patch.lead_name,
                    &patch.interested_in,
                    &patch.agreed_to_sms,
                    &disposition,
                    &rebuttals,
                    &set_notes,
                    &notes,
                    &patch.date,
                    &now,
                ],
            )
            .await
            .map_err(backend)?;

        match row {
            Some(row) => pass_up_from_row(&row),
            None => Err(FloorError::not_found(EntityKind::PassUp, id)),
        }
    }

    async fn pass_up_delete(&self, id: EntityId) -> FloorResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM pass_ups WHERE id = $1", &[&id])
            .await
            .map_err(backend)?;
        if deleted == 0 {
            return Err(FloorError::not_found(EntityKind::PassUp, id));
        }
        Ok(())
    }

    async fn pass_up_list(&self, filter: &PassUpFilter) -> FloorResult<Vec<PassUp>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {PASS_UP_COLUMNS} FROM pass_ups \
                     WHERE agent_id = $1 \
                       AND ($2::timestamptz IS NULL OR date >= $2) \
                       AND ($3::timestamptz IS NULL OR date <= $3) \
                     ORDER BY date DESC, id DESC LIMIT $4"
                ),
                &[
                    &filter.agent_id,
                    &filter.start,
                    &filter.end,
                    &to_i64(filter.limit),
                ],
            )
            .await
            .map_err(backend)?;
        collect(&rows, pass_up_from_row)
    }

    async fn pass_up_list_since(
        &self,
        agent_id: Option<EntityId>,
        since: Timestamp,
    ) -> FloorResult<Vec<PassUp>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {PASS_UP_COLUMNS} FROM pass_ups \
                     WHERE ($1::uuid IS NULL OR agent_id = $1) AND date >= $2 \
                     ORDER BY date DESC, id DESC"
                ),
                &[&agent_id, &since],
            )
            .await
            .map_err(backend)?;
        collect(&rows, pass_up_from_row)
    }

    // ========================================================================
    // MESSAGE OPERATIONS
    // ========================================================================

    async fn message_insert(
        &self,
        id: EntityId,
        agent_id: EntityId,
        content: &str,
        created_at: Timestamp,
    ) -> FloorResult<Message> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "WITH inserted AS ( \
                   INSERT INTO messages (id, agent_id, content, created_at) \
                   VALUES ($1, $2, $3, $4) RETURNING id, agent_id, content, created_at \
                 ) \
                 SELECT i.id, i.agent_id, i.content, i.created_at, a.name \
                 FROM inserted i JOIN agents a ON a.id = i.agent_id",
                &[&id, &agent_id, &content, &created_at],
            )
            .await
            .map_err(|e| write_error(e, EntityKind::Message, id, Some(agent_id)))?;
        message_from_row(&row)
    }

    async fn message_page(&self, limit: usize, offset: usize) -> FloorResult<Vec<Message>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "{MESSAGE_SELECT} ORDER BY m.created_at DESC, m.id DESC LIMIT $1 OFFSET $2"
                ),
                &[&to_i64(limit), &to_i64(offset)],
            )
            .await
            .map_err(backend)?;
        collect(&rows, message_from_row)
    }

    async fn message_list_since(&self, since: Timestamp) -> FloorResult<Vec<Message>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "{MESSAGE_SELECT} WHERE m.created_at >= $1 ORDER BY m.created_at, m.id"
                ),
                &[&since],
            )
            .await
            .map_err(backend)?;
        collect(&rows, message_from_row)
    }

    // ========================================================================
    // GLOBAL SCRIPT OPERATIONS
    // ========================================================================

    async fn global_script_latest(&self) -> FloorResult<Option<GlobalScript>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "SELECT {SCRIPT_COLUMNS} FROM global_scripts ORDER BY version DESC LIMIT 1"
                ),
                &[],
            )
            .await
            .map_err(backend)?;
        row.as_ref().map(script_from_row).transpose()
    }

    async fn global_script_publish(
        &self,
        id: EntityId,
        content: &str,
        now: Timestamp,
    ) -> FloorResult<GlobalScript> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO global_scripts ({SCRIPT_COLUMNS}) \
                     SELECT $1, $2, COALESCE(MAX(version), 0) + 1, $3 FROM global_scripts \
                     RETURNING {SCRIPT_COLUMNS}"
                ),
                &[&id, &content, &now],
            )
            .await
            .map_err(|e| write_error(e, EntityKind::GlobalScript, "version", None))?;
        script_from_row(&row)
    }

    // ========================================================================
    // HEALTH
    // ========================================================================

    async fn health_check(&self) -> FloorResult<bool> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(backend)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert!(config.url.is_none());
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "salesfloor");
        assert_eq!(config.max_size, 16);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_schema_covers_every_table() {
        for table in [
            "agents",
            "breaks",
            "break_schedules",
            "pass_ups",
            "messages",
            "global_scripts",
        ] {
            assert!(
                SCHEMA_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "missing table {}",
                table
            );
        }
        assert!(SCHEMA_SQL.contains("agent_id      UUID NOT NULL UNIQUE"));
    }

    #[test]
    fn test_columns_match_row_mappers() {
        assert_eq!(PASS_UP_COLUMNS.split(',').count(), 13);
        assert_eq!(SCHEDULE_COLUMNS.split(',').count(), 9);
        assert_eq!(BREAK_COLUMNS.split(',').count(), 6);
    }

    #[tokio::test]
    async fn test_pool_creation_is_lazy() -> ApiResult<()> {
        let config = DbConfig {
            url: Some("postgres://postgres@127.0.0.1:1/salesfloor".to_string()),
            ..DbConfig::default()
        };
        let client = DbClient::from_config(&config)?;
        assert_eq!(client.pool_size(), 0);
        Ok(())
    }
}
