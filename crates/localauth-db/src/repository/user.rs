//! SQLite implementation of [`UserRepository`] over one tenant's store.
//!
//! There is no tenant column anywhere in this schema: a repository is
//! bound to exactly one tenant's database file, so a query cannot reach
//! another tenant's rows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use localauth_core::error::LocalAuthResult;
use localauth_core::models::user::{CreateUser, UpdateUser, User};
use localauth_core::repository::UserRepository;
use rusqlite::types::ToSql;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use crate::connection::SqliteStore;
use crate::error::DbError;

const USER_COLUMNS: &str = "id, email, username, password_hash, full_name, phone, \
     metadata, created_at, updated_at, last_sign_in";

/// DB-side row struct; id and metadata stay raw until validated.
struct UserRow {
    id: String,
    email: String,
    username: Option<String>,
    password_hash: String,
    full_name: String,
    phone: String,
    metadata: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_sign_in: Option<DateTime<Utc>>,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            username: row.get(2)?,
            password_hash: row.get(3)?,
            full_name: row.get(4)?,
            phone: row.get(5)?,
            metadata: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            last_sign_in: row.get(9)?,
        })
    }

    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))?;
        let metadata = serde_json::from_str(&self.metadata)
            .map_err(|e| DbError::Corrupt(format!("invalid metadata for {id}: {e}")))?;
        Ok(User {
            id,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            full_name: self.full_name,
            phone: self.phone,
            metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_sign_in: self.last_sign_in,
        })
    }
}

fn encode_metadata(value: &serde_json::Value) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|e| DbError::Corrupt(format!("metadata: {e}")))
}

/// User repository bound to a single tenant's store.
#[derive(Clone, Debug)]
pub struct SqliteUserRepository {
    store: Arc<SqliteStore>,
}

impl SqliteUserRepository {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    fn select_one(&self, filter: &str, value: &str) -> Result<User, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter} = ?1");
        let row = self.store.with_conn(|conn| {
            Ok(conn
                .query_row(&sql, [value], UserRow::from_row)
                .optional()?)
        })?;
        row.ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("{filter}={value}"),
        })?
        .try_into_user()
    }

    fn not_found(id: Uuid) -> DbError {
        DbError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, input: CreateUser) -> LocalAuthResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: input.email,
            username: input.username,
            password_hash: input.password_hash,
            full_name: input.full_name,
            phone: input.phone,
            metadata: input.metadata,
            created_at: now,
            updated_at: now,
            last_sign_in: None,
        };
        let metadata = encode_metadata(&user.metadata)?;

        self.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, username, password_hash, full_name, \
                 phone, metadata, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                (
                    user.id.to_string(),
                    &user.email,
                    &user.username,
                    &user.password_hash,
                    &user.full_name,
                    &user.phone,
                    &metadata,
                    user.created_at,
                    user.updated_at,
                ),
            )?;
            Ok(())
        })?;

        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> LocalAuthResult<User> {
        Ok(self.select_one("id", &id.to_string())?)
    }

    async fn get_by_email(&self, email: &str) -> LocalAuthResult<User> {
        Ok(self.select_one("email", email)?)
    }

    async fn get_by_username(&self, username: &str) -> LocalAuthResult<User> {
        Ok(self.select_one("username", username)?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> LocalAuthResult<User> {
        let id_str = id.to_string();
        let now = Utc::now();
        let metadata = input.metadata.as_ref().map(encode_metadata).transpose()?;
        // An empty username clears it; NULL keeps the unique index satisfied
        // for any number of users without one.
        let username = input
            .username
            .as_deref()
            .map(|u| Some(u).filter(|u| !u.is_empty()));

        let mut sets = Vec::new();
        let mut params: Vec<(&str, &dyn ToSql)> =
            vec![(":id", &id_str as &dyn ToSql), (":now", &now as &dyn ToSql)];
        if let Some(full_name) = &input.full_name {
            sets.push("full_name = :full_name");
            params.push((":full_name", full_name as &dyn ToSql));
        }
        if let Some(phone) = &input.phone {
            sets.push("phone = :phone");
            params.push((":phone", phone as &dyn ToSql));
        }
        if let Some(username) = &username {
            sets.push("username = :username");
            params.push((":username", username as &dyn ToSql));
        }
        if let Some(metadata) = &metadata {
            sets.push("metadata = :metadata");
            params.push((":metadata", metadata as &dyn ToSql));
        }
        sets.push("updated_at = :now");

        let sql = format!("UPDATE users SET {} WHERE id = :id", sets.join(", "));
        let changed = self
            .store
            .with_conn(|conn| Ok(conn.execute(&sql, params.as_slice())?))?;
        if changed == 0 {
            return Err(Self::not_found(id).into());
        }

        Ok(self.select_one("id", &id_str)?)
    }

    async fn record_sign_in(&self, id: Uuid, at: DateTime<Utc>) -> LocalAuthResult<()> {
        let changed = self.store.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE users SET last_sign_in = ?1 WHERE id = ?2",
                (at, id.to_string()),
            )?)
        })?;
        if changed == 0 {
            return Err(Self::not_found(id).into());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> LocalAuthResult<()> {
        let changed = self.store.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id.to_string()])?)
        })?;
        if changed == 0 {
            return Err(Self::not_found(id).into());
        }
        Ok(())
    }

    async fn list(&self) -> LocalAuthResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC"
        );
        let rows = self.store.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], UserRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        Ok(rows
            .into_iter()
            .map(UserRow::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn count(&self) -> LocalAuthResult<u64> {
        let count: i64 = self.store.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
        })?;
        Ok(count.max(0) as u64)
    }
}
