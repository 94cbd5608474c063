use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{normalize_email, Group, NewUser, Role, User};
use super::store::{StoreError, StoreResult, UserStore};

/// User row - SQL persistence layer (roles and groups are joined separately)
#[derive(sqlx::FromRow, Debug, Clone)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    blocked: bool,
    contact_number: Option<String>,
    created_at: DateTime<Utc>,
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Attach roles and groups to a user row
    async fn hydrate(&self, row: UserRow) -> StoreResult<User> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT r.id, r.name
             FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.name",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let groups = sqlx::query_as::<_, Group>(
            "SELECT g.id, g.name
             FROM groups g
             JOIN user_groups ug ON ug.group_id = g.id
             WHERE ug.user_id = $1
             ORDER BY g.name",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            blocked: row.blocked,
            contact_number: row.contact_number,
            created_at: row.created_at,
            roles,
            groups,
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let email = normalize_email(&new_user.email);
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, name, password_hash, blocked, contact_number)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(new_user.blocked)
        .bind(&new_user.contact_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => StoreError::DuplicateEmail(email.clone()),
            _ => StoreError::Database(e),
        })?;

        for name in &new_user.roles {
            let role = sqlx::query_as::<_, Role>(
                "INSERT INTO roles (name) VALUES ($1)
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                 RETURNING id, name",
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(row.id)
                .bind(role.id)
                .execute(&mut *tx)
                .await?;
        }

        for name in &new_user.groups {
            let group = sqlx::query_as::<_, Group>(
                "INSERT INTO groups (name) VALUES ($1)
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                 RETURNING id, name",
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO user_groups (user_id, group_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(row.id)
                .bind(group.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.hydrate(row).await
    }
}
