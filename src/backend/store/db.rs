//! Database operations for the messaging core
//!
//! PostgreSQL implementation of the store interfaces via `sqlx`. Group
//! membership is persisted as a full rewrite of the group's connection rows;
//! callers serialize writes per group, so the rewrite cannot lose a
//! concurrent update.

use crate::backend::error::HubError;
use crate::backend::store::{GroupStore, MessageStore, UserDirectory};
use crate::shared::{ChatMessage, Connection, Group, GroupKey, UserProfile};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};

/// Postgres-backed user directory, message store, and group store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn connections_for_group(&self, name: &str) -> Result<Vec<Connection>, HubError> {
        let rows = sqlx::query(
            r#"
            SELECT connection_id, username
            FROM group_connections
            WHERE group_name = $1
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Connection {
                connection_id: row.get("connection_id"),
                username: row.get("username"),
            })
            .collect())
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn get_user_by_name(&self, username: &str) -> Result<Option<UserProfile>, HubError> {
        let row = sqlx::query(
            r#"
            SELECT username, display_name
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserProfile {
            username: r.get("username"),
            display_name: r.get("display_name"),
        }))
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn save_message(&self, message: &ChatMessage) -> Result<(), HubError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_username, sender_display_name, recipient_username, content, sent_at, read_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id)
        .bind(&message.sender_username)
        .bind(&message.sender_display_name)
        .bind(&message.recipient_username)
        .bind(&message.content)
        .bind(message.sent_at)
        .bind(message.read_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_thread(
        &self,
        username: &str,
        peer: &str,
    ) -> Result<Vec<ChatMessage>, HubError> {
        // Opening the thread reads everything the peer sent us.
        sqlx::query(
            r#"
            UPDATE messages
            SET read_at = $1
            WHERE recipient_username = $2 AND sender_username = $3 AND read_at IS NULL
            "#,
        )
        .bind(Utc::now())
        .bind(username)
        .bind(peer)
        .execute(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, sender_username, sender_display_name, recipient_username, content, sent_at, read_at
            FROM messages
            WHERE (sender_username = $1 AND recipient_username = $2)
               OR (sender_username = $2 AND recipient_username = $1)
            ORDER BY sent_at ASC
            "#,
        )
        .bind(username)
        .bind(peer)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ChatMessage {
                id: row.get("id"),
                sender_username: row.get("sender_username"),
                sender_display_name: row.get("sender_display_name"),
                recipient_username: row.get("recipient_username"),
                content: row.get("content"),
                sent_at: row.get("sent_at"),
                read_at: row.get("read_at"),
            })
            .collect())
    }
}

#[async_trait]
impl GroupStore for PgStore {
    async fn load_group(&self, key: &GroupKey) -> Result<Option<Group>, HubError> {
        let name = key.store_key();
        let row = sqlx::query(r#"SELECT name FROM groups WHERE name = $1"#)
            .bind(&name)
            .fetch_optional(&self.pool)
            .await?;

        if row.is_none() {
            return Ok(None);
        }

        Ok(Some(Group {
            key: key.clone(),
            connections: self.connections_for_group(&name).await?,
        }))
    }

    async fn save_group(&self, group: &Group) -> Result<(), HubError> {
        let name = group.name();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO groups (name, first_username, second_username)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&name)
        .bind(group.key.first())
        .bind(group.key.second())
        .execute(&mut *tx)
        .await?;

        sqlx::query(r#"DELETE FROM group_connections WHERE group_name = $1"#)
            .bind(&name)
            .execute(&mut *tx)
            .await?;

        for connection in &group.connections {
            sqlx::query(
                r#"
                INSERT INTO group_connections (connection_id, username, group_name)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(&connection.connection_id)
            .bind(&connection.username)
            .bind(&name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn group_for_connection(
        &self,
        connection_id: &str,
    ) -> Result<Option<Group>, HubError> {
        let row = sqlx::query(
            r#"
            SELECT g.name, g.first_username, g.second_username
            FROM group_connections gc
            JOIN groups g ON g.name = gc.group_name
            WHERE gc.connection_id = $1
            "#,
        )
        .bind(connection_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: String = row.get("name");
        let key = GroupKey::new(
            row.get::<String, _>("first_username").as_str(),
            row.get::<String, _>("second_username").as_str(),
        );

        Ok(Some(Group {
            key,
            connections: self.connections_for_group(&name).await?,
        }))
    }
}
