// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

// endregion: --- Imports

// region:    --- Session Store Trait
/// 이름이 붙은 문자열 항목을 영속화하는 저장소
///
/// 한 번의 호출로 쓰는 항목들은 전부 반영되거나 전부 반영되지 않는다.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put_all(&self, entries: &[(&str, String)]) -> Result<()>;
    async fn remove_all(&self, keys: &[&str]) -> Result<()>;
}

// endregion: --- Session Store Trait

// region:    --- Sqlite Session Store
#[derive(Debug, sqlx::FromRow)]
pub struct SessionEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

pub struct SqliteSessionStore {
    db_manager: Arc<DatabaseManager>,
}

impl SqliteSessionStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = sqlx::query_as::<_, SessionEntry>(
            "SELECT key, value, updated_at FROM session_entries WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(self.db_manager.pool())
        .await?;
        Ok(entry.map(|e| e.value))
    }

    async fn put_all(&self, entries: &[(&str, String)]) -> Result<()> {
        let entries: Vec<(String, String)> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let now = Utc::now();
        debug!("{:<12} --> 세션 항목 저장: {}건", "Session", entries.len());

        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    for (key, value) in entries {
                        sqlx::query(
                            "INSERT INTO session_entries (key, value, updated_at) VALUES (?, ?, ?)
                             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                        )
                        .bind(key)
                        .bind(value)
                        .bind(now)
                        .execute(&mut **tx)
                        .await?;
                    }
                    Ok::<(), AppError>(())
                })
            })
            .await
    }

    async fn remove_all(&self, keys: &[&str]) -> Result<()> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    for key in keys {
                        sqlx::query("DELETE FROM session_entries WHERE key = ?")
                            .bind(key)
                            .execute(&mut **tx)
                            .await?;
                    }
                    Ok::<(), AppError>(())
                })
            })
            .await
    }
}

// endregion: --- Sqlite Session Store

// region:    --- Memory Session Store
/// 프로세스 메모리에만 유지되는 저장소
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put_all(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.entries.lock().await;
        for (key, value) in entries {
            map.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_all(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.lock().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

// endregion: --- Memory Session Store
