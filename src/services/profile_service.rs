use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Name shown for users without a profile row.
pub const FALLBACK_USERNAME: &str = "Participant";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn get_username(&self, user_id: Uuid) -> Result<String>;
}

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileLookup for ProfileService {
    async fn get_username(&self, user_id: Uuid) -> Result<String> {
        let username: Option<String> =
            sqlx::query_scalar(r#"SELECT username FROM profiles WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Error::PersistenceUnavailable(e.to_string()))?;

        Ok(username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_USERNAME.to_string()))
    }
}
