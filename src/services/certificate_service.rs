use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::certificate::{Certificate, CertificateRow};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn find_latest_certificate(&self, user_id: Uuid) -> Result<Option<Certificate>>;
    async fn save_certificate(&self, certificate: &Certificate) -> Result<()>;
    /// Public lookup used by the verification page.
    async fn find_certificate_by_id(&self, certificate_id: &str) -> Result<Option<Certificate>>;
}

#[derive(Clone)]
pub struct CertificateService {
    pool: PgPool,
}

impl CertificateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_certificate(row: CertificateRow) -> Result<Certificate> {
    let certificate_id = row.certificate_id.clone();
    Certificate::try_from(row).map_err(|e| {
        Error::Internal(format!("Certificate {} has an invalid difficulty: {}", certificate_id, e))
    })
}

#[async_trait]
impl CertificateStore for CertificateService {
    async fn find_latest_certificate(&self, user_id: Uuid) -> Result<Option<Certificate>> {
        let row = sqlx::query_as::<_, CertificateRow>(
            r#"
            SELECT certificate_id, user_id, username, score, total_questions, percentage, difficulty, issued_at
            FROM certificates
            WHERE user_id = $1
            ORDER BY issued_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::PersistenceUnavailable(e.to_string()))?;

        row.map(into_certificate).transpose()
    }

    async fn save_certificate(&self, certificate: &Certificate) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO certificates (
                certificate_id, user_id, username, score, total_questions, percentage, difficulty, issued_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&certificate.certificate_id)
        .bind(certificate.user_id)
        .bind(&certificate.username)
        .bind(certificate.score as i32)
        .bind(certificate.total_questions as i32)
        .bind(certificate.percentage as i32)
        .bind(certificate.difficulty.as_str())
        .bind(certificate.issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::PersistenceUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn find_certificate_by_id(&self, certificate_id: &str) -> Result<Option<Certificate>> {
        let row = sqlx::query_as::<_, CertificateRow>(
            r#"
            SELECT certificate_id, user_id, username, score, total_questions, percentage, difficulty, issued_at
            FROM certificates
            WHERE certificate_id = $1
            "#,
        )
        .bind(certificate_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::PersistenceUnavailable(e.to_string()))?;

        row.map(into_certificate).transpose()
    }
}
