use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use url::Url;

use crate::error::{Error, Result};
use crate::models::certificate::Certificate;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// What happened to a certificate email that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No provider is configured. Nothing left the process.
    Skipped,
}

/// Outbound certificate notifications. Best-effort: callers log failures and
/// carry on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailDispatch: Send + Sync {
    async fn send_certificate_email(&self, user_email: &str, certificate: &Certificate) -> Result<Delivery>;
}

#[derive(Clone)]
pub struct EmailService {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    from: String,
    verify_base_url: String,
}

impl EmailService {
    pub fn new(client: Client, api_key: Option<String>, from: String, verify_base_url: String) -> Self {
        Self {
            client,
            api_key,
            api_url: RESEND_API_URL.to_string(),
            from,
            verify_base_url,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Public verification link for a certificate.
pub fn verify_url(base: &str, certificate_id: &str) -> Result<Url> {
    let mut base = base.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join(certificate_id))
        .map_err(|e| Error::Config(format!("Invalid VERIFY_BASE_URL '{}': {}", base, e)))
}

pub fn certificate_email_subject(certificate: &Certificate) -> String {
    format!(
        "Congratulations {}! You Passed the Cyber Security Quiz!",
        certificate.username
    )
}

pub fn render_certificate_email(certificate: &Certificate, verify_link: &Url) -> String {
    // Only the username is user supplied.
    let username = ammonia::clean_text(&certificate.username);
    let certificate_id = &certificate.certificate_id;
    let link = verify_link.as_str();
    let issued = certificate.issued_at.format("%B %-d, %Y");

    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: 'Segoe UI', Tahoma, sans-serif; background: #0f172a; color: #e2e8f0;">
    <div style="max-width: 600px; margin: 0 auto; padding: 40px 20px; text-align: center;">
      <h1 style="color: #22d3ee;">Certificate of Achievement</h1>
      <p>Congratulations, <strong>{username}</strong>!</p>
      <p>You have successfully demonstrated proficiency in Cyber Security Awareness.</p>
      <p style="font-size: 48px; font-weight: bold; color: #22d3ee;">{percentage}%</p>
      <p>{score}/{total} correct &bull; {level}</p>
      <p style="font-family: monospace; color: #f59e0b;">Certificate ID: {certificate_id}</p>
      <p>Awarded on {issued}</p>
      <a href="{link}" style="display: inline-block; padding: 14px 32px; background: #f59e0b; color: #0f172a; border-radius: 8px; text-decoration: none; font-weight: bold;">Verify Certificate</a>
      <p style="color: #64748b; font-size: 12px;">This certificate can be verified at any time using the link above.</p>
    </div>
  </body>
</html>"#,
        percentage = certificate.percentage,
        score = certificate.score,
        total = certificate.total_questions,
        level = certificate.difficulty.level_label(),
    )
}

#[async_trait]
impl EmailDispatch for EmailService {
    async fn send_certificate_email(&self, user_email: &str, certificate: &Certificate) -> Result<Delivery> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!(
                certificate_id = %certificate.certificate_id,
                "RESEND_API_KEY not configured, skipping certificate email"
            );
            return Ok(Delivery::Skipped);
        };

        let link = verify_url(&self.verify_base_url, &certificate.certificate_id)?;
        let body = json!({
            "from": self.from,
            "to": [user_email],
            "subject": certificate_email_subject(certificate),
            "html": render_certificate_email(certificate, &link),
        });

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let details = resp.text().await.unwrap_or_default();
            return Err(Error::EmailDelivery(format!("status {}: {}", status, details)));
        }

        tracing::info!(
            certificate_id = %certificate.certificate_id,
            "Certificate email sent"
        );
        Ok(Delivery::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn certificate(username: &str) -> Certificate {
        Certificate {
            certificate_id: "CSA-0123456789ABCDEF0123456789ABCDEF".into(),
            user_id: Uuid::new_v4(),
            username: username.into(),
            score: 9,
            total_questions: 10,
            percentage: 90,
            difficulty: Difficulty::Hard,
            issued_at: Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn verify_url_appends_certificate_id() {
        let url = verify_url("https://quiz.example.com/verify", "CSA-1").unwrap();
        assert_eq!(url.as_str(), "https://quiz.example.com/verify/CSA-1");
        let url = verify_url("https://quiz.example.com/verify/", "CSA-1").unwrap();
        assert_eq!(url.as_str(), "https://quiz.example.com/verify/CSA-1");
    }

    #[test]
    fn verify_url_rejects_garbage_base() {
        assert!(matches!(verify_url("not a url", "CSA-1"), Err(Error::Config(_))));
    }

    #[test]
    fn email_body_contains_result_and_link() {
        let cert = certificate("alice");
        let link = verify_url("https://quiz.example.com/verify/", &cert.certificate_id).unwrap();
        let html = render_certificate_email(&cert, &link);
        assert!(html.contains("alice"));
        assert!(html.contains("90%"));
        assert!(html.contains("9/10 correct"));
        assert!(html.contains("Advanced Level"));
        assert!(html.contains("CSA-0123456789ABCDEF0123456789ABCDEF"));
        assert!(html.contains("March 4, 2026"));
        assert!(html.contains("https://quiz.example.com/verify/CSA-0123456789ABCDEF0123456789ABCDEF"));
    }

    #[test]
    fn email_body_escapes_username() {
        let cert = certificate("<script>alert(1)</script>");
        let link = verify_url("https://quiz.example.com/verify/", &cert.certificate_id).unwrap();
        let html = render_certificate_email(&cert, &link);
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn subject_greets_the_user() {
        assert_eq!(
            certificate_email_subject(&certificate("bob")),
            "Congratulations bob! You Passed the Cyber Security Quiz!"
        );
    }

    #[tokio::test]
    async fn missing_api_key_skips_delivery() {
        let svc = EmailService::new(
            Client::new(),
            None,
            "Cyber Quiz <onboarding@resend.dev>".into(),
            "https://quiz.example.com/verify/".into(),
        )
        .with_api_url("http://127.0.0.1:9/unreachable");
        let delivery = svc.send_certificate_email("bob@example.com", &certificate("bob")).await;
        assert_eq!(tokio_test::assert_ok!(delivery), Delivery::Skipped);
    }
}
