use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::certificate_dto::{CertificateView, IssueCertificateResponse},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/certificate",
    params(("id" = Uuid, Path, description = "Completed quiz session ID")),
    responses(
        (status = 201, description = "Certificate issued", body = IssueCertificateResponse),
        (status = 200, description = "Existing certificate returned", body = IssueCertificateResponse),
        (status = 403, description = "Score below the certificate threshold"),
        (status = 503, description = "Certificate store unavailable")
    )
)]
#[axum::debug_handler]
pub async fn issue_certificate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let issued = state
        .quiz
        .issue_certificate(claims.user_id()?, id, claims.email.as_deref())
        .await?;
    let status = if issued.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(issued)))
}

#[utoipa::path(
    get,
    path = "/api/certificates/me/latest",
    responses(
        (status = 200, description = "Most recent certificate of the caller", body = CertificateView),
        (status = 404, description = "No certificate yet")
    )
)]
#[axum::debug_handler]
pub async fn latest_certificate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.quiz.latest_certificate(claims.user_id()?).await?))
}

#[utoipa::path(
    get,
    path = "/api/certificates/{certificate_id}",
    params(("certificate_id" = String, Path, description = "Public certificate identifier")),
    responses(
        (status = 200, description = "Certificate is genuine", body = CertificateView),
        (status = 404, description = "Certificate not found")
    )
)]
#[axum::debug_handler]
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.quiz.verify_certificate(&certificate_id).await?))
}
