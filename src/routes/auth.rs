/// Authentication Routes
///
/// Handles login and token verification.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{Claims, TokenService};
use crate::credential_store::CredentialStore;
use crate::error::AppError;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Successful verification response
#[derive(Serialize)]
pub struct VerifyResponse {
    pub status: String,
    pub user: String,
}

/// POST /login
///
/// Authenticate with username and password and receive an access token.
///
/// # Errors
/// - 400: Malformed JSON body
/// - 401: Invalid credentials (unknown user and wrong password look the same)
/// - 503: Credential store unavailable
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<CredentialStore>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let subject = tokens
        .authenticate(store.get_ref(), &form.username, &form.password)
        .await?;

    let access_token = tokens.issue(&subject)?;

    tracing::info!(username = %subject, "User logged in successfully");

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /verify
///
/// Confirm that the presented bearer token is valid.
/// Claims are injected by the JWT middleware.
pub async fn verify(claims: web::ReqData<Claims>) -> HttpResponse {
    let claims = claims.into_inner();

    HttpResponse::Ok().json(VerifyResponse {
        status: "valid".to_string(),
        user: claims.sub,
    })
}
