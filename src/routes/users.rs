use actix_web::{web, HttpResponse};

use crate::auth::Claims;
use crate::credential_store::CredentialStore;
use crate::error::AppError;

/// GET /users
///
/// List every account as `{id, username}`. Requires a valid bearer token.
pub async fn list_users(
    claims: web::ReqData<Claims>,
    store: web::Data<CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let users = store.list_all().await?;

    tracing::debug!(subject = %claims.sub, count = users.len(), "Listed users");

    Ok(HttpResponse::Ok().json(users))
}
