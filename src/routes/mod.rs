mod auth;
mod health_check;
mod users;

pub use auth::{login, verify, LoginRequest, TokenResponse, VerifyResponse};
pub use health_check::health_check;
pub use users::list_users;
