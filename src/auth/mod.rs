/// Authentication module
///
/// Handles password verification, JWT issuance/validation,
/// and bearer header parsing.

mod bearer;
mod claims;
mod jwt;
mod password;

pub use bearer::authorize;
pub use bearer::extract_bearer_token;
pub use claims::Claims;
pub use jwt::TokenService;
pub use password::hash_password;
pub use password::verify_password;
