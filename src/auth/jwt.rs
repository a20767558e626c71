/// JWT Token Service
///
/// Authenticates username/password pairs against the credential store and
/// issues/validates HS256-signed access tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::auth::password::verify_password;
use crate::configuration::JwtSettings;
use crate::credential_store::CredentialStore;
use crate::error::{AppError, AuthError};

/// Lifetime of every access token, in minutes
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies access tokens with a signing secret fixed at construction
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl TokenService {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Check a username/password pair and return the authenticated subject
    ///
    /// # Errors
    /// Unknown usernames and wrong passwords both yield
    /// `AuthError::InvalidCredentials`; storage failures propagate.
    pub async fn authenticate(
        &self,
        store: &CredentialStore,
        username: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let record = store
            .lookup(username)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        if !verify_password(password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(record.username)
    }

    /// Issue an access token for `subject`, valid for `ACCESS_TOKEN_TTL_MINUTES`
    ///
    /// # Errors
    /// Returns error if token encoding fails
    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let ttl = Duration::minutes(ACCESS_TOKEN_TTL_MINUTES);
        let claims = Claims::new(subject, &self.issuer, issued_at, ttl);

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    /// Any malformation, signature or algorithm mismatch, issuer mismatch
    /// or elapsed expiry yields `AuthError::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "JWT validation error");
                AuthError::InvalidToken
            })?;

        // jsonwebtoken still accepts a token during its final second
        if claims.is_expired() {
            tracing::debug!(subject = %claims.sub, "JWT expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "test".to_string(),
        }
    }

    async fn seeded_store() -> CredentialStore {
        let database = crate::configuration::DatabaseSettings {
            path: std::env::temp_dir()
                .join(format!("token_gate-{}.db", uuid::Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            max_connections: 1,
        };
        let store = CredentialStore::connect(&database)
            .await
            .expect("Failed to open database");
        store
            .initialize(&crate::configuration::SeedSettings {
                username: "admin".to_string(),
                password: "admin123".to_string(),
                hash_cost: 4,
            })
            .await
            .expect("Failed to initialize store");
        store
    }

    #[tokio::test]
    async fn test_authenticate_valid_credentials() {
        let service = TokenService::new(&get_test_config());
        let store = seeded_store().await;

        let subject = service
            .authenticate(&store, "admin", "admin123")
            .await
            .expect("Failed to authenticate");

        assert_eq!(subject, "admin");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_and_unknown_user_look_alike() {
        let service = TokenService::new(&get_test_config());
        let store = seeded_store().await;

        let wrong_password = service.authenticate(&store, "admin", "admin124").await;
        let unknown_user = service.authenticate(&store, "nobody", "admin123").await;

        assert!(matches!(
            wrong_password,
            Err(AppError::Auth(AuthError::InvalidCredentials))
        ));
        assert!(matches!(
            unknown_user,
            Err(AppError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_authenticated_subject_round_trips_through_token() {
        let service = TokenService::new(&get_test_config());
        let store = seeded_store().await;

        let subject = service
            .authenticate(&store, "admin", "admin123")
            .await
            .expect("Failed to authenticate");
        let token = service.issue(&subject).expect("Failed to generate token");
        let claims = service.verify(&token).expect("Failed to validate token");

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iss, service.issuer());
    }

    #[test]
    fn test_issue_and_verify_token() {
        let service = TokenService::new(&get_test_config());

        let token = service.issue("admin").expect("Failed to generate token");
        let claims = service.verify(&token).expect("Failed to validate token");

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iss, "test");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_token_uses_thirty_minute_ttl() {
        let service = TokenService::new(&get_test_config());
        let issued_at = Utc::now();

        let token = service.issue_at("admin", issued_at).expect("Failed to generate token");
        let claims = service.verify(&token).expect("Failed to validate token");

        assert_eq!(claims.exp, issued_at.timestamp() + 30 * 60);
    }

    #[test]
    fn test_token_header_is_hs256() {
        let service = TokenService::new(&get_test_config());
        let token = service.issue("admin").expect("Failed to generate token");

        let header = jsonwebtoken::decode_header(&token).expect("Failed to decode header");
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_expired_token() {
        let service = TokenService::new(&get_test_config());

        let token = service
            .issue_at("admin", Utc::now() - Duration::minutes(31))
            .expect("Failed to generate token");

        assert_eq!(service.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_token_just_inside_ttl_is_valid() {
        let service = TokenService::new(&get_test_config());

        let token = service
            .issue_at("admin", Utc::now() - Duration::minutes(29))
            .expect("Failed to generate token");

        assert!(service.verify(&token).is_ok());
    }

    #[test]
    fn test_invalid_token() {
        let service = TokenService::new(&get_test_config());

        assert_eq!(service.verify("invalid.token.here"), Err(AuthError::InvalidToken));
        assert_eq!(service.verify(""), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_tampered_token() {
        let service = TokenService::new(&get_test_config());
        let token = service.issue("admin").expect("Failed to generate token");

        // Tamper with token
        let tampered = format!("{}X", token);

        assert_eq!(service.verify(&tampered), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_different_secret() {
        let issuer = TokenService::new(&get_test_config());
        let token = issuer.issue("admin").expect("Failed to generate token");

        let mut config = get_test_config();
        config.secret = "another-secret-key-at-least-32-characters".to_string();
        let verifier = TokenService::new(&config);

        assert_eq!(verifier.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_issuer() {
        let service = TokenService::new(&get_test_config());
        let token = service.issue("admin").expect("Failed to generate token");

        // Change issuer in validation config
        let mut config = get_test_config();
        config.issuer = "wrong-issuer".to_string();
        let verifier = TokenService::new(&config);

        assert_eq!(verifier.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_algorithm_mismatch() {
        let config = get_test_config();
        let service = TokenService::new(&config);
        let claims = Claims::new("admin", "test", Utc::now(), Duration::minutes(30));

        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("Failed to generate token");

        assert_eq!(service.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_missing_issuer_claim() {
        #[derive(serde::Serialize)]
        struct NoIssuer {
            sub: String,
            exp: i64,
        }

        let config = get_test_config();
        let service = TokenService::new(&config);
        let claims = NoIssuer {
            sub: "admin".to_string(),
            exp: (Utc::now() + Duration::minutes(30)).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("Failed to generate token");

        assert_eq!(service.verify(&token), Err(AuthError::InvalidToken));
    }
}
