use config::builder::{ConfigBuilder, DefaultState};
use config::ConfigError;
use sqlx::sqlite::SqliteConnectOptions;

/// Fallback signing secret used when neither the configuration nor
/// `JWT_SECRET` provides one. Insecure; only suitable for local use.
pub const DEFAULT_JWT_SECRET: &str = "super-secret-key";

/// Issuer claim expected by the upstream gateway's JWT credential.
pub const DEFAULT_ISSUER: &str = "kong-issuer";

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub seed: SeedSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    /// Path of the SQLite database file
    pub path: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
    }
}

/// JWT signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
}

impl JwtSettings {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// The single well-known account created when the store is initialized
#[derive(serde::Deserialize, Clone)]
pub struct SeedSettings {
    pub username: String,
    pub password: String,
    /// bcrypt cost factor
    pub hash_cost: u32,
}

impl std::fmt::Debug for SeedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedSettings")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

/// Load settings from built-in defaults, an optional `configuration` file,
/// `APP_`-prefixed environment variables and finally `JWT_SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
        .build()?;
    settings.try_deserialize::<Settings>()
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("database.path", "sqlite.db")?
        .set_default("database.max_connections", 5)?
        .set_default("jwt.secret", DEFAULT_JWT_SECRET)?
        .set_default("jwt.issuer", DEFAULT_ISSUER)?
        .set_default("seed.username", "admin")?
        .set_default("seed.password", "admin123")?
        .set_default("seed.hash_cost", i64::from(bcrypt::DEFAULT_COST))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults_only() -> ConfigBuilder<DefaultState> {
        with_defaults(config::Config::builder()).expect("Failed to set defaults")
    }

    #[test]
    fn test_built_in_defaults() {
        let configuration = defaults_only()
            .build()
            .and_then(|c| c.try_deserialize::<Settings>())
            .expect("Failed to read configuration");

        assert_eq!(configuration.application.address(), "127.0.0.1:8000");
        assert_eq!(configuration.database.path, "sqlite.db");
        assert_eq!(configuration.database.max_connections, 5);
        assert_eq!(configuration.jwt.issuer, DEFAULT_ISSUER);
        assert!(configuration.jwt.uses_default_secret());
        assert_eq!(configuration.seed.username, "admin");
        assert_eq!(configuration.seed.hash_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_secret_override_replaces_default() {
        let configuration = defaults_only()
            .set_override_option("jwt.secret", Some("from-environment"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize::<Settings>())
            .expect("Failed to read configuration");

        assert_eq!(configuration.jwt.secret, "from-environment");
        assert!(!configuration.jwt.uses_default_secret());
        assert_eq!(configuration.jwt.issuer, DEFAULT_ISSUER);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let jwt = JwtSettings {
            secret: "very-secret".to_string(),
            issuer: "test".to_string(),
        };
        let seed = SeedSettings {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            hash_cost: 4,
        };

        assert!(!format!("{:?}", jwt).contains("very-secret"));
        assert!(!format!("{:?}", seed).contains("admin123"));
    }

    #[test]
    fn test_application_address() {
        let application = ApplicationSettings {
            host: "0.0.0.0".to_string(),
            port: 8000,
        };
        assert_eq!(application.address(), "0.0.0.0:8000");
    }
}
