use std::net::TcpListener;
use token_gate::auth::TokenService;
use token_gate::configuration::get_configuration;
use token_gate::credential_store::CredentialStore;
use token_gate::startup::run;
use token_gate::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = get_configuration().map_err(|e| {
        tracing::error!("Failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;
    tracing::info!("Configuration loaded successfully");

    if configuration.jwt.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; signing tokens with the built-in default secret");
    }

    tracing::info!(path = %configuration.database.path, "Opening credential store");
    let store = CredentialStore::connect(&configuration.database)
        .await
        .map_err(|e| {
            tracing::error!("Failed to open credential store: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;

    store.initialize(&configuration.seed).await.map_err(|e| {
        tracing::error!("Failed to initialize credential store: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Database initialization error")
    })?;

    let tokens = TokenService::new(&configuration.jwt);

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, store, tokens)?.await
}
