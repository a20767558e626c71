use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::TokenService;
use crate::credential_store::CredentialStore;
use crate::error::json_error_handler;
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{health_check, list_users, login, verify};

pub fn run(
    listener: TcpListener,
    store: CredentialStore,
    tokens: TokenService,
) -> Result<Server, std::io::Error> {
    let store = web::Data::new(store);
    let tokens_data = web::Data::new(tokens.clone());

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(store.clone())
            .app_data(tokens_data.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))

            // Public routes
            .route("/health", web::get().to(health_check))
            .route("/login", web::post().to(login))

            // Protected routes (require a bearer token). The middleware wraps
            // the route, not the resource, so other methods still get 405.
            .route(
                "/verify",
                web::get()
                    .to(verify)
                    .wrap(JwtMiddleware::new(tokens.clone())),
            )
            .route(
                "/users",
                web::get()
                    .to(list_users)
                    .wrap(JwtMiddleware::new(tokens.clone())),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
