//! Main entry point for the campground booking server.
//! This crate serves the booking wizard API and, optionally, the frontend application.

use std::sync::Arc;

use actix_files::Files;
use actix_web::{App, HttpServer, middleware::Logger, web};
use booking_wizard::RegexFieldValidator;
use reservation_client::{ClientConfig, ReservationApiClient};
use web_handlers::*;

mod server_config;
use server_config::ServerConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting campground booking server...");

    let server_config = ServerConfig::from_env();
    let client_config = ClientConfig::from_env();
    let client = match ReservationApiClient::new(Some(client_config)) {
        Ok(client) => {
            log::info!("🏕️ Reservation backend: {}", client.base_url());
            Arc::new(client)
        }
        Err(e) => {
            log::error!("❌ Failed to create reservation API client: {}", e);
            std::process::exit(1);
        }
    };

    let services = web::Data::new(BookingServices::new(
        client.clone(),
        client,
        Arc::new(RegexFieldValidator::new()),
        None,
    ));
    let store = web::Data::new(create_booking_store());

    let frontend_path = server_config.existing_frontend_path().map(|path| path.to_path_buf());
    match &frontend_path {
        Some(path) => log::info!("📁 Frontend files location: {}", path.display()),
        None => log::info!("📁 No frontend directory configured, serving the API only"),
    }
    log::info!(
        "🌐 Server will be available at: http://{}",
        server_config.bind_address
    );

    HttpServer::new(move || {
        let app = App::new()
            .app_data(services.clone())
            .app_data(store.clone())
            .wrap(Logger::default())
            .configure(configure_booking_routes);

        match &frontend_path {
            Some(path) => app.service(Files::new("/", path).index_file("index.html")),
            None => app,
        }
    })
    .bind(&server_config.bind_address)?
    .run()
    .await
}
