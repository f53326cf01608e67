use std::sync::Arc;

use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use portfolio_backend::config::Config;
use portfolio_backend::handlers;
use portfolio_backend::storage::{MemStorage, Storage};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    // Хранилище создаётся один раз и передаётся во все воркеры
    let storage: Arc<dyn Storage> = Arc::new(MemStorage::new());
    let storage = web::Data::from(storage);
    let json_limit = config.json_limit;

    let bind_address = config.bind_address();
    info!("portfolio backend listening on http://{}", bind_address);
    info!("  GET   /api/health");
    info!("  POST  /api/contact");
    info!("  GET   /api/contact");
    info!("  GET   /api/contact/{{id}}");
    info!("  PATCH /api/contact/{{id}}/read");

    HttpServer::new(move || {
        App::new()
            .app_data(storage.clone())
            .app_data(handlers::json_config(json_limit))
            .wrap(actix_middleware::Logger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
