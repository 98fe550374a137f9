//! Server mode

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{AppStartTime, configure_routes};
use crate::runtime::lifetime;

/// 请求体上限
const PAYLOAD_LIMIT: usize = 256 * 1024;

/// Run the HTTP server
///
/// **Note**: config and logging must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();
    let config = crate::config::get_config();

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let storage = web::Data::from(startup.storage.clone());
    let resolver = web::Data::from(startup.resolver);
    let oembed = web::Data::from(startup.oembed);
    let start_time = web::Data::new(app_start_time);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(storage.clone())
            .app_data(resolver.clone())
            .app_data(oembed.clone())
            .app_data(start_time.clone())
            .app_data(web::PayloadConfig::new(PAYLOAD_LIMIT))
            .configure(configure_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?;

    warn!("Starting server at http://{}", bind_address);
    let server = server.run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(startup.storage) => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
