//! # Chronicle Server
//!
//! Main entry point for the Chronicle application.
//!
//! Runs two things in a single process:
//! - The post REST API
//! - The user registration event consumer

use chronicle_config::{AppConfig, ConfigLoader};
use chronicle_consumer::redis::{create_pool, RedisRegistrationQueue};
use chronicle_consumer::{LoggingRegistrationHandler, RegistrationConsumer, RegistrationHandler};
use chronicle_core::{ChronicleError, ChronicleResult};
use chronicle_rest::create_router;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

mod di;
mod startup;

use di::{build_app_module, DatabaseResolver};

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    startup::print_banner();
    info!("Starting Chronicle Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> ChronicleResult<()> {
    // Load configuration
    let config_loader = ConfigLoader::from_default_location()?;
    let config = config_loader.get().await;

    info!("Environment: {}", config.app.environment);
    info!("Cache enabled: {}", config.cache.enabled);
    info!(
        "Queue: {} (enabled: {})",
        config.queue.queue_name, config.queue.enabled
    );

    // Build DI module - centralized dependency injection.
    // A database that cannot be reached is fatal.
    let module = build_app_module(&config.database, &config.cache).await?;

    // Run migrations
    module.database_pool().run_migrations().await?;

    // Start the registration consumer. An unreachable broker must not take
    // the API down with it: the consumer keeps reconnecting in the background.
    let consumer = start_registration_consumer(&config).await;

    // Create REST router from the DI module
    let router = create_router(module.as_ref(), &config.server);

    // Start REST server
    let rest_addr = config.server.addr();
    startup::print_startup_info(config.server.port);
    info!("Starting REST server on http://{}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr)
        .await
        .map_err(|e| ChronicleError::Internal(format!("Failed to bind {}: {}", rest_addr, e)))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ChronicleError::Internal(format!("REST server error: {}", e)))?;

    // Drain the consumer after the HTTP server has stopped
    if let Some((consumer, task)) = consumer {
        consumer.stop();
        if let Err(e) = task.await {
            warn!("Registration consumer task ended abnormally: {}", e);
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

type ConsumerHandle = (
    Arc<RegistrationConsumer<RedisRegistrationQueue>>,
    JoinHandle<()>,
);

/// Spawns the registration event consumer when the queue is enabled.
///
/// Returns `None` when the consumer is disabled or its configuration is
/// invalid. Neither case stops the REST API from serving.
async fn start_registration_consumer(config: &AppConfig) -> Option<ConsumerHandle> {
    if !config.queue.enabled {
        info!("Registration consumer is disabled");
        return None;
    }

    let pool = match create_pool(&config.queue).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Registration consumer not started: {}", e);
            return None;
        }
    };

    let queue = Arc::new(RedisRegistrationQueue::new(pool, &config.queue));
    let handler: Arc<dyn RegistrationHandler> = Arc::new(LoggingRegistrationHandler);
    let consumer = Arc::new(RegistrationConsumer::new(
        queue,
        handler,
        config.queue.clone(),
    ));

    let task = {
        let consumer = Arc::clone(&consumer);
        tokio::spawn(async move {
            if let Err(e) = consumer.run().await {
                error!("Registration consumer stopped: {}", e);
            }
        })
    };

    Some((consumer, task))
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chronicle=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
