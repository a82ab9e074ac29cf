mod api;
mod dao;
mod model;
mod service;

use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::api::configure_routes;
use crate::api::middleware::timing_middleware;
use crate::api::state::AppState;
use crate::model::apperror::{ApplicationError, ErrorType};
use crate::model::config::{ApplicationArguments, Config, DatabaseType, LoggingConfig};

use actix_web::{App, HttpServer, middleware::from_fn, web};
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use clap::Parser;
use prometheus::IntGauge;
use sqlx::{Pool, Postgres, pool};
use tracing_subscriber::{EnvFilter, filter::{Directive, LevelFilter}, layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = ApplicationArguments::parse();

    let config = get_config(&args.config_file).map_err(std::io::Error::other)?;

    init_tracing(&config.logging)?;

    let connection_pool = get_connection_pool(&config.database.db_type).await.map_err(std::io::Error::other)?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&connection_pool)
            .await
            .map_err(|err| std::io::Error::other(format!("Failed to run database migrations: {err}")))?;
        tracing::info!("Database migrations applied");
    }

    let state = web::Data::new(AppState::with_connection_pool(Some(connection_pool.clone())));

    let prometheus = PrometheusMetricsBuilder::new("")
        .endpoint("/metrics")
        .mask_unmatched_patterns("UNKNOWN")
        .build()
        .map_err(|err| std::io::Error::other(format!("Failed to create Prometheus metrics: {err}")))?;

    let max_connections_gauge = IntGauge::new("max_connections", "Connection pool maximum").map_err(|err| std::io::Error::other(format!("Failed to create max_connections gauge: {err}")))?;
    let min_connections_gauge = IntGauge::new("min_connections", "Connection pool minimum").map_err(|err| std::io::Error::other(format!("Failed to create min_connections gauge: {err}")))?;
    let active_connections_gauge = IntGauge::new("active_connections", "Connection pool active").map_err(|err| std::io::Error::other(format!("Failed to create active_connections gauge: {err}")))?;
    let idle_connections_gauge = IntGauge::new("idle_connections", "Connection pool idle").map_err(|err| std::io::Error::other(format!("Failed to create idle_connections gauge: {err}")))?;
    register_prometheus_metrics(&prometheus, &max_connections_gauge)?;
    register_prometheus_metrics(&prometheus, &min_connections_gauge)?;
    register_prometheus_metrics(&prometheus, &active_connections_gauge)?;
    register_prometheus_metrics(&prometheus, &idle_connections_gauge)?;

    gather_db_metrics(max_connections_gauge, min_connections_gauge, active_connections_gauge, idle_connections_gauge, connection_pool);

    tracing::info!("Starting server on {}:{}", config.server.host, config.server.http_port);

    HttpServer::new(move || {
        App::new()
            .wrap(prometheus.clone())
            .wrap(from_fn(timing_middleware))
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind((config.server.host.as_str(), config.server.http_port))?
    .workers(config.server.workers)
    .run()
    .await
}

/**
 * Initializes logging to stdout and, when configured, to a log file.
 *
 * #Arguments
 * `logging`: The logging configuration.
 *
 * #Returns
 * A `Result` indicating success or failure.
 */
fn init_tracing(logging: &LoggingConfig) -> Result<(), std::io::Error> {
    let mut env_filter = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
    for directive in &logging.directives {
        env_filter = env_filter.add_directive(directive.parse::<Directive>().map_err(|err| std::io::Error::other(format!("Invalid logging directive {directive}: {err}")))?);
    }

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(logging.target)
        .with_thread_ids(logging.thread_ids)
        .with_thread_names(logging.thread_names)
        .with_line_number(logging.line_number)
        .with_level(logging.level)
        .with_ansi(logging.ansi)
        .with_file(logging.file);

    let file_layer = match &logging.logfile {
        Some(logfile) => {
            let file = OpenOptions::new().create(true).append(true).open(logfile).map_err(|err| std::io::Error::other(format!("Failed to open log file {logfile}: {err}")))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_target(logging.target)
                    .with_thread_ids(logging.thread_ids)
                    .with_thread_names(logging.thread_names)
                    .with_line_number(logging.line_number)
                    .with_level(logging.level)
                    .with_ansi(false)
                    .with_file(logging.file),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| std::io::Error::other(format!("Failed to initialize logging: {err}")))
}

/**
 * Creates the database connection pool.
 *
 * #Arguments
 * `db_type`: The database configuration.
 *
 * #Returns
 * A `Result` containing the connection pool or an `Initialization` error if the database can't be reached.
 */
async fn get_connection_pool(db_type: &DatabaseType) -> Result<Pool<Postgres>, ApplicationError> {
    match db_type {
        DatabaseType::Postgresql { connection_string, max_connections, min_connections, acquire_timeout, acquire_slow_threshold, idle_timeout, max_lifetime } => pool::PoolOptions::new()
            .max_connections(*max_connections)
            .min_connections(*min_connections)
            .acquire_timeout(Duration::from_millis(*acquire_timeout))
            .acquire_slow_threshold(Duration::from_millis(*acquire_slow_threshold))
            .idle_timeout(Duration::from_millis(*idle_timeout))
            .max_lifetime(Duration::from_millis(*max_lifetime))
            .connect(connection_string.as_str())
            .await
            .map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to create database pool: {err}"))),
    }
}

/**
 * Registers custom Prometheus metrics.
 *
 * #Arguments
 * `prometheus_metrics`: The Prometheus metrics instance to register the gauge with.
 * `gauge`: The gauge to register.
 */
fn register_prometheus_metrics(prometheus_metrics: &PrometheusMetrics, gauge: &IntGauge) -> Result<(), std::io::Error> {
    prometheus_metrics.registry.register(Box::new(gauge.clone())).map_err(|err| std::io::Error::other(format!("Failed to register Prometheus gauge: {err}")))?;
    Ok(())
}

/**
 * Refreshes the connection pool gauges every second.
 */
fn gather_db_metrics(max_connections_gauge: IntGauge, min_connections_gauge: IntGauge, active_connections_gauge: IntGauge, idle_connections_gauge: IntGauge, connection_pool: Pool<Postgres>) {
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            max_connections_gauge.set(i64::from(connection_pool.options().get_max_connections()));
            min_connections_gauge.set(i64::from(connection_pool.options().get_min_connections()));
            active_connections_gauge.set(i64::from(connection_pool.size()));
            #[allow(clippy::cast_possible_wrap)]
            idle_connections_gauge.set(connection_pool.num_idle() as i64);
        }
    });
}

/**
 * Reads the configuration from the specified file.
 *
 * #Arguments
 * `config_file`: The path to the configuration file.
 *
 * #Returns
 * A `Result` containing the parsed `Config` or an `Initialization` error if reading or parsing fails.
*/
fn get_config(config_file: &str) -> Result<Config, ApplicationError> {
    let config_str: String = std::fs::read_to_string(config_file).map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to read config file: {err}")))?;
    let config: Config = toml::from_str(&config_str).map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to parse config file: {err}")))?;
    Ok(config)
}
