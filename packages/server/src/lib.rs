#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for gradesheet result lookup.
//!
//! Serves `POST /get_result` and `GET /get_semesters`. Each request runs
//! the full pipeline from scratch — download the semester's PDF, extract
//! and normalize its tables, look up the roll number — and holds no
//! cross-request state beyond the immutable [`SemesterRegistry`] and the
//! shared download client, so concurrent requests need no coordination.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use gradesheet_extract::DuplicatePolicy;
use gradesheet_fetch::DocumentFetcher;
use gradesheet_registry::SemesterRegistry;

/// Environment variable selecting the duplicate roll number policy
/// (`first_match` or `error`).
pub const ON_DUPLICATE_ENV_VAR: &str = "GRADESHEET_ON_DUPLICATE";

/// Shared application state. Immutable after startup.
pub struct AppState {
    /// Semester label → gradesheet source configuration.
    pub registry: SemesterRegistry,
    /// HTTP client for gradesheet downloads.
    pub fetcher: DocumentFetcher,
    /// What to do when a roll number matches more than one row.
    pub duplicate_policy: DuplicatePolicy,
}

/// Starts the gradesheet API server.
///
/// Loads the semester registry, builds the download client, and starts
/// the Actix-Web HTTP server. This is a regular async function — the
/// caller provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the semester registry or the download client cannot be
/// initialized, or if [`ON_DUPLICATE_ENV_VAR`] holds an unknown value.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let registry = SemesterRegistry::load().expect("Failed to load semester source registry");
    log::info!("Loaded {} semester source(s)", registry.len());

    let fetcher = DocumentFetcher::new().expect("Failed to build download client");

    let duplicate_policy = std::env::var(ON_DUPLICATE_ENV_VAR).map_or_else(
        |_| DuplicatePolicy::default(),
        |v| {
            v.parse()
                .unwrap_or_else(|e| panic!("Invalid {ON_DUPLICATE_ENV_VAR}: {e}"))
        },
    );

    let state = web::Data::new(AppState {
        registry,
        fetcher,
        duplicate_policy,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .route("/get_result", web::post().to(handlers::get_result))
            .route("/get_semesters", web::get().to(handlers::get_semesters))
            .route("/health", web::get().to(handlers::health))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
