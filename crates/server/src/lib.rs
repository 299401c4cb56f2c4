//! MathFluent Server Library
//!
//! Serves the step-by-step solver and the chat rooms / direct threads over
//! JSON, backed by a JSON-file document store and a genai tutor.

pub mod ai;
pub mod config;
pub mod error;
pub mod handlers;
pub mod store;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ai::GenAiTutor;
use config::{AppState, ServerConfig};
use handlers::{rooms, solver, teachers, threads};
use store::JsonChatStore;

/// Install the global subscriber. Honors `RUST_LOG`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mathfluent_server=debug,mathfluent_core=debug,info".into());

    // Already set (tests, embedding): ignore
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Solver
        .route("/solve", post(solver::solve))
        .route("/explain", post(solver::explain))
        // Rooms
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/rooms/{room_id}/messages",
            get(rooms::get_messages).post(rooms::post_message),
        )
        .route("/rooms/{room_id}/subscribe", get(rooms::subscribe))
        // Direct threads
        .route("/threads", post(threads::open_thread))
        .route(
            "/threads/{thread_id}/messages",
            get(threads::get_messages).post(threads::post_message),
        )
        .route("/threads/{thread_id}/subscribe", get(threads::subscribe))
        // Teacher directory
        .route("/teachers", get(teachers::list_teachers))
        .route("/teachers/subjects", get(teachers::list_subjects))
        .route("/teachers/{teacher_id}", get(teachers::get_teacher))
        // Health check
        .route("/health", get(health_check))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("=== MathFluent Server ===");

    let config = ServerConfig::default();
    config.ensure_dirs().await?;
    info!("Data directory: {:?}", config.data_dir);

    let store = Arc::new(JsonChatStore::new(config.clone()).await?);
    let tutor = Arc::new(GenAiTutor::new(&config));

    let app_state = AppState {
        store,
        tutor,
        heartbeat_secs: config.heartbeat_secs,
    };

    let app = router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("MathFluent server listening on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK - MathFluent Server"
}
