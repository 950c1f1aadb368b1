use axum::{Router, routing::get};
use tutor_api::{
    config::ApiConfig,
    jobs::start_background_jobs,
    metrics::{init_metrics, metrics_handler},
    router,
    state::ApiState,
    tracing::init_tracing,
    vocabulary::load_vocabulary,
};
use tutor_wordbank::VocabularyPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    init_tracing(&config.env);
    let metrics_handle = init_metrics()?;

    let vocabulary = match &config.vocabulary_path {
        Some(path) => load_vocabulary(path)?,
        None => {
            tracing::warn!("VOCABULARY_PATH is not set, starting with an empty vocabulary");
            VocabularyPool::default()
        }
    };

    let state = ApiState::new(&config, vocabulary);
    let jobs = start_background_jobs(state.exercises.clone(), config.exercise_idle_minutes);

    let app = router::app(state, &config.allowed_origins).merge(
        Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(metrics_handle),
    );

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for job in jobs {
        job.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
