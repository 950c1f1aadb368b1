pub mod config;
pub mod error;
pub mod exercise;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod state;
pub mod tracing;
pub mod vocabulary;

pub use config::ApiConfig;
pub use state::ApiState;
