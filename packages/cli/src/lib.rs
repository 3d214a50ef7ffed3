// ABOUTME: DocuApp server and administration entry points
// ABOUTME: Environment configuration, HTTP server startup, and demo data seeding

pub mod config;
pub mod seed;
pub mod server;

pub use config::{Config, ConfigError};
pub use seed::{seed_sample_data, SeedReport};
pub use server::{build_app, run_server};

/// Install the global tracing subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();
}
