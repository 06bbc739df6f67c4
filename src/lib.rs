pub mod article;
pub mod cleaner;
pub mod config;
pub mod fetcher;
pub mod jobs;
pub mod llm;
pub mod output;
pub mod runs;
pub mod sitemap;

/// Initialise the `tracing` subscriber shared by both binaries.
///
/// `RUST_LOG` wins when set; otherwise everything logs at `info`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
