mod config;
mod generator;
mod protocol;
mod server;

use anyhow::Result;
use banglish_core::Pipeline;
use config::DaemonConfig;
use server::CorrectionServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DaemonConfig::load()?;
    info!(
        socket = %config.server.socket_path.display(),
        request_timeout_ms = config.server.request_timeout_ms,
        backend = ?config.model.backend,
        dictionary = %config.correction.dictionary_path.display(),
        fuzzy_threshold = config.correction.fuzzy_threshold,
        suggest_threshold = config.correction.suggest_threshold,
        verify_timeout_ms = config.correction.verify_timeout_ms,
        generative_fallback = config.correction.generative_fallback,
        "loaded banglish config"
    );

    let generator = generator::build_generator(&config.model);
    let pipeline = Pipeline::new(config.correction.clone(), generator);
    info!(
        entries = pipeline.dictionary().len(),
        vocabulary = pipeline.dictionary().vocabulary().len(),
        "correction dictionary ready"
    );
    let server = CorrectionServer::new(config.server.clone(), pipeline);
    server.run().await
}
