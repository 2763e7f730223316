use dotenvy::dotenv;
use prompt_gateway::{api, config::Config, model::ollama::OllamaBackend};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};


#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
dotenv().ok();
let cfg = <Config as clap::Parser>::parse();


// logs
let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
fmt().with_env_filter(filter).init();


// ollama backend, shared read-only by every handler
let backend = OllamaBackend::new(&cfg.ollama_base_url, cfg.generate_params(), cfg.request_timeout())?;
let params = backend.params();
tracing::info!(
    url = %backend.generate_url(),
    model = %params.model,
    temperature = params.temperature,
    max_retries = params.max_retries,
    "backend configured"
);


let app = api::routes(backend);
let addr: SocketAddr = cfg.bind_addr.parse()?;


tracing::info!(%addr, "listening");
axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
Ok(())
}


async fn shutdown_signal() {
let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
};

#[cfg(unix)]
let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sig) => { sig.recv().await; }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable");
            std::future::pending::<()>().await;
        }
    }
};

#[cfg(not(unix))]
let terminate = std::future::pending::<()>();

tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
}
tracing::info!("shutting down");
}
