//! Servidor web Axum para extração e relatório de entidades nomeadas

mod app;
mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::AppState;
use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.to_config();
    info!(
        model_dir = %config.model_dir.display(),
        default_model = %config.default_model,
        export_dir = %config.export_dir.display(),
        "configuração carregada"
    );

    let state = Arc::new(AppState::new(&config));

    // carrega o modelo padrão antes da primeira requisição
    let warm = Arc::clone(&state);
    let default_model = config.default_model.clone();
    match tokio::task::spawn_blocking(move || warm.handle(&default_model)).await {
        Ok(Ok(handle)) => info!(model = handle.name(), "modelo padrão pronto"),
        Ok(Err(e)) => warn!(error = %e, "modelo padrão indisponível; será carregado sob demanda"),
        Err(e) => warn!(error = %e, "falha ao pré-carregar o modelo padrão"),
    }

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("não foi possível escutar em {addr}"))?;
    info!("🚀 Servidor NER iniciado em http://{addr}");
    axum::serve(listener, app::router(state)).await?;
    Ok(())
}
