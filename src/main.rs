mod board;
mod config;
mod context;
mod controllers;
mod errors;
mod gateway;
mod middlewares;
mod models;
mod policy;
mod routes;
mod session;

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

use dotenvy;

use crate::config::ShellConfig;
use crate::context::AppContext;
use crate::gateway::http::HttpGateway;
use crate::session::storage::FileStorage;
use crate::session::store::SessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let config = ShellConfig::from_env()?;

    FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish()
        .try_init()?;

    let storage = FileStorage::open(&config.session_file)?;
    tracing::info!("session file: {}", storage.path().display());
    let gateway = HttpGateway::new(&config)?;
    let ctx = AppContext::new(Arc::new(gateway), SessionStore::new(Box::new(storage)));

    // views wait in the loading state until the restored session resolves
    let authenticator = ctx.authenticator();
    let pending = authenticator.begin_boot().await;
    tokio::spawn(async move {
        let outcome = authenticator.finish_boot(pending).await;
        tracing::info!(?outcome, "startup session resolved");
    });

    let app = routes::routing(ctx);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        "portal launched on http://{} against {}",
        listener.local_addr()?,
        config.api_base_url
    );
    axum::serve(listener, app).await?;
    Ok(())
}
