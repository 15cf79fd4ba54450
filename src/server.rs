use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{Res, api, spotify::auth::AuthShared};

pub fn router(auth: Arc<AuthShared>) -> Router {
    Router::new()
        .route("/", get(api::prompt))
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(auth))
}

/// Binds the callback listener on localhost. Port 0 picks a free port.
pub async fn bind(port: u16) -> Res<TcpListener> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    Ok(TcpListener::bind(addr).await?)
}

pub async fn start_api_server(listener: TcpListener, auth: Arc<AuthShared>) -> Res<()> {
    axum::serve(listener, router(auth)).await?;
    Ok(())
}
