use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::spotify::auth::AuthShared;

pub async fn health(Extension(auth): Extension<Arc<AuthShared>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "authenticated": auth.is_resolved().await,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
