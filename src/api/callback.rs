use std::sync::Arc;

use axum::{Extension, extract::Query, http::StatusCode};

use crate::{
    spotify::auth::{AuthShared, callback_status},
    success,
    types::CallbackParams,
    warning,
};

/// Completes the authorization and hands the outcome to the waiting flow.
///
/// Failures are delivered too: a forged or broken callback ends the run.
pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(auth): Extension<Arc<AuthShared>>,
) -> (StatusCode, &'static str) {
    if auth.is_resolved().await {
        return (StatusCode::OK, "Already authenticated.");
    }

    match auth.complete_callback(params).await {
        Ok(token) => {
            auth.deliver(Ok(token)).await;
            success!("Login complete, cached token to file.");
            (StatusCode::OK, "Login complete, cached token to file.")
        }
        Err(e) => {
            warning!("Couldn't get token in auth callback: {}", e);
            let status = callback_status(&e);
            auth.deliver(Err(e)).await;
            (status, "Couldn't get token in auth callback")
        }
    }
}
