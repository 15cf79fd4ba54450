use std::sync::Arc;

use axum::Extension;

use crate::spotify::auth::AuthShared;

pub async fn prompt(Extension(auth): Extension<Arc<AuthShared>>) -> String {
    match auth.authorize_url() {
        Ok(url) => format!("To authenticate visit: {}", url),
        Err(e) => format!("Cannot authenticate: {}", e),
    }
}
