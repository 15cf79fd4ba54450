use std::path::PathBuf;

use crate::{
    Res,
    analyzer::{AnalyzeOptions, PlaylistStats},
    config::{self, AuthConfig},
    info,
    management::TokenCache,
    report,
    spotify::AuthFlow,
    success,
};

/// Everything the `analyze` workflow takes from the command line.
#[derive(Debug, Clone)]
pub struct AnalyzeSettings {
    pub port: u16,
    pub token_file: PathBuf,
    pub min_count: u64,
    pub options: AnalyzeOptions,
    pub open_browser: bool,
}

impl Default for AnalyzeSettings {
    fn default() -> Self {
        Self {
            port: config::DEFAULT_PORT,
            token_file: PathBuf::from(config::DEFAULT_TOKEN_FILE),
            min_count: report::DEFAULT_MIN_COUNT,
            options: AnalyzeOptions::default(),
            open_browser: true,
        }
    }
}

/// Authenticates, analyzes the playlists of the current user and prints the
/// ranked artists.
pub async fn analyze(settings: AnalyzeSettings) -> Res<()> {
    let auth_config = AuthConfig::from_env(settings.port);
    let cache = TokenCache::new(&settings.token_file);

    let mut flow = AuthFlow::new(auth_config, cache)?.open_browser(settings.open_browser);
    if let Some(addr) = flow.start(settings.port).await {
        info!("Listening on {}", addr);
    }

    // Wait for the authentication to finish, from cache or callback.
    let client = flow.await_client().await?;

    let user = client.current_user().await?;
    success!(
        "Authenticated as {}",
        user.display_name.as_deref().unwrap_or(&user.id)
    );

    let mut stats = PlaylistStats::new(&client)
        .with_options(settings.options)
        .with_progress(true);
    stats.analyze_user(&user.id).await?;

    report::print_stats(stats.artist_counts(), settings.min_count);
    Ok(())
}
