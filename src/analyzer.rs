//! Counts artist occurrences across the playlists of a user.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Res, info,
    spotify::{PageRequest, PlaylistSource},
    types::{ArtistCounts, PlaylistItem, SimplePlaylist},
};

/// Toggles for the two pagination quirks of the analysis.
///
/// Both default to `false`, which keeps the historic behavior: the first page
/// of playlists is taken unfiltered and only the first page of tracks of every
/// playlist is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Apply the owner/collaborative filter to the first playlist page too.
    pub filter_first_page: bool,
    /// Follow track pagination past the first page.
    pub all_track_pages: bool,
}

/// Whether a playlist counts for `user_id`: owned by them or collaborative.
pub fn is_relevant(playlist: &SimplePlaylist, user_id: &str) -> bool {
    playlist.owner.id == user_id || playlist.collaborative
}

pub struct PlaylistStats<'a, S> {
    source: &'a S,
    options: AnalyzeOptions,
    artist_count: ArtistCounts,
    show_progress: bool,
}

impl<'a, S: PlaylistSource> PlaylistStats<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            options: AnalyzeOptions::default(),
            artist_count: ArtistCounts::new(),
            show_progress: false,
        }
    }

    pub fn with_options(mut self, options: AnalyzeOptions) -> Self {
        self.options = options;
        self
    }

    /// Draw a progress bar on stderr while playlists are analyzed.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn artist_counts(&self) -> &ArtistCounts {
        &self.artist_count
    }

    pub fn into_counts(self) -> ArtistCounts {
        self.artist_count
    }

    /// Pages through the playlists of `user_id` and returns the ones to analyze,
    /// in the order the API lists them.
    pub async fn collect_playlists(&self, user_id: &str) -> Res<Vec<SimplePlaylist>> {
        let first = self.source.user_playlists(user_id, PageRequest::first()).await?;
        let limit = first.limit;
        let mut total = first.total;

        let mut playlists: Vec<SimplePlaylist> = if self.options.filter_first_page {
            first
                .items
                .into_iter()
                .filter(|p| is_relevant(p, user_id))
                .collect()
        } else {
            first.items
        };

        let mut offset = limit;
        while offset < total {
            let page = self
                .source
                .user_playlists(user_id, PageRequest::at(offset, limit))
                .await?;
            if page.limit == 0 {
                break;
            }

            // the collection can change while it is paged through
            total = page.total;
            offset = match offset.checked_add(page.limit) {
                Some(next) => next,
                None => break,
            };
            playlists.extend(page.items.into_iter().filter(|p| is_relevant(p, user_id)));
        }

        Ok(playlists)
    }

    /// Counts the artists of every relevant playlist of `user_id`.
    ///
    /// The first failing request aborts the analysis.
    pub async fn analyze_user(&mut self, user_id: &str) -> Res<()> {
        let playlists = self.collect_playlists(user_id).await?;
        info!("Analyzing {} playlists...", playlists.len());

        let pb = self.progress_bar(playlists.len() as u64);
        let mut analyzed = 0usize;
        for playlist in &playlists {
            if let Err(e) = self.update_from_playlist(&playlist.id).await {
                pb.abandon();
                return Err(e);
            }
            analyzed += 1;

            let pct = analyzed as f64 / playlists.len() as f64 * 100.0;
            pb.set_message(format!("{:.1}% of playlists analyzed", pct));
            pb.inc(1);
        }
        pb.finish();

        Ok(())
    }

    /// Adds the artists of one playlist's tracks to the count table.
    pub async fn update_from_playlist(&mut self, playlist_id: &str) -> Res<()> {
        let page = self
            .source
            .playlist_tracks(playlist_id, PageRequest::first())
            .await?;
        let limit = page.limit;
        let mut total = page.total;
        self.count_items(&page.items);

        if !self.options.all_track_pages {
            return Ok(());
        }

        let mut offset = limit;
        while offset < total {
            let page = self
                .source
                .playlist_tracks(playlist_id, PageRequest::at(offset, limit))
                .await?;
            if page.limit == 0 {
                break;
            }

            total = page.total;
            offset = match offset.checked_add(page.limit) {
                Some(next) => next,
                None => break,
            };
            self.count_items(&page.items);
        }

        Ok(())
    }

    fn count_items(&mut self, items: &[PlaylistItem]) {
        for track in items.iter().filter_map(|item| item.track.as_ref()) {
            for artist in &track.artists {
                *self.artist_count.entry(artist.name.clone()).or_insert(0) += 1;
            }
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {bar:30.blue/white} {msg}")
        {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message("0.0% of playlists analyzed");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
