use crate::core::PlaylistCore;
use crate::error::{PlaylistError, Result};
use crate::model::{Playlist, Track, TrackId};
use crate::storage::{DocumentStore, SourceProbe};
use rand::Rng;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleOutcome {
    pub playlist: String,
    pub track_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShuffleToggle {
    Enabled(Option<ShuffleOutcome>),
    Disabled { restored: usize },
}

pub fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffles `tracks`, pinning the track whose path equals `anchor` (if any)
/// at the front without letting it take part in the permutation.
pub fn shuffle_tracks<R: Rng>(
    mut tracks: Vec<Track>,
    anchor: Option<&Path>,
    rng: &mut R,
) -> Vec<Track> {
    let pinned = anchor
        .and_then(|anchor| tracks.iter().position(|track| track.has_path(anchor)))
        .map(|idx| tracks.remove(idx));

    fisher_yates(&mut tracks, rng);

    if let Some(pinned) = pinned {
        tracks.insert(0, pinned);
    }
    tracks
}

fn restore_original_order(playlist: &mut Playlist) {
    if !playlist.original_track_order.is_empty() {
        playlist.tracks = std::mem::take(&mut playlist.original_track_order);
    }
    playlist.original_track_order.clear();
    playlist.shuffled = false;
}

impl<D: DocumentStore, P: SourceProbe> PlaylistCore<D, P> {
    pub fn shuffle_state(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn enable_shuffle(&mut self) -> Result<Option<ShuffleOutcome>> {
        let was_enabled = self.shuffle_enabled;
        self.shuffle_enabled = true;
        if let Err(err) = self.write_shuffle_state() {
            self.shuffle_enabled = was_enabled;
            return Err(err);
        }

        let Some(selected) = self.session.selected().map(str::to_string) else {
            log::debug!("shuffle enabled with no playlist selected");
            return Ok(None);
        };
        let anchor = self.current().map(|track| track.path.clone());

        match self.shuffle_playlist(&selected, anchor.as_deref()) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(PlaylistError::Empty(_) | PlaylistError::SingleTrack(_)) => {
                log::debug!("shuffle enabled, {selected} has too few tracks to shuffle");
                Ok(None)
            }
            Err(err) => {
                self.shuffle_enabled = was_enabled;
                if let Err(revert) = self.write_shuffle_state() {
                    log::warn!("could not revert shuffle state: {revert}");
                }
                Err(err)
            }
        }
    }

    pub fn disable_shuffle(&mut self) -> Result<usize> {
        let was_enabled = self.shuffle_enabled;
        self.shuffle_enabled = false;
        if let Err(err) = self.write_shuffle_state() {
            self.shuffle_enabled = was_enabled;
            return Err(err);
        }

        let shuffled: Vec<String> = self
            .catalog
            .iter()
            .filter(|(_, playlist)| playlist.shuffled)
            .map(|(name, _)| name.clone())
            .collect();

        let mut restored = 0;
        for name in shuffled {
            self.unshuffle_playlist(&name)?;
            restored += 1;
        }
        log::debug!("shuffle disabled, restored {restored} playlist(s)");
        Ok(restored)
    }

    pub fn toggle_shuffle(&mut self) -> Result<ShuffleToggle> {
        if self.shuffle_enabled {
            let restored = self.disable_shuffle()?;
            Ok(ShuffleToggle::Disabled { restored })
        } else {
            Ok(ShuffleToggle::Enabled(self.enable_shuffle()?))
        }
    }

    pub fn shuffle_playlist(
        &mut self,
        name: &str,
        anchor: Option<&Path>,
    ) -> Result<ShuffleOutcome> {
        let playlist = self.require(name)?;
        match playlist.len() {
            0 => return Err(PlaylistError::Empty(name.to_string())),
            1 => return Err(PlaylistError::SingleTrack(name.to_string())),
            _ => {}
        }

        let playing: Option<TrackId> = if self.session.is_selected(name) {
            self.current().map(|track| track.id.clone())
        } else {
            None
        };
        let snapshot = playlist.clone();

        let rng = &mut self.rng;
        let playlist = self
            .catalog
            .get_mut(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
        if playlist.shuffled {
            restore_original_order(playlist);
        }
        let original = playlist.tracks.clone();
        playlist.tracks = shuffle_tracks(std::mem::take(&mut playlist.tracks), anchor, rng);
        playlist.original_track_order = original;
        playlist.shuffled = true;
        playlist.touch();
        let track_count = playlist.len();

        if let Err(err) = self.write_playlist(name) {
            self.catalog.insert(name.to_string(), snapshot);
            return Err(err);
        }

        if let Some(id) = playing {
            let position = self
                .catalog
                .get(name)
                .and_then(|playlist| playlist.tracks.iter().position(|track| track.id == id));
            if position.is_some() {
                self.session.set_cursor(position);
            }
        }

        log::debug!("shuffled {track_count} tracks in {name}");
        Ok(ShuffleOutcome {
            playlist: name.to_string(),
            track_count,
        })
    }

    /// Restores the pre-shuffle order. The write is best-effort: a failure is
    /// logged and the restored order is kept in memory.
    pub fn unshuffle_playlist(&mut self, name: &str) -> Result<usize> {
        let playlist = self.require_mut(name)?;
        if !playlist.shuffled {
            return Err(PlaylistError::NotShuffled(name.to_string()));
        }

        restore_original_order(playlist);
        playlist.touch();
        let track_count = playlist.len();

        if self.session.is_selected(name) {
            self.session.set_cursor(None);
        }
        if let Err(err) = self.write_playlist(name) {
            log::warn!("restored order of {name} is not on disk yet: {err}");
        }
        Ok(track_count)
    }
}
