use crate::core::PlaylistCore;
use crate::error::Result;
use crate::model::{Playlist, Track};
use crate::storage::{DocumentStore, SourceProbe};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    selected: Option<String>,
    cursor: Option<usize>,
}

impl Session {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.as_deref() == Some(name)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn cursor_index(&self) -> i64 {
        self.cursor.map_or(-1, |cursor| cursor as i64)
    }

    pub(crate) fn select(&mut self, name: &str) {
        self.selected = Some(name.to_string());
    }

    pub(crate) fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    pub(crate) fn clear(&mut self) {
        self.selected = None;
        self.cursor = None;
    }
}

fn step_forward(cursor: Option<usize>, len: usize) -> usize {
    match cursor {
        Some(current) if current + 1 < len => current + 1,
        _ => 0,
    }
}

fn step_back(cursor: Option<usize>, len: usize) -> usize {
    match cursor {
        Some(current) if current > 0 => (current - 1).min(len - 1),
        _ => len - 1,
    }
}

impl<D: DocumentStore, P: SourceProbe> PlaylistCore<D, P> {
    pub fn select(&mut self, name: &str) -> Result<&Playlist> {
        self.require(name)?;
        self.session.select(name);
        log::debug!("selected playlist {name}");
        self.require(name)
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.session.selected()
    }

    pub fn selected_playlist(&self) -> Option<&Playlist> {
        self.session
            .selected()
            .and_then(|name| self.catalog.get(name))
    }

    pub fn start_playback(&mut self, name: &str) -> Option<&Track> {
        let has_tracks = self.catalog.get(name).is_some_and(|p| !p.is_empty());
        if !has_tracks {
            return None;
        }
        self.session.set_cursor(Some(0));
        self.catalog.get(name).and_then(|p| p.tracks.first())
    }

    pub fn next(&mut self) -> Option<&Track> {
        let len = self.selected_playlist().map(Playlist::len)?;
        if len == 0 {
            return None;
        }
        let cursor = step_forward(self.session.cursor(), len);
        self.session.set_cursor(Some(cursor));
        self.selected_playlist()?.tracks.get(cursor)
    }

    pub fn previous(&mut self) -> Option<&Track> {
        let len = self.selected_playlist().map(Playlist::len)?;
        if len == 0 {
            return None;
        }
        let cursor = step_back(self.session.cursor(), len);
        self.session.set_cursor(Some(cursor));
        self.selected_playlist()?.tracks.get(cursor)
    }

    /// Re-checks bounds on every call: tracks may have been removed since the
    /// cursor was last moved.
    pub fn current(&self) -> Option<&Track> {
        let cursor = self.session.cursor()?;
        self.selected_playlist()?.tracks.get(cursor)
    }

    pub fn reset_cursor(&mut self) {
        self.session.set_cursor(None);
    }

    pub fn remaining_count(&self) -> usize {
        let (Some(playlist), Some(cursor)) = (self.selected_playlist(), self.session.cursor())
        else {
            return 0;
        };
        playlist.len().saturating_sub(cursor + 1)
    }
}
