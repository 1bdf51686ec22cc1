use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use uuid::Uuid;

pub const UNKNOWN_TAG: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    pub title: String,
    #[serde(default = "unknown_tag")]
    pub artist: String,
    #[serde(default = "unknown_tag")]
    pub album: String,
    #[serde(default)]
    pub duration: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub added: OffsetDateTime,
}

impl Track {
    pub fn from_source(path: &Path) -> Self {
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            id: TrackId::generate(),
            path: path.to_path_buf(),
            title,
            artist: unknown_tag(),
            album: unknown_tag(),
            duration: 0,
            added: OffsetDateTime::now_utc(),
        }
    }

    pub fn has_path(&self, path: &Path) -> bool {
        self.path.as_os_str() == path.as_os_str()
    }
}

fn unknown_tag() -> String {
    String::from(UNKNOWN_TAG)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified: OffsetDateTime,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub shuffled: bool,
    /// Pre-shuffle order. Only populated while `shuffled` is set.
    #[serde(default)]
    pub original_track_order: Vec<Track>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            name: name.into(),
            description: String::new(),
            created: now,
            modified: now,
            tracks: Vec::new(),
            shuffled: false,
            original_track_order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.tracks.iter().any(|track| track.has_path(path))
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.tracks.iter().position(|track| track.has_path(path))
    }

    pub fn touch(&mut self) {
        self.modified = OffsetDateTime::now_utc();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub name: String,
    pub track_count: usize,
    pub created: OffsetDateTime,
    pub modified: OffsetDateTime,
    pub is_selected: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ShuffleState {
    #[serde(default)]
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_defaults_follow_file_name() {
        let track = Track::from_source(Path::new("/music/road/B.mp3"));
        assert_eq!(track.title, "B.mp3");
        assert_eq!(track.artist, UNKNOWN_TAG);
        assert_eq!(track.album, UNKNOWN_TAG);
        assert_eq!(track.duration, 0);
    }

    #[test]
    fn track_path_match_is_case_sensitive() {
        let track = Track::from_source(Path::new("songs/A.mp3"));
        assert!(track.has_path(Path::new("songs/A.mp3")));
        assert!(!track.has_path(Path::new("songs/a.mp3")));
        assert!(!track.has_path(Path::new("songs//A.mp3")));
    }

    #[test]
    fn generated_ids_do_not_collide() {
        let ids: std::collections::HashSet<TrackId> =
            (0..1_000).map(|_| TrackId::generate()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn legacy_document_without_shuffle_fields_loads() {
        let raw = r#"{
            "name": "road-trip",
            "description": "",
            "created": "2024-05-01T10:00:00.000Z",
            "modified": "2024-05-01T10:05:00.000Z",
            "tracks": [
                {
                    "id": "track-1714557900000-k2j4h5g6f",
                    "path": "/songs/A.mp3",
                    "title": "A.mp3",
                    "artist": "Unknown",
                    "album": "Unknown",
                    "duration": 0,
                    "added": "2024-05-01T10:05:00.000Z"
                }
            ]
        }"#;

        let playlist: Playlist = serde_json::from_str(raw).expect("parse");
        assert_eq!(playlist.name, "road-trip");
        assert_eq!(playlist.len(), 1);
        assert!(!playlist.shuffled);
        assert!(playlist.original_track_order.is_empty());
        assert_eq!(
            playlist.tracks[0].id.as_str(),
            "track-1714557900000-k2j4h5g6f"
        );
    }

    #[test]
    fn documents_use_camel_case_fields() {
        let mut playlist = Playlist::new("mix");
        playlist.shuffled = true;
        let json = serde_json::to_string(&playlist).expect("serialize");
        assert!(json.contains("\"originalTrackOrder\""));
        assert!(json.contains("\"shuffled\":true"));
    }
}
