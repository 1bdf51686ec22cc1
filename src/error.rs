use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("{0}")]
    Validation(String),

    #[error("Playlist \"{0}\" not found")]
    NotFound(String),

    #[error("Playlist \"{0}\" already exists")]
    Duplicate(String),

    #[error("Song already in playlist \"{playlist}\": {}", .path.display())]
    DuplicateTrack { playlist: String, path: PathBuf },

    #[error("Song file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Invalid track index: {index} (playlist has {len} tracks)")]
    Index { index: usize, len: usize },

    #[error("Playlist \"{0}\" is empty")]
    Empty(String),

    #[error("Playlist \"{0}\" has only one track")]
    SingleTrack(String),

    #[error("Playlist \"{0}\" is not shuffled")]
    NotShuffled(String),

    #[error("No playlist selected. Use \"playlist <name>\" to select a playlist first")]
    NoSelection,

    #[error("Failed to save \"{key}\": {reason}")]
    Persistence { key: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlaylistError {
    pub(crate) fn persistence(key: &str, err: &anyhow::Error) -> Self {
        Self::Persistence {
            key: key.to_string(),
            reason: format!("{err:#}"),
        }
    }

    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
