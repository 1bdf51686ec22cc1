use crate::config;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "ogg", "m4a", "aac", "opus"];

#[derive(Debug, Clone)]
pub struct SongLibrary {
    root: PathBuf,
}

impl SongLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn audio_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && is_audio(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files
    }

    /// Turns a song argument into a path: a 1-based index into
    /// `audio_files()`, an existing path, a path under the root, or the first
    /// file whose name contains the argument (case-insensitive).
    pub fn resolve(&self, song: &str) -> Option<PathBuf> {
        let song = song.trim();
        if song.is_empty() {
            return None;
        }

        let files = self.audio_files();
        if let Ok(index) = song.parse::<usize>() {
            if (1..=files.len()).contains(&index) {
                return Some(files[index - 1].clone());
            }
        }

        let direct = Path::new(song);
        if direct.exists() {
            return Some(config::absolute_path(direct));
        }

        let under_root = self.root.join(song);
        if under_root.exists() {
            return Some(under_root);
        }

        let needle = song.to_lowercase();
        files.into_iter().find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}

fn is_audio(path: &Path) -> bool {
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or_default();
    AUDIO_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
}
