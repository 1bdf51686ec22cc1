use crate::config::Settings;
use crate::error::{PlaylistError, Result};
use crate::model::{Playlist, ShuffleState};
use crate::session::Session;
use crate::storage::{DirectoryStore, DocumentStore, FsProbe, SHUFFLE_STATE_KEY, SourceProbe};
use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::BTreeMap;

pub type DiskPlaylistCore = PlaylistCore<DirectoryStore, FsProbe>;

#[derive(Debug)]
pub struct PlaylistCore<D, P> {
    pub(crate) catalog: BTreeMap<String, Playlist>,
    pub(crate) session: Session,
    pub(crate) shuffle_enabled: bool,
    pub(crate) documents: D,
    pub(crate) probe: P,
    pub(crate) rng: SmallRng,
}

impl DiskPlaylistCore {
    pub fn open_with_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::open(DirectoryStore::new(settings.playlists_dir()), FsProbe)
    }
}

impl<D: DocumentStore, P: SourceProbe> PlaylistCore<D, P> {
    pub fn open(documents: D, probe: P) -> anyhow::Result<Self> {
        Self::open_with_rng(documents, probe, SmallRng::from_os_rng())
    }

    pub fn open_with_rng(documents: D, probe: P, rng: SmallRng) -> anyhow::Result<Self> {
        let mut core = Self {
            catalog: BTreeMap::new(),
            session: Session::default(),
            shuffle_enabled: false,
            documents,
            probe,
            rng,
        };
        core.load_catalog()?;
        core.load_shuffle_state()?;
        Ok(core)
    }

    fn load_catalog(&mut self) -> anyhow::Result<()> {
        let keys = self
            .documents
            .keys()
            .context("failed to list playlist documents")?;

        for key in keys {
            if key == SHUFFLE_STATE_KEY {
                continue;
            }

            let raw = match self.documents.load(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    log::warn!("skipping playlist {key}: {err:#}");
                    continue;
                }
            };

            let mut playlist: Playlist = match serde_json::from_str(&raw) {
                Ok(playlist) => playlist,
                Err(err) => {
                    log::warn!("skipping playlist {key}: unreadable document: {err}");
                    continue;
                }
            };

            if playlist.name != key {
                log::warn!(
                    "playlist document {key} names itself {:?}, using the document key",
                    playlist.name
                );
                playlist.name = key.clone();
            }
            if !playlist.shuffled {
                playlist.original_track_order.clear();
            }
            self.catalog.insert(key, playlist);
        }

        log::debug!("loaded {} playlist(s)", self.catalog.len());
        Ok(())
    }

    fn load_shuffle_state(&mut self) -> anyhow::Result<()> {
        let raw = self
            .documents
            .load(SHUFFLE_STATE_KEY)
            .context("failed to read shuffle state")?;

        match raw {
            Some(raw) => match serde_json::from_str::<ShuffleState>(&raw) {
                Ok(state) => self.shuffle_enabled = state.enabled,
                Err(err) => log::warn!("unreadable shuffle state, defaulting to off: {err}"),
            },
            None => {
                self.shuffle_enabled = false;
                if let Err(err) = self.write_shuffle_state() {
                    log::warn!("could not write default shuffle state: {err}");
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Playlist> {
        self.catalog.get(name)
    }

    pub fn playlist_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut D {
        &mut self.documents
    }

    pub(crate) fn require(&self, name: &str) -> Result<&Playlist> {
        self.catalog
            .get(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))
    }

    pub(crate) fn require_mut(&mut self, name: &str) -> Result<&mut Playlist> {
        self.catalog
            .get_mut(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))
    }

    pub(crate) fn write_playlist(&mut self, name: &str) -> Result<()> {
        let playlist = self.require(name)?;
        let raw = serde_json::to_string_pretty(playlist)
            .map_err(|err| PlaylistError::persistence(name, &err.into()))?;
        self.documents
            .save(name, &raw)
            .map_err(|err| PlaylistError::persistence(name, &err))
    }

    pub(crate) fn write_shuffle_state(&mut self) -> Result<()> {
        let state = ShuffleState {
            enabled: self.shuffle_enabled,
        };
        let raw = serde_json::to_string_pretty(&state)
            .map_err(|err| PlaylistError::persistence(SHUFFLE_STATE_KEY, &err.into()))?;
        self.documents
            .save(SHUFFLE_STATE_KEY, &raw)
            .map_err(|err| PlaylistError::persistence(SHUFFLE_STATE_KEY, &err))
    }
}
