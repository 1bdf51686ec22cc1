use crate::core::PlaylistCore;
use crate::error::{PlaylistError, Result};
use crate::model::{Playlist, PlaylistSummary, Track};
use crate::storage::{DocumentStore, SHUFFLE_STATE_KEY, SourceProbe};
use std::path::Path;

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PlaylistError::Validation(String::from(
            "Playlist name cannot be empty",
        )));
    }
    if name == SHUFFLE_STATE_KEY {
        return Err(PlaylistError::Validation(format!(
            "\"{name}\" is a reserved name"
        )));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(PlaylistError::Validation(format!(
            "Playlist name cannot contain path separators: {name}"
        )));
    }
    Ok(())
}

impl<D: DocumentStore, P: SourceProbe> PlaylistCore<D, P> {
    pub fn create(&mut self, name: &str) -> Result<&Playlist> {
        validate_name(name)?;
        if self.catalog.contains_key(name) {
            return Err(PlaylistError::Duplicate(name.to_string()));
        }

        self.catalog.insert(name.to_string(), Playlist::new(name));
        if let Err(err) = self.write_playlist(name) {
            self.catalog.remove(name);
            return Err(err);
        }

        log::debug!("created playlist {name}");
        self.require(name)
    }

    pub fn add_track(&mut self, playlist_name: &str, source: &Path) -> Result<&Track> {
        let playlist = self.require(playlist_name)?;
        if !self.probe.exists(source) {
            return Err(PlaylistError::SourceMissing(source.to_path_buf()));
        }
        if playlist.contains_path(source) {
            return Err(PlaylistError::DuplicateTrack {
                playlist: playlist_name.to_string(),
                path: source.to_path_buf(),
            });
        }

        let playlist = self.require_mut(playlist_name)?;
        let previous_modified = playlist.modified;
        let track = Track::from_source(source);
        // Added while shuffled: the restored order keeps it at the end.
        let mirrored = playlist.shuffled && !playlist.original_track_order.is_empty();
        if mirrored {
            playlist.original_track_order.push(track.clone());
        }
        playlist.tracks.push(track);
        playlist.touch();

        if let Err(err) = self.write_playlist(playlist_name) {
            let playlist = self.require_mut(playlist_name)?;
            playlist.tracks.pop();
            if mirrored {
                playlist.original_track_order.pop();
            }
            playlist.modified = previous_modified;
            return Err(err);
        }

        log::debug!("added {} to {playlist_name}", source.display());
        let playlist = self.require(playlist_name)?;
        playlist
            .tracks
            .last()
            .ok_or_else(|| PlaylistError::Empty(playlist_name.to_string()))
    }

    pub fn add_track_to_selected(&mut self, source: &Path) -> Result<&Track> {
        let Some(name) = self.session.selected().map(str::to_string) else {
            return Err(PlaylistError::NoSelection);
        };
        self.add_track(&name, source)
    }

    pub fn remove_track(&mut self, playlist_name: &str, position: usize) -> Result<Track> {
        let playlist = self.require_mut(playlist_name)?;
        let len = playlist.len();
        if position < 1 || position > len {
            return Err(PlaylistError::Index {
                index: position,
                len,
            });
        }

        let previous_modified = playlist.modified;
        let removed = playlist.tracks.remove(position - 1);
        let removed_original = playlist
            .original_track_order
            .iter()
            .position(|track| track.id == removed.id)
            .map(|idx| (idx, playlist.original_track_order.remove(idx)));
        playlist.touch();

        if let Err(err) = self.write_playlist(playlist_name) {
            let playlist = self.require_mut(playlist_name)?;
            playlist.tracks.insert(position - 1, removed);
            if let Some((idx, track)) = removed_original {
                playlist.original_track_order.insert(idx, track);
            }
            playlist.modified = previous_modified;
            return Err(err);
        }

        log::debug!("removed {} from {playlist_name}", removed.title);
        Ok(removed)
    }

    pub fn delete(&mut self, name: &str) -> Result<Playlist> {
        self.require(name)?;
        self.documents
            .delete(name)
            .map_err(|err| PlaylistError::persistence(name, &err))?;

        let removed = self
            .catalog
            .remove(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
        if self.session.is_selected(name) {
            self.session.clear();
        }

        log::debug!("deleted playlist {name}");
        Ok(removed)
    }

    pub fn list(&self) -> Vec<PlaylistSummary> {
        self.catalog
            .iter()
            .map(|(name, playlist)| PlaylistSummary {
                name: name.clone(),
                track_count: playlist.len(),
                created: playlist.created,
                modified: playlist.modified,
                is_selected: self.session.is_selected(name),
            })
            .collect()
    }

    pub fn show(&self, name: &str) -> Result<&Playlist> {
        self.require(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tests::{core_with, test_core};
    use crate::storage::MemoryStore;
    use proptest::prop_assert_eq;
    use std::path::PathBuf;
    use time::OffsetDateTime;

    fn paths(core: &crate::core::tests::TestCore, name: &str) -> Vec<PathBuf> {
        core.get(name)
            .expect("playlist")
            .tracks
            .iter()
            .map(|track| track.path.clone())
            .collect()
    }

    #[test]
    fn create_rejects_blank_and_duplicate_names() {
        let mut core = test_core();
        assert!(matches!(core.create(""), Err(PlaylistError::Validation(_))));
        assert!(matches!(core.create("   "), Err(PlaylistError::Validation(_))));
        assert!(matches!(
            core.create(SHUFFLE_STATE_KEY),
            Err(PlaylistError::Validation(_))
        ));
        assert!(matches!(core.create("a/b"), Err(PlaylistError::Validation(_))));

        core.create("mix").expect("create");
        assert!(matches!(core.create("mix"), Err(PlaylistError::Duplicate(_))));
        assert_eq!(core.playlist_count(), 1);
    }

    #[test]
    fn create_writes_a_document() {
        let mut core = test_core();
        let playlist = core.create("mix").expect("create");
        assert!(playlist.tracks.is_empty());
        assert!(!playlist.shuffled);

        let raw = core.documents().document("mix").expect("document");
        let stored: Playlist = serde_json::from_str(raw).expect("parse");
        assert_eq!(stored.name, "mix");
    }

    #[test]
    fn create_rolls_back_when_write_fails() {
        let mut core = test_core();
        core.documents_mut().set_fail_writes(true);

        let err = core.create("mix").expect_err("write fails");
        assert!(matches!(err, PlaylistError::Persistence { .. }));
        assert!(core.get("mix").is_none());

        core.documents_mut().set_fail_writes(false);
        core.create("mix").expect("name is free again");
    }

    #[test]
    fn add_track_checks_playlist_source_and_duplicates() {
        let mut core = crate::core::PlaylistCore::open(
            MemoryStore::new(),
            (|path: &Path| path != Path::new("missing.mp3")) as fn(&Path) -> bool,
        )
        .expect("open");

        assert!(matches!(
            core.add_track("nope", Path::new("A.mp3")),
            Err(PlaylistError::NotFound(_))
        ));

        core.create("mix").expect("create");
        assert!(matches!(
            core.add_track("mix", Path::new("missing.mp3")),
            Err(PlaylistError::SourceMissing(_))
        ));

        let track = core.add_track("mix", Path::new("A.mp3")).expect("add");
        assert_eq!(track.title, "A.mp3");
        assert!(matches!(
            core.add_track("mix", Path::new("A.mp3")),
            Err(PlaylistError::DuplicateTrack { .. })
        ));
        assert_eq!(core.get("mix").map(Playlist::len), Some(1));
    }

    #[test]
    fn duplicate_detection_is_case_sensitive() {
        let mut core = core_with(&["mix"], &["A.mp3"]);
        core.add_track("mix", Path::new("a.mp3")).expect("different case");
        assert_eq!(core.get("mix").map(Playlist::len), Some(2));
    }

    #[test]
    fn add_track_rolls_back_when_write_fails() {
        let mut core = core_with(&["mix"], &["A.mp3"]);
        let before = core.get("mix").cloned().expect("playlist");
        core.documents_mut().set_fail_writes(true);

        let err = core.add_track("mix", Path::new("B.mp3")).expect_err("fails");
        assert!(matches!(err, PlaylistError::Persistence { .. }));
        assert_eq!(core.get("mix"), Some(&before));
    }

    #[test]
    fn add_to_selected_requires_selection() {
        let mut core = core_with(&["mix"], &[]);
        assert!(matches!(
            core.add_track_to_selected(Path::new("A.mp3")),
            Err(PlaylistError::NoSelection)
        ));

        core.select("mix").expect("select");
        core.add_track_to_selected(Path::new("A.mp3")).expect("add");
        assert_eq!(paths(&core, "mix"), vec![PathBuf::from("A.mp3")]);
    }

    #[test]
    fn remove_track_uses_one_based_positions() {
        let mut core = core_with(&["mix"], &["A.mp3", "B.mp3", "C.mp3"]);
        assert!(matches!(
            core.remove_track("mix", 0),
            Err(PlaylistError::Index { index: 0, len: 3 })
        ));
        assert!(matches!(
            core.remove_track("mix", 4),
            Err(PlaylistError::Index { index: 4, len: 3 })
        ));

        let removed = core.remove_track("mix", 2).expect("remove");
        assert_eq!(removed.path, PathBuf::from("B.mp3"));
        assert_eq!(
            paths(&core, "mix"),
            vec![PathBuf::from("A.mp3"), PathBuf::from("C.mp3")]
        );
    }

    #[test]
    fn remove_track_reinserts_in_place_on_write_failure() {
        let mut core = core_with(&["mix"], &["A.mp3", "B.mp3", "C.mp3"]);
        let before = core.get("mix").cloned().expect("playlist");
        core.documents_mut().set_fail_writes(true);

        core.remove_track("mix", 2).expect_err("fails");
        assert_eq!(core.get("mix"), Some(&before));
    }

    #[test]
    fn delete_clears_selection_and_document() {
        let mut core = core_with(&["mix", "other"], &["A.mp3"]);
        core.select("mix").expect("select");
        core.start_playback("mix");

        core.delete("mix").expect("delete");
        assert!(core.get("mix").is_none());
        assert!(core.documents().document("mix").is_none());
        assert_eq!(core.session().selected(), None);
        assert_eq!(core.session().cursor(), None);
        assert!(core.current().is_none());
        assert!(matches!(core.delete("mix"), Err(PlaylistError::NotFound(_))));
    }

    #[test]
    fn delete_keeps_selection_of_other_playlists() {
        let mut core = core_with(&["mix", "other"], &["A.mp3"]);
        core.select("other").expect("select");
        core.delete("mix").expect("delete");
        assert_eq!(core.session().selected(), Some("other"));
    }

    #[test]
    fn failed_delete_keeps_playlist() {
        let mut core = core_with(&["mix"], &["A.mp3"]);
        core.documents_mut().set_fail_deletes(true);

        assert!(matches!(
            core.delete("mix"),
            Err(PlaylistError::Persistence { .. })
        ));
        assert!(core.get("mix").is_some());
    }

    #[test]
    fn list_marks_the_selected_playlist() {
        let mut core = core_with(&["b-side", "a-side"], &["A.mp3"]);
        core.select("b-side").expect("select");

        let listed = core.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "a-side");
        assert!(!listed[0].is_selected);
        assert_eq!(listed[1].name, "b-side");
        assert!(listed[1].is_selected);
        assert_eq!(listed[1].track_count, 1);
    }

    #[test]
    fn show_returns_full_record() {
        let core = core_with(&["mix"], &["A.mp3", "B.mp3"]);
        assert_eq!(core.show("mix").map(Playlist::len).ok(), Some(2));
        assert!(matches!(core.show("nope"), Err(PlaylistError::NotFound(_))));
    }

    #[test]
    fn add_and_remove_update_modified() {
        let mut core = core_with(&["mix"], &["A.mp3"]);
        core.catalog.get_mut("mix").expect("playlist").modified = OffsetDateTime::UNIX_EPOCH;
        core.add_track("mix", Path::new("B.mp3")).expect("add");
        assert!(core.get("mix").expect("playlist").modified > OffsetDateTime::UNIX_EPOCH);

        core.catalog.get_mut("mix").expect("playlist").modified = OffsetDateTime::UNIX_EPOCH;
        core.remove_track("mix", 1).expect("remove");
        assert!(core.get("mix").expect("playlist").modified > OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn failed_writes_restore_modified() {
        let mut core = core_with(&["mix"], &["A.mp3"]);
        core.catalog.get_mut("mix").expect("playlist").modified = OffsetDateTime::UNIX_EPOCH;
        core.documents_mut().set_fail_writes(true);

        core.add_track("mix", Path::new("B.mp3")).expect_err("fails");
        assert_eq!(core.get("mix").expect("playlist").modified, OffsetDateTime::UNIX_EPOCH);
        core.remove_track("mix", 1).expect_err("fails");
        assert_eq!(core.get("mix").expect("playlist").modified, OffsetDateTime::UNIX_EPOCH);
    }

    proptest::proptest! {
        #[test]
        fn add_grows_by_one_or_rolls_back(fail in proptest::bool::ANY, existing in 0usize..6) {
            let names: Vec<String> = (0..existing).map(|n| format!("{n}.mp3")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut core = core_with(&["mix"], &refs);
            core.documents_mut().set_fail_writes(fail);

            let result = core.add_track("mix", Path::new("new.mp3"));
            let expected = if fail { existing } else { existing + 1 };
            prop_assert_eq!(result.is_ok(), !fail);
            prop_assert_eq!(core.get("mix").map(Playlist::len), Some(expected));
        }
    }
}
