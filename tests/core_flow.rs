use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::{Path, PathBuf};
use termtune::PlaylistCore;
use termtune::PlaylistError;
use termtune::model::Track;
use termtune::storage::{MemoryStore, SourceProbe};

fn open_core() -> PlaylistCore<MemoryStore, impl SourceProbe> {
    PlaylistCore::open_with_rng(
        MemoryStore::new(),
        |_: &Path| true,
        SmallRng::seed_from_u64(2024),
    )
    .expect("open")
}

fn path_of(track: Option<&Track>) -> Option<PathBuf> {
    track.map(|track| track.path.clone())
}

fn track_paths(tracks: &[Track]) -> Vec<PathBuf> {
    tracks.iter().map(|track| track.path.clone()).collect()
}

fn abc() -> Vec<PathBuf> {
    vec![
        PathBuf::from("A.mp3"),
        PathBuf::from("B.mp3"),
        PathBuf::from("C.mp3"),
    ]
}

#[test]
fn road_trip_playback_wraps() {
    let mut core = open_core();
    core.create("road-trip").expect("create");
    for path in abc() {
        core.add_track("road-trip", &path).expect("add");
    }
    core.select("road-trip").expect("select");

    assert_eq!(path_of(core.start_playback("road-trip")), Some(PathBuf::from("A.mp3")));
    assert_eq!(path_of(core.next()), Some(PathBuf::from("B.mp3")));
    assert_eq!(path_of(core.next()), Some(PathBuf::from("C.mp3")));
    assert_eq!(path_of(core.next()), Some(PathBuf::from("A.mp3")));
}

#[test]
fn shuffle_mode_anchors_playing_track_and_restores_on_disable() {
    let mut core = open_core();
    core.create("road-trip").expect("create");
    for path in abc() {
        core.add_track("road-trip", &path).expect("add");
    }
    core.select("road-trip").expect("select");
    core.start_playback("road-trip");
    core.next();
    assert_eq!(path_of(core.current()), Some(PathBuf::from("B.mp3")));

    let outcome = core.enable_shuffle().expect("enable").expect("shuffled");
    assert_eq!(outcome.playlist, "road-trip");
    let playlist = core.get("road-trip").expect("playlist");
    assert_eq!(playlist.tracks[0].path, PathBuf::from("B.mp3"));
    assert!(playlist.shuffled);
    assert_eq!(track_paths(&playlist.original_track_order), abc());

    assert_eq!(core.disable_shuffle().expect("disable"), 1);
    let playlist = core.get("road-trip").expect("playlist");
    assert_eq!(track_paths(&playlist.tracks), abc());
    assert!(!playlist.shuffled);
    assert!(playlist.original_track_order.is_empty());
    assert_eq!(core.session().cursor(), None);
}

#[test]
fn duplicate_path_is_rejected() {
    let mut core = open_core();
    core.create("road-trip").expect("create");
    core.add_track("road-trip", Path::new("A.mp3")).expect("add");

    let err = core
        .add_track("road-trip", Path::new("A.mp3"))
        .expect_err("duplicate");
    assert!(matches!(err, PlaylistError::DuplicateTrack { .. }));
    assert_eq!(core.get("road-trip").map(|p| p.len()), Some(1));
}

#[test]
fn deleting_selected_playlist_clears_selection() {
    let mut core = open_core();
    core.create("road-trip").expect("create");
    core.add_track("road-trip", Path::new("A.mp3")).expect("add");
    core.select("road-trip").expect("select");
    core.start_playback("road-trip");

    core.delete("road-trip").expect("delete");
    assert!(core.current().is_none());
    assert_eq!(core.selected_name(), None);
}

#[test]
fn tiny_playlists_cannot_be_shuffled() {
    let mut core = open_core();
    core.create("empty").expect("create");
    core.create("single").expect("create");
    core.add_track("single", Path::new("A.mp3")).expect("add");
    let before = core.get("single").cloned();

    assert!(matches!(
        core.shuffle_playlist("empty", None),
        Err(PlaylistError::Empty(_))
    ));
    assert!(matches!(
        core.shuffle_playlist("single", None),
        Err(PlaylistError::SingleTrack(_))
    ));
    assert_eq!(core.get("single").cloned(), before);
}

#[test]
fn independent_cores_do_not_share_selection() {
    let mut first = open_core();
    let mut second = open_core();
    first.create("mix").expect("create");
    second.create("mix").expect("create");

    first.select("mix").expect("select");
    assert_eq!(first.selected_name(), Some("mix"));
    assert_eq!(second.selected_name(), None);
}
