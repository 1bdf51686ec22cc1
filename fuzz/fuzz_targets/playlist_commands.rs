#![no_main]

use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::{Path, PathBuf};
use termtune::PlaylistCore;
use termtune::storage::MemoryStore;

const NAMES: [&str; 3] = ["a", "b", "c"];

fuzz_target!(|data: &[u8]| {
    let Ok(mut core) = PlaylistCore::open_with_rng(
        MemoryStore::new(),
        |_: &Path| true,
        SmallRng::seed_from_u64(data.len() as u64),
    ) else {
        return;
    };

    for pair in data.chunks(2) {
        let op = pair[0];
        let arg = pair.get(1).copied().unwrap_or(0);
        let name = NAMES[arg as usize % NAMES.len()];
        match op % 12 {
            0 => {
                let _ = core.create(name);
            }
            1 => {
                let path = PathBuf::from(format!("track_{}.mp3", arg % 8));
                let _ = core.add_track(name, &path);
            }
            2 => {
                let _ = core.remove_track(name, arg as usize % 6);
            }
            3 => {
                let _ = core.delete(name);
            }
            4 => {
                let _ = core.select(name);
            }
            5 => {
                let _ = core.start_playback(name);
            }
            6 => {
                if core.next().is_some() {
                    assert!(core.current().is_some());
                }
            }
            7 => {
                if core.previous().is_some() {
                    assert!(core.current().is_some());
                }
            }
            8 => {
                let _ = core.toggle_shuffle();
            }
            9 => {
                let _ = core.shuffle_playlist(name, None);
            }
            10 => {
                let _ = core.unshuffle_playlist(name);
            }
            _ => core.documents_mut().set_fail_writes(arg % 2 == 0),
        }

        if let Some(playlist) = core.selected_playlist() {
            if let Some(cursor) = core.session().cursor() {
                if cursor < playlist.len() {
                    assert!(core.current().is_some());
                }
            }
        }
    }
});
