use crate::core::PlaylistCore;
use crate::error::{PlaylistError, Result};
use crate::library::SongLibrary;
use crate::model::{Playlist, PlaylistSummary, Track};
use crate::shuffle::{ShuffleOutcome, ShuffleToggle};
use crate::storage::{DocumentStore, SourceProbe};
use std::path::PathBuf;

pub const HELP_LINES: &[&str] = &[
    "Playlists:",
    "  playlist -n <name>               - Create a playlist",
    "  playlist -add <playlist> <song>  - Add a song to a playlist",
    "  playlist -list                   - List playlists",
    "  playlist -show <name>            - Show playlist tracks",
    "  playlist -rm <playlist> <n>      - Remove track number n",
    "  playlist -del <name>             - Delete a playlist",
    "  playlist <name>                  - Select a playlist",
    "  add <song>                       - Add a song to the selected playlist",
    "Songs:",
    "  list                             - List songs in the songs folder",
    "Playback:",
    "  pp                               - Play the selected playlist from the start",
    "  next | prev                      - Move through the selected playlist",
    "  now                              - Show the current track",
    "  stop                             - Forget the playback position",
    "Shuffle:",
    "  shuffle                          - Toggle shuffle mode",
    "  shuffle on | shuffle off         - Enable or disable shuffle mode",
    "  shuffle playlist <name>          - Shuffle one playlist",
    "  shuffle restore <name>           - Restore a playlist's original order",
    "  exit                             - Quit",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command: {0}. Type \"help\" for a list of commands")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    AddTo { playlist: String, song: String },
    List,
    Show(String),
    Remove { playlist: String, position: usize },
    Delete(String),
    Select(String),
    Add(String),
    Songs,
    PlayPlaylist,
    Next,
    Previous,
    Now,
    Stop,
    ShuffleToggle,
    ShuffleOn,
    ShuffleOff,
    ShufflePlaylist(String),
    ShuffleRestore(String),
    Help,
    Quit,
    Nothing,
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Self, CommandError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(head) = parts.first() else {
            return Ok(Self::Nothing);
        };
        let rest = |from: usize| parts.get(from..).map(|p| p.join(" ")).unwrap_or_default();

        match head.to_ascii_lowercase().as_str() {
            "playlist" => parse_playlist(&parts, rest(2), rest(1)),
            "add" => non_empty(rest(1), "add <song>").map(Self::Add),
            "list" | "ls" => Ok(Self::Songs),
            "pp" | "playplaylist" => Ok(Self::PlayPlaylist),
            "next" | "n" => Ok(Self::Next),
            "prev" | "previous" => Ok(Self::Previous),
            "now" => Ok(Self::Now),
            "stop" => Ok(Self::Stop),
            "shuffle" => parse_shuffle(&parts, rest(2)),
            "help" => Ok(Self::Help),
            "exit" | "quit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn non_empty(value: String, usage: &'static str) -> std::result::Result<String, CommandError> {
    if value.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(value)
    }
}

fn parse_playlist(
    parts: &[&str],
    after_flag: String,
    after_head: String,
) -> std::result::Result<Command, CommandError> {
    match parts.get(1).copied() {
        Some("-n") => non_empty(after_flag, "playlist -n <name>").map(Command::Create),
        Some("-add") => {
            let playlist = parts.get(2).map(|p| p.to_string());
            let song = parts.get(3..).map(|p| p.join(" ")).unwrap_or_default();
            match playlist {
                Some(playlist) if !song.is_empty() => Ok(Command::AddTo { playlist, song }),
                _ => Err(CommandError::Usage("playlist -add <playlist> <song>")),
            }
        }
        Some("-list") => Ok(Command::List),
        Some("-show") => non_empty(after_flag, "playlist -show <name>").map(Command::Show),
        Some("-rm") => {
            let playlist = parts.get(2).map(|p| p.to_string());
            let position = parts.get(3).and_then(|n| n.parse::<usize>().ok());
            match (playlist, position) {
                (Some(playlist), Some(position)) => Ok(Command::Remove { playlist, position }),
                _ => Err(CommandError::Usage("playlist -rm <playlist> <track-number>")),
            }
        }
        Some("-del") => non_empty(after_flag, "playlist -del <name>").map(Command::Delete),
        _ => non_empty(after_head, "playlist <name> or playlist -list").map(Command::Select),
    }
}

fn parse_shuffle(parts: &[&str], after_sub: String) -> std::result::Result<Command, CommandError> {
    let sub = parts.get(1).map(|s| s.to_ascii_lowercase());
    match sub.as_deref() {
        None => Ok(Command::ShuffleToggle),
        Some("on") => Ok(Command::ShuffleOn),
        Some("off") => Ok(Command::ShuffleOff),
        Some("playlist") => {
            non_empty(after_sub, "shuffle playlist <name>").map(Command::ShufflePlaylist)
        }
        Some("restore") => {
            non_empty(after_sub, "shuffle restore <name>").map(Command::ShuffleRestore)
        }
        Some(_) => Err(CommandError::Usage(
            "shuffle | shuffle on | shuffle off | shuffle playlist <name> | shuffle restore <name>",
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    None,
    Track {
        track: Track,
        remaining: usize,
    },
    Playlist(Playlist),
    Playlists(Vec<PlaylistSummary>),
    Songs(Vec<PathBuf>),
    Shuffled(ShuffleOutcome),
    Restored(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub success: bool,
    pub message: String,
    pub payload: Payload,
}

impl Reply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: Payload::None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: Payload::None,
        }
    }

    pub fn with(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }
}

fn report<T>(result: Result<T>, on_ok: impl FnOnce(T) -> Reply) -> anyhow::Result<Reply> {
    match result {
        Ok(value) => Ok(on_ok(value)),
        Err(err) if err.is_expected() => Ok(Reply::fail(err.to_string())),
        Err(err) => Err(err.into()),
    }
}

fn track_reply(label: &str, track: Option<&Track>, remaining: usize, missing: &str) -> Reply {
    match track {
        Some(track) => Reply::ok(format!("{label}: {}", track.title)).with(Payload::Track {
            track: track.clone(),
            remaining,
        }),
        None => Reply::fail(missing),
    }
}

pub fn dispatch<D: DocumentStore, P: SourceProbe>(
    core: &mut PlaylistCore<D, P>,
    library: &SongLibrary,
    command: Command,
) -> anyhow::Result<Reply> {
    match command {
        Command::Nothing => Ok(Reply::ok("")),
        Command::Help => Ok(Reply::ok("Available commands:").with(Payload::Help)),
        Command::Quit => Ok(Reply::ok("Bye").with(Payload::Quit)),

        Command::Create(name) => report(core.create(&name), |_| {
            Reply::ok(format!("Playlist \"{name}\" created successfully"))
        }),
        Command::AddTo { playlist, song } => {
            let Some(path) = library.resolve(&song) else {
                return Ok(Reply::fail(song_not_found(&song)));
            };
            report(core.add_track(&playlist, &path), |track| {
                Reply::ok(format!("Added \"{}\" to playlist \"{playlist}\"", track.title))
            })
        }
        Command::Add(song) => {
            let Some(path) = library.resolve(&song) else {
                return Ok(Reply::fail(song_not_found(&song)));
            };
            let selected = core.selected_name().unwrap_or_default().to_string();
            report(core.add_track_to_selected(&path), |track| {
                Reply::ok(format!("Added \"{}\" to playlist \"{selected}\"", track.title))
            })
        }
        Command::Songs => {
            let songs = library.audio_files();
            let message = if songs.is_empty() {
                format!("No songs found in {}", library.root().display())
            } else {
                format!("Found {} song(s)", songs.len())
            };
            Ok(Reply::ok(message).with(Payload::Songs(songs)))
        }
        Command::List => {
            let playlists = core.list();
            let message = if playlists.is_empty() {
                String::from("No playlists found. Create one with: playlist -n <name>")
            } else {
                format!("Found {} playlist(s)", playlists.len())
            };
            Ok(Reply::ok(message).with(Payload::Playlists(playlists)))
        }
        Command::Show(name) => report(core.show(&name), |playlist| {
            Reply::ok(format!("Playlist: {} ({} tracks)", playlist.name, playlist.len()))
                .with(Payload::Playlist(playlist.clone()))
        }),
        Command::Remove { playlist, position } => {
            report(core.remove_track(&playlist, position), |track| {
                Reply::ok(format!("Removed \"{}\" from playlist \"{playlist}\"", track.title))
            })
        }
        Command::Delete(name) => report(core.delete(&name), |_| {
            Reply::ok(format!("Playlist \"{name}\" deleted"))
        }),
        Command::Select(name) => report(core.select(&name), |playlist| {
            Reply::ok(format!(
                "Playlist \"{name}\" selected ({} tracks)",
                playlist.len()
            ))
        }),

        Command::PlayPlaylist => {
            let Some(name) = core.selected_name().map(str::to_string) else {
                return Ok(Reply::fail(PlaylistError::NoSelection.to_string()));
            };
            let track = core.start_playback(&name).cloned();
            let remaining = core.remaining_count();
            Ok(track_reply(
                "Now playing",
                track.as_ref(),
                remaining,
                &PlaylistError::Empty(name.clone()).to_string(),
            ))
        }
        Command::Next => {
            let track = core.next().cloned();
            Ok(track_reply("Next", track.as_ref(), core.remaining_count(), &navigation_failure(core)))
        }
        Command::Previous => {
            let track = core.previous().cloned();
            Ok(track_reply(
                "Previous",
                track.as_ref(),
                core.remaining_count(),
                &navigation_failure(core),
            ))
        }
        Command::Now => Ok(track_reply(
            "Now playing",
            core.current(),
            core.remaining_count(),
            "Nothing is playing",
        )),
        Command::Stop => {
            core.reset_cursor();
            Ok(Reply::ok("Playback position reset"))
        }

        Command::ShuffleToggle => report(core.toggle_shuffle(), |toggle| match toggle {
            ShuffleToggle::Enabled(outcome) => enabled_reply(outcome),
            ShuffleToggle::Disabled { restored } => disabled_reply(restored),
        }),
        Command::ShuffleOn => report(core.enable_shuffle(), enabled_reply),
        Command::ShuffleOff => report(core.disable_shuffle(), disabled_reply),
        Command::ShufflePlaylist(name) => report(core.shuffle_playlist(&name, None), |outcome| {
            Reply::ok(format!(
                "Shuffled {} songs in playlist \"{}\"",
                outcome.track_count, outcome.playlist
            ))
            .with(Payload::Shuffled(outcome))
        }),
        Command::ShuffleRestore(name) => report(core.unshuffle_playlist(&name), |count| {
            Reply::ok(format!("Restored original order of \"{name}\" ({count} songs)"))
        }),
    }
}

fn song_not_found(song: &str) -> String {
    format!("Song not found: {song}. Use \"list\" to see available songs")
}

fn navigation_failure<D: DocumentStore, P: SourceProbe>(core: &PlaylistCore<D, P>) -> String {
    match core.selected_name() {
        None => PlaylistError::NoSelection.to_string(),
        Some(name) => PlaylistError::Empty(name.to_string()).to_string(),
    }
}

fn enabled_reply(outcome: Option<ShuffleOutcome>) -> Reply {
    match outcome {
        Some(outcome) => Reply::ok(format!(
            "Shuffle enabled. Shuffled {} songs in playlist \"{}\"",
            outcome.track_count, outcome.playlist
        ))
        .with(Payload::Shuffled(outcome)),
        None => Reply::ok("Shuffle enabled"),
    }
}

fn disabled_reply(restored: usize) -> Reply {
    let message = if restored > 0 {
        format!("Shuffle disabled. Restored original order for {restored} playlist(s)")
    } else {
        String::from("Shuffle disabled")
    };
    Reply::ok(message).with(Payload::Restored(restored))
}

pub fn render_payload(payload: &Payload) -> Vec<String> {
    match payload {
        Payload::None | Payload::Quit | Payload::Shuffled(_) | Payload::Restored(_) => Vec::new(),
        Payload::Help => HELP_LINES.iter().map(|line| line.to_string()).collect(),
        Payload::Track { track, remaining } => vec![
            format!("  {} - {} ({})", track.artist, track.album, track.path.display()),
            format!("  Tracks left in queue: {remaining}"),
        ],
        Payload::Playlist(playlist) => {
            if playlist.is_empty() {
                return vec![String::from("  No tracks in playlist")];
            }
            let mut lines = Vec::with_capacity(playlist.len() * 2 + 1);
            if playlist.shuffled {
                lines.push(String::from("  (shuffled)"));
            }
            for (index, track) in playlist.tracks.iter().enumerate() {
                lines.push(format!("  [{}] {}", index + 1, track.title));
                lines.push(format!("      Path: {}", track.path.display()));
            }
            lines
        }
        Payload::Songs(songs) => songs
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                format!("  [{}] {name}", index + 1)
            })
            .collect(),
        Payload::Playlists(playlists) => playlists
            .iter()
            .flat_map(|summary| {
                let selected = if summary.is_selected { " [SELECTED]" } else { "" };
                [
                    format!("  {}{selected}", summary.name),
                    format!("      Tracks: {}", summary.track_count),
                    format!("      Created: {}", summary.created.date()),
                ]
            })
            .collect(),
    }
}

pub fn run_line<D: DocumentStore, P: SourceProbe>(
    core: &mut PlaylistCore<D, P>,
    library: &SongLibrary,
    line: &str,
) -> anyhow::Result<Reply> {
    match Command::parse(line) {
        Ok(command) => dispatch(core, library, command),
        Err(err) => Ok(Reply::fail(err.to_string())),
    }
}
