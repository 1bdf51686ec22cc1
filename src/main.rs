use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use termtune::DiskPlaylistCore;
use termtune::command::{self, Payload};
use termtune::config::Settings;
use termtune::library::SongLibrary;

#[derive(Debug, Default)]
struct CliArgs {
    data_dir: Option<PathBuf>,
    songs_dir: Option<PathBuf>,
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut settings = Settings::from_env()?;
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    if let Some(songs_dir) = args.songs_dir {
        settings.songs_dir = songs_dir;
    }
    log::debug!("playlists in {}", settings.playlists_dir().display());

    let mut core = DiskPlaylistCore::open_with_settings(&settings)?;
    let library = SongLibrary::new(&settings.songs_dir);
    log::info!(
        "{} playlist(s) loaded, shuffle {}",
        core.playlist_count(),
        if core.shuffle_state() { "on" } else { "off" }
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt(&mut stdout)?;
    for line in stdin.lock().lines() {
        let line = line?;
        let reply = command::run_line(&mut core, &library, &line)?;

        if !reply.message.is_empty() {
            if reply.success {
                writeln!(stdout, "{}", reply.message)?;
            } else {
                writeln!(stdout, "error: {}", reply.message)?;
            }
        }
        for rendered in command::render_payload(&reply.payload) {
            writeln!(stdout, "{rendered}")?;
        }
        if reply.payload == Payload::Quit {
            break;
        }
        prompt(&mut stdout)?;
    }
    Ok(())
}

fn prompt(stdout: &mut io::Stdout) -> io::Result<()> {
    write!(stdout, "> ")?;
    stdout.flush()
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--data-dir" => {
                index += 1;
                out.data_dir = Some(path_value(&args, index, "--data-dir")?);
            }
            "--songs-dir" => {
                index += 1;
                out.songs_dir = Some(path_value(&args, index, "--songs-dir")?);
            }
            "-v" | "--verbose" => out.verbose = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn path_value(args: &[String], index: usize, flag: &str) -> anyhow::Result<PathBuf> {
    let Some(value) = args.get(index) else {
        anyhow::bail!("{flag} requires a path");
    };
    if value.trim().is_empty() {
        anyhow::bail!("{flag} cannot be empty");
    }
    Ok(PathBuf::from(value.trim()))
}

fn print_help() {
    println!("termtune");
    println!("  --data-dir path   Where playlists and shuffle state are stored");
    println!("  --songs-dir path  Folder songs are resolved from");
    println!("  -v, --verbose     Debug logging");
    println!("Type \"help\" at the prompt for playlist commands.");
}
