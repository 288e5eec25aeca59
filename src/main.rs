//! # kiroglyph
//!
//! Entry point: parses command-line arguments, loads configuration, sets up logging, and runs the
//! editor inside a raw-mode terminal session.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kiroglyph::terminal::RawMode;
use kiroglyph::{Config, Editor, Error};

/// A terminal text editor with syntax highlighting, search and more.
#[derive(Parser)]
#[command(name = "kiroglyph", version, about)]
struct Args {
    /// File to open. If omitted, starts with an empty, unnamed buffer.
    file: Option<PathBuf>,
}

/// Route logging to a file instead of stdout/stderr, since both are the editor's own display
/// surface. Controlled by `RUST_LOG` as usual; defaults to `warn` if unset.
fn init_logging() {
    let log_path = std::env::temp_dir().join("kiroglyph.log");
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(log_path) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            kiroglyph::terminal::clear_screen_best_effort();
            eprintln!("kiroglyph: {err}");
            log::error!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let config = Config::load()?;
    log::info!("starting kiroglyph with config: {config:?}");

    let _raw_mode = RawMode::enable()?;
    let mut editor = Editor::new(config)?;
    editor.run(args.file.as_deref())
}
