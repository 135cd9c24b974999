//! Swara — render a notation file to a Standard MIDI File.
//!
//! Settings come from ~/.swara/config.yaml; command-line flags override them.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::Level;

use swara::config::Settings;
use swara::dsl::Compiler;
use swara::midi::write_smf;

#[derive(Parser)]
#[command(name = "swara", version, about = "Render Carnatic notation to MIDI")]
struct Cli {
    /// Input notation file
    file: PathBuf,

    /// Reference pitch for S (C, C#, Db, ... B)
    #[arg(short, long)]
    pitch: Option<String>,

    /// Tempo in beats per minute
    #[arg(short, long)]
    tempo: Option<u32>,

    /// Instrument (piano, sitar, shanai, overdriven_guitar, accordion)
    #[arg(short, long)]
    instrument: Option<String>,

    /// Output path (defaults to output/<name>_<pitch>_<tempo>_<instrument>.mid)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log more detail to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    tracing::debug!("log level {level}");
}

fn default_output(file: &Path, settings: &Settings) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());
    PathBuf::from("output").join(format!(
        "{stem}_{}_{}_{}.mid",
        settings.pitch, settings.tempo, settings.instrument
    ))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load();
    if let Some(pitch) = cli.pitch {
        settings.pitch = pitch;
    }
    if let Some(tempo) = cli.tempo {
        settings.tempo = tempo;
    }
    if let Some(instrument) = cli.instrument {
        settings.instrument = instrument;
    }
    let resolved = settings.resolve().context("invalid settings")?;

    let source = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let piece = Compiler::compile(&source, resolved.pitch_shift)
        .with_context(|| format!("failed to interpret {}", cli.file.display()))?;

    let output = cli
        .output
        .unwrap_or_else(|| default_output(&cli.file, &settings));
    write_smf(&piece, &resolved, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "wrote {} ({} events, {} units)",
        output.display(),
        piece.events.len(),
        piece.duration
    );
    Ok(())
}
