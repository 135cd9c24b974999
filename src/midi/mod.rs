//! MIDI output — the encoder boundary and a Standard MIDI File writer.

pub mod encoder;
pub mod smf;

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::ResolvedSettings;
use crate::dsl::{CompileError, CompiledPiece};

pub use encoder::{render_events, EventEncoder, PERCUSSION_PROGRAM};
pub use smf::{SmfEncoder, DEFAULT_PPQN};

/// Failure while producing or writing MIDI output.
#[derive(Debug, Error)]
pub enum MidiError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("MIDI I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Render a compiled piece to Standard MIDI File bytes.
pub fn to_smf_bytes(piece: &CompiledPiece, settings: &ResolvedSettings) -> Result<Vec<u8>, MidiError> {
    let mut encoder = SmfEncoder::default();
    render_events(piece, settings, &mut encoder)?;
    encoder.to_bytes()
}

/// Render a compiled piece and write it to `path`, creating parent
/// directories as needed.
pub fn write_smf(
    piece: &CompiledPiece,
    settings: &ResolvedSettings,
    path: &Path,
) -> Result<(), MidiError> {
    let bytes = to_smf_bytes(piece, settings)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
