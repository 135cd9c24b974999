//! Render settings loaded from ~/.swara/config.yaml.
//!
//! The interpreter itself only needs a pitch-reference shift; tempo and
//! instrument program are forwarded to the encoder untouched.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dsl::CompileError;

/// User-facing settings, as written in the config file or on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Reference pitch key for S, e.g. "C" or "F#".
    pub pitch: String,
    /// Beats per minute.
    pub tempo: u32,
    /// Instrument name, e.g. "piano" or "sitar".
    pub instrument: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pitch: "C".to_string(),
            tempo: 90,
            instrument: "piano".to_string(),
        }
    }
}

/// Settings with every key resolved to a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Semitones above C.
    pub pitch_shift: i32,
    pub tempo: u32,
    /// General MIDI program number.
    pub program: u8,
}

/// Default path for the settings file.
pub fn default_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".swara");
    path.push("config.yaml");
    path
}

impl Settings {
    /// Load settings from the standard path. Falls back to the defaults if the
    /// file is missing or malformed.
    pub fn load() -> Self {
        let path = default_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load settings from a YAML file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, io::Error> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save settings to a YAML file, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(io::Error::other)?;
        std::fs::write(path, yaml)
    }

    /// Look up the pitch key and instrument name.
    pub fn resolve(&self) -> Result<ResolvedSettings, CompileError> {
        let pitch_shift = pitch_shift(&self.pitch).ok_or_else(|| {
            CompileError::unknown_token(format!("unknown pitch key: '{}'", self.pitch), 0, 0)
        })?;
        let program = instrument_program(&self.instrument).ok_or_else(|| {
            CompileError::unknown_token(
                format!("unknown instrument: '{}'", self.instrument),
                0,
                0,
            )
        })?;
        if self.tempo == 0 {
            return Err(CompileError::range("tempo must be at least 1 bpm", 0, 0));
        }
        Ok(ResolvedSettings {
            pitch_shift,
            tempo: self.tempo,
            program,
        })
    }
}

/// Semitone offset of a reference key from C. Sharps and flats are both accepted.
pub fn pitch_shift(key: &str) -> Option<i32> {
    let shift = match key {
        "C" => 0,
        "C#" | "Db" => 1,
        "D" => 2,
        "D#" | "Eb" => 3,
        "E" => 4,
        "F" => 5,
        "F#" | "Gb" => 6,
        "G" => 7,
        "G#" | "Ab" => 8,
        "A" => 9,
        "A#" | "Bb" => 10,
        "B" => 11,
        _ => return None,
    };
    Some(shift)
}

/// General MIDI program for an instrument name.
pub fn instrument_program(name: &str) -> Option<u8> {
    let program = match name {
        "piano" => 0,
        "accordion" => 21,
        "overdriven_guitar" => 29,
        "sitar" => 104,
        "shanai" => 111,
        _ => return None,
    };
    Some(program)
}
