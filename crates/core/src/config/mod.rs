use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{export::ExportSettings, render::Progress, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub text: TextConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(?path, "loaded config");
        Ok(config)
    }
}

/// Settings shared by the text encoders and the Morse decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Ticks per dit, digit or half Braille cell.
    pub unit_duration: u64,
    pub morse: MorseAlphabet,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            unit_duration: 120,
            morse: MorseAlphabet::default(),
        }
    }
}

/// Characters recognised as dits, dahs and spaces by the Morse encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorseAlphabet {
    pub dit: String,
    pub dah: String,
    pub space: String,
}

impl MorseAlphabet {
    pub fn is_dit(&self, c: char) -> bool {
        self.dit.contains(c)
    }

    pub fn is_dah(&self, c: char) -> bool {
        self.dah.contains(c)
    }

    pub fn is_space(&self, c: char) -> bool {
        self.space.contains(c)
    }
}

impl Default for MorseAlphabet {
    fn default() -> Self {
        Self {
            dit: ".・".to_string(),
            dah: "-_ー".to_string(),
            space: " \u{3000}".to_string(),
        }
    }
}

/// Configuration specific to image and animation output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub ticks_per_dot: u64,
    /// Mode used for image export.
    pub progress: Progress,
    /// Mode used for animation export.
    pub animation: Progress,
}

impl RenderConfig {
    pub fn image_settings(&self) -> ExportSettings {
        ExportSettings {
            ticks_per_dot: self.ticks_per_dot,
            progress: self.progress,
        }
    }

    pub fn animation_settings(&self) -> ExportSettings {
        ExportSettings {
            ticks_per_dot: self.ticks_per_dot,
            progress: self.animation,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ticks_per_dot: 80,
            progress: Progress::None,
            animation: Progress::Point,
        }
    }
}
