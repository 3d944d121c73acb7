//! Configuration for vibe-pianoview
//!
//! [`ViewConfig`] is the immutable value the view is built from. It can be
//! loaded from a TOML file stored at:
//! - Linux: `~/.config/vibe-pianoview/config.toml`
//! - macOS: `~/Library/Application Support/vibe-pianoview/config.toml`
//! - Windows: `%APPDATA%\vibe-pianoview\config.toml`

use crate::error::{Error, Result};
use directories::ProjectDirs;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Default number of white keys
pub const DEFAULT_NUMBER_KEYS: i32 = 15;

/// Default first MIDI note (middle C)
pub const DEFAULT_MIDI_START: i32 = 60;

/// Fill colors for the three key states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyColors {
    pub white: Color,
    pub black: Color,
    pub pressed: Color,
}

impl Default for KeyColors {
    fn default() -> Self {
        Self {
            white: Color::White,
            black: Color::Black,
            pressed: Color::Yellow,
        }
    }
}

/// Everything needed to lay out and draw the keyboard
///
/// Changing `number_keys` or `midi_start` requires a new layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// Number of white keys
    pub number_keys: i32,
    /// MIDI note of the leftmost key
    pub midi_start: i32,
    pub colors: KeyColors,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            number_keys: DEFAULT_NUMBER_KEYS,
            midi_start: DEFAULT_MIDI_START,
            colors: KeyColors::default(),
        }
    }
}

impl ViewConfig {
    pub fn with_number_keys(mut self, number_keys: i32) -> Self {
        self.number_keys = number_keys;
        self
    }

    pub fn with_midi_start(mut self, midi_start: i32) -> Self {
        self.midi_start = midi_start;
        self
    }

    pub fn with_colors(mut self, colors: KeyColors) -> Self {
        self.colors = colors;
        self
    }

    /// Whether switching to `other` invalidates a layout built from `self`
    pub fn needs_relayout(&self, other: &ViewConfig) -> bool {
        self.number_keys != other.number_keys || self.midi_start != other.midi_start
    }
}

/// Main configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keyboard configuration
    pub keyboard: KeyboardSettings,
    /// Colors
    pub theme: Theme,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Ok(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                log::warn!("Failed to read config {:?}, using defaults: {}", path, e);
                Self::default()
            }),
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save configuration to the default config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "vibe-pianoview") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        write_default_config(&path)?;
        Ok(path)
    }

    /// Convert to the immutable value the view is built from
    pub fn to_view_config(&self) -> ViewConfig {
        ViewConfig {
            number_keys: self.keyboard.number_keys,
            midi_start: self.keyboard.midi_start,
            colors: KeyColors {
                white: self.theme.white_key(),
                black: self.theme.black_key(),
                pressed: self.theme.pressed_key(),
            },
        }
    }
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = r##"# vibe-pianoview configuration file
# https://github.com/trusch/vibelang

[keyboard]
# Number of white keys
number_keys = 15

# MIDI note of the leftmost key (60 = C4)
midi_start = 60

[theme]
# Named color ("white", "dark_gray", ...) or "#rrggbb"
white_key_color = "white"
black_key_color = "black"
pressed_key_color = "yellow"
"##;

    fs::write(path, content)?;
    Ok(())
}

/// Keyboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardSettings {
    /// Number of white keys
    pub number_keys: i32,
    /// MIDI note of the leftmost key
    pub midi_start: i32,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            number_keys: DEFAULT_NUMBER_KEYS,
            midi_start: DEFAULT_MIDI_START,
        }
    }
}

/// Key colors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// White key color
    pub white_key_color: String,
    /// Black key color, also used for the dividers between white keys
    pub black_key_color: String,
    /// Pressed key color
    pub pressed_key_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            white_key_color: "white".to_string(),
            black_key_color: "black".to_string(),
            pressed_key_color: "yellow".to_string(),
        }
    }
}

impl Theme {
    /// Parse a color string to ratatui Color
    pub fn parse_color(s: &str) -> Color {
        match s.to_lowercase().as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "gray" | "grey" => Color::Gray,
            "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Color::DarkGray,
            "light_red" | "lightred" => Color::LightRed,
            "light_green" | "lightgreen" => Color::LightGreen,
            "light_yellow" | "lightyellow" => Color::LightYellow,
            "light_blue" | "lightblue" => Color::LightBlue,
            "light_magenta" | "lightmagenta" => Color::LightMagenta,
            "light_cyan" | "lightcyan" => Color::LightCyan,
            "white" => Color::White,
            s if s.starts_with('#') && s.len() == 7 => {
                let channel = |range: Range<usize>| {
                    s.get(range).and_then(|hex| u8::from_str_radix(hex, 16).ok())
                };
                match (channel(1..3), channel(3..5), channel(5..7)) {
                    (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
                    _ => Color::White,
                }
            }
            _ => Color::White,
        }
    }

    pub fn white_key(&self) -> Color {
        Self::parse_color(&self.white_key_color)
    }

    pub fn black_key(&self) -> Color {
        Self::parse_color(&self.black_key_color)
    }

    pub fn pressed_key(&self) -> Color {
        Self::parse_color(&self.pressed_key_color)
    }
}
