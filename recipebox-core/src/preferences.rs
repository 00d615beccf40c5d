//! Display preferences and the context that owns them.
//!
//! Preferences live only as long as the [`AppContext`] that holds them and
//! are never written to disk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FONT_SIZE_SMALL: u8 = 14;
pub const FONT_SIZE_MEDIUM: u8 = 18;
pub const FONT_SIZE_LARGE: u8 = 22;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Typeface {
    #[default]
    System,
    Serif,
    Monospace,
}

impl Typeface {
    pub const ALL: [Typeface; 3] = [Typeface::System, Typeface::Serif, Typeface::Monospace];
}

impl fmt::Display for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Typeface::System => write!(f, "System"),
            Typeface::Serif => write!(f, "Serif"),
            Typeface::Monospace => write!(f, "Monospace"),
        }
    }
}

impl FromStr for Typeface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Typeface::System),
            "serif" => Ok(Typeface::Serif),
            "monospace" | "mono" => Ok(Typeface::Monospace),
            _ => Err(format!(
                "Invalid typeface '{}'. Valid options: System, Serif, Monospace",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub dark_mode: bool,
    /// Points.
    pub font_size: u8,
    pub typeface: Typeface,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            font_size: FONT_SIZE_MEDIUM,
            typeface: Typeface::System,
        }
    }
}

/// Parses a named size (`small`, `medium`, `large`) or a point value.
pub fn parse_font_size(s: &str) -> Result<u8, String> {
    match s.to_lowercase().as_str() {
        "small" => Ok(FONT_SIZE_SMALL),
        "medium" => Ok(FONT_SIZE_MEDIUM),
        "large" => Ok(FONT_SIZE_LARGE),
        other => other.parse::<u8>().ok().filter(|n| *n > 0).ok_or_else(|| {
            format!(
                "Invalid font size '{}'. Valid options: small, medium, large, or a point size",
                s
            )
        }),
    }
}

/// Process-wide state handed to whatever renders output.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    preferences: Preferences,
}

impl AppContext {
    pub fn new(preferences: Preferences) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.preferences.dark_mode = !self.preferences.dark_mode;
        self.preferences.dark_mode
    }

    pub fn set_font_size(&mut self, points: u8) {
        self.preferences.font_size = points;
    }

    pub fn set_typeface(&mut self, typeface: Typeface) {
        self.preferences.typeface = typeface;
    }

    /// Name of the current size. Sizes without a name read as Medium.
    pub fn font_size_label(&self) -> &'static str {
        match self.preferences.font_size {
            FONT_SIZE_SMALL => "Small",
            FONT_SIZE_LARGE => "Large",
            _ => "Medium",
        }
    }
}

impl fmt::Display for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.preferences;
        writeln!(f, "Dark mode: {}", if p.dark_mode { "on" } else { "off" })?;
        writeln!(f, "Font size: {} ({}pt)", self.font_size_label(), p.font_size)?;
        writeln!(f, "Typeface:  {}", p.typeface)
    }
}
