//! Configuration persistence for editor settings

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Tool;
use crate::export::ExportFormat;

/// Serializable RGBA color, channels in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Default for StrokeColor {
    fn default() -> Self {
        // Red, the editor's initial pen color
        Self::new(1.0, 0.0, 0.0, 1.0)
    }
}

impl StrokeColor {
    pub const WHITE: StrokeColor = StrokeColor::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with the alpha channel replaced
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Build a color from 8-bit channels
    pub fn from_rgba_u8([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }
}

impl FromStr for StrokeColor {
    type Err = anyhow::Error;

    /// Parse `#rrggbb` or `#rrggbbaa`
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            anyhow::bail!("expected #rrggbb or #rrggbbaa, got {s:?}");
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid hex color {s:?}"))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::from_rgba_u8([channel(0)?, channel(2)?, channel(4)?, a]))
    }
}

/// Save location for edited screenshots (Pictures or Documents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Tool selected when an editing session opens
    #[serde(default)]
    pub default_tool: Tool,
    /// Color for new strokes
    #[serde(default)]
    pub stroke_color: StrokeColor,
    /// Line width for new strokes
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    /// Smallest width the brush size control allows
    #[serde(default = "default_min_line_width")]
    pub min_line_width: f32,
    /// Largest width the brush size control allows
    #[serde(default = "default_max_line_width")]
    pub max_line_width: f32,
    /// Canvas fill drawn behind the screenshot (None = no fill)
    #[serde(default)]
    pub background: Option<StrokeColor>,
    /// Where saved edits go
    #[serde(default)]
    pub save_location: SaveLocation,
    /// Format used when the destination has no recognizable extension
    #[serde(default)]
    pub export_format: ExportFormat,
    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Font used for text captions; system fonts are searched when unset
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

fn default_line_width() -> f32 {
    3.0
}

fn default_min_line_width() -> f32 {
    1.0
}

fn default_max_line_width() -> f32 {
    20.0
}

fn default_jpeg_quality() -> u8 {
    90
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_tool: Tool::Pen,
            stroke_color: StrokeColor::default(),
            line_width: default_line_width(),
            min_line_width: default_min_line_width(),
            max_line_width: default_max_line_width(),
            background: None,
            save_location: SaveLocation::Pictures,
            export_format: ExportFormat::Png,
            jpeg_quality: default_jpeg_quality(),
            font_path: None,
        }
    }
}

impl EditorConfig {
    /// Directory name under the user config dir
    pub const ID: &'static str = "inkshot";

    fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("no user config directory")?;
        Ok(dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Error loading config, using defaults: {:?}", err);
                    Self::default()
                }
            },
            Ok(_) => Self::default(),
            Err(err) => {
                log::warn!("Could not locate config file: {:?}", err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Replace an unusable line width range with the defaults
    fn normalized(mut self) -> Self {
        let (min, max) = (self.min_line_width, self.max_line_width);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            log::warn!(
                "Invalid line width range {}..{}, using {}..{}",
                min,
                max,
                default_min_line_width(),
                default_max_line_width()
            );
            self.min_line_width = default_min_line_width();
            self.max_line_width = default_max_line_width();
        }
        self
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let result = Self::config_path().and_then(|path| self.save_to(&path));
        if let Err(err) = result {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Clamp a requested brush width into the configured range
    pub fn clamp_line_width(&self, width: f32) -> f32 {
        if width.is_nan() {
            return self.min_line_width;
        }
        // Not `f32::clamp`, which panics on an inverted range
        width.max(self.min_line_width).min(self.max_line_width)
    }
}
