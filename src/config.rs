// ============================================================================
// config.rs — Generator configuration (pwa-icons.toml)
// ============================================================================

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Looked up in the current directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "pwa-icons.toml";

/// Where the icon pixels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Resize an existing logo found in the workspace.
    #[default]
    Resize,
    /// Draw a flat placeholder icon; no source file is needed.
    Placeholder,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Resize => write!(f, "resize"),
            SourceMode::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// One output icon: file name (relative to the output dir) and pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IconSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl IconSpec {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn square(name: impl Into<String>, size: u32) -> Self {
        Self::new(name, size, size)
    }
}

/// RGBA color written as `#RRGGBB` or `#RRGGBBAA` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        let bytes = hex::decode(digits).map_err(|e| format!("invalid color '{}': {}", s, e))?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            _ => Err(format!("invalid color '{}': expected #RRGGBB or #RRGGBBAA", s)),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.0;
        if a == 255 {
            format!("#{}", hex::encode_upper([r, g, b]))
        } else {
            format!("#{}", hex::encode_upper([r, g, b, a]))
        }
    }
}

/// Look of the generated placeholder icon.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaceholderStyle {
    pub background: Color,
    /// Centered disc drawn over the background; its alpha is blended.
    pub disc: Color,
    pub glyph: Color,
    /// Letters drawn in the middle of the icon.
    pub initials: String,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xFF, 0xB6, 0xC1),
            disc: Color::rgba(255, 255, 255, 50),
            glyph: Color::rgb(0x8B, 0x45, 0x13),
            initials: "OL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory searched for the source logo.
    pub workspace_root: PathBuf,
    /// Destination directory, relative to `workspace_root` unless absolute.
    pub output_dir: PathBuf,
    pub mode: SourceMode,
    /// Accepted source file names, in priority order.
    pub candidates: Vec<String>,
    /// Fall back to the most recently modified file matching `fallback_pattern`.
    pub fallback_to_newest: bool,
    pub fallback_pattern: String,
    /// Render threads; `None` uses one per CPU.
    pub jobs: Option<usize>,
    pub icons: Vec<IconSpec>,
    pub placeholder: PlaceholderStyle,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            output_dir: PathBuf::from("frontend").join("public"),
            mode: SourceMode::Resize,
            candidates: ["logo.png", "icon.png", "image.png", "image (1).png", "image (2).png"]
                .into_iter()
                .map(String::from)
                .collect(),
            fallback_to_newest: true,
            fallback_pattern: "*.png".to_string(),
            jobs: None,
            icons: vec![
                IconSpec::square("pwa-192x192.png", 192),
                IconSpec::square("pwa-512x512.png", 512),
                IconSpec::square("apple-touch-icon.png", 180),
            ],
            placeholder: PlaceholderStyle::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parses the file without validating it; call `validate` once
    /// command-line overrides have been applied.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: GeneratorConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Loads `explicit` if given, else `pwa-icons.toml` from the current
    /// directory if it exists, else the built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolved destination directory.
    pub fn output_path(&self) -> PathBuf {
        self.workspace_root.join(&self.output_dir)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.icons.is_empty() {
            anyhow::bail!("no icons configured");
        }
        let mut names = HashSet::new();
        for icon in &self.icons {
            if icon.name.trim().is_empty() {
                anyhow::bail!("icon with empty file name");
            }
            if icon.width == 0 || icon.height == 0 {
                anyhow::bail!("icon '{}' has a zero dimension ({}x{})", icon.name, icon.width, icon.height);
            }
            if !names.insert(icon.name.as_str()) {
                anyhow::bail!("icon '{}' is listed twice", icon.name);
            }
        }
        if self.mode == SourceMode::Resize && self.candidates.is_empty() && !self.fallback_to_newest {
            anyhow::bail!("resize mode needs at least one candidate or the newest-file fallback");
        }
        if self.mode == SourceMode::Resize && self.fallback_to_newest {
            glob::Pattern::new(&self.fallback_pattern)
                .with_context(|| format!("invalid fallback_pattern '{}'", self.fallback_pattern))?;
        }
        if self.jobs == Some(0) {
            anyhow::bail!("jobs must be at least 1");
        }
        Ok(())
    }
}
