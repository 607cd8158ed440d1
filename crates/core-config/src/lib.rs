//! Configuration loading and parsing.
//!
//! Parses `ringview.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [bidi]
//! paragraph_length_max = 500   # rows per paragraph before explicit fallback
//! shaping = true               # Arabic presentation-form substitution
//! box_mirror = false           # mirror box drawing in RTL rows
//! classifier = "unicode"       # or "explicit" (no bidi reordering at all)
//!
//! [viewport]
//! reserve_rows = 32            # initial row-map allocation
//! reserve_columns = 128        # initial per-row column allocation
//! ```
//!
//! Every field is optional. The raw paragraph length is kept as parsed; the
//! effective value is clamped by `Config::apply_context` so that one
//! paragraph's flat character buffer (`paragraph_length_max * columns`) never
//! exceeds [`PARAGRAPH_CHAR_BUDGET`]. Unknown fields are ignored.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_PARAGRAPH_LENGTH_MAX: usize = 500;
/// Upper bound on characters fed to the classifier for one paragraph.
pub const PARAGRAPH_CHAR_BUDGET: usize = 1 << 20;
pub const DEFAULT_RESERVE_ROWS: usize = 32;
pub const DEFAULT_RESERVE_COLUMNS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigContext {
    pub viewport_columns: u16,
    pub viewport_rows: u16,
}

impl ConfigContext {
    pub fn new(viewport_columns: u16, viewport_rows: u16) -> Self {
        Self {
            viewport_columns,
            viewport_rows,
        }
    }
}

/// Which bidi classifier backend to run.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Unicode,
    Explicit,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BidiConfig {
    #[serde(default = "BidiConfig::default_paragraph_length_max")]
    pub paragraph_length_max: usize,
    #[serde(default = "BidiConfig::default_shaping")]
    pub shaping: bool,
    #[serde(default)]
    pub box_mirror: bool,
    #[serde(default)]
    pub classifier: ClassifierKind,
}

impl Default for BidiConfig {
    fn default() -> Self {
        Self {
            paragraph_length_max: Self::default_paragraph_length_max(),
            shaping: Self::default_shaping(),
            box_mirror: false,
            classifier: ClassifierKind::default(),
        }
    }
}

impl BidiConfig {
    const fn default_paragraph_length_max() -> usize {
        DEFAULT_PARAGRAPH_LENGTH_MAX
    }
    const fn default_shaping() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ViewportConfig {
    #[serde(default = "ViewportConfig::default_reserve_rows")]
    pub reserve_rows: usize,
    #[serde(default = "ViewportConfig::default_reserve_columns")]
    pub reserve_columns: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            reserve_rows: Self::default_reserve_rows(),
            reserve_columns: Self::default_reserve_columns(),
        }
    }
}

impl ViewportConfig {
    const fn default_reserve_rows() -> usize {
        DEFAULT_RESERVE_ROWS
    }
    const fn default_reserve_columns() -> usize {
        DEFAULT_RESERVE_COLUMNS
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub bidi: BidiConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub effective_paragraph_length_max: usize, // clamped to the char budget
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw: None,
            file: ConfigFile::default(),
            effective_paragraph_length_max: DEFAULT_PARAGRAPH_LENGTH_MAX,
        }
    }
}

/// Config path: `ringview.toml` in the working directory, then the platform
/// config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("ringview.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("ringview").join("ringview.toml");
    }
    PathBuf::from("ringview.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let effective = file.bidi.paragraph_length_max.max(1);
            Ok(Config {
                raw: Some(content),
                file,
                effective_paragraph_length_max: effective,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

/// Most paragraph rows of `columns` columns that fit the char budget.
pub fn paragraph_rows_within_budget(columns: usize) -> usize {
    (PARAGRAPH_CHAR_BUDGET / columns.max(1)).max(1)
}

/// `raw` paragraph length limited to `1..=paragraph_rows_within_budget(columns)`.
pub fn clamp_paragraph_length(raw: usize, columns: usize) -> usize {
    raw.clamp(1, paragraph_rows_within_budget(columns))
}

impl Config {
    /// Clamp the paragraph length against the viewport width. Returns the
    /// effective value.
    pub fn apply_context(&mut self, ctx: ConfigContext) -> usize {
        let raw = self.file.bidi.paragraph_length_max;
        let columns = usize::from(ctx.viewport_columns);
        let max = paragraph_rows_within_budget(columns);
        let clamped = clamp_paragraph_length(raw, columns);

        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                max,
                viewport_columns = ctx.viewport_columns,
                viewport_rows = ctx.viewport_rows,
                "paragraph_length_max_clamped"
            );
        }
        self.effective_paragraph_length_max = clamped;
        clamped
    }

    /// Re-clamp after a resize. `Some(new)` when the effective value changed.
    pub fn recompute_with_context(&mut self, ctx: ConfigContext) -> Option<usize> {
        let prev = self.effective_paragraph_length_max;
        let current = self.apply_context(ctx);
        if current != prev { Some(current) } else { None }
    }

    /// Bidi settings with the effective (clamped) paragraph length applied.
    pub fn effective_bidi(&self) -> BidiConfig {
        BidiConfig {
            paragraph_length_max: self.effective_paragraph_length_max,
            ..self.file.bidi.clone()
        }
    }
}
