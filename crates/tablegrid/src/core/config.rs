//! Configuration loading and management.
//!
//! This module provides utilities for loading extraction configuration from TOML,
//! YAML or JSON files and discovering a `tablegrid.toml` in the directory hierarchy.

use crate::{Result, TableGridError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file searched for by [`ExtractionConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "tablegrid.toml";

/// Main extraction configuration.
///
/// # Example
///
/// ```rust
/// use tablegrid::core::config::ExtractionConfig;
///
/// let config = ExtractionConfig::default();
/// assert_eq!(config.grid.cluster_tolerance, 10);
///
/// // let config = ExtractionConfig::from_toml_file("tablegrid.toml")?;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Grid segmentation parameters
    #[serde(default)]
    pub grid: GridConfig,

    /// OCR configuration
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Layout block filtering
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Skip table regions with more pixels than this (None = no limit).
    ///
    /// Grid extraction is linear in the region size and has no internal guard.
    #[serde(default)]
    pub max_region_pixels: Option<u64>,

    /// Maximum concurrent pages in batch operations (None = num_cpus * 2).
    #[serde(default)]
    pub max_concurrent_extractions: Option<usize>,
}

/// Parameters of the line-morphology grid heuristic.
///
/// These are fixed per run and never auto-tuned; dense or sparsely ruled tables
/// may need different values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Line positions closer than this (in pixels) merge into one boundary
    #[serde(default = "default_cluster_tolerance")]
    pub cluster_tolerance: u32,

    /// Horizontal structuring element width is `crop_width / horizontal_kernel_divisor`
    #[serde(default = "default_kernel_divisor")]
    pub horizontal_kernel_divisor: u32,

    /// Vertical structuring element height is `crop_height / vertical_kernel_divisor`
    #[serde(default = "default_kernel_divisor")]
    pub vertical_kernel_divisor: u32,
}

/// OCR configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Run full-page and per-cell OCR
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OCR backend name (only "tesseract" ships with the crate)
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Language code (e.g., "eng", "jpn")
    #[serde(default = "default_eng")]
    pub language: String,

    /// Tesseract page segmentation mode for full pages
    #[serde(default = "default_page_psm")]
    pub page_psm: u8,

    /// Tesseract page segmentation mode for single cells
    #[serde(default = "default_cell_psm")]
    pub cell_psm: u8,

    /// Explicit path to the tesseract executable
    #[serde(default)]
    pub tesseract_cmd: Option<PathBuf>,
}

/// Layout block filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Blocks scoring below this are discarded
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

fn default_true() -> bool {
    true
}
fn default_backend() -> String {
    "tesseract".to_string()
}
fn default_eng() -> String {
    "eng".to_string()
}
fn default_cluster_tolerance() -> u32 {
    10
}
fn default_kernel_divisor() -> u32 {
    15
}
fn default_page_psm() -> u8 {
    3
}
fn default_cell_psm() -> u8 {
    6
}
fn default_min_score() -> f32 {
    0.5
}

const MAX_PSM: u8 = 13;

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cluster_tolerance: default_cluster_tolerance(),
            horizontal_kernel_divisor: default_kernel_divisor(),
            vertical_kernel_divisor: default_kernel_divisor(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: default_backend(),
            language: default_eng(),
            page_psm: default_page_psm(),
            cell_psm: default_cell_psm(),
            tesseract_cmd: None,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if self.horizontal_kernel_divisor == 0 || self.vertical_kernel_divisor == 0 {
            return Err(TableGridError::validation(format!(
                "Kernel divisors must be positive (horizontal={}, vertical={})",
                self.horizontal_kernel_divisor, self.vertical_kernel_divisor
            )));
        }
        Ok(())
    }
}

impl OcrConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.page_psm > MAX_PSM || self.cell_psm > MAX_PSM {
            return Err(TableGridError::validation(format!(
                "PSM values must be between 0 and {} (page_psm={}, cell_psm={})",
                MAX_PSM, self.page_psm, self.cell_psm
            )));
        }
        if self.language.trim().is_empty() {
            return Err(TableGridError::validation("OCR language must not be empty"));
        }
        Ok(())
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(TableGridError::validation(format!(
                "layout.min_score must be within [0, 1], got {}",
                self.min_score
            )));
        }
        Ok(())
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `TableGridError::Validation` if the file doesn't exist or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| TableGridError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| TableGridError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content)
            .map_err(|e| TableGridError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the parser from the file extension.
    ///
    /// Unknown extensions are parsed as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `tablegrid.toml` in the current directory and its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(TableGridError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!("Using configuration from {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Check every section for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.ocr.validate()?;
        self.layout.validate()?;

        if self.max_concurrent_extractions == Some(0) {
            return Err(TableGridError::validation("max_concurrent_extractions must be at least 1"));
        }
        if self.max_region_pixels == Some(0) {
            return Err(TableGridError::validation("max_region_pixels must be at least 1"));
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| TableGridError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
