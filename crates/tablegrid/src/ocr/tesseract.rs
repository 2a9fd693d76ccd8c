//! Tesseract command-line backend.
//!
//! Runs `tesseract <image> stdout -l <language> --psm <mode>` on a temporary PNG.
//!
//! # System Requirement
//!
//! Tesseract must be installed:
//! - **macOS**: `brew install tesseract`
//! - **Linux**: `apt install tesseract-ocr` or `dnf install tesseract`
//! - **Windows**: `winget install UB-Mannheim.TesseractOCR`
//!
//! The executable is looked up in this order: `OcrConfig::tesseract_cmd`, the
//! `TABLEGRID_TESSERACT_CMD` and `TESSERACT_CMD` environment variables, then `PATH`.

use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, ImageFormat};

use super::{OcrBackend, RecognitionMode};
use crate::core::config::OcrConfig;
use crate::{Result, TableGridError};

const ENV_VARS: [&str; 2] = ["TABLEGRID_TESSERACT_CMD", "TESSERACT_CMD"];

fn tesseract_install_message() -> String {
    "Tesseract is required for OCR. \
Install: macOS: 'brew install tesseract', \
Linux: 'apt install tesseract-ocr', \
Windows: 'winget install UB-Mannheim.TesseractOCR'. \
If Tesseract is installed in a custom location, set ocr.tesseract_cmd or the TESSERACT_CMD environment variable."
        .to_string()
}

/// OCR backend that shells out to the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractCliBackend {
    executable: PathBuf,
    language: String,
    page_psm: u8,
    cell_psm: u8,
}

impl TesseractCliBackend {
    /// Resolve the executable and build a backend from `config`.
    ///
    /// # Errors
    ///
    /// `TableGridError::MissingDependency` when no tesseract executable can be found.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        let executable = resolve_executable(config.tesseract_cmd.as_deref())?;
        tracing::debug!("Using tesseract at {}", executable.display());
        Ok(Self::with_executable(executable, config))
    }

    /// Build a backend around a known executable, skipping discovery.
    pub fn with_executable(executable: impl Into<PathBuf>, config: &OcrConfig) -> Self {
        Self {
            executable: executable.into(),
            language: config.language.clone(),
            page_psm: config.page_psm,
            cell_psm: config.cell_psm,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn psm_for(&self, mode: RecognitionMode) -> u8 {
        match mode {
            RecognitionMode::Page => self.page_psm,
            RecognitionMode::Cell => self.cell_psm,
        }
    }

    fn build_args(&self, input: &Path, mode: RecognitionMode) -> Vec<OsString> {
        vec![
            input.as_os_str().to_os_string(),
            OsString::from("stdout"),
            OsString::from("-l"),
            OsString::from(&self.language),
            OsString::from("--psm"),
            OsString::from(self.psm_for(mode).to_string()),
        ]
    }
}

impl OcrBackend for TesseractCliBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage, mode: RecognitionMode) -> Result<String> {
        let input = tempfile::Builder::new()
            .prefix("tablegrid-")
            .suffix(".png")
            .tempfile()?;

        DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(input.path(), ImageFormat::Png)?;

        let output = Command::new(&self.executable)
            .args(self.build_args(input.path(), mode))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TableGridError::MissingDependency(format!(
                        "tesseract executable not found at {}. {}",
                        self.executable.display(),
                        tesseract_install_message()
                    ))
                } else {
                    TableGridError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TableGridError::ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Candidate executable paths, most specific first, without duplicates.
fn tesseract_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    if let Some(path) = configured {
        push_candidate(path.to_path_buf());
    }

    for var in ENV_VARS {
        if let Some(value) = env::var_os(var).filter(|v| !v.is_empty()) {
            push_candidate(PathBuf::from(value));
        }
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            push_candidate(dir.join("tesseract"));
            push_candidate(dir.join("tesseract.exe"));
        }
    }

    candidates
}

fn resolve_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(TableGridError::MissingDependency(format!(
            "Configured tesseract_cmd {} does not exist",
            path.display()
        )));
    }

    tesseract_candidates(None)
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| TableGridError::MissingDependency(tesseract_install_message()))
}
