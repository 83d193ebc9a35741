use anyhow::{Context, Result};
use ledgerline_ingest::{DEFAULT_ROLLOVER_MONTHS, ProcessOptions, TypeSelection, YearPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_ledgerline_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserSection,
    pub input: InputSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    /// `credit_card`, `current_account` or `auto`
    pub statement_type: TypeSelection,
    /// Months after the closing month before a date counts as last year.
    pub lookahead_months: u32,
    /// Months before the opening month before a date counts as next year.
    pub lookback_months: u32,
    pub fallback_year: Option<i32>,
    pub min_lines_for_format_check: usize,
    /// Worker threads; 1 runs documents one after another.
    pub parallel: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    pub folder: PathBuf,
    /// Command used to extract text from PDFs (poppler's pdftotext)
    pub pdftotext: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

impl Default for ParserSection {
    fn default() -> Self {
        let defaults = ProcessOptions::default();
        Self {
            statement_type: defaults.statement_type,
            lookahead_months: DEFAULT_ROLLOVER_MONTHS,
            lookback_months: DEFAULT_ROLLOVER_MONTHS,
            fallback_year: defaults.fallback_year,
            min_lines_for_format_check: defaults.min_lines_for_format_check,
            parallel: 1,
        }
    }
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("Drop"),
            pdftotext: "pdftotext".to_string(),
            password: None,
        }
    }
}

impl ParserSection {
    pub fn options(&self) -> ProcessOptions {
        ProcessOptions {
            statement_type: self.statement_type,
            year_policy: YearPolicy {
                lookahead_months: self.lookahead_months,
                lookback_months: self.lookback_months,
            },
            fallback_year: self.fallback_year,
            min_lines_for_format_check: self.min_lines_for_format_check,
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(ensure_ledgerline_home()?.join("config.toml"))
}

/// Missing file means defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(path, &Config::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}
