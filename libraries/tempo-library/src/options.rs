//! Scan configuration

use tempo_core::types::MatchLevel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration consumed by the scan orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Whitelisted roots to scan, in order
    pub include_roots: Vec<PathBuf>,

    /// Roots excluded from scanning
    pub exclude_roots: Vec<PathBuf>,

    /// Only register path shape, skip extraction (fast pre-scan)
    pub paths_only: bool,

    /// Match strictness tier
    pub match_level: MatchLevel,

    /// Additionally require identical filenames when matching
    pub strict_filename: bool,

    /// Maximum parallel extraction tasks
    pub max_parallel: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_roots: Vec::new(),
            exclude_roots: Vec::new(),
            paths_only: false,
            match_level: MatchLevel::default(),
            strict_filename: false,
            max_parallel: num_cpus::get(),
        }
    }
}

impl ScanOptions {
    /// Options scanning the given roots with defaults everywhere else.
    pub fn with_roots(include_roots: Vec<PathBuf>) -> Self {
        Self {
            include_roots,
            ..Self::default()
        }
    }

    /// Parse a newline-delimited path whitelist: one path per line,
    /// trimmed, blank lines dropped.
    pub fn parse_path_list(text: &str) -> Vec<PathBuf> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}
