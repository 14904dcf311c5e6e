//! Organizer configuration.
//!
//! This module loads the category table, ignore lists and file filtering rules
//! from a TOML configuration file. The loaded [`OrganizerConfig`] is an ordinary
//! value handed to the organizer, so different runs (and tests) can use
//! different tables side by side.
//!
//! Filtering supports several strategies:
//! - Hidden file skipping
//! - Exact filename matching
//! - Glob pattern matching
//! - File extension matching
//! - Regex pattern matching
//! - Include (whitelist) rules that override exclude rules
//!
//! # Configuration File Format
//!
//! ```toml
//! fallback_category = "Other"
//! skip_hidden = true
//! ignore_files = [".DS_Store", "Thumbs.db"]
//! ignore_folders = []
//! max_file_size_mb = 0
//! min_file_age_days = 0
//!
//! [[categories]]
//! name = "Images"
//! extensions = [".jpg", ".png"]
//!
//! [filters.exclude]
//! patterns = ["*.part"]
//! extensions = ["crdownload"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::error::ConfigError;
use crate::file_category::{Category, CategoryTable, DEFAULT_FALLBACK, default_categories};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".dlsortrc.toml";

/// Top-level configuration for an organization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    /// Category for files whose extension matches nothing.
    pub fallback_category: String,

    /// Skip files whose name starts with a dot.
    pub skip_hidden: bool,

    /// Directory organized when none is given on the command line.
    pub default_path: Option<PathBuf>,

    /// Categories in lookup order. `None` keeps the built-in table.
    pub categories: Option<Vec<CategoryRule>>,

    /// Folder names treated as already organized, on top of the category names.
    pub ignore_folders: Vec<String>,

    /// Exact file names that are never moved.
    pub ignore_files: Vec<String>,

    /// Files larger than this are skipped. 0 disables the limit.
    pub max_file_size_mb: u64,

    /// Files modified more recently than this are skipped. 0 disables the limit.
    pub min_file_age_days: u64,

    /// Pattern-based exclusion rules.
    pub filters: FilterRules,
}

/// One `[[categories]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Pattern-based filter rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding files from organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Glob patterns to exclude (e.g., "*.part", "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "crdownload", "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            fallback_category: DEFAULT_FALLBACK.to_string(),
            skip_hidden: true,
            default_path: None,
            categories: None,
            ignore_folders: Vec::new(),
            ignore_files: [".DS_Store", "desktop.ini", "Thumbs.db", ".localized"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            max_file_size_mb: 0,
            min_file_age_days: 0,
            filters: FilterRules::default(),
        }
    }
}

impl OrganizerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dlsortrc.toml` in the current directory
    /// 3. Look for `~/.config/dlsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(".config").join("dlsort").join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::Io` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Builds the category table described by this configuration.
    pub fn category_table(&self) -> CategoryTable {
        let categories = match &self.categories {
            Some(rules) => rules
                .iter()
                .map(|rule| Category::new(rule.name.clone(), &rule.extensions))
                .collect(),
            None => default_categories(),
        };
        CategoryTable::new(categories, self.fallback_category.clone())
    }

    /// The directory to organize when none is given explicitly.
    ///
    /// Uses `default_path` (with a leading `~` expanded), else `$HOME/Downloads`.
    pub fn target_path(&self) -> PathBuf {
        match &self.default_path {
            Some(path) => expand_home(path),
            None => home_dir()
                .map(|home| home.join("Downloads"))
                .unwrap_or_else(|| PathBuf::from("Downloads")),
        }
    }

    /// Compile configuration into optimized filter structures for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.skip_hidden, &self.ignore_files, &self.filters)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Compiled, optimized filter structures for efficient file matching.
///
/// Glob and regex patterns are parsed once per run rather than once per file.
#[derive(Debug)]
pub struct CompiledFilters {
    skip_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(
        skip_hidden: bool,
        ignore_files: &[String],
        rules: &FilterRules,
    ) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden,
            exclude_filenames: ignore_files.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| crate::file_category::normalize_extension(ext))
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if a file should be considered for organization.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden file filter - if hidden and skipping is on, exclude
    /// 3. Exact filename match - if matched, exclude
    /// 4. File extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.include_patterns.iter().any(|p| p.matches_path(file_path)) {
            return true;
        }

        if self.skip_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.exclude_patterns.iter().any(|p| p.matches_path(file_path)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|re| re.is_match(&file_name))
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}
