//! Extension-based file categorization.
//!
//! A [`CategoryTable`] is an ordered list of named categories, each owning a set
//! of lowercase file extensions. Lookup walks the categories in order and the
//! first match wins, so an extension listed under two categories resolves to the
//! one enumerated first. Anything unmatched lands in the fallback category.
//!
//! # Examples
//!
//! ```
//! use dlsort::file_category::CategoryTable;
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.classify("jpg"), "Images");
//! assert_eq!(table.classify(".PDF"), "Documents");
//! assert_eq!(table.classify("xyz"), "Other");
//! ```

use std::collections::HashSet;

/// Fallback category name used when the configuration does not set one.
pub const DEFAULT_FALLBACK: &str = "Other";

/// A single named bucket of extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// The category name, also used as the destination folder name.
    pub name: String,
    extensions: HashSet<String>,
}

impl Category {
    /// Creates a category, normalizing every extension.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Returns true if this category lists the (already normalized) extension.
    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }
}

/// Lowercases an extension and strips a single leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.strip_prefix('.').unwrap_or(ext).to_lowercase()
}

/// Ordered mapping from category names to extension sets, with a fallback.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
    fallback: String,
}

impl CategoryTable {
    /// Creates a table from categories in lookup order.
    pub fn new(categories: Vec<Category>, fallback: impl Into<String>) -> Self {
        Self {
            categories,
            fallback: fallback.into(),
        }
    }

    /// Appends a category at the end of the lookup order.
    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    /// Returns the category name for an extension.
    ///
    /// Accepts the extension with or without its leading dot and in any case.
    /// An empty extension, or one no category lists, maps to the fallback.
    ///
    /// ```
    /// use dlsort::file_category::{Category, CategoryTable};
    ///
    /// let table = CategoryTable::new(
    ///     vec![
    ///         Category::new("Archives", [".zip", ".dmg"]),
    ///         Category::new("Executables", [".exe", ".dmg"]),
    ///     ],
    ///     "Miscellaneous",
    /// );
    /// assert_eq!(table.classify("DMG"), "Archives");
    /// assert_eq!(table.classify(""), "Miscellaneous");
    /// ```
    pub fn classify(&self, ext: &str) -> &str {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return &self.fallback;
        }

        self.categories
            .iter()
            .find(|category| category.contains(&ext))
            .map(|category| category.name.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    /// The name files with unknown extensions are filed under.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Returns true if `name` is a configured category or the fallback.
    pub fn is_category(&self, name: &str) -> bool {
        name == self.fallback || self.categories.iter().any(|c| c.name == name)
    }

    /// Iterates over category names in lookup order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(default_categories(), DEFAULT_FALLBACK)
    }
}

/// The built-in category table.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "Images",
            [
                "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tiff", "psd", "heic",
                "raw",
            ],
        ),
        Category::new(
            "Documents",
            [
                "pdf", "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "ppt", "pptx", "csv",
                "md", "pages", "numbers", "key",
            ],
        ),
        Category::new(
            "Videos",
            [
                "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
                "ogv",
            ],
        ),
        Category::new(
            "Music",
            ["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "alac"],
        ),
        Category::new(
            "Archives",
            ["zip", "rar", "7z", "tar", "gz", "bz2", "xz", "iso", "dmg"],
        ),
        Category::new(
            "Code",
            [
                "py", "js", "html", "css", "java", "cpp", "c", "h", "sh", "json", "xml", "yaml",
                "yml", "sql", "go", "rs", "ts", "jsx", "tsx", "php",
            ],
        ),
        Category::new(
            "Executables",
            ["exe", "msi", "dmg", "pkg", "deb", "rpm", "apk", "app"],
        ),
        Category::new("Fonts", ["ttf", "otf", "woff", "woff2", "eot"]),
        Category::new("Books", ["epub", "mobi", "azw", "azw3"]),
    ]
}
