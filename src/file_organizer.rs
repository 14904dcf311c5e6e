/// File organization: moving files into category directories.
///
/// [`FileOrganizer`] holds the filesystem primitives (collision-free destination
/// naming and the move itself). [`Organizer`] drives a whole run over a target
/// directory and folds every file's outcome into a [`RunSummary`].
use crate::config::{CompiledFilters, OrganizerConfig};
use crate::error::{ConfigError, Error, FileError, Result};
use crate::file_category::CategoryTable;
use crate::report::{FileOutcome, MoveResult, RunSummary, SkipReason};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Filesystem primitives for relocating a single file.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Returns `target_dir/category/file_name`, or the first free
    /// `name_N.ext` variant if that path is taken.
    ///
    /// The check runs against the live filesystem, so files moved earlier in
    /// the same run are seen. Broken symlinks count as taken.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dlsort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// // With Documents/report.pdf already present:
    /// let dest = FileOrganizer::resolve_destination(Path::new("/downloads"), "Documents", "report.pdf");
    /// assert_eq!(dest, Path::new("/downloads/Documents/report_1.pdf"));
    /// ```
    pub fn resolve_destination(
        target_dir: &Path,
        category: &str,
        file_name: impl AsRef<OsStr>,
    ) -> PathBuf {
        let file_name = file_name.as_ref();
        let category_dir = target_dir.join(category);
        let candidate = category_dir.join(file_name);
        if !path_taken(&candidate) {
            return candidate;
        }

        let name = Path::new(file_name);
        let stem = name.file_stem().unwrap_or(file_name);
        let extension = name.extension();

        let mut counter: u64 = 1;
        loop {
            let mut numbered = OsString::from(stem);
            numbered.push(format!("_{}", counter));
            if let Some(ext) = extension {
                numbered.push(".");
                numbered.push(ext);
            }

            let candidate = category_dir.join(&numbered);
            if !path_taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Moves a file into its category directory within the target directory.
    ///
    /// The category directory is created if missing. The destination is
    /// resolved right before the move to keep the window for collisions small.
    /// Returns the path the file ended up at.
    pub fn move_to_category(
        target_dir: &Path,
        file_path: &Path,
        category: &str,
    ) -> std::result::Result<PathBuf, FileError> {
        // A vanished source must not leave an empty category folder behind.
        fs::symlink_metadata(file_path)?;
        let category_path = target_dir.join(category);
        ensure_dir(&category_path)?;

        let file_name = file_path.file_name().ok_or_else(|| {
            FileError::Other(io::Error::new(
                io::ErrorKind::InvalidInput,
                "file has no name component",
            ))
        })?;

        let destination = Self::resolve_destination(target_dir, category, file_name);
        Self::move_file(file_path, &destination)?;
        Ok(destination)
    }

    /// Renames `source` to `destination`, copying then removing the source
    /// when the two live on different filesystems.
    pub fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
        match fs::rename(source, destination) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!(
                    src = %source.display(),
                    dest = %destination.display(),
                    "rename crosses devices, falling back to copy"
                );
                copy_then_remove(source, destination)
            }
            Err(e) => Err(e),
        }
    }
}

/// Copies `source` to `destination`, then removes `source`.
///
/// On failure at either step the copy is removed again, so the file only ever
/// ends up in one place. The source is never removed unless the copy succeeded.
fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    if let Err(copy_err) = fs::copy(source, destination) {
        let _ = fs::remove_file(destination);
        return Err(copy_err);
    }
    if let Err(remove_err) = fs::remove_file(source) {
        let _ = fs::remove_file(destination);
        return Err(remove_err);
    }
    Ok(())
}

fn path_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn ensure_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    match fs::create_dir(path) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        other => other,
    }
}

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
}

/// Classifies and relocates the files of one directory.
///
/// Built from an [`OrganizerConfig`]; holds no global state, so several
/// organizers with different tables can coexist.
#[derive(Debug)]
pub struct Organizer {
    table: CategoryTable,
    filters: CompiledFilters,
    ignore_folders: HashSet<String>,
    max_file_size_mb: u64,
    min_file_age_days: u64,
}

impl Organizer {
    /// Creates an organizer, compiling the configured filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn new(config: &OrganizerConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            table: config.category_table(),
            filters: config.compile_filters()?,
            ignore_folders: config.ignore_folders.iter().cloned().collect(),
            max_file_size_mb: config.max_file_size_mb,
            min_file_age_days: config.min_file_age_days,
        })
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Organizes `target_dir` and returns the aggregated summary.
    pub fn organize(&self, target_dir: &Path, options: OrganizeOptions) -> Result<RunSummary> {
        self.organize_with_progress(target_dir, options, |_, _, _| {})
    }

    /// Organizes `target_dir`, calling `on_file(index, total, outcome)` after
    /// each file. `index` starts at 1.
    ///
    /// A missing target directory is not an error: the returned summary has
    /// `directory_missing` set and all counters at zero. Per-file failures never
    /// abort the run.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty path, a target that is not a directory, or
    /// a directory that cannot be listed.
    pub fn organize_with_progress<F>(
        &self,
        target_dir: &Path,
        options: OrganizeOptions,
        mut on_file: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(usize, usize, &FileOutcome),
    {
        if target_dir.as_os_str().is_empty() {
            return Err(Error::InvalidPath("empty path".to_string()));
        }

        match fs::metadata(target_dir) {
            Ok(metadata) if !metadata.is_dir() => {
                return Err(Error::NotADirectory(target_dir.to_path_buf()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %target_dir.display(), "target directory does not exist");
                return Ok(RunSummary::directory_not_found(options.dry_run));
            }
            Err(source) => {
                return Err(Error::ReadDir {
                    path: target_dir.to_path_buf(),
                    source,
                });
            }
        }

        let files = self.collect_files(target_dir)?;
        info!(
            path = %target_dir.display(),
            files = files.len(),
            dry_run = options.dry_run,
            "organizing directory"
        );

        let total = files.len();
        let mut summary = RunSummary::new(options.dry_run);
        for (index, file_path) in files.iter().enumerate() {
            let outcome = self.process_file(target_dir, file_path, options.dry_run);
            summary.record(&outcome);
            on_file(index + 1, total, &outcome);
        }

        info!(
            moved = summary.moved,
            skipped = summary.skipped(),
            errored = summary.errored(),
            "run complete"
        );
        Ok(summary)
    }

    /// Lists the regular files directly inside `target_dir` that pass the
    /// configured filters. Files carrying a category's exact name are left out.
    fn collect_files(&self, target_dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(target_dir).map_err(|source| Error::ReadDir {
            path: target_dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries.flatten() {
            if let Ok(file_type) = entry.file_type()
                && file_type.is_file()
            {
                let file_name = entry.file_name();
                // A plain file named like a category blocks that folder; leave it be.
                if self.table.is_category(&file_name.to_string_lossy()) {
                    debug!(file = %file_name.to_string_lossy(), "occupies a category folder name");
                } else if self.filters.should_include(Path::new(&file_name)) {
                    files.push(entry.path());
                } else {
                    debug!(file = %file_name.to_string_lossy(), "excluded by filters");
                }
            }
        }
        Ok(files)
    }

    fn process_file(&self, target_dir: &Path, file_path: &Path, dry_run: bool) -> FileOutcome {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = file_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = self.table.classify(&extension).to_string();

        let result = self.relocate(target_dir, file_path, &category, dry_run);
        match &result {
            MoveResult::Moved { destination } => {
                debug!(file = %file_name, dest = %destination.display(), dry_run, "moved")
            }
            MoveResult::Skipped(reason) => warn!(file = %file_name, %reason, "skipped"),
            MoveResult::Errored(message) => warn!(file = %file_name, error = %message, "failed"),
        }

        FileOutcome {
            file_name,
            source: file_path.to_path_buf(),
            category,
            result,
        }
    }

    fn relocate(
        &self,
        target_dir: &Path,
        file_path: &Path,
        category: &str,
        dry_run: bool,
    ) -> MoveResult {
        let category_dir = target_dir.join(category);
        // Dangling symlinks count as occupying the name.
        if path_taken(&category_dir) && !category_dir.is_dir() {
            return MoveResult::Skipped(SkipReason::CategoryConflict {
                category: category.to_string(),
            });
        }

        if self.in_organized_folder(file_path) {
            return MoveResult::Skipped(SkipReason::AlreadyOrganized);
        }

        match self.check_limits(file_path) {
            Ok(Some(reason)) => return MoveResult::Skipped(reason),
            Ok(None) => {}
            Err(e) => return result_from_error(FileError::from_io(e)),
        }

        if dry_run {
            let file_name = file_path.file_name().unwrap_or_default();
            return MoveResult::Moved {
                destination: FileOrganizer::resolve_destination(target_dir, category, file_name),
            };
        }

        match FileOrganizer::move_to_category(target_dir, file_path, category) {
            Ok(destination) => MoveResult::Moved { destination },
            Err(e) => result_from_error(e),
        }
    }

    /// True when the file's parent folder is itself a category (or ignored) folder.
    fn in_organized_folder(&self, file_path: &Path) -> bool {
        file_path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy())
            .is_some_and(|name| {
                self.table.is_category(&name) || self.ignore_folders.contains(&*name)
            })
    }

    fn check_limits(&self, file_path: &Path) -> io::Result<Option<SkipReason>> {
        if self.max_file_size_mb == 0 && self.min_file_age_days == 0 {
            return Ok(None);
        }

        let metadata = fs::metadata(file_path)?;

        if self.max_file_size_mb > 0
            && metadata.len() > self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
        {
            return Ok(Some(SkipReason::TooLarge {
                size_mb: metadata.len() / BYTES_PER_MB,
                limit_mb: self.max_file_size_mb,
            }));
        }

        if self.min_file_age_days > 0 {
            let modified: DateTime<Utc> = metadata.modified()?.into();
            let age_days = Utc::now().signed_duration_since(modified).num_days();
            if age_days < self.min_file_age_days as i64 {
                return Ok(Some(SkipReason::TooRecent {
                    age_days,
                    min_days: self.min_file_age_days,
                }));
            }
        }

        Ok(None)
    }
}

fn result_from_error(err: FileError) -> MoveResult {
    match err {
        FileError::PermissionDenied(_) => MoveResult::Skipped(SkipReason::PermissionDenied),
        FileError::Vanished(_) => MoveResult::Skipped(SkipReason::Vanished),
        FileError::Other(e) => MoveResult::Errored(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn organizer() -> Organizer {
        Organizer::new(&OrganizerConfig::default()).expect("default config compiles")
    }

    #[test]
    fn test_resolve_destination_without_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let dest = FileOrganizer::resolve_destination(base_path, "Documents", "a.txt");
        assert_eq!(dest, base_path.join("Documents").join("a.txt"));
    }

    #[test]
    fn test_resolve_destination_picks_smallest_free_suffix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let docs = base_path.join("Documents");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("a.txt"), "0").unwrap();
        fs::write(docs.join("a_1.txt"), "1").unwrap();
        fs::write(docs.join("a_2.txt"), "2").unwrap();
        fs::write(docs.join("a_4.txt"), "4").unwrap();

        let dest = FileOrganizer::resolve_destination(base_path, "Documents", "a.txt");
        assert_eq!(dest, docs.join("a_3.txt"));
        assert!(!dest.exists());
    }

    #[test]
    fn test_resolve_destination_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let other = base_path.join("Other");
        fs::create_dir(&other).unwrap();
        fs::write(other.join("README"), "").unwrap();

        let dest = FileOrganizer::resolve_destination(base_path, "Other", "README");
        assert_eq!(dest, other.join("README_1"));
    }

    #[test]
    fn test_resolve_destination_multiple_dots() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let archives = base_path.join("Archives");
        fs::create_dir(&archives).unwrap();
        fs::write(archives.join("backup.tar.gz"), "").unwrap();

        let dest = FileOrganizer::resolve_destination(base_path, "Archives", "backup.tar.gz");
        assert_eq!(dest, archives.join("backup.tar_1.gz"));
    }

    #[test]
    fn test_move_to_category_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        let dest = FileOrganizer::move_to_category(base_path, &file_path, "Documents")
            .expect("Failed to move file");

        let category_dir = base_path.join("Documents");
        assert!(category_dir.is_dir());
        assert!(!file_path.exists());
        assert_eq!(dest, category_dir.join("test.txt"));
        assert_eq!(fs::read_to_string(dest).unwrap(), "test content");
    }

    #[test]
    fn test_move_to_category_never_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let category_dir = base_path.join("Documents");
        fs::create_dir(&category_dir).unwrap();
        fs::write(category_dir.join("a.txt"), "old").unwrap();

        let file_path = base_path.join("a.txt");
        fs::write(&file_path, "new").unwrap();

        let dest = FileOrganizer::move_to_category(base_path, &file_path, "Documents").unwrap();
        assert_eq!(dest, category_dir.join("a_1.txt"));
        assert_eq!(fs::read_to_string(category_dir.join("a.txt")).unwrap(), "old");
        assert_eq!(fs::read_to_string(dest).unwrap(), "new");
    }

    #[test]
    fn test_move_to_category_vanished_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let missing = base_path.join("gone.pdf");

        let result = FileOrganizer::move_to_category(base_path, &missing, "Documents");
        assert!(matches!(result, Err(FileError::Vanished(_))));
        assert!(!base_path.join("Documents").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_then_remove_leaves_one_copy_when_source_is_stuck() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let locked = base_path.join("locked");
        fs::create_dir(&locked).unwrap();
        let source = locked.join("a.pdf");
        fs::write(&source, "data").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        if fs::write(locked.join("writable"), "").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let destination = base_path.join("a.pdf");
        let result = copy_then_remove(&source, &destination);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.expect_err("source removal must fail");
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!destination.exists());
        assert_eq!(fs::read_to_string(&source).unwrap(), "data");
    }

    #[test]
    fn test_organize_missing_directory() {
        let summary = organizer()
            .organize(Path::new("/non/existent/path"), OrganizeOptions::default())
            .expect("missing directory is not an error");

        assert!(summary.directory_missing);
        assert_eq!(summary.moved, 0);
        assert_eq!(summary.skipped(), 0);
        assert_eq!(summary.errored(), 0);
    }

    #[test]
    fn test_organize_target_is_a_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("plain.txt");
        fs::write(&file_path, "").unwrap();

        let result = organizer().organize(&file_path, OrganizeOptions::default());
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }

    #[test]
    fn test_organize_empty_path() {
        let result = organizer().organize(Path::new(""), OrganizeOptions::default());
        assert!(matches!(result, Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_files_inside_category_folder_are_already_organized() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let images = temp_dir.path().join("Images");
        fs::create_dir(&images).unwrap();
        fs::write(images.join("photo.jpg"), "").unwrap();

        let summary = organizer()
            .organize(&images, OrganizeOptions::default())
            .unwrap();

        assert_eq!(summary.moved, 0);
        assert_eq!(
            summary.skipped_files,
            vec![("photo.jpg".to_string(), SkipReason::AlreadyOrganized)]
        );
        assert!(images.join("photo.jpg").exists());
    }

    #[test]
    fn test_size_limit_skips_large_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let big = fs::File::create(base_path.join("big.iso")).unwrap();
        big.set_len(2 * BYTES_PER_MB).unwrap();
        fs::write(base_path.join("small.pdf"), "x").unwrap();

        let config = OrganizerConfig {
            max_file_size_mb: 1,
            ..Default::default()
        };
        let summary = Organizer::new(&config)
            .unwrap()
            .organize(base_path, OrganizeOptions::default())
            .unwrap();

        assert_eq!(summary.moved, 1);
        assert_eq!(
            summary.skipped_files,
            vec![(
                "big.iso".to_string(),
                SkipReason::TooLarge {
                    size_mb: 2,
                    limit_mb: 1
                }
            )]
        );
        assert!(base_path.join("big.iso").exists());
        assert!(base_path.join("Documents/small.pdf").exists());
    }

    #[test]
    fn test_age_limit_skips_fresh_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("fresh.pdf"), "x").unwrap();

        let config = OrganizerConfig {
            min_file_age_days: 7,
            ..Default::default()
        };
        let summary = Organizer::new(&config)
            .unwrap()
            .organize(base_path, OrganizeOptions::default())
            .unwrap();

        assert_eq!(summary.moved, 0);
        assert!(matches!(
            summary.skipped_files[0].1,
            SkipReason::TooRecent { min_days: 7, .. }
        ));
    }

    #[test]
    fn test_progress_callback_sees_every_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.pdf"), "").unwrap();
        fs::write(base_path.join("b.png"), "").unwrap();

        let mut seen = Vec::new();
        organizer()
            .organize_with_progress(
                base_path,
                OrganizeOptions { dry_run: true },
                |index, total, outcome| {
                    assert_eq!(total, 2);
                    seen.push((index, outcome.category.clone()));
                },
            )
            .unwrap();

        let mut indices: Vec<_> = seen.iter().map(|(i, _)| *i).collect();
        indices.sort();
        assert_eq!(indices, vec![1, 2]);

        let mut categories: Vec<_> = seen.into_iter().map(|(_, c)| c).collect();
        categories.sort();
        assert_eq!(categories, vec!["Documents", "Images"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_denied_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let docs = base_path.join("Documents");
        fs::create_dir(&docs).unwrap();
        fs::write(base_path.join("locked.pdf"), "").unwrap();
        fs::set_permissions(&docs, fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores directory permissions; nothing to assert there.
        if fs::write(docs.join("writable"), "").is_ok() {
            fs::set_permissions(&docs, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let summary = organizer()
            .organize(base_path, OrganizeOptions::default())
            .unwrap();
        fs::set_permissions(&docs, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(summary.moved, 0);
        assert_eq!(summary.errored(), 0);
        assert_eq!(
            summary.skipped_files,
            vec![("locked.pdf".to_string(), SkipReason::PermissionDenied)]
        );
        assert!(base_path.join("locked.pdf").exists());
    }
}
