//! Migration file discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::MigrateError;

/// One migration file, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub path: PathBuf,
    pub sql: String,
}

impl MigrationFile {
    /// File name for display, falling back to the full path.
    #[must_use]
    pub fn name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        )
    }
}

/// Resolve `paths` to an ordered list of migration files and read them.
///
/// Files are taken as given. Directories contribute their `*.sql` entries
/// (not recursively) sorted by file name, so timestamp-prefixed migrations
/// run in chronological order. A path reached twice is read once, at its
/// first position.
///
/// # Errors
///
/// Returns [`MigrateError::Io`] if a path cannot be listed or read and
/// [`MigrateError::NoMigrations`] for a directory without `.sql` files.
pub fn collect_migrations<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<MigrationFile>, MigrateError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for path in paths {
        let path = path.as_ref();
        for file in expand(path)? {
            let key = file.canonicalize().unwrap_or_else(|_| file.clone());
            if !seen.insert(key) {
                tracing::debug!(path = %file.display(), "skipping duplicate migration path");
                continue;
            }
            let sql = std::fs::read_to_string(&file).map_err(|source| MigrateError::Io {
                path: file.clone(),
                source,
            })?;
            files.push(MigrationFile { path: file, sql });
        }
    }

    Ok(files)
}

fn expand(path: &Path) -> Result<Vec<PathBuf>, MigrateError> {
    let io = |source| MigrateError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = std::fs::metadata(path).map_err(io)?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io)? {
        let entry_path = entry.map_err(io)?.path();
        let is_sql = entry_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if is_sql && entry_path.is_file() {
            entries.push(entry_path);
        }
    }
    if entries.is_empty() {
        return Err(MigrateError::NoMigrations {
            path: path.to_path_buf(),
        });
    }
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, sql: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, sql).unwrap();
        path
    }

    fn names(files: &[MigrationFile]) -> Vec<String> {
        files.iter().map(MigrationFile::name).collect()
    }

    #[test]
    fn directory_is_sorted_by_name_and_filtered() {
        let dir = TempDir::new().unwrap();
        write(&dir, "20240102_sales.sql", "SELECT 2;");
        write(&dir, "20240101_brands.sql", "SELECT 1;");
        write(&dir, "README.md", "# notes");
        std::fs::create_dir(dir.path().join("nested.sql")).unwrap();

        let files = collect_migrations(&[dir.path()]).unwrap();

        assert_eq!(names(&files), vec!["20240101_brands.sql", "20240102_sales.sql"]);
        assert_eq!(files[0].sql, "SELECT 1;");
    }

    #[test]
    fn explicit_files_keep_given_order_and_extension() {
        let dir = TempDir::new().unwrap();
        let b = write(&dir, "b.sql", "");
        let a = write(&dir, "a.txt", "SELECT 1;");

        let files = collect_migrations(&[&b, &a]).unwrap();

        assert_eq!(names(&files), vec!["b.sql", "a.txt"]);
    }

    #[test]
    fn duplicates_are_read_once() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.sql", "SELECT 1;");
        write(&dir, "b.sql", "SELECT 2;");

        let files = collect_migrations(&[a.clone(), dir.path().to_path_buf(), a]).unwrap();

        assert_eq!(names(&files), vec!["a.sql", "b.sql"]);
    }

    #[test]
    fn missing_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = collect_migrations(&[dir.path().join("nope.sql")]).unwrap_err();
        assert!(matches!(err, MigrateError::Io { ref path, .. } if path.ends_with("nope.sql")));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = collect_migrations(&[dir.path()]).unwrap_err();
        assert!(matches!(err, MigrateError::NoMigrations { .. }));
    }
}
