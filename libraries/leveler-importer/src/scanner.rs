//! File scanning for the input tree
//!
//! Every regular file is returned; deciding what is audio is left to the
//! decoder. Symbolic links to files are returned even when links are not
//! followed; only linked directories are left unvisited.

use crate::{ImportError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files found under a root, plus entries that could not be read
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Regular files, sorted by path
    pub files: Vec<PathBuf>,
    /// Entries the walk could not read (permissions, broken links)
    pub errors: Vec<ImportError>,
}

/// Recursive scanner for input files
#[derive(Debug, Clone, Copy, Default)]
pub struct FileScanner {
    /// Whether to follow symbolic links
    follow_links: bool,

    /// Maximum depth to traverse (None for unlimited)
    max_depth: Option<usize>,
}

impl FileScanner {
    /// Create a new file scanner
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Scan a directory for files
    ///
    /// Directories themselves are never returned. Entries are visited in
    /// file-name order so that runs over the same tree are deterministic.
    pub fn scan_directory(&self, path: &Path) -> Result<ScanOutcome> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        if !path.is_dir() {
            return Err(ImportError::InvalidPath(format!(
                "{} is not a directory",
                path.display()
            )));
        }

        let mut walker = WalkDir::new(path)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut outcome = ScanOutcome::default();

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    outcome.files.push(entry.into_path());
                }
                // Not followed, so the entry type is the link's own;
                // `Path::is_file` resolves it
                Ok(entry) if entry.path_is_symlink() && entry.path().is_file() => {
                    outcome.files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Failed to read entry during scan: {}", e);
                    outcome.errors.push(e.into());
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_returns_every_file() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("song1.wav"), b"fake wav").unwrap();
        fs::write(base.join("readme.txt"), b"not audio").unwrap();
        fs::write(base.join("no_extension"), b"???").unwrap();

        let subdir = base.join("subdir").join("deeper");
        fs::create_dir_all(&subdir).unwrap();
        fs::write(subdir.join("song2.wav"), b"fake wav").unwrap();

        let outcome = FileScanner::new().scan_directory(base).unwrap();

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.files.len(), 4);
        assert!(outcome.files.iter().all(|p| p.is_file()));
        assert!(outcome.files.iter().any(|p| p.ends_with("readme.txt")));
        assert!(outcome.files.iter().any(|p| p.ends_with("subdir/deeper/song2.wav")));
    }

    #[test]
    fn test_scan_order_is_sorted() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        for name in ["c.wav", "a.wav", "b.wav"] {
            fs::write(base.join(name), b"x").unwrap();
        }

        let outcome = FileScanner::new().scan_directory(base).unwrap();
        let names: Vec<_> = outcome
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.wav", "c.wav"]);
    }

    #[test]
    fn test_scan_with_max_depth() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("top.wav"), b"x").unwrap();
        fs::create_dir(base.join("subdir")).unwrap();
        fs::write(base.join("subdir").join("nested.wav"), b"x").unwrap();

        let outcome = FileScanner::new().max_depth(1).scan_directory(base).unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0].ends_with("top.wav"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_returns_linked_files_without_following_linked_dirs() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let elsewhere = temp.path().join("elsewhere");
        let base = temp.path().join("root");
        fs::create_dir_all(elsewhere.join("dir")).unwrap();
        fs::create_dir_all(&base).unwrap();
        fs::write(elsewhere.join("notes.txt"), b"linked").unwrap();
        fs::write(elsewhere.join("dir").join("hidden.wav"), b"x").unwrap();
        fs::write(base.join("real.wav"), b"x").unwrap();

        symlink(elsewhere.join("notes.txt"), base.join("notes.txt")).unwrap();
        symlink(elsewhere.join("dir"), base.join("linked_dir")).unwrap();
        symlink(elsewhere.join("gone.txt"), base.join("dangling.txt")).unwrap();

        let outcome = FileScanner::new().scan_directory(&base).unwrap();
        let names: Vec<_> = outcome
            .files
            .iter()
            .map(|p| p.strip_prefix(&base).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("notes.txt"), PathBuf::from("real.wav")]);

        let followed = FileScanner::new()
            .follow_links(true)
            .scan_directory(&base)
            .unwrap();
        assert!(followed
            .files
            .iter()
            .any(|p| p.ends_with("linked_dir/hidden.wav")));
    }

    #[test]
    fn test_scan_rejects_missing_and_file_roots() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            FileScanner::new().scan_directory(&temp.path().join("missing")),
            Err(ImportError::FileNotFound(_))
        ));
        assert!(matches!(
            FileScanner::new().scan_directory(&file),
            Err(ImportError::InvalidPath(_))
        ));
    }
}
