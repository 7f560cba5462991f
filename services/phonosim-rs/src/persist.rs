//! Output locations and atomic file replacement.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PhonosimError, Result};

/// Where a language's artifacts live inside the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<language>.json`
    pub fn classes_path(&self, language: &str) -> PathBuf {
        self.dir.join(format!("{language}.json"))
    }

    /// `<dir>/<language>_similarity_matrix.csv`
    pub fn matrix_path(&self, language: &str) -> PathBuf {
        self.dir.join(format!("{language}_similarity_matrix.csv"))
    }
}

/// Write `contents` to a sibling temp file, then rename it over `path`.
///
/// Readers never observe a partially written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PhonosimError::io(parent, e))?;
    }

    let temp = temp_path(path);
    fs::write(&temp, contents).map_err(|e| PhonosimError::io(&temp, e))?;
    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        PhonosimError::io(path, e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("output");
        assert_eq!(layout.classes_path("maltese"), Path::new("output/maltese.json"));
        assert_eq!(
            layout.matrix_path("maltese"),
            Path::new("output/maltese_similarity_matrix.csv")
        );
    }

    #[test]
    fn test_write_atomic_creates_dirs_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path(&path).exists());
    }
}
