use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::BreakthroughError;

/// Where charts are written and how existing files are treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub overwrite: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("images"),
            file_prefix: String::new(),
            overwrite: true,
        }
    }
}

impl OutputOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory charts are written to.
    pub fn directory(&mut self, directory: impl Into<PathBuf>) -> &mut Self {
        self.directory = directory.into();
        self
    }

    /// Sets a prefix prepended to every chart file name.
    pub fn file_prefix(&mut self, file_prefix: impl Into<String>) -> &mut Self {
        self.file_prefix = file_prefix.into();
        self
    }

    /// Whether existing chart files may be replaced.
    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    /// `directory/{file_prefix}{name}`
    #[must_use]
    pub fn chart_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}{name}", self.file_prefix))
    }
}

/// Checks that `path` can receive a chart. The parent directory must already exist.
///
/// # Errors
///
/// - `BreakthroughError::OutputPathError` if the path does not end in `.png`, or if the file
///   exists and `overwrite` is false.
/// - `BreakthroughError::PathIoError` naming `path` if its parent is missing or not a directory.
pub fn validate_chart_path(path: &Path, overwrite: bool) -> Result<(), BreakthroughError> {
    match path.extension().and_then(OsStr::to_str) {
        Some(extension) if extension.eq_ignore_ascii_case("png") => {}
        _ => {
            return Err(BreakthroughError::OutputPathError(format!(
                "chart output files must be PNGs: {}",
                path.display()
            )));
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(BreakthroughError::with_path(
                path,
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("output directory {} does not exist", parent.display()),
                ),
            ));
        }
    }
    if !overwrite && path.exists() {
        return Err(BreakthroughError::OutputPathError(format!(
            "chart output file already exists: {}",
            path.display()
        )));
    }
    debug!("validated chart path {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_write_to_images() {
        let options = OutputOptions::default();
        assert_eq!(options.directory, PathBuf::from("images"));
        assert!(options.file_prefix.is_empty());
        assert!(options.overwrite);
        assert_eq!(
            options.chart_path("B_vs_V_forE.png"),
            PathBuf::from("images/B_vs_V_forE.png")
        );
    }

    #[test]
    fn prefix_and_directory() {
        let mut options = OutputOptions::new();
        options.directory("out").file_prefix("run1_");
        assert_eq!(
            options.chart_path("E_vs_V_forB.png"),
            PathBuf::from("out/run1_E_vs_V_forB.png")
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("chart.png");
        match validate_chart_path(&path, true) {
            Err(BreakthroughError::PathIoError {
                path: reported,
                source,
            }) => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected an I/O error naming the chart, got {other:?}"),
        }
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn existing_directory_is_accepted() {
        let dir = tempdir().unwrap();
        assert!(validate_chart_path(&dir.path().join("chart.png"), false).is_ok());
    }

    #[test]
    fn rejects_other_extensions() {
        let dir = tempdir().unwrap();
        for name in ["chart.csv", "chart"] {
            let result = validate_chart_path(&dir.path().join(name), true);
            assert!(matches!(result, Err(BreakthroughError::OutputPathError(_))));
        }
    }

    #[test]
    fn existing_file_respects_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.png");
        fs::write(&path, b"old").unwrap();
        assert!(validate_chart_path(&path, true).is_ok());
        assert!(matches!(
            validate_chart_path(&path, false),
            Err(BreakthroughError::OutputPathError(_))
        ));
    }

    #[test]
    fn unusable_parent_names_the_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let chart = blocker.join("chart.png");
        match validate_chart_path(&chart, true) {
            Err(BreakthroughError::PathIoError { path, .. }) => assert_eq!(path, chart),
            other => panic!("expected an I/O error naming the chart, got {other:?}"),
        }
    }
}
