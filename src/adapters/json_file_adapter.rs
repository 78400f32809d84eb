//! Filesystem-backed dataset source and export sink.

use crate::domain::error::CotError;
use crate::ports::dataset_port::DatasetSource;
use crate::ports::export_port::ExportSink;
use std::fs;
use std::path::PathBuf;

/// Reads the startup document from a file.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DatasetSource for JsonFileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<String, CotError> {
        fs::read_to_string(&self.path).map_err(|e| CotError::Load {
            location: self.location(),
            reason: e.to_string(),
        })
    }
}

/// Writes exported documents into a directory, like a browser download
/// folder. An existing file with the same name is overwritten.
pub struct DirectoryExportSink {
    dir: PathBuf,
}

impl DirectoryExportSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ExportSink for DirectoryExportSink {
    fn deliver(&self, filename: &str, contents: &str) -> Result<String, CotError> {
        let path = self.dir.join(filename);
        fs::write(&path, contents).map_err(|e| CotError::Export {
            target: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(path.display().to_string())
    }
}

/// Writes to one exact path regardless of the suggested filename.
pub struct FileExportSink {
    path: PathBuf,
}

impl FileExportSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ExportSink for FileExportSink {
    fn deliver(&self, _filename: &str, contents: &str) -> Result<String, CotError> {
        fs::write(&self.path, contents).map_err(|e| CotError::Export {
            target: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::export::export_dataset;
    use crate::domain::loader::load_dataset;
    use crate::domain::sample::initial_dataset;
    use tempfile::TempDir;

    #[test]
    fn fetch_reads_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "[]").unwrap();

        let source = JsonFileSource::new(path);
        assert_eq!(source.fetch().unwrap(), "[]");
    }

    #[test]
    fn fetch_missing_file_is_load_error() {
        let source = JsonFileSource::new(PathBuf::from("/nonexistent/data.json"));
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, CotError::Load { .. }));
    }

    #[test]
    fn missing_file_loads_builtin_dataset() {
        let source = JsonFileSource::new(PathBuf::from("/nonexistent/data.json"));
        assert_eq!(load_dataset(&source), initial_dataset());
    }

    #[test]
    fn directory_sink_writes_named_file() {
        let dir = TempDir::new().unwrap();
        let sink = DirectoryExportSink::new(dir.path().to_path_buf());

        let where_ = export_dataset(&initial_dataset(), &sink).unwrap();
        assert!(where_.ends_with("data.json"));

        let written = fs::read_to_string(dir.path().join("data.json")).unwrap();
        assert!(written.contains("GBPUSD"));
    }

    #[test]
    fn exported_file_loads_back() {
        let dir = TempDir::new().unwrap();
        let sink = DirectoryExportSink::new(dir.path().to_path_buf());
        export_dataset(&initial_dataset(), &sink).unwrap();

        let source = JsonFileSource::new(dir.path().join("data.json"));
        let ds = load_dataset(&source);
        assert_eq!(ds.pair("EURUSD").unwrap().data[0].id, "EURUSD-2025-01-14-0");
        assert_eq!(ds.record_count(), 3);
    }

    #[test]
    fn directory_sink_reports_unwritable_dir() {
        let sink = DirectoryExportSink::new(PathBuf::from("/nonexistent/dir"));
        let err = sink.deliver("data.json", "[]").unwrap_err();
        assert!(matches!(err, CotError::Export { .. }));
    }

    #[test]
    fn file_sink_ignores_suggested_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        FileExportSink::new(path.clone())
            .deliver("data.json", "[]")
            .unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }
}
