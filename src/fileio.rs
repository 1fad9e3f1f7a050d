use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Detected file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Csv,
    Tsv,
}

impl FileFormat {
    /// Detect format from file extension
    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(FileFormat::Json),
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            _ => None,
        }
    }

    /// Get the delimiter for CSV-like formats
    fn delimiter(&self) -> Option<u8> {
        match self {
            FileFormat::Csv => Some(b','),
            FileFormat::Tsv => Some(b'\t'),
            FileFormat::Json => None,
        }
    }
}

/// Result of loading a file, including any warnings
pub struct LoadResult<T> {
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

/// Reads and writes one entity collection
#[derive(Debug, Clone)]
pub struct FileIO {
    pub file_path: PathBuf,
    format: FileFormat,
}

impl FileIO {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        // Default to JSON for unknown extensions
        let format = FileFormat::from_extension(&file_path).unwrap_or(FileFormat::Json);
        Self { file_path, format }
    }

    pub fn file_name(&self) -> String {
        self.file_path.display().to_string()
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load all records. A missing file is an empty collection plus a warning.
    pub fn load<T: DeserializeOwned>(&self) -> Result<LoadResult<T>, FileError> {
        if !self.file_path.exists() {
            return Ok(LoadResult {
                items: Vec::new(),
                warnings: vec![format!("New file: {}", self.file_path.display())],
            });
        }

        let items = match self.format.delimiter() {
            Some(delim) => self.read_csv(delim)?,
            None => self.read_json()?,
        };
        debug!(path = %self.file_path.display(), count = items.len(), "loaded records");

        Ok(LoadResult { items, warnings: Vec::new() })
    }

    /// Write all records, replacing the file
    pub fn write<T: Serialize>(&self, items: &[T]) -> Result<(), FileError> {
        match self.format.delimiter() {
            Some(delim) => self.write_csv(items, delim),
            None => self.write_json(items),
        }
    }

    // === JSON ===

    fn read_json<T: DeserializeOwned>(&self) -> Result<Vec<T>, FileError> {
        let reader = BufReader::new(File::open(&self.file_path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_json<T: Serialize>(&self, items: &[T]) -> Result<(), FileError> {
        let mut writer = BufWriter::new(File::create(&self.file_path)?);
        serde_json::to_writer_pretty(&mut writer, items)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    // === CSV/TSV ===

    fn read_csv<T: DeserializeOwned>(&self, delim: u8) -> Result<Vec<T>, FileError> {
        let reader = BufReader::with_capacity(1 << 20, File::open(&self.file_path)?);
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(true)
            .trim(csv::Trim::Fields)
            .from_reader(reader);

        let mut items = Vec::new();
        for row in csv_reader.deserialize() {
            items.push(row?);
        }
        Ok(items)
    }

    fn write_csv<T: Serialize>(&self, items: &[T], delim: u8) -> Result<(), FileError> {
        let file = File::create(&self.file_path)?;
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(delim)
            .from_writer(BufWriter::new(file));

        for item in items {
            csv_writer.serialize(item)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Post, PostStatus, User, UserRole, UserStatus};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension(Path::new("a.json")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension(Path::new("a.CSV")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_extension(Path::new("a.tsv")), Some(FileFormat::Tsv));
        assert_eq!(FileFormat::from_extension(Path::new("a.txt")), None);
        assert_eq!(FileIO::new("data").format(), FileFormat::Json);
    }

    #[test]
    fn test_missing_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let file_io = FileIO::new(dir.path().join("users.json"));
        let result: LoadResult<User> = file_io.load().unwrap();
        assert!(result.items.is_empty());
        assert!(result.warnings[0].contains("New file"));
    }

    #[test]
    fn test_csv_users_with_empty_last_login() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "id,username,email,role,status,createdAt,lastLogin").unwrap();
        writeln!(file, "1,kim,kim@example.com,admin,active,2024-01-01,2024-03-01").unwrap();
        writeln!(file, "2,lee,lee@example.com,user,suspended,2024-01-02,").unwrap();

        let file_io = FileIO::new(file.path());
        let result: LoadResult<User> = file_io.load().unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].role, UserRole::Admin);
        assert_eq!(result.items[0].last_login.as_deref(), Some("2024-03-01"));
        assert_eq!(result.items[1].status, UserStatus::Suspended);
        assert_eq!(result.items[1].last_login, None);
    }

    #[test]
    fn test_json_write_then_load() {
        let file = NamedTempFile::with_suffix(".json").unwrap();
        let file_io = FileIO::new(file.path());
        let posts = vec![Post {
            id: 9,
            title: "Grid".to_string(),
            content: String::new(),
            author: "park".to_string(),
            category: crate::domain::PostCategory::Development,
            status: PostStatus::Draft,
            views: 12,
            created_at: "2024-05-05".to_string(),
        }];

        file_io.write(&posts).unwrap();
        let loaded: LoadResult<Post> = file_io.load().unwrap();
        assert_eq!(loaded.items, posts);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, "{{not json").unwrap();
        let result = FileIO::new(file.path()).load::<User>();
        assert!(matches!(result, Err(FileError::Json(_))));
    }
}
