use std::io::Error as IoError;
use std::path::PathBuf;
use thiserror::Error;
use toml::de::Error as TomlError;

#[derive(Error, Debug)]
pub enum IOEntry {
    #[error("Failed to create directory {}: {1}", .0.display())]
    CreateDirectoryError(PathBuf, IoError),
    #[error("Failed to delete directory {}: {1}", .0.display())]
    DeleteDirectoryError(PathBuf, IoError),
    #[error("Failed to read file {}: {1}", .0.display())]
    ReadFileError(PathBuf, IoError),
    #[error("Failed to parse TOML file {}: {1}", .0.display())]
    TomlDeserializeError(PathBuf, TomlError),
}

impl From<IOEntry> for String {
    #[inline(always)]
    fn from(value: IOEntry) -> Self {
        value.to_string()
    }
}
