use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum FileExtensionError {
    #[error("Failed to get file extension")]
    MissingFileExtension,
    #[error("Unsupported file extension for file: {0}")]
    UnsupportedFileExtension(String),
}

pub type FileFormatResult<T> = Result<T, FileExtensionError>;

#[derive(Debug, thiserror::Error)]
pub enum SerdeFormatError {
    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

pub type SerdeFormatResult<T> = Result<T, SerdeFormatError>;

pub fn get_file_extension(filename: &str) -> Option<&str> {
    Path::new(filename)
        .extension()
        .and_then(|os_str| os_str.to_str())
}

/// Text formats accepted for configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerdeFormat {
    Yaml,
    Json,
}

impl SerdeFormat {
    pub fn from_file_name(file_name: &str) -> FileFormatResult<Self> {
        let ext = get_file_extension(file_name).ok_or(FileExtensionError::MissingFileExtension)?;

        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Ok(Self::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(FileExtensionError::UnsupportedFileExtension(
                file_name.to_string(),
            ))
        }
    }
}

pub fn serialize<T: Serialize>(value: &T, format: SerdeFormat) -> SerdeFormatResult<String> {
    match format {
        SerdeFormat::Yaml => Ok(serde_yml::to_string(value)?),
        SerdeFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}

pub fn deserialize<T: DeserializeOwned>(
    serialized: &str,
    format: SerdeFormat,
) -> SerdeFormatResult<T> {
    match format {
        SerdeFormat::Yaml => Ok(serde_yml::from_str(serialized)?),
        SerdeFormat::Json => Ok(serde_json::from_str(serialized)?),
    }
}

/// Reads a YAML or JSON file, picking the format from its extension.
pub fn read_config_file<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file_name = path.to_string_lossy();
    let format = SerdeFormat::from_file_name(&file_name)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    deserialize(&text, format)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
