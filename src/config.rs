use crate::error::{InventoryError, Result};
use crate::record::RecordLayout;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const SHEET_NAME_MAX: usize = 31;
const SHEET_NAME_FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Application settings. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub source: SourceConfig,
    pub sink: SinkConfig,
    pub export: ExportConfig,
    pub record_layout: RecordLayout,
    pub bind_addr: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
    /// Worksheet read from `.xlsx` sources.
    pub worksheet: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub sheet_name: String,
    pub file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            title: "Inventário de Equipamentos".to_string(),
            source: SourceConfig::default(),
            sink: SinkConfig::default(),
            export: ExportConfig::default(),
            record_layout: RecordLayout::default(),
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            path: PathBuf::from("data/equipamentos.csv"),
            worksheet: Some("Modelo Árvore de Ativos".to_string()),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            path: PathBuf::from("data/equipamentos.csv"),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            sheet_name: "Equipamentos".to_string(),
            file_name: "equipamentos_filtrados.xlsx".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| config_error(path, e))?;
        let config: AppConfig = serde_json::from_str(&text).map_err(|e| config_error(path, e))?;
        config.validate().map_err(|message| config_error(path, message))?;
        Ok(config)
    }

    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks the record layout and the export sheet name.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let layout = &self.record_layout;
        if layout.fields.is_empty() {
            return Err(format!("record layout '{}' has no fields", layout.name));
        }
        let mut seen = HashSet::new();
        for field in &layout.fields {
            if field.trim().is_empty() {
                return Err(format!("record layout '{}' has an empty field name", layout.name));
            }
            if !seen.insert(field.as_str()) {
                return Err(format!(
                    "record layout '{}' lists field '{}' twice",
                    layout.name, field
                ));
            }
        }

        let sheet = &self.export.sheet_name;
        if sheet.is_empty() {
            return Err("export sheet name is empty".to_string());
        }
        if sheet.chars().count() > SHEET_NAME_MAX {
            return Err(format!(
                "export sheet name '{}' is longer than {} characters",
                sheet, SHEET_NAME_MAX
            ));
        }
        if let Some(c) = sheet.chars().find(|c| SHEET_NAME_FORBIDDEN.contains(c)) {
            return Err(format!("export sheet name '{}' contains '{}'", sheet, c));
        }
        Ok(())
    }
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> InventoryError {
    InventoryError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
