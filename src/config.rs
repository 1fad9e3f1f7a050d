use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::EntityKind;
use crate::grid::GridConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where the entity collections live
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub users: PathBuf,
    pub posts: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            users: PathBuf::from("users.json"),
            posts: PathBuf::from("posts.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub grid: GridConfig,
    pub data: DataPaths,
    pub theme: String,
    pub start_tab: EntityKind,
    pub read_only: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            data: DataPaths::default(),
            theme: "light".to_string(),
            start_tab: EntityKind::Post,
            read_only: false,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn data_path(&self, kind: EntityKind) -> &Path {
        match kind {
            EntityKind::User => &self.data.users,
            EntityKind::Post => &self.data.posts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.grid.page_size, 10);
        assert!(config.grid.searchable && config.grid.sortable);
        assert_eq!(config.start_tab, EntityKind::Post);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            theme = "dark"
            start_tab = "user"

            [grid]
            page_size = 25
            sortable = false

            [data]
            posts = "data/posts.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.theme, "dark");
        assert_eq!(config.start_tab, EntityKind::User);
        assert_eq!(config.grid.page_size, 25);
        assert!(config.grid.searchable);
        assert!(!config.grid.sortable);
        assert_eq!(config.data_path(EntityKind::Post), Path::new("data/posts.csv"));
        assert_eq!(config.data_path(EntityKind::User), Path::new("users.json"));
    }

    #[test]
    fn bad_values_are_parse_errors() {
        let err = AppConfig::from_toml_str("[grid]\npage_size = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read config file"));
    }
}
