use std::collections::HashMap;

use serde::{Deserialize, Serialize};

fn default_name() -> String {
    "Assetshelf".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_level() -> String {
    "info".to_string()
}

/// Either a single search path or a list of them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SearchPaths {
    One(String),
    Many(Vec<String>),
}

impl Default for SearchPaths {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl SearchPaths {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SearchPaths::One(v) => vec![v],
            SearchPaths::Many(v) => v,
        }
    }
}

impl From<&str> for SearchPaths {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<String>> for SearchPaths {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

/// Options for an [`crate::resolver::AssetResolver`].
///
/// Every field is optional; a missing or invalid value disables the
/// corresponding feature instead of failing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetsConfig {
    #[serde(default)]
    pub paths: SearchPaths,
    #[serde(default)]
    pub web_dir: Option<String>,
    #[serde(default)]
    pub mime_types: HashMap<String, String>,
}

impl AssetsConfig {
    pub fn with_paths(mut self, paths: impl Into<SearchPaths>) -> Self {
        self.paths = paths.into();
        self
    }

    pub fn with_web_dir(mut self, web_dir: impl Into<String>) -> Self {
        self.web_dir = Some(web_dir.into());
        self
    }

    pub fn with_mime_type(mut self, extension: &str, mime_type: &str) -> Self {
        self.mime_types
            .insert(extension.to_string(), mime_type.to_string());
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfigGeneral {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfigGeneral {
    fn default() -> Self {
        Self {
            name: default_name(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfigLogging {
    #[serde(default = "default_level")]
    pub level: String,
    pub file: Option<String>,
}

impl Default for ServerConfigLogging {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

impl ServerConfigLogging {
    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default)]
    pub general: ServerConfigGeneral,
    #[serde(default)]
    pub logging: ServerConfigLogging,
    #[serde(default)]
    pub assets: AssetsConfig,
}
