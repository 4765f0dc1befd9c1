//! Registry of podcast apps, used for boost icons and links.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ICON_URL_BASE: &str = "/image?name=";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppInfo {
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppLoadError {
    #[error("Failed to read app registry from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid app registry: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Apps keyed by lowercase name.
#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    apps: HashMap<String, AppInfo>,
}

impl AppRegistry {
    pub fn new(apps: HashMap<String, AppInfo>) -> Self {
        let apps = apps
            .into_iter()
            .map(|(name, info)| (name.to_lowercase(), info))
            .collect();
        Self { apps }
    }

    pub fn from_json(json: &str) -> Result<Self, AppLoadError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AppLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn get(&self, app: &str) -> Option<&AppInfo> {
        self.apps.get(&app.to_lowercase())
    }

    pub fn icon_url(&self, app: &str) -> String {
        let icon = self
            .get(app)
            .and_then(|info| info.icon.as_deref())
            .unwrap_or("unknown");
        format!("{}{}", ICON_URL_BASE, icon)
    }

    pub fn href(&self, app: &str) -> String {
        self.get(app)
            .and_then(|info| info.url.clone())
            .unwrap_or_else(|| "#".to_string())
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AppRegistry {
        AppRegistry::from_json(
            r#"{
                "Fountain": {"icon": "fountain", "url": "https://fountain.fm"},
                "castamatic": {"icon": "castamatic"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let apps = registry();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps.icon_url("FOUNTAIN"), "/image?name=fountain");
        assert_eq!(apps.href("fountain"), "https://fountain.fm");
    }

    #[test]
    fn test_missing_url_and_unknown_app() {
        let apps = registry();
        assert_eq!(apps.href("Castamatic"), "#");
        assert_eq!(apps.icon_url("Breez"), "/image?name=unknown");
        assert_eq!(apps.href("Breez"), "#");
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppRegistry::load("/nonexistent/apps.json").unwrap_err();
        assert!(matches!(err, AppLoadError::Io { .. }));
    }
}
