use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Engine tuning knobs shared by the session and the view adapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    pub pagination: PaginationConfig,
    pub viewport: ViewportConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_per_page: i64,
    pub max_per_page: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Level-1 items visible at once in the desktop bar
    pub desktop_bar_width: usize,
    /// Level-1 items per swipe page in the mobile bar
    pub mobile_page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_ms: u64,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            viewport: ViewportConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: 24,
            max_per_page: 96,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            desktop_bar_width: 10,
            mobile_page_size: 8,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl BrowseConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.fetch.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowseConfig::default();
        assert_eq!(config.pagination.default_per_page, 24);
        assert_eq!(config.viewport.mobile_page_size, 8);
        assert_eq!(config.fetch_timeout(), std::time::Duration::from_millis(5000));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: BrowseConfig =
            serde_json::from_str(r#"{"viewport": {"mobile_page_size": 4}}"#).unwrap();
        assert_eq!(config.viewport.mobile_page_size, 4);
        assert_eq!(config.viewport.desktop_bar_width, 10);
        assert_eq!(config.pagination.default_per_page, 24);
    }
}
