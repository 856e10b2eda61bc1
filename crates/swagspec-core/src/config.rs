//! Project configuration for contract runs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::request::HeaderCasing;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the server under test.
    ///
    /// Request paths already start with the document's base path (`basePath`,
    /// or the path of the first OpenAPI 3 server URL), so a `base_url` ending
    /// in that same path sends requests to `/v2/v2/...`.
    pub base_url: String,

    /// Seed documents: document key → local file.
    /// The key is also the output path under `output_dir`.
    #[serde(default)]
    pub documents: IndexMap<String, PathBuf>,

    /// Contract files to run
    #[serde(default)]
    pub contracts: Vec<PathBuf>,

    /// Where assembled documents are written (default: "swagger")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// HTTP headers sent with every request unless the request sets them
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Names used for Accept / Content-Type / Authorization
    #[serde(default)]
    pub header_casing: HeaderCasing,

    /// Log every built request at debug level
    #[serde(default)]
    pub debug: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("swagger")
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        let mut documents = IndexMap::new();
        documents.insert("v1/openapi.yaml".to_string(), PathBuf::from("openapi.yaml"));
        Self {
            base_url: "http://localhost:8080".to_string(),
            documents,
            contracts: Vec::new(),
            output_dir: default_output_dir(),
            headers: HashMap::new(),
            timeout_secs: default_timeout_secs(),
            header_casing: HeaderCasing::default(),
            debug: false,
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        let mut config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        config.anchor(path.parent().unwrap_or_else(|| Path::new("")));
        Ok(config)
    }

    /// Load from default location (.swagspec.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".swagspec.toml", ".swagspec.json", "swagspec.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Resolve relative file paths against the config file's directory.
    fn anchor(&mut self, base: &Path) {
        if base.as_os_str().is_empty() {
            return;
        }
        for path in self.documents.values_mut().chain(self.contracts.iter_mut()) {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# swagspec configuration

# Server under test. Request paths already include the document base path
# (basePath, or the path of servers[0].url), so stop at the host.
base_url = "http://localhost:8080"

# Contract files (YAML or JSON)
contracts = ["contracts/widgets.yaml"]

# Where `swagspec swaggerize` writes assembled documents
output_dir = "swagger"

# Request timeout in seconds
timeout_secs = 10

# Header names for Accept / Content-Type / Authorization:
# "canonical" (default) or "rack" (HTTP_ACCEPT, CONTENT_TYPE, HTTP_AUTHORIZATION)
# header_casing = "canonical"

# Log every built request (also enabled by --verbose)
# debug = true

# Seed documents: key (output path) = local file
[documents]
"v1/openapi.yaml" = "openapi.yaml"

# HTTP headers sent with every request
[headers]
# X-Client = "swagspec"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.output_dir, PathBuf::from("swagger"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.header_casing, HeaderCasing::Canonical);
        assert_eq!(
            config.documents.get("v1/openapi.yaml"),
            Some(&PathBuf::from("openapi.yaml"))
        );
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
base_url = "http://localhost:3000"
contracts = ["contracts/widgets.yaml", "contracts/users.yaml"]
header_casing = "rack"

[documents]
"v1/swagger.json" = "docs/v1.json"
"v2/openapi.yaml" = "docs/v2.yaml"

[headers]
X-Client = "tests"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.contracts.len(), 2);
        assert_eq!(config.header_casing, HeaderCasing::Rack);
        assert_eq!(
            config.documents.keys().collect::<Vec<_>>(),
            vec!["v1/swagger.json", "v2/openapi.yaml"]
        );
        assert_eq!(config.headers.get("X-Client"), Some(&"tests".to_string()));
        assert_eq!(config.output_dir, PathBuf::from("swagger"));
        assert!(!config.debug);
    }

    #[test]
    fn example_config_parses() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config.contracts, vec![PathBuf::from("contracts/widgets.yaml")]);
        assert_eq!(config.documents.len(), 1);
    }

    #[test]
    fn load_anchors_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swagspec.toml");
        std::fs::write(
            &path,
            r#"
base_url = "http://localhost:3000"
contracts = ["contracts/a.yaml"]

[documents]
"v1/openapi.json" = "openapi.json"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.contracts[0], dir.path().join("contracts/a.yaml"));
        assert_eq!(config.documents["v1/openapi.json"], dir.path().join("openapi.json"));
        assert_eq!(config.output_dir, dir.path().join("swagger"));
    }

    #[test]
    fn load_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".swagspec.json");
        std::fs::write(&path, r#"{"base_url": "http://api.test", "debug": true}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "http://api.test");
        assert!(config.debug);
        assert!(config.documents.is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/swagspec.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }
}
