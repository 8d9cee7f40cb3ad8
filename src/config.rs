use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

pub const DEFAULT_KEYRING_DIR: &str = "/usr/share/keyrings";
pub const DEFAULT_SOURCES_DIR: &str = "/etc/apt/sources.list.d";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tool-wide settings, optionally read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub keyring_dir: PathBuf,
    pub sources_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            keyring_dir: PathBuf::from(DEFAULT_KEYRING_DIR),
            sources_dir: PathBuf::from(DEFAULT_SOURCES_DIR),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("aptkey/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }
}

impl PathsConfig {
    /// Both directories must be absolute: the key path ends up verbatim in
    /// `Signed-By`, which apt resolves on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, path) in [
            ("keyring_dir", &self.keyring_dir),
            ("sources_dir", &self.sources_dir),
        ] {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath {
                    field,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    /// `<keyring_dir>/<name>.gpg`
    pub fn keyring_path(&self, name: &str) -> PathBuf {
        self.keyring_dir.join(format!("{}.gpg", name))
    }

    /// `<sources_dir>/<name>.sources`
    pub fn sources_path(&self, name: &str) -> PathBuf {
        self.sources_dir.join(format!("{}.sources", name))
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading settings from {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path` when given, otherwise falls back to the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Entry of the deb822 `Types` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceType {
    Deb,
    DebSrc,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Deb => "deb",
            SourceType::DebSrc => "deb-src",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One repository to add. Construct through [`SourceConfig::new`] so the
/// name and URL are validated before anything touches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    name: String,
    types: Vec<SourceType>,
    gpg_url: Url,
    repo_uri: String,
    suite: String,
    components: Vec<String>,
}

impl SourceConfig {
    pub fn new(
        name: impl Into<String>,
        types: Vec<SourceType>,
        gpg_url: &str,
        repo_uri: impl Into<String>,
        suite: impl Into<String>,
        components: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        validate_name(&name)?;

        if types.is_empty() {
            return Err(ConfigError::Empty("type"));
        }
        if components.is_empty() {
            return Err(ConfigError::Empty("component"));
        }

        let repo_uri = repo_uri.into();
        let suite = suite.into();
        validate_field("uri", &repo_uri, false)?;
        validate_field("suite", &suite, false)?;
        for component in &components {
            validate_field("component", component, true)?;
        }

        Ok(Self {
            name,
            types,
            gpg_url: parse_key_url(gpg_url)?,
            repo_uri,
            suite,
            components,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[SourceType] {
        &self.types
    }

    pub fn gpg_url(&self) -> &Url {
        &self.gpg_url
    }

    pub fn repo_uri(&self) -> &str {
        &self.repo_uri
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }
}

// apt silently skips sources.list.d entries whose names fall outside this set.
fn validate_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('.') {
        return Err(invalid("name must not start with '.'"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid("only ASCII letters, digits, '_', '-' and '.' are allowed"));
    }
    Ok(())
}

// Values land in a deb822 stanza: a line break would start a new field, and a
// list entry containing whitespace would split into two.
fn validate_field(
    field: &'static str,
    value: &str,
    single_word: bool,
) -> Result<(), ConfigError> {
    let rejected = value.trim().is_empty()
        || value.contains(['\n', '\r'])
        || (single_word && value.contains(char::is_whitespace));
    if rejected {
        return Err(ConfigError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn parse_key_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn source(name: &str) -> Result<SourceConfig, ConfigError> {
        SourceConfig::new(
            name,
            vec![SourceType::Deb],
            "https://example.com/key.asc",
            "https://deb.example.com",
            "stable",
            vec!["main".to_string()],
        )
    }

    #[test]
    fn test_default_paths() {
        let paths = PathsConfig::default();
        assert_eq!(
            paths.keyring_path("example"),
            PathBuf::from("/usr/share/keyrings/example.gpg")
        );
        assert_eq!(
            paths.sources_path("example"),
            PathBuf::from("/etc/apt/sources.list.d/example.sources")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
[paths]
keyring_dir = "/tmp/keys"

[http]
timeout_secs = 5
"#,
        )
        .unwrap();

        assert_eq!(settings.paths.keyring_dir, PathBuf::from("/tmp/keys"));
        assert_eq!(settings.paths.sources_dir, PathBuf::from(DEFAULT_SOURCES_DIR));
        assert_eq!(settings.http.timeout().unwrap(), Duration::from_secs(5));
        assert!(settings.http.user_agent.starts_with("aptkey/"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[paths]\nsources_dir = \"/srv/sources\"\n").unwrap();

        let settings = Settings::load_or_default(Some(&path)).unwrap();
        assert_eq!(settings.paths.sources_dir, PathBuf::from("/srv/sources"));
        assert_eq!(settings.paths.keyring_dir, PathBuf::from(DEFAULT_KEYRING_DIR));
    }

    #[test]
    fn test_load_missing_and_malformed_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            Settings::load(&missing),
            Err(ConfigError::Read { .. })
        ));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[http]\ntimeout_secs = \"soon\"\n").unwrap();
        assert!(matches!(
            Settings::load(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let http = HttpConfig {
            timeout_secs: 0,
            ..HttpConfig::default()
        };
        assert!(matches!(http.timeout(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_valid_names() {
        for name in ["example", "docker-ce", "vendor_repo", "node.v20"] {
            assert!(source(name).is_ok(), "{} should be accepted", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", ".hidden", "../etc/passwd", "a/b", "space name", "tab\tname"] {
            assert!(
                matches!(source(name), Err(ConfigError::InvalidName { .. })),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_key_url_must_be_http() {
        let result = SourceConfig::new(
            "example",
            vec![SourceType::Deb],
            "file:///etc/passwd",
            "https://deb.example.com",
            "stable",
            vec!["main".to_string()],
        );
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));

        let result = SourceConfig::new(
            "example",
            vec![SourceType::Deb],
            "not a url",
            "https://deb.example.com",
            "stable",
            vec!["main".to_string()],
        );
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_empty_lists_rejected() {
        let no_types = SourceConfig::new(
            "example",
            vec![],
            "https://example.com/key.asc",
            "https://deb.example.com",
            "stable",
            vec!["main".to_string()],
        );
        assert!(matches!(no_types, Err(ConfigError::Empty("type"))));

        let no_components = SourceConfig::new(
            "example",
            vec![SourceType::Deb],
            "https://example.com/key.asc",
            "https://deb.example.com",
            "stable",
            vec![],
        );
        assert!(matches!(no_components, Err(ConfigError::Empty("component"))));
    }

    #[test]
    fn test_source_type_names() {
        assert_eq!(SourceType::Deb.to_string(), "deb");
        assert_eq!(SourceType::DebSrc.to_string(), "deb-src");
    }

    #[test]
    fn test_relative_dirs_rejected() {
        assert!(PathsConfig::default().validate().is_ok());

        let paths = PathsConfig {
            keyring_dir: PathBuf::from("keys"),
            ..PathsConfig::default()
        };
        assert!(matches!(
            paths.validate(),
            Err(ConfigError::RelativePath {
                field: "keyring_dir",
                ..
            })
        ));

        let paths = PathsConfig {
            sources_dir: PathBuf::from("./sources.list.d"),
            ..PathsConfig::default()
        };
        assert!(matches!(
            paths.validate(),
            Err(ConfigError::RelativePath {
                field: "sources_dir",
                ..
            })
        ));
    }

    fn stanza_fields(
        uri: &str,
        suite: &str,
        components: &[&str],
    ) -> Result<SourceConfig, ConfigError> {
        SourceConfig::new(
            "example",
            vec![SourceType::Deb],
            "https://example.com/key.asc",
            uri,
            suite,
            components.iter().map(|c| c.to_string()).collect(),
        )
    }

    #[test]
    fn test_stanza_fields_checked_up_front() {
        assert!(matches!(
            stanza_fields("https://deb.example.com", "stable\nbad", &["main"]),
            Err(ConfigError::InvalidField { field: "suite", .. })
        ));
        assert!(matches!(
            stanza_fields("", "stable", &["main"]),
            Err(ConfigError::InvalidField { field: "uri", .. })
        ));
        assert!(matches!(
            stanza_fields("https://deb.example.com\r\nSigned-By: /tmp/x", "stable", &["main"]),
            Err(ConfigError::InvalidField { field: "uri", .. })
        ));
        assert!(matches!(
            stanza_fields("https://deb.example.com", "stable", &["main", "non free"]),
            Err(ConfigError::InvalidField {
                field: "component",
                ..
            })
        ));
        assert!(stanza_fields("https://deb.example.com", "stable", &["main", "non-free"]).is_ok());
    }
}
