use std::path::PathBuf;

use clap::Parser;

use crate::config::{Settings, SourceConfig, SourceType};
use crate::error::ConfigError;

/// Add an APT repository: fetch its signing key into the keyring
/// directory and write a deb822 source that references it.
#[derive(Parser, Debug)]
#[command(name = "aptkey", version, about)]
pub struct Cli {
    /// Name of the new repo to add; names the key and source files
    pub name: String,

    /// Types to include (deb, deb-src)
    #[arg(long = "type", value_enum, value_delimiter = ',', default_value = "deb")]
    pub types: Vec<SourceType>,

    /// URL of the ASCII-armored GPG public key
    #[arg(long)]
    pub gpg: String,

    /// Debian repository URI
    #[arg(long)]
    pub uri: String,

    /// Suite to install from
    #[arg(long)]
    pub suite: String,

    /// Components to enable
    #[arg(long, value_delimiter = ',', required = true)]
    pub components: Vec<String>,

    /// TOML settings file
    #[arg(long, env = "APTKEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the binary keyring [default: /usr/share/keyrings]
    #[arg(long)]
    pub keyring_dir: Option<PathBuf>,

    /// Directory for the .sources file [default: /etc/apt/sources.list.d]
    #[arg(long)]
    pub sources_dir: Option<PathBuf>,

    /// HTTP timeout in seconds [default: 30]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Log progress details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings from the config file (if any) with command-line overrides applied.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::load_or_default(self.config.as_deref())?;

        if let Some(dir) = &self.keyring_dir {
            settings.paths.keyring_dir = dir.clone();
        }
        if let Some(dir) = &self.sources_dir {
            settings.paths.sources_dir = dir.clone();
        }
        if let Some(secs) = self.timeout {
            settings.http.timeout_secs = secs;
        }

        settings.paths.validate()?;
        settings.http.timeout()?;
        Ok(settings)
    }

    pub fn source(&self) -> Result<SourceConfig, ConfigError> {
        SourceConfig::new(
            self.name.as_str(),
            self.types.clone(),
            &self.gpg,
            self.uri.as_str(),
            self.suite.as_str(),
            self.components.clone(),
        )
    }
}
