use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Any failure of an `aptkey` run. Every variant is terminal.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    AmbiguousKey(#[from] AmbiguousKeyError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid repository name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid GPG key URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid {field} {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("{field} must be an absolute path, got {}", path.display())]
    RelativePath { field: &'static str, path: PathBuf },

    #[error("at least one {0} is required")]
    Empty(&'static str),

    #[error("HTTP timeout must be greater than zero")]
    InvalidTimeout,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unable to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch GPG payload from {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("error fetching GPG public key from {url}: [{status}] {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },
}

impl FetchError {
    /// HTTP status code of the response, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unable to read GPG payload")]
    Read(#[source] io::Error),

    #[error("GPG payload is not an ASCII-armored public key block")]
    NotArmored,

    #[error("unable to read armored keyring")]
    Keyring(#[source] anyhow::Error),
}

/// The keyring did not hold exactly one identity.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("found {count} keys in gpg payload, expected exactly one")]
pub struct AmbiguousKeyError {
    pub count: usize,
}

#[derive(Error, Debug)]
#[error("unable to write {}", path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("{field} value {value:?} cannot be written to a deb822 stanza")]
    InvalidValue { field: &'static str, value: String },

    #[error("unable to render deb822 source stanza")]
    Format(#[from] std::fmt::Error),
}
