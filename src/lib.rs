//! Add a signed APT repository to a Debian-family system.
//!
//! A run downloads the repository's ASCII-armored GPG key, checks that it
//! holds exactly one public key, stores it as a binary keyring and writes
//! a deb822 `.sources` stanza whose `Signed-By` points at that keyring.

pub mod cli;
pub mod config;
pub mod error;
pub mod keyring;
pub mod output;
pub mod pipeline;
pub mod sources;

pub use config::{Settings, SourceConfig, SourceType};
pub use error::{Error, Result};
pub use pipeline::{AddSource, Outcome, Progress};
