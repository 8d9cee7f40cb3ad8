use std::io;
use std::path::PathBuf;

use tracing::info;

use crate::config::PathsConfig;
use crate::error::WriteError;
use crate::keyring::decode::DecodedKey;
use crate::output::replace_file;

/// Stores decoded keys under the keyring directory as `<name>.gpg`.
pub struct KeyWriter<'a> {
    paths: &'a PathsConfig,
}

impl<'a> KeyWriter<'a> {
    pub fn new(paths: &'a PathsConfig) -> Self {
        Self { paths }
    }

    /// Writes `key` in binary form and returns the path written.
    pub fn write(&self, name: &str, key: &DecodedKey) -> Result<PathBuf, WriteError> {
        let path = self.paths.keyring_path(name);
        info!("Writing key {} to {}", key.fingerprint(), path.display());

        let binary = key.to_binary().map_err(|e| WriteError {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        replace_file(&path, &binary)?;
        Ok(path)
    }
}
