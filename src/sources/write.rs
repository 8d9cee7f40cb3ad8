use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{PathsConfig, SourceConfig};
use crate::error::Error;
use crate::output::replace_file;
use crate::sources::deb822::{render, RenderContext};

/// Writes `<name>.sources` into the sources directory.
pub struct SourceWriter<'a> {
    paths: &'a PathsConfig,
}

impl<'a> SourceWriter<'a> {
    pub fn new(paths: &'a PathsConfig) -> Self {
        Self { paths }
    }

    /// Renders the stanza for `source`, signed by the key at `key_path`.
    /// Nothing is written when rendering fails.
    pub fn write(&self, source: &SourceConfig, key_path: &Path) -> Result<PathBuf, Error> {
        let stanza = render(&RenderContext::new(source, key_path))?;

        let path = self.paths.sources_path(source.name());
        info!("Writing deb822 source to {}", path.display());
        replace_file(&path, stanza.as_bytes())?;
        Ok(path)
    }
}
