use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{Settings, SourceConfig};
use crate::error::Result;
use crate::keyring::{decode_key, KeyFetcher, KeyWriter};
use crate::sources::SourceWriter;

/// Prints one `Wrote <path>` line per artifact, so a failed run shows how
/// far it got.
pub struct Progress<W: Write> {
    out: W,
}

impl<W: Write> Progress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn wrote(&mut self, path: &Path) {
        if let Err(e) = writeln!(self.out, "Wrote {}", path.display()) {
            warn!("Unable to report progress: {}", e);
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Artifacts of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub fingerprint: String,
    pub key_path: PathBuf,
    pub sources_path: PathBuf,
}

/// Fetch, decode, store the key, then write the source stanza. Each stage
/// only runs when the previous one succeeded.
pub struct AddSource {
    settings: Settings,
    fetcher: KeyFetcher,
}

impl AddSource {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.paths.validate()?;
        let fetcher = KeyFetcher::new(&settings.http)?;
        Ok(Self { settings, fetcher })
    }

    pub fn run<W: Write>(
        &self,
        source: &SourceConfig,
        progress: &mut Progress<W>,
    ) -> Result<Outcome> {
        info!("Adding repository {}", source.name());

        let stream = self.fetcher.fetch(source.gpg_url())?;
        let key = decode_key(stream)?;

        let key_path = KeyWriter::new(&self.settings.paths).write(source.name(), &key)?;
        progress.wrote(&key_path);

        let sources_path = SourceWriter::new(&self.settings.paths).write(source, &key_path)?;
        progress.wrote(&sources_path);

        Ok(Outcome {
            fingerprint: key.fingerprint(),
            key_path,
            sources_path,
        })
    }
}
