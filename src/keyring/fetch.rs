use std::io::{self, Read};

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::config::HttpConfig;
use crate::error::{Error, FetchError};

/// Blocking HTTP client that downloads armored keys.
pub struct KeyFetcher {
    client: Client,
}

/// Body of a successful key download. The connection goes back to the
/// client when the stream is dropped.
pub struct KeyStream {
    response: Response,
}

impl Read for KeyStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.response.read(buf)
    }
}

impl KeyFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout()?)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }

    pub fn fetch(&self, url: &Url) -> Result<KeyStream, FetchError> {
        info!("Fetching GPG key from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Key server returned status: {}", status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        debug!(
            "Key response from {} ({} bytes announced)",
            response.url(),
            response
                .content_length()
                .map_or_else(|| "unknown".to_string(), |len| len.to_string())
        );

        Ok(KeyStream { response })
    }
}
