use std::io::Read;

use sequoia_openpgp::armor::{self, Kind, ReaderMode};
use sequoia_openpgp::cert::{Cert, CertParser};
use sequoia_openpgp::parse::Parse;
use sequoia_openpgp::serialize::MarshalInto;
use tracing::{debug, error, info};

use crate::error::{AmbiguousKeyError, DecodeError, Error};

const ARMOR_HEADER: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----";

/// The single public key accepted from a download.
#[derive(Debug, Clone)]
pub struct DecodedKey {
    cert: Cert,
}

impl DecodedKey {
    pub fn fingerprint(&self) -> String {
        self.cert.fingerprint().to_hex()
    }

    pub fn primary_user_id(&self) -> Option<String> {
        self.cert
            .userids()
            .next()
            .map(|ua| String::from_utf8_lossy(ua.userid().value()).into_owned())
    }

    /// Binary (unarmored) transferable public key, as apt expects in
    /// `/usr/share/keyrings`.
    pub fn to_binary(&self) -> Result<Vec<u8>, anyhow::Error> {
        self.cert.to_vec()
    }
}

/// Reads an armored keyring and returns its only key.
pub fn decode_key<R: Read>(reader: R) -> Result<DecodedKey, Error> {
    let certs = decode_keyring(reader)?;
    let cert = select_single(certs)?;
    let key = DecodedKey { cert };

    info!("Decoded GPG key {}", key.fingerprint());
    if let Some(uid) = key.primary_user_id() {
        debug!("Key user id: {}", uid);
    }
    Ok(key)
}

/// Parses every certificate in an ASCII-armored public key block. Text
/// before the armor header line is ignored.
pub fn decode_keyring<R: Read>(mut reader: R) -> Result<Vec<Cert>, DecodeError> {
    let mut payload = Vec::new();
    reader
        .read_to_end(&mut payload)
        .map_err(DecodeError::Read)?;
    debug!("Read {} bytes of key material", payload.len());

    let block = armored_block(&payload).ok_or(DecodeError::NotArmored)?;
    let packets = dearmor(block)?;
    if packets.is_empty() {
        return Ok(Vec::new());
    }

    CertParser::from_bytes(&packets)
        .and_then(|parser| parser.collect::<Result<Vec<_>, _>>())
        .map_err(DecodeError::Keyring)
}

/// Enforces that the keyring names exactly one identity.
pub fn select_single(mut certs: Vec<Cert>) -> Result<Cert, AmbiguousKeyError> {
    if certs.len() != 1 {
        error!("Found {} keys in GPG payload, expected exactly one", certs.len());
        return Err(AmbiguousKeyError { count: certs.len() });
    }
    certs.pop().ok_or(AmbiguousKeyError { count: 0 })
}

// The header has to open a line, possibly indented. Anything before it is
// preamble.
fn armored_block(payload: &[u8]) -> Option<&[u8]> {
    let header = ARMOR_HEADER.as_bytes();
    let mut offset = 0;
    for line in payload.split_inclusive(|&b| b == b'\n') {
        let indent = line.iter().take_while(|b| matches!(b, b' ' | b'\t')).count();
        if line[indent..].starts_with(header) {
            return Some(&payload[offset + indent..]);
        }
        offset += line.len();
    }
    None
}

fn dearmor(block: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mode = ReaderMode::Tolerant(Some(Kind::PublicKey));
    let mut reader = armor::Reader::from_bytes(block, mode);
    let mut packets = Vec::new();
    reader
        .read_to_end(&mut packets)
        .map_err(|e| DecodeError::Keyring(e.into()))?;
    Ok(packets)
}
