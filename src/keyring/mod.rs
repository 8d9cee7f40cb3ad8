pub mod decode;
pub mod fetch;
pub mod write;

pub use decode::{decode_key, DecodedKey};
pub use fetch::{KeyFetcher, KeyStream};
pub use write::KeyWriter;
