pub mod deb822;
pub mod write;

pub use deb822::{render, RenderContext};
pub use write::SourceWriter;
