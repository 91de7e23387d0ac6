pub mod document;
pub mod error;
pub mod parsers;

pub use document::{extra_bytes, LasDocument};
pub use error::ParseError;
