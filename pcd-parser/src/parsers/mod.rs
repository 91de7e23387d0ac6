use std::path::Path;

use crate::{document::LasDocument, error::ParseError};

pub mod las;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<LasDocument, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
}

impl Extension {
    pub fn is_compressed(&self) -> bool {
        matches!(self, Extension::Laz)
    }
}

pub fn get_extension(extension: &str) -> Result<Extension, ParseError> {
    match extension.to_ascii_lowercase().as_str() {
        "las" => Ok(Extension::Las),
        "laz" => Ok(Extension::Laz),
        _ => Err(ParseError::UnsupportedExtension(extension.to_string())),
    }
}

pub fn extension_of(path: &Path) -> Result<Extension, ParseError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    get_extension(extension)
}
