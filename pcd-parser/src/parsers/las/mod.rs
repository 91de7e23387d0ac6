use std::path::PathBuf;

use las::Reader;

use super::{extension_of, Parser, ParserProvider};
use crate::{document::LasDocument, error::ParseError};

pub struct LasParserProvider {
    pub filename: PathBuf,
}

impl ParserProvider for LasParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(LasParser {
            filename: self.filename.clone(),
        })
    }
}

/// Reads a whole LAS or LAZ file into memory.
pub struct LasParser {
    pub filename: PathBuf,
}

impl LasParser {
    fn las_error(&self, source: las::Error) -> ParseError {
        ParseError::Las {
            path: self.filename.clone(),
            source,
        }
    }
}

impl Parser for LasParser {
    fn parse(&self) -> Result<LasDocument, ParseError> {
        extension_of(&self.filename)?;

        let start = std::time::Instant::now();
        let mut reader = Reader::from_path(&self.filename).map_err(|e| self.las_error(e))?;
        let header = reader.header().clone();

        let points = reader
            .points()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.las_error(e))?;
        log::info!(
            "read {} points from {:?} in {:?}",
            points.len(),
            self.filename,
            start.elapsed()
        );

        LasDocument::new(self.filename.clone(), header, points)
    }
}
