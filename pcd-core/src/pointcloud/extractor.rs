use super::{
    document::{self, PointDocument, PointDocumentExt as _},
    error::ExtractError,
    point::{Color, ExtendedAttributes, PointRecordSet},
};

/// Builds a [`PointRecordSet`] from a [`PointDocument`].
///
/// The label column is taken from the first of `label_candidates` the document
/// exposes. By default the `Ext_Class` extra-bytes attribute is preferred over
/// the standard classification.
#[derive(Debug, Clone)]
pub struct AttributeExtractor {
    pub label_candidates: Vec<String>,
    pub extended: bool,
}

impl Default for AttributeExtractor {
    fn default() -> Self {
        Self {
            label_candidates: vec![
                document::EXT_CLASS.to_string(),
                document::CLASSIFICATION.to_string(),
            ],
            extended: true,
        }
    }
}

impl AttributeExtractor {
    pub fn with_label_candidates(candidates: Vec<String>) -> Self {
        Self {
            label_candidates: candidates,
            ..Default::default()
        }
    }

    pub fn resolve_label_attribute<D: PointDocument + ?Sized>(
        &self,
        doc: &D,
    ) -> Result<String, ExtractError> {
        self.label_candidates
            .iter()
            .find(|name| doc.has_attribute(name))
            .cloned()
            .ok_or_else(|| ExtractError::MissingAttribute {
                candidates: self.label_candidates.clone(),
            })
    }

    pub fn extract<D: PointDocument + ?Sized>(
        &self,
        doc: &D,
    ) -> Result<PointRecordSet, ExtractError> {
        let label_attribute = self.resolve_label_attribute(doc)?;
        log::debug!("label attribute resolved to '{}'", label_attribute);

        let labels = doc.integer_attribute(&label_attribute)?;
        let records = PointRecordSet::new(
            doc.f64_attribute(document::X)?,
            doc.f64_attribute(document::Y)?,
            doc.f64_attribute(document::Z)?,
            doc.u16_attribute(document::INTENSITY)?,
            labels,
            label_attribute,
        )?;

        if !self.extended {
            return Ok(records);
        }

        let extended = self.extract_extended(doc)?;
        Ok(records.with_extended(extended)?)
    }

    fn extract_extended<D: PointDocument + ?Sized>(
        &self,
        doc: &D,
    ) -> Result<ExtendedAttributes, ExtractError> {
        let gps_time = if doc.has_attribute(document::GPS_TIME) {
            Some(doc.f64_attribute(document::GPS_TIME)?)
        } else {
            None
        };

        let color = if [document::RED, document::GREEN, document::BLUE]
            .iter()
            .all(|name| doc.has_attribute(name))
        {
            Some(Color {
                red: doc.u16_attribute(document::RED)?,
                green: doc.u16_attribute(document::GREEN)?,
                blue: doc.u16_attribute(document::BLUE)?,
            })
        } else {
            None
        };

        let classification = doc
            .integer_attribute(document::CLASSIFICATION)?
            .values()
            .iter()
            .map(|&v| v as u8)
            .collect();

        Ok(ExtendedAttributes {
            return_number: doc.u8_attribute(document::RETURN_NUMBER)?,
            number_of_returns: doc.u8_attribute(document::NUMBER_OF_RETURNS)?,
            scan_direction: doc.bool_attribute(document::SCAN_DIRECTION_FLAG)?,
            edge_of_flight_line: doc.bool_attribute(document::EDGE_OF_FLIGHT_LINE)?,
            classification,
            user_data: doc.u8_attribute(document::USER_DATA)?,
            point_source_id: doc.u16_attribute(document::POINT_SOURCE_ID)?,
            gps_time,
            color,
        })
    }
}
