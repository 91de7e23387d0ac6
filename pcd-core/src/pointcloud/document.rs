use super::{error::ExtractError, point::LabelColumn};

pub const X: &str = "x";
pub const Y: &str = "y";
pub const Z: &str = "z";
pub const INTENSITY: &str = "intensity";
pub const RETURN_NUMBER: &str = "return_number";
pub const NUMBER_OF_RETURNS: &str = "number_of_returns";
pub const SCAN_DIRECTION_FLAG: &str = "scan_direction_flag";
pub const EDGE_OF_FLIGHT_LINE: &str = "edge_of_flight_line";
pub const CLASSIFICATION: &str = "classification";
pub const USER_DATA: &str = "user_data";
pub const POINT_SOURCE_ID: &str = "point_source_id";
pub const GPS_TIME: &str = "gps_time";
pub const RED: &str = "red";
pub const GREEN: &str = "green";
pub const BLUE: &str = "blue";

/// Extra-bytes attribute written by the labelling toolchain.
pub const EXT_CLASS: &str = "Ext_Class";

/// A typed per-point attribute column.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArray {
    F64(Vec<f64>),
    U16(Vec<u16>),
    U8(Vec<u8>),
    Bool(Vec<bool>),
    Integer(LabelColumn),
}

impl AttributeArray {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeArray::F64(_) => "f64",
            AttributeArray::U16(_) => "u16",
            AttributeArray::U8(_) => "u8",
            AttributeArray::Bool(_) => "bool",
            AttributeArray::Integer(_) => "integer",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AttributeArray::F64(v) => v.len(),
            AttributeArray::U16(v) => v.len(),
            AttributeArray::U8(v) => v.len(),
            AttributeArray::Bool(v) => v.len(),
            AttributeArray::Integer(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded point-cloud file that exposes its per-point attributes by name.
pub trait PointDocument {
    fn point_count(&self) -> usize;

    fn has_attribute(&self, name: &str) -> bool;

    fn get_attribute(&self, name: &str) -> Result<AttributeArray, ExtractError>;

    fn attribute_names(&self) -> Vec<String>;
}

/// Typed accessors over [`PointDocument::get_attribute`].
pub(crate) trait PointDocumentExt: PointDocument {
    fn f64_attribute(&self, name: &str) -> Result<Vec<f64>, ExtractError> {
        match self.get_attribute(name)? {
            AttributeArray::F64(values) => Ok(values),
            other => Err(type_error(name, "f64", &other)),
        }
    }

    fn u16_attribute(&self, name: &str) -> Result<Vec<u16>, ExtractError> {
        match self.get_attribute(name)? {
            AttributeArray::U16(values) => Ok(values),
            other => Err(type_error(name, "u16", &other)),
        }
    }

    fn u8_attribute(&self, name: &str) -> Result<Vec<u8>, ExtractError> {
        match self.get_attribute(name)? {
            AttributeArray::U8(values) => Ok(values),
            other => Err(type_error(name, "u8", &other)),
        }
    }

    fn bool_attribute(&self, name: &str) -> Result<Vec<bool>, ExtractError> {
        match self.get_attribute(name)? {
            AttributeArray::Bool(values) => Ok(values),
            other => Err(type_error(name, "bool", &other)),
        }
    }

    fn integer_attribute(&self, name: &str) -> Result<LabelColumn, ExtractError> {
        match self.get_attribute(name)? {
            AttributeArray::Integer(column) => Ok(column),
            other => Err(type_error(name, "integer", &other)),
        }
    }
}

impl<D: PointDocument + ?Sized> PointDocumentExt for D {}

fn type_error(name: &str, expected: &'static str, actual: &AttributeArray) -> ExtractError {
    ExtractError::AttributeType {
        name: name.to_string(),
        expected,
        actual: actual.type_name(),
    }
}
