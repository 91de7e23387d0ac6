use std::fmt;

use serde::Serialize;

use super::error::RecordError;

/// Declared storage type of a label column.
///
/// Point formats 0-5 store the standard classification in 5 bits, formats 6-10
/// in a full byte. Extra-bytes attributes declare their own integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    Classification5,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
}

impl LabelType {
    pub fn min(&self) -> i64 {
        match self {
            LabelType::Classification5 | LabelType::U8 | LabelType::U16 | LabelType::U32 => 0,
            LabelType::I8 => i8::MIN as i64,
            LabelType::I16 => i16::MIN as i64,
            LabelType::I32 => i32::MIN as i64,
        }
    }

    pub fn max(&self) -> i64 {
        match self {
            LabelType::Classification5 => 31,
            LabelType::U8 => u8::MAX as i64,
            LabelType::I8 => i8::MAX as i64,
            LabelType::U16 => u16::MAX as i64,
            LabelType::I16 => i16::MAX as i64,
            LabelType::U32 => u32::MAX as i64,
            LabelType::I32 => i32::MAX as i64,
        }
    }

    /// Width in bytes when stored as an extra-bytes attribute.
    pub fn size(&self) -> usize {
        match self {
            LabelType::Classification5 | LabelType::U8 | LabelType::I8 => 1,
            LabelType::U16 | LabelType::I16 => 2,
            LabelType::U32 | LabelType::I32 => 4,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min()..=self.max()).contains(&value)
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelType::Classification5 => "5-bit classification",
            LabelType::U8 => "u8",
            LabelType::I8 => "i8",
            LabelType::U16 => "u16",
            LabelType::I16 => "i16",
            LabelType::U32 => "u32",
            LabelType::I32 => "i32",
        };
        f.write_str(name)
    }
}

/// An integer column with its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelColumn {
    label_type: LabelType,
    values: Vec<i64>,
}

impl LabelColumn {
    pub fn new(label_type: LabelType, values: Vec<i64>) -> Result<Self, RecordError> {
        if let Some(&value) = values.iter().find(|v| !label_type.contains(**v)) {
            return Err(RecordError::ValueOutOfRange {
                name: "label",
                value,
                label_type,
            });
        }
        Ok(Self { label_type, values })
    }

    pub fn label_type(&self) -> LabelType {
        self.label_type
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Mutable access is crate-private so that every write goes through the
    /// relabel engine's range checks.
    pub(crate) fn values_mut(&mut self) -> &mut [i64] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Color {
    pub red: Vec<u16>,
    pub green: Vec<u16>,
    pub blue: Vec<u16>,
}

/// Return metadata, standard classification, GPS time and color, kept so the
/// writer can carry them through untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtendedAttributes {
    pub return_number: Vec<u8>,
    pub number_of_returns: Vec<u8>,
    /// `true` for left-to-right scans.
    pub scan_direction: Vec<bool>,
    pub edge_of_flight_line: Vec<bool>,
    pub classification: Vec<u8>,
    pub user_data: Vec<u8>,
    pub point_source_id: Vec<u16>,
    pub gps_time: Option<Vec<f64>>,
    pub color: Option<Color>,
}

impl ExtendedAttributes {
    fn check_len(&self, expected: usize) -> Result<(), RecordError> {
        let mut columns = vec![
            ("return_number", self.return_number.len()),
            ("number_of_returns", self.number_of_returns.len()),
            ("scan_direction_flag", self.scan_direction.len()),
            ("edge_of_flight_line", self.edge_of_flight_line.len()),
            ("classification", self.classification.len()),
            ("user_data", self.user_data.len()),
            ("point_source_id", self.point_source_id.len()),
        ];
        if let Some(gps_time) = &self.gps_time {
            columns.push(("gps_time", gps_time.len()));
        }
        if let Some(color) = &self.color {
            columns.push(("red", color.red.len()));
            columns.push(("green", color.green.len()));
            columns.push(("blue", color.blue.len()));
        }
        check_columns(expected, &columns)
    }
}

fn check_columns(expected: usize, columns: &[(&'static str, usize)]) -> Result<(), RecordError> {
    for &(name, actual) in columns {
        if actual != expected {
            return Err(RecordError::LengthMismatch {
                name,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Column-oriented point records in source file order.
///
/// Every column has the same row count. Nothing in this crate reorders rows;
/// row `i` always corresponds to point `i` of the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecordSet {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub intensity: Vec<u16>,
    labels: LabelColumn,
    label_attribute: String,
    pub extended: Option<ExtendedAttributes>,
}

impl PointRecordSet {
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        intensity: Vec<u16>,
        labels: LabelColumn,
        label_attribute: impl Into<String>,
    ) -> Result<Self, RecordError> {
        check_columns(
            x.len(),
            &[
                ("y", y.len()),
                ("z", z.len()),
                ("intensity", intensity.len()),
                ("label", labels.len()),
            ],
        )?;

        Ok(Self {
            x,
            y,
            z,
            intensity,
            labels,
            label_attribute: label_attribute.into(),
            extended: None,
        })
    }

    pub fn with_extended(mut self, extended: ExtendedAttributes) -> Result<Self, RecordError> {
        extended.check_len(self.len())?;
        self.extended = Some(extended);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Checks that every public column still has [`len`](Self::len) rows.
    /// The columns are plain `Vec`s, so callers can change their lengths.
    pub fn check_columns(&self) -> Result<(), RecordError> {
        check_columns(
            self.len(),
            &[
                ("y", self.y.len()),
                ("z", self.z.len()),
                ("intensity", self.intensity.len()),
                ("label", self.labels.len()),
            ],
        )?;
        match &self.extended {
            Some(extended) => extended.check_len(self.len()),
            None => Ok(()),
        }
    }

    pub fn labels(&self) -> &LabelColumn {
        &self.labels
    }

    pub(crate) fn labels_mut(&mut self) -> &mut LabelColumn {
        &mut self.labels
    }

    /// Name of the document attribute the labels were read from, and the
    /// slot they are written back to.
    pub fn label_attribute(&self) -> &str {
        &self.label_attribute
    }

    /// Swaps in a label column computed elsewhere (see
    /// [`RelabelEngine::relabeled`](super::RelabelEngine::relabeled)).
    ///
    /// The column must match the row count and declared type of the current one.
    pub fn replace_labels(&mut self, labels: LabelColumn) -> Result<LabelColumn, RecordError> {
        check_columns(self.len(), &[("label", labels.len())])?;
        if let Some(&value) = labels
            .values()
            .iter()
            .find(|v| !self.labels.label_type().contains(**v))
        {
            return Err(RecordError::ValueOutOfRange {
                name: "label",
                value,
                label_type: self.labels.label_type(),
            });
        }
        let label_type = self.labels.label_type;
        let previous = std::mem::replace(
            &mut self.labels,
            LabelColumn {
                label_type,
                values: labels.values,
            },
        );
        Ok(previous)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Crs {
    Wkt(String),
    GeoTiff,
}

/// Header envelope of the source file, for display. The writer carries the
/// full header itself; this is a read-only summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMetadata {
    pub version: (u8, u8),
    pub point_format: u8,
    pub compressed: bool,
    pub scale: [f64; 3],
    pub offset: [f64; 3],
    pub crs: Option<Crs>,
    pub system_identifier: String,
    pub generating_software: String,
    pub point_count: usize,
}

impl fmt::Display for SourceMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "LAS {}.{}, point format {}{}",
            self.version.0,
            self.version.1,
            self.point_format,
            if self.compressed { " (compressed)" } else { "" }
        )?;
        writeln!(f, "points: {}", self.point_count)?;
        writeln!(f, "scale: {:?}", self.scale)?;
        writeln!(f, "offset: {:?}", self.offset)?;
        match &self.crs {
            Some(Crs::Wkt(wkt)) => writeln!(f, "crs: {}", wkt)?,
            Some(Crs::GeoTiff) => writeln!(f, "crs: GeoTIFF keys")?,
            None => writeln!(f, "crs: none")?,
        }
        write!(
            f,
            "system: {} / software: {}",
            self.system_identifier, self.generating_software
        )
    }
}
