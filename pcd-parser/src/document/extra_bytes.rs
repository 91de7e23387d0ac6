//! Extra-bytes schema (`LASF_Spec` VLR, record 4).
//!
//! Each descriptor is 192 bytes and names one attribute packed into the
//! per-point extra bytes, in declaration order.

use byteorder::{ByteOrder, LittleEndian};
use las::Vlr;

use pcd_core::pointcloud::LabelType;

use crate::error::ParseError;

pub const USER_ID: &str = "LASF_Spec";
pub const RECORD_ID: u16 = 4;
pub const DESCRIPTOR_LEN: usize = 192;

const DATA_TYPE_OFFSET: usize = 2;
const OPTIONS_OFFSET: usize = 3;
const NAME_RANGE: std::ops::Range<usize> = 4..36;
const SCALE_OFFSET: usize = 112;
const OFFSET_OFFSET: usize = 136;
const DESCRIPTION_RANGE: std::ops::Range<usize> = 160..192;

const SCALE_BIT: u8 = 1 << 3;
const OFFSET_BIT: u8 = 1 << 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraBytesType {
    /// Opaque bytes; the options field holds the size.
    Undocumented(u8),
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    /// Tuple types from LAS 1.4 R13, kept only so offsets stay correct.
    Deprecated { code: u8, size: usize },
}

impl ExtraBytesType {
    pub fn from_code(code: u8, options: u8) -> Option<Self> {
        let base_size = |base: u8| -> usize {
            match base {
                1 | 2 => 1,
                3 | 4 => 2,
                5 | 6 | 9 => 4,
                _ => 8,
            }
        };
        Some(match code {
            0 => ExtraBytesType::Undocumented(options),
            1 => ExtraBytesType::U8,
            2 => ExtraBytesType::I8,
            3 => ExtraBytesType::U16,
            4 => ExtraBytesType::I16,
            5 => ExtraBytesType::U32,
            6 => ExtraBytesType::I32,
            7 => ExtraBytesType::U64,
            8 => ExtraBytesType::I64,
            9 => ExtraBytesType::F32,
            10 => ExtraBytesType::F64,
            11..=20 => ExtraBytesType::Deprecated {
                code,
                size: base_size(code - 10) * 2,
            },
            21..=30 => ExtraBytesType::Deprecated {
                code,
                size: base_size(code - 20) * 3,
            },
            _ => return None,
        })
    }

    pub fn code(&self) -> u8 {
        match self {
            ExtraBytesType::Undocumented(_) => 0,
            ExtraBytesType::U8 => 1,
            ExtraBytesType::I8 => 2,
            ExtraBytesType::U16 => 3,
            ExtraBytesType::I16 => 4,
            ExtraBytesType::U32 => 5,
            ExtraBytesType::I32 => 6,
            ExtraBytesType::U64 => 7,
            ExtraBytesType::I64 => 8,
            ExtraBytesType::F32 => 9,
            ExtraBytesType::F64 => 10,
            ExtraBytesType::Deprecated { code, .. } => *code,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            ExtraBytesType::Undocumented(size) => *size as usize,
            ExtraBytesType::U8 | ExtraBytesType::I8 => 1,
            ExtraBytesType::U16 | ExtraBytesType::I16 => 2,
            ExtraBytesType::U32 | ExtraBytesType::I32 | ExtraBytesType::F32 => 4,
            ExtraBytesType::U64 | ExtraBytesType::I64 | ExtraBytesType::F64 => 8,
            ExtraBytesType::Deprecated { size, .. } => *size,
        }
    }

    /// Integer types narrow enough to act as a label column.
    pub fn label_type(&self) -> Option<LabelType> {
        match self {
            ExtraBytesType::U8 => Some(LabelType::U8),
            ExtraBytesType::I8 => Some(LabelType::I8),
            ExtraBytesType::U16 => Some(LabelType::U16),
            ExtraBytesType::I16 => Some(LabelType::I16),
            ExtraBytesType::U32 => Some(LabelType::U32),
            ExtraBytesType::I32 => Some(LabelType::I32),
            _ => None,
        }
    }

    pub fn is_float_like(&self) -> bool {
        matches!(
            self,
            ExtraBytesType::U64 | ExtraBytesType::I64 | ExtraBytesType::F32 | ExtraBytesType::F64
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtraBytesDescriptor {
    pub name: String,
    pub data_type: ExtraBytesType,
    pub description: String,
    /// Stored values are multiplied by this when the options byte says so.
    pub scale: Option<f64>,
    pub offset: Option<f64>,
}

impl ExtraBytesDescriptor {
    pub fn new(name: impl Into<String>, data_type: ExtraBytesType) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: String::new(),
            scale: None,
            offset: None,
        }
    }

    pub fn read_from(index: usize, bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() != DESCRIPTOR_LEN {
            return Err(ParseError::ExtraBytesDescriptor {
                index,
                message: format!("expected {} bytes, got {}", DESCRIPTOR_LEN, bytes.len()),
            });
        }
        let code = bytes[DATA_TYPE_OFFSET];
        let options = bytes[OPTIONS_OFFSET];
        let data_type = ExtraBytesType::from_code(code, options).ok_or_else(|| {
            ParseError::ExtraBytesDescriptor {
                index,
                message: format!("unknown data type {}", code),
            }
        })?;

        // Undocumented types keep their size in the options byte. Scale and
        // offset are stored per tuple member; only the first is used.
        let documented = !matches!(data_type, ExtraBytesType::Undocumented(_));
        let scale = (documented && options & SCALE_BIT != 0)
            .then(|| LittleEndian::read_f64(&bytes[SCALE_OFFSET..SCALE_OFFSET + 8]));
        let offset = (documented && options & OFFSET_BIT != 0)
            .then(|| LittleEndian::read_f64(&bytes[OFFSET_OFFSET..OFFSET_OFFSET + 8]));

        Ok(Self {
            name: c_string(&bytes[NAME_RANGE]),
            data_type,
            description: c_string(&bytes[DESCRIPTION_RANGE]),
            scale,
            offset,
        })
    }

    pub fn to_bytes(&self) -> [u8; DESCRIPTOR_LEN] {
        let mut bytes = [0u8; DESCRIPTOR_LEN];
        bytes[DATA_TYPE_OFFSET] = self.data_type.code();
        if let ExtraBytesType::Undocumented(size) = self.data_type {
            bytes[OPTIONS_OFFSET] = size;
        } else {
            if let Some(scale) = self.scale {
                bytes[OPTIONS_OFFSET] |= SCALE_BIT;
                LittleEndian::write_f64(&mut bytes[SCALE_OFFSET..SCALE_OFFSET + 8], scale);
            }
            if let Some(offset) = self.offset {
                bytes[OPTIONS_OFFSET] |= OFFSET_BIT;
                LittleEndian::write_f64(&mut bytes[OFFSET_OFFSET..OFFSET_OFFSET + 8], offset);
            }
        }
        copy_truncated(&mut bytes[NAME_RANGE], self.name.as_bytes());
        copy_truncated(&mut bytes[DESCRIPTION_RANGE], self.description.as_bytes());
        bytes
    }
}

fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

fn copy_truncated(dst: &mut [u8], src: &[u8]) {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
}

/// A named attribute and where it lives inside the point's extra bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraBytesAttribute {
    pub descriptor: ExtraBytesDescriptor,
    pub offset: usize,
}

impl ExtraBytesAttribute {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.descriptor.data_type.size()
    }

    fn is_scaled(&self) -> bool {
        self.descriptor.scale.is_some() || self.descriptor.offset.is_some()
    }

    /// Column type when the attribute can hold labels: an unscaled integer
    /// type of at most 32 bits.
    pub fn label_type(&self) -> Option<LabelType> {
        if self.is_scaled() {
            return None;
        }
        self.descriptor.data_type.label_type()
    }

    /// Attributes read through [`decode_f64`](Self::decode_f64): 64-bit
    /// integers, floats and scaled integers.
    pub fn is_float_like(&self) -> bool {
        let data_type = self.descriptor.data_type;
        data_type.is_float_like() || (self.is_scaled() && data_type.label_type().is_some())
    }

    /// Reads an unscaled integer attribute. `None` for other types.
    pub fn decode_integer(&self, extra_bytes: &[u8]) -> Option<i64> {
        self.label_type()?;
        self.raw_integer(extra_bytes)
    }

    fn raw_integer(&self, extra_bytes: &[u8]) -> Option<i64> {
        let bytes = &extra_bytes[self.range()];
        Some(match self.descriptor.data_type {
            ExtraBytesType::U8 => bytes[0] as i64,
            ExtraBytesType::I8 => bytes[0] as i8 as i64,
            ExtraBytesType::U16 => LittleEndian::read_u16(bytes) as i64,
            ExtraBytesType::I16 => LittleEndian::read_i16(bytes) as i64,
            ExtraBytesType::U32 => LittleEndian::read_u32(bytes) as i64,
            ExtraBytesType::I32 => LittleEndian::read_i32(bytes) as i64,
            _ => return None,
        })
    }

    /// Reads a numeric attribute with its scale and offset applied.
    pub fn decode_f64(&self, extra_bytes: &[u8]) -> Option<f64> {
        let bytes = &extra_bytes[self.range()];
        let raw = match self.descriptor.data_type {
            ExtraBytesType::U64 => LittleEndian::read_u64(bytes) as f64,
            ExtraBytesType::I64 => LittleEndian::read_i64(bytes) as f64,
            ExtraBytesType::F32 => LittleEndian::read_f32(bytes) as f64,
            ExtraBytesType::F64 => LittleEndian::read_f64(bytes),
            _ => self.raw_integer(extra_bytes)? as f64,
        };
        Some(raw * self.descriptor.scale.unwrap_or(1.0) + self.descriptor.offset.unwrap_or(0.0))
    }

    /// Writes an integer into the attribute's slot. Returns `false`, leaving the
    /// bytes unchanged, when the attribute is not an integer type or the value
    /// does not fit it.
    pub fn encode_integer(&self, extra_bytes: &mut [u8], value: i64) -> bool {
        match self.label_type() {
            Some(label_type) if label_type.contains(value) => {}
            _ => return false,
        }
        let bytes = &mut extra_bytes[self.range()];
        match self.descriptor.data_type {
            ExtraBytesType::U8 => bytes[0] = value as u8,
            ExtraBytesType::I8 => bytes[0] = value as i8 as u8,
            ExtraBytesType::U16 => LittleEndian::write_u16(bytes, value as u16),
            ExtraBytesType::I16 => LittleEndian::write_i16(bytes, value as i16),
            ExtraBytesType::U32 => LittleEndian::write_u32(bytes, value as u32),
            ExtraBytesType::I32 => LittleEndian::write_i32(bytes, value as i32),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraBytesSchema {
    attributes: Vec<ExtraBytesAttribute>,
}

impl ExtraBytesSchema {
    pub fn from_vlrs<'a>(vlrs: impl IntoIterator<Item = &'a Vlr>) -> Result<Self, ParseError> {
        let Some(vlr) = vlrs
            .into_iter()
            .find(|vlr| vlr.user_id == USER_ID && vlr.record_id == RECORD_ID)
        else {
            return Ok(Self::default());
        };

        if vlr.data.len() % DESCRIPTOR_LEN != 0 {
            return Err(ParseError::ExtraBytesDescriptor {
                index: vlr.data.len() / DESCRIPTOR_LEN,
                message: format!(
                    "record length {} is not a multiple of {}",
                    vlr.data.len(),
                    DESCRIPTOR_LEN
                ),
            });
        }

        let mut attributes = Vec::new();
        let mut offset = 0;
        for (index, chunk) in vlr.data.chunks_exact(DESCRIPTOR_LEN).enumerate() {
            let descriptor = ExtraBytesDescriptor::read_from(index, chunk)?;
            let size = descriptor.data_type.size();
            attributes.push(ExtraBytesAttribute { descriptor, offset });
            offset += size;
        }
        Ok(Self { attributes })
    }

    pub fn get(&self, name: &str) -> Option<&ExtraBytesAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn attributes(&self) -> &[ExtraBytesAttribute] {
        &self.attributes
    }

    /// Bytes per point covered by the described attributes.
    pub fn record_len(&self) -> usize {
        self.attributes
            .iter()
            .map(|a| a.descriptor.data_type.size())
            .sum()
    }
}

/// Builds the VLR describing `descriptors`, in order.
pub fn extra_bytes_vlr(descriptors: &[ExtraBytesDescriptor]) -> Vlr {
    Vlr {
        user_id: USER_ID.to_string(),
        record_id: RECORD_ID,
        description: "Extra Bytes Record".to_string(),
        data: descriptors.iter().flat_map(|d| d.to_bytes()).collect(),
    }
}
