pub mod extra_bytes;

use std::path::{Path, PathBuf};

use las::{point::ScanDirection, Header, Point};

use pcd_core::pointcloud::{
    document::{self as names, AttributeArray, PointDocument},
    point::Crs,
    ExtractError, LabelColumn, LabelType, SourceMetadata,
};

use crate::error::ParseError;
use extra_bytes::ExtraBytesSchema;

const PROJECTION_USER_ID: &str = "LASF_Projection";
const WKT_RECORD_ID: u16 = 2112;
const GEO_KEY_DIRECTORY_RECORD_ID: u16 = 34735;

/// ASPRS "overlap points". Legacy formats store it as a class; the reader
/// turns it into the overlap flag over class 1.
pub const OVERLAP_CLASS: u8 = 12;

const STANDARD_ATTRIBUTES: [&str; 11] = [
    names::X,
    names::Y,
    names::Z,
    names::INTENSITY,
    names::RETURN_NUMBER,
    names::NUMBER_OF_RETURNS,
    names::SCAN_DIRECTION_FLAG,
    names::EDGE_OF_FLIGHT_LINE,
    names::CLASSIFICATION,
    names::USER_DATA,
    names::POINT_SOURCE_ID,
];

/// A decoded LAS/LAZ file: the full header and every point in file order.
#[derive(Debug, Clone)]
pub struct LasDocument {
    path: PathBuf,
    header: Header,
    points: Vec<Point>,
    extra_bytes: ExtraBytesSchema,
}

impl LasDocument {
    pub fn new(
        path: impl Into<PathBuf>,
        header: Header,
        points: Vec<Point>,
    ) -> Result<Self, ParseError> {
        let extra_bytes =
            ExtraBytesSchema::from_vlrs(header.vlrs().iter().chain(header.evlrs().iter()))?;

        let expected = extra_bytes.record_len();
        if let Some((index, point)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| p.extra_bytes.len() < expected)
        {
            return Err(ParseError::ExtraBytesLength {
                index,
                expected,
                actual: point.extra_bytes.len(),
            });
        }

        Ok(Self {
            path: path.into(),
            header,
            points,
            extra_bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn extra_bytes(&self) -> &ExtraBytesSchema {
        &self.extra_bytes
    }

    /// Declared type of the standard classification field for this point format.
    pub fn classification_type(&self) -> LabelType {
        if self.header.point_format().is_extended {
            LabelType::U8
        } else {
            LabelType::Classification5
        }
    }

    pub fn crs(&self) -> Option<Crs> {
        let vlrs = self.header.vlrs().iter().chain(self.header.evlrs().iter());
        let mut geotiff = false;
        for vlr in vlrs.filter(|v| v.user_id == PROJECTION_USER_ID) {
            match vlr.record_id {
                WKT_RECORD_ID => {
                    let end = vlr.data.iter().position(|&b| b == 0).unwrap_or(vlr.data.len());
                    return Some(Crs::Wkt(
                        String::from_utf8_lossy(&vlr.data[..end]).to_string(),
                    ));
                }
                GEO_KEY_DIRECTORY_RECORD_ID => geotiff = true,
                _ => {}
            }
        }
        geotiff.then_some(Crs::GeoTiff)
    }

    pub fn metadata(&self) -> SourceMetadata {
        let version = self.header.version();
        let format = self.header.point_format();
        let transforms = self.header.transforms();
        SourceMetadata {
            version: (version.major, version.minor),
            point_format: format.to_u8().unwrap_or_default(),
            compressed: format.is_compressed,
            scale: [transforms.x.scale, transforms.y.scale, transforms.z.scale],
            offset: [transforms.x.offset, transforms.y.offset, transforms.z.offset],
            crs: self.crs(),
            system_identifier: self.header.system_identifier().to_string(),
            generating_software: self.header.generating_software().to_string(),
            point_count: self.points.len(),
        }
    }

    fn column<T>(&self, f: impl Fn(&Point) -> T) -> Vec<T> {
        self.points.iter().map(f).collect()
    }

    fn extra_bytes_attribute(&self, name: &str) -> Option<AttributeArray> {
        let attribute = self.extra_bytes.get(name)?;
        if let Some(label_type) = attribute.label_type() {
            let values = self.column(|p| attribute.decode_integer(&p.extra_bytes).unwrap_or(0));
            // Decoded values always fit their own declared type.
            LabelColumn::new(label_type, values)
                .ok()
                .map(AttributeArray::Integer)
        } else if attribute.is_float_like() {
            Some(AttributeArray::F64(self.column(|p| {
                attribute.decode_f64(&p.extra_bytes).unwrap_or(f64::NAN)
            })))
        } else {
            None
        }
    }

    fn is_exposed_extra_bytes(&self, name: &str) -> bool {
        self.extra_bytes
            .get(name)
            .is_some_and(|a| a.label_type().is_some() || a.is_float_like())
    }
}

impl PointDocument for LasDocument {
    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn has_attribute(&self, name: &str) -> bool {
        let format = self.header.point_format();
        match name {
            names::GPS_TIME => format.has_gps_time,
            names::RED | names::GREEN | names::BLUE => format.has_color,
            _ if STANDARD_ATTRIBUTES.contains(&name) => true,
            _ => self.is_exposed_extra_bytes(name),
        }
    }

    fn get_attribute(&self, name: &str) -> Result<AttributeArray, ExtractError> {
        if !self.has_attribute(name) {
            return Err(ExtractError::AttributeNotFound {
                name: name.to_string(),
            });
        }

        let array = match name {
            names::X => AttributeArray::F64(self.column(|p| p.x)),
            names::Y => AttributeArray::F64(self.column(|p| p.y)),
            names::Z => AttributeArray::F64(self.column(|p| p.z)),
            names::INTENSITY => AttributeArray::U16(self.column(|p| p.intensity)),
            names::RETURN_NUMBER => AttributeArray::U8(self.column(|p| p.return_number)),
            names::NUMBER_OF_RETURNS => AttributeArray::U8(self.column(|p| p.number_of_returns)),
            names::SCAN_DIRECTION_FLAG => AttributeArray::Bool(
                self.column(|p| p.scan_direction == ScanDirection::LeftToRight),
            ),
            names::EDGE_OF_FLIGHT_LINE => {
                AttributeArray::Bool(self.column(|p| p.is_edge_of_flight_line))
            }
            names::CLASSIFICATION => {
                let legacy = !self.header.point_format().is_extended;
                let values = self.column(|p| {
                    if legacy && p.is_overlap {
                        OVERLAP_CLASS as i64
                    } else {
                        u8::from(p.classification) as i64
                    }
                });
                AttributeArray::Integer(LabelColumn::new(self.classification_type(), values)?)
            }
            names::USER_DATA => AttributeArray::U8(self.column(|p| p.user_data)),
            names::POINT_SOURCE_ID => AttributeArray::U16(self.column(|p| p.point_source_id)),
            names::GPS_TIME => AttributeArray::F64(self.column(|p| p.gps_time.unwrap_or(0.0))),
            names::RED => AttributeArray::U16(self.column(|p| p.color.map_or(0, |c| c.red))),
            names::GREEN => AttributeArray::U16(self.column(|p| p.color.map_or(0, |c| c.green))),
            names::BLUE => AttributeArray::U16(self.column(|p| p.color.map_or(0, |c| c.blue))),
            _ => self.extra_bytes_attribute(name).ok_or_else(|| {
                ExtractError::AttributeNotFound {
                    name: name.to_string(),
                }
            })?,
        };
        Ok(array)
    }

    fn attribute_names(&self) -> Vec<String> {
        let mut attribute_names: Vec<String> =
            STANDARD_ATTRIBUTES.iter().map(|s| s.to_string()).collect();
        let format = self.header.point_format();
        if format.has_gps_time {
            attribute_names.push(names::GPS_TIME.to_string());
        }
        if format.has_color {
            attribute_names.extend([names::RED, names::GREEN, names::BLUE].map(String::from));
        }
        attribute_names.extend(
            self.extra_bytes
                .attributes()
                .iter()
                .map(|a| a.name())
                .filter(|name| self.is_exposed_extra_bytes(name))
                .map(String::from),
        );
        attribute_names
    }
}

#[cfg(test)]
mod tests {
    use las::{
        point::{Classification, Format},
        Builder, Color, Vlr,
    };

    use super::*;
    use extra_bytes::{extra_bytes_vlr, ExtraBytesDescriptor, ExtraBytesType};

    fn header(format: u8, extra: &[ExtraBytesDescriptor], vlrs: Vec<Vlr>) -> Header {
        let mut builder = Builder::from((1, 4));
        builder.point_format = Format::new(format).unwrap();
        if !extra.is_empty() {
            builder.point_format.extra_bytes = extra.iter().map(|d| d.data_type.size() as u16).sum();
            builder.vlrs.push(extra_bytes_vlr(extra));
        }
        builder.vlrs.extend(vlrs);
        builder.into_header().unwrap()
    }

    fn point(ext_class: Option<u8>) -> Point {
        Point {
            x: 1.5,
            y: 2.5,
            z: 3.5,
            intensity: 42,
            return_number: 1,
            number_of_returns: 2,
            gps_time: Some(12.25),
            color: Some(Color {
                red: 1,
                green: 2,
                blue: 3,
            }),
            extra_bytes: ext_class.into_iter().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn exposes_standard_and_extra_bytes_attributes() {
        let extra = [ExtraBytesDescriptor::new("Ext_Class", ExtraBytesType::U8)];
        let document = LasDocument::new(
            "in.las",
            header(3, &extra, vec![]),
            vec![point(Some(9)), point(Some(5))],
        )
        .unwrap();

        assert!(document.has_attribute("Ext_Class"));
        assert!(document.has_attribute("gps_time"));
        assert!(document.has_attribute("red"));
        assert!(!document.has_attribute("nir"));
        assert!(document.attribute_names().contains(&"Ext_Class".to_string()));

        match document.get_attribute("Ext_Class").unwrap() {
            AttributeArray::Integer(column) => {
                assert_eq!(column.values(), &[9, 5]);
                assert_eq!(column.label_type(), LabelType::U8);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            document.get_attribute("gps_time").unwrap(),
            AttributeArray::F64(vec![12.25, 12.25])
        );
        assert_eq!(
            document.get_attribute("green").unwrap(),
            AttributeArray::U16(vec![2, 2])
        );
    }

    #[test]
    fn formats_without_gps_or_color_do_not_expose_them() {
        let mut p = point(None);
        p.gps_time = None;
        p.color = None;
        let document = LasDocument::new("in.las", header(0, &[], vec![]), vec![p]).unwrap();

        assert!(!document.has_attribute("gps_time"));
        assert!(!document.has_attribute("red"));
        assert!(!document.has_attribute("Ext_Class"));
        assert!(document.get_attribute("gps_time").is_err());
        assert_eq!(document.classification_type(), LabelType::Classification5);
    }

    #[test]
    fn legacy_overlap_points_read_as_class_12() {
        let mut overlap = point(None);
        overlap.classification = Classification::Unclassified;
        overlap.is_overlap = true;
        let mut ground = point(None);
        ground.classification = Classification::Ground;
        let points = vec![overlap, ground];

        let legacy = LasDocument::new("in.las", header(3, &[], vec![]), points.clone()).unwrap();
        assert_eq!(
            legacy.get_attribute("classification").unwrap(),
            AttributeArray::Integer(
                LabelColumn::new(LabelType::Classification5, vec![12, 2]).unwrap()
            )
        );

        // extended formats keep the flag next to the class
        let extended = LasDocument::new("in.las", header(7, &[], vec![]), points).unwrap();
        assert_eq!(
            extended.get_attribute("classification").unwrap(),
            AttributeArray::Integer(LabelColumn::new(LabelType::U8, vec![1, 2]).unwrap())
        );
    }

    #[test]
    fn scaled_extra_bytes_are_not_label_columns() {
        let mut descriptor = ExtraBytesDescriptor::new("height", ExtraBytesType::I16);
        descriptor.scale = Some(0.5);
        let document = LasDocument::new(
            "in.las",
            header(3, &[descriptor], vec![]),
            vec![Point {
                extra_bytes: 5i16.to_le_bytes().to_vec(),
                ..point(None)
            }],
        )
        .unwrap();

        assert!(document.has_attribute("height"));
        assert_eq!(
            document.get_attribute("height").unwrap(),
            AttributeArray::F64(vec![2.5])
        );
    }

    #[test]
    fn short_extra_bytes_are_rejected() {
        let extra = [ExtraBytesDescriptor::new("Ext_Class", ExtraBytesType::U16)];
        let err = LasDocument::new("in.las", header(3, &extra, vec![]), vec![point(Some(1))])
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::ExtraBytesLength {
                index: 0,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn metadata_reports_wkt_crs() {
        let wkt = Vlr {
            user_id: PROJECTION_USER_ID.to_string(),
            record_id: WKT_RECORD_ID,
            description: String::new(),
            data: b"PROJCS[\"test\"]\0".to_vec(),
        };
        let mut p = point(None);
        p.color = None;
        let document = LasDocument::new("in.las", header(1, &[], vec![wkt]), vec![p]).unwrap();
        let metadata = document.metadata();

        assert_eq!(metadata.version, (1, 4));
        assert_eq!(metadata.point_format, 1);
        assert_eq!(metadata.point_count, 1);
        assert_eq!(metadata.crs, Some(Crs::Wkt("PROJCS[\"test\"]".to_string())));
    }
}
