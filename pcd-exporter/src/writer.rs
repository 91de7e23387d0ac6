use std::path::{Path, PathBuf};

use las::{
    point::{Classification, Format, ScanDirection},
    Color, Point, Writer,
};

use pcd_core::pointcloud::{document, PointRecordSet};
use pcd_parser::document::OVERLAP_CLASS;
use pcd_parser::{
    document::extra_bytes::ExtraBytesSchema, parsers::extension_of, LasDocument,
};

use crate::{
    destination::{persist, scratch_file},
    error::WriteError,
    format::FormatPolicy,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOptions {
    pub format: FormatPolicy,
    /// Also store the labels in the standard classification field when they
    /// come from an extra-bytes attribute.
    pub mirror_classification: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub points: usize,
    pub version: (u8, u8),
    pub point_format: u8,
    pub compressed: bool,
}

/// Writes `records` to `destination` using `source` for everything the record
/// set does not model.
///
/// Each output point starts as a copy of the matching source point, takes the
/// record set's columns, then gets the label column written into the slot it
/// was read from. The file is written next to `destination` and renamed into
/// place, so on error `destination` is left as it was.
pub fn serialize(
    source: &LasDocument,
    records: &PointRecordSet,
    destination: &Path,
    options: &WriteOptions,
) -> Result<WriteSummary, WriteError> {
    if records.len() != source.points().len() {
        return Err(WriteError::RowCountMismatch {
            records: records.len(),
            points: source.points().len(),
        });
    }
    records.check_columns()?;
    let compressed = extension_of(destination)
        .map_err(|_| WriteError::UnsupportedDestination {
            path: destination.to_path_buf(),
        })?
        .is_compressed();

    let header = options.format.build_header(source.header(), compressed)?;
    let format = header.point_format().clone();
    let version = header.version();

    let points = source
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| build_point(point, i, records, source.extra_bytes(), &format, options))
        .collect::<Result<Vec<_>, _>>()?;

    let start = std::time::Instant::now();
    let scratch = scratch_file(destination)?;
    let las_error = |source: las::Error| WriteError::Las {
        path: destination.to_path_buf(),
        source,
    };
    {
        let mut writer = Writer::from_path(scratch.path(), header).map_err(las_error)?;
        for point in points {
            writer.write_point(point).map_err(las_error)?;
        }
        writer.close().map_err(las_error)?;
    }
    persist(scratch, destination)?;

    log::info!(
        "wrote {} points to {:?} in {:?}",
        records.len(),
        destination,
        start.elapsed()
    );

    Ok(WriteSummary {
        path: destination.to_path_buf(),
        points: records.len(),
        version: (version.major, version.minor),
        point_format: format.to_u8().map_err(WriteError::Format)?,
        compressed,
    })
}

fn build_point(
    source: &Point,
    i: usize,
    records: &PointRecordSet,
    schema: &ExtraBytesSchema,
    format: &Format,
    options: &WriteOptions,
) -> Result<Point, WriteError> {
    let mut point = source.clone();
    point.x = records.x[i];
    point.y = records.y[i];
    point.z = records.z[i];
    point.intensity = records.intensity[i];

    if let Some(extended) = &records.extended {
        point.return_number = extended.return_number[i];
        point.number_of_returns = extended.number_of_returns[i];
        point.scan_direction = if extended.scan_direction[i] {
            ScanDirection::LeftToRight
        } else {
            ScanDirection::RightToLeft
        };
        point.is_edge_of_flight_line = extended.edge_of_flight_line[i];
        set_classification(&mut point, extended.classification[i] as i64, format, false)?;
        point.user_data = extended.user_data[i];
        point.point_source_id = extended.point_source_id[i];
        if let Some(gps_time) = &extended.gps_time {
            point.gps_time = Some(gps_time[i]);
        }
        if let Some(color) = &extended.color {
            point.color = Some(Color {
                red: color.red[i],
                green: color.green[i],
                blue: color.blue[i],
            });
        }
    }

    let label = records.labels().values()[i];
    let slot = records.label_attribute();
    if slot == document::CLASSIFICATION {
        set_classification(&mut point, label, format, true)?;
    } else {
        let attribute = schema
            .get(slot)
            .ok_or_else(|| WriteError::UnknownLabelSlot(slot.to_string()))?;
        if !attribute.encode_integer(&mut point.extra_bytes, label) {
            return Err(WriteError::LabelNotRepresentable {
                label,
                slot: slot.to_string(),
            });
        }
        if options.mirror_classification {
            set_classification(&mut point, label, format, false)?;
        }
    }

    conform(&mut point, format);
    Ok(point)
}

/// Stores `label` in the standard classification field.
///
/// Class 12 has no [`Classification`] value; legacy formats write it through
/// the overlap flag. Extended formats keep the overlap flag separate from the
/// class, so a `strict` write of 12 there is refused and a lenient one keeps
/// only the flag.
fn set_classification(
    point: &mut Point,
    label: i64,
    format: &Format,
    strict: bool,
) -> Result<(), WriteError> {
    let not_representable = || WriteError::LabelNotRepresentable {
        label,
        slot: document::CLASSIFICATION.to_string(),
    };
    let n = u8::try_from(label).map_err(|_| not_representable())?;

    if n == OVERLAP_CLASS {
        if format.is_extended && strict {
            return Err(not_representable());
        }
        point.classification = Classification::Unclassified;
        point.is_overlap = true;
        return Ok(());
    }
    if !format.is_extended {
        if n > 31 {
            return Err(not_representable());
        }
        point.is_overlap = false;
    }
    point.classification = Classification::new(n).map_err(|_| not_representable())?;
    Ok(())
}

/// Adds zeroed fields the target format requires and drops the ones it lacks.
fn conform(point: &mut Point, format: &Format) {
    if format.has_gps_time {
        point.gps_time.get_or_insert(0.0);
    } else {
        point.gps_time = None;
    }
    if format.has_color {
        point.color.get_or_insert(Color {
            red: 0,
            green: 0,
            blue: 0,
        });
    } else {
        point.color = None;
    }
    if format.has_nir {
        point.nir.get_or_insert(0);
    } else {
        point.nir = None;
    }
    if !format.has_waveform {
        point.waveform = None;
    }
    if !format.is_extended {
        point.scanner_channel = 0;
    }
}
