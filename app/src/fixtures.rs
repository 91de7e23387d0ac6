use std::path::Path;

use las::{point::Format, Builder, Point, Writer};
use pcd_parser::extra_bytes::{extra_bytes_vlr, ExtraBytesDescriptor, ExtraBytesType};

/// Labels of the point cloud written by [`write_cloud`].
pub const LABELS: [u8; 6] = [2, 5, 9, 5, 2, 5];

/// Writes a small point format 3 cloud whose labels live in `Ext_Class`.
pub fn write_cloud(path: &Path) {
    let mut builder = Builder::from((1, 4));
    builder.point_format = Format::new(3).unwrap();
    builder.point_format.extra_bytes = 1;
    builder.vlrs.push(extra_bytes_vlr(&[ExtraBytesDescriptor::new(
        "Ext_Class",
        ExtraBytesType::U8,
    )]));
    let header = builder.into_header().unwrap();

    let mut writer = Writer::from_path(path, header).unwrap();
    for (i, &label) in LABELS.iter().enumerate() {
        let point = Point {
            x: i as f64,
            y: 10.0 + i as f64,
            z: 0.5,
            intensity: 300 + i as u16,
            gps_time: Some(i as f64),
            color: Some(las::Color {
                red: 1,
                green: 2,
                blue: 3,
            }),
            extra_bytes: vec![label],
            ..Default::default()
        };
        writer.write_point(point).unwrap();
    }
    writer.close().unwrap();
}
