use las::{laz::is_laszip_vlr, point::Format, Builder, Header, Version, Vlr};

use crate::error::WriteError;

/// Chooses the LAS version and point format of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatPolicy {
    /// Same version and point format as the source file.
    #[default]
    Preserve,
    /// Rewrite into another point format. Formats 6-10 need LAS 1.4, so the
    /// version is raised when necessary.
    Upgrade { version: (u8, u8), point_format: u8 },
}

impl FormatPolicy {
    pub fn resolve(&self, source: &Header) -> Result<(Version, Format), WriteError> {
        match *self {
            FormatPolicy::Preserve => Ok((source.version(), source.point_format().clone())),
            FormatPolicy::Upgrade {
                version,
                point_format,
            } => {
                let format = Format::new(point_format).map_err(WriteError::Format)?;
                let version = if format.is_extended && version < (1, 4) {
                    log::warn!(
                        "point format {} needs LAS 1.4, raising version from {}.{}",
                        point_format,
                        version.0,
                        version.1
                    );
                    (1, 4)
                } else {
                    version
                };
                Ok((Version::new(version.0, version.1), format))
            }
        }
    }

    /// Builds the output header: the source header's transforms, VLRs, EVLRs
    /// and identifiers under the resolved version and point format.
    ///
    /// The source's LASzip VLR describes its own compressed layout and is
    /// dropped; the writer adds a fresh one for `.laz` output.
    pub fn build_header(&self, source: &Header, compressed: bool) -> Result<Header, WriteError> {
        let (version, mut format) = self.resolve(source)?;
        format.extra_bytes = source.point_format().extra_bytes;
        format.is_compressed = compressed;

        let mut builder = Builder::from(version);
        builder.point_format = format;
        builder.transforms = source.transforms().clone();
        builder.vlrs = without_laszip(source.vlrs());
        builder.evlrs = without_laszip(source.evlrs());
        builder.system_identifier = source.system_identifier().to_string();
        builder.generating_software = source.generating_software().to_string();
        builder.file_source_id = source.file_source_id();
        builder.gps_time_type = source.gps_time_type();
        builder.guid = source.guid();
        builder.date = source.date();

        builder.into_header().map_err(WriteError::Format)
    }
}

fn without_laszip(vlrs: &[Vlr]) -> Vec<Vlr> {
    vlrs.iter().filter(|vlr| !is_laszip_vlr(vlr)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use las::Transform;

    use super::*;

    fn source_header() -> Header {
        let mut builder = Builder::from((1, 2));
        builder.point_format = Format::new(3).unwrap();
        builder.point_format.extra_bytes = 2;
        builder.transforms.x = Transform {
            scale: 0.01,
            offset: 1000.0,
        };
        builder.system_identifier = "scanner".to_string();
        builder.into_header().unwrap()
    }

    #[test]
    fn preserve_keeps_version_format_and_transforms() {
        let source = source_header();
        let header = FormatPolicy::Preserve.build_header(&source, false).unwrap();

        assert_eq!(header.version(), Version::new(1, 2));
        assert_eq!(header.point_format().to_u8().unwrap(), 3);
        assert_eq!(header.point_format().extra_bytes, 2);
        assert_eq!(header.transforms().x.scale, 0.01);
        assert_eq!(header.transforms().x.offset, 1000.0);
        assert_eq!(header.system_identifier(), "scanner");
    }

    #[test]
    fn upgrade_to_extended_format_raises_version() {
        let source = source_header();
        let policy = FormatPolicy::Upgrade {
            version: (1, 2),
            point_format: 7,
        };
        let header = policy.build_header(&source, true).unwrap();

        assert_eq!(header.version(), Version::new(1, 4));
        assert!(header.point_format().is_extended);
        assert!(header.point_format().has_gps_time && header.point_format().has_color);
        assert!(header.point_format().is_compressed);
        assert_eq!(header.point_format().extra_bytes, 2);
        assert_eq!(header.transforms().x.offset, 1000.0);
    }

    #[test]
    fn laszip_vlr_is_not_carried_over() {
        let mut builder = Builder::from((1, 4));
        builder.point_format = Format::new(3).unwrap();
        builder.vlrs.push(Vlr {
            user_id: "laszip encoded".to_string(),
            record_id: 22204,
            description: String::new(),
            data: vec![0; 52],
        });
        builder.vlrs.push(Vlr {
            user_id: "LASF_Projection".to_string(),
            record_id: 2112,
            description: String::new(),
            data: b"PROJCS[]\0".to_vec(),
        });
        let source = builder.into_header().unwrap();

        for compressed in [false, true] {
            let header = FormatPolicy::Preserve
                .build_header(&source, compressed)
                .unwrap();
            assert_eq!(header.vlrs().len(), 1);
            assert_eq!(header.vlrs()[0].user_id, "LASF_Projection");
        }
    }

    #[test]
    fn unknown_point_format_is_rejected() {
        let policy = FormatPolicy::Upgrade {
            version: (1, 4),
            point_format: 42,
        };
        assert!(matches!(
            policy.build_header(&source_header(), false),
            Err(WriteError::Format(_))
        ));
    }
}
