use std::{
    io,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::error::WriteError;

/// Picks where an output file goes. `None` means the user cancelled.
pub trait Destination {
    fn choose(&mut self, suggested: &Path) -> Option<PathBuf>;
}

/// Always writes to the same path, without asking.
#[derive(Debug, Clone)]
pub struct FixedDestination(pub PathBuf);

impl Destination for FixedDestination {
    fn choose(&mut self, _suggested: &Path) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

impl<F> Destination for F
where
    F: FnMut(&Path) -> Option<PathBuf>,
{
    fn choose(&mut self, suggested: &Path) -> Option<PathBuf> {
        self(suggested)
    }
}

/// `dir/cloud.laz` -> `dir/cloud_updated.laz`.
pub fn suggested_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "pointcloud".to_string());
    let extension = input
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "las".to_string());
    input.with_file_name(format!("{}_updated.{}", stem, extension))
}

/// Creates a scratch file next to `destination` whose name keeps the
/// destination's extension.
pub(crate) fn scratch_file(destination: &Path) -> Result<NamedTempFile, WriteError> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let suffix = destination
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    tempfile::Builder::new()
        .prefix(".relabel-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|source| io_error(destination, source))
}

/// Moves a finished scratch file over `destination`.
pub(crate) fn persist(scratch: NamedTempFile, destination: &Path) -> Result<(), WriteError> {
    scratch
        .persist(destination)
        .map(|_| ())
        .map_err(|e| io_error(destination, e.error))
}

fn io_error(path: &Path, source: io::Error) -> WriteError {
    WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn suggestion_appends_updated_and_keeps_extension() {
        assert_eq!(
            suggested_output_path(Path::new("/data/site.laz")),
            PathBuf::from("/data/site_updated.laz")
        );
        assert_eq!(
            suggested_output_path(Path::new("site.las")),
            PathBuf::from("site_updated.las")
        );
    }

    #[test]
    fn closures_act_as_destinations() {
        let mut cancel = |_: &Path| -> Option<PathBuf> { None };
        assert_eq!(cancel.choose(Path::new("a.las")), None);

        let mut fixed = FixedDestination(PathBuf::from("b.las"));
        assert_eq!(fixed.choose(Path::new("a.las")), Some(PathBuf::from("b.las")));
    }

    #[test]
    fn scratch_file_is_only_visible_after_persist() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.laz");

        let mut scratch = scratch_file(&destination).unwrap();
        assert_eq!(scratch.path().extension().unwrap(), "laz");
        scratch.write_all(b"data").unwrap();
        assert!(!destination.exists());

        persist(scratch, &destination).unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), b"data");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn dropped_scratch_file_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.las");
        drop(scratch_file(&destination).unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
