use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use pcd_exporter::WriteOptions;

use crate::{
    error::AppError,
    prompt::PromptDestination,
    report::{write_report, ReportFormat},
    session::Session,
};

const HELP: &str = "\
commands:
  labels            list the labels of the open cloud
  counts            list the labels with their point counts
  info              show the file header summary
  change OLD NEW    relabel points labelled OLD as NEW and save
  set NEW           relabel every point as NEW and save
  open PATH         open another point cloud
  help              show this message
  quit              leave the shell";

/// Line-oriented front end over a [`Session`]. Errors are printed and the
/// loop goes on.
pub struct Shell<R, W> {
    session: Session,
    options: WriteOptions,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(session: Session, options: WriteOptions, input: R, output: W) -> Self {
        Self {
            session,
            options,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        if !self.session.is_open() {
            writeln!(self.output, "no point cloud is open, use 'open PATH'")?;
        }
        writeln!(self.output, "type 'help' for a list of commands")?;
        loop {
            write!(self.output, "relabel> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(());
            }
            let words: Vec<&str> = line.split_whitespace().collect();
            let result = match words.as_slice() {
                [] => Ok(()),
                ["quit"] | ["exit"] => return Ok(()),
                ["help"] => writeln!(self.output, "{}", HELP).map_err(AppError::from),
                ["labels"] => self.print_labels(false),
                ["counts"] => self.print_labels(true),
                ["info"] => self.print_info(),
                ["change", old, new] => self.change(Some(*old), new),
                ["set", new] => self.change(None, new),
                ["open", path] => self.open(Path::new(*path)),
                _ => writeln!(
                    self.output,
                    "unknown command {:?}, type 'help' for a list of commands",
                    line.trim()
                )
                .map_err(AppError::from),
            };
            if let Err(e) = result {
                log::debug!("command {:?} failed: {:?}", line.trim(), e);
                writeln!(self.output, "error: {}", e)?;
            }
        }
    }

    fn print_labels(&mut self, with_counts: bool) -> Result<(), AppError> {
        let report = self.session.report(with_counts)?;
        writeln!(self.output, "labels: {}", report.labels)?;
        if let Some(counts) = report.counts {
            for (label, count) in counts.iter() {
                writeln!(self.output, "  {:>6}: {}", label, count)?;
            }
        }
        Ok(())
    }

    fn print_info(&mut self) -> Result<(), AppError> {
        let report = self.session.report(false)?;
        write_report(&report, ReportFormat::Text, &mut self.output)
    }

    fn open(&mut self, path: &Path) -> Result<(), AppError> {
        let labels = self.session.open(path)?;
        writeln!(self.output, "opened {}, labels: {}", path.display(), labels)?;
        Ok(())
    }

    fn change(&mut self, old: Option<&str>, new: &str) -> Result<(), AppError> {
        let mut destination = PromptDestination::new(&mut self.input, &mut self.output);
        let outcome = self
            .session
            .change_label(old, new, &mut destination, &self.options)?;
        writeln!(self.output, "{}", outcome)?;
        Ok(())
    }
}
