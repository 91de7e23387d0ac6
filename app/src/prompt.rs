use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use pcd_exporter::Destination;

/// Asks for the output path on a line-based terminal.
///
/// An empty answer accepts the suggestion; `n`, `no` or end of input cancel.
pub struct PromptDestination<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptDestination<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Destination for PromptDestination<R, W> {
    fn choose(&mut self, suggested: &Path) -> Option<PathBuf> {
        let asked = write!(
            self.output,
            "save to [{}] (n to cancel): ",
            suggested.display()
        )
        .and_then(|_| self.output.flush());
        if let Err(e) = asked {
            log::warn!("cannot show prompt: {}", e);
            return None;
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => match line.trim() {
                "" => Some(suggested.to_path_buf()),
                answer if answer.eq_ignore_ascii_case("n") || answer.eq_ignore_ascii_case("no") => {
                    None
                }
                answer => Some(PathBuf::from(answer)),
            },
            Err(e) => {
                log::warn!("cannot read answer: {}", e);
                None
            }
        }
    }
}
