use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use pcd_core::pointcloud::AttributeExtractor;
use pcd_exporter::{FormatPolicy, WriteOptions};

use crate::{error::AppError, report::ReportFormat};

#[derive(Parser, Debug)]
#[command(
    name = "relabel",
    about = "Inspect and reassign classification labels of LAS/LAZ point clouds",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
pub struct Cli {
    /// Attribute to read labels from. Repeat to give fallbacks in order.
    /// Defaults to Ext_Class, then classification.
    #[arg(long = "label-attribute", value_name = "NAME", global = true)]
    pub label_attribute: Vec<String>,

    /// Log more (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the file summary and the labels present in it.
    Labels {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Include the number of points per label.
        #[arg(long)]
        counts: bool,
    },
    /// Relabel points and save the result to a new file.
    Change(ChangeArgs),
    /// Interactive session.
    Shell {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        #[command(flatten)]
        write: WriteArgs,
    },
}

#[derive(Args, Debug)]
pub struct ChangeArgs {
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Label to replace. Without it every point is relabeled.
    #[arg(long, value_name = "OLD", allow_hyphen_values = true)]
    pub from: Option<String>,

    #[arg(long, value_name = "NEW", allow_hyphen_values = true)]
    pub to: String,

    /// Output file. Asked for on the terminal when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub write: WriteArgs,
}

/// How saved files are laid out.
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Rewrite into this point format instead of keeping the source's.
    #[arg(long, value_name = "N")]
    pub point_format: Option<u8>,

    /// LAS version used with --point-format [default: 1.4].
    #[arg(long, value_name = "X.Y", requires = "point_format")]
    pub las_version: Option<String>,

    /// Also store the labels in the standard classification field.
    #[arg(long)]
    pub mirror_classification: bool,
}

impl WriteArgs {
    pub fn write_options(&self) -> Result<WriteOptions, AppError> {
        let format = match self.point_format {
            Some(point_format) => FormatPolicy::Upgrade {
                version: parse_version(self.las_version.as_deref().unwrap_or("1.4"))?,
                point_format,
            },
            None => FormatPolicy::Preserve,
        };
        Ok(WriteOptions {
            format,
            mirror_classification: self.mirror_classification,
        })
    }
}

impl Cli {
    pub fn extractor(&self) -> AttributeExtractor {
        if self.label_attribute.is_empty() {
            AttributeExtractor::default()
        } else {
            AttributeExtractor::with_label_candidates(self.label_attribute.clone())
        }
    }
}

fn parse_version(text: &str) -> Result<(u8, u8), AppError> {
    let invalid = || AppError::InvalidVersion(text.to_string());
    let (major, minor) = text.trim().split_once('.').ok_or_else(invalid)?;
    let major = major.parse().map_err(|_| invalid())?;
    let minor = minor.parse().map_err(|_| invalid())?;
    Ok((major, minor))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn change_arguments() {
        let cli = Cli::parse_from([
            "relabel",
            "change",
            "site.laz",
            "--from",
            "5",
            "--to",
            "-1",
            "--point-format",
            "7",
            "--label-attribute",
            "Label",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.label_attribute, vec!["Label".to_string()]);
        let Command::Change(args) = cli.command else {
            panic!("expected the change subcommand");
        };
        assert_eq!(args.from.as_deref(), Some("5"));
        assert_eq!(args.to, "-1");
        assert_eq!(
            args.write.write_options().unwrap().format,
            FormatPolicy::Upgrade {
                version: (1, 4),
                point_format: 7
            }
        );
    }

    #[test]
    fn shell_takes_write_options() {
        let cli = Cli::parse_from([
            "relabel",
            "shell",
            "--point-format",
            "6",
            "--las-version",
            "1.4",
            "--mirror-classification",
        ]);
        let Command::Shell { input, write } = cli.command else {
            panic!("expected the shell subcommand");
        };
        assert_eq!(input, None);
        let options = write.write_options().unwrap();
        assert!(options.mirror_classification);
        assert_eq!(
            options.format,
            FormatPolicy::Upgrade {
                version: (1, 4),
                point_format: 6
            }
        );

        let cli = Cli::parse_from(["relabel", "shell", "site.las"]);
        let Command::Shell { write, .. } = cli.command else {
            panic!("expected the shell subcommand");
        };
        assert_eq!(write.write_options().unwrap(), WriteOptions::default());
    }

    #[test]
    fn version_parsing() {
        assert_eq!(parse_version("1.2").unwrap(), (1, 2));
        assert!(matches!(
            parse_version("14"),
            Err(AppError::InvalidVersion(_))
        ));
        assert!(parse_version("1.x").is_err());
    }
}
