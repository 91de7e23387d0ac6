mod cli;
mod error;
#[cfg(test)]
mod fixtures;
mod prompt;
mod report;
mod session;
mod shell;

use std::io::{self, Write as _};
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use pcd_exporter::FixedDestination;

use cli::{Cli, Command};
use error::AppError;
use prompt::PromptDestination;
use report::write_report;
use session::Session;
use shell::Shell;

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();
}

fn run(args: Cli) -> Result<(), AppError> {
    let mut session = Session::new(args.extractor());

    match args.command {
        Command::Labels {
            input,
            format,
            counts,
        } => {
            session.open(&input)?;
            let report = session.report(counts)?;
            write_report(&report, format, io::stdout().lock())?;
        }
        Command::Change(change) => {
            let options = change.write.write_options()?;
            session.open(&change.input)?;

            let start = std::time::Instant::now();
            let outcome = match &change.output {
                Some(output) => session.change_label(
                    change.from.as_deref(),
                    &change.to,
                    &mut FixedDestination(output.clone()),
                    &options,
                )?,
                None => {
                    let mut destination =
                        PromptDestination::new(io::stdin().lock(), io::stderr());
                    session.change_label(
                        change.from.as_deref(),
                        &change.to,
                        &mut destination,
                        &options,
                    )?
                }
            };
            log::info!("finish label change in {:?}", start.elapsed());
            println!("{}", outcome);
        }
        Command::Shell { input, write } => {
            let write_options = write.write_options()?;
            if let Some(input) = input {
                session.open(&input)?;
            }
            let mut shell = Shell::new(
                session,
                write_options,
                io::stdin().lock(),
                io::stdout().lock(),
            );
            shell.run()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logger(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
