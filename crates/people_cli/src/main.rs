//! `people` command-line entry point.
//!
//! # Responsibility
//! - Load `.env`, parse arguments, and initialize logging.
//! - Own the store client for the process and hand it to the repository.
//! - Translate command outcomes into process exit codes.

mod cli;
mod commands;
mod output;

use clap::Parser;
use console::style;
use log::debug;
use people_core::{default_log_level, init_logging, LogTarget, StoreClient, StorePersonRepository};
use std::io;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::commands::{run, TerminalConfirm};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let target = match cli.log_dir.as_deref() {
        Some(dir) => LogTarget::Directory(dir),
        None => LogTarget::Stderr,
    };
    let level = cli.log_level().unwrap_or(default_log_level(target));
    if let Err(err) = init_logging(level, target) {
        eprintln!("{} {err}", style("warning:").for_stderr().yellow());
    }
    debug!(
        "event=cli_start module=cli status=ok core_version={}",
        people_core::core_version()
    );

    let client = StoreClient::new(cli.store_config());
    let repo = StorePersonRepository::new(&client);
    let mut stdout = io::stdout().lock();

    match run(cli.command, &repo, &mut TerminalConfirm, &mut stdout) {
        Ok(exit) => exit.into(),
        Err(err) => {
            debug!("event=cli_command module=cli status=error error={err:#}");
            eprintln!("{} {err:#}", style("error:").for_stderr().red().bold());
            ExitCode::FAILURE
        }
    }
}
