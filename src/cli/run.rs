use anyhow::Result;

use super::args::{Arguments, Command};
use super::commands::{check::check, init::init};
use super::exit_status::ExitStatus;

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Check(args)) => check(args),
        Some(Command::Init) => init(),
        None => anyhow::bail!("No command provided. Use --help to see available commands."),
    }
}
