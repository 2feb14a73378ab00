use clap::FromArgMatches;
use gs::cli::{self, complete, Cli, PROGRAM};
use gs::commands::{self, Context};
use gs::utils::cancel::{spawn_interrupt_listener, CancelToken};
use gs::utils::logger;
use log::error;
use std::ffi::OsString;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Declaration defects must stop us before any user command runs.
    let shorthands = match cli::shorthands() {
        Ok(table) => table,
        Err(err) => {
            logger::init(false);
            error!("{}: invalid command declarations: {}", PROGRAM, err);
            return ExitCode::from(2);
        }
    };
    let command = cli::command(&shorthands);

    let cancel = CancelToken::new();

    if let Some((line, point)) = complete::requested() {
        for candidate in complete::respond(&command, &shorthands, &line, point, &cancel).await {
            println!("{}", candidate);
        }
        return ExitCode::SUCCESS;
    }

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let args = shorthands.expand(args);
    let matches = match command.try_get_matches_from(std::iter::once(OsString::from(PROGRAM)).chain(args)) {
        Ok(matches) => matches,
        Err(err) => err.exit(),
    };
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    logger::init(cli.globals.verbose);

    if let Some(dir) = &cli.globals.dir {
        if let Err(err) = std::env::set_current_dir(dir) {
            error!("{}: change directory to {}: {}", PROGRAM, dir.display(), err);
            return ExitCode::FAILURE;
        }
    }

    let listener = spawn_interrupt_listener(cancel.clone());

    let ctx = Context {
        cancel,
        shorthands: &shorthands,
        prompt: cli.globals.prompt(),
    };
    let result = commands::run(cli.command, &ctx).await;

    listener.abort();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}: {:#}", PROGRAM, err);
            ExitCode::FAILURE
        }
    }
}
