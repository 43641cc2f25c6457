#![forbid(unsafe_code)]
// #![deny(dead_code)]
// #![deny(unused_imports)]
//#![deny(missing_docs)]

#[macro_use]
extern crate log;

mod app;
mod configuration;
mod connection;
mod routine;
mod time;

use log::LevelFilter;
use signal_hook::{consts::SIGINT, iterator::Signals};
use std::sync::Arc;
use std::{path::PathBuf, process::exit, thread};
use structopt::StructOpt;

use self::app::{error::Error, executor::RoutineListExecutor, App};
use self::routine::ExecutionProgress;
use self::{
    configuration::command_line::{LogLevel, Opt},
    configuration::constants::common::{FAILURE_EXIT_CODE, FORCED_EXIT_CODE},
    configuration::manifest::Manifest,
};

#[tokio::main]
async fn main() {
    let mut options = Opt::from_args();

    if let Err(e) = init_logging(
        options.logging.take().unwrap_or(LogLevel::Info).into(),
        &options.log_output_file,
    ) {
        eprintln!("Failed to initialize logging: {}", e);
        exit(FAILURE_EXIT_CODE);
    }

    match run(options).await {
        Ok(true) => {}
        Ok(false) => exit(FAILURE_EXIT_CODE),
        Err(e) => {
            error!("{}", e);
            exit(FAILURE_EXIT_CODE);
        }
    }
}

/// Returns whether the run finished without failures.
async fn run(options: Opt) -> Result<bool, Error> {
    let manifest = Manifest::from(options.file)?;
    debug!("Initiated configuration {:#?}", manifest);
    let app = App::new(manifest, &options.groups, options.timeout)?;
    watch_signals(app.executor())?;

    let summary = app.run().await?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    match (&summary.failed_group, summary.failed_test) {
        (Some(group), Some(routine)) => {
            error!("Run {} failed: '{}' in group '{}'", summary.run_id, routine, group)
        }
        (None, Some(routine)) => error!("Run {} failed: '{}'", summary.run_id, routine),
        _ => info!("Run {} finished with {:?}", summary.run_id, summary.progress),
    }
    Ok(summary.failed_test.is_none() && summary.progress == ExecutionProgress::Completed)
}

fn watch_signals(executor: Arc<RoutineListExecutor>) -> Result<(), Error> {
    let mut signals = Signals::new(&[SIGINT])?;
    thread::spawn(move || {
        let mut interrupted = false;
        for sig in signals.forever() {
            if interrupted {
                info!("Received signal {:?} again, exiting", sig);
                exit(FORCED_EXIT_CODE);
            }
            interrupted = true;
            info!("Received signal {:?}, cancelling run", sig);
            executor.cancel();
        }
    });
    Ok(())
}

fn init_logging(level: LevelFilter, output: &Option<PathBuf>) -> Result<(), fern::InitError> {
    let mut dispatcher = fern::Dispatch::new()
        // Perform allocation-free log formatting
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}:{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record
                    .line()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "".to_owned()),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(log_file) = output {
        dispatcher = dispatcher.chain(fern::log_file(log_file)?)
    }
    dispatcher.apply()?;
    info!("Logging level {} enabled", level);
    Ok(())
}
