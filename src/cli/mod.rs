extern crate clap;

use std::process;

#[macro_use]
mod logger;
mod cmd;
pub mod configuration;

use self::clap::{App, Arg, ArgMatches};

/// The `parser` binary's entry point: parse arguments, initialize logging, and run the
/// pipeline under a panic hook that turns a deliberate `logger::fatal` abort into a clean
/// exit 1 rather than an unhandled panic.
pub fn run() {
    let matches = build_app();

    logger::init(&matches);

    catch_fatal!(
        {
            cmd::run(&matches);
        },
        {
            process::exit(1);
        }
    );
}

fn build_app<'a>() -> ArgMatches<'a> {
    App::new("parser")
        .version("0.1.0")
        .about("Greedy transition-based dependency parser")
        .arg(
            Arg::with_name("config")
                .help("Run configuration file path (YAML)")
                .takes_value(true)
                .value_name("CONFIG")
                .required(true),
        )
        .arg(
            Arg::with_name("input")
                .help("CoNLL-X input file path, or \"-\" for stdin")
                .takes_value(true)
                .value_name("INPUT")
                .required(true),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .help("Overrides the configured number of worker threads")
                .takes_value(true)
                .value_name("NUM"),
        )
        .arg(
            Arg::with_name("loglevel")
                .long("loglevel")
                .help("Sets the log level (error, warn, info, debug, trace)")
                .takes_value(true)
                .value_name("LEVEL"),
        )
        .arg(
            Arg::with_name("logfile")
                .long("logfile")
                .help("Enables file logging at the given path")
                .takes_value(true)
                .value_name("PATH"),
        )
        .get_matches()
}
