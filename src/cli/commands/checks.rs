use crate::{probe::DEFAULT_MAX_ATTEMPTS, runner::Stage};
use clap::{
    builder::{FalseyValueParser, PossibleValuesParser},
    Arg, ArgAction, Command,
};
use std::path::PathBuf;

pub const ARG_SCENARIO: &str = "scenario";
pub const ARG_RATE_LIMIT_ATTEMPTS: &str = "rate-limit-attempts";
pub const ARG_REPORT: &str = "report";
pub const ARG_NO_COLOR: &str = "no-color";

#[must_use]
pub fn with_args(command: Command) -> Command {
    let attempts: &'static str = Box::leak(DEFAULT_MAX_ATTEMPTS.to_string().into_boxed_str());

    command
        .arg(
            Arg::new(ARG_SCENARIO)
                .short('s')
                .long(ARG_SCENARIO)
                .help("Scenario to run, repeat or comma separate for several (default: all)")
                .env("AUTHPROBE_SCENARIOS")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .value_parser(PossibleValuesParser::new(Stage::names())),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_ATTEMPTS)
                .long(ARG_RATE_LIMIT_ATTEMPTS)
                .help("Wrong 2FA codes to send before giving up on seeing 429")
                .default_value(attempts)
                .env("AUTHPROBE_RATE_LIMIT_ATTEMPTS")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_REPORT)
                .long(ARG_REPORT)
                .help("Write the check results as JSON to this file")
                .env("AUTHPROBE_REPORT")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_NO_COLOR)
                .long(ARG_NO_COLOR)
                .help("Print PASS/FAIL lines without colour")
                .env("NO_COLOR")
                .action(ArgAction::SetTrue)
                .value_parser(FalseyValueParser::new()),
        )
}
