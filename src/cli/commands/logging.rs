use clap::{builder::ValueParser, Arg, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("AUTHPROBE_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("AUTHPROBE_LOG_LEVEL", Some(level))], || {
                let command = with_args(Command::new("authprobe"));
                let matches = command.get_matches_from(vec!["authprobe"]);
                assert_eq!(
                    matches.get_one::<u8>(ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap_or_default())
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5u8 {
            temp_env::with_vars([("AUTHPROBE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["authprobe".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(usize::from(index))));
                }

                let command = with_args(Command::new("authprobe"));
                let matches = command.get_matches_from(args);

                assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(index));
            });
        }
    }

    #[test]
    fn test_invalid_log_level() {
        temp_env::with_vars([("AUTHPROBE_LOG_LEVEL", Some("loud"))], || {
            let command = with_args(Command::new("authprobe"));
            assert!(command.try_get_matches_from(vec!["authprobe"]).is_err());
        });
    }
}
