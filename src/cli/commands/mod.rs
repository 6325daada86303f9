pub mod checks;
pub mod logging;
pub mod targets;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("authprobe")
        .about("Black-box checks for registration, login and 2FA flows")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles);

    let command = targets::with_args(command);
    let command = checks::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::checks::{ARG_NO_COLOR, ARG_RATE_LIMIT_ATTEMPTS, ARG_REPORT, ARG_SCENARIO};
    use super::targets::{ARG_AUTH_URL, ARG_TIMEOUT, ARG_USERS_URL};
    use super::*;
    use std::path::PathBuf;

    const ENV: [&str; 7] = [
        "AUTHPROBE_USERS_URL",
        "AUTHPROBE_AUTH_URL",
        "AUTHPROBE_TIMEOUT",
        "AUTHPROBE_RATE_LIMIT_ATTEMPTS",
        "AUTHPROBE_SCENARIOS",
        "AUTHPROBE_REPORT",
        "NO_COLOR",
    ];

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(ENV.map(|key| (key, None::<&str>)), f);
    }

    fn scenarios(matches: &clap::ArgMatches) -> Vec<String> {
        matches
            .get_many::<String>(ARG_SCENARIO)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "authprobe");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Black-box checks for registration, login and 2FA flows".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        clean_env(|| {
            let matches = new().get_matches_from(vec!["authprobe"]);

            assert_eq!(
                matches.get_one::<String>(ARG_USERS_URL).cloned(),
                Some("http://users-service:3103".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(ARG_AUTH_URL).cloned(),
                Some("http://auth-service:3105".to_string())
            );
            assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(10));
            assert_eq!(
                matches.get_one::<u32>(ARG_RATE_LIMIT_ATTEMPTS).copied(),
                Some(15)
            );
            assert!(scenarios(&matches).is_empty());
            assert!(matches.get_one::<PathBuf>(ARG_REPORT).is_none());
            assert!(!matches.get_flag(ARG_NO_COLOR));
        });
    }

    #[test]
    fn test_check_args() {
        clean_env(|| {
            let matches = new().get_matches_from(vec![
                "authprobe",
                "--users-url",
                "http://localhost:3103",
                "--auth-url",
                "http://localhost:3105",
                "--timeout",
                "3",
                "--rate-limit-attempts",
                "20",
                "--scenario",
                "users",
                "-s",
                "full-flow,rate-limit",
                "--report",
                "/tmp/authprobe.json",
                "--no-color",
            ]);

            assert_eq!(
                matches.get_one::<String>(ARG_USERS_URL).cloned(),
                Some("http://localhost:3103".to_string())
            );
            assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(3));
            assert_eq!(
                matches.get_one::<u32>(ARG_RATE_LIMIT_ATTEMPTS).copied(),
                Some(20)
            );
            assert_eq!(scenarios(&matches), ["users", "full-flow", "rate-limit"]);
            assert_eq!(
                matches.get_one::<PathBuf>(ARG_REPORT).cloned(),
                Some(PathBuf::from("/tmp/authprobe.json"))
            );
            assert!(matches.get_flag(ARG_NO_COLOR));
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("AUTHPROBE_USERS_URL", Some("http://users.tld:8080")),
                ("AUTHPROBE_AUTH_URL", Some("https://auth.tld")),
                ("AUTHPROBE_TIMEOUT", Some("30")),
                ("AUTHPROBE_RATE_LIMIT_ATTEMPTS", Some("12")),
                ("AUTHPROBE_SCENARIOS", Some("2fa-email,2fa-app")),
                ("AUTHPROBE_REPORT", Some("report.json")),
                ("NO_COLOR", Some("1")),
            ],
            || {
                let matches = new().get_matches_from(vec!["authprobe"]);

                assert_eq!(
                    matches.get_one::<String>(ARG_USERS_URL).cloned(),
                    Some("http://users.tld:8080".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_AUTH_URL).cloned(),
                    Some("https://auth.tld".to_string())
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(30));
                assert_eq!(
                    matches.get_one::<u32>(ARG_RATE_LIMIT_ATTEMPTS).copied(),
                    Some(12)
                );
                assert_eq!(scenarios(&matches), ["2fa-email", "2fa-app"]);
                assert_eq!(
                    matches.get_one::<PathBuf>(ARG_REPORT).cloned(),
                    Some(PathBuf::from("report.json"))
                );
                assert!(matches.get_flag(ARG_NO_COLOR));
            },
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        clean_env(|| {
            assert!(new()
                .try_get_matches_from(vec!["authprobe", "--timeout", "0"])
                .is_err());
            assert!(new()
                .try_get_matches_from(vec!["authprobe", "--scenario", "admin"])
                .is_err());
            assert!(new()
                .try_get_matches_from(vec!["authprobe", "--rate-limit-attempts", "-1"])
                .is_err());
        });
    }
}
