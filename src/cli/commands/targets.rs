use clap::{Arg, Command};

pub const ARG_USERS_URL: &str = "users-url";
pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_USERS_URL)
                .long(ARG_USERS_URL)
                .help("Users service base URL")
                .default_value("http://users-service:3103")
                .env("AUTHPROBE_USERS_URL"),
        )
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Auth service base URL")
                .default_value("http://auth-service:3105")
                .env("AUTHPROBE_AUTH_URL"),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .short('t')
                .long(ARG_TIMEOUT)
                .help("Per-request timeout in seconds")
                .default_value("10")
                .env("AUTHPROBE_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
