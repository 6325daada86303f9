use crate::{probe::DEFAULT_MAX_ATTEMPTS, runner::Stage};
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Run configuration, built once from the command line and passed down.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub users_url: String,
    pub auth_url: String,
    pub timeout: Duration,
    pub rate_limit_attempts: u32,
    pub stages: Vec<Stage>,
    pub report_path: Option<PathBuf>,
    pub color: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(users_url: String, auth_url: String) -> Self {
        Self {
            users_url,
            auth_url,
            timeout: DEFAULT_TIMEOUT,
            rate_limit_attempts: DEFAULT_MAX_ATTEMPTS,
            stages: Stage::ALL.to_vec(),
            report_path: None,
            color: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "http://users-service:3103".to_string(),
            "http://auth-service:3105".to_string(),
        );
        assert_eq!(args.users_url, "http://users-service:3103");
        assert_eq!(args.auth_url, "http://auth-service:3105");
        assert_eq!(args.timeout, Duration::from_secs(10));
        assert_eq!(args.rate_limit_attempts, 15);
        assert_eq!(args.stages.len(), 5);
        assert!(args.report_path.is_none());
    }
}
