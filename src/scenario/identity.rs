use rand::{distributions::Alphanumeric, Rng};

/// Prefix every generated password starts with, enough to satisfy the
/// service's strength policy on its own.
const PASSWORD_PREFIX: &str = "Abc123!@";

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Throwaway credentials for one scenario, namespaced by a random suffix so
/// concurrent runs against the same service never collide.
#[derive(Clone)]
pub struct Identity {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Identity {
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        let username = format!("{prefix}_{}", random_alphanumeric(5));
        Self::new(username, format!("{PASSWORD_PREFIX}{}", random_alphanumeric(8)))
    }

    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            email: format!("{username}@example.com"),
            username,
            password: password.into(),
        }
    }
}
