use super::StepError;
use crate::client::types::UserId;
use secrecy::{ExposeSecret, SecretString};
use std::{collections::HashMap, fmt};

/// Symbolic names for values one step hands to a later one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKey {
    Username,
    Email,
    Password,
    UserId,
    VerificationToken,
    TotpSecret,
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
            Self::UserId => "user_id",
            Self::VerificationToken => "verification_token",
            Self::TotpSecret => "totp_secret",
        };
        f.write_str(name)
    }
}

/// Values produced while a scenario runs. Owned by the executor of one
/// scenario; every value is held as a secret so the bag can be logged safely.
#[derive(Default)]
pub struct ScenarioState {
    values: HashMap<StateKey, SecretString>,
}

impl fmt::Debug for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.values.keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("ScenarioState").field("keys", &keys).finish()
    }
}

impl ScenarioState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: StateKey, value: impl Into<String>) {
        self.values.insert(key, SecretString::from(value.into()));
    }

    /// # Errors
    /// Returns [`StepError::MissingState`] if no earlier step wrote `key`.
    pub fn get(&self, key: StateKey) -> Result<&str, StepError> {
        self.values
            .get(&key)
            .map(|value| value.expose_secret())
            .ok_or(StepError::MissingState(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The user id is stored in its JSON form so numeric and textual ids
    /// round-trip unchanged.
    ///
    /// # Errors
    /// Returns [`StepError::Schema`] if serialization fails.
    pub fn set_user_id(&mut self, id: &UserId) -> Result<(), StepError> {
        let raw = serde_json::to_string(id).map_err(|e| StepError::Schema {
            reason: format!("cannot store user id: {e}"),
            body: id.to_string(),
        })?;
        self.set(StateKey::UserId, raw);
        Ok(())
    }

    /// # Errors
    /// Returns [`StepError::MissingState`] if no user id was recorded.
    pub fn user_id(&self) -> Result<UserId, StepError> {
        let raw = self.get(StateKey::UserId)?;
        serde_json::from_str(raw).map_err(|e| StepError::Schema {
            reason: format!("stored user id is not valid JSON: {e}"),
            body: raw.to_string(),
        })
    }

    /// Keep only `keys`, dropping everything else. Used to hand the exported
    /// values of a finished scenario to a later consumer.
    #[must_use]
    pub fn retain(mut self, keys: &[StateKey]) -> Self {
        self.values.retain(|key, _| keys.contains(key));
        self
    }
}
