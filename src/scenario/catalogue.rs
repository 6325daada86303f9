//! The scenarios run against the users and auth services.

use super::{identity::Identity, Call, Scenario, ScenarioState, StateKey, Step, StepError};
use crate::client::{
    types::{
        AuthType, CreateUser, CreatedUser, Initiate2fa, Initiated, Login, VerifyRegistration,
    },
    Reply,
};
use crate::totp;
use reqwest::StatusCode;

pub const USER_LIFECYCLE: &str = "Users Service";
pub const ENROLLMENT_EMAIL: &str = "Auth Service (2FA, email)";
pub const ENROLLMENT_APP: &str = "Auth Service (2FA, authenticator app)";
pub const FULL_REGISTRATION: &str = "Full Registration Flow with 2FA";

fn seeded(name: &str, identity: &Identity) -> Scenario {
    Scenario::new(name)
        .seed(StateKey::Username, identity.username.as_str())
        .seed(StateKey::Email, identity.email.as_str())
        .seed(StateKey::Password, identity.password.as_str())
}

fn record_user_id(reply: &Reply, state: &mut ScenarioState) -> Result<(), StepError> {
    let created: CreatedUser = reply.json().map_err(|e| StepError::schema(reply, e))?;
    if created.user.id.is_empty() {
        return Err(StepError::schema(reply, "user.id is empty"));
    }
    state.set_user_id(&created.user.id)
}

fn record_token(reply: &Reply, state: &mut ScenarioState) -> Result<(), StepError> {
    let initiated: Initiated = reply.json().map_err(|e| StepError::schema(reply, e))?;
    if initiated.verification_token.is_empty() {
        return Err(StepError::schema(reply, "verificationToken is empty"));
    }
    state.set(StateKey::VerificationToken, initiated.verification_token);
    Ok(())
}

fn record_token_and_secret(reply: &Reply, state: &mut ScenarioState) -> Result<(), StepError> {
    let initiated: Initiated = reply.json().map_err(|e| StepError::schema(reply, e))?;
    let secret = initiated
        .secret
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| StepError::schema(reply, "missing secret for authApp initiation"))?;
    if initiated.verification_token.is_empty() {
        return Err(StepError::schema(reply, "verificationToken is empty"));
    }
    state.set(StateKey::VerificationToken, initiated.verification_token);
    state.set(StateKey::TotpSecret, secret);
    Ok(())
}

fn create_user(state: &ScenarioState) -> Result<CreateUser, StepError> {
    let username = state.get(StateKey::Username)?;
    Ok(CreateUser {
        username: username.to_string(),
        email: Some(state.get(StateKey::Email)?.to_string()),
        password: state.get(StateKey::Password)?.to_string(),
        display_name: Some(username.to_string()),
        ..CreateUser::default()
    })
}

fn initiate(name: &str, auth_type: AuthType) -> Step {
    Step::new(name, move |state| {
        Ok(Call::Initiate2fa(Initiate2fa {
            username: state.get(StateKey::Username)?.to_string(),
            email: state.get(StateKey::Email)?.to_string(),
            auth_type,
        }))
    })
}

// The code is computed when the step runs, never ahead of time, so it
// belongs to the current 30 second window.
fn verify_with_totp(name: &str) -> Step {
    Step::new(name, |state| {
        let code = totp::generate_code(state.get(StateKey::TotpSecret)?)?;
        Ok(Call::VerifyRegistration(VerifyRegistration {
            verification_token: state.get(StateKey::VerificationToken)?.to_string(),
            code,
        }))
    })
}

/// Registration and login checks on the users service with a fresh identity.
#[must_use]
pub fn user_lifecycle() -> Scenario {
    user_lifecycle_with(&Identity::generate("testuser"), &Identity::generate("weak"))
}

/// `weak` only lends its username and email; its password is replaced by a
/// policy-violating one.
#[must_use]
pub fn user_lifecycle_with(identity: &Identity, weak: &Identity) -> Scenario {
    let weak_username = weak.username.clone();
    let weak_email = weak.email.clone();

    seeded(USER_LIFECYCLE, identity)
        .step(
            Step::new("Create User (Valid)", |state| {
                Ok(Call::CreateUser(create_user(state)?))
            })
            .expect_status(StatusCode::CREATED)
            .then(record_user_id),
        )
        .step(
            Step::new("Create User (Duplicate)", |state| {
                Ok(Call::CreateUser(create_user(state)?))
            })
            .expect_status(StatusCode::CONFLICT),
        )
        .step(
            Step::new("Create User (Missing Email)", |state| {
                Ok(Call::CreateUser(CreateUser {
                    email: None,
                    ..create_user(state)?
                }))
            })
            .expect_status(StatusCode::BAD_REQUEST),
        )
        // the service answers a failed password policy with 409
        .step(
            Step::new("Create User (Weak Password)", move |state| {
                Ok(Call::CreateUser(CreateUser {
                    username: weak_username.clone(),
                    email: Some(weak_email.clone()),
                    password: "weak".to_string(),
                    ..create_user(state)?
                }))
            })
            .expect_status(StatusCode::CONFLICT),
        )
        .step(Step::new("Login (Valid)", |state| {
            Ok(Call::Login(Login {
                email: state.get(StateKey::Email)?.to_string(),
                password: state.get(StateKey::Password)?.to_string(),
            }))
        }))
        .step(
            Step::new("Login (Invalid Credentials)", |state| {
                Ok(Call::Login(Login {
                    email: state.get(StateKey::Email)?.to_string(),
                    password: "wrongpassword".to_string(),
                }))
            })
            .expect_status(StatusCode::UNAUTHORIZED),
        )
}

/// Email-channel enrollment. The code is delivered out of band, so the
/// scenario stops once a verification token is issued.
#[must_use]
pub fn enrollment_email() -> Scenario {
    enrollment_email_with(&Identity::generate("2fa_test"))
}

#[must_use]
pub fn enrollment_email_with(identity: &Identity) -> Scenario {
    seeded(ENROLLMENT_EMAIL, identity)
        .step(initiate("2FA Initiate (Email)", AuthType::Email).then(record_token))
}

/// Authenticator-app enrollment, answered with a locally computed TOTP code.
#[must_use]
pub fn enrollment_app() -> Scenario {
    enrollment_app_with(&Identity::generate("2fa_test"))
}

#[must_use]
pub fn enrollment_app_with(identity: &Identity) -> Scenario {
    seeded(ENROLLMENT_APP, identity)
        .step(initiate("2FA Initiate (AuthApp)", AuthType::AuthApp).then(record_token_and_secret))
        .step(verify_with_totp("2FA Verify (AuthApp)"))
}

/// Enroll an authenticator app, then create the account bound to that
/// enrollment. Exports the new user id.
#[must_use]
pub fn full_registration() -> Scenario {
    full_registration_with(&Identity::generate("fullflow"))
}

#[must_use]
pub fn full_registration_with(identity: &Identity) -> Scenario {
    seeded(FULL_REGISTRATION, identity)
        .step(initiate("Full Flow: Initiate 2FA", AuthType::AuthApp).then(record_token_and_secret))
        .step(verify_with_totp("Full Flow: Verify Code"))
        .step(
            Step::new("Full Flow: Create User & Complete 2FA", |state| {
                Ok(Call::CreateUser(CreateUser {
                    username: state.get(StateKey::Username)?.to_string(),
                    email: Some(state.get(StateKey::Email)?.to_string()),
                    password: state.get(StateKey::Password)?.to_string(),
                    auth_type: Some(AuthType::AuthApp),
                    verification_token: Some(
                        state.get(StateKey::VerificationToken)?.to_string(),
                    ),
                    ..CreateUser::default()
                }))
            })
            .expect_status(StatusCode::CREATED)
            .then(record_user_id),
        )
        .export(StateKey::UserId)
}
